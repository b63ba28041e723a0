// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Lock expiry is measured on the monotonic clock; entity audit timestamps
//! use wall-clock UTC time. Both come from the same source so that a
//! [`FakeClock`] moves them together.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic reading, used for lease expiry
    fn now(&self) -> Instant;

    /// Wall-clock reading, used for audit timestamps
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct FakeTime {
    base_instant: Instant,
    base_wall: DateTime<Utc>,
    current: Instant,
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    time: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            time: Arc::new(Mutex::new(FakeTime {
                base_instant: now,
                base_wall: Utc::now(),
                current: now,
            })),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        time.current += duration;
    }

    /// Set the clock to a specific instant
    pub fn set(&self, instant: Instant) {
        let mut time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        time.current = instant;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.time.lock().unwrap_or_else(|e| e.into_inner()).current
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let time = self.time.lock().unwrap_or_else(|e| e.into_inner());
        let elapsed = time.current.saturating_duration_since(time.base_instant);
        let elapsed = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        time.base_wall + elapsed
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
