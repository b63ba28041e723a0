// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock entries and the outcomes of acquire/release attempts
//!
//! These types are shared by the in-process registry and by remote backends,
//! so both report contention and ownership in the same vocabulary.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Furthest a lease or wait deadline is carried; longer spans saturate here
pub const MAX_HORIZON: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// `now + span`, saturating at [`MAX_HORIZON`] instead of overflowing
pub fn saturating_deadline(now: Instant, span: Duration) -> Instant {
    now.checked_add(span.min(MAX_HORIZON)).unwrap_or(now)
}

/// Opaque token identifying the execution context that owns a lock
///
/// Ownership is compared by value: two tokens with the same id are the same
/// owner, which is what makes reentrant acquisition work.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockOwner(pub String);

impl LockOwner {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, globally unique owner token
    ///
    /// Prefer this when owners from several service instances share a
    /// remote backend.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Token for the calling OS thread within this process
    pub fn current_thread() -> Self {
        Self(format!(
            "{}:{:?}",
            std::process::id(),
            std::thread::current().id()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LockOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of one held key
#[derive(Clone, Debug)]
pub struct LockEntry {
    pub key: String,
    pub owner: LockOwner,
    pub acquired_at: Instant,
    pub expires_at: Instant,
    /// Nested acquisitions by `owner`; never zero while the entry exists
    pub reentrant_count: u32,
}

impl LockEntry {
    pub fn new(key: impl Into<String>, owner: LockOwner, now: Instant, lease: Duration) -> Self {
        Self {
            key: key.into(),
            owner,
            acquired_at: now,
            expires_at: saturating_deadline(now, lease),
            reentrant_count: 1,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn is_owned_by(&self, owner: &LockOwner) -> bool {
        &self.owner == owner
    }

    /// Time left before the lease runs out
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Record a nested acquisition, never shortening the current lease
    pub fn reenter(&mut self, now: Instant, lease: Duration) -> u32 {
        self.reentrant_count = self.reentrant_count.saturating_add(1);
        self.expires_at = self.expires_at.max(saturating_deadline(now, lease));
        self.reentrant_count
    }
}

/// Result of a single acquisition attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Key was free (or expired) and now belongs to the caller
    Acquired,
    /// Caller already owned the key; nesting depth after this acquisition
    Reentered { depth: u32 },
    /// Another owner holds an unexpired lease
    Held { owner: LockOwner },
}

impl AcquireOutcome {
    pub fn is_acquired(&self) -> bool {
        !matches!(self, AcquireOutcome::Held { .. })
    }
}

/// Result of releasing one level of ownership
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Last level released; the key is free
    Released,
    /// Still held by the caller at the given depth
    Decremented { remaining: u32 },
    /// No entry for the key
    NotHeld,
    /// Entry belongs to someone else; left untouched
    NotOwner { owner: LockOwner },
    /// Entry had already expired and was cleaned up
    Expired,
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
