// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock backend for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BackendError, LockBackend};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vl_core::{AcquireOutcome, Clock, LockOwner, LockRegistry, ReleaseOutcome, SystemClock};

/// Recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Acquire {
        key: String,
        owner: LockOwner,
        lease: Duration,
    },
    Release {
        key: String,
        owner: LockOwner,
    },
    ForceRelease {
        key: String,
    },
    Remaining {
        key: String,
    },
    PurgeExpired,
}

/// In-memory backend standing in for a shared lock service
///
/// Clones share state, so several managers built on clones of one fake
/// behave like service instances talking to the same server.
#[derive(Clone)]
pub struct FakeLockBackend<C: Clock = SystemClock> {
    registry: Arc<LockRegistry<C>>,
    available: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl FakeLockBackend<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FakeLockBackend<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FakeLockBackend<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            registry: Arc::new(LockRegistry::with_clock(clock)),
            available: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Simulate the backend going down or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Registry holding the fake's lock state
    pub fn registry(&self) -> &Arc<LockRegistry<C>> {
        &self.registry
    }

    fn record(&self, call: BackendCall) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable("fake backend offline".into()))
        }
    }
}

#[async_trait]
impl<C: Clock> LockBackend for FakeLockBackend<C> {
    async fn acquire(
        &self,
        key: &str,
        owner: &LockOwner,
        lease: Duration,
    ) -> Result<AcquireOutcome, BackendError> {
        self.record(BackendCall::Acquire {
            key: key.to_string(),
            owner: owner.clone(),
            lease,
        })?;
        Ok(self.registry.try_acquire(key, owner, lease))
    }

    async fn release(&self, key: &str, owner: &LockOwner) -> Result<ReleaseOutcome, BackendError> {
        self.record(BackendCall::Release {
            key: key.to_string(),
            owner: owner.clone(),
        })?;
        Ok(self.registry.release(key, owner))
    }

    async fn force_release(&self, key: &str) -> Result<bool, BackendError> {
        self.record(BackendCall::ForceRelease {
            key: key.to_string(),
        })?;
        Ok(self.registry.force_release(key).is_some())
    }

    async fn remaining(&self, key: &str) -> Result<Option<Duration>, BackendError> {
        self.record(BackendCall::Remaining {
            key: key.to_string(),
        })?;
        Ok(self.registry.remaining(key))
    }

    async fn purge_expired(&self) -> Result<usize, BackendError> {
        self.record(BackendCall::PurgeExpired)?;
        Ok(self.registry.sweep_expired().len())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
