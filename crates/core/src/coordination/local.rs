// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-process lock manager backed by a [`LockRegistry`]

use super::error::LockResult;
use super::lock::{AcquireOutcome, LockOwner, ReleaseOutcome};
use super::manager::{poll_acquire, validate_request, LockManager};
use super::registry::LockRegistry;
use crate::clock::{millis, Clock, SystemClock};
use crate::config::LockSettings;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// In-process [`LockManager`]
///
/// Cloning is cheap and clones share the same registry.
#[derive(Clone, Debug)]
pub struct LocalLockManager<C: Clock = SystemClock> {
    registry: Arc<LockRegistry<C>>,
    settings: LockSettings,
}

impl LocalLockManager<SystemClock> {
    pub fn new(settings: LockSettings) -> Self {
        Self::with_registry(Arc::new(LockRegistry::new()), settings)
    }
}

impl Default for LocalLockManager<SystemClock> {
    fn default() -> Self {
        Self::new(LockSettings::default())
    }
}

impl<C: Clock> LocalLockManager<C> {
    pub fn with_clock(clock: C, settings: LockSettings) -> Self {
        Self::with_registry(Arc::new(LockRegistry::with_clock(clock)), settings)
    }

    pub fn with_registry(registry: Arc<LockRegistry<C>>, settings: LockSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<LockRegistry<C>> {
        &self.registry
    }

    fn attempt(&self, owner: &LockOwner, key: &str, lease: Duration) -> bool {
        match self.registry.try_acquire(key, owner, lease) {
            AcquireOutcome::Acquired => {
                tracing::debug!(key, %owner, lease_ms = millis(lease), "lock acquired");
                true
            }
            AcquireOutcome::Reentered { depth } => {
                tracing::debug!(key, %owner, depth, "lock re-entered");
                true
            }
            AcquireOutcome::Held { owner: holder } => {
                tracing::trace!(key, %owner, %holder, "lock busy");
                false
            }
        }
    }
}

#[async_trait]
impl<C: Clock> LockManager for LocalLockManager<C> {
    async fn try_lock(
        &self,
        owner: &LockOwner,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> LockResult<bool> {
        validate_request(key, lease)?;

        let acquired = poll_acquire(wait, self.settings.poll_interval, || {
            std::future::ready(Ok(self.attempt(owner, key, lease)))
        })
        .await?;

        if !acquired {
            tracing::debug!(key, %owner, wait_ms = millis(wait), "lock wait timed out");
        }
        Ok(acquired)
    }

    async fn unlock(&self, owner: &LockOwner, key: &str) {
        match self.registry.release(key, owner) {
            ReleaseOutcome::Released => tracing::debug!(key, %owner, "lock released"),
            ReleaseOutcome::Decremented { remaining } => {
                tracing::debug!(key, %owner, remaining, "lock depth decremented")
            }
            ReleaseOutcome::NotHeld => {
                tracing::warn!(key, %owner, "unlock ignored: key is not locked")
            }
            ReleaseOutcome::NotOwner { owner: holder } => {
                tracing::warn!(key, %owner, %holder, "unlock ignored: key is held by another owner")
            }
            ReleaseOutcome::Expired => {
                tracing::warn!(key, %owner, "unlock after lease expired")
            }
        }
    }

    async fn is_locked(&self, key: &str) -> LockResult<bool> {
        Ok(self.registry.is_locked(key))
    }

    async fn remaining_time(&self, key: &str) -> LockResult<Option<Duration>> {
        Ok(self.registry.remaining(key))
    }

    async fn force_unlock(&self, key: &str) {
        match self.registry.force_release(key) {
            Some(entry) => tracing::info!(
                key,
                owner = %entry.owner,
                depth = entry.reentrant_count,
                "lock forcibly released"
            ),
            None => tracing::debug!(key, "force unlock: key was not locked"),
        }
    }

    async fn cleanup_expired(&self) -> LockResult<usize> {
        let swept = self.registry.sweep_expired();
        if !swept.is_empty() {
            tracing::debug!(count = swept.len(), keys = ?swept, "expired locks removed");
        }
        Ok(swept.len())
    }

    fn settings(&self) -> &LockSettings {
        &self.settings
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
