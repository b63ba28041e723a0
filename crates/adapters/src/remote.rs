// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock manager over a shared backend
//!
//! Backend failures surface as [`LockError::Unavailable`] and are never
//! mistaken for a grant, so callers can fall back deliberately instead of
//! entering a critical section nobody else knows about.

use crate::backend::{BackendError, LockBackend};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vl_core::coordination::{poll_acquire, validate_request};
use vl_core::{
    millis, AcquireOutcome, LockError, LockManager, LockOwner, LockResult, LockSettings,
    ReleaseOutcome,
};

/// [`LockManager`] for locks shared between service instances
pub struct RemoteLockManager<B: LockBackend> {
    backend: Arc<B>,
    settings: LockSettings,
}

impl<B: LockBackend> Clone for RemoteLockManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            settings: self.settings.clone(),
        }
    }
}

impl<B: LockBackend> RemoteLockManager<B> {
    pub fn new(backend: B, settings: LockSettings) -> Self {
        Self::with_backend(Arc::new(backend), settings)
    }

    pub fn with_backend(backend: Arc<B>, settings: LockSettings) -> Self {
        Self { backend, settings }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    async fn attempt(&self, owner: &LockOwner, key: &str, lease: Duration) -> LockResult<bool> {
        match self.backend.acquire(key, owner, lease).await {
            Ok(AcquireOutcome::Acquired) => {
                tracing::debug!(key, %owner, lease_ms = millis(lease), "remote lock acquired");
                Ok(true)
            }
            Ok(AcquireOutcome::Reentered { depth }) => {
                tracing::debug!(key, %owner, depth, "remote lock re-entered");
                Ok(true)
            }
            Ok(AcquireOutcome::Held { owner: holder }) => {
                tracing::trace!(key, %owner, %holder, "remote lock busy");
                Ok(false)
            }
            Err(e) => {
                tracing::error!(key, %owner, error = %e, "lock backend failed during acquire");
                Err(unavailable(e))
            }
        }
    }
}

fn unavailable(err: BackendError) -> LockError {
    LockError::Unavailable(err.to_string())
}

#[async_trait]
impl<B: LockBackend> LockManager for RemoteLockManager<B> {
    async fn try_lock(
        &self,
        owner: &LockOwner,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> LockResult<bool> {
        validate_request(key, lease)?;

        let acquired = poll_acquire(wait, self.settings.poll_interval, || {
            self.attempt(owner, key, lease)
        })
        .await?;

        if !acquired {
            tracing::debug!(key, %owner, wait_ms = millis(wait), "remote lock wait timed out");
        }
        Ok(acquired)
    }

    async fn unlock(&self, owner: &LockOwner, key: &str) {
        match self.backend.release(key, owner).await {
            Ok(ReleaseOutcome::Released) => tracing::debug!(key, %owner, "remote lock released"),
            Ok(ReleaseOutcome::Decremented { remaining }) => {
                tracing::debug!(key, %owner, remaining, "remote lock depth decremented")
            }
            Ok(ReleaseOutcome::NotHeld) => {
                tracing::warn!(key, %owner, "unlock ignored: key is not locked")
            }
            Ok(ReleaseOutcome::NotOwner { owner: holder }) => {
                tracing::warn!(key, %owner, %holder, "unlock ignored: key is held by another owner")
            }
            Ok(ReleaseOutcome::Expired) => {
                tracing::warn!(key, %owner, "unlock after lease expired")
            }
            Err(e) => {
                tracing::error!(key, %owner, error = %e, "unlock failed; lease will expire")
            }
        }
    }

    async fn is_locked(&self, key: &str) -> LockResult<bool> {
        Ok(self.remaining_time(key).await?.is_some())
    }

    async fn remaining_time(&self, key: &str) -> LockResult<Option<Duration>> {
        self.backend.remaining(key).await.map_err(unavailable)
    }

    async fn force_unlock(&self, key: &str) {
        match self.backend.force_release(key).await {
            Ok(true) => tracing::info!(key, "remote lock forcibly released"),
            Ok(false) => tracing::debug!(key, "force unlock: key was not locked"),
            Err(e) => tracing::error!(key, error = %e, "force unlock failed"),
        }
    }

    async fn cleanup_expired(&self) -> LockResult<usize> {
        self.backend.purge_expired().await.map_err(unavailable)
    }

    fn settings(&self) -> &LockSettings {
        &self.settings
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
