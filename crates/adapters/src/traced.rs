// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced lock manager wrapper for consistent observability

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::Instrument;
use vl_core::{millis, LockManager, LockOwner, LockResult, LockSettings};

/// Wrapper that adds a span and timing to every call on any LockManager
#[derive(Clone)]
pub struct TracedLockManager<M> {
    inner: M,
}

impl<M> TracedLockManager<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    millis(start.elapsed())
}

#[async_trait]
impl<M: LockManager> LockManager for TracedLockManager<M> {
    async fn try_lock(
        &self,
        owner: &LockOwner,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> LockResult<bool> {
        let span = tracing::info_span!("lock.try_lock", key, owner = %owner);
        async {
            tracing::debug!(
                wait_ms = millis(wait),
                lease_ms = millis(lease),
                "starting"
            );

            let start = Instant::now();
            let result = self.inner.try_lock(owner, key, wait, lease).await;
            let elapsed_ms = elapsed_ms(start);

            match &result {
                Ok(true) => tracing::info!(elapsed_ms, "lock granted"),
                Ok(false) => tracing::info!(elapsed_ms, "lock not granted within wait"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "try_lock failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn unlock(&self, owner: &LockOwner, key: &str) {
        let span = tracing::info_span!("lock.unlock", key, owner = %owner);
        async {
            let start = Instant::now();
            self.inner.unlock(owner, key).await;
            tracing::debug!(elapsed_ms = elapsed_ms(start), "unlock done");
        }
        .instrument(span)
        .await
    }

    async fn is_locked(&self, key: &str) -> LockResult<bool> {
        let span = tracing::info_span!("lock.is_locked", key);
        async {
            let result = self.inner.is_locked(key).await;
            match &result {
                Ok(locked) => tracing::debug!(locked, "checked"),
                Err(e) => tracing::error!(error = %e, "is_locked failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn remaining_time(&self, key: &str) -> LockResult<Option<Duration>> {
        let span = tracing::info_span!("lock.remaining_time", key);
        async {
            let result = self.inner.remaining_time(key).await;
            match &result {
                Ok(remaining) => tracing::debug!(
                    remaining_ms = remaining.map(millis),
                    "checked"
                ),
                Err(e) => tracing::error!(error = %e, "remaining_time failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn force_unlock(&self, key: &str) {
        let span = tracing::info_span!("lock.force_unlock", key);
        async {
            tracing::info!("forcing unlock");
            let start = Instant::now();
            self.inner.force_unlock(key).await;
            tracing::info!(elapsed_ms = elapsed_ms(start), "force unlock done");
        }
        .instrument(span)
        .await
    }

    async fn cleanup_expired(&self) -> LockResult<usize> {
        let span = tracing::info_span!("lock.cleanup_expired");
        async {
            let start = Instant::now();
            let result = self.inner.cleanup_expired().await;
            let elapsed_ms = elapsed_ms(start);
            match &result {
                Ok(removed) => tracing::info!(removed, elapsed_ms, "sweep complete"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "sweep failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn settings(&self) -> &LockSettings {
        self.inner.settings()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
