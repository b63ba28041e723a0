// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote lock backends

#[cfg(feature = "redis-backend")]
mod redis;
#[cfg(feature = "redis-backend")]
pub use redis::RedisLockBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeLockBackend};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use vl_core::{AcquireOutcome, LockOwner, ReleaseOutcome};

/// Errors from lock backend operations
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend protocol error: {0}")]
    Protocol(String),
}

/// Shared lock store reachable from every service instance
///
/// Each method must be a single atomic operation on the backend so that two
/// instances racing for a key can never both be granted it.
#[async_trait]
pub trait LockBackend: Send + Sync + 'static {
    /// Acquire or re-enter `key` for `owner`, leasing it for `lease`
    async fn acquire(
        &self,
        key: &str,
        owner: &LockOwner,
        lease: Duration,
    ) -> Result<AcquireOutcome, BackendError>;

    /// Release one level of `owner`'s hold on `key`
    async fn release(&self, key: &str, owner: &LockOwner) -> Result<ReleaseOutcome, BackendError>;

    /// Remove `key` regardless of owner, returning whether it existed
    async fn force_release(&self, key: &str) -> Result<bool, BackendError>;

    /// Time left on `key`'s lease, `None` when it is not held
    async fn remaining(&self, key: &str) -> Result<Option<Duration>, BackendError>;

    /// Drop expired entries the backend does not expire on its own
    async fn purge_expired(&self) -> Result<usize, BackendError>;
}
