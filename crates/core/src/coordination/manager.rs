// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock manager contract shared by in-process and remote implementations

use super::error::{LockError, LockResult};
use super::lock::{saturating_deadline, LockOwner};
use crate::config::LockSettings;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Mutual exclusion over named keys with lease-based expiry
///
/// ## Behavior
/// - Acquisition is reentrant: the same [`LockOwner`] may nest critical
///   sections on one key and must unlock once per successful `try_lock`.
/// - A lease bounds how long a key stays held without an explicit unlock.
/// - `unlock` and `force_unlock` never fail, so they are safe on cleanup
///   paths.
/// - Dropping a pending `try_lock` future abandons the wait without leaving
///   a partial acquisition behind.
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Try to acquire `key` within `wait`, holding it for at most `lease`.
    ///
    /// ## Returns
    /// - `Ok(true)`: acquired (or re-entered)
    /// - `Ok(false)`: still held by someone else when `wait` ran out
    /// - `Err(LockError::InvalidArgument)`: empty key or zero lease
    ///
    /// Waits and leases longer than [`MAX_HORIZON`](super::lock::MAX_HORIZON)
    /// are clamped to it, so `Duration::MAX` reads as "effectively forever".
    /// - `Err(LockError::Unavailable)`: backend unreachable
    async fn try_lock(
        &self,
        owner: &LockOwner,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> LockResult<bool>;

    /// Release one level of `owner`'s hold on `key`.
    async fn unlock(&self, owner: &LockOwner, key: &str);

    /// True iff an unexpired lock exists for `key`.
    async fn is_locked(&self, key: &str) -> LockResult<bool>;

    /// Time until `key` expires, `None` when it is not locked.
    async fn remaining_time(&self, key: &str) -> LockResult<Option<Duration>>;

    /// Remove `key` whoever holds it. Operational recovery only.
    async fn force_unlock(&self, key: &str);

    /// Drop expired entries, returning how many were removed.
    async fn cleanup_expired(&self) -> LockResult<usize>;

    /// Defaults used by [`LockManager::try_lock_default`].
    fn settings(&self) -> &LockSettings;

    /// `try_lock` with the configured default wait and lease.
    async fn try_lock_default(&self, owner: &LockOwner, key: &str) -> LockResult<bool> {
        let wait = self.settings().default_wait;
        let lease = self.settings().default_lease;
        self.try_lock(owner, key, wait, lease).await
    }
}

/// Reject requests that can never be satisfied
pub fn validate_request(key: &str, lease: Duration) -> LockResult<()> {
    if key.is_empty() {
        return Err(LockError::InvalidArgument("lock key must not be empty".into()));
    }
    if lease.is_zero() {
        return Err(LockError::InvalidArgument(format!(
            "lease for {key} must be positive"
        )));
    }
    Ok(())
}

/// Repeat `attempt` every `interval` until it succeeds or `wait` elapses
///
/// One attempt is always made, even with a zero wait. Nothing is held while
/// sleeping; the final attempt happens at the deadline.
pub async fn poll_acquire<F, Fut>(wait: Duration, interval: Duration, mut attempt: F) -> LockResult<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LockResult<bool>>,
{
    let deadline = Instant::from_std(saturating_deadline(Instant::now().into_std(), wait));
    loop {
        if attempt().await? {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
