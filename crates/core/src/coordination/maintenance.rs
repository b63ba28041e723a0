// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic expiry sweep for lock managers
//!
//! Expiry is already enforced lazily whenever a key is touched; the sweep
//! only reclaims memory held by keys nobody asks about again.

use super::manager::LockManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Background maintenance for a lock manager
pub struct LockMaintenance<M: LockManager + ?Sized> {
    manager: Arc<M>,
    interval: Duration,
}

impl<M: LockManager + ?Sized + 'static> LockMaintenance<M> {
    /// Sweep at the manager's configured `cleanup_interval`
    pub fn new(manager: Arc<M>) -> Self {
        let interval = manager.settings().cleanup_interval;
        Self { manager, interval }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Get the maintenance interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep, returning how many entries were removed
    ///
    /// Failures are logged and reported as zero so a flaky backend never
    /// stops the loop.
    pub async fn tick(&self) -> usize {
        match self.manager.cleanup_expired().await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "expired lock sweep failed");
                0
            }
        }
    }

    /// Run [`tick`](Self::tick) every interval on a background task
    pub fn spawn(self) -> MaintenanceHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately; skip it so sweeps are spaced
            ticker.tick().await;
            let mut total = 0usize;
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let removed = self.tick().await;
                        total += removed;
                        if removed > 0 {
                            tracing::debug!(removed, total, "lock maintenance sweep");
                        }
                    }
                }
            }
            total
        });
        MaintenanceHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a running maintenance loop
pub struct MaintenanceHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<usize>,
}

impl MaintenanceHandle {
    /// Stop the loop and return the number of entries it removed
    pub async fn shutdown(mut self) -> usize {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(total) => total,
            Err(e) => {
                tracing::warn!(error = %e, "lock maintenance task ended abnormally");
                0
            }
        }
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
