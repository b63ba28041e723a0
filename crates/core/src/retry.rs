// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Automatic retry of optimistic writes
//!
//! Each attempt is an independent read-modify-write supplied by the caller.
//! The executor holds nothing between attempts and never spawns; a conflict
//! only costs the backoff sleep chosen from the version gap.

use crate::clock::millis;
use crate::config::ConcurrencyConfig;
use crate::conflict::{
    BackoffPolicy, ConflictDetector, ConflictScope, OptimisticLockError,
};
use std::future::Future;
use std::sync::Arc;

/// Why a retried operation gave up
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Every attempt hit a version conflict
    #[error(transparent)]
    Exhausted(OptimisticLockError),
    /// The operation failed for a reason other than a conflict
    #[error(transparent)]
    Operation(E),
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted(_))
    }

    pub fn conflict(&self) -> Option<&OptimisticLockError> {
        match self {
            RetryError::Exhausted(err) => Some(err),
            RetryError::Operation(_) => None,
        }
    }

    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Exhausted(_) => None,
        }
    }
}

/// Runs operations, retrying the ones that fail with a version conflict
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    detector: Arc<ConflictDetector>,
    backoff: BackoffPolicy,
    max_attempts: u32,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::from_config(&ConcurrencyConfig::default())
    }
}

impl RetryExecutor {
    pub fn new(detector: Arc<ConflictDetector>, backoff: BackoffPolicy, max_attempts: u32) -> Self {
        Self {
            detector,
            backoff,
            max_attempts,
        }
    }

    pub fn from_config(config: &ConcurrencyConfig) -> Self {
        Self::new(
            Arc::new(ConflictDetector::from_settings(config.strategy.clone())),
            BackoffPolicy::from(&config.retry),
            config.retry.max_attempts,
        )
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Default attempt budget used by [`execute`](Self::execute)
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` with the configured attempt budget
    pub async fn execute<T, E, F, Fut>(
        &self,
        scope: &ConflictScope,
        op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.retry_loop(scope, self.max_attempts, op).await
    }

    /// Run `op`, retrying conflicts up to `max_attempts` invocations in total
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        op: F,
        entity_type: &str,
        entity_id: &str,
        label: &str,
        max_attempts: u32,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let scope = ConflictScope::new(entity_type, entity_id, label);
        self.retry_loop(&scope, max_attempts, op).await
    }

    /// [`execute_with_retry`](Self::execute_with_retry) for operations run
    /// only for their side effects
    pub async fn run_with_retry<E, F, Fut>(
        &self,
        op: F,
        entity_type: &str,
        entity_id: &str,
        label: &str,
        max_attempts: u32,
    ) -> Result<(), RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.execute_with_retry(op, entity_type, entity_id, label, max_attempts)
            .await
    }

    async fn retry_loop<T, E, F, Fut>(
        &self,
        scope: &ConflictScope,
        max_attempts: u32,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        // Always make at least one attempt
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(
                            entity_type = %scope.entity_type,
                            entity_id = %scope.entity_id,
                            operation = %scope.operation,
                            attempt,
                            "succeeded after conflict retries"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let Some(info) = self.detector.detect_conflict(&err, scope) else {
                return Err(RetryError::Operation(err));
            };
            let strategy = self.detector.suggest_retry_strategy(&info);

            if attempt >= max_attempts {
                tracing::warn!(
                    entity_type = %info.entity_type,
                    entity_id = %info.entity_id,
                    operation = %info.operation,
                    expected_version = info.expected_version,
                    actual_version = info.actual_version,
                    %strategy,
                    attempts = attempt,
                    "conflict retries exhausted"
                );
                return Err(RetryError::Exhausted(
                    OptimisticLockError::new(info, strategy, self.backoff)
                        .with_attempts(attempt, max_attempts)
                        .with_source(err),
                ));
            }

            let delay = self.backoff.delay(strategy, attempt);
            tracing::debug!(
                entity_type = %info.entity_type,
                entity_id = %info.entity_id,
                operation = %info.operation,
                gap = info.version_gap(),
                %strategy,
                attempt,
                delay_ms = millis(delay),
                "version conflict, retrying"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
