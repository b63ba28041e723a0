// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured error for conflicts that outlived their retry budget

use super::info::ConflictInfo;
use super::strategy::{BackoffPolicy, RetryStrategy};
use crate::clock::millis;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An optimistic write kept conflicting
///
/// Carries everything needed to decide on manual reconciliation: the last
/// conflict seen, the strategy applied, and the underlying driver error.
#[derive(Debug, thiserror::Error)]
#[error(
    "optimistic lock conflict on {info} after {attempts}/{max_attempts} attempts ({strategy}, base delay {})",
    humantime::format_duration(.backoff.base_delay)
)]
pub struct OptimisticLockError {
    pub info: ConflictInfo,
    pub strategy: RetryStrategy,
    pub attempts: u32,
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
    #[source]
    cause: Option<BoxError>,
}

impl OptimisticLockError {
    pub fn new(info: ConflictInfo, strategy: RetryStrategy, backoff: BackoffPolicy) -> Self {
        Self {
            info,
            strategy,
            attempts: 0,
            max_attempts: 0,
            backoff,
            cause: None,
        }
    }

    pub fn with_attempts(mut self, attempts: u32, max_attempts: u32) -> Self {
        self.attempts = attempts;
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn entity_type(&self) -> &str {
        &self.info.entity_type
    }

    pub fn entity_id(&self) -> &str {
        &self.info.entity_id
    }

    pub fn expected_version(&self) -> u64 {
        self.info.expected_version
    }

    pub fn actual_version(&self) -> u64 {
        self.info.actual_version
    }

    /// Whether another attempt fits in the budget
    pub fn should_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    pub fn max_retry_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `attempt` under the recorded strategy
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(self.strategy, attempt)
    }

    pub fn retry_delay_ms(&self, attempt: u32) -> u64 {
        millis(self.retry_delay(attempt))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
