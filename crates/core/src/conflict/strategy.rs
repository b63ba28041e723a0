// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry strategies and the backoff math behind them

use crate::config::RetrySettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long to wait before re-running a conflicting operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    /// Retry at once; the competing write has most likely finished
    Immediate,
    /// `attempt * base`
    LinearBackoff,
    /// `base * 2^(attempt - 1)`
    ExponentialBackoff,
}

impl RetryStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RetryStrategy::Immediate => "immediate",
            RetryStrategy::LinearBackoff => "linear_backoff",
            RetryStrategy::ExponentialBackoff => "exponential_backoff",
        }
    }
}

impl std::fmt::Display for RetryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Delay computation shared by the executor and hand-written retry loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for BackoffPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            base_delay: settings.base_delay,
            max_delay: settings.max_delay,
        }
    }
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }

    /// Delay after the `attempt`-th failure (1-based), capped at `max_delay`
    pub fn delay(&self, strategy: RetryStrategy, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let raw = match strategy {
            RetryStrategy::Immediate => Duration::ZERO,
            RetryStrategy::LinearBackoff => self.base_delay.saturating_mul(attempt),
            RetryStrategy::ExponentialBackoff => {
                let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
        };
        raw.min(self.max_delay)
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
