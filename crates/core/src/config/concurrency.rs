// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables for locking and conflict retry
//!
//! Every section falls back to its defaults, so a config file only needs the
//! values it wants to change:
//!
//! ```toml
//! [locks]
//! default_lease = "5s"
//! poll_interval = "10ms"
//!
//! [retry]
//! max_attempts = 5
//! base_delay = "50ms"
//!
//! [strategy.per_entity.reward_account]
//! immediate_max_gap = 2
//! linear_max_gap = 10
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for the concurrency core
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub locks: LockSettings,
    pub retry: RetrySettings,
    pub strategy: StrategySettings,
}

impl ConcurrencyConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locks.validate()?;
        self.retry.validate()?;
        self.strategy.validate()
    }
}

/// Lock manager defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Wait budget used by `try_lock_default`
    #[serde(with = "humantime_serde")]
    pub default_wait: Duration,
    /// Lease used by `try_lock_default`
    #[serde(with = "humantime_serde")]
    pub default_lease: Duration,
    /// Sleep between acquisition attempts
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// How often the maintenance task sweeps expired entries
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            default_wait: Duration::from_secs(1),
            default_lease: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl LockSettings {
    pub fn with_default_wait(mut self, wait: Duration) -> Self {
        self.default_wait = wait;
        self
    }

    pub fn with_default_lease(mut self, lease: Duration) -> Self {
        self.default_lease = lease;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("locks.poll_interval must be positive".into()));
        }
        if self.default_lease.is_zero() {
            return Err(ConfigError::Invalid("locks.default_lease must be positive".into()));
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "locks.cleanup_interval must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Retry executor defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Unit delay for linear and exponential backoff
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetrySettings {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::Invalid(
                "retry.max_delay must not be smaller than retry.base_delay".into(),
            ));
        }
        Ok(())
    }
}

/// Version-gap boundaries between retry strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyThresholds {
    /// Largest gap still retried immediately
    pub immediate_max_gap: u64,
    /// Largest gap retried with linear backoff; anything above is exponential
    pub linear_max_gap: u64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            immediate_max_gap: 1,
            linear_max_gap: 5,
        }
    }
}

impl StrategyThresholds {
    pub fn new(immediate_max_gap: u64, linear_max_gap: u64) -> Self {
        Self {
            immediate_max_gap,
            linear_max_gap,
        }
    }
}

/// Strategy selection policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Thresholds applied to entity types without an override
    pub default: StrategyThresholds,
    /// Overrides keyed by entity type
    pub per_entity: HashMap<String, StrategyThresholds>,
    /// Error-message fragments that identify conflicts raised by foreign drivers
    pub conflict_patterns: Vec<String>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            default: StrategyThresholds::default(),
            per_entity: HashMap::new(),
            conflict_patterns: vec![
                "optimistic lock".to_string(),
                "version conflict".to_string(),
                "stale write".to_string(),
            ],
        }
    }
}

impl StrategySettings {
    /// Thresholds for an entity type, falling back to the default
    pub fn thresholds_for(&self, entity_type: &str) -> StrategyThresholds {
        self.per_entity
            .get(entity_type)
            .copied()
            .unwrap_or(self.default)
    }

    pub fn with_override(mut self, entity_type: impl Into<String>, thresholds: StrategyThresholds) -> Self {
        self.per_entity.insert(entity_type.into(), thresholds);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let check = |name: &str, t: &StrategyThresholds| {
            if t.immediate_max_gap > t.linear_max_gap {
                Err(ConfigError::Invalid(format!(
                    "strategy thresholds for {name}: immediate_max_gap ({}) exceeds linear_max_gap ({})",
                    t.immediate_max_gap, t.linear_max_gap
                )))
            } else {
                Ok(())
            }
        };
        check("default", &self.default)?;
        for (entity_type, thresholds) in &self.per_entity {
            check(entity_type, thresholds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;
