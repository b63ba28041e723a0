// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod concurrency;

pub use concurrency::{
    ConcurrencyConfig, ConfigError, LockSettings, RetrySettings, StrategySettings,
    StrategyThresholds,
};
