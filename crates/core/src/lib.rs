// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vl-core: concurrency control primitives for Versalock
//!
//! This crate provides:
//! - Reentrant, lease-bounded locks over named keys (pessimistic path)
//! - Version conflict detection and strategy selection (optimistic path)
//! - A retry executor that re-runs conflicting writes with backoff
//! - The versioned-entity shape shared by persistence layers

pub mod clock;
pub mod config;
pub mod conflict;
pub mod coordination;
pub mod entity;
pub mod retry;

pub use clock::{millis, Clock, FakeClock, SystemClock};
pub use config::{
    ConcurrencyConfig, ConfigError, LockSettings, RetrySettings, StrategySettings,
    StrategyThresholds,
};
pub use conflict::{
    BackoffPolicy, ConflictClassifier, ConflictDetector, ConflictInfo, ConflictScope,
    ConflictSignal, MessagePatternClassifier, OptimisticLockError, RetryStrategy,
    VersionConflict, VersionConflictClassifier,
};
pub use coordination::{
    AcquireOutcome, LocalLockManager, LockEntry, LockError, LockMaintenance, LockManager,
    LockOwner, LockRegistry, LockResult, LockStats, MaintenanceHandle, ReleaseOutcome, MAX_HORIZON,
};
pub use entity::{VersionStamp, VersionedEntity};
pub use retry::{RetryError, RetryExecutor};
