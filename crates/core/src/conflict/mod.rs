// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic concurrency: recognising version conflicts and choosing how
//! to retry them

mod classify;
mod detector;
mod error;
mod info;
mod strategy;

pub use classify::{
    ConflictClassifier, ConflictSignal, MessagePatternClassifier, VersionConflictClassifier,
};
pub use detector::ConflictDetector;
pub use error::OptimisticLockError;
pub use info::{ConflictInfo, ConflictScope, VersionConflict};
pub use strategy::{BackoffPolicy, RetryStrategy};
