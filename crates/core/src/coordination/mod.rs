// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutual exclusion over named keys
//!
//! This module provides:
//! - **LockRegistry** - In-process key table with atomic acquire/release/expire
//! - **LockManager** - Try-lock/unlock contract shared by local and remote managers
//! - **LocalLockManager** - Polling manager over a `LockRegistry`
//! - **LockMaintenance** - Periodic sweep of expired entries

pub mod error;
pub mod local;
pub mod lock;
pub mod maintenance;
pub mod manager;
pub mod registry;

pub use error::{LockError, LockResult};
pub use local::LocalLockManager;
pub use lock::{
    saturating_deadline, AcquireOutcome, LockEntry, LockOwner, ReleaseOutcome, MAX_HORIZON,
};
pub use maintenance::{LockMaintenance, MaintenanceHandle};
pub use manager::{poll_acquire, validate_request, LockManager};
pub use registry::{LockRegistry, LockStats};
