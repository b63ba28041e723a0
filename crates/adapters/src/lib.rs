// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Lock backends and manager wrappers

pub mod backend;
pub mod remote;
pub mod traced;

pub use backend::{BackendError, LockBackend};
pub use remote::RemoteLockManager;
pub use traced::TracedLockManager;

#[cfg(feature = "redis-backend")]
pub use backend::RedisLockBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use backend::{BackendCall, FakeLockBackend};
