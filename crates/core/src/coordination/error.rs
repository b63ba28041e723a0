// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for lock operations

use thiserror::Error;

/// Result type for lock operations
pub type LockResult<T> = Result<T, LockError>;

/// Errors a lock manager can raise
///
/// Ordinary contention is not an error: `try_lock` reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum LockError {
    /// Caller passed an empty key or a zero lease
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The lock backend could not be reached; nothing was granted
    #[error("lock backend unavailable: {0}")]
    Unavailable(String),
}
