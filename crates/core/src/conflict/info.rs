// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict records

use serde::{Deserialize, Serialize};

/// A write was submitted against a version that is no longer current
///
/// Persistence layers raise this (directly or as the `source()` of their own
/// error type) so that conflicts can be told apart from every other failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("version conflict: expected version {expected}, found {actual}")]
pub struct VersionConflict {
    pub expected: u64,
    pub actual: u64,
}

impl VersionConflict {
    pub fn new(expected: u64, actual: u64) -> Self {
        Self { expected, actual }
    }
}

/// What the caller was doing when a conflict surfaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictScope {
    pub entity_type: String,
    pub entity_id: String,
    pub operation: String,
    /// Version the caller read, used when the error itself carries none
    pub expected_version: Option<u64>,
}

impl ConflictScope {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            operation: operation.into(),
            expected_version: None,
        }
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Diagnostic record of a failed optimistic write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub entity_type: String,
    pub entity_id: String,
    pub expected_version: u64,
    pub actual_version: u64,
    pub operation: String,
}

impl ConflictInfo {
    pub fn new(scope: &ConflictScope, expected_version: u64, actual_version: u64) -> Self {
        Self {
            entity_type: scope.entity_type.clone(),
            entity_id: scope.entity_id.clone(),
            expected_version,
            actual_version,
            operation: scope.operation.clone(),
        }
    }

    /// How many writes landed between the caller's read and its write
    pub fn version_gap(&self) -> u64 {
        self.actual_version.saturating_sub(self.expected_version)
    }
}

impl std::fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} during {}: expected version {}, found {}",
            self.entity_type, self.entity_id, self.operation, self.expected_version, self.actual_version
        )
    }
}
