// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Base shape for aggregates under optimistic locking

use crate::conflict::ConflictScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version counter and audit timestamps carried by every versioned entity
///
/// Unpersisted stamps have no version. The first write sets version 1 and
/// every later write advances it by exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStamp {
    version: Option<u64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl VersionStamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Not yet persisted
    pub fn is_new(&self) -> bool {
        self.version.is_none()
    }

    /// Stamp the first write, returning the new version
    ///
    /// Already-persisted stamps are left untouched.
    pub fn on_create(&mut self, now: DateTime<Utc>) -> u64 {
        if let Some(version) = self.version {
            return version;
        }
        self.version = Some(1);
        self.created_at = Some(now);
        self.updated_at = Some(now);
        1
    }

    /// Stamp a subsequent write, returning the new version
    pub fn on_update(&mut self, now: DateTime<Utc>) -> u64 {
        let Some(version) = self.version else {
            return self.on_create(now);
        };
        let next = version.saturating_add(1);
        self.version = Some(next);
        // Wall clocks can step backwards; keep updated_at >= created_at
        self.updated_at = Some(match self.created_at {
            Some(created) if now < created => created,
            _ => now,
        });
        next
    }
}

/// An aggregate whose writes are guarded by a version check
pub trait VersionedEntity: Clone + Send + Sync + 'static {
    /// Type name used in conflict diagnostics and strategy overrides
    const ENTITY_TYPE: &'static str;

    fn entity_id(&self) -> &str;

    fn stamp(&self) -> &VersionStamp;

    fn stamp_mut(&mut self) -> &mut VersionStamp;

    fn version(&self) -> Option<u64> {
        self.stamp().version()
    }

    fn is_new(&self) -> bool {
        self.stamp().is_new()
    }

    /// Scope describing `operation` on this entity at its current version
    fn conflict_scope(&self, operation: &str) -> ConflictScope {
        let scope = ConflictScope::new(Self::ENTITY_TYPE, self.entity_id(), operation);
        match self.version() {
            Some(version) => scope.with_expected_version(version),
            None => scope,
        }
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
