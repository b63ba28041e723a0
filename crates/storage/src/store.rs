// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store with optimistic version checks

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use vl_core::{Clock, SystemClock, VersionConflict, VersionedEntity};

/// Errors raised by [`VersionedStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity_type} {id} already exists")]
    Duplicate { entity_type: &'static str, id: String },
    #[error("{entity_type} {id} was already persisted; use update")]
    AlreadyPersisted { entity_type: &'static str, id: String },
    #[error("{entity_type} {id} has never been persisted; use insert")]
    NotPersisted { entity_type: &'static str, id: String },
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: &'static str, id: String },
    #[error("{entity_type} {id} was modified concurrently")]
    Conflict {
        entity_type: &'static str,
        id: String,
        #[source]
        source: VersionConflict,
    },
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Keyed entity table that rejects writes made against a stale version
///
/// The version check and the write happen under one lock, so two writers
/// that read the same version can never both succeed.
pub struct VersionedStore<E: VersionedEntity, C: Clock = SystemClock> {
    rows: Mutex<HashMap<String, E>>,
    clock: C,
}

impl<E: VersionedEntity> VersionedStore<E> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<E: VersionedEntity> Default for VersionedStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: VersionedEntity, C: Clock> VersionedStore<E, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<String, E>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Persist a new entity as version 1
    pub fn insert(&self, mut entity: E) -> Result<E, StoreError> {
        let id = entity.entity_id().to_string();
        if !entity.is_new() {
            return Err(StoreError::AlreadyPersisted {
                entity_type: E::ENTITY_TYPE,
                id,
            });
        }

        let mut rows = self.rows();
        if rows.contains_key(&id) {
            return Err(StoreError::Duplicate {
                entity_type: E::ENTITY_TYPE,
                id,
            });
        }
        entity.stamp_mut().on_create(self.clock.utc_now());
        rows.insert(id.clone(), entity.clone());
        tracing::debug!(entity_type = E::ENTITY_TYPE, id, "inserted");
        Ok(entity)
    }

    pub fn find(&self, id: &str) -> Option<E> {
        self.rows().get(id).cloned()
    }

    /// Write `entity` if its version still matches the stored one
    ///
    /// Returns the stored copy with its version advanced by one. The stored
    /// creation time always wins over whatever the caller submitted.
    pub fn update(&self, entity: E) -> Result<E, StoreError> {
        let id = entity.entity_id().to_string();
        let Some(submitted) = entity.version() else {
            return Err(StoreError::NotPersisted {
                entity_type: E::ENTITY_TYPE,
                id,
            });
        };

        let mut rows = self.rows();
        let Some(stored) = rows.get(&id) else {
            return Err(StoreError::NotFound {
                entity_type: E::ENTITY_TYPE,
                id,
            });
        };
        let current = stored.version().unwrap_or(0);
        if current != submitted {
            tracing::debug!(
                entity_type = E::ENTITY_TYPE,
                id,
                expected = submitted,
                actual = current,
                "stale write rejected"
            );
            return Err(StoreError::Conflict {
                entity_type: E::ENTITY_TYPE,
                id,
                source: VersionConflict::new(submitted, current),
            });
        }

        let mut next = entity;
        *next.stamp_mut() = stored.stamp().clone();
        let version = next.stamp_mut().on_update(self.clock.utc_now());
        rows.insert(id.clone(), next.clone());
        tracing::debug!(entity_type = E::ENTITY_TYPE, id, version, "updated");
        Ok(next)
    }

    /// Remove an entity if it is still at `expected_version`
    pub fn delete(&self, id: &str, expected_version: u64) -> Result<E, StoreError> {
        let mut rows = self.rows();
        let Some(stored) = rows.get(id) else {
            return Err(StoreError::NotFound {
                entity_type: E::ENTITY_TYPE,
                id: id.to_string(),
            });
        };
        let current = stored.version().unwrap_or(0);
        if current != expected_version {
            return Err(StoreError::Conflict {
                entity_type: E::ENTITY_TYPE,
                id: id.to_string(),
                source: VersionConflict::new(expected_version, current),
            });
        }
        let removed = rows.remove(id).ok_or_else(|| StoreError::NotFound {
            entity_type: E::ENTITY_TYPE,
            id: id.to_string(),
        })?;
        tracing::debug!(entity_type = E::ENTITY_TYPE, id, "deleted");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
