// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock table
//!
//! A single mutex guards the whole map. It is held only for the duration of
//! one map operation, so callers waiting on a key (sleeping between polls)
//! never block anyone else. Expiry is enforced lazily on access and by
//! [`LockRegistry::sweep_expired`].

use super::lock::{AcquireOutcome, LockEntry, LockOwner, ReleaseOutcome};
use crate::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Snapshot of registry contents
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockStats {
    /// Entries present, expired or not
    pub total: usize,
    /// Entries with an unexpired lease
    pub held: usize,
    /// Entries whose lease has run out but that have not been swept yet
    pub expired: usize,
}

/// Key -> lock state map with atomic acquire/release/expire primitives
#[derive(Debug)]
pub struct LockRegistry<C: Clock = SystemClock> {
    entries: Mutex<HashMap<String, LockEntry>>,
    clock: C,
}

impl LockRegistry<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for LockRegistry<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> LockRegistry<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, LockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// One acquisition attempt
    pub fn try_acquire(&self, key: &str, owner: &LockOwner, lease: Duration) -> AcquireOutcome {
        let now = self.clock.now();
        let mut entries = self.entries();

        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(entry) if entry.is_owned_by(owner) => AcquireOutcome::Reentered {
                depth: entry.reenter(now, lease),
            },
            Some(entry) => AcquireOutcome::Held {
                owner: entry.owner.clone(),
            },
            None => {
                entries.insert(
                    key.to_string(),
                    LockEntry::new(key, owner.clone(), now, lease),
                );
                AcquireOutcome::Acquired
            }
        }
    }

    /// Release one level of `owner`'s hold on `key`
    pub fn release(&self, key: &str, owner: &LockOwner) -> ReleaseOutcome {
        let now = self.clock.now();
        let mut entries = self.entries();

        let Some(entry) = entries.get_mut(key) else {
            return ReleaseOutcome::NotHeld;
        };

        if entry.is_expired(now) {
            entries.remove(key);
            return ReleaseOutcome::Expired;
        }

        if !entry.is_owned_by(owner) {
            return ReleaseOutcome::NotOwner {
                owner: entry.owner.clone(),
            };
        }

        entry.reentrant_count -= 1;
        if entry.reentrant_count == 0 {
            entries.remove(key);
            ReleaseOutcome::Released
        } else {
            ReleaseOutcome::Decremented {
                remaining: entry.reentrant_count,
            }
        }
    }

    /// Remove `key` regardless of owner, returning what was there
    pub fn force_release(&self, key: &str) -> Option<LockEntry> {
        self.entries().remove(key)
    }

    /// True iff an unexpired entry exists
    pub fn is_locked(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries().get(key).is_some_and(|e| !e.is_expired(now))
    }

    /// Lease time left, or `None` when the key is free or expired
    pub fn remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries()
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.remaining(now))
    }

    /// Current unexpired holder of `key`
    pub fn holder(&self, key: &str) -> Option<LockOwner> {
        self.entry(key).map(|e| e.owner)
    }

    /// Copy of the unexpired entry for `key`
    pub fn entry(&self, key: &str) -> Option<LockEntry> {
        let now = self.clock.now();
        self.entries()
            .get(key)
            .filter(|e| !e.is_expired(now))
            .cloned()
    }

    /// Drop every expired entry, returning the keys removed
    pub fn sweep_expired(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut entries = self.entries();
        let expired: Vec<String> = entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.key.clone())
            .collect();
        for key in &expired {
            entries.remove(key);
        }
        expired
    }

    pub fn stats(&self) -> LockStats {
        let now = self.clock.now();
        let entries = self.entries();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        LockStats {
            total: entries.len(),
            held: entries.len() - expired,
            expired,
        }
    }

    /// Keys of all entries currently stored, expired or not
    pub fn keys(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
