//! Shared fixtures for behavioral specs

pub use std::sync::atomic::{AtomicUsize, Ordering};
pub use std::sync::Arc;
pub use std::time::Duration;
pub use vl_adapters::{FakeLockBackend, RemoteLockManager, TracedLockManager};
pub use vl_core::{
    ConcurrencyConfig, LocalLockManager, LockError, LockManager, LockOwner,
    LockSettings, RetryError, RetryExecutor, RetrySettings, RetryStrategy, VersionStamp,
    VersionedEntity,
};
pub use vl_storage::{StoreError, VersionedStore};

/// A customer's reward-point balance, the aggregate the lock and retry
/// paths protect in these scenarios
#[derive(Clone, Debug)]
pub struct RewardAccount {
    pub id: String,
    pub points: i64,
    pub stamp: VersionStamp,
}

impl RewardAccount {
    pub fn new(id: &str, points: i64) -> Self {
        Self {
            id: id.to_string(),
            points,
            stamp: VersionStamp::new(),
        }
    }
}

impl VersionedEntity for RewardAccount {
    const ENTITY_TYPE: &'static str = "reward_account";

    fn entity_id(&self) -> &str {
        &self.id
    }

    fn stamp(&self) -> &VersionStamp {
        &self.stamp
    }

    fn stamp_mut(&mut self) -> &mut VersionStamp {
        &mut self.stamp
    }
}

/// Store seeded with one account at version 1
pub fn seeded_store(id: &str, points: i64) -> Arc<VersionedStore<RewardAccount>> {
    let store = Arc::new(VersionedStore::new());
    store.insert(RewardAccount::new(id, points)).unwrap();
    store
}

/// Read-modify-write that yields between the read and the write so
/// concurrent callers interleave
pub async fn add_points(
    store: &VersionedStore<RewardAccount>,
    id: &str,
    delta: i64,
) -> Result<RewardAccount, StoreError> {
    let mut account = store.find(id).ok_or_else(|| StoreError::NotFound {
        entity_type: RewardAccount::ENTITY_TYPE,
        id: id.to_string(),
    })?;
    tokio::task::yield_now().await;
    account.points += delta;
    store.update(account)
}
