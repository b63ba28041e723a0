//! Locks shared between service instances through a backend

use crate::prelude::*;

fn instance(backend: &FakeLockBackend) -> TracedLockManager<RemoteLockManager<FakeLockBackend>> {
    TracedLockManager::new(RemoteLockManager::new(backend.clone(), LockSettings::default()))
}

#[tokio::test]
async fn instances_sharing_a_backend_exclude_each_other() {
    let backend = FakeLockBackend::new();
    let east = instance(&backend);
    let west = instance(&backend);
    let lease = Duration::from_secs(5);

    let east_owner = LockOwner::random();
    let west_owner = LockOwner::random();
    assert!(east.try_lock(&east_owner, "acct-1", Duration::ZERO, lease).await.unwrap());
    assert!(!west
        .try_lock(&west_owner, "acct-1", Duration::from_millis(30), lease)
        .await
        .unwrap());

    east.unlock(&east_owner, "acct-1").await;
    assert!(west.try_lock(&west_owner, "acct-1", Duration::ZERO, lease).await.unwrap());
}

#[tokio::test]
async fn backend_outage_is_unavailable_never_a_grant() {
    let backend = FakeLockBackend::new();
    let manager = instance(&backend);
    backend.set_available(false);

    let result = manager
        .try_lock(&LockOwner::random(), "acct-1", Duration::from_millis(100), Duration::from_secs(5))
        .await;

    assert!(matches!(result, Err(LockError::Unavailable(_))));
    assert!(backend.registry().is_empty());
}

#[tokio::test]
async fn callers_can_fall_back_to_local_locking_on_outage() {
    let backend = FakeLockBackend::new();
    let remote = instance(&backend);
    let local = LocalLockManager::default();
    backend.set_available(false);

    let owner = LockOwner::random();
    let lease = Duration::from_secs(5);
    let acquired = match remote.try_lock(&owner, "acct-1", Duration::ZERO, lease).await {
        Err(LockError::Unavailable(_)) => local.try_lock(&owner, "acct-1", Duration::ZERO, lease).await,
        other => other,
    };

    assert!(acquired.unwrap());
    assert!(local.is_locked("acct-1").await.unwrap());
}
