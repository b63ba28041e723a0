//! In-process mutual exclusion, reentrancy and expiry

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_callers_on_one_account_all_get_their_turn() {
    let manager = Arc::new(LocalLockManager::default());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let callers: Vec<_> = (0..5)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            tokio::spawn(async move {
                let owner = LockOwner::new(format!("caller-{i}"));
                let acquired = manager
                    .try_lock(&owner, "acct-1", Duration::from_secs(1), Duration::from_secs(5))
                    .await
                    .unwrap();
                if !acquired {
                    return false;
                }

                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                inside.fetch_sub(1, Ordering::SeqCst);

                manager.unlock(&owner, "acct-1").await;
                true
            })
        })
        .collect();

    for caller in callers {
        assert!(caller.await.unwrap(), "every caller should eventually acquire");
    }
    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert!(!manager.is_locked("acct-1").await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_attempts_grant_exactly_one_owner() {
    let manager = Arc::new(LocalLockManager::default());

    let attempts: Vec<_> = (0..16)
        .map(|i| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager
                    .try_lock(
                        &LockOwner::new(format!("owner-{i}")),
                        "acct-1",
                        Duration::ZERO,
                        Duration::from_secs(30),
                    )
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut granted = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            granted += 1;
        }
    }
    assert_eq!(granted, 1);
}

#[tokio::test]
async fn same_owner_nests_and_unwinds() {
    let manager = LocalLockManager::default();
    let owner = LockOwner::random();
    let lease = Duration::from_secs(5);

    assert!(manager.try_lock(&owner, "acct-1", Duration::ZERO, lease).await.unwrap());
    assert!(manager.try_lock(&owner, "acct-1", Duration::ZERO, lease).await.unwrap());

    manager.unlock(&owner, "acct-1").await;
    assert!(manager.is_locked("acct-1").await.unwrap());
    manager.unlock(&owner, "acct-1").await;
    assert!(!manager.is_locked("acct-1").await.unwrap());
}

#[tokio::test]
async fn abandoned_lock_is_reclaimed_after_lease() {
    let manager = LocalLockManager::default();
    let crashed = LockOwner::new("crashed");
    manager
        .try_lock(&crashed, "acct-1", Duration::ZERO, Duration::from_millis(50))
        .await
        .unwrap();

    let next = LockOwner::new("next");
    let acquired = manager
        .try_lock(&next, "acct-1", Duration::from_secs(1), Duration::from_secs(5))
        .await
        .unwrap();

    assert!(acquired);
    // The late unlock from the crashed owner must not release the new holder
    manager.unlock(&crashed, "acct-1").await;
    assert!(manager.is_locked("acct-1").await.unwrap());
}

#[tokio::test]
async fn foreign_unlock_and_unheld_unlock_are_harmless() {
    let manager = LocalLockManager::default();
    let holder = LockOwner::new("holder");
    manager
        .try_lock(&holder, "acct-1", Duration::ZERO, Duration::from_secs(5))
        .await
        .unwrap();

    manager.unlock(&LockOwner::new("intruder"), "acct-1").await;
    manager.unlock(&holder, "acct-never-locked").await;

    assert!(manager.is_locked("acct-1").await.unwrap());
    let remaining = manager.remaining_time("acct-1").await.unwrap().unwrap();
    assert!(remaining <= Duration::from_secs(5));
    assert_eq!(manager.remaining_time("acct-never-locked").await.unwrap(), None);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let manager = LocalLockManager::default();
    let owner = LockOwner::new("a");

    assert!(matches!(
        manager.try_lock(&owner, "", Duration::ZERO, Duration::from_secs(1)).await,
        Err(LockError::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.try_lock(&owner, "acct-1", Duration::ZERO, Duration::ZERO).await,
        Err(LockError::InvalidArgument(_))
    ));
}
