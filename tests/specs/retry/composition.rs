//! Pessimistic lock around an optimistic, retried write

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn locked_retried_writes_never_exhaust() {
    let store = seeded_store("acct-1", 100);
    let manager = Arc::new(LocalLockManager::default());
    let executor = Arc::new(RetryExecutor::from_config(&ConcurrencyConfig {
        retry: RetrySettings::default().with_base_delay(Duration::from_millis(5)),
        ..ConcurrencyConfig::default()
    }));

    let tasks: Vec<_> = (0..5)
        .map(|i| {
            let store = Arc::clone(&store);
            let manager = Arc::clone(&manager);
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                let owner = LockOwner::new(format!("worker-{i}"));
                assert!(manager
                    .try_lock(&owner, "acct-1", Duration::from_secs(2), Duration::from_secs(5))
                    .await
                    .unwrap());

                let result = executor
                    .execute_with_retry(
                        || add_points(&store, "acct-1", -10),
                        RewardAccount::ENTITY_TYPE,
                        "acct-1",
                        "redeem",
                        1,
                    )
                    .await;

                manager.unlock(&owner, "acct-1").await;
                result.map(|account| account.version())
            })
        })
        .collect();

    for task in tasks {
        // A single attempt suffices: the lock serialises writers
        assert!(task.await.unwrap().is_ok());
    }

    let account = store.find("acct-1").unwrap();
    assert_eq!(account.points, 50);
    assert_eq!(account.version(), Some(6));
}
