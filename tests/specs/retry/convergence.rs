//! Optimistic writers converging through the retry executor

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn three_concurrent_writers_all_land() {
    let store = seeded_store("acct-1", 0);
    let executor = Arc::new(RetryExecutor::default());

    let writers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                executor
                    .execute_with_retry(
                        || add_points(&store, "acct-1", 10),
                        RewardAccount::ENTITY_TYPE,
                        "acct-1",
                        "add_points",
                        3,
                    )
                    .await
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let account = store.find("acct-1").unwrap();
    assert_eq!(account.version(), Some(4));
    assert_eq!(account.points, 30);
}

#[tokio::test(start_paused = true)]
async fn persistent_contention_exhausts_with_diagnostics() {
    let store = seeded_store("acct-1", 0);
    let executor = RetryExecutor::default();
    let stale = store.find("acct-1").unwrap();
    // Someone else always wrote first
    store.update(stale.clone()).unwrap();

    let err = executor
        .execute(&stale.conflict_scope("add_points"), || {
            let store = Arc::clone(&store);
            let stale = stale.clone();
            async move { store.update(stale) }
        })
        .await
        .unwrap_err();

    let RetryError::Exhausted(conflict) = err else {
        panic!("expected retries to be exhausted");
    };
    assert_eq!(conflict.entity_type(), "reward_account");
    assert_eq!(conflict.entity_id(), "acct-1");
    assert_eq!(conflict.expected_version(), 1);
    assert_eq!(conflict.actual_version(), 2);
    assert_eq!(conflict.attempts, 3);
    assert_eq!(conflict.strategy, RetryStrategy::Immediate);
    assert!(!conflict.should_retry());
    assert!(std::error::Error::source(&conflict).is_some());
}

#[tokio::test(start_paused = true)]
async fn missing_rows_are_not_retried() {
    let store = seeded_store("acct-1", 0);
    let executor = RetryExecutor::default();

    let err = executor
        .run_with_retry(
            || async { add_points(&store, "acct-404", 1).await.map(|_| ()) },
            RewardAccount::ENTITY_TYPE,
            "acct-404",
            "add_points",
            5,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RetryError::Operation(StoreError::NotFound { .. })
    ));
}
