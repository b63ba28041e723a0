//! Building managers and executors from a configuration file

use crate::prelude::*;
use std::io::Write;

#[tokio::test(start_paused = true)]
async fn file_configuration_drives_locks_and_retries() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [locks]
        default_wait = "40ms"
        default_lease = "2s"
        poll_interval = "10ms"

        [retry]
        max_attempts = 2
        base_delay = "50ms"

        [strategy.per_entity.reward_account]
        immediate_max_gap = 0
        linear_max_gap = 4
        "#
    )
    .unwrap();

    let config = ConcurrencyConfig::load(file.path()).unwrap();
    let manager = LocalLockManager::new(config.locks.clone());
    let executor = RetryExecutor::from_config(&config);

    let holder = LockOwner::new("holder");
    assert!(manager.try_lock_default(&holder, "acct-1").await.unwrap());
    let remaining = manager.remaining_time("acct-1").await.unwrap().unwrap();
    assert!(remaining <= Duration::from_secs(2) && remaining > Duration::from_secs(1));
    assert!(!manager
        .try_lock_default(&LockOwner::new("other"), "acct-1")
        .await
        .unwrap());

    let store = seeded_store("acct-1", 0);
    let stale = store.find("acct-1").unwrap();
    store.update(stale.clone()).unwrap();
    let err = executor
        .execute(&stale.conflict_scope("add_points"), || {
            let store = Arc::clone(&store);
            let stale = stale.clone();
            async move { store.update(stale) }
        })
        .await
        .unwrap_err();

    let conflict = err.conflict().unwrap();
    assert_eq!(conflict.attempts, 2);
    assert_eq!(conflict.strategy, RetryStrategy::LinearBackoff);
    assert_eq!(conflict.retry_delay_ms(2), 100);
}
