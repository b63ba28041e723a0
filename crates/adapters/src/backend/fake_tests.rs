// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vl_core::FakeClock;

const LEASE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn acquire_and_release_round_trip() {
    let backend = FakeLockBackend::new();
    let owner = LockOwner::new("a");

    assert_eq!(
        backend.acquire("k", &owner, LEASE).await.unwrap(),
        AcquireOutcome::Acquired
    );
    assert!(backend.remaining("k").await.unwrap().is_some());
    assert_eq!(
        backend.release("k", &owner).await.unwrap(),
        ReleaseOutcome::Released
    );
    assert_eq!(backend.remaining("k").await.unwrap(), None);
}

#[tokio::test]
async fn clones_share_state() {
    let backend = FakeLockBackend::new();
    let other = backend.clone();

    backend
        .acquire("k", &LockOwner::new("a"), LEASE)
        .await
        .unwrap();

    assert_eq!(
        other.acquire("k", &LockOwner::new("b"), LEASE).await.unwrap(),
        AcquireOutcome::Held {
            owner: LockOwner::new("a")
        }
    );
}

#[tokio::test]
async fn offline_backend_fails_every_call() {
    let backend = FakeLockBackend::new();
    let owner = LockOwner::new("a");
    backend.set_available(false);

    assert!(matches!(
        backend.acquire("k", &owner, LEASE).await,
        Err(BackendError::Unavailable(_))
    ));
    assert!(backend.release("k", &owner).await.is_err());
    assert!(backend.force_release("k").await.is_err());
    assert!(backend.remaining("k").await.is_err());
    assert!(backend.purge_expired().await.is_err());
    assert!(backend.registry().is_empty());

    backend.set_available(true);
    assert!(backend.acquire("k", &owner, LEASE).await.is_ok());
}

#[tokio::test]
async fn records_calls_in_order() {
    let backend = FakeLockBackend::new();
    let owner = LockOwner::new("a");

    backend.acquire("k", &owner, LEASE).await.unwrap();
    backend.force_release("k").await.unwrap();
    backend.purge_expired().await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::Acquire {
                key: "k".into(),
                owner: owner.clone(),
                lease: LEASE,
            },
            BackendCall::ForceRelease { key: "k".into() },
            BackendCall::PurgeExpired,
        ]
    );
}

#[tokio::test]
async fn purge_removes_expired_entries() {
    let clock = FakeClock::new();
    let backend = FakeLockBackend::with_clock(clock.clone());
    let owner = LockOwner::new("a");
    backend.acquire("short", &owner, Duration::from_secs(1)).await.unwrap();
    backend.acquire("long", &owner, Duration::from_secs(60)).await.unwrap();

    clock.advance(Duration::from_secs(2));

    assert_eq!(backend.purge_expired().await.unwrap(), 1);
    assert!(!backend.force_release("short").await.unwrap());
    assert!(backend.force_release("long").await.unwrap());
}
