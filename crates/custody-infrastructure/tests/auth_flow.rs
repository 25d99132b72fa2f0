//! Registration, login, validation, and revocation against the in-memory store.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use futures::future::join_all;
use tokio::sync::watch;

use custody_core::domain::{Account, Session};
use custody_core::error::DomainError;
use custody_core::repositories::SessionRepository;
use custody_core::services::{spawn_session_sweeper, SignedSessions, StoredSessions};
use custody_core::{Ledger, SessionAuthenticator};
use custody_infrastructure::MemoryStore;
use custody_security::token::token_digest;

type StatefulAuth = SessionAuthenticator<MemoryStore, StoredSessions<MemoryStore>>;

fn stateful(store: &Arc<MemoryStore>) -> StatefulAuth {
    SessionAuthenticator::new(
        Arc::clone(store),
        Arc::new(StoredSessions::new(Arc::clone(store))),
    )
}

#[tokio::test]
async fn test_register_login_validate_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);

    let registration = auth.register("alice", "pw").await.unwrap();
    let issued = auth.login("alice", "pw").await.unwrap();

    assert_eq!(issued.expires_at - issued.issued_at, Duration::hours(24));
    assert_eq!(auth.validate(&issued.token).await, Ok("alice".to_string()));

    let ledger = Ledger::new(Arc::clone(&store));
    let account = ledger.account_for_owner("alice").await.unwrap();
    assert_eq!(account.id, registration.account_id);
    assert_eq!(account.balance, 0);
}

#[tokio::test]
async fn test_duplicate_registration() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);

    auth.register("alice", "pw").await.unwrap();
    assert_eq!(
        auth.register("alice", "other").await.unwrap_err(),
        DomainError::AlreadyExists("alice".into())
    );
    // First secret still works
    assert!(auth.login("alice", "pw").await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_of_same_id() {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(stateful(&store));

    let tasks = (0..8).map(|i| {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move { auth.register("carol", &format!("pw{}", i)).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == DomainError::AlreadyExists("carol".into())));
}

#[tokio::test]
async fn test_registration_is_all_or_nothing() {
    let store = Arc::new(MemoryStore::new());
    // An orphan account already claims the owner slot.
    store.seed_account(Account::seeded("orphan", "bob", 0)).unwrap();
    let auth = stateful(&store);

    let err = auth.register("bob", "pw").await.unwrap_err();
    assert!(matches!(err, DomainError::StorageUnavailable(_)));
    assert_eq!(
        auth.login("bob", "pw").await.unwrap_err(),
        DomainError::InvalidCredentials
    );
}

#[tokio::test]
async fn test_wrong_secret_and_unknown_user_look_the_same() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);
    auth.register("alice", "pw").await.unwrap();

    let wrong = auth.login("alice", "wrong").await.unwrap_err();
    let unknown = auth.login("nobody", "pw").await.unwrap_err();
    assert_eq!(wrong, DomainError::InvalidCredentials);
    assert_eq!(wrong, unknown);
    assert_eq!(store.session_count(), 0);
}

#[tokio::test]
async fn test_token_expires_at_boundary() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);
    auth.register("alice", "pw").await.unwrap();

    let now = Utc::now();
    let issued = auth.login_at("alice", "pw", now).await.unwrap();

    let just_before = issued.expires_at - Duration::seconds(1);
    assert_eq!(
        auth.validate_at(&issued.token, just_before).await,
        Ok("alice".to_string())
    );
    assert_eq!(
        auth.validate_at(&issued.token, issued.expires_at).await,
        Err(DomainError::Unauthorized)
    );
}

#[tokio::test]
async fn test_stale_session_rejected_before_purge() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);

    let token = "ab".repeat(32);
    let past = Utc::now() - Duration::hours(25);
    store
        .insert(&Session {
            digest: token_digest(&token),
            owner: "alice".into(),
            issued_at: past,
            expires_at: past + Duration::hours(24),
        })
        .await
        .unwrap();

    assert_eq!(auth.validate(&token).await, Err(DomainError::Unauthorized));
    assert_eq!(auth.purge_expired().await, Ok(1));
    assert_eq!(store.session_count(), 0);
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);
    auth.register("alice", "pw").await.unwrap();
    let issued = auth.login("alice", "pw").await.unwrap();

    auth.revoke(&issued.token).await.unwrap();
    assert_eq!(auth.validate(&issued.token).await, Err(DomainError::Unauthorized));
    auth.revoke(&issued.token).await.unwrap();
    auth.revoke("garbage").await.unwrap();
}

#[tokio::test]
async fn test_each_login_issues_distinct_token() {
    let store = Arc::new(MemoryStore::new());
    let auth = stateful(&store);
    auth.register("alice", "pw").await.unwrap();

    let first = auth.login("alice", "pw").await.unwrap();
    let second = auth.login("alice", "pw").await.unwrap();
    assert_ne!(first.token, second.token);

    auth.revoke(&first.token).await.unwrap();
    assert_eq!(auth.validate(&second.token).await, Ok("alice".to_string()));
}

#[tokio::test]
async fn test_signed_tokens_round_trip_and_expire() {
    let store = Arc::new(MemoryStore::new());
    let auth = SessionAuthenticator::new(Arc::clone(&store), Arc::new(SignedSessions::new("s3cret")));
    auth.register("alice", "pw").await.unwrap();

    let now = Utc::now();
    let issued = auth.login_at("alice", "pw", now).await.unwrap();
    assert_eq!(auth.validate_at(&issued.token, now).await, Ok("alice".to_string()));
    assert_eq!(
        auth.validate_at(&issued.token, issued.expires_at).await,
        Err(DomainError::Unauthorized)
    );
    assert_eq!(auth.purge_expired().await, Ok(0));

    let other = SessionAuthenticator::new(Arc::clone(&store), Arc::new(SignedSessions::new("different")));
    assert_eq!(other.validate_at(&issued.token, now).await, Err(DomainError::Unauthorized));
}

#[tokio::test]
async fn test_sweeper_purges_and_stops() {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(stateful(&store));

    let past = Utc::now() - Duration::hours(48);
    store
        .insert(&Session {
            digest: token_digest(&"cd".repeat(32)),
            owner: "alice".into(),
            issued_at: past,
            expires_at: past + Duration::hours(24),
        })
        .await
        .unwrap();

    let (tx, rx) = watch::channel(false);
    let handle = spawn_session_sweeper(Arc::clone(&auth), StdDuration::from_millis(10), rx);

    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(store.session_count(), 0);

    tx.send(true).unwrap();
    handle.await.unwrap();
}
