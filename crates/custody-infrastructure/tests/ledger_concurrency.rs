//! Ledger behavior under concurrent load, backed by the in-memory store.

use std::sync::Arc;

use futures::future::join_all;

use custody_core::domain::Account;
use custody_core::error::DomainError;
use custody_core::Ledger;
use custody_infrastructure::MemoryStore;

fn ledger_with(accounts: &[(&str, &str, i64)]) -> Arc<Ledger<MemoryStore>> {
    let store = MemoryStore::new();
    for (id, owner, balance) in accounts {
        store
            .seed_account(Account::seeded(*id, *owner, *balance))
            .unwrap();
    }
    Arc::new(Ledger::new(Arc::new(store)))
}

#[tokio::test]
async fn test_deposit_withdraw_sequence() {
    let ledger = ledger_with(&[("a1", "alice", 0)]);

    assert_eq!(ledger.deposit("a1", -5).await, Err(DomainError::InvalidAmount));
    assert_eq!(ledger.deposit("a1", 100).await, Ok(100));
    assert_eq!(
        ledger.withdraw("a1", 150).await,
        Err(DomainError::InsufficientBalance)
    );
    assert_eq!(ledger.balance("a1").await, Ok(100));
    assert_eq!(ledger.withdraw("a1", 100).await, Ok(0));
    assert_eq!(ledger.balance("a1").await, Ok(0));
}

#[tokio::test]
async fn test_unknown_account() {
    let ledger = ledger_with(&[]);
    assert_eq!(ledger.balance("nope").await, Err(DomainError::AccountNotFound));
    assert_eq!(ledger.deposit("nope", 1).await, Err(DomainError::AccountNotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    const N: i64 = 200;
    let ledger = ledger_with(&[("a1", "alice", N)]);

    let tasks = (0..N + 20).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.withdraw("a1", 1).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count() as i64;
    let rejected = results
        .iter()
        .filter(|r| **r == Err(DomainError::InsufficientBalance))
        .count();
    assert_eq!(succeeded, N);
    assert_eq!(rejected, 20);
    assert_eq!(ledger.balance("a1").await, Ok(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_are_not_lost() {
    let ledger = ledger_with(&[("a1", "alice", 0)]);

    let tasks = (1..=100).map(|amount| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.deposit("a1", amount).await })
    });
    for joined in join_all(tasks).await {
        joined.unwrap().unwrap();
    }

    assert_eq!(ledger.balance("a1").await, Ok(5050));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_load_conserves_value() {
    let ledger = ledger_with(&[("a1", "alice", 50), ("a2", "bob", 50)]);

    let tasks = (0..400).map(|i| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            let id = if i % 2 == 0 { "a1" } else { "a2" };
            let amount = (i % 7) + 1;
            if i % 3 == 0 {
                ledger.deposit(id, amount).await.map(|_| amount)
            } else {
                ledger.withdraw(id, amount).await.map(|_| -amount)
            }
        })
    });

    let mut net = 0;
    for joined in join_all(tasks).await {
        match joined.unwrap() {
            Ok(delta) => net += delta,
            Err(e) => assert_eq!(e, DomainError::InsufficientBalance),
        }
    }

    let a1 = ledger.balance("a1").await.unwrap();
    let a2 = ledger.balance("a2").await.unwrap();
    assert!(a1 >= 0 && a2 >= 0);
    assert_eq!(a1 + a2, 100 + net);
}
