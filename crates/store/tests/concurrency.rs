//! Concurrent money movement against the same accounts

use std::sync::Arc;
use std::time::Duration;

use ledger_core::{AccountLedger, AccountType, LedgerError};
use ledger_store::{SqliteLedger, StoreConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn connect(dir: &tempfile::TempDir) -> Arc<SqliteLedger> {
    let config = StoreConfig {
        busy_timeout_ms: 30_000,
        acquire_timeout_ms: 30_000,
        ..StoreConfig::for_path(dir.path().join("ledger.db"))
    };
    Arc::new(SqliteLedger::connect(&config).await.unwrap())
}

async fn open_funded(ledger: &SqliteLedger, amount: Decimal) -> Uuid {
    let account = ledger
        .create(Uuid::new_v4(), AccountType::Checking, None)
        .await
        .unwrap();
    ledger.deposit(account.id, amount).await.unwrap();
    account.id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_transfers_never_deadlock() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = connect(&dir).await;
    let a = open_funded(&ledger, dec!(1000)).await;
    let b = open_funded(&ledger, dec!(1000)).await;

    let mut handles = Vec::new();
    for i in 0..40 {
        let ledger = ledger.clone();
        let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
        handles.push(tokio::spawn(async move {
            ledger.transfer(from, to, dec!(7.25)).await
        }));
    }

    let results = tokio::time::timeout(Duration::from_secs(60), async {
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    })
    .await
    .expect("transfers did not finish: possible deadlock");

    assert!(results.iter().all(|r| r.is_ok()), "{results:?}");

    let total = ledger.get_by_id(a).await.unwrap().balance
        + ledger.get_by_id(b).await.unwrap().balance;
    assert_eq!(total, dec!(2000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = connect(&dir).await;
    let id = open_funded(&ledger, dec!(100)).await;

    let mut handles = Vec::new();
    for _ in 0..30 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move { ledger.withdraw(id, dec!(10)).await }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InsufficientFunds { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(ledger.get_by_id(id).await.unwrap().balance, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_savings_withdrawals_respect_daily_limit() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = connect(&dir).await;
    let account = ledger
        .create(Uuid::new_v4(), AccountType::Savings, None)
        .await
        .unwrap();
    ledger.deposit(account.id, dec!(20000)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = ledger.clone();
        let id = account.id;
        handles.push(tokio::spawn(async move { ledger.withdraw(id, dec!(1000)).await }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 5);
    let account = ledger.get_by_id(account.id).await.unwrap();
    assert_eq!(account.balance, dec!(15000));
    assert_eq!(account.daily_withdrawal_used, dec!(5000));
}
