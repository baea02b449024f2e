use std::sync::Arc;
use std::time::Duration;

use banking_service::{BankingService, BankingServiceConfig, LedgerStore, PostgresLedgerStore};
use common::decimal::{dec, Amount};
use common::error::Error;
use common::model::{Account, Client, Currency, ExchangeRate, TransactionFlow, TransferRequest};
use tokio::test;
use uuid::Uuid;

use dotenv::dotenv;

// PostgreSQL integration tests for the ledger
// These tests require a running PostgreSQL database
// Run with: cargo test --test ledger_postgres_tests -- --ignored

async fn create_test_store() -> Arc<PostgresLedgerStore> {
    dotenv().ok(); // Load .env.test if it exists

    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to run PostgreSQL tests");

    let mut config = BankingServiceConfig::from_env().with_database_url(database_url);
    config.run_migrations = true;

    Arc::new(
        PostgresLedgerStore::with_config(&config)
            .await
            .expect("Failed to create PostgreSQL ledger store"),
    )
}

fn create_test_service(store: Arc<PostgresLedgerStore>) -> BankingService {
    // Live lookups go nowhere so conversions use the stored rates
    let config = BankingServiceConfig::from_env()
        .with_exchange_api("http://127.0.0.1:9/convert", "")
        .with_exchange_timeout(Duration::from_millis(200));

    BankingService::with_store(store, &config).expect("Failed to create banking service")
}

/// Client with one account per `(balance, currency)`; account numbers are unique per run
async fn create_client_with_accounts(
    store: &PostgresLedgerStore,
    accounts: &[(Amount, Currency)],
) -> (Client, Vec<String>) {
    let code = Uuid::new_v4().to_string();
    let client = Client::new("Test", None, code);
    store.insert_client(&client).await.unwrap();

    let mut numbers = Vec::new();
    for (balance, currency) in accounts {
        let number = format!("PG-{}", Uuid::new_v4().simple());
        store
            .insert_account(&Account::new(client.id, number.clone(), *balance, *currency))
            .await
            .unwrap();
        numbers.push(number);
    }

    (client, numbers)
}

#[test]
#[ignore = "Requires test database"]
async fn test_postgres_account_lookup() {
    let store = create_test_store().await;
    let service = create_test_service(store.clone());

    let (client, numbers) =
        create_client_with_accounts(&store, &[(dec!(5.00), Currency::EUR), (dec!(7.50), Currency::GBP)]).await;

    assert!(service.client_exists(&client.personal_code).await.unwrap());
    assert!(store.account_exists(&numbers[0]).await.unwrap());

    let accounts = service.get_accounts_by_client(&client.personal_code).await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts.iter().any(|a| a.balance == dec!(7.50) && a.currency == Currency::GBP));

    assert!(!service.client_exists(&Uuid::new_v4().to_string()).await.unwrap());
}

#[test]
#[ignore = "Requires test database"]
async fn test_postgres_transfer_and_history() {
    let store = create_test_store().await;
    let service = create_test_service(store.clone());

    let (_client, numbers) =
        create_client_with_accounts(&store, &[(dec!(20.00), Currency::GBP), (dec!(1.00), Currency::GBP)]).await;
    let (sender, receiver) = (&numbers[0], &numbers[1]);

    for amount in [dec!(1.00), dec!(2.00), dec!(3.00)] {
        service
            .transfer_funds(&TransferRequest::new(sender.as_str(), receiver.as_str(), amount, "GBP"))
            .await
            .unwrap();
    }

    let sender_account = store.get_account_by_number(sender).await.unwrap().unwrap();
    let receiver_account = store.get_account_by_number(receiver).await.unwrap().unwrap();
    assert_eq!(sender_account.balance, dec!(14.00));
    assert_eq!(receiver_account.balance, dec!(7.00));

    let history = service.get_transaction_history(sender, None, None).await.unwrap();
    let amounts: Vec<Amount> = history.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec!(3.00), dec!(2.00), dec!(1.00)]);
    assert!(history.iter().all(|t| t.transaction_flow == TransactionFlow::Outgoing));

    let page = service.get_transaction_history(sender, Some(2), Some(1)).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].amount, dec!(1.00));
}

#[test]
#[ignore = "Requires test database"]
async fn test_postgres_insufficient_funds_rolls_back() {
    let store = create_test_store().await;
    let service = create_test_service(store.clone());

    let (_client, numbers) =
        create_client_with_accounts(&store, &[(dec!(2.30), Currency::GBP), (dec!(10.00), Currency::GBP)]).await;

    let err = service
        .transfer_funds(&TransferRequest::new(numbers[0].as_str(), numbers[1].as_str(), dec!(4.50), "GBP"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds(_)));

    let sender = store.get_account_by_number(&numbers[0]).await.unwrap().unwrap();
    assert_eq!(sender.balance, dec!(2.30));
    assert!(service.get_transaction_history(&numbers[0], None, None).await.unwrap().is_empty());
}

#[test]
#[ignore = "Requires test database"]
async fn test_postgres_cross_currency_fallback() {
    let store = create_test_store().await;
    store
        .insert_exchange_rate(&ExchangeRate::new(Currency::USD, Currency::GBP, dec!(0.785)))
        .await
        .unwrap();
    let service = create_test_service(store.clone());

    let (_client, numbers) =
        create_client_with_accounts(&store, &[(dec!(100.00), Currency::USD), (dec!(0.00), Currency::GBP)]).await;

    let outcome = service
        .transfer_funds(&TransferRequest::new(numbers[0].as_str(), numbers[1].as_str(), dec!(10.00), "GBP"))
        .await
        .unwrap();

    assert_eq!(outcome.converted_amount, dec!(7.85));
    let receiver = store.get_account_by_number(&numbers[1]).await.unwrap().unwrap();
    assert_eq!(receiver.balance, dec!(7.85));
}

#[test]
#[ignore = "Requires test database"]
async fn test_postgres_concurrent_transfers() {
    let store = create_test_store().await;
    let service = Arc::new(create_test_service(store.clone()));

    let (_client, numbers) =
        create_client_with_accounts(&store, &[(dec!(10.00), Currency::EUR), (dec!(10.00), Currency::EUR)]).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        let (from, to) = if i % 2 == 0 {
            (numbers[0].clone(), numbers[1].clone())
        } else {
            (numbers[1].clone(), numbers[0].clone())
        };
        handles.push(tokio::spawn(async move {
            service
                .transfer_funds(&TransferRequest::new(from, to, dec!(3.00), "EUR"))
                .await
        }));
    }

    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) | Err(Error::InsufficientFunds(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    let a = store.get_account_by_number(&numbers[0]).await.unwrap().unwrap();
    let b = store.get_account_by_number(&numbers[1]).await.unwrap().unwrap();
    assert_eq!(a.balance + b.balance, dec!(20.00));
}
