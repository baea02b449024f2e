#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use banking_service::{BankingService, CurrencyConverter, InMemoryLedgerStore, LiveRateSource};
use common::decimal::{dec, Amount};
use common::error::{Error, Result};
use common::model::{Account, Client, Currency, ExchangeRate};

pub const JANE_CODE: &str = "354651611615";
pub const JOHN_CODE: &str = "120389-11111";
pub const NO_ACCOUNTS_CODE: &str = "000000-00000";

/// Live source that is always unreachable
pub struct UnreachableRateSource {
    pub calls: AtomicUsize,
}

impl UnreachableRateSource {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveRateSource for UnreachableRateSource {
    async fn fetch_conversion(&self, _from: Currency, _to: Currency, _amount: Amount) -> Result<Amount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::ExchangeService("connection refused".to_string()))
    }
}

/// Live source answering every conversion with the same amount
pub struct FixedRateSource {
    pub result: Amount,
    pub calls: AtomicUsize,
}

impl FixedRateSource {
    pub fn new(result: Amount) -> Self {
        Self { result, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveRateSource for FixedRateSource {
    async fn fetch_conversion(&self, _from: Currency, _to: Currency, _amount: Amount) -> Result<Amount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}

/// Store with two clients and five accounts:
///
/// | account | owner | balance | currency |
/// |---------|-------|---------|----------|
/// | GB-001  | Jane  | 2.30    | GBP      |
/// | GB-002  | Jane  | 10.00   | GBP      |
/// | US-001  | Jane  | 100.00  | USD      |
/// | EU-001  | John  | 50.00   | EUR      |
/// | GB-003  | John  | 10.00   | GBP      |
///
/// Fallback rates: USDGBP 0.785, GBPUSD 1.2674, EURGBP 0.856
pub async fn seeded_store() -> Arc<InMemoryLedgerStore> {
    let store = Arc::new(InMemoryLedgerStore::new());

    let jane = Client::new("Jane", Some("Doe".to_string()), JANE_CODE);
    let john = Client::new("John", None, JOHN_CODE);
    let idle = Client::new("Idle", None, NO_ACCOUNTS_CODE);

    store.insert_account(Account::new(jane.id, "GB-001", dec!(2.30), Currency::GBP)).await;
    store.insert_account(Account::new(jane.id, "GB-002", dec!(10.00), Currency::GBP)).await;
    store.insert_account(Account::new(jane.id, "US-001", dec!(100.00), Currency::USD)).await;
    store.insert_account(Account::new(john.id, "EU-001", dec!(50.00), Currency::EUR)).await;
    store.insert_account(Account::new(john.id, "GB-003", dec!(10.00), Currency::GBP)).await;

    store.insert_client(jane);
    store.insert_client(john);
    store.insert_client(idle);

    store.insert_exchange_rate(ExchangeRate::new(Currency::USD, Currency::GBP, dec!(0.785)));
    store.insert_exchange_rate(ExchangeRate::new(Currency::GBP, Currency::USD, dec!(1.2674)));
    store.insert_exchange_rate(ExchangeRate::new(Currency::EUR, Currency::GBP, dec!(0.856)));

    store
}

/// Service over `store` converting through `live`, then the store's fallback table
pub fn service_with(store: Arc<InMemoryLedgerStore>, live: Arc<dyn LiveRateSource>) -> BankingService {
    let converter = Arc::new(CurrencyConverter::new(live, store.clone()));
    BankingService::new(store, converter)
}

/// Service whose live lookups always fail
pub fn offline_service(store: Arc<InMemoryLedgerStore>) -> BankingService {
    service_with(store, Arc::new(UnreachableRateSource::new()))
}

pub async fn balance_of(store: &InMemoryLedgerStore, account_number: &str) -> Amount {
    use banking_service::LedgerStore;

    store
        .get_account_by_number(account_number)
        .await
        .unwrap()
        .unwrap()
        .balance
}
