//! Sample data for running the gateway without a database

use common::decimal::dec;
use common::model::{Account, Client, Currency, ExchangeRate};
use banking_service::InMemoryLedgerStore;
use tracing::info;

/// Seed two clients, four accounts and the fallback rate table
pub async fn seed(store: &InMemoryLedgerStore) {
    let alice = Client::new("Alice", Some("Berzina".to_string()), "010190-12345");
    let bob = Client::new("Bob", Some("Ozols".to_string()), "020285-54321");

    store.insert_account(Account::new(alice.id, "LV01BANK0000000001", dec!(1500.00), Currency::EUR)).await;
    store.insert_account(Account::new(alice.id, "LV01BANK0000000002", dec!(320.50), Currency::USD)).await;
    store.insert_account(Account::new(bob.id, "LV01BANK0000000003", dec!(780.00), Currency::GBP)).await;
    store.insert_account(Account::new(bob.id, "LV01BANK0000000004", dec!(0.00), Currency::EUR)).await;

    store.insert_client(alice);
    store.insert_client(bob);

    let rates = [
        (Currency::EUR, Currency::USD, dec!(1.085000)),
        (Currency::EUR, Currency::GBP, dec!(0.856000)),
        (Currency::USD, Currency::EUR, dec!(0.921600)),
        (Currency::USD, Currency::GBP, dec!(0.789000)),
        (Currency::GBP, Currency::EUR, dec!(1.168200)),
        (Currency::GBP, Currency::USD, dec!(1.267400)),
    ];
    for (from, to, rate) in rates {
        store.insert_exchange_rate(ExchangeRate::new(from, to, rate));
    }

    info!("Seeded in-memory ledger with demo clients and accounts");
}
