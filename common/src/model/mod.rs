//! Domain models for the banking ledger

pub mod currency;
pub mod client;
pub mod account;
pub mod transaction;
pub mod exchange_rate;
pub mod transfer;

pub use currency::Currency;
pub use client::Client;
pub use account::{Account, AccountRecord};
pub use transaction::{NewTransaction, PageRequest, Transaction, TransactionFlow, TransactionRecord};
pub use exchange_rate::ExchangeRate;
pub use transfer::{TransferOutcome, TransferRequest};
