//! Banking service: account lookup, transaction history and fund transfers

pub mod config;
pub mod converter;
pub mod repository;
pub mod service;
pub mod validation;

pub use config::BankingServiceConfig;
pub use converter::{CurrencyConverter, HttpRateSource, LiveRateSource, RateOracle};
pub use repository::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
pub use service::{BankingService, RepositoryType};
