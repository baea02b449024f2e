//! Error types for the banking ledger
//!
//! This module provides a unified error handling system for the ledger crates.
//! Transfer rule violations each get their own kind so the HTTP boundary can
//! map them to a client-facing status without inspecting messages.

use std::fmt::Display;
use thiserror::Error;

/// Banking ledger error type
#[derive(Debug, Error)]
pub enum Error {
    /// Sender and receiver account numbers are equal (case-insensitive)
    #[error("Accounts are equal: {0}")]
    AccountsEqual(String),

    /// Currency code outside the supported set
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Transfer currency differs from the receiver account currency
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),

    /// Transfer amount exceeds the sender balance
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Neither the live lookup nor the fallback table produced a rate
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    /// Error when an account cannot be found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Error when a client cannot be found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Generic validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Live exchange service call failed
    #[error("Exchange service error: {0}")]
    ExchangeService(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),
}

impl Error {
    /// Whether this error is a transfer rule violation raised before any mutation
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Error::AccountsEqual(_)
                | Error::UnsupportedCurrency(_)
                | Error::CurrencyMismatch(_)
                | Error::InsufficientFunds(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::AccountsEqual(msg) => Error::AccountsEqual(format!("{}: {}", context, msg)),
                Error::UnsupportedCurrency(msg) => Error::UnsupportedCurrency(format!("{}: {}", context, msg)),
                Error::CurrencyMismatch(msg) => Error::CurrencyMismatch(format!("{}: {}", context, msg)),
                Error::InsufficientFunds(msg) => Error::InsufficientFunds(format!("{}: {}", context, msg)),
                Error::RateUnavailable(msg) => Error::RateUnavailable(format!("{}: {}", context, msg)),
                Error::AccountNotFound(msg) => Error::AccountNotFound(format!("{}: {}", context, msg)),
                Error::ClientNotFound(msg) => Error::ClientNotFound(format!("{}: {}", context, msg)),
                Error::ValidationError(msg) => Error::ValidationError(format!("{}: {}", context, msg)),
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::ExchangeService(msg) => Error::ExchangeService(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::Database(e) => Error::Database(e),
                Error::Migration(e) => Error::Migration(e),
                Error::Serialization(e) => Error::Serialization(e),
                Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
            }
        })
    }
}

/// Trait for converting other error types to our Error type
pub trait IntoError {
    /// Convert to Error
    fn into_error(self, message: &str) -> Error;
}

impl<E: std::error::Error> IntoError for E {
    fn into_error(self, message: &str) -> Error {
        Error::Internal(format!("{}: {}", message, self))
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Internal(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Internal(message.to_string())
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}
