//! Transfer validation
//!
//! Pure checks run before any balance is touched. Each failure maps to its own
//! error kind.

use common::decimal::{precision, Amount};
use common::error::{Error, Result};
use common::model::Currency;

/// Sender and receiver must be different accounts (case-insensitive)
pub fn validate_accounts(sender_account: &str, receiver_account: &str) -> Result<()> {
    if sender_account.eq_ignore_ascii_case(receiver_account) {
        return Err(Error::AccountsEqual(
            "Sender and receiver accounts must differ".to_string(),
        ));
    }
    Ok(())
}

/// The instruction currency must be one of the canonical codes, matched exactly
pub fn validate_currency(code: &str) -> Result<Currency> {
    code.parse::<Currency>()
}

/// Transfers move a strictly positive amount of whole cents
pub fn validate_amount(amount: Amount) -> Result<()> {
    if amount <= Amount::ZERO {
        return Err(Error::ValidationError(format!(
            "Transfer amount must be positive: {}",
            amount
        )));
    }
    if !precision::fits_amount_precision(amount) {
        return Err(Error::ValidationError(format!(
            "Transfer amount has more than {} decimal places: {}",
            precision::AMOUNT_PRECISION,
            amount
        )));
    }
    Ok(())
}

/// The instruction currency must be the receiver's currency
pub fn validate_receiver_currency_match(transfer_currency: Currency, receiver_currency: Currency) -> Result<()> {
    if transfer_currency != receiver_currency {
        return Err(Error::CurrencyMismatch(format!(
            "Transfer currency {} does not match receiver currency {}",
            transfer_currency, receiver_currency
        )));
    }
    Ok(())
}

/// Draining a balance to exactly zero is allowed
pub fn validate_sufficient_funds(transfer_amount: Amount, sender_balance: Amount) -> Result<()> {
    if transfer_amount > sender_balance {
        return Err(Error::InsufficientFunds(format!(
            "Given amount {} exceeds available funds {}",
            transfer_amount, sender_balance
        )));
    }
    Ok(())
}
