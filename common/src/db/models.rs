use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Account, AccountRecord, Currency, ExchangeRate, Transaction};

fn parse_currency(code: &str) -> Result<Currency> {
    Currency::from_code_ignore_case(code)
        .ok_or_else(|| Error::Internal(format!("Stored currency is not supported: {}", code)))
}

/// Database model for Account table
#[derive(Debug, Clone, FromRow)]
pub struct DbAccount {
    pub id: Uuid,
    pub client_id: Uuid,
    pub account_number: String,
    pub balance: Decimal,
    pub currency: String,
}

impl TryFrom<DbAccount> for Account {
    type Error = Error;

    fn try_from(row: DbAccount) -> Result<Self> {
        Ok(Account {
            id: row.id,
            client_id: row.client_id,
            account_number: row.account_number,
            balance: row.balance,
            currency: parse_currency(&row.currency)?,
        })
    }
}

/// Account projection joined through the owning client
#[derive(Debug, Clone, FromRow)]
pub struct DbAccountRecord {
    pub account_number: String,
    pub balance: Decimal,
    pub currency: String,
}

impl TryFrom<DbAccountRecord> for AccountRecord {
    type Error = Error;

    fn try_from(row: DbAccountRecord) -> Result<Self> {
        Ok(AccountRecord {
            account_number: row.account_number,
            balance: row.balance,
            currency: parse_currency(&row.currency)?,
        })
    }
}

/// Database model for Transaction table
#[derive(Debug, Clone, FromRow)]
pub struct DbTransaction {
    pub id: i64,
    pub account_number: String,
    pub balance: Decimal,
    pub amount: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub transaction_flow: String,
}

impl TryFrom<DbTransaction> for Transaction {
    type Error = Error;

    fn try_from(row: DbTransaction) -> Result<Self> {
        Ok(Transaction {
            id: row.id,
            account_number: row.account_number,
            balance: row.balance,
            amount: row.amount,
            currency: parse_currency(&row.currency)?,
            timestamp: row.timestamp,
            transaction_flow: row.transaction_flow.parse()?,
        })
    }
}

/// Database model for ExchangeRate table
#[derive(Debug, Clone, FromRow)]
pub struct DbExchangeRate {
    pub source: String,
    pub rate: Decimal,
}

impl From<DbExchangeRate> for ExchangeRate {
    fn from(row: DbExchangeRate) -> Self {
        ExchangeRate {
            source: row.source,
            rate: row.rate,
        }
    }
}
