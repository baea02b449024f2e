//! Ledger entries
//!
//! Every successful transfer appends exactly two entries: an OUTGOING one on the
//! sender and an INCOMING one on the receiver. Entries are never updated or removed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Amount;
use crate::error::Error;
use crate::model::account::Account;
use crate::model::currency::Currency;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionFlow {
    /// Credit
    Incoming,
    /// Debit
    Outgoing,
}

impl TransactionFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionFlow::Incoming => "INCOMING",
            TransactionFlow::Outgoing => "OUTGOING",
        }
    }
}

impl FromStr for TransactionFlow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOMING" => Ok(TransactionFlow::Incoming),
            "OUTGOING" => Ok(TransactionFlow::Outgoing),
            other => Err(Error::Internal(format!("Unknown transaction flow: {}", other))),
        }
    }
}

impl fmt::Display for TransactionFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sequence ID, increasing in insertion order
    pub id: i64,
    /// Account the entry belongs to
    pub account_number: String,
    /// Account balance after this entry
    pub balance: Amount,
    /// Magnitude of the movement, always positive
    pub amount: Amount,
    /// Currency of the account
    pub currency: Currency,
    /// Entry time
    pub timestamp: DateTime<Utc>,
    /// Debit or credit
    pub transaction_flow: TransactionFlow,
}

/// Ledger entry that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub account_number: String,
    pub balance: Amount,
    pub amount: Amount,
    pub currency: Currency,
    pub timestamp: DateTime<Utc>,
    pub transaction_flow: TransactionFlow,
}

impl NewTransaction {
    /// Debit entry stamped with the sender's post-transfer balance
    pub fn outgoing(sender: &Account, amount: Amount, timestamp: DateTime<Utc>) -> Self {
        Self::for_account(sender, amount, timestamp, TransactionFlow::Outgoing)
    }

    /// Credit entry stamped with the receiver's post-transfer balance
    pub fn incoming(receiver: &Account, amount: Amount, timestamp: DateTime<Utc>) -> Self {
        Self::for_account(receiver, amount, timestamp, TransactionFlow::Incoming)
    }

    fn for_account(account: &Account, amount: Amount, timestamp: DateTime<Utc>, flow: TransactionFlow) -> Self {
        Self {
            account_number: account.account_number.clone(),
            balance: account.balance,
            amount,
            currency: account.currency,
            timestamp,
            transaction_flow: flow,
        }
    }

    /// Attach the sequence ID assigned by the store
    pub fn into_transaction(self, id: i64) -> Transaction {
        Transaction {
            id,
            account_number: self.account_number,
            balance: self.balance,
            amount: self.amount,
            currency: self.currency,
            timestamp: self.timestamp,
            transaction_flow: self.transaction_flow,
        }
    }
}

/// Ledger entry as returned by history queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub account_number: String,
    pub balance: Amount,
    pub amount: Amount,
    pub currency: Currency,
    pub timestamp: DateTime<Utc>,
    pub transaction_flow: TransactionFlow,
}

impl From<Transaction> for TransactionRecord {
    fn from(t: Transaction) -> Self {
        Self {
            account_number: t.account_number,
            balance: t.balance,
            amount: t.amount,
            currency: t.currency,
            timestamp: t.timestamp,
            transaction_flow: t.transaction_flow,
        }
    }
}

/// Page of history, `page` is a zero-based page index rather than a row offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}
