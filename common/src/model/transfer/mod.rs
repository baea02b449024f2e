//! Transfer instructions

use serde::{Deserialize, Serialize};

use crate::decimal::Amount;
use crate::model::transaction::Transaction;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Inbound transfer instruction, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Account to debit
    pub sender_account: String,
    /// Account to credit
    pub receiver_account: String,
    /// Amount debited from the sender
    pub amount: Amount,
    /// Currency of the instruction, must equal the receiver's currency
    pub currency: String,
}

impl TransferRequest {
    pub fn new(
        sender_account: impl Into<String>,
        receiver_account: impl Into<String>,
        amount: Amount,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            sender_account: sender_account.into(),
            receiver_account: receiver_account.into(),
            amount,
            currency: currency.into(),
        }
    }
}

/// Result of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Amount credited to the receiver
    pub converted_amount: Amount,
    /// Entry appended on the sender
    pub outgoing: Transaction,
    /// Entry appended on the receiver
    pub incoming: Transaction,
}
