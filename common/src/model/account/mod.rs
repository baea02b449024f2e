//! Account models and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Amount;
use crate::error::{Error, Result};
use crate::model::currency::Currency;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Account model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Internal account ID
    pub id: Uuid,
    /// Owning client
    pub client_id: Uuid,
    /// Business key, distinct from the internal ID
    pub account_number: String,
    /// Current balance, never negative
    pub balance: Amount,
    /// Account currency
    pub currency: Currency,
}

impl Account {
    /// Create a new account with a fresh ID
    pub fn new(client_id: Uuid, account_number: impl Into<String>, balance: Amount, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            account_number: account_number.into(),
            balance,
            currency,
        }
    }

    /// Remove funds from the balance. Callers validate sufficiency first.
    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.checked_sub(amount).ok_or_else(|| {
            Error::DecimalError(format!("Debiting {} from {} overflows", amount, self.account_number))
        })?;
        Ok(())
    }

    /// Add funds to the balance
    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            Error::DecimalError(format!("Crediting {} to {} overflows", amount, self.account_number))
        })?;
        Ok(())
    }

    /// Projection returned by client account listings
    pub fn to_record(&self) -> AccountRecord {
        AccountRecord {
            account_number: self.account_number.clone(),
            balance: self.balance,
            currency: self.currency,
        }
    }
}

/// Account as listed for a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Account number
    pub account_number: String,
    /// Current balance
    pub balance: Amount,
    /// Account currency
    pub currency: Currency,
}
