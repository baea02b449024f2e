//! Supported currencies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Currencies the ledger can hold and transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub enum Currency {
    EUR,
    USD,
    GBP,
}

impl Currency {
    /// Every supported currency
    pub const ALL: [Currency; 3] = [Currency::EUR, Currency::USD, Currency::GBP];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
        }
    }

    /// Exact, case-sensitive membership check against the canonical codes
    pub fn is_valid(code: &str) -> bool {
        Self::ALL.iter().any(|c| c.code() == code)
    }

    /// Case-insensitive lookup, used for codes read back from storage
    pub fn from_code_ignore_case(code: &str) -> Option<Currency> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| Error::UnsupportedCurrency(format!("Provided currency is not supported: {}", code)))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
