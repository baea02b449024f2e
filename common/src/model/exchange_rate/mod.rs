//! Fallback exchange rates

use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::model::currency::Currency;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Statically stored conversion rate, keyed by the concatenated pair ("USDEUR")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ExchangeRate {
    /// Source currency code followed by target currency code
    pub source: String,
    /// Units of target currency per unit of source currency
    pub rate: Rate,
}

impl ExchangeRate {
    pub fn new(from: Currency, to: Currency, rate: Rate) -> Self {
        Self {
            source: Self::pair_key(from, to),
            rate,
        }
    }

    /// Lookup key for a pair, direct concatenation without separator
    pub fn pair_key(from: Currency, to: Currency) -> String {
        format!("{}{}", from.code(), to.code())
    }
}
