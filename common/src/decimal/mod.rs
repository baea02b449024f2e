//! Decimal type utilities for precise monetary calculations

pub use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
pub use rust_decimal_macros::dec;

/// Monetary amount (balances, transfer amounts)
pub type Amount = Decimal;

/// Currency conversion rate
pub type Rate = Decimal;

/// Precision helpers for common operations
pub mod precision {
    use super::*;
    use crate::error::{Error, Result};

    /// Monetary amounts are kept to cents
    pub const AMOUNT_PRECISION: u32 = 2;

    /// Round an amount to cents, half-up (midpoint away from zero)
    pub fn round_amount(amount: Amount) -> Amount {
        amount.round_dp_with_strategy(AMOUNT_PRECISION, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Whether an amount needs no more than cent precision (trailing zeros ignored)
    pub fn fits_amount_precision(amount: Amount) -> bool {
        amount.normalize().scale() <= AMOUNT_PRECISION
    }

    /// Convert an amount with a fixed rate, rounding the product to cents
    pub fn apply_rate(amount: Amount, rate: Rate) -> Result<Amount> {
        amount
            .checked_mul(rate)
            .map(round_amount)
            .ok_or_else(|| Error::ValidationError(format!("Converting {} at rate {} overflows", amount, rate)))
    }
}
