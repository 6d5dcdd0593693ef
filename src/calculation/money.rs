//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places monetary amounts are stored with.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds an amount to currency minor units, midpoint away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(3552.475)), dec!(3552.48));
/// assert_eq!(round_money(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
