//! Money rounding helpers.
//!
//! Intermediate amounts stay at full precision; only reported components
//! pass through these functions.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to 2 decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("535.714285").unwrap()), Decimal::from_str("535.71").unwrap());
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap()), Decimal::from_str("0.13").unwrap());
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a monetary amount to whole currency units, as printed on a payslip.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
