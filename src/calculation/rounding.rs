//! Decimal rounding operations.
//!
//! The withholding procedure rounds at fixed points with one of two
//! directions: truncation toward zero or rounding away from zero. Half-up
//! commercial rounding is used only where results are converted to cents for
//! presentation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Truncates `value` to `dp` fractional digits (toward zero).
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::round_down;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_down(Decimal::from_str("12.349").unwrap(), 2), Decimal::from_str("12.34").unwrap());
/// assert_eq!(round_down(Decimal::from_str("-1.9").unwrap(), 0), Decimal::from(-1));
/// ```
pub fn round_down(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Rounds `value` away from zero at `dp` fractional digits.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::round_up;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_up(Decimal::from_str("12.341").unwrap(), 2), Decimal::from_str("12.35").unwrap());
/// assert_eq!(round_up(Decimal::from_str("7.0").unwrap(), 0), Decimal::from(7));
/// ```
pub fn round_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::AwayFromZero)
}

/// Rounds half away from zero at `dp` fractional digits.
pub fn round_commercial(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero if it is negative.
pub fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
