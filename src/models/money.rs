//! Integer minor-unit money.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// An amount of money in euro cents.
///
/// All monetary results of the engine are expressed in `Cents` so that a
/// downstream renderer never reintroduces floating-point rounding.
///
/// # Example
///
/// ```
/// use gross_net_engine::models::Cents;
/// use rust_decimal::Decimal;
///
/// let total: Cents = [Cents(1050), Cents(250)].into_iter().sum();
/// assert_eq!(total, Cents(1300));
/// assert_eq!(total.to_euros(), Decimal::new(1300, 2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Cents = Cents(0);

    /// Converts an integral decimal amount of cents.
    ///
    /// Any fractional part is truncated; values beyond the `i64` range
    /// saturate.
    pub fn from_decimal(cents: Decimal) -> Self {
        let truncated = cents.trunc();
        Cents(truncated.to_i64().unwrap_or(if truncated.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// The amount as a decimal number of cents.
    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }

    /// The amount in euros.
    pub fn to_euros(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the amount, or zero if it is negative.
    pub fn max_zero(self) -> Self {
        Cents(self.0.max(0))
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} EUR", self.to_euros())
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Cents {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_decimal_truncates_fraction() {
        assert_eq!(Cents::from_decimal(Decimal::from_str("1234.99").unwrap()), Cents(1234));
        assert_eq!(Cents::from_decimal(Decimal::from_str("-5.5").unwrap()), Cents(-5));
    }

    #[test]
    fn test_from_decimal_saturates() {
        let huge = Decimal::from_str("100000000000000000000000").unwrap();
        assert_eq!(Cents::from_decimal(huge), Cents(i64::MAX));
        assert_eq!(Cents::from_decimal(-huge), Cents(i64::MIN));
    }

    #[test]
    fn test_to_euros() {
        assert_eq!(Cents(416667).to_euros(), Decimal::from_str("4166.67").unwrap());
    }

    #[test]
    fn test_arithmetic() {
        let mut total = Cents(100) + Cents(50) - Cents(30);
        total += Cents(5);
        assert_eq!(total, Cents(125));
        assert_eq!(Cents(-3).max_zero(), Cents::ZERO);
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        assert_eq!(serde_json::to_string(&Cents(4711)).unwrap(), "4711");
        let parsed: Cents = serde_json::from_str("-12").unwrap();
        assert_eq!(parsed, Cents(-12));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cents(123456).to_string(), "1234.56 EUR");
    }
}
