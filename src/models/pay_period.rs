//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type that selects the length of
//! the wage-payment period (Lohnzahlungszeitraum).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The length of the period a wage is paid for.
///
/// The withholding procedure treats a year as 360 days, so a week is 7/360
/// of a year and a day is 1/360.
///
/// # Example
///
/// ```
/// use gross_net_engine::models::PayPeriod;
/// use rust_decimal::Decimal;
///
/// let period: PayPeriod = serde_json::from_str("\"month\"").unwrap();
/// assert_eq!(period, PayPeriod::Month);
/// assert_eq!(period.annual_multiplier(), Decimal::from(12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayPeriod {
    /// Annual payment.
    Year,
    /// Monthly payment.
    Month,
    /// Weekly payment.
    Week,
    /// Daily payment.
    Day,
}

impl PayPeriod {
    /// All pay periods, longest first.
    pub const ALL: [PayPeriod; 4] = [
        PayPeriod::Year,
        PayPeriod::Month,
        PayPeriod::Week,
        PayPeriod::Day,
    ];

    /// The numeric code used by the withholding procedure (1 = year to 4 = day).
    pub fn code(self) -> u8 {
        match self {
            PayPeriod::Year => 1,
            PayPeriod::Month => 2,
            PayPeriod::Week => 3,
            PayPeriod::Day => 4,
        }
    }

    /// The number of periods per year: 1, 12, 360/7 or 360.
    pub fn annual_multiplier(self) -> Decimal {
        match self {
            PayPeriod::Year => Decimal::ONE,
            PayPeriod::Month => Decimal::from(12),
            PayPeriod::Week => Decimal::from(360) / Decimal::from(7),
            PayPeriod::Day => Decimal::from(360),
        }
    }

    /// The lowercase name used in serialized data.
    pub fn as_str(self) -> &'static str {
        match self {
            PayPeriod::Year => "year",
            PayPeriod::Month => "month",
            PayPeriod::Week => "week",
            PayPeriod::Day => "day",
        }
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_one_to_four() {
        let codes: Vec<u8> = PayPeriod::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_weekly_multiplier_is_360_over_7() {
        let weeks = PayPeriod::Week.annual_multiplier();
        let back = (weeks * Decimal::from(7)).round_dp(10);
        assert_eq!(back, Decimal::from(360));
    }

    #[test]
    fn test_serialization_is_lowercase() {
        for period in PayPeriod::ALL {
            let json = serde_json::to_string(&period).unwrap();
            assert_eq!(json, format!("\"{}\"", period.as_str()));
        }
    }

    #[test]
    fn test_unknown_period_rejected() {
        let result: Result<PayPeriod, _> = serde_json::from_str("\"fortnight\"");
        assert!(result.is_err());
    }
}
