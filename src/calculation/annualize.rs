//! Conversion between pay-period cents and annual euros.
//!
//! The procedure works on annual euro amounts. Period amounts are scaled up
//! before the calculation and the annual results scaled back down afterwards,
//! each time truncating.

use rust_decimal::Decimal;

use super::rounding::round_down;
use crate::models::{Cents, PayPeriod, WithholdingInput};

/// Annual euro amounts derived from the period inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualAmounts {
    /// Annual gross wage.
    pub wage: Decimal,
    /// Annual pension income contained in the wage.
    pub pension: Decimal,
    /// Annual tax-free allowance.
    pub allowance: Decimal,
    /// Annual add-back amount.
    pub add_back: Decimal,
}

/// Scales a period amount in cents to annual euros, truncated at 2 dp.
///
/// A week counts as 7/360 and a day as 1/360 of a year.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::annualize;
/// use gross_net_engine::models::{Cents, PayPeriod};
/// use rust_decimal::Decimal;
///
/// assert_eq!(annualize(Cents(416_667), PayPeriod::Month), Decimal::new(5_000_004, 2));
/// assert_eq!(annualize(Cents(100_000), PayPeriod::Week), Decimal::new(5_142_857, 2));
/// ```
pub fn annualize(amount: Cents, period: PayPeriod) -> Decimal {
    let cents = amount.as_decimal();
    let euros = match period {
        PayPeriod::Year => cents / Decimal::ONE_HUNDRED,
        PayPeriod::Month => cents * Decimal::from(12) / Decimal::ONE_HUNDRED,
        PayPeriod::Week => cents * Decimal::from(360) / Decimal::from(700),
        PayPeriod::Day => cents * Decimal::from(360) / Decimal::ONE_HUNDRED,
    };
    round_down(euros, 2)
}

/// Annualises the wage, pension, allowance and add-back of an input.
pub fn annualize_input(input: &WithholdingInput) -> AnnualAmounts {
    let pension = input
        .pension
        .as_ref()
        .map(|pension| pension.period_amount)
        .unwrap_or_default();

    AnnualAmounts {
        wage: annualize(input.gross, input.period),
        pension: annualize(pension, input.period),
        allowance: annualize(input.allowance, input.period),
        add_back: annualize(input.add_back, input.period),
    }
}

/// Converts an annual amount in cents to the pay period's share, truncated
/// to whole cents.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::period_share;
/// use gross_net_engine::models::PayPeriod;
/// use rust_decimal::Decimal;
///
/// assert_eq!(period_share(Decimal::from(100_000), PayPeriod::Month), Decimal::from(8_333));
/// assert_eq!(period_share(Decimal::from(100_000), PayPeriod::Year), Decimal::from(100_000));
/// ```
pub fn period_share(annual_cents: Decimal, period: PayPeriod) -> Decimal {
    match period {
        PayPeriod::Year => annual_cents,
        PayPeriod::Month => round_down(annual_cents / Decimal::from(12), 0),
        PayPeriod::Week => round_down(annual_cents * Decimal::from(7) / Decimal::from(360), 0),
        PayPeriod::Day => round_down(annual_cents / Decimal::from(360), 0),
    }
}
