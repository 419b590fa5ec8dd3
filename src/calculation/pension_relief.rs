//! Pension-income relief (Versorgungsfreibetrag and Zuschlag, § 19 Abs. 2 EStG).
//!
//! The relief is a percentage of the pension base with an absolute cap, both
//! frozen at the values of the year the pension started. A fixed supplement
//! is added on top. Both are derived once for the regular wage and once
//! including a one-time pension payment.

use rust_decimal::Decimal;

use super::rounding::{round_down, round_up};
use crate::config::{CohortTable, PensionReliefRow};
use crate::error::EngineResult;
use crate::models::{Cents, PensionIncome};

/// Pension relief amounts in annual euros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PensionRelief {
    /// Relief on the regular pension.
    pub relief: Decimal,
    /// Supplement on the regular pension.
    pub supplement: Decimal,
    /// Relief including the one-time pension payment.
    pub relief_with_one_time: Decimal,
    /// Supplement including the one-time pension payment.
    pub supplement_with_one_time: Decimal,
}

/// Computes the pension relief.
///
/// # Arguments
///
/// * `pension` - The pension details (start year, monthly baseline, special payments, months paid)
/// * `annual_pension` - The annualised pension portion of the wage in euros
/// * `yearly_period` - Whether the wage is paid for a whole year
/// * `one_time_pension` - Pension part of a one-time payment in cents
/// * `table` - The pension-relief cohort table
///
/// # Returns
///
/// All four amounts are zero when there is no pension income. A cohort year
/// missing from the table yields `TableIndexOutOfRange`.
pub fn pension_relief(
    pension: &PensionIncome,
    annual_pension: Decimal,
    yearly_period: bool,
    one_time_pension: Cents,
    table: &CohortTable<PensionReliefRow>,
) -> EngineResult<PensionRelief> {
    if annual_pension.is_zero() {
        return Ok(PensionRelief::default());
    }

    let row = table.row_for(pension.start_year, "pension_relief")?;
    let baseline = pension.monthly_baseline.as_decimal();
    let special = pension.special_payments.as_decimal();
    let one_time = one_time_pension.as_decimal();

    // Relief base in cents; caps in euros.
    let (base, relief_cap, mut supplement) = if yearly_period {
        let months = Decimal::from(pension.months_paid);
        (
            baseline * months + special,
            round_up(row.max * months / Decimal::from(12), 0),
            round_up(row.supplement * months / Decimal::from(12), 0),
        )
    } else {
        (
            round_down(baseline * Decimal::from(12) + special, 2),
            row.max,
            row.supplement,
        )
    };

    let relief = round_up(base * row.rate / Decimal::ONE_HUNDRED, 2)
        .min(relief_cap)
        .min(annual_pension);

    let relief_with_one_time =
        round_up(relief + one_time * row.rate / Decimal::ONE_HUNDRED, 2).min(row.max);

    let supplement_cap_with_one_time =
        round_down((base + one_time) / Decimal::ONE_HUNDRED - relief_with_one_time, 2);
    let mut supplement_with_one_time = round_up(supplement + one_time / Decimal::ONE_HUNDRED, 0);
    if supplement_with_one_time > supplement_cap_with_one_time {
        supplement_with_one_time = round_up(supplement_cap_with_one_time, 0);
    }
    supplement_with_one_time = supplement_with_one_time.min(row.supplement);

    let supplement_cap = round_down(base / Decimal::ONE_HUNDRED - relief, 2);
    if supplement > supplement_cap {
        supplement = round_up(supplement_cap, 0);
    }

    Ok(PensionRelief {
        relief,
        supplement,
        relief_with_one_time,
        supplement_with_one_time,
    })
}
