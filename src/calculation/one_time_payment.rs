//! Tax on non-periodic payments (sonstige Bezüge, § 39b Abs. 3 EStG).
//!
//! The tax on a one-time payment is the difference between the annual tax on
//! the expected annual wage with and without the payment. A negative
//! difference can only arise from a non-taxable equity benefit and then
//! reduces the regular withholding.

use rust_decimal::Decimal;

use super::age_relief::age_relief;
use super::annualize::AnnualAmounts;
use super::pension_relief::pension_relief;
use super::rounding::{floor_zero, round_down};
use super::solidarity::{one_time_solidarity_surcharge, solidarity_threshold};
use super::taxable_base::{TableAllowances, reduce_taxable_base, table_allowances};
use super::tariff::{assess_income_tax, tariff_tax};
use crate::config::RateYear;
use crate::error::EngineResult;
use crate::models::{Cents, PensionIncome, WithholdingInput};

/// Regular withholding for the pay period in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegularWithholding {
    /// Wage tax.
    pub wage_tax: Decimal,
    /// Solidarity surcharge.
    pub solidarity_surcharge: Decimal,
    /// Church-tax base.
    pub church_tax_base: Decimal,
}

/// Withholding on a one-time payment, in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneTimeWithholding {
    /// Wage tax on the payment.
    pub wage_tax: Decimal,
    /// Solidarity surcharge on the payment.
    pub solidarity_surcharge: Decimal,
    /// Church-tax base of the payment.
    pub church_tax_base: Decimal,
    /// Regular withholding, reduced by a negative differential.
    pub regular: RegularWithholding,
    /// Allowances used by the annual wage without the payment.
    pub used_annual: Decimal,
    /// Additional allowances used by the payment.
    pub used_one_time: Decimal,
    /// Taxable income above the basic allowance without the payment.
    pub taxable_above_basic_annual: Decimal,
    /// Taxable income above the basic allowance with the payment.
    pub taxable_above_basic_one_time: Decimal,
}

fn used_allowances(allowances: &TableAllowances, pension_relief: Decimal) -> Decimal {
    round_down(
        (allowances.lump_sum + pension_relief + allowances.pension_supplement) * Decimal::ONE_HUNDRED,
        2,
    )
}

fn cents_to_euros(cents: Cents) -> Decimal {
    round_down(cents.as_decimal() / Decimal::ONE_HUNDRED, 2)
}

/// Computes the withholding on the input's one-time payment.
///
/// Without a payment or equity benefit all one-time figures are zero and the
/// regular withholding is returned unchanged.
///
/// # Arguments
///
/// * `input` - The withholding input carrying the one-time payment block
/// * `regular` - The regular withholding for the pay period
/// * `rates` - The fiscal year's rate table
pub fn one_time_withholding(
    input: &WithholdingInput,
    regular: RegularWithholding,
    rates: &RateYear,
) -> EngineResult<OneTimeWithholding> {
    let payment = match &input.one_time {
        Some(payment) if !payment.is_empty() => payment,
        _ => {
            return Ok(OneTimeWithholding {
                regular,
                ..Default::default()
            });
        }
    };

    // The annual procedure always runs on a yearly pay period.
    let pension = match &input.pension {
        Some(pension) => PensionIncome {
            months_paid: if pension.months_paid == 0 {
                12
            } else {
                pension.months_paid
            },
            ..pension.clone()
        },
        None => PensionIncome {
            period_amount: Cents::ZERO,
            start_year: 0,
            monthly_baseline: Cents::ZERO,
            special_payments: Cents::ZERO,
            months_paid: 12,
        },
    };
    let factor = input.factor();
    let basic_allowance = rates.tariff.basic_allowance;

    // Annual tax without the payment.
    let without = AnnualAmounts {
        wage: cents_to_euros(payment.expected_annual_wage),
        pension: cents_to_euros(payment.expected_annual_pension),
        allowance: cents_to_euros(payment.annual_allowance),
        add_back: cents_to_euros(payment.annual_add_back),
    };
    let relief = pension_relief(
        &pension,
        without.pension,
        true,
        Cents::ZERO,
        &rates.pension_relief,
    )?;
    let age = age_relief(input.age_relief_year, without.wage, without.pension, &rates.age_relief)?;
    let mut base = reduce_taxable_base(&without, relief.relief, age);
    base.provision_base -= payment.annual_wage_excluded.as_decimal() / Decimal::ONE_HUNDRED;
    let allowances = table_allowances(
        &base,
        relief.supplement,
        input.tax_class,
        input.child_allowance_units,
        &rates.allowances,
    );
    let used_annual = used_allowances(&allowances, relief.relief);
    let assessment = assess_income_tax(
        &base,
        allowances.total,
        input.tax_class,
        &input.provision,
        rates,
    );
    let taxable_above_basic_annual = floor_zero(round_down(
        (assessment.tariff.taxable_income - basic_allowance) * Decimal::ONE_HUNDRED,
        2,
    ));
    let tax_without = assessment.tariff.tax * Decimal::ONE_HUNDRED;

    // Annual tax with the payment.
    let with = AnnualAmounts {
        wage: cents_to_euros(payment.expected_annual_wage + payment.amount),
        pension: cents_to_euros(payment.expected_annual_pension + payment.pension_portion),
        ..without
    };
    let relief = pension_relief(
        &pension,
        with.pension,
        true,
        payment.death_benefit,
        &rates.pension_relief,
    )?;
    let age = age_relief(input.age_relief_year, with.wage, with.pension, &rates.age_relief)?;
    let mut base = reduce_taxable_base(&with, relief.relief_with_one_time, age);
    base.provision_base += (payment.equity_benefit.as_decimal()
        - payment.annual_wage_excluded.as_decimal()
        - payment.payment_excluded.as_decimal())
        / Decimal::ONE_HUNDRED;
    let allowances = table_allowances(
        &base,
        relief.supplement_with_one_time,
        input.tax_class,
        input.child_allowance_units,
        &rates.allowances,
    );
    let used_one_time = used_allowances(&allowances, relief.relief_with_one_time) - used_annual;
    let assessment = assess_income_tax(
        &base,
        allowances.total,
        input.tax_class,
        &input.provision,
        rates,
    );
    let taxable_above_basic_one_time = floor_zero(round_down(
        (assessment.tariff.taxable_income - basic_allowance) * Decimal::ONE_HUNDRED,
        2,
    ));
    let tax_with = assessment.tariff.tax * Decimal::ONE_HUNDRED;

    let difference =
        round_down((tax_with - tax_without) * factor / Decimal::ONE_HUNDRED, 0) * Decimal::ONE_HUNDRED;

    let mut result = OneTimeWithholding {
        regular,
        used_annual,
        used_one_time,
        taxable_above_basic_annual,
        taxable_above_basic_one_time,
        ..Default::default()
    };

    if difference < Decimal::ZERO {
        if !payment.equity_benefit.is_zero() {
            let solidarity_reduction = difference * rates.solidarity.rate_percent / Decimal::ONE_HUNDRED;
            result.regular = RegularWithholding {
                wage_tax: floor_zero(regular.wage_tax + difference),
                solidarity_surcharge: floor_zero(round_down(
                    regular.solidarity_surcharge + solidarity_reduction,
                    0,
                )),
                church_tax_base: floor_zero(regular.church_tax_base + difference),
            };
        }
        return Ok(result);
    }

    let threshold = solidarity_threshold(allowances.divisor, &rates.solidarity);
    let surcharge_income = if input.child_allowance_units > Decimal::ZERO {
        assessment.tariff.taxable_income - allowances.child_allowance
    } else {
        assessment.tariff.taxable_income
    };
    let surcharge_base = round_down(
        tariff_tax(surcharge_income, input.tax_class, rates).tax * factor,
        0,
    );

    result.wage_tax = difference;
    result.solidarity_surcharge =
        one_time_solidarity_surcharge(difference, surcharge_base, threshold, &rates.solidarity);
    if input.church_member {
        result.church_tax_base = difference;
    }

    Ok(result)
}
