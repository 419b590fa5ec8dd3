//! The wage-tax withholding procedure.
//!
//! This module drives the stages of the annual withholding calculation for
//! one pay period: annualise the period amounts, apply the pension and age
//! reliefs, deduct the table allowances and the insurance provision, apply
//! the tariff, derive the solidarity surcharge and church-tax base, and
//! finally tax any one-time payment. Each stage records an [`AuditStep`].

use rust_decimal::Decimal;
use serde_json::json;
use tracing::debug;

use super::age_relief::age_relief;
use super::annualize::{annualize_input, period_share};
use super::one_time_payment::{RegularWithholding, one_time_withholding};
use super::pension_relief::{PensionRelief, pension_relief};
use super::rounding::{floor_zero, round_down};
use super::solidarity::{annual_solidarity_surcharge, solidarity_threshold};
use super::taxable_base::{reduce_taxable_base, table_allowances};
use super::tariff::assess_income_tax;
use crate::config::RateYear;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllowanceUsage, AuditStep, Cents, PayPeriod, TaxClass, WithholdingInput, WithholdingResult,
};

/// The withholding result with the audit steps that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct WithholdingCalculation {
    /// Period amounts in cents.
    pub result: WithholdingResult,
    /// Audit steps numbered from 1.
    pub audit_steps: Vec<AuditStep>,
}

fn audit_step(
    rule_id: &str,
    rule_name: &str,
    legal_ref: &str,
    input: serde_json::Value,
    output: serde_json::Value,
    reasoning: String,
) -> AuditStep {
    AuditStep {
        step_number: 0,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        legal_ref: legal_ref.to_string(),
        input,
        output,
        reasoning,
    }
}

fn validate(input: &WithholdingInput) -> EngineResult<()> {
    if input.gross < Cents::ZERO {
        return Err(EngineError::invalid_input("gross", "must not be negative"));
    }
    if input.allowance < Cents::ZERO {
        return Err(EngineError::invalid_input("allowance", "must not be negative"));
    }
    if input.add_back < Cents::ZERO {
        return Err(EngineError::invalid_input("add_back", "must not be negative"));
    }
    if input.child_allowance_units < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "child_allowance_units",
            "must not be negative",
        ));
    }
    if let Some(factor) = input.tax_factor.filter(|factor| !factor.is_zero()) {
        if factor < Decimal::ZERO || factor > Decimal::ONE {
            return Err(EngineError::invalid_input(
                "tax_factor",
                format!("{} is outside (0, 1]", factor),
            ));
        }
        if input.tax_class != TaxClass::IV {
            return Err(EngineError::invalid_input(
                "tax_factor",
                "the factor method applies to tax class IV only",
            ));
        }
    }
    if let Some(pension) = &input.pension {
        if pension.period_amount < Cents::ZERO || pension.period_amount > input.gross {
            return Err(EngineError::invalid_input(
                "pension.period_amount",
                "must be between zero and the gross wage",
            ));
        }
        if pension.months_paid > 12 {
            return Err(EngineError::invalid_input(
                "pension.months_paid",
                "must not exceed 12",
            ));
        }
    }
    if let Some(payment) = &input.one_time {
        if payment.amount < Cents::ZERO || payment.pension_portion > payment.amount {
            return Err(EngineError::invalid_input(
                "one_time.amount",
                "must not be negative or smaller than its pension portion",
            ));
        }
    }
    Ok(())
}

/// Computes the wage tax, solidarity surcharge and church-tax base for one
/// pay period.
///
/// # Arguments
///
/// * `input` - The canonical withholding input
/// * `rates` - The fiscal year's rate table
///
/// # Returns
///
/// The period amounts in cents with the audit steps, or `InvalidInput` for
/// malformed input and `TableIndexOutOfRange` for a cohort year the tables
/// do not cover.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::compute_withholding;
/// use gross_net_engine::config::ConfigLoader;
/// use gross_net_engine::models::{Cents, PayPeriod, TaxClass, WithholdingInput};
///
/// let rates = ConfigLoader::builtin().unwrap().rate_year(2026).unwrap();
/// let input = WithholdingInput::new(PayPeriod::Month, TaxClass::I, Cents(100_000));
/// let calculation = compute_withholding(&input, rates).unwrap();
/// assert_eq!(calculation.result.wage_tax, Cents::ZERO);
/// ```
pub fn compute_withholding(
    input: &WithholdingInput,
    rates: &RateYear,
) -> EngineResult<WithholdingCalculation> {
    validate(input)?;

    let mut steps = Vec::new();
    let factor = input.factor();
    let period = input.period;

    // Annual amounts
    let amounts = annualize_input(input);
    steps.push(audit_step(
        "annualize_wage",
        "Annual Wage",
        "§ 39b Abs. 2 Satz 2 EStG",
        json!({
            "period": period.as_str(),
            "gross": input.gross,
            "allowance": input.allowance,
            "add_back": input.add_back,
        }),
        json!({
            "annual_wage": amounts.wage.normalize().to_string(),
            "annual_pension": amounts.pension.normalize().to_string(),
            "annual_allowance": amounts.allowance.normalize().to_string(),
            "annual_add_back": amounts.add_back.normalize().to_string(),
        }),
        format!(
            "{} × {} = {} EUR annual wage",
            input.gross.to_euros(),
            period.annual_multiplier().round_dp(4).normalize(),
            amounts.wage.normalize()
        ),
    ));

    // Reliefs
    let relief = match &input.pension {
        Some(pension) => pension_relief(
            pension,
            amounts.pension,
            period == PayPeriod::Year,
            Cents::ZERO,
            &rates.pension_relief,
        )?,
        None => PensionRelief::default(),
    };
    let age = age_relief(
        input.age_relief_year,
        amounts.wage,
        amounts.pension,
        &rates.age_relief,
    )?;
    let base = reduce_taxable_base(&amounts, relief.relief, age);
    steps.push(audit_step(
        "pension_and_age_relief",
        "Pension and Age Relief",
        "§ 19 Abs. 2 EStG, § 24a EStG",
        json!({
            "annual_pension": amounts.pension.normalize().to_string(),
            "age_relief_year": input.age_relief_year,
        }),
        json!({
            "pension_relief": relief.relief.normalize().to_string(),
            "pension_supplement": relief.supplement.normalize().to_string(),
            "age_relief": age.normalize().to_string(),
            "reduced_wage": base.wage.normalize().to_string(),
        }),
        format!(
            "{} - {} - {} - {} + {} = {} EUR",
            amounts.wage.normalize(),
            relief.relief.normalize(),
            age.normalize(),
            amounts.allowance.normalize(),
            amounts.add_back.normalize(),
            base.wage.normalize()
        ),
    ));

    // Table allowances
    let allowances = table_allowances(
        &base,
        relief.supplement,
        input.tax_class,
        input.child_allowance_units,
        &rates.allowances,
    );
    steps.push(audit_step(
        "table_allowances",
        "Table Allowances",
        "§ 39b Abs. 2 Satz 5 EStG",
        json!({
            "tax_class": input.tax_class.number(),
            "child_allowance_units": input.child_allowance_units.normalize().to_string(),
        }),
        json!({
            "lump_sum": allowances.lump_sum.normalize().to_string(),
            "pension_supplement": allowances.pension_supplement.normalize().to_string(),
            "special_expenses": allowances.special_expenses.normalize().to_string(),
            "single_parent": allowances.single_parent.normalize().to_string(),
            "child_allowance": allowances.child_allowance.normalize().to_string(),
            "total": allowances.total.normalize().to_string(),
        }),
        format!(
            "Tax class {}: {} EUR table allowances",
            input.tax_class,
            allowances.total.normalize()
        ),
    ));

    // Provision and tariff
    let assessment = assess_income_tax(
        &base,
        allowances.total,
        input.tax_class,
        &input.provision,
        rates,
    );
    let provision = assessment.provision;
    steps.push(audit_step(
        "provision_allowance",
        "Insurance Provision",
        "§ 39b Abs. 2 Satz 5 Nr. 3 EStG",
        json!({
            "provision_base": base.provision_base.normalize().to_string(),
            "pension_insured": input.provision.pension_insured,
            "unemployment_insured": input.provision.unemployment_insured,
        }),
        json!({
            "pension_part": provision.pension_part.normalize().to_string(),
            "health_care_part": provision.health_care_part.normalize().to_string(),
            "unemployment_part": provision.unemployment_part.normalize().to_string(),
            "total": provision.total.normalize().to_string(),
        }),
        format!("{} EUR deductible provision", provision.total.normalize()),
    ));

    let taxable_income = assessment.tariff.taxable_income;
    let annual_tax = round_down(assessment.tariff.tax * factor, 0);
    let wage_tax = period_share(annual_tax * Decimal::ONE_HUNDRED, period);
    debug!(
        tax_class = input.tax_class.number(),
        taxable_income = %taxable_income,
        annual_tax = %annual_tax,
        "Applied income-tax tariff"
    );
    steps.push(audit_step(
        "income_tax_tariff",
        "Income Tax Tariff",
        if input.tax_class.uses_split_procedure() {
            "§ 39b Abs. 2 Satz 7 EStG"
        } else {
            "§ 32a EStG"
        },
        json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "x": assessment.tariff.x.normalize().to_string(),
            "factor": factor.normalize().to_string(),
        }),
        json!({
            "annual_tax": annual_tax.normalize().to_string(),
            "period_tax": wage_tax.normalize().to_string(),
        }),
        format!(
            "Tariff on {} EUR = {} EUR annual wage tax",
            taxable_income.normalize(),
            annual_tax.normalize()
        ),
    ));

    // Solidarity surcharge and church-tax base, reduced by child allowances
    let surcharge_base = if input.child_allowance_units > Decimal::ZERO {
        let with_children = assess_income_tax(
            &base,
            allowances.total + allowances.child_allowance,
            input.tax_class,
            &input.provision,
            rates,
        );
        round_down(with_children.tariff.tax * factor, 0)
    } else {
        annual_tax
    };
    let threshold = solidarity_threshold(allowances.divisor, &rates.solidarity);
    let annual_surcharge = annual_solidarity_surcharge(surcharge_base, threshold, &rates.solidarity);
    let solidarity_surcharge = period_share(
        round_down(annual_surcharge * Decimal::ONE_HUNDRED, 0),
        period,
    );
    let church_tax_base = if input.church_member {
        period_share(surcharge_base * Decimal::ONE_HUNDRED, period)
    } else {
        Decimal::ZERO
    };
    steps.push(audit_step(
        "solidarity_surcharge",
        "Solidarity Surcharge",
        "§ 3, § 4 SolZG 1995",
        json!({
            "assessment_base": surcharge_base.normalize().to_string(),
            "threshold": threshold.normalize().to_string(),
        }),
        json!({
            "annual_surcharge": annual_surcharge.normalize().to_string(),
            "period_surcharge": solidarity_surcharge.normalize().to_string(),
            "church_tax_base": church_tax_base.normalize().to_string(),
        }),
        if surcharge_base <= threshold {
            format!(
                "{} EUR does not exceed the {} EUR threshold",
                surcharge_base.normalize(),
                threshold.normalize()
            )
        } else {
            format!(
                "{} EUR above the {} EUR threshold: {} EUR surcharge",
                surcharge_base.normalize(),
                threshold.normalize(),
                annual_surcharge.normalize()
            )
        },
    ));

    // One-time payment
    let regular = RegularWithholding {
        wage_tax,
        solidarity_surcharge,
        church_tax_base,
    };
    let one_time = one_time_withholding(input, regular, rates)?;
    if let Some(payment) = input.one_time.as_ref().filter(|payment| !payment.is_empty()) {
        steps.push(audit_step(
            "one_time_payment",
            "One-Time Payment",
            "§ 39b Abs. 3 EStG",
            json!({
                "amount": payment.amount,
                "expected_annual_wage": payment.expected_annual_wage,
                "equity_benefit": payment.equity_benefit,
            }),
            json!({
                "wage_tax": one_time.wage_tax.normalize().to_string(),
                "solidarity_surcharge": one_time.solidarity_surcharge.normalize().to_string(),
                "church_tax_base": one_time.church_tax_base.normalize().to_string(),
            }),
            format!(
                "Annual tax difference with and without the payment: {} cents",
                one_time.wage_tax.normalize()
            ),
        ));
    }

    let basic_allowance = rates.tariff.basic_allowance;
    let used_current = round_down(
        (allowances.lump_sum + relief.relief + allowances.pension_supplement) * Decimal::ONE_HUNDRED,
        0,
    );
    let taxable_above_basic_current = floor_zero(round_down(
        (taxable_income - basic_allowance) * Decimal::ONE_HUNDRED,
        0,
    ));

    let result = WithholdingResult {
        wage_tax: Cents::from_decimal(one_time.regular.wage_tax),
        solidarity_surcharge: Cents::from_decimal(one_time.regular.solidarity_surcharge),
        church_tax_base: Cents::from_decimal(one_time.regular.church_tax_base),
        one_time_wage_tax: Cents::from_decimal(one_time.wage_tax),
        one_time_solidarity_surcharge: Cents::from_decimal(one_time.solidarity_surcharge),
        one_time_church_tax_base: Cents::from_decimal(one_time.church_tax_base),
        annual_taxable_income: Cents::from_decimal(taxable_income * Decimal::ONE_HUNDRED),
        allowance_usage: AllowanceUsage {
            used_current: Cents::from_decimal(used_current),
            used_annual: Cents::from_decimal(one_time.used_annual),
            used_one_time: Cents::from_decimal(one_time.used_one_time),
            taxable_above_basic_current: Cents::from_decimal(taxable_above_basic_current),
            taxable_above_basic_annual: Cents::from_decimal(one_time.taxable_above_basic_annual),
            taxable_above_basic_one_time: Cents::from_decimal(
                one_time.taxable_above_basic_one_time,
            ),
        },
    };

    debug!(
        wage_tax = %result.wage_tax,
        solidarity_surcharge = %result.solidarity_surcharge,
        church_tax_base = %result.church_tax_base,
        "Computed withholding"
    );

    for (index, step) in steps.iter_mut().enumerate() {
        step.step_number = index as u32 + 1;
    }

    Ok(WithholdingCalculation {
        result,
        audit_steps: steps,
    })
}
