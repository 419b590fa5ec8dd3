//! Gross-to-net orchestration.
//!
//! Normalises a [`GrossNetInput`] into the withholding and contribution
//! inputs, runs both calculators and assembles the employee deduction lines,
//! the optional employer block and the audit trace.

use std::time::Instant;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::contributions::{care_discounted_children, compute_contributions, resolve_add_on_rate};
use super::rounding::round_commercial;
use super::withholding::compute_withholding;
use crate::config::{ConfigLoader, RateYear};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CareProvision, Cents, ContributionInput, DeductionKind,
    DeductionLine, EmployeeResult, EmployerResult, GrossNetInput, GrossNetResult, HealthInsurance,
    HealthProvision, ProvisionInput, ResultMeta, WithholdingInput, WithholdingResult,
};

const MAX_GROSS: i64 = 1_000_000_000;
const MAX_CHILDREN: u8 = 20;
const MAX_CHILD_ALLOWANCE_UNITS: i64 = 10;
const MAX_ADD_ON_PERCENT: i64 = 30;
const MAX_PRIVATE_PREMIUM: i64 = 50_000;
const MAX_SURCHARGE_PERCENT: i64 = 10;
const AGE_RELIEF_AGE: i32 = 65;

fn to_cents(euros: Decimal) -> Cents {
    Cents::from_decimal(round_commercial(euros * Decimal::ONE_HUNDRED, 0))
}

/// Scales a period amount to the year, rounded to whole cents.
fn annual_from_period(period: Cents, multiplier: Decimal) -> Cents {
    Cents::from_decimal(round_commercial(period.as_decimal() * multiplier, 0))
}

/// Scales an annual amount to the period, rounded to whole cents.
fn period_from_annual(annual: Cents, multiplier: Decimal) -> Cents {
    Cents::from_decimal(round_commercial(annual.as_decimal() / multiplier, 0))
}

fn tax_line(kind: DeductionKind, period: Cents, multiplier: Decimal) -> DeductionLine {
    DeductionLine::new(kind, period, annual_from_period(period, multiplier))
}

fn contribution_line(kind: DeductionKind, monthly_euros: Decimal, multiplier: Decimal) -> DeductionLine {
    let annual = to_cents(monthly_euros * Decimal::from(12));
    DeductionLine::new(kind, period_from_annual(annual, multiplier), annual)
}

fn period_amount(line: &mut DeductionLine) -> &mut Cents {
    &mut line.period
}

fn annual_amount(line: &mut DeductionLine) -> &mut Cents {
    &mut line.annual
}

/// Reduces lines from the last one backwards until their total no longer
/// exceeds `gross`. Returns the kinds that were reduced.
fn cap_to_gross(
    lines: &mut [DeductionLine],
    gross: Cents,
    amount: fn(&mut DeductionLine) -> &mut Cents,
) -> Vec<DeductionKind> {
    let mut total: Cents = lines.iter_mut().map(|line| *amount(line)).sum();
    let mut reduced = Vec::new();
    for line in lines.iter_mut().rev() {
        if total <= gross {
            break;
        }
        let kind = line.kind;
        let value = amount(line);
        let reduction = (total - gross).min(*value);
        if reduction > Cents::ZERO {
            *value = *value - reduction;
            total = total - reduction;
            reduced.push(kind);
        }
    }
    reduced
}

fn validate(input: &GrossNetInput) -> EngineResult<()> {
    if input.gross < Decimal::ZERO {
        return Err(EngineError::invalid_input("gross", "must not be negative"));
    }
    if input.annual_allowance < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "annual_allowance",
            "must not be negative",
        ));
    }
    if input.birth_year > input.year {
        return Err(EngineError::invalid_input(
            "birth_year",
            format!("{} is after the fiscal year {}", input.birth_year, input.year),
        ));
    }
    if input.child_allowance_units < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "child_allowance_units",
            "must not be negative",
        ));
    }
    if let HealthInsurance::Private { monthly_premium, .. } = &input.health {
        if *monthly_premium < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                "health.monthly_premium",
                "must not be negative",
            ));
        }
    }
    Ok(())
}

/// Fails when a clearly taxable wage produced no tax at all.
fn check_consistency(
    withholding: &WithholdingResult,
    input: &WithholdingInput,
    minimum_taxable_gross: Decimal,
) -> EngineResult<()> {
    let per_tariff_half =
        withholding.annual_taxable_income.to_euros() / input.tax_class.tariff_divisor();
    let untaxed = withholding.wage_tax.is_zero()
        && withholding.solidarity_surcharge.is_zero()
        && withholding.church_tax_base.is_zero();

    if untaxed && per_tariff_half >= minimum_taxable_gross {
        return Err(EngineError::ConsistencyCheckFailed {
            message: format!(
                "zero wage tax on an annual taxable income of {} EUR",
                withholding.annual_taxable_income.to_euros()
            ),
        });
    }
    Ok(())
}

/// Computes wage tax, surcharges, church tax and social-insurance
/// contributions for a gross wage.
///
/// # Arguments
///
/// * `input` - The gross-to-net request
/// * `config` - The loaded configuration
///
/// # Returns
///
/// A fully populated [`GrossNetResult`] with all amounts in cents, or an
/// error if the input is malformed, the year, state or insurer is unknown,
/// or the consistency check fails.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::compute_gross_net;
/// use gross_net_engine::config::ConfigLoader;
/// use gross_net_engine::models::{GrossNetInput, PayPeriod};
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::builtin().unwrap();
/// let input = GrossNetInput::new(Decimal::from(3_000), PayPeriod::Month, 2026);
/// let result = compute_gross_net(&input, config).unwrap();
/// assert_eq!(result.employee.deductions.len(), 7);
/// ```
pub fn compute_gross_net(input: &GrossNetInput, config: &ConfigLoader) -> EngineResult<GrossNetResult> {
    let calculation_id = Uuid::new_v4();
    let start_time = Instant::now();

    if let Err(err) = validate(input) {
        warn!(calculation_id = %calculation_id, error = %err, "Rejected gross-to-net input");
        return Err(err);
    }

    let rates = config.rate_year(input.year)?;
    let state = config.state(&input.state)?;
    let period = input.period;
    let multiplier = period.annual_multiplier();
    let mut warnings = Vec::new();

    // Gross amounts
    let max_gross = Decimal::from(MAX_GROSS);
    let gross = if input.gross > max_gross {
        warnings.push(AuditWarning::clamped(
            "gross",
            format!("gross {} clamped to {}", input.gross, max_gross),
        ));
        max_gross
    } else {
        input.gross
    };
    let gross_period = to_cents(gross);
    let gross_annual = annual_from_period(gross_period, multiplier);
    let gross_monthly = gross_annual.to_euros() / Decimal::from(12);

    let children = if input.children > MAX_CHILDREN {
        warnings.push(AuditWarning::clamped(
            "children",
            format!("{} children clamped to {}", input.children, MAX_CHILDREN),
        ));
        MAX_CHILDREN
    } else {
        input.children
    };
    let age = i32::from(input.year) - i32::from(input.birth_year);

    // Contributions
    let contributions = compute_contributions(
        &ContributionInput {
            gross_monthly,
            year: input.year,
            birth_year: input.birth_year,
            children,
            saxony: state.saxony_care_split,
            health: input.health.clone(),
            pension_insured: input.pension_insured,
        },
        rates,
    )?;

    // Withholding
    let withholding_input = build_withholding_input(
        input,
        rates,
        gross_period,
        children,
        age,
        state.saxony_care_split,
        contributions.private_subsidy,
        &mut warnings,
    )?;
    let withholding = compute_withholding(&withholding_input, rates)?;
    let tax = withholding.result;

    if let Err(err) = check_consistency(
        &tax,
        &withholding_input,
        config.settings().consistency_check.minimum_taxable_gross,
    ) {
        warn!(
            calculation_id = %calculation_id,
            gross_annual = %gross_annual,
            error = %err,
            "Consistency check failed"
        );
        return Err(err);
    }

    let church_tax = if input.church_tax {
        Cents::from_decimal(round_commercial(
            tax.church_tax_base.as_decimal() * state.church_tax_rate,
            0,
        ))
    } else {
        Cents::ZERO
    };

    // Employee block
    let mut deductions = vec![
        tax_line(DeductionKind::WageTax, tax.wage_tax, multiplier),
        tax_line(DeductionKind::SolidaritySurcharge, tax.solidarity_surcharge, multiplier),
        tax_line(DeductionKind::ChurchTax, church_tax, multiplier),
        contribution_line(DeductionKind::Pension, contributions.pension, multiplier),
        contribution_line(DeductionKind::Unemployment, contributions.unemployment, multiplier),
        contribution_line(DeductionKind::Care, contributions.care, multiplier),
        contribution_line(DeductionKind::Health, contributions.health, multiplier),
    ];
    let mut capped = cap_to_gross(&mut deductions, gross_period, period_amount);
    capped.extend(cap_to_gross(&mut deductions, gross_annual, annual_amount));
    capped.sort_by_key(|kind| DeductionKind::EMPLOYEE.iter().position(|k| k == kind));
    capped.dedup();
    if !capped.is_empty() {
        let labels: Vec<&str> = capped.iter().map(|kind| kind.label()).collect();
        warnings.push(AuditWarning {
            code: "deductions_capped".to_string(),
            message: format!("{} reduced so deductions do not exceed gross", labels.join(", ")),
            severity: "medium".to_string(),
        });
    }
    let total_deductions_period: Cents = deductions.iter().map(|line| line.period).sum();
    let total_deductions_annual: Cents = deductions.iter().map(|line| line.annual).sum();
    let employee = EmployeeResult {
        net_period: (gross_period - total_deductions_period).max_zero(),
        net_annual: (gross_annual - total_deductions_annual).max_zero(),
        deductions,
        total_deductions_period,
        total_deductions_annual,
    };

    // Employer block
    let employer = input
        .employer_surcharges
        .as_ref()
        .filter(|surcharges| surcharges.enabled)
        .map(|surcharges| {
            let mut line = |kind: DeductionKind, percent: Decimal| {
                let max = Decimal::from(MAX_SURCHARGE_PERCENT);
                let clamped = percent.clamp(Decimal::ZERO, max);
                if clamped != percent {
                    warnings.push(AuditWarning::clamped(
                        &kind.label().to_lowercase(),
                        format!("{} rate {} % clamped to {} %", kind.label(), percent, clamped),
                    ));
                }
                let annual = Cents::from_decimal(round_commercial(
                    gross_annual.as_decimal() * clamped / Decimal::ONE_HUNDRED,
                    0,
                ));
                DeductionLine::new(kind, period_from_annual(annual, multiplier), annual)
            };
            let surcharges = vec![
                line(DeductionKind::U1, surcharges.u1_percent),
                line(DeductionKind::U2, surcharges.u2_percent),
            ];
            EmployerResult {
                total_cost_period: gross_period
                    + surcharges.iter().map(|line| line.period).sum::<Cents>(),
                total_cost_annual: gross_annual
                    + surcharges.iter().map(|line| line.annual).sum::<Cents>(),
                surcharges,
            }
        });

    // Audit trace
    let mut audit_trace = AuditTrace::default();
    audit_trace.extend_steps(withholding.audit_steps);
    audit_trace.push_step(contributions.audit_step);
    audit_trace.push_step(church_tax_step(
        input.church_tax,
        &input.state,
        state.church_tax_rate,
        tax.church_tax_base,
        church_tax,
    ));
    audit_trace.warnings = warnings;
    audit_trace.duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        calculation_id = %calculation_id,
        year = input.year,
        period = %period,
        tax_class = %input.tax_class,
        gross_period = %gross_period,
        net_period = %employee.net_period,
        duration_us = audit_trace.duration_us,
        "Gross-to-net calculation completed"
    );

    Ok(GrossNetResult {
        calculation_id,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        meta: ResultMeta {
            year: input.year,
            period,
            gross_period,
            gross_annual,
        },
        employee,
        employer,
        withholding: tax,
        audit_trace,
    })
}

#[allow(clippy::too_many_arguments)]
fn build_withholding_input(
    input: &GrossNetInput,
    rates: &RateYear,
    gross_period: Cents,
    children: u8,
    age: i32,
    saxony: bool,
    private_subsidy: Decimal,
    warnings: &mut Vec<AuditWarning>,
) -> EngineResult<WithholdingInput> {
    let multiplier = input.period.annual_multiplier();
    let allowance = Cents::from_decimal(
        (to_cents(input.annual_allowance).as_decimal() / multiplier).trunc(),
    );

    let child_allowance_units = if input.tax_class.allows_child_allowance() {
        let max = Decimal::from(MAX_CHILD_ALLOWANCE_UNITS);
        if input.child_allowance_units > max {
            warnings.push(AuditWarning::clamped(
                "child_allowance_units",
                format!("{} units clamped to {}", input.child_allowance_units, max),
            ));
            max
        } else {
            input.child_allowance_units
        }
    } else {
        Decimal::ZERO
    };

    let health = match &input.health {
        HealthInsurance::Private { monthly_premium, .. } => HealthProvision::Private {
            monthly_premium: to_cents(
                (*monthly_premium).clamp(Decimal::ZERO, Decimal::from(MAX_PRIVATE_PREMIUM)),
            ),
            employer_subsidy: to_cents(private_subsidy),
        },
        HealthInsurance::StatutoryGeneral { .. } | HealthInsurance::StatutoryReduced { .. } => {
            let add_on = resolve_add_on_rate(&input.health, rates)?.unwrap_or_default();
            HealthProvision::Statutory {
                add_on_percent: (add_on * Decimal::ONE_HUNDRED)
                    .clamp(Decimal::ZERO, Decimal::from(MAX_ADD_ON_PERCENT)),
            }
        }
    };

    let contribution_rates = &rates.contributions;
    let care = CareProvision {
        saxony,
        childless_surcharge: children == 0
            && age >= i32::from(contribution_rates.care_childless_surcharge_min_age),
        discounted_children: care_discounted_children(
            children,
            contribution_rates.care_max_discounted_children,
        ),
    };

    let age_relief_year = (age >= AGE_RELIEF_AGE)
        .then(|| input.birth_year.saturating_add(AGE_RELIEF_AGE as u16));

    Ok(WithholdingInput {
        allowance,
        church_member: input.church_tax,
        age_relief_year,
        child_allowance_units,
        provision: ProvisionInput {
            pension_insured: input.pension_insured,
            unemployment_insured: true,
            health,
            care,
        },
        ..WithholdingInput::new(input.period, input.tax_class, gross_period)
    })
}

fn church_tax_step(
    liable: bool,
    state_code: &str,
    rate: Decimal,
    base: Cents,
    church_tax: Cents,
) -> AuditStep {
    AuditStep {
        step_number: 0,
        rule_id: "church_tax".to_string(),
        rule_name: "Church Tax".to_string(),
        legal_ref: "§ 51a EStG".to_string(),
        input: json!({
            "liable": liable,
            "state": state_code.to_uppercase(),
            "rate": rate.normalize().to_string(),
            "base": base,
        }),
        output: json!({
            "church_tax": church_tax,
        }),
        reasoning: if liable {
            format!("{} × {} = {}", base, rate.normalize(), church_tax)
        } else {
            "Not liable to church tax".to_string()
        },
    }
}
