//! Insurance provision allowance (Vorsorgepauschale, § 39b Abs. 2 Satz 5 Nr. 3 EStG).
//!
//! The provision estimates the employee's deductible insurance contributions
//! from the wage: a pension part and a health/care part, or alternatively
//! the pension part plus a capped unemployment and health/care part when
//! that is larger.

use rust_decimal::Decimal;

use super::rounding::{floor_zero, round_down, round_up};
use crate::config::{ContributionRates, RateYear};
use crate::models::{CareProvision, HealthProvision, ProvisionInput, TaxClass};

/// The parts of the provision allowance in annual euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionAllowance {
    /// Pension insurance part.
    pub pension_part: Decimal,
    /// Health and care insurance part.
    pub health_care_part: Decimal,
    /// Unemployment insurance part (zero when the alternative is not computed).
    pub unemployment_part: Decimal,
    /// The deductible provision, in whole euros.
    pub total: Decimal,
}

/// Employee care rate for the provision, including the childless surcharge
/// or the discount for additional children.
pub fn provision_care_rate(care: &CareProvision, rates: &ContributionRates) -> Decimal {
    let base = rates.care_employee_base_rate(care.saxony);
    if care.childless_surcharge {
        base + rates.care_childless_surcharge
    } else {
        let children = care.discounted_children.min(rates.care_max_discounted_children);
        base - Decimal::from(children) * rates.care_child_discount
    }
}

/// Computes the provision allowance for an annual provision base.
///
/// # Arguments
///
/// * `provision_base` - Annual wage used as the provision base
/// * `tax_class` - The wage-tax class
/// * `provision` - Insurance memberships and health/care parameters
/// * `rates` - The fiscal year's rate table
pub fn provision_allowance(
    provision_base: Decimal,
    tax_class: TaxClass,
    provision: &ProvisionInput,
    rates: &RateYear,
) -> ProvisionAllowance {
    let contributions = &rates.contributions;
    let pension_base = provision_base.min(rates.ceilings.pension_unemployment_annual());
    let health_base = provision_base.min(rates.ceilings.health_care_annual());

    let pension_part = if provision.pension_insured {
        round_down(pension_base * contributions.pension_employee_rate, 2)
    } else {
        Decimal::ZERO
    };

    let health_care_part = match &provision.health {
        HealthProvision::Private { .. } if tax_class == TaxClass::VI => Decimal::ZERO,
        HealthProvision::Private {
            monthly_premium,
            employer_subsidy,
        } => {
            let twelve = Decimal::from(12);
            let premium = round_down(monthly_premium.as_decimal() * twelve / Decimal::ONE_HUNDRED, 2);
            let subsidy = round_down(employer_subsidy.as_decimal() * twelve / Decimal::ONE_HUNDRED, 2);
            floor_zero(premium - subsidy)
        }
        HealthProvision::Statutory { add_on_percent } => {
            let health_rate = *add_on_percent / Decimal::TWO / Decimal::ONE_HUNDRED
                + contributions.health_reduced_employee_rate;
            let care_rate = provision_care_rate(&provision.care, contributions);
            round_down(health_base * (health_rate + care_rate), 2)
        }
    };

    let mut total = round_up(health_care_part + pension_part, 0);
    let mut unemployment_part = Decimal::ZERO;

    if provision.unemployment_insured && tax_class != TaxClass::VI {
        unemployment_part = round_down(
            contributions.unemployment_employee_rate * pension_base,
            2,
        );
        let capped = round_down(unemployment_part + health_care_part, 2)
            .min(rates.provision.unemployment_health_cap);
        let alternative = round_up(pension_part + capped, 0);
        total = total.max(alternative);
    }

    ProvisionAllowance {
        pension_part,
        health_care_part,
        unemployment_part,
        total,
    }
}
