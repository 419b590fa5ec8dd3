//! Employee social-insurance contributions.
//!
//! Monthly contributions to pension, unemployment, health and long-term-care
//! insurance, each on the gross wage capped at the branch's contribution
//! ceiling. Amounts are returned unrounded in euros; the orchestrator rounds
//! them when converting to cents.

use rust_decimal::Decimal;
use serde_json::json;

use crate::config::{ContributionRates, RateYear};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, ContributionInput, HealthInsurance};

const MAX_GROSS_MONTHLY: i64 = 1_000_000_000;
const MAX_PRIVATE_PREMIUM: i64 = 50_000;

/// Upper bound for the health add-on rate and the care rate.
fn rate_cap() -> Decimal {
    Decimal::new(2, 1)
}

/// Monthly employee contributions in euros.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionResult {
    /// Pension insurance.
    pub pension: Decimal,
    /// Unemployment insurance.
    pub unemployment: Decimal,
    /// Health insurance, or the employee's share of a private premium.
    pub health: Decimal,
    /// Long-term-care insurance.
    pub care: Decimal,
    /// Employer subsidy towards a private premium.
    pub private_subsidy: Decimal,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Resolves the total add-on rate for statutory health insurance.
///
/// An explicit rate wins over a provider id. Without either, the year's
/// default insurer is used, or zero for an empty catalogue.
///
/// # Returns
///
/// `None` for private insurance, `UnknownHealthInsurer` for an id missing
/// from the catalogue.
///
/// # Example
///
/// ```
/// use gross_net_engine::calculation::resolve_add_on_rate;
/// use gross_net_engine::config::ConfigLoader;
/// use gross_net_engine::models::HealthInsurance;
/// use rust_decimal::Decimal;
///
/// let rates = ConfigLoader::builtin().unwrap().rate_year(2026).unwrap();
/// let rate = resolve_add_on_rate(&HealthInsurance::statutory("tk"), rates).unwrap();
/// assert_eq!(rate, Some(Decimal::new(26, 3)));
/// ```
pub fn resolve_add_on_rate(
    health: &HealthInsurance,
    rates: &RateYear,
) -> EngineResult<Option<Decimal>> {
    let (provider_id, add_on_rate) = match health {
        HealthInsurance::Private { .. } => return Ok(None),
        HealthInsurance::StatutoryGeneral {
            provider_id,
            add_on_rate,
        }
        | HealthInsurance::StatutoryReduced {
            provider_id,
            add_on_rate,
        } => (provider_id, add_on_rate),
    };

    if let Some(rate) = add_on_rate {
        return Ok(Some(*rate));
    }

    match provider_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(Some(rates.health_insurer(id)?.add_on_rate)),
        _ => Ok(Some(
            rates
                .default_health_insurer()
                .map(|insurer| insurer.add_on_rate)
                .unwrap_or_default(),
        )),
    }
}

/// Number of children beyond the first that earn a care discount.
pub fn care_discounted_children(children: u8, max: u8) -> u8 {
    children.saturating_sub(1).min(max)
}

/// Employee care rate, clamped to `[0, 0.2]`.
pub fn care_employee_rate(input: &ContributionInput, rates: &ContributionRates) -> Decimal {
    let base = rates.care_employee_base_rate(input.saxony);
    let childless =
        input.children == 0 && input.age() >= i32::from(rates.care_childless_surcharge_min_age);
    let surcharge = if childless {
        rates.care_childless_surcharge
    } else {
        Decimal::ZERO
    };
    let discount = Decimal::from(care_discounted_children(
        input.children,
        rates.care_max_discounted_children,
    )) * rates.care_child_discount;

    (base + surcharge - discount).clamp(Decimal::ZERO, rate_cap())
}

/// Computes the monthly employee contributions.
///
/// # Arguments
///
/// * `input` - Monthly gross, age, children, state and insurance details
/// * `rates` - The fiscal year's rate table
///
/// # Returns
///
/// The four monthly contributions in euros, or `UnknownHealthInsurer` when
/// a statutory provider id is not in the year's catalogue.
pub fn compute_contributions(
    input: &ContributionInput,
    rates: &RateYear,
) -> EngineResult<ContributionResult> {
    if input.gross_monthly < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_monthly",
            "must not be negative",
        ));
    }

    let contributions = &rates.contributions;
    let gross = input.gross_monthly.min(Decimal::from(MAX_GROSS_MONTHLY));
    let pension_base = gross.min(rates.ceilings.pension_unemployment_monthly);
    let health_base = gross.min(rates.ceilings.health_care_monthly);

    let pension_rate = if input.pension_insured {
        contributions.pension_employee_rate
    } else {
        Decimal::ZERO
    };
    let pension = pension_base * pension_rate;
    let unemployment = pension_base * contributions.unemployment_employee_rate;

    let care_rate = care_employee_rate(input, contributions);
    let care = health_base * care_rate;

    let add_on_rate = resolve_add_on_rate(&input.health, rates)?;
    let (health, private_subsidy, health_rate) = match &input.health {
        HealthInsurance::Private {
            monthly_premium,
            employer_subsidy,
        } => {
            let premium = (*monthly_premium).clamp(Decimal::ZERO, Decimal::from(MAX_PRIVATE_PREMIUM));
            let subsidy = if *employer_subsidy {
                (premium / Decimal::TWO).min(contributions.private_subsidy_cap_monthly)
            } else {
                Decimal::ZERO
            };
            ((premium - subsidy).max(Decimal::ZERO), subsidy, None)
        }
        HealthInsurance::StatutoryGeneral { .. } | HealthInsurance::StatutoryReduced { .. } => {
            let base_rate = match input.health {
                HealthInsurance::StatutoryReduced { .. } => {
                    contributions.health_reduced_employee_rate
                }
                _ => contributions.health_general_employee_rate,
            };
            let add_on = add_on_rate
                .unwrap_or_default()
                .clamp(Decimal::ZERO, rate_cap());
            let rate = base_rate + add_on / Decimal::TWO;
            (health_base * rate, Decimal::ZERO, Some(rate))
        }
    };

    let audit_step = AuditStep {
        step_number: 1,
        rule_id: "social_insurance_contributions".to_string(),
        rule_name: "Social Insurance Contributions".to_string(),
        legal_ref: "§ 20 SGB IV, § 58 SGB XI".to_string(),
        input: json!({
            "gross_monthly": gross.round_dp(2).normalize().to_string(),
            "pension_insured": input.pension_insured,
            "children": input.children,
            "age": input.age(),
            "saxony": input.saxony,
            "add_on_rate": add_on_rate.map(|rate| rate.normalize().to_string()),
        }),
        output: json!({
            "pension": pension.round_dp(2).normalize().to_string(),
            "unemployment": unemployment.round_dp(2).normalize().to_string(),
            "health": health.round_dp(2).normalize().to_string(),
            "health_rate": health_rate.map(|rate| rate.normalize().to_string()),
            "care": care.round_dp(2).normalize().to_string(),
            "care_rate": care_rate.normalize().to_string(),
            "private_subsidy": private_subsidy.round_dp(2).normalize().to_string(),
        }),
        reasoning: format!(
            "Pension/unemployment on {} EUR, health/care on {} EUR (care rate {})",
            pension_base.round_dp(2).normalize(),
            health_base.round_dp(2).normalize(),
            care_rate.normalize()
        ),
    };

    Ok(ContributionResult {
        pension,
        unemployment,
        health,
        care,
        private_subsidy,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates() -> &'static RateYear {
        ConfigLoader::builtin().unwrap().rate_year(2026).unwrap()
    }

    fn input(gross_monthly: &str) -> ContributionInput {
        ContributionInput {
            gross_monthly: dec(gross_monthly),
            year: 2026,
            birth_year: 1990,
            children: 0,
            saxony: false,
            health: HealthInsurance::statutory("tk"),
            pension_insured: true,
        }
    }

    #[test]
    fn test_contributions_below_ceilings() {
        let result = compute_contributions(&input("4000"), rates()).unwrap();

        assert_eq!(result.pension, dec("372"));
        assert_eq!(result.unemployment, dec("52"));
        // 4,000 * (0.073 + 0.013)
        assert_eq!(result.health, dec("344"));
        // 4,000 * (0.018 + 0.006 childless)
        assert_eq!(result.care, dec("96"));
        assert_eq!(result.private_subsidy, Decimal::ZERO);
    }

    #[test]
    fn test_contributions_capped_at_ceilings() {
        let result = compute_contributions(&input("10000"), rates()).unwrap();

        assert_eq!(result.pension, dec("785.85"));
        assert_eq!(result.unemployment, dec("109.85"));
        assert_eq!(result.health, dec("499.875"));
        assert_eq!(result.care, dec("139.5"));
    }

    #[test]
    fn test_pension_exempt() {
        let mut input = input("4000");
        input.pension_insured = false;
        let result = compute_contributions(&input, rates()).unwrap();
        assert_eq!(result.pension, Decimal::ZERO);
        assert_eq!(result.unemployment, dec("52"));
    }

    #[test]
    fn test_reduced_rate_with_explicit_add_on() {
        let mut input = input("4000");
        input.health = HealthInsurance::StatutoryReduced {
            provider_id: Some("tk".to_string()),
            add_on_rate: Some(dec("0.02")),
        };
        let result = compute_contributions(&input, rates()).unwrap();
        // 4,000 * (0.07 + 0.01)
        assert_eq!(result.health, dec("320"));
    }

    #[test]
    fn test_add_on_rate_is_clamped() {
        let mut input = input("1000");
        input.health = HealthInsurance::StatutoryGeneral {
            provider_id: None,
            add_on_rate: Some(dec("0.5")),
        };
        let result = compute_contributions(&input, rates()).unwrap();
        // 1,000 * (0.073 + 0.1)
        assert_eq!(result.health, dec("173"));
    }

    #[test]
    fn test_private_premium_with_subsidy() {
        let mut input = input("4000");
        input.health = HealthInsurance::Private {
            monthly_premium: dec("600"),
            employer_subsidy: true,
        };
        let result = compute_contributions(&input, rates()).unwrap();
        assert_eq!(result.health, dec("300"));
        assert_eq!(result.private_subsidy, dec("300"));

        input.health = HealthInsurance::Private {
            monthly_premium: dec("1000"),
            employer_subsidy: true,
        };
        let capped = compute_contributions(&input, rates()).unwrap();
        assert_eq!(capped.private_subsidy, dec("384.58"));
        assert_eq!(capped.health, dec("615.42"));

        input.health = HealthInsurance::Private {
            monthly_premium: dec("600"),
            employer_subsidy: false,
        };
        let unsubsidised = compute_contributions(&input, rates()).unwrap();
        assert_eq!(unsubsidised.health, dec("600"));
    }

    #[test]
    fn test_care_rate_modifiers() {
        let contributions = &rates().contributions;
        let mut input = input("4000");

        assert_eq!(care_employee_rate(&input, contributions), dec("0.024"));

        input.saxony = true;
        assert_eq!(care_employee_rate(&input, contributions), dec("0.029"));

        input.saxony = false;
        input.birth_year = 2003;
        assert_eq!(care_employee_rate(&input, contributions), dec("0.018"));

        input.children = 3;
        assert_eq!(care_employee_rate(&input, contributions), dec("0.013"));

        input.children = 9;
        assert_eq!(care_employee_rate(&input, contributions), dec("0.008"));
    }

    #[test]
    fn test_discounted_children() {
        assert_eq!(care_discounted_children(0, 4), 0);
        assert_eq!(care_discounted_children(1, 4), 0);
        assert_eq!(care_discounted_children(2, 4), 1);
        assert_eq!(care_discounted_children(20, 4), 4);
    }

    #[test]
    fn test_add_on_resolution() {
        let rates = rates();
        assert_eq!(
            resolve_add_on_rate(&HealthInsurance::statutory("barmer"), rates).unwrap(),
            Some(dec("0.028"))
        );
        // Catalogue default
        assert_eq!(
            resolve_add_on_rate(&HealthInsurance::default(), rates).unwrap(),
            Some(dec("0.026"))
        );
        assert_eq!(
            resolve_add_on_rate(
                &HealthInsurance::Private {
                    monthly_premium: dec("500"),
                    employer_subsidy: false,
                },
                rates
            )
            .unwrap(),
            None
        );
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let mut input = input("4000");
        input.health = HealthInsurance::statutory("acme");
        assert!(matches!(
            compute_contributions(&input, rates()),
            Err(EngineError::UnknownHealthInsurer { ref id, year: 2026 }) if id == "acme"
        ));
    }

    #[test]
    fn test_audit_step_recorded() {
        let result = compute_contributions(&input("4000"), rates()).unwrap();
        assert_eq!(result.audit_step.rule_id, "social_insurance_contributions");
        assert_eq!(result.audit_step.output["pension"], "372");
    }
}
