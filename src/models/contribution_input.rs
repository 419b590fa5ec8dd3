//! Inputs to the social-insurance contribution calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The employee's health insurance.
///
/// Statutory insurance names either a provider from the year's catalogue or
/// the provider's add-on rate directly. An explicit rate wins over the
/// provider; with neither, the catalogue default is used.
///
/// # Example
///
/// ```
/// use gross_net_engine::models::HealthInsurance;
///
/// let health: HealthInsurance =
///     serde_json::from_str(r#"{ "type": "statutory_general", "provider_id": "tk" }"#).unwrap();
/// assert!(health.is_statutory());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthInsurance {
    /// Statutory insurance at the general rate.
    StatutoryGeneral {
        /// Provider id from the year's catalogue.
        #[serde(default)]
        provider_id: Option<String>,
        /// Total add-on rate as a fraction (e.g., 0.026).
        #[serde(default)]
        add_on_rate: Option<Decimal>,
    },
    /// Statutory insurance at the reduced rate (no sick-pay entitlement).
    StatutoryReduced {
        /// Provider id from the year's catalogue.
        #[serde(default)]
        provider_id: Option<String>,
        /// Total add-on rate as a fraction (e.g., 0.026).
        #[serde(default)]
        add_on_rate: Option<Decimal>,
    },
    /// Private insurance.
    Private {
        /// Monthly premium in euros.
        monthly_premium: Decimal,
        /// Whether the employer pays the statutory subsidy.
        #[serde(default)]
        employer_subsidy: bool,
    },
}

impl HealthInsurance {
    /// Statutory insurance at the general rate with the given provider.
    pub fn statutory(provider_id: impl Into<String>) -> Self {
        HealthInsurance::StatutoryGeneral {
            provider_id: Some(provider_id.into()),
            add_on_rate: None,
        }
    }

    /// Returns true for either statutory variant.
    pub fn is_statutory(&self) -> bool {
        !matches!(self, HealthInsurance::Private { .. })
    }
}

impl Default for HealthInsurance {
    fn default() -> Self {
        HealthInsurance::StatutoryGeneral {
            provider_id: None,
            add_on_rate: None,
        }
    }
}

/// Input to the monthly contribution calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionInput {
    /// Gross monthly wage in euros.
    pub gross_monthly: Decimal,
    /// The fiscal year.
    pub year: u16,
    /// The employee's year of birth.
    pub birth_year: u16,
    /// Number of children.
    pub children: u8,
    /// Whether the Saxony care split applies.
    pub saxony: bool,
    /// Health insurance.
    pub health: HealthInsurance,
    /// Member of the statutory pension insurance.
    pub pension_insured: bool,
}

impl ContributionInput {
    /// The employee's age in the fiscal year.
    pub fn age(&self) -> i32 {
        i32::from(self.year) - i32::from(self.birth_year)
    }
}
