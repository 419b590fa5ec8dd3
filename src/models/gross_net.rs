//! The gross-to-net request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{HealthInsurance, PayPeriod, TaxClass};

fn default_true() -> bool {
    true
}

fn default_tax_class() -> TaxClass {
    TaxClass::I
}

/// A gross-to-net request as supplied by a form or an HTTP handler.
///
/// Amounts are decimal euros; the result is in integer cents.
///
/// # Example
///
/// ```
/// use gross_net_engine::models::{GrossNetInput, PayPeriod, TaxClass};
/// use serde_json::json;
///
/// let input: GrossNetInput = serde_json::from_value(json!({
///     "gross": "4200",
///     "period": "month",
///     "year": 2026,
///     "tax_class": 3,
///     "state": "BY",
///     "birth_year": 1985,
///     "children": 2,
///     "child_allowance_units": 2,
///     "health": { "type": "statutory_general", "provider_id": "aok-by" }
/// }))
/// .unwrap();
///
/// assert_eq!(input.tax_class, TaxClass::III);
/// assert_eq!(input.period, PayPeriod::Month);
/// assert!(input.pension_insured);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossNetInput {
    /// Gross wage for the period in euros.
    pub gross: Decimal,
    /// The pay period of `gross`.
    pub period: PayPeriod,
    /// The fiscal year.
    pub year: u16,
    /// The wage-tax class.
    #[serde(default = "default_tax_class")]
    pub tax_class: TaxClass,
    /// Annual tax-free allowance in euros.
    #[serde(default)]
    pub annual_allowance: Decimal,
    /// Whether the employee is liable to church tax.
    #[serde(default)]
    pub church_tax: bool,
    /// Two-letter federal state code.
    pub state: String,
    /// The employee's year of birth.
    pub birth_year: u16,
    /// Number of children (care-insurance modifiers).
    #[serde(default)]
    pub children: u8,
    /// Child-allowance units from the tax record.
    #[serde(default)]
    pub child_allowance_units: Decimal,
    /// Health insurance.
    #[serde(default)]
    pub health: HealthInsurance,
    /// Member of the statutory pension insurance.
    #[serde(default = "default_true")]
    pub pension_insured: bool,
    /// Employer allocation surcharges.
    #[serde(default)]
    pub employer_surcharges: Option<EmployerSurcharges>,
}

impl GrossNetInput {
    /// Creates a request for a 30-year-old in Berlin with statutory
    /// insurance, class I and no children.
    pub fn new(gross: Decimal, period: PayPeriod, year: u16) -> Self {
        Self {
            gross,
            period,
            year,
            tax_class: TaxClass::I,
            annual_allowance: Decimal::ZERO,
            church_tax: false,
            state: "BE".to_string(),
            birth_year: year.saturating_sub(30),
            children: 0,
            child_allowance_units: Decimal::ZERO,
            health: HealthInsurance::default(),
            pension_insured: true,
            employer_surcharges: None,
        }
    }
}

/// Employer allocation surcharges (Umlagen U1 and U2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerSurcharges {
    /// Whether the employer block is computed.
    pub enabled: bool,
    /// U1 rate in percent (sickness allocation).
    #[serde(default)]
    pub u1_percent: Decimal,
    /// U2 rate in percent (maternity allocation).
    #[serde(default)]
    pub u2_percent: Decimal,
}
