//! Inputs to the wage-tax withholding procedure.
//!
//! All money fields are integer cents for the pay period unless a field says
//! otherwise. The structs deserialize from JSON with sensible defaults so a
//! caller only needs to name what differs from an ordinary employee.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Cents, PayPeriod, TaxClass};

/// The canonical input to the withholding procedure.
///
/// # Example
///
/// ```
/// use gross_net_engine::models::{Cents, PayPeriod, TaxClass, WithholdingInput};
///
/// let input = WithholdingInput::new(PayPeriod::Month, TaxClass::I, Cents(416_667));
/// assert!(input.pension.is_none());
/// assert!(input.provision.pension_insured);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingInput {
    /// The pay period.
    pub period: PayPeriod,
    /// The wage-tax class.
    pub tax_class: TaxClass,
    /// Gross wage for the period, including any pension portion.
    pub gross: Cents,
    /// Tax-free allowance for the period from the employee's tax record.
    #[serde(default)]
    pub allowance: Cents,
    /// Amount added back to the taxable wage for the period.
    #[serde(default)]
    pub add_back: Cents,
    /// Whether the employee is liable to church tax.
    #[serde(default)]
    pub church_member: bool,
    /// Pension income (Versorgungsbezüge) contained in the gross wage.
    #[serde(default)]
    pub pension: Option<PensionIncome>,
    /// Cohort year for age relief, set when the employee qualifies.
    ///
    /// This is the calendar year following the 64th birthday.
    #[serde(default)]
    pub age_relief_year: Option<u16>,
    /// Child-allowance units (e.g., 0.5 or 1 per child).
    #[serde(default)]
    pub child_allowance_units: Decimal,
    /// Factor for class IV under the factor method; `None` means 1.
    #[serde(default)]
    pub tax_factor: Option<Decimal>,
    /// Parameters of the deductible insurance provision.
    #[serde(default)]
    pub provision: ProvisionInput,
    /// A non-periodic payment made in this period.
    #[serde(default)]
    pub one_time: Option<OneTimePayment>,
}

impl WithholdingInput {
    /// Creates an input for an ordinary employee: statutorily insured in all
    /// branches, no pension, allowances, children or church tax.
    pub fn new(period: PayPeriod, tax_class: TaxClass, gross: Cents) -> Self {
        Self {
            period,
            tax_class,
            gross,
            allowance: Cents::ZERO,
            add_back: Cents::ZERO,
            church_member: false,
            pension: None,
            age_relief_year: None,
            child_allowance_units: Decimal::ZERO,
            tax_factor: None,
            provision: ProvisionInput::default(),
            one_time: None,
        }
    }

    /// The factor applied to the annual tax (1 unless the factor method is used).
    pub fn factor(&self) -> Decimal {
        match self.tax_factor {
            Some(factor) if !factor.is_zero() => factor,
            _ => Decimal::ONE,
        }
    }
}

fn default_months_paid() -> u8 {
    12
}

/// Pension income paid as part of the wage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PensionIncome {
    /// Pension portion of the period gross.
    pub period_amount: Cents,
    /// Year in which the pension started.
    pub start_year: u16,
    /// Monthly pension that determines the relief base.
    pub monthly_baseline: Cents,
    /// Expected special pension payments in the year.
    #[serde(default)]
    pub special_payments: Cents,
    /// Number of months the pension is paid in the year.
    #[serde(default = "default_months_paid")]
    pub months_paid: u8,
}

/// Parameters of the insurance provision (Vorsorgepauschale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionInput {
    /// Member of the statutory pension insurance.
    #[serde(default = "default_true")]
    pub pension_insured: bool,
    /// Member of the statutory unemployment insurance.
    #[serde(default = "default_true")]
    pub unemployment_insured: bool,
    /// Health insurance.
    #[serde(default)]
    pub health: HealthProvision,
    /// Long-term care modifiers.
    #[serde(default)]
    pub care: CareProvision,
}

impl Default for ProvisionInput {
    fn default() -> Self {
        Self {
            pension_insured: true,
            unemployment_insured: true,
            health: HealthProvision::default(),
            care: CareProvision::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Health insurance as seen by the provision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthProvision {
    /// Statutory insurance with the insurer's add-on rate in percent.
    Statutory {
        /// Add-on rate in percent (e.g., 2.6).
        add_on_percent: Decimal,
    },
    /// Private insurance.
    Private {
        /// Monthly basic health and care premium.
        monthly_premium: Cents,
        /// Monthly employer subsidy towards the premium.
        #[serde(default)]
        employer_subsidy: Cents,
    },
}

impl Default for HealthProvision {
    fn default() -> Self {
        HealthProvision::Statutory {
            add_on_percent: Decimal::ZERO,
        }
    }
}

/// Long-term-care modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareProvision {
    /// The Saxony employer/employee split applies.
    #[serde(default)]
    pub saxony: bool,
    /// The childless surcharge applies.
    #[serde(default)]
    pub childless_surcharge: bool,
    /// Number of children that earn a care discount.
    #[serde(default)]
    pub discounted_children: u8,
}

/// A non-periodic payment (sonstiger Bezug) and the annual figures needed to
/// tax it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneTimePayment {
    /// The one-time payment including any pension part.
    pub amount: Cents,
    /// Pension part of the payment.
    pub pension_portion: Cents,
    /// Death benefit and capitalised pension payments in the pension part.
    pub death_benefit: Cents,
    /// Expected annual wage without the payment.
    pub expected_annual_wage: Cents,
    /// Expected annual pension income without the payment.
    pub expected_annual_pension: Cents,
    /// Annual tax-free allowance.
    pub annual_allowance: Cents,
    /// Annual add-back amount.
    pub annual_add_back: Cents,
    /// Part of the expected annual wage excluded from the provision base.
    pub annual_wage_excluded: Cents,
    /// Part of the payment excluded from the provision base.
    pub payment_excluded: Cents,
    /// Non-taxable equity participation benefit.
    pub equity_benefit: Cents,
}

impl OneTimePayment {
    /// Returns true if neither a payment nor an equity benefit is present.
    pub fn is_empty(&self) -> bool {
        self.amount.is_zero() && self.equity_benefit.is_zero()
    }
}
