//! Calculation logic for the gross-to-net engine.
//!
//! This module contains the stages of the wage-tax withholding procedure
//! (annualisation, pension and age relief, taxable-base reduction, the
//! insurance provision, the tariff, the solidarity surcharge and one-time
//! payments), the social-insurance contribution calculator, and the
//! orchestrator that combines them into a gross-to-net result.

mod age_relief;
mod annualize;
mod contributions;
mod gross_net;
mod one_time_payment;
mod pension_relief;
mod provision_allowance;
mod rounding;
mod solidarity;
mod tariff;
mod taxable_base;
mod withholding;

pub use age_relief::age_relief;
pub use annualize::{AnnualAmounts, annualize, annualize_input, period_share};
pub use contributions::{
    ContributionResult, care_discounted_children, care_employee_rate, compute_contributions,
    resolve_add_on_rate,
};
pub use gross_net::compute_gross_net;
pub use one_time_payment::{OneTimeWithholding, RegularWithholding, one_time_withholding};
pub use pension_relief::{PensionRelief, pension_relief};
pub use provision_allowance::{ProvisionAllowance, provision_allowance, provision_care_rate};
pub use rounding::{floor_zero, round_commercial, round_down, round_up};
pub use solidarity::{
    annual_solidarity_surcharge, one_time_solidarity_surcharge, solidarity_threshold,
};
pub use tariff::{
    IncomeTaxAssessment, TariffTax, assess_income_tax, income_tax_tariff, split_procedure_tax,
    tariff_tax,
};
pub use taxable_base::{TableAllowances, TaxableBase, reduce_taxable_base, table_allowances};
pub use withholding::{WithholdingCalculation, compute_withholding};
