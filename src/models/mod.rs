//! Core data models for the gross-to-net engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod contribution_input;
mod gross_net;
mod money;
mod pay_period;
mod tax_class;
mod withholding_input;

pub use calculation_result::{
    AllowanceUsage, AuditStep, AuditTrace, AuditWarning, DeductionKind, DeductionLine,
    EmployeeResult, EmployerResult, GrossNetResult, ResultMeta, WithholdingResult,
};
pub use contribution_input::{ContributionInput, HealthInsurance};
pub use gross_net::{EmployerSurcharges, GrossNetInput};
pub use money::Cents;
pub use pay_period::PayPeriod;
pub use tax_class::TaxClass;
pub use withholding_input::{
    CareProvision, HealthProvision, OneTimePayment, PensionIncome, ProvisionInput,
    WithholdingInput,
};
