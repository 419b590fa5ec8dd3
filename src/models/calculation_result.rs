//! Calculation result models for the gross-to-net engine.
//!
//! This module contains the [`GrossNetResult`] type and its associated
//! structures: deduction lines, the employee and employer blocks, the
//! withholding detail and the audit trace.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, PayPeriod};

/// The kind of a deduction or surcharge line.
///
/// # Example
///
/// ```
/// use gross_net_engine::models::DeductionKind;
///
/// assert_eq!(DeductionKind::WageTax.label(), "Lohnsteuer");
/// assert_eq!(serde_json::to_string(&DeductionKind::ChurchTax).unwrap(), "\"church_tax\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    /// Wage tax.
    WageTax,
    /// Solidarity surcharge.
    SolidaritySurcharge,
    /// Church tax.
    ChurchTax,
    /// Pension insurance.
    Pension,
    /// Unemployment insurance.
    Unemployment,
    /// Long-term care insurance.
    Care,
    /// Health insurance.
    Health,
    /// Sickness allocation surcharge (employer).
    U1,
    /// Maternity allocation surcharge (employer).
    U2,
}

impl DeductionKind {
    /// The employee deductions in display order.
    pub const EMPLOYEE: [DeductionKind; 7] = [
        DeductionKind::WageTax,
        DeductionKind::SolidaritySurcharge,
        DeductionKind::ChurchTax,
        DeductionKind::Pension,
        DeductionKind::Unemployment,
        DeductionKind::Care,
        DeductionKind::Health,
    ];

    /// The German display label.
    pub fn label(self) -> &'static str {
        match self {
            DeductionKind::WageTax => "Lohnsteuer",
            DeductionKind::SolidaritySurcharge => "Solidaritätszuschlag",
            DeductionKind::ChurchTax => "Kirchensteuer",
            DeductionKind::Pension => "Rentenversicherung",
            DeductionKind::Unemployment => "Arbeitslosenversicherung",
            DeductionKind::Care => "Pflegeversicherung",
            DeductionKind::Health => "Krankenversicherung",
            DeductionKind::U1 => "U1",
            DeductionKind::U2 => "U2",
        }
    }
}

/// A single deduction or surcharge with its period and annual amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// What the line is for.
    pub kind: DeductionKind,
    /// Display label.
    pub label: String,
    /// Amount for the pay period.
    pub period: Cents,
    /// Amount for the year.
    pub annual: Cents,
}

impl DeductionLine {
    /// Creates a line labelled after its kind.
    pub fn new(kind: DeductionKind, period: Cents, annual: Cents) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            period,
            annual,
        }
    }
}

/// Echo of the request's period and gross amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMeta {
    /// The fiscal year.
    pub year: u16,
    /// The pay period.
    pub period: PayPeriod,
    /// Gross for the pay period.
    pub gross_period: Cents,
    /// Gross for the year.
    pub gross_annual: Cents,
}

/// Employee deductions and net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeResult {
    /// Deduction lines in display order.
    pub deductions: Vec<DeductionLine>,
    /// Sum of the period amounts.
    pub total_deductions_period: Cents,
    /// Sum of the annual amounts.
    pub total_deductions_annual: Cents,
    /// Net pay for the period.
    pub net_period: Cents,
    /// Net pay for the year.
    pub net_annual: Cents,
}

/// Employer allocation surcharges and total cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerResult {
    /// Surcharge lines (U1, U2).
    pub surcharges: Vec<DeductionLine>,
    /// Gross plus surcharges for the period.
    pub total_cost_period: Cents,
    /// Gross plus surcharges for the year.
    pub total_cost_annual: Cents,
}

/// Allowances used and taxable income above the basic allowance, as
/// reported for double-taxation treaty purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceUsage {
    /// Allowances used by the current wage.
    pub used_current: Cents,
    /// Allowances used by the annual wage without the one-time payment.
    pub used_annual: Cents,
    /// Additional allowances used by the one-time payment.
    pub used_one_time: Cents,
    /// Taxable income above the basic allowance for the current wage.
    pub taxable_above_basic_current: Cents,
    /// Taxable income above the basic allowance without the one-time payment.
    pub taxable_above_basic_annual: Cents,
    /// Taxable income above the basic allowance with the one-time payment.
    pub taxable_above_basic_one_time: Cents,
}

/// Result of the wage-tax withholding procedure, per pay period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingResult {
    /// Wage tax on the current wage.
    pub wage_tax: Cents,
    /// Solidarity surcharge on the current wage.
    pub solidarity_surcharge: Cents,
    /// Church-tax assessment base for the current wage.
    pub church_tax_base: Cents,
    /// Wage tax on the one-time payment.
    pub one_time_wage_tax: Cents,
    /// Solidarity surcharge on the one-time payment.
    pub one_time_solidarity_surcharge: Cents,
    /// Church-tax assessment base for the one-time payment.
    pub one_time_church_tax_base: Cents,
    /// Annual taxable income of the current wage after all allowances.
    pub annual_taxable_income: Cents,
    /// Allowance usage figures.
    pub allowance_usage: AllowanceUsage,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute for this rule.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag inputs that were adjusted (for example clamped to a legal
/// range) without aborting the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// A low-severity warning for an input clamped to its legal range.
    pub fn clamped(field: &str, message: impl Into<String>) -> Self {
        Self {
            code: format!("{}_clamped", field),
            message: message.into(),
            severity: "low".to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Appends steps, renumbering them to continue the sequence.
    pub fn extend_steps(&mut self, steps: impl IntoIterator<Item = AuditStep>) {
        for mut step in steps {
            step.step_number = self.steps.len() as u32 + 1;
            self.steps.push(step);
        }
    }

    /// Appends a single step, renumbering it to continue the sequence.
    pub fn push_step(&mut self, step: AuditStep) {
        self.extend_steps(std::iter::once(step));
    }
}

/// The complete result of a gross-to-net calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossNetResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// Echo of the request.
    pub meta: ResultMeta,
    /// Employee deductions and net pay.
    pub employee: EmployeeResult,
    /// Employer surcharges, present only when requested.
    pub employer: Option<EmployerResult>,
    /// Withholding detail behind the tax lines.
    pub withholding: WithholdingResult,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl GrossNetResult {
    /// Returns the employee line of the given kind.
    pub fn deduction(&self, kind: DeductionKind) -> Option<&DeductionLine> {
        self.employee.deductions.iter().find(|line| line.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(rule_id: &str) -> AuditStep {
        AuditStep {
            step_number: 99,
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            legal_ref: "§ 39b EStG".to_string(),
            input: json!({}),
            output: json!({}),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_employee_kinds_have_distinct_labels() {
        let mut labels: Vec<&str> = DeductionKind::EMPLOYEE.iter().map(|k| k.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 7);
    }

    #[test]
    fn test_deduction_line_uses_kind_label() {
        let line = DeductionLine::new(DeductionKind::Care, Cents(100), Cents(1200));
        assert_eq!(line.label, "Pflegeversicherung");
    }

    #[test]
    fn test_audit_trace_renumbers_steps() {
        let mut trace = AuditTrace::default();
        trace.extend_steps(vec![step("a"), step("b")]);
        trace.push_step(step("c"));

        let numbers: Vec<u32> = trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(trace.steps[2].rule_id, "c");
    }

    #[test]
    fn test_deduction_line_serialization() {
        let line = DeductionLine::new(DeductionKind::SolidaritySurcharge, Cents(5), Cents(60));
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "solidarity_surcharge",
                "label": "Solidaritätszuschlag",
                "period": 5,
                "annual": 60
            })
        );
    }

    #[test]
    fn test_clamped_warning_code() {
        let warning = AuditWarning::clamped("children", "clamped to 20");
        assert_eq!(warning.code, "children_clamped");
        assert_eq!(warning.severity, "low");
    }
}
