//! Configuration types for the gross-to-net engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files: engine settings, the
//! federal-state table and one [`RateYear`] per supported fiscal year.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{EngineError, EngineResult};

/// Engine metadata and run-time settings from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// The human-readable name of the engine configuration.
    pub name: String,
    /// The version of the configuration set.
    pub version: String,
    /// URL of the official reference calculator.
    pub source_url: String,
    /// Settings for the post-computation sanity check.
    pub consistency_check: ConsistencyCheckConfig,
}

/// Settings for the post-computation sanity check.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsistencyCheckConfig {
    /// Annual taxable gross in euros (per tariff half) above which a result
    /// with zero wage tax, surcharge and church-tax base is rejected.
    pub minimum_taxable_gross: Decimal,
}

/// A federal state.
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// The name of the state.
    pub name: String,
    /// Church-tax rate applied to the church-tax base.
    pub church_tax_rate: Decimal,
    /// Whether the Saxony long-term-care split applies.
    #[serde(default)]
    pub saxony_care_split: bool,
}

/// States configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct StatesConfig {
    /// Map of state code to state details.
    pub states: HashMap<String, StateConfig>,
}

/// Coefficients of the progressive income-tax tariff (§ 32a EStG).
#[derive(Debug, Clone, Deserialize)]
pub struct TariffConfig {
    /// Basic allowance; income up to here is untaxed.
    pub basic_allowance: Decimal,
    /// Upper bound (exclusive) of the first progression zone.
    pub zone2_limit: Decimal,
    /// Quadratic coefficient of the first progression zone.
    pub zone2_coefficient: Decimal,
    /// Linear coefficient of the first progression zone.
    pub zone2_base_rate: Decimal,
    /// Income from which the second progression zone is measured.
    pub zone3_start: Decimal,
    /// Upper bound (exclusive) of the second progression zone.
    pub zone3_limit: Decimal,
    /// Quadratic coefficient of the second progression zone.
    pub zone3_coefficient: Decimal,
    /// Linear coefficient of the second progression zone.
    pub zone3_base_rate: Decimal,
    /// Constant added in the second progression zone.
    pub zone3_constant: Decimal,
    /// Upper bound (exclusive) of the first flat zone.
    pub zone4_limit: Decimal,
    /// Marginal rate of the first flat zone.
    pub zone4_rate: Decimal,
    /// Amount deducted in the first flat zone.
    pub zone4_deduction: Decimal,
    /// Marginal rate of the top zone.
    pub zone5_rate: Decimal,
    /// Amount deducted in the top zone.
    pub zone5_deduction: Decimal,
}

/// Parameters of the tax-class V/VI procedure (§ 39b Abs. 2 Satz 7 EStG).
#[derive(Debug, Clone, Deserialize)]
pub struct SplitTariffConfig {
    /// First threshold; above it the tariff value at this point caps the tax.
    pub first_threshold: Decimal,
    /// Second threshold; above it the first marginal rate applies.
    pub second_threshold: Decimal,
    /// Third threshold; above it the top marginal rate applies.
    pub third_threshold: Decimal,
    /// Multiplier for the upper tariff evaluation.
    pub upper_factor: Decimal,
    /// Multiplier for the lower tariff evaluation.
    pub lower_factor: Decimal,
    /// Minimum tax as a fraction of the base.
    pub minimum_rate: Decimal,
}

/// Fixed allowances built into the withholding tables.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowanceConfig {
    /// Employee lump sum for work-related expenses.
    pub employee_lump_sum: Decimal,
    /// Lump sum for pension recipients.
    pub pension_lump_sum: Decimal,
    /// Special-expenses lump sum (classes I to V).
    pub special_expenses_lump_sum: Decimal,
    /// Relief for single parents (class II).
    pub single_parent_relief: Decimal,
    /// Child allowance per unit for classes I to III.
    pub child_allowance_full: Decimal,
    /// Child allowance per unit for class IV.
    pub child_allowance_half: Decimal,
}

/// Solidarity surcharge parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SolidarityConfig {
    /// Annual tax up to which no surcharge is levied (single tariff).
    pub free_threshold: Decimal,
    /// Surcharge rate in percent.
    pub rate_percent: Decimal,
    /// Phase-in rate on the excess over the threshold in percent.
    pub phase_in_percent: Decimal,
}

/// Vorsorgepauschale parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionConfig {
    /// Cap on the unemployment plus health/care part.
    pub unemployment_health_cap: Decimal,
}

/// Monthly contribution ceilings (Beitragsbemessungsgrenzen).
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionCeilings {
    /// Ceiling shared by pension and unemployment insurance.
    pub pension_unemployment_monthly: Decimal,
    /// Ceiling shared by health and long-term-care insurance.
    pub health_care_monthly: Decimal,
}

impl ContributionCeilings {
    /// Annual pension/unemployment ceiling.
    pub fn pension_unemployment_annual(&self) -> Decimal {
        self.pension_unemployment_monthly * Decimal::from(12)
    }

    /// Annual health/care ceiling.
    pub fn health_care_annual(&self) -> Decimal {
        self.health_care_monthly * Decimal::from(12)
    }
}

/// Employee contribution rates and care-insurance modifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionRates {
    /// Employee share of pension insurance.
    pub pension_employee_rate: Decimal,
    /// Employee share of unemployment insurance.
    pub unemployment_employee_rate: Decimal,
    /// Employee share of the general health-insurance rate.
    pub health_general_employee_rate: Decimal,
    /// Employee share of the reduced health-insurance rate.
    pub health_reduced_employee_rate: Decimal,
    /// Total long-term-care rate (employer plus employee).
    pub care_total_rate: Decimal,
    /// Employer share of the care rate outside Saxony.
    pub care_employer_rate: Decimal,
    /// Employer share of the care rate in Saxony.
    pub care_employer_rate_saxony: Decimal,
    /// Surcharge for childless employees.
    pub care_childless_surcharge: Decimal,
    /// Discount per child beyond the first.
    pub care_child_discount: Decimal,
    /// Maximum number of children that earn a discount.
    pub care_max_discounted_children: u8,
    /// Age from which the childless surcharge applies.
    pub care_childless_surcharge_min_age: u16,
    /// Monthly cap on the employer subsidy for private insurance.
    pub private_subsidy_cap_monthly: Decimal,
}

impl ContributionRates {
    /// Employee share of the base care rate.
    pub fn care_employee_base_rate(&self, saxony: bool) -> Decimal {
        let employer = if saxony {
            self.care_employer_rate_saxony
        } else {
            self.care_employer_rate
        };
        self.care_total_rate - employer
    }
}

/// A row that belongs to a cohort year.
pub trait CohortRow {
    /// The cohort year of this row.
    fn cohort(&self) -> u16;
}

/// Pension-income relief for one cohort (year of first pension receipt).
#[derive(Debug, Clone, Deserialize)]
pub struct PensionReliefRow {
    /// The cohort year.
    pub cohort: u16,
    /// Relief as a fraction of the pension base.
    pub rate: Decimal,
    /// Absolute annual maximum of the relief.
    pub max: Decimal,
    /// Supplementary relief in euros.
    pub supplement: Decimal,
}

impl CohortRow for PensionReliefRow {
    fn cohort(&self) -> u16 {
        self.cohort
    }
}

/// Age relief for one cohort (year following the 64th birthday).
#[derive(Debug, Clone, Deserialize)]
pub struct AgeReliefRow {
    /// The cohort year.
    pub cohort: u16,
    /// Relief as a fraction of the non-pension wage.
    pub rate: Decimal,
    /// Absolute annual maximum of the relief.
    pub max: Decimal,
}

impl CohortRow for AgeReliefRow {
    fn cohort(&self) -> u16 {
        self.cohort
    }
}

/// A table of rows keyed by cohort year.
///
/// Years before `first_cohort` use the first cohort's row and years after
/// `final_cohort` use the final row. A year inside that range without a row
/// is a configuration error.
#[derive(Debug, Clone, Deserialize)]
pub struct CohortTable<R> {
    /// The earliest cohort; earlier years are treated as this cohort.
    pub first_cohort: u16,
    /// The final cohort; later years are treated as this cohort.
    pub final_cohort: u16,
    /// The rows of the table.
    pub rows: Vec<R>,
}

impl<R: CohortRow> CohortTable<R> {
    /// Returns the row that applies to the given year.
    pub fn row_for(&self, year: u16, table: &str) -> EngineResult<&R> {
        let cohort = year.clamp(self.first_cohort, self.final_cohort);
        self.rows
            .iter()
            .find(|row| row.cohort() == cohort)
            .ok_or_else(|| EngineError::TableIndexOutOfRange {
                table: table.to_string(),
                cohort,
            })
    }
}

/// A statutory health insurer with its individual add-on rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsurer {
    /// Short identifier (e.g., "tk").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Total add-on rate (e.g., 0.026 for 2.6 %), shared by employer and employee.
    pub add_on_rate: Decimal,
}

/// All constants for one fiscal year.
///
/// A `RateYear` is loaded once and never mutated. Supporting a new year
/// means adding a new rate file, provided the statutory formula is unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct RateYear {
    /// The fiscal year.
    pub year: u16,
    /// The date from which these rates apply.
    pub effective_date: NaiveDate,
    /// Income-tax tariff.
    pub tariff: TariffConfig,
    /// Tax-class V/VI procedure.
    pub split_tariff: SplitTariffConfig,
    /// Table allowances.
    pub allowances: AllowanceConfig,
    /// Solidarity surcharge.
    pub solidarity: SolidarityConfig,
    /// Vorsorgepauschale parameters.
    pub provision: ProvisionConfig,
    /// Contribution ceilings.
    pub ceilings: ContributionCeilings,
    /// Contribution rates.
    pub contributions: ContributionRates,
    /// Pension-income relief by cohort.
    pub pension_relief: CohortTable<PensionReliefRow>,
    /// Age relief by cohort.
    pub age_relief: CohortTable<AgeReliefRow>,
    /// Statutory health insurers.
    pub health_insurers: Vec<HealthInsurer>,
}

impl RateYear {
    /// Looks up a statutory health insurer by id.
    pub fn health_insurer(&self, id: &str) -> EngineResult<&HealthInsurer> {
        self.health_insurers
            .iter()
            .find(|insurer| insurer.id == id)
            .ok_or_else(|| EngineError::UnknownHealthInsurer {
                id: id.to_string(),
                year: self.year,
            })
    }

    /// The insurer used when none is selected: the "avg" entry if present,
    /// otherwise the first in the catalogue.
    pub fn default_health_insurer(&self) -> Option<&HealthInsurer> {
        self.health_insurers
            .iter()
            .find(|insurer| insurer.id == "avg")
            .or_else(|| self.health_insurers.first())
    }
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine settings.
    settings: EngineSettings,
    /// Federal states by code.
    states: HashMap<String, StateConfig>,
    /// Rate tables by fiscal year.
    rate_years: BTreeMap<u16, RateYear>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        settings: EngineSettings,
        states: HashMap<String, StateConfig>,
        rate_years: Vec<RateYear>,
    ) -> Self {
        let rate_years = rate_years
            .into_iter()
            .map(|rate_year| (rate_year.year, rate_year))
            .collect();
        Self {
            settings,
            states,
            rate_years,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all states.
    pub fn states(&self) -> &HashMap<String, StateConfig> {
        &self.states
    }

    /// Returns all rate tables keyed by year.
    pub fn rate_years(&self) -> &BTreeMap<u16, RateYear> {
        &self.rate_years
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table() -> CohortTable<AgeReliefRow> {
        CohortTable {
            first_cohort: 2005,
            final_cohort: 2008,
            rows: vec![
                AgeReliefRow {
                    cohort: 2005,
                    rate: dec("0.4"),
                    max: dec("1900"),
                },
                AgeReliefRow {
                    cohort: 2006,
                    rate: dec("0.384"),
                    max: dec("1824"),
                },
                AgeReliefRow {
                    cohort: 2008,
                    rate: dec("0.352"),
                    max: dec("1672"),
                },
            ],
        }
    }

    #[test]
    fn test_cohort_before_first_uses_first_row() {
        let t = table();
        let row = t.row_for(1990, "age_relief").unwrap();
        assert_eq!(row.cohort, 2005);
    }

    #[test]
    fn test_cohort_after_final_uses_final_row() {
        let t = table();
        let row = t.row_for(2090, "age_relief").unwrap();
        assert_eq!(row.cohort, 2008);
    }

    #[test]
    fn test_missing_cohort_returns_error() {
        match table().row_for(2007, "age_relief") {
            Err(EngineError::TableIndexOutOfRange { table, cohort }) => {
                assert_eq!(table, "age_relief");
                assert_eq!(cohort, 2007);
            }
            other => panic!("Expected TableIndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_annual_ceilings_are_twelve_months() {
        let ceilings = ContributionCeilings {
            pension_unemployment_monthly: dec("8450"),
            health_care_monthly: dec("5812.5"),
        };
        assert_eq!(ceilings.pension_unemployment_annual(), dec("101400"));
        assert_eq!(ceilings.health_care_annual(), dec("69750"));
    }
}
