//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings, federal states and per-year rate tables from YAML files.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, HealthInsurer, RateYear, StateConfig, StatesConfig};

const BUILTIN_ENGINE: &str = include_str!("../../config/de/engine.yaml");
const BUILTIN_STATES: &str = include_str!("../../config/de/states.yaml");
const BUILTIN_RATES: &[(&str, &str)] = &[(
    "rates/2026.yaml",
    include_str!("../../config/de/rates/2026.yaml"),
)];

static BUILTIN: OnceCell<ConfigLoader> = OnceCell::new();

/// Loads and provides access to engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides typed lookups for rate years, states and health insurers.
///
/// # Directory Structure
///
/// ```text
/// config/de/
/// ├── engine.yaml     # Engine metadata and consistency-check settings
/// ├── states.yaml     # Federal states
/// └── rates/
///     └── 2026.yaml   # One rate table per fiscal year
/// ```
///
/// # Example
///
/// ```no_run
/// use gross_net_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/de").unwrap();
/// let rates = loader.rate_year(2026).unwrap();
/// println!("Basic allowance: {}", rates.tariff.basic_allowance);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/de")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The rates directory holds no rate files
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let states = Self::load_yaml::<StatesConfig>(&path.join("states.yaml"))?;
        let rate_years = Self::load_rates(&path.join("rates"))?;

        Ok(Self {
            config: EngineConfig::new(settings, states.states, rate_years),
        })
    }

    /// Returns the configuration embedded in the crate.
    ///
    /// The embedded YAML is parsed on first use; later calls share the
    /// same instance.
    ///
    /// # Example
    ///
    /// ```
    /// use gross_net_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::builtin().unwrap();
    /// assert!(loader.rate_year(2026).is_ok());
    /// ```
    pub fn builtin() -> EngineResult<&'static ConfigLoader> {
        BUILTIN.get_or_try_init(|| {
            let settings = Self::parse_yaml::<EngineSettings>("engine.yaml", BUILTIN_ENGINE)?;
            let states = Self::parse_yaml::<StatesConfig>("states.yaml", BUILTIN_STATES)?;
            let rate_years = BUILTIN_RATES
                .iter()
                .map(|(name, content)| Self::parse_yaml::<RateYear>(name, content))
                .collect::<EngineResult<Vec<_>>>()?;

            Ok(Self {
                config: EngineConfig::new(settings, states.states, rate_years),
            })
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&path_str, &content)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> EngineResult<T> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateYear>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rate_years = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rate_years.push(Self::load_yaml::<RateYear>(&path)?);
            }
        }

        if rate_years.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rate_years)
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Gets the rate table for a fiscal year.
    ///
    /// # Returns
    ///
    /// Returns the rate year if configured, or `UnsupportedYear`.
    pub fn rate_year(&self, year: u16) -> EngineResult<&RateYear> {
        self.config
            .rate_years()
            .get(&year)
            .ok_or(EngineError::UnsupportedYear {
                year: i32::from(year),
            })
    }

    /// Gets the rate table in force on a given date.
    ///
    /// Finds the most recent rate table whose effective date is on or
    /// before `date`.
    pub fn rate_year_on(&self, date: NaiveDate) -> EngineResult<&RateYear> {
        self.config
            .rate_years()
            .values()
            .rev()
            .find(|rate_year| rate_year.effective_date <= date)
            .ok_or_else(|| EngineError::UnsupportedYear { year: date.year() })
    }

    /// Gets a federal state by its two-letter code (case-insensitive).
    pub fn state(&self, code: &str) -> EngineResult<&StateConfig> {
        self.config
            .states()
            .get(&code.to_uppercase())
            .ok_or_else(|| EngineError::UnknownState {
                code: code.to_string(),
            })
    }

    /// Returns all configured states.
    pub fn states(&self) -> &HashMap<String, StateConfig> {
        self.config.states()
    }

    /// Gets a statutory health insurer from a fiscal year's catalogue.
    pub fn health_insurer(&self, year: u16, id: &str) -> EngineResult<&HealthInsurer> {
        self.rate_year(year)?.health_insurer(id)
    }
}

impl From<EngineConfig> for ConfigLoader {
    fn from(config: EngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/de"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().version, "2026.1");
        assert_eq!(
            loader.settings().consistency_check.minimum_taxable_gross,
            dec("20000")
        );
    }

    #[test]
    fn test_builtin_matches_directory() {
        let builtin = ConfigLoader::builtin().unwrap();
        let loaded = ConfigLoader::load(config_path()).unwrap();

        let a = builtin.rate_year(2026).unwrap();
        let b = loaded.rate_year(2026).unwrap();
        assert_eq!(a.tariff.basic_allowance, b.tariff.basic_allowance);
        assert_eq!(a.health_insurers, b.health_insurers);
        assert_eq!(builtin.states().len(), loaded.states().len());
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = ConfigLoader::builtin().unwrap();
        let b = ConfigLoader::builtin().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_rate_year_2026_constants() {
        let loader = ConfigLoader::builtin().unwrap();
        let rates = loader.rate_year(2026).unwrap();

        assert_eq!(rates.tariff.basic_allowance, dec("12348"));
        assert_eq!(rates.solidarity.free_threshold, dec("20350"));
        assert_eq!(rates.ceilings.pension_unemployment_annual(), dec("101400"));
        assert_eq!(rates.ceilings.health_care_annual(), dec("69750"));
        assert_eq!(rates.allowances.employee_lump_sum, dec("1230"));
        assert_eq!(
            rates.effective_date,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_unsupported_year_returns_error() {
        let loader = ConfigLoader::builtin().unwrap();
        match loader.rate_year(2019) {
            Err(EngineError::UnsupportedYear { year }) => assert_eq!(year, 2019),
            other => panic!("Expected UnsupportedYear, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_year_on_date() {
        let loader = ConfigLoader::builtin().unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        assert_eq!(loader.rate_year_on(date).unwrap().year, 2026);

        let before = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(matches!(
            loader.rate_year_on(before),
            Err(EngineError::UnsupportedYear { year: 2025 })
        ));
    }

    #[test]
    fn test_rate_year_on_reports_actual_year() {
        let loader = ConfigLoader::builtin().unwrap();

        let ancient = NaiveDate::from_ymd_opt(-44, 3, 15).unwrap();
        assert!(matches!(
            loader.rate_year_on(ancient),
            Err(EngineError::UnsupportedYear { year: -44 })
        ));
    }

    #[test]
    fn test_state_lookup_is_case_insensitive() {
        let loader = ConfigLoader::builtin().unwrap();

        assert_eq!(loader.state("by").unwrap().church_tax_rate, dec("0.08"));
        assert_eq!(loader.state("NW").unwrap().church_tax_rate, dec("0.09"));
        assert!(loader.state("SN").unwrap().saxony_care_split);
        assert!(!loader.state("BE").unwrap().saxony_care_split);
    }

    #[test]
    fn test_unknown_state_returns_error() {
        let loader = ConfigLoader::builtin().unwrap();
        match loader.state("XX") {
            Err(EngineError::UnknownState { code }) => assert_eq!(code, "XX"),
            other => panic!("Expected UnknownState, got {:?}", other),
        }
    }

    #[test]
    fn test_health_insurer_lookup() {
        let loader = ConfigLoader::builtin().unwrap();

        let tk = loader.health_insurer(2026, "tk").unwrap();
        assert_eq!(tk.add_on_rate, dec("0.026"));

        match loader.health_insurer(2026, "acme") {
            Err(EngineError::UnknownHealthInsurer { id, year }) => {
                assert_eq!(id, "acme");
                assert_eq!(year, 2026);
            }
            other => panic!("Expected UnknownHealthInsurer, got {:?}", other),
        }
    }

    #[test]
    fn test_default_health_insurer_falls_back_to_first() {
        let loader = ConfigLoader::builtin().unwrap();
        let rates = loader.rate_year(2026).unwrap();
        assert_eq!(rates.default_health_insurer().unwrap().id, "tk");
    }

    #[test]
    fn test_cohort_tables_cover_full_range() {
        let loader = ConfigLoader::builtin().unwrap();
        let rates = loader.rate_year(2026).unwrap();

        for cohort in 2005..=2058 {
            assert!(rates.pension_relief.row_for(cohort, "pension_relief").is_ok());
            assert!(rates.age_relief.row_for(cohort, "age_relief").is_ok());
        }

        let row = rates.pension_relief.row_for(2026, "pension_relief").unwrap();
        assert_eq!(row.rate, dec("0.128"));
        assert_eq!(row.max, dec("960"));
        assert_eq!(row.supplement, dec("288"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
