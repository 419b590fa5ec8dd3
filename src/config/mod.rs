//! Configuration loading and management for the gross-to-net engine.
//!
//! This module loads engine settings, federal states and per-year rate
//! tables from YAML files. A copy of the shipped configuration is embedded
//! in the crate and available through [`ConfigLoader::builtin`].
//!
//! # Example
//!
//! ```no_run
//! use gross_net_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/de").unwrap();
//! println!("Loaded engine config: {}", config.settings().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AgeReliefRow, AllowanceConfig, CohortRow, CohortTable, ConsistencyCheckConfig,
    ContributionCeilings, ContributionRates, EngineConfig, EngineSettings, HealthInsurer,
    PensionReliefRow, ProvisionConfig, RateYear, SolidarityConfig, SplitTariffConfig,
    StateConfig, StatesConfig, TariffConfig,
};
