//! Gross-to-net payroll engine for Germany
//!
//! This crate computes statutory wage-tax withholding (Lohnsteuer, solidarity
//! surcharge and church-tax base) following the official withholding
//! procedure, the employee's social-insurance contributions, and a combined
//! gross-to-net result for yearly, monthly, weekly or daily pay periods.
//!
//! # Example
//!
//! ```
//! use gross_net_engine::calculation::compute_gross_net;
//! use gross_net_engine::config::ConfigLoader;
//! use gross_net_engine::models::{GrossNetInput, PayPeriod};
//! use rust_decimal::Decimal;
//!
//! let config = ConfigLoader::builtin().unwrap();
//! let input = GrossNetInput::new(Decimal::from(50_000), PayPeriod::Year, 2026);
//! let result = compute_gross_net(&input, config).unwrap();
//! assert!(result.employee.net_period < result.meta.gross_period);
//! ```

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
