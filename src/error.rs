//! Error types for the gross-to-net engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing withholding and
//! contributions.

use thiserror::Error;

/// The main error type for the gross-to-net engine.
///
/// Errors fall into three groups: configuration errors (missing files,
/// unsupported years, unknown lookup keys), input validation errors, and
/// internal consistency failures detected after a computation.
///
/// # Example
///
/// ```
/// use gross_net_engine::error::EngineError;
///
/// let error = EngineError::UnsupportedYear { year: 2019 };
/// assert_eq!(error.to_string(), "No rate table for fiscal year 2019");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No rate table is registered for the requested fiscal year.
    #[error("No rate table for fiscal year {year}")]
    UnsupportedYear {
        /// The requested fiscal year.
        year: i32,
    },

    /// The statutory health insurer id is not in the year's catalogue.
    #[error("Unknown health insurer '{id}' for fiscal year {year}")]
    UnknownHealthInsurer {
        /// The insurer id that was requested.
        id: String,
        /// The fiscal year whose catalogue was searched.
        year: u16,
    },

    /// The federal state code is not configured.
    #[error("Unknown federal state code: {code}")]
    UnknownState {
        /// The state code that was requested.
        code: String,
    },

    /// A cohort table has no row for the computed cohort.
    #[error("Table '{table}' has no entry for cohort {cohort}")]
    TableIndexOutOfRange {
        /// The name of the table.
        table: String,
        /// The cohort year that was looked up.
        cohort: u16,
    },

    /// An input field was out of range or malformed.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A finished computation violated an internal invariant.
    #[error("Internal consistency check failed: {message}")]
    ConsistencyCheckFailed {
        /// A description of the violated invariant.
        message: String,
    },
}

impl EngineError {
    /// Convenience constructor for [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by configuration rather than input.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigNotFound { .. }
                | EngineError::ConfigParseError { .. }
                | EngineError::UnsupportedYear { .. }
                | EngineError::UnknownHealthInsurer { .. }
                | EngineError::UnknownState { .. }
                | EngineError::TableIndexOutOfRange { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/rates/2026.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/rates/2026.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_unknown_health_insurer_displays_id_and_year() {
        let error = EngineError::UnknownHealthInsurer {
            id: "acme".to_string(),
            year: 2026,
        };
        assert_eq!(
            error.to_string(),
            "Unknown health insurer 'acme' for fiscal year 2026"
        );
    }

    #[test]
    fn test_unknown_state_displays_code() {
        let error = EngineError::UnknownState {
            code: "XX".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown federal state code: XX");
    }

    #[test]
    fn test_table_index_out_of_range_displays_table_and_cohort() {
        let error = EngineError::TableIndexOutOfRange {
            table: "pension_relief".to_string(),
            cohort: 2040,
        };
        assert_eq!(
            error.to_string(),
            "Table 'pension_relief' has no entry for cohort 2040"
        );
    }

    #[test]
    fn test_invalid_input_displays_field_and_message() {
        let error = EngineError::invalid_input("tax_class", "must be between 1 and 6");
        assert_eq!(
            error.to_string(),
            "Invalid input field 'tax_class': must be between 1 and 6"
        );
    }

    #[test]
    fn test_consistency_failure_is_not_configuration_error() {
        let error = EngineError::ConsistencyCheckFailed {
            message: "zero tax on substantial gross".to_string(),
        };
        assert!(!error.is_configuration_error());
        assert!(EngineError::UnsupportedYear { year: 2020 }.is_configuration_error());
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_unsupported_year() -> EngineResult<()> {
            Err(EngineError::UnsupportedYear { year: 1999 })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_unsupported_year()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
