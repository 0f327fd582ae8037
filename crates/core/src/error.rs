//! Error types for the liquidity engine.

use thiserror::Error;

use crate::types::BaselCategory;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the liquidity engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration key is absent.
    #[error("Missing configuration key: {0}")]
    ConfigurationMissing(String),

    /// A configuration value is present but out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stress multiplier is below 1.0 or not finite.
    #[error("Invalid stress multiplier {name}={value}: must be a finite value >= 1.0")]
    InvalidStress { name: &'static str, value: f64 },

    /// Mapping table missing, unreadable or malformed.
    #[error("Mapping resource error: {0}")]
    MappingResource(String),

    /// Reconciliation left one or more critical buckets empty.
    #[error("Mapping incomplete: missing critical categories {}", format_categories(.missing))]
    MappingIncomplete { missing: Vec<BaselCategory> },

    /// Input data failed a sanity check during reconciliation.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Upstream statement data is empty or could not be retrieved.
    #[error("Statement data unavailable: {0}")]
    DataUnavailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration-missing error for a dotted key path.
    pub fn configuration_missing(path: impl Into<String>) -> Self {
        Error::ConfigurationMissing(path.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create a mapping resource error.
    pub fn mapping_resource(msg: impl Into<String>) -> Self {
        Error::MappingResource(msg.into())
    }

    /// Create a malformed input error.
    pub fn malformed_input(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// Create a data unavailable error.
    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Error::DataUnavailable(msg.into())
    }

    /// Whether the category mapper absorbs this error through the fallback
    /// estimator instead of surfacing it to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MappingResource(_)
                | Error::MappingIncomplete { .. }
                | Error::MalformedInput(_)
                | Error::Io(_)
                | Error::Csv(_)
        )
    }
}

fn format_categories(categories: &[BaselCategory]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
