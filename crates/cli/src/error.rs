//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Stress range argument not in `FROM:TO:STEPS` form.
    #[error("Invalid stress range '{0}'. Use FROM:TO:STEPS, e.g. 1:3:5.")]
    InvalidRange(String),

    /// Engine rejected an argument value.
    #[error(transparent)]
    Engine(#[from] liquidity_core::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
