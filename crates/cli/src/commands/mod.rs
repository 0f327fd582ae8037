//! CLI command implementations.

pub mod assess;
pub mod check_config;
pub mod sweep;

pub use assess::AssessArgs;
pub use check_config::CheckConfigArgs;
pub use sweep::SweepArgs;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use liquidity_core::config::StressRange;
use liquidity_core::Config;
use liquidity_ingestion::{CsvMappingSource, Statement, StatementReader};
use liquidity_ratios::Assessor;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Inputs shared by the commands that read a statement.
#[derive(Args, Debug)]
pub struct StatementInputs {
    /// Balance-sheet CSV (long `label,amount` or wide with period columns)
    #[arg(long)]
    pub statement: PathBuf,

    /// Mapping table CSV (defaults to `mapping.table_path` from the config)
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(long, env = "LIQUIDITY_CONFIG")]
    pub config: PathBuf,
}

/// Everything a command needs to run the pipeline.
pub struct Loaded {
    pub assessor: Assessor,
    pub statement: Statement,
    pub source: CsvMappingSource,
}

impl StatementInputs {
    /// Load config and statement; a broken mapping path is left to the fallback.
    pub fn load(&self) -> Result<Loaded> {
        let config = load_config(&self.config)?;
        let mapping_path = self
            .mapping
            .clone()
            .unwrap_or_else(|| config.mapping.table_path.clone());
        let assessor = Assessor::new(config)?;

        let statement = StatementReader::new()
            .read_path(&self.statement)
            .with_context(|| format!("reading statement {}", self.statement.display()))?;
        debug!(
            items = statement.items.len(),
            skipped = statement.skipped_rows,
            column = %statement.column,
            mapping = %mapping_path.display(),
            "loaded statement"
        );

        Ok(Loaded {
            assessor,
            statement,
            source: CsvMappingSource::new(mapping_path),
        })
    }

    /// Entity name derived from the statement file name.
    pub fn default_entity(&self) -> String {
        self.statement
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("loading config {}", path.display()))
}

/// Parses a stress range in `FROM:TO:STEPS` form.
pub fn parse_range(s: &str) -> CliResult<StressRange> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [start, end, steps] = parts.as_slice() else {
        return Err(CliError::InvalidRange(s.to_string()));
    };

    let start: f64 = start.parse().map_err(|_| CliError::InvalidRange(s.to_string()))?;
    let end: f64 = end.parse().map_err(|_| CliError::InvalidRange(s.to_string()))?;
    let steps: usize = steps.parse().map_err(|_| CliError::InvalidRange(s.to_string()))?;

    let range = StressRange::new(start, end, steps);
    range.validate(s)?;
    Ok(range)
}
