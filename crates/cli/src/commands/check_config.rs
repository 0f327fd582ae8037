//! Check-config command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use liquidity_ratios::SensitivityGrid;

use super::load_config;
use crate::cli::OutputFormat;
use crate::output::{self, KeyValue};

/// Arguments for the check-config command.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Configuration file (YAML or JSON)
    #[arg(long, env = "LIQUIDITY_CONFIG")]
    pub config: PathBuf,
}

/// Executes the check-config command.
pub fn execute(args: CheckConfigArgs, format: OutputFormat) -> Result<()> {
    let config = load_config(&args.config)?;
    let grid = SensitivityGrid::from_config(&config.sensitivity)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let t = &config.thresholds;
    let rows = vec![
        KeyValue::new(
            "Retail stable run-off",
            format!("{:.2}%", config.regulatory_settings.retail_stable_run_off() * 100.0),
        ),
        KeyValue::new("Mapping table", config.mapping.table_path.display().to_string()),
        KeyValue::new("Fallback scale", format!("{:.0}", config.fallback.default_scale)),
        KeyValue::new("LCR minimum / buffer", format!("{:.0} / {:.0}", t.lcr_minimum, t.lcr_buffer)),
        KeyValue::new("NSFR minimum", format!("{:.0}", t.nsfr_minimum)),
        KeyValue::new("Sensitivity grid", format!("{} x {}", grid.rows(), grid.cols())),
    ];
    output::print_table(&rows);
    output::print_success(&format!("{} is valid", args.config.display()));
    Ok(())
}
