//! Sweep command implementation.

use anyhow::Result;
use clap::Args;
use liquidity_core::config::StressRange;
use liquidity_ratios::SensitivityGrid;

use super::{parse_range, StatementInputs};
use crate::cli::OutputFormat;
use crate::output;

/// Arguments for the sweep command.
#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub inputs: StatementInputs,

    /// Run-off stress range as FROM:TO:STEPS (defaults to the config grid)
    #[arg(long, value_parser = parse_range)]
    pub runoff: Option<StressRange>,

    /// Haircut stress range as FROM:TO:STEPS (defaults to the config grid)
    #[arg(long, value_parser = parse_range)]
    pub haircut: Option<StressRange>,
}

/// Executes the sweep command.
pub fn execute(args: SweepArgs, format: OutputFormat) -> Result<()> {
    let loaded = args.inputs.load()?;
    let defaults = &loaded.assessor.config().sensitivity;
    let runoff = args.runoff.unwrap_or(defaults.runoff);
    let haircut = args.haircut.unwrap_or(defaults.haircut);
    let grid = SensitivityGrid::from_ranges(&runoff, &haircut)?;

    let (mapped, matrix) = loaded
        .assessor
        .sensitivity(&loaded.statement, &loaded.source, &grid)?;

    output::print_sweep(&mapped, &matrix, format)
}
