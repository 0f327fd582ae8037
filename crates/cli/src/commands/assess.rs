//! Assess command implementation.
//!
//! Maps the latest statement period to Basel buckets and reports LCR and
//! NSFR for one stress scenario.

use anyhow::Result;
use clap::Args;
use liquidity_core::StressScenario;

use super::StatementInputs;
use crate::cli::OutputFormat;
use crate::output;

/// Arguments for the assess command.
#[derive(Args, Debug)]
pub struct AssessArgs {
    #[command(flatten)]
    pub inputs: StatementInputs,

    /// Run-off stress multiplier (>= 1.0)
    #[arg(long, default_value_t = 1.0)]
    pub runoff_stress: f64,

    /// Haircut stress multiplier (>= 1.0)
    #[arg(long, default_value_t = 1.0)]
    pub haircut_stress: f64,

    /// Entity name for the report (defaults to the statement file name)
    #[arg(long)]
    pub entity: Option<String>,
}

/// Executes the assess command.
pub fn execute(args: AssessArgs, format: OutputFormat) -> Result<()> {
    let stress = StressScenario::new(args.runoff_stress, args.haircut_stress)?;
    let loaded = args.inputs.load()?;
    let entity = args
        .entity
        .clone()
        .unwrap_or_else(|| args.inputs.default_entity());

    let assessment = loaded
        .assessor
        .assess(&entity, &loaded.statement, &loaded.source, stress)?;

    output::print_assessment(&assessment, format)
}
