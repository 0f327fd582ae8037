//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{AssessArgs, CheckConfigArgs, SweepArgs};

/// Basel III liquidity coverage and stable funding ratios
#[derive(Parser)]
#[command(name = "liquidity")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Map a balance sheet and compute LCR and NSFR for one stress scenario
    Assess(AssessArgs),

    /// Compute an LCR grid over run-off and haircut stress ranges
    Sweep(SweepArgs),

    /// Load and validate a configuration file
    CheckConfig(CheckConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}
