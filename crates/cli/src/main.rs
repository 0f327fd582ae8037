//! Liquidity CLI - Basel III LCR/NSFR assessment from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Assess the latest balance sheet under baseline stress
//! liquidity assess --statement bs.csv --config config.yaml
//!
//! # Stressed run with an explicit mapping table, as JSON
//! liquidity assess --statement bs.csv --mapping bank_map.csv --config config.yaml \
//!     --runoff-stress 2.0 --haircut-stress 1.5 --format json
//!
//! # LCR sensitivity grid
//! liquidity sweep --statement bs.csv --config config.yaml --runoff 1:3:5 --haircut 1:2:5
//!
//! # Validate a configuration file
//! liquidity check-config --config config.yaml
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let default = if verbose { "liquidity=debug" } else { "liquidity=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Assess(args) => commands::assess::execute(args, format),
        Commands::Sweep(args) => commands::sweep::execute(args, format),
        Commands::CheckConfig(args) => commands::check_config::execute(args, format),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
