//! tailwatch CLI entry point
//!
//! Parses arguments, initializes logging and dispatches to the
//! subcommand handlers in [`commands`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use tailwatch_core::config::TailwatchConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Fetch(args) => {
            let mut config = TailwatchConfig::load(&cli.config).await?;
            if let Some(level) = cli.log_level {
                config.general.log_level = level;
            }
            logging::init_tracing(&config.general)
                .map_err(|e| CliError::Config(e.to_string()))?;
            tracing::debug!(path = %cli.config.display(), "configuration loaded");
            tailwatch_core::metrics::describe_all();

            commands::fetch::execute(args, &config, &writer).await
        }
        Commands::Config(args) => {
            let bootstrap = logging::bootstrap_config(cli.log_level.as_deref());
            logging::init_tracing(&bootstrap).map_err(|e| CliError::Config(e.to_string()))?;

            commands::config::execute(args, &cli.config, &writer).await
        }
    }
}
