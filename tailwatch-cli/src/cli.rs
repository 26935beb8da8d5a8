//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tailwatch_log_pipeline::SourceKind;

/// tailwatch -- turn recent web server log lines into alert records.
///
/// Use `tailwatch <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "tailwatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the tailwatch.toml configuration file.
    #[arg(short, long, default_value = "tailwatch.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one fetch cycle per enabled log source and print the alert records.
    Fetch(FetchArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- fetch ----

/// Fetch recent log lines and print alert records.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Which log source to fetch.
    #[arg(long, default_value = "all")]
    pub source: SourceSelection,
}

/// Log source selection for `fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelection {
    /// Apache2 access log only.
    Access,
    /// nginx error log only.
    Error,
    /// Every enabled source.
    All,
}

impl SourceSelection {
    /// Source kinds covered by this selection, in fetch order.
    pub fn kinds(self) -> &'static [SourceKind] {
        match self {
            Self::Access => &[SourceKind::AccessLog],
            Self::Error => &[SourceKind::ErrorLog],
            Self::All => &SourceKind::ALL,
        }
    }
}

// ---- config ----

/// Manage tailwatch configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, remote, access_log, error_log).
        #[arg(long)]
        section: Option<String>,
    },
}
