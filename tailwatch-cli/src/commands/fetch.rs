//! `tailwatch fetch` command handler

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use tailwatch_core::config::TailwatchConfig;
use tailwatch_core::pipeline::LogSource;
use tailwatch_core::types::{AlertRecord, Severity};
use tailwatch_log_pipeline::{
    AdapterConfig, CommandExecutor, ProcessExecutor, SourceAdapter, SourceKind, VulnSignatures,
};

use crate::cli::FetchArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `fetch` command.
///
/// Runs one fetch cycle for every selected source that is enabled in the
/// configuration, in `access_log`, `error_log` order, and renders the
/// combined records.
///
/// # Errors
///
/// Returns `CliError::Config` when no selected source is enabled, and the
/// underlying pipeline error when a command cannot be started.
pub async fn execute(
    args: FetchArgs,
    config: &TailwatchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let kinds = enabled_kinds(config, args.source.kinds());
    if kinds.is_empty() {
        return Err(CliError::Config(
            "no enabled log source matches the selection".to_owned(),
        ));
    }

    let signatures = load_signatures(config).await?;
    let executor = ProcessExecutor::from_remote(&config.remote)?;
    info!(exec_target = ?executor.target(), sources = kinds.len(), "starting fetch");

    let report = fetch_all(config, &kinds, &executor, signatures).await?;
    writer.render(&report)?;

    Ok(())
}

/// Selected kinds whose configuration section is enabled.
fn enabled_kinds(config: &TailwatchConfig, selected: &[SourceKind]) -> Vec<SourceKind> {
    selected
        .iter()
        .copied()
        .filter(|kind| match kind {
            SourceKind::AccessLog => config.access_log.enabled,
            SourceKind::ErrorLog => config.error_log.enabled,
        })
        .collect()
}

async fn load_signatures(config: &TailwatchConfig) -> Result<Arc<VulnSignatures>, CliError> {
    let signatures = match config.general.vuln_list_path.as_deref() {
        Some(path) => VulnSignatures::load(path).await?,
        None => VulnSignatures::builtin(),
    };
    debug!(entries = signatures.len(), "scanner signatures ready");
    Ok(signatures.into_shared())
}

async fn fetch_all<E: CommandExecutor + Clone>(
    config: &TailwatchConfig,
    kinds: &[SourceKind],
    executor: &E,
    signatures: Arc<VulnSignatures>,
) -> Result<FetchReport, CliError> {
    let mut records = Vec::new();
    for &kind in kinds {
        let adapter_config = AdapterConfig::from_core(config, kind)?;
        let mut adapter =
            SourceAdapter::new(adapter_config, executor.clone(), Arc::clone(&signatures))?;
        records.extend(collect(&mut adapter).await?);
    }
    Ok(FetchReport { records })
}

/// Run one cycle of any log source.
async fn collect<S: LogSource>(source: &mut S) -> Result<Vec<AlertRecord>, CliError> {
    let records = source.fetch().await?;
    info!(source = source.name(), records = records.len(), "fetch cycle complete");
    Ok(records)
}

/// Records produced by one `fetch` invocation.
#[derive(Serialize)]
#[serde(transparent)]
pub struct FetchReport {
    pub records: Vec<AlertRecord>,
}

impl Render for FetchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.records.is_empty() {
            writeln!(w, "No alert records.")?;
            return Ok(());
        }

        for record in &self.records {
            let label = format!("{:<7}", record.severity.label());
            let label = match record.severity {
                Severity::Critical => label.red().bold(),
                Severity::Warning => label.yellow().bold(),
                Severity::Notice => label.cyan(),
                Severity::Unknown => label.dimmed(),
            };
            writeln!(
                w,
                "{} {} {}: {}",
                label,
                record.source_name.bold(),
                record.title,
                record.message
            )?;
            for field in &record.extra_fields {
                writeln!(w, "    {}: {}", field.title.dimmed(), field.value)?;
            }
        }

        writeln!(w)?;
        writeln!(w, "{} record(s)", self.records.len())?;
        Ok(())
    }
}
