//! CLI-specific error types and exit code mapping

use tailwatch_core::error::TailwatchError;
use tailwatch_log_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from tailwatch-core.
    #[error("{0}")]
    Core(#[from] TailwatchError),

    /// Log pipeline domain error.
    #[error("{0}")]
    Pipeline(#[from] LogPipelineError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success                         |
    /// | 1    | General / command error         |
    /// | 2    | Configuration error             |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Core(TailwatchError::Config(_))
            | Self::Pipeline(LogPipelineError::Config { .. })
            | Self::Pipeline(LogPipelineError::VulnList { .. }) => 2,
            Self::Io(_)
            | Self::Core(TailwatchError::Io(_))
            | Self::Pipeline(LogPipelineError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Pipeline(_) => 1,
        }
    }
}
