//! CLI-specific error types and exit code mapping

use ingestflow_core::error::IngestflowError;
use ingestflow_hub::HubError;
use ingestflow_parser::ParserError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The input could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParserError),

    /// Notification hub failure.
    #[error("hub error: {0}")]
    Hub(#[from] HubError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from ingestflow-core.
    #[error("{0}")]
    Core(#[from] IngestflowError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                 |
    /// |------|-------------------------|
    /// | 0    | Success                 |
    /// | 1    | General / command error |
    /// | 2    | Configuration error     |
    /// | 3    | Input rejected or malformed |
    /// | 10   | IO error                |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(IngestflowError::Config(_)) => 2,
            Self::Parse(ParserError::Io(_)) => 10,
            Self::Parse(_) | Self::Core(IngestflowError::Parse(_)) => 3,
            Self::Io(_) | Self::Core(IngestflowError::Io(_)) => 10,
            Self::Command(_) | Self::Hub(_) | Self::JsonSerialize(_) | Self::Core(_) => 1,
        }
    }
}
