//! Error types for the CLI

use core_types::SchedulerError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The scheduler refused to run
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Unknown scenario name
    #[error("unknown scenario '{0}' (use --list to see available scenarios)")]
    UnknownScenario(String),

    /// File I/O error
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Trace serialization error
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
