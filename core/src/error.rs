//! Error types for the portscope-core library.

use thiserror::Error;

/// Result type alias for portscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port/process queries and process termination.
#[derive(Error, Debug)]
pub enum Error {
    /// User input was rejected before any command ran.
    #[error("{0}")]
    Validation(String),

    /// A required OS tool (or the shell itself) is not installed or not on PATH.
    #[error("required system tool not found: {0}")]
    ToolNotFound(String),

    /// The shell could not be spawned (permission denied, fork failure, ...).
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// A system command did not finish within the configured timeout.
    #[error("Command timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Input validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Failure to run a system command at all (missing tool, spawn failure, timeout).
    pub fn is_system_command(&self) -> bool {
        matches!(
            self,
            Error::ToolNotFound(_) | Error::CommandFailed(_) | Error::Timeout { .. }
        )
    }
}
