//! CLI error types and exit codes.

use winmon_core::{ConfigError, ErrorClass, MonitorError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// Metrics collected and printed
    pub const SUCCESS: i32 = 0;
    /// General error - configuration, parsing, script or other internal errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - host unreachable, unresolved or session not opened
    pub const CONNECTION_FAILURE: i32 = 2;
    /// Authentication failure - credentials rejected or access denied
    pub const AUTH_FAILURE: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Monitoring failed on the remote side
    #[error("{}", .0.detail())]
    Monitor(MonitorError),

    /// Async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Result could not be written
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<MonitorError> for CliError {
    fn from(err: MonitorError) -> Self {
        Self::Monitor(err)
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, script, parse, IO)
    /// - 2: Connection failure
    /// - 3: Authentication failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Monitor(err) => match err.class() {
                ErrorClass::ServiceUnavailable => exit_codes::CONNECTION_FAILURE,
                ErrorClass::Unauthorized => exit_codes::AUTH_FAILURE,
                ErrorClass::Internal => exit_codes::GENERAL_ERROR,
            },
            Self::Config(_) | Self::Runtime(_) | Self::Output(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}
