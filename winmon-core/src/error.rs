//! Domain error types for remote metric collection
//!
//! Every failure raised below the command executor (transport faults,
//! non-zero exit statuses) is re-wrapped into exactly one [`MonitorError`]
//! variant. Callers only ever see these four kinds.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MetricKind;

/// Errors surfaced by the monitor to its caller
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Host unreachable, DNS failure, timeout, malformed endpoint, or any
    /// transport fault that matched no other rule
    #[error("{0}")]
    Connection(String),

    /// Credentials were rejected by the remote host
    #[error("{0}")]
    Auth(String),

    /// The script ran but exited with a non-zero status
    #[error("PowerShell script failed: {0}")]
    Script(String),

    /// The script output did not have the shape its collector expects
    #[error("Failed to parse {metric} information: {reason}")]
    Parse {
        /// Collector that rejected the output
        metric: MetricKind,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

impl MonitorError {
    /// Creates a parse error for the given collector
    pub fn parse(metric: MetricKind, reason: impl Into<String>) -> Self {
        Self::Parse {
            metric,
            reason: reason.into(),
        }
    }

    /// Returns the externally visible class of this error
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Connection(_) => ErrorClass::ServiceUnavailable,
            Self::Auth(_) => ErrorClass::Unauthorized,
            Self::Script(_) | Self::Parse { .. } => ErrorClass::Internal,
        }
    }

    /// Returns the human-readable detail shown to the caller, prefixed by
    /// the error class
    #[must_use]
    pub fn detail(&self) -> String {
        format!("{}: {self}", self.class().detail_prefix())
    }
}

/// Status class a [`MonitorError`] maps to at the request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The remote host could not be reached
    ServiceUnavailable,
    /// The remote host rejected the credentials
    Unauthorized,
    /// Anything else
    Internal,
}

impl ErrorClass {
    /// HTTP-style status code for this class
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::ServiceUnavailable => 503,
            Self::Unauthorized => 401,
            Self::Internal => 500,
        }
    }

    /// Prefix prepended to the error message in responses
    #[must_use]
    pub const fn detail_prefix(self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "Failed to connect to server",
            Self::Unauthorized => "Authentication failed",
            Self::Internal => "Error monitoring server",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceUnavailable => write!(f, "service unavailable"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}
