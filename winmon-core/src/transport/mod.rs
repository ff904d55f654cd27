//! Remote shell transport capability
//!
//! A [`ShellTransport`] opens an authenticated [`RemoteShell`] against one
//! [`ConnectionTarget`]; the shell runs PowerShell scripts and hands back the
//! raw [`ExecutionResult`]. Everything above this module only sees these two
//! traits, so the built-in WS-Management client and the in-memory
//! [`ScriptedTransport`] are interchangeable.

mod scripted;
pub mod wsman;

use std::error::Error as _;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ConnectionTarget;

pub use scripted::ScriptedTransport;
pub use wsman::WsManTransport;

/// Default WS-Management operation timeout (seconds)
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (seconds); must stay above the operation timeout
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 15;

/// Raw outcome of one script execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Process exit status
    pub exit_status: i32,
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl ExecutionResult {
    /// Creates a result from text streams
    pub fn new(exit_status: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Returns `true` when the script exited with status 0
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Standard output decoded as UTF-8, replacing invalid sequences
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error decoded as UTF-8, or `None` when nothing was written
    #[must_use]
    pub fn stderr_text(&self) -> Option<String> {
        if self.stderr.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.stderr).into_owned())
        }
    }
}

/// Failures raised by a transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server rejected the supplied credentials
    #[error("the specified credentials were rejected by the server")]
    InvalidCredentials,

    /// The transport cannot serve this target (unknown scheme, bad endpoint)
    #[error("{0}")]
    Unsupported(String),

    /// Any other transport-level failure, carrying the raw message
    #[error("{0}")]
    Fault(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest puts the useful part ("Connection refused", "dns error")
        // in the source chain, not in its own Display
        let timed_out = err.is_timeout();
        let err = err.without_url();
        let mut message = err.to_string();
        let mut cause = err.source();
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }
        if timed_out && !message.to_lowercase().contains("timed out") {
            message.push_str(": operation timed out");
        }
        Self::Fault(message)
    }
}

/// URL scheme of the WS-Management endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP (port 5985 by convention)
    #[default]
    Http,
    /// HTTP over TLS (port 5986 by convention)
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Options applied when a session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Endpoint scheme
    pub scheme: Scheme,
    /// Server-side operation timeout
    pub operation_timeout: Duration,
    /// Client-side read timeout
    pub read_timeout: Duration,
    /// Verify the server certificate and hostname on HTTPS endpoints
    pub validate_server_cert: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            validate_server_cert: false,
        }
    }
}

impl SessionOptions {
    /// WS-Management endpoint URL for a target
    #[must_use]
    pub fn endpoint(&self, target: &ConnectionTarget) -> String {
        format!("{}://{}:{}/wsman", self.scheme, target.host, target.port)
    }
}

/// An open, authenticated shell on a remote host
#[async_trait]
pub trait RemoteShell: Send + Sync + fmt::Debug {
    /// Runs a PowerShell script and returns its raw result
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the script could not be delivered or
    /// its output could not be retrieved. A script that ran and failed is
    /// not an error here; it is reported through the exit status.
    async fn run_ps(&self, script: &str) -> Result<ExecutionResult, TransportError>;
}

/// Factory for remote shells
pub trait ShellTransport: Send + Sync {
    /// Opens a shell against a target
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the session cannot be constructed.
    fn open(
        &self,
        target: &ConnectionTarget,
        options: &SessionOptions,
    ) -> Result<Arc<dyn RemoteShell>, TransportError>;
}
