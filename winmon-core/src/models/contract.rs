//! Request and response shapes exchanged with the external caller

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::metrics::MetricsSnapshot;
use super::target::{ConnectionTarget, DEFAULT_TRANSPORT, DEFAULT_WINRM_PORT};
use crate::error::{ErrorClass, MonitorError};

/// Inbound monitoring request
#[derive(Clone, Serialize, Deserialize)]
pub struct MonitorRequest {
    /// Hostname or IP address
    pub server: String,
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
    /// WinRM port (default 5985)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Authentication scheme (default "ntlm")
    #[serde(default = "default_transport")]
    pub transport: String,
}

const fn default_port() -> u16 {
    DEFAULT_WINRM_PORT
}

fn default_transport() -> String {
    DEFAULT_TRANSPORT.to_string()
}

impl MonitorRequest {
    /// Creates a request with the default port and transport
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            username: username.into(),
            password: password.into(),
            port: default_port(),
            transport: default_transport(),
        }
    }
}

impl fmt::Debug for MonitorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorRequest")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("port", &self.port)
            .field("transport", &self.transport)
            .finish()
    }
}

impl From<MonitorRequest> for ConnectionTarget {
    fn from(req: MonitorRequest) -> Self {
        Self::new(
            req.server,
            req.port,
            req.username,
            SecretString::from(req.password),
            req.transport,
        )
    }
}

/// Successful collection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorResponse {
    /// Always `true`
    pub success: bool,
    /// Host the metrics were collected from
    pub server: String,
    /// When the snapshot finished
    pub collected_at: DateTime<Utc>,
    /// Collected metrics
    pub data: MetricsSnapshot,
}

impl MonitorResponse {
    /// Wraps a snapshot collected just now
    pub fn new(server: impl Into<String>, data: MetricsSnapshot) -> Self {
        Self {
            success: true,
            server: server.into(),
            collected_at: Utc::now(),
            data,
        }
    }
}

/// Failed collection result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Numeric status for the error class (503, 401 or 500)
    pub status: u16,
    /// Error class
    pub class: ErrorClass,
    /// Prefixed human-readable message
    pub detail: String,
}

impl ErrorResponse {
    /// Builds the response for a monitor error
    #[must_use]
    pub fn from_error(err: &MonitorError) -> Self {
        let class = err.class();
        Self {
            success: false,
            status: class.status_code(),
            class,
            detail: err.detail(),
        }
    }
}

impl From<&MonitorError> for ErrorResponse {
    fn from(err: &MonitorError) -> Self {
        Self::from_error(err)
    }
}
