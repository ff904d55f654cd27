//! Settings stored in `config.toml`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::tracing::TracingLevel;
use crate::transport::{
    DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, Scheme, SessionOptions,
};

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Session options (`[session]`)
    #[serde(default)]
    pub session: SessionSettings,
    /// Logging options (`[logging]`)
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// WinRM session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Endpoint scheme (`http` or `https`)
    #[serde(default)]
    pub scheme: Scheme,
    /// WS-Management operation timeout in seconds (default: 10)
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
    /// HTTP read timeout in seconds (default: 15)
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Verify server certificates on HTTPS endpoints (default: false)
    #[serde(default)]
    pub validate_server_cert: bool,
}

const fn default_operation_timeout_secs() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

const fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            operation_timeout_secs: default_operation_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            validate_server_cert: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Base log level before `-v` flags (default: warn)
    #[serde(default)]
    pub level: TracingLevel,
    /// Full `EnvFilter` directive, overrides `level` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl MonitorSettings {
    /// Parses settings from TOML text and validates them
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML and
    /// [`ConfigError::Validation`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let settings: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes settings to TOML
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Checks value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let session = &self.session;
        if session.operation_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "session.operation_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if session.read_timeout_secs <= session.operation_timeout_secs {
            return Err(ConfigError::Validation {
                field: "session.read_timeout_secs".to_string(),
                reason: format!(
                    "must be greater than operation_timeout_secs ({})",
                    session.operation_timeout_secs
                ),
            });
        }
        Ok(())
    }

    /// Session options for the transport
    #[must_use]
    pub const fn to_options(&self) -> SessionOptions {
        SessionOptions {
            scheme: self.session.scheme,
            operation_timeout: Duration::from_secs(self.session.operation_timeout_secs),
            read_timeout: Duration::from_secs(self.session.read_timeout_secs),
            validate_server_cert: self.session.validate_server_cert,
        }
    }
}
