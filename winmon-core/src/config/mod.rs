//! Configuration loading
//!
//! Settings live in an optional TOML file. A missing default file means
//! defaults; a missing file that was asked for explicitly is an error.

mod settings;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use settings::{LoggingSettings, MonitorSettings, SessionSettings};

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested file does not exist
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read
    #[error("Failed to read configuration: {0}")]
    Read(String),

    /// The file is not valid TOML or has the wrong shape
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Settings could not be written as TOML
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    Validation {
        /// Dotted field path
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default settings path: `<config dir>/winmon/config.toml`
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("winmon").join("config.toml"))
}

/// Loads and validates settings from a file
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if the file does not exist, or a read,
/// parse or validation error.
pub fn load(path: &Path) -> ConfigResult<MonitorSettings> {
    let _span = crate::trace_operation!(
        crate::tracing::span_names::CONFIG_LOAD,
        path = %path.display()
    )
    .entered();

    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Read(format!("{}: {e}", path.display()))
        }
    })?;
    let settings = MonitorSettings::from_toml_str(&text)?;
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Loads settings from `path`, or from the default location when `None`
///
/// An explicit path must exist. The default file is optional.
///
/// # Errors
///
/// Returns any error from [`load`], except a missing default file.
pub fn load_or_default(path: Option<&Path>) -> ConfigResult<MonitorSettings> {
    if let Some(path) = path {
        return load(path);
    }
    match default_path() {
        Some(path) => match load(&path) {
            Err(ConfigError::NotFound(_)) => Ok(MonitorSettings::default()),
            other => other,
        },
        None => Ok(MonitorSettings::default()),
    }
}
