//! Tracing integration for structured logging
//!
//! Sets up the `tracing` subscriber used by the CLI and provides the span
//! and field names used across session, command and collection code.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Global flag indicating whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// Tracing already initialized
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// Failed to create log file
    #[error("Failed to create log file: {0}")]
    FileCreationFailed(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Tracing log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    /// Error level - only errors
    Error,
    /// Warn level - errors and warnings (default)
    #[default]
    Warn,
    /// Info level - errors, warnings, and info
    Info,
    /// Debug level - all above plus debug messages
    Debug,
    /// Trace level - all messages including WS-Management traffic
    Trace,
}

impl TracingLevel {
    /// Converts to tracing crate's Level
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Raises the level by `steps` (one per `-v` flag), saturating at trace
    #[must_use]
    pub const fn raised(self, steps: u8) -> Self {
        let mut level = self;
        let mut i = 0;
        while i < steps {
            level = match level {
                Self::Error => Self::Warn,
                Self::Warn => Self::Info,
                Self::Info => Self::Debug,
                Self::Debug | Self::Trace => Self::Trace,
            };
            i += 1;
        }
        level
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Output destination for tracing logs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Output to stdout
    Stdout,
    /// Output to stderr
    #[default]
    Stderr,
    /// Output to a file
    File {
        /// Path to the log file
        path: PathBuf,
    },
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Log level
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Whether to include thread ids in events
    pub include_thread_ids: bool,
    /// Custom filter string (overrides level if set)
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Creates a new tracing configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level
    #[must_use]
    pub fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets whether to include thread ids
    #[must_use]
    pub fn with_thread_ids(mut self, include: bool) -> Self {
        self.include_thread_ids = include;
        self
    }

    /// Sets a custom filter string
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Filter directive derived from the level, scoped to this workspace
    #[must_use]
    pub fn default_directive(&self) -> String {
        format!("winmon_core={0},winmon_cli={0}", self.level)
    }
}

/// Initializes the tracing subscriber with the given configuration
///
/// This function should be called once at application startup.
/// Subsequent calls will return an error.
///
/// # Errors
///
/// Returns an error if:
/// - Tracing has already been initialized
/// - The subscriber fails to initialize
/// - File output is configured but the file cannot be created
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = if let Some(ref custom_filter) = config.filter {
        EnvFilter::try_new(custom_filter)
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))?
    } else {
        EnvFilter::try_new(config.default_directive()).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (writer, ansi) = match &config.output {
        TracingOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        TracingOutput::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        TracingOutput::File { path } => {
            let file = std::fs::File::create(path)
                .map_err(|e| TracingError::FileCreationFailed(format!("{}: {e}", path.display())))?;
            (BoxMakeWriter::new(Arc::new(file)), false)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(config.include_thread_ids)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, "Tracing initialized");

    Ok(())
}

/// Macro for creating operation spans with standard fields
///
/// # Examples
///
/// ```ignore
/// use winmon_core::trace_operation;
///
/// let span = trace_operation!("collect.all", host = %target.host);
/// ```
#[macro_export]
macro_rules! trace_operation {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Standard span names
pub mod span_names {
    /// Session establishment span
    pub const SESSION_OPEN: &str = "session.open";
    /// Single script execution span
    pub const COMMAND_RUN: &str = "command.run";
    /// Single collector span
    pub const COLLECT_METRIC: &str = "collect.metric";
    /// Full snapshot span
    pub const COLLECT_ALL: &str = "collect.all";
    /// Settings load span
    pub const CONFIG_LOAD: &str = "config.load";
}

/// Standard field names
pub mod field_names {
    /// Host field
    pub const HOST: &str = "host";
    /// Port field
    pub const PORT: &str = "port";
    /// Metric kind field
    pub const METRIC: &str = "metric";
    /// Remote exit status field
    pub const EXIT_STATUS: &str = "exit_status";
}
