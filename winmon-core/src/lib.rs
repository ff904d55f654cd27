//! `WinMon` Core Library
//!
//! Collects disk, CPU and memory utilization from Windows hosts by running
//! short PowerShell scripts over WinRM (WS-Management) and parsing their
//! output into typed records.
//!
//! # Crate Structure
//!
//! - [`models`] - Connection target, metric records, request/response contract
//! - [`transport`] - Remote shell capability and the built-in WS-Management client
//! - [`session`] - Lazily opened, reused session per monitor
//! - [`executor`] - Script execution and failure classification
//! - [`collector`] - Disk, CPU and memory scripts with their parsers
//! - [`monitor`] - [`WindowsMonitor`], the per-request aggregator
//! - [`config`] - TOML settings
//! - [`tracing`] - Subscriber setup, span and field names
//!
//! # Example
//!
//! ```no_run
//! use winmon_core::{MonitorRequest, WindowsMonitor};
//!
//! # async fn run() -> Result<(), winmon_core::MonitorError> {
//! let mut request = MonitorRequest::new("10.0.0.5", "Administrator", "secret");
//! request.transport = "basic".to_string();
//!
//! let monitor = WindowsMonitor::from_request(request);
//! let snapshot = monitor.collect_all().await?;
//! println!("CPU: {}%", snapshot.cpu.percent);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod collector;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod monitor;
pub mod session;
pub mod tracing;
pub mod transport;

pub use collector::{Collector, CpuCollector, DiskCollector, MemoryCollector};
pub use config::{ConfigError, ConfigResult, MonitorSettings};
pub use error::{ErrorClass, MonitorError, MonitorResult};
pub use executor::CommandExecutor;
pub use models::{
    AuthTransport, ConnectionTarget, CpuMetric, DiskEntry, ErrorResponse, MemoryMetric,
    MetricKind, MetricsSnapshot, MonitorRequest, MonitorResponse,
};
pub use monitor::WindowsMonitor;
pub use session::SessionManager;
pub use transport::{
    ExecutionResult, RemoteShell, Scheme, ScriptedTransport, SessionOptions, ShellTransport,
    TransportError, WsManTransport,
};
