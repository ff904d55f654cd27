//! Core data models
//!
//! Connection targets, metric records and the request/response contract.

mod contract;
mod metrics;
mod target;

pub use contract::{ErrorResponse, MonitorRequest, MonitorResponse};
pub use metrics::{CpuMetric, DiskEntry, MemoryMetric, MetricKind, MetricsSnapshot};
pub use target::{
    AuthTransport, ConnectionTarget, DEFAULT_TRANSPORT, DEFAULT_WINRM_HTTPS_PORT,
    DEFAULT_WINRM_PORT,
};
