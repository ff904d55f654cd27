//! Windows host monitor
//!
//! One [`WindowsMonitor`] serves one request: it owns one lazily opened
//! session and runs the disk, CPU and memory collectors through it in that
//! order.

use std::sync::Arc;

use tracing::{Instrument, info, warn};

use crate::collector::{CpuCollector, DiskCollector, MemoryCollector, collect};
use crate::error::MonitorResult;
use crate::executor::CommandExecutor;
use crate::models::{
    ConnectionTarget, CpuMetric, DiskEntry, MemoryMetric, MetricsSnapshot, MonitorRequest,
};
use crate::session::SessionManager;
use crate::trace_operation;
use crate::tracing::span_names;
use crate::transport::{SessionOptions, ShellTransport, WsManTransport};

/// Collects metrics from one Windows host
#[derive(Debug)]
pub struct WindowsMonitor {
    executor: CommandExecutor,
}

impl WindowsMonitor {
    /// Creates a monitor using the built-in WS-Management transport
    #[must_use]
    pub fn new(target: ConnectionTarget, options: SessionOptions) -> Self {
        Self::with_transport(target, options, Arc::new(WsManTransport::new()))
    }

    /// Creates a monitor over a custom transport
    #[must_use]
    pub fn with_transport(
        target: ConnectionTarget,
        options: SessionOptions,
        transport: Arc<dyn ShellTransport>,
    ) -> Self {
        Self {
            executor: CommandExecutor::new(SessionManager::new(target, options, transport)),
        }
    }

    /// Creates a monitor for an inbound request with default session options
    #[must_use]
    pub fn from_request(request: MonitorRequest) -> Self {
        Self::new(request.into(), SessionOptions::default())
    }

    /// Target this monitor collects from
    #[must_use]
    pub const fn target(&self) -> &ConnectionTarget {
        self.executor.session().target()
    }

    /// Runs an arbitrary script and returns its stdout
    ///
    /// # Errors
    ///
    /// Returns a connection, authentication or script error as classified
    /// by the executor.
    pub async fn execute_powershell(&self, script: &str) -> MonitorResult<String> {
        self.executor.run(script).await
    }

    /// Usage of every filesystem-backed drive
    ///
    /// # Errors
    ///
    /// Returns the executor error, or a parse error for malformed output.
    pub async fn disk_info(&self) -> MonitorResult<Vec<DiskEntry>> {
        collect::<DiskCollector>(&self.executor).await
    }

    /// Processor utilization (takes about one second)
    ///
    /// # Errors
    ///
    /// Returns the executor error, or a parse error for malformed output.
    pub async fn cpu_info(&self) -> MonitorResult<CpuMetric> {
        collect::<CpuCollector>(&self.executor).await
    }

    /// Physical memory usage
    ///
    /// # Errors
    ///
    /// Returns the executor error, or a parse error for malformed output.
    pub async fn memory_info(&self) -> MonitorResult<MemoryMetric> {
        collect::<MemoryCollector>(&self.executor).await
    }

    /// Collects disk, CPU and memory, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first collector error; no partial snapshot is produced.
    pub async fn collect_all(&self) -> MonitorResult<MetricsSnapshot> {
        let target = self.target();
        let span = trace_operation!(
            span_names::COLLECT_ALL,
            host = %target.host,
            port = target.port
        );
        async {
            let result = self.collect_in_order().await;
            match &result {
                Ok(snapshot) => info!(
                    drives = snapshot.disk.len(),
                    cpu = snapshot.cpu.percent,
                    memory = snapshot.memory.percent_used,
                    "Collected metrics"
                ),
                Err(err) => warn!(error = %err, error_class = %err.class(), "Collection failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn collect_in_order(&self) -> MonitorResult<MetricsSnapshot> {
        let disk = self.disk_info().await?;
        let cpu = self.cpu_info().await?;
        let memory = self.memory_info().await?;
        Ok(MetricsSnapshot { disk, cpu, memory })
    }
}
