//! Metric collectors
//!
//! Each collector owns one PowerShell script and the parser for the
//! pipe-delimited text that script prints. Sizes are rounded on the remote
//! side, so parsers only validate shape and convert numbers.

mod cpu;
mod disk;
mod memory;

use tracing::{Instrument, debug, info_span};

pub use cpu::CpuCollector;
pub use disk::DiskCollector;
pub use memory::MemoryCollector;

use crate::error::{MonitorError, MonitorResult};
use crate::executor::CommandExecutor;
use crate::models::MetricKind;
use crate::tracing::{field_names, span_names};

/// Field separator used by every collector script
pub const FIELD_SEPARATOR: char = '|';

/// A script plus the parser for its output
pub trait Collector {
    /// Parsed record
    type Output;

    /// Which metric this collector produces
    const KIND: MetricKind;

    /// PowerShell source run on the remote host
    const SCRIPT: &'static str;

    /// Parses the script's stdout
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Parse`] when the output does not have the
    /// expected shape.
    fn parse(stdout: &str) -> MonitorResult<Self::Output>;
}

/// Runs a collector's script and parses the result
///
/// # Errors
///
/// Propagates executor errors unchanged and returns
/// [`MonitorError::Parse`] for malformed output.
pub async fn collect<C: Collector>(executor: &CommandExecutor) -> MonitorResult<C::Output> {
    let span = info_span!(span_names::COLLECT_METRIC, { field_names::METRIC } = %C::KIND);
    async {
        let stdout = executor.run(C::SCRIPT).await?;
        let parsed = C::parse(&stdout);
        if let Err(err) = &parsed {
            debug!(error = %err, output = %stdout.trim(), "Unparseable collector output");
        }
        parsed
    }
    .instrument(span)
    .await
}

/// Parses one numeric field
pub(crate) fn parse_number(kind: MetricKind, field: &str, value: &str) -> MonitorResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| MonitorError::parse(kind, format!("{field} is not a number: '{}'", value.trim())))
}
