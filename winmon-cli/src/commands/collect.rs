//! Metric collection commands.

use std::future::Future;

use serde::Serialize;
use tracing::debug;
use winmon_core::{
    ConnectionTarget, ErrorResponse, MonitorError, MonitorResponse, MonitorResult,
    MonitorSettings, WindowsMonitor,
};

use crate::cli::{OutputFormat, TargetArgs};
use crate::error::CliError;
use crate::format::{self, Style};
use crate::util::{build_request, session_options};

/// Full snapshot command handler
pub fn cmd_collect(settings: &MonitorSettings, args: &TargetArgs, style: Style) -> Result<(), CliError> {
    let monitor = create_monitor(settings, args)?;
    let snapshot = run(args.format, monitor.collect_all())?;
    let server = monitor.target().host.clone();

    match args.format {
        OutputFormat::Table => print!("{}", format::render_snapshot(&server, &snapshot, style)),
        OutputFormat::Json => print_json(&MonitorResponse::new(server, snapshot))?,
    }
    Ok(())
}

/// Disk command handler
pub fn cmd_disk(settings: &MonitorSettings, args: &TargetArgs, style: Style) -> Result<(), CliError> {
    let monitor = create_monitor(settings, args)?;
    let disk = run(args.format, monitor.disk_info())?;

    match args.format {
        OutputFormat::Table => print!("{}", format::render_disk(&disk, style)),
        OutputFormat::Json => print_json(&disk)?,
    }
    Ok(())
}

/// CPU command handler
pub fn cmd_cpu(settings: &MonitorSettings, args: &TargetArgs, style: Style) -> Result<(), CliError> {
    let monitor = create_monitor(settings, args)?;
    let cpu = run(args.format, monitor.cpu_info())?;

    match args.format {
        OutputFormat::Table => print!("{}", format::render_cpu(&cpu, style)),
        OutputFormat::Json => print_json(&cpu)?,
    }
    Ok(())
}

/// Memory command handler
pub fn cmd_memory(settings: &MonitorSettings, args: &TargetArgs, style: Style) -> Result<(), CliError> {
    let monitor = create_monitor(settings, args)?;
    let memory = run(args.format, monitor.memory_info())?;

    match args.format {
        OutputFormat::Table => print!("{}", format::render_memory(&memory, style)),
        OutputFormat::Json => print_json(&memory)?,
    }
    Ok(())
}

fn create_monitor(settings: &MonitorSettings, args: &TargetArgs) -> Result<WindowsMonitor, CliError> {
    let options = session_options(settings, args);
    let request = build_request(args, options.scheme)?;
    let target = ConnectionTarget::from(request);
    debug!(
        host = %target.host,
        port = target.port,
        username = %target.username,
        transport = %target.transport,
        scheme = %options.scheme,
        "Monitoring target"
    );
    Ok(WindowsMonitor::new(target, options))
}

/// Drives one monitor operation to completion
///
/// With JSON output a failure is also written to stdout as an
/// [`ErrorResponse`] before it is returned.
fn run<T>(format: OutputFormat, operation: impl Future<Output = MonitorResult<T>>) -> Result<T, CliError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))?;

    runtime.block_on(operation).map_err(|err: MonitorError| {
        if format == OutputFormat::Json {
            if let Err(output_err) = print_json(&ErrorResponse::from_error(&err)) {
                debug!(error = %output_err, "Could not write error response");
            }
        }
        CliError::Monitor(err)
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("Failed to serialize to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
