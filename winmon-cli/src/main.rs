//! `WinMon` CLI - Command-line interface for remote Windows metrics
//!
//! Collects disk, CPU and memory usage from a Windows host over WinRM
//! and prints it as a table or as JSON.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use clap::Parser;
use cli::Cli;
use winmon_core::MonitorSettings;
use winmon_core::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};

use crate::format::Style;

fn main() {
    let cli = Cli::parse();

    let result = util::load_settings(cli.config.as_deref()).and_then(|settings| {
        init_logging(&settings, &cli);
        commands::dispatch(&settings, &cli.command, Style::new(!cli.no_color))
    });

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

/// Sets up logging; `-v` flags raise the configured level and override
/// a configured filter
fn init_logging(settings: &MonitorSettings, cli: &Cli) {
    let level = if cli.quiet {
        TracingLevel::Error
    } else {
        settings.logging.level.raised(cli.verbose)
    };

    let mut config = TracingConfig::new()
        .with_level(level)
        .with_thread_ids(cli.verbose >= 3);
    if let Some(filter) = settings.logging.filter.as_deref() {
        if cli.verbose == 0 {
            config = config.with_filter(filter);
        }
    }
    if let Some(path) = &cli.log_file {
        config = config.with_output(TracingOutput::File { path: path.clone() });
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Warning: logging disabled: {e}");
    }
}
