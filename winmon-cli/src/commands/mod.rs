//! Command handler modules for the CLI.

mod collect;

use winmon_core::MonitorSettings;

use crate::cli::Commands;
use crate::error::CliError;
use crate::format::Style;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(settings: &MonitorSettings, command: &Commands, style: Style) -> Result<(), CliError> {
    let args = command.target();
    match command {
        Commands::Collect(_) => collect::cmd_collect(settings, args, style),
        Commands::Disk(_) => collect::cmd_disk(settings, args, style),
        Commands::Cpu(_) => collect::cmd_cpu(settings, args, style),
        Commands::Memory(_) => collect::cmd_memory(settings, args, style),
    }
}
