//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// The only transport the built-in WS-Management client can open
const BUILTIN_TRANSPORT: &str = "basic";

/// `WinMon` command-line interface for remote Windows metrics
#[derive(Parser)]
#[command(name = "winmon-cli")]
#[command(author, version, about = "Collect disk, CPU and memory usage from Windows hosts over WinRM")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML settings file
    #[arg(short, long, global = true, env = "WINMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Collect disk, CPU and memory in one run
    #[command(about = "Collect a full metrics snapshot (disk, then CPU, then memory)")]
    Collect(TargetArgs),

    /// Disk usage per drive
    #[command(about = "Show usage of every filesystem drive")]
    Disk(TargetArgs),

    /// Processor utilization
    #[command(about = "Sample processor utilization (takes about one second)")]
    Cpu(TargetArgs),

    /// Physical memory usage
    #[command(about = "Show physical memory usage")]
    Memory(TargetArgs),
}

impl Commands {
    /// Target arguments shared by every subcommand
    pub const fn target(&self) -> &TargetArgs {
        match self {
            Self::Collect(args) | Self::Disk(args) | Self::Cpu(args) | Self::Memory(args) => args,
        }
    }
}

/// Where to connect and how to print the result
#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Hostname or IP address of the Windows host
    #[arg(short = 'H', long, env = "WINMON_SERVER")]
    pub server: String,

    /// Account name (e.g. `Administrator` or `DOMAIN\user`)
    #[arg(short, long, env = "WINMON_USERNAME")]
    pub username: String,

    /// Account password; prompted when not given
    #[arg(long, env = "WINMON_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// WinRM port (defaults to 5985, or 5986 with --https)
    #[arg(short, long, env = "WINMON_PORT")]
    pub port: Option<u16>,

    /// Authentication transport. The built-in client supports basic only;
    /// ntlm, kerberos and credssp are rejected when the session opens
    #[arg(short, long, env = "WINMON_TRANSPORT", default_value = BUILTIN_TRANSPORT)]
    pub transport: String,

    /// Use an HTTPS endpoint
    #[arg(long)]
    pub https: bool,

    /// Verify the server certificate on HTTPS endpoints
    #[arg(long)]
    pub validate_cert: bool,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

/// Output format for results and errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    Table,
    /// Output as JSON
    Json,
}
