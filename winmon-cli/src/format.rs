//! Table rendering for collected metrics.

use std::fmt::Write as _;

use winmon_core::{CpuMetric, DiskEntry, MemoryMetric, MetricsSnapshot};

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Usage at or above this percentage is shown in red
const CRITICAL_PERCENT: f64 = 90.0;
/// Usage at or above this percentage is shown in yellow
const WARNING_PERCENT: f64 = 75.0;

/// ANSI styling, or none of it
#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    fn bold(self, text: &str) -> String {
        if self.color {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn percent(self, value: f64) -> String {
        let text = format!("{value:.2}%");
        if !self.color {
            return text;
        }
        let color = if value >= CRITICAL_PERCENT {
            RED
        } else if value >= WARNING_PERCENT {
            YELLOW
        } else {
            GREEN
        };
        format!("{color}{text}{RESET}")
    }
}

/// Renders the drive table
pub fn render_disk(entries: &[DiskEntry], style: Style) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style.bold("Disk"));

    if entries.is_empty() {
        out.push_str("  No filesystem drives reported.\n");
        return out;
    }

    let name_width = entries
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0)
        .max("DRIVE".len());

    let _ = writeln!(
        out,
        "  {:<name_width$}  {:>10}  {:>10}  {:>10}  {:>8}",
        "DRIVE", "USED GB", "FREE GB", "TOTAL GB", "USED"
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "  {:<name_width$}  {:>10.2}  {:>10.2}  {:>10.2}  {:>8}",
            entry.name,
            entry.used_gb,
            entry.free_gb,
            entry.total_gb,
            style.percent(entry.percent_used)
        );
    }
    out
}

/// Renders the CPU line
pub fn render_cpu(cpu: &CpuMetric, style: Style) -> String {
    format!("{}\n  Usage: {}\n", style.bold("CPU"), style.percent(cpu.percent))
}

/// Renders the memory block
pub fn render_memory(memory: &MemoryMetric, style: Style) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style.bold("Memory"));
    let _ = writeln!(out, "  Total: {:.2} GB", memory.total_gb);
    let _ = writeln!(out, "  Used:  {:.2} GB", memory.used_gb);
    let _ = writeln!(out, "  Free:  {:.2} GB", memory.free_gb);
    let _ = writeln!(out, "  Usage: {}", style.percent(memory.percent_used));
    out
}

/// Renders a full snapshot with a header line
pub fn render_snapshot(server: &str, snapshot: &MetricsSnapshot, style: Style) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", style.bold(&format!("Server: {server}")));
    out.push_str(&render_disk(&snapshot.disk, style));
    out.push('\n');
    out.push_str(&render_cpu(&snapshot.cpu, style));
    out.push('\n');
    out.push_str(&render_memory(&snapshot.memory, style));
    out
}
