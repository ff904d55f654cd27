use super::{Collector, FIELD_SEPARATOR, parse_number};
use crate::error::{MonitorError, MonitorResult};
use crate::models::{MemoryMetric, MetricKind};

/// Physical memory from `Win32_OperatingSystem`
///
/// The WMI counters are in kilobytes, so dividing by `1MB` yields GB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryCollector;

impl Collector for MemoryCollector {
    type Output = MemoryMetric;

    const KIND: MetricKind = MetricKind::Memory;

    const SCRIPT: &'static str = r#"
$os = Get-WmiObject Win32_OperatingSystem
$totalGB = [math]::Round($os.TotalVisibleMemorySize / 1MB, 2)
$freeGB = [math]::Round($os.FreePhysicalMemory / 1MB, 2)
$usedGB = [math]::Round($totalGB - $freeGB, 2)
$percentUsed = [math]::Round(($usedGB / $totalGB) * 100, 2)
Write-Output "$totalGB|$usedGB|$freeGB|$percentUsed"
"#;

    /// A single `total|used|free|percent` line
    fn parse(stdout: &str) -> MonitorResult<MemoryMetric> {
        let parts: Vec<&str> = stdout.trim().split(FIELD_SEPARATOR).collect();
        if parts.len() != 4 {
            return Err(MonitorError::parse(
                Self::KIND,
                format!("expected 4 fields, got {}", parts.len()),
            ));
        }

        Ok(MemoryMetric {
            total_gb: parse_number(Self::KIND, "total_gb", parts[0])?,
            used_gb: parse_number(Self::KIND, "used_gb", parts[1])?,
            free_gb: parse_number(Self::KIND, "free_gb", parts[2])?,
            percent_used: parse_number(Self::KIND, "percent_used", parts[3])?,
        })
    }
}
