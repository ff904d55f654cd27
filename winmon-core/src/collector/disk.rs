use tracing::debug;

use super::{Collector, FIELD_SEPARATOR, parse_number};
use crate::error::MonitorResult;
use crate::models::{DiskEntry, MetricKind};

/// Filesystem volume usage via `Get-PSDrive`
///
/// Drives without a `Used` value (unmounted optical drives, some network
/// shares) are skipped by the script.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskCollector;

impl Collector for DiskCollector {
    type Output = Vec<DiskEntry>;

    const KIND: MetricKind = MetricKind::Disk;

    const SCRIPT: &'static str = r#"
Get-PSDrive -PSProvider FileSystem | Where-Object {$_.Used -ne $null} | ForEach-Object {
    $totalGB = [math]::Round($_.Used / 1GB + $_.Free / 1GB, 2)
    $usedGB = [math]::Round($_.Used / 1GB, 2)
    $freeGB = [math]::Round($_.Free / 1GB, 2)
    $percentUsed = if ($totalGB -gt 0) { [math]::Round(($usedGB / $totalGB) * 100, 2) } else { 0 }
    Write-Output "$($_.Name)|$usedGB|$freeGB|$totalGB|$percentUsed"
}
"#;

    /// One `name|used|free|total|percent` line per drive
    ///
    /// Blank lines and lines without exactly five fields are dropped. A line
    /// with five fields and a non-numeric value fails the whole parse.
    fn parse(stdout: &str) -> MonitorResult<Vec<DiskEntry>> {
        let mut entries = Vec::new();

        for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            if parts.len() != 5 {
                debug!(line, fields = parts.len(), "Skipping malformed disk line");
                continue;
            }

            entries.push(DiskEntry {
                name: parts[0].trim().to_string(),
                used_gb: parse_number(Self::KIND, "used_gb", parts[1])?,
                free_gb: parse_number(Self::KIND, "free_gb", parts[2])?,
                total_gb: parse_number(Self::KIND, "total_gb", parts[3])?,
                percent_used: parse_number(Self::KIND, "percent_used", parts[4])?,
            });
        }

        Ok(entries)
    }
}
