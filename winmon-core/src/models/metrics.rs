//! Data models for remote host metrics
//!
//! All sizes are gigabytes and all percentages are 0–100, already rounded
//! to two decimals by the remote script. Nothing here is re-derived locally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three metric categories a snapshot is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Filesystem-backed volumes
    Disk,
    /// Processor utilization
    Cpu,
    /// Physical memory
    Memory,
}

impl MetricKind {
    /// Lowercase name used in logs and messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage of one filesystem-backed volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskEntry {
    /// Drive name as reported by PowerShell (e.g. "C")
    pub name: String,
    /// Used space (GB)
    pub used_gb: f64,
    /// Free space (GB)
    pub free_gb: f64,
    /// Total space (GB)
    pub total_gb: f64,
    /// Used space as a percentage of total
    pub percent_used: f64,
}

/// Processor utilization from a single one-second sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuMetric {
    /// Percentage of processor time; can briefly exceed 100 on multi-core
    /// hosts because of how the counter is cooked
    pub percent: f64,
}

/// Physical memory usage
///
/// `used_gb` is `total_gb - free_gb` as computed by the remote script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetric {
    /// Total visible memory (GB)
    pub total_gb: f64,
    /// Used memory (GB)
    pub used_gb: f64,
    /// Free physical memory (GB)
    pub free_gb: f64,
    /// Used memory as a percentage of total
    pub percent_used: f64,
}

/// Disk, CPU and memory metrics gathered in one aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// One entry per volume, in the order the host reported them
    pub disk: Vec<DiskEntry>,
    /// Processor utilization
    pub cpu: CpuMetric,
    /// Physical memory
    pub memory: MemoryMetric,
}
