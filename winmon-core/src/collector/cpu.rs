use super::Collector;
use crate::error::{MonitorError, MonitorResult};
use crate::models::{CpuMetric, MetricKind};

/// Processor utilization from one 1-second `Get-Counter` sample
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuCollector;

impl Collector for CpuCollector {
    type Output = CpuMetric;

    const KIND: MetricKind = MetricKind::Cpu;

    const SCRIPT: &'static str = r"
$cpu = Get-Counter '\Processor(_Total)\% Processor Time' -SampleInterval 1 -MaxSamples 1
$cpuPercent = [math]::Round($cpu.CounterSamples[0].CookedValue, 2)
Write-Output $cpuPercent
";

    fn parse(stdout: &str) -> MonitorResult<CpuMetric> {
        let value = stdout.trim();
        value
            .parse::<f64>()
            .map(|percent| CpuMetric { percent })
            .map_err(|_| MonitorError::parse(Self::KIND, format!("not a number: '{value}'")))
    }
}
