//! Property tests for metric output parsers

use proptest::prelude::*;
use winmon_core::{Collector, CpuCollector, DiskCollector, MemoryCollector, MetricKind, MonitorError};

/// Gigabyte value as PowerShell's `[math]::Round(x, 2)` prints it
fn gb_strategy() -> impl Strategy<Value = String> {
    (0u64..100_000, 0u32..100).prop_map(|(whole, cents)| format!("{whole}.{cents:02}"))
}

fn disk_line_strategy() -> impl Strategy<Value = (String, [String; 4])> {
    (
        "[A-Z]",
        gb_strategy(),
        gb_strategy(),
        gb_strategy(),
        gb_strategy(),
    )
        .prop_map(|(name, used, free, total, pct)| (name, [used, free, total, pct]))
}

/// Lines that never carry exactly five fields
fn malformed_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{1,20}",
        prop::collection::vec("[0-9]{1,3}", 2..=4).prop_map(|fields| fields.join("|")),
        prop::collection::vec("[0-9]{1,3}", 6..=8).prop_map(|fields| fields.join("|")),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every well-formed drive line survives, in order, whatever noise surrounds it
    #[test]
    fn disk_keeps_wellformed_lines_in_order(
        rows in prop::collection::vec(
            (disk_line_strategy(), proptest::option::of(malformed_line_strategy())),
            0..8,
        ),
    ) {
        let mut stdout = String::new();
        for ((name, values), noise) in &rows {
            stdout.push_str(&format!("{name}|{}\r\n", values.join("|")));
            if let Some(noise) = noise {
                stdout.push_str(noise);
                stdout.push_str("\r\n");
            }
        }

        let entries = DiskCollector::parse(&stdout).unwrap();

        prop_assert_eq!(entries.len(), rows.len());
        for (entry, ((name, values), _)) in entries.iter().zip(&rows) {
            prop_assert_eq!(&entry.name, name);
            prop_assert_eq!(entry.used_gb, values[0].parse::<f64>().unwrap());
            prop_assert_eq!(entry.free_gb, values[1].parse::<f64>().unwrap());
            prop_assert_eq!(entry.total_gb, values[2].parse::<f64>().unwrap());
            prop_assert_eq!(entry.percent_used, values[3].parse::<f64>().unwrap());
        }
    }

    /// Property: output made only of malformed lines yields no drives
    #[test]
    fn disk_noise_only_is_empty(noise in prop::collection::vec(malformed_line_strategy(), 0..6)) {
        let entries = DiskCollector::parse(&noise.join("\n")).unwrap();
        prop_assert!(entries.is_empty());
    }

    /// Property: surrounding whitespace never changes the CPU reading
    #[test]
    fn cpu_ignores_surrounding_whitespace(
        value in gb_strategy(),
        before in "[ \t\r\n]{0,4}",
        after in "[ \t\r\n]{0,4}",
    ) {
        let cpu = CpuCollector::parse(&format!("{before}{value}{after}")).unwrap();
        prop_assert_eq!(cpu.percent, value.parse::<f64>().unwrap());
    }

    /// Property: four numeric fields map to total, used, free, percent
    #[test]
    fn memory_maps_fields_in_order(
        total in gb_strategy(),
        used in gb_strategy(),
        free in gb_strategy(),
        pct in gb_strategy(),
    ) {
        let memory = MemoryCollector::parse(&format!("{total}|{used}|{free}|{pct}\r\n")).unwrap();

        prop_assert_eq!(memory.total_gb, total.parse::<f64>().unwrap());
        prop_assert_eq!(memory.used_gb, used.parse::<f64>().unwrap());
        prop_assert_eq!(memory.free_gb, free.parse::<f64>().unwrap());
        prop_assert_eq!(memory.percent_used, pct.parse::<f64>().unwrap());
    }

    /// Property: any field count other than four is a memory parse error
    #[test]
    fn memory_rejects_wrong_field_count(
        fields in prop::collection::vec(gb_strategy(), 1..8)
            .prop_filter("four fields is the valid shape", |f| f.len() != 4),
    ) {
        let err = MemoryCollector::parse(&fields.join("|")).unwrap_err();
        let is_memory_parse = matches!(err, MonitorError::Parse { metric: MetricKind::Memory, .. });
        prop_assert!(is_memory_parse);
        let expected_count = format!("got {}", fields.len());
        prop_assert!(err.to_string().contains(&expected_count));
    }
}
