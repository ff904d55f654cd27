//! Monitor behavior over the scripted transport

use std::sync::Arc;

use secrecy::SecretString;
use winmon_core::{
    Collector, ConnectionTarget, CpuCollector, DiskCollector, ErrorClass, ErrorResponse,
    MemoryCollector, MonitorError, MonitorResponse, ScriptedTransport, SessionOptions,
    TransportError, WindowsMonitor,
};

fn target() -> ConnectionTarget {
    ConnectionTarget::new(
        "win-srv-01",
        5985,
        "CORP\\monitor",
        SecretString::from("s3cret".to_string()),
        "basic",
    )
}

fn monitor(transport: &ScriptedTransport) -> WindowsMonitor {
    WindowsMonitor::with_transport(
        target(),
        SessionOptions::default(),
        Arc::new(transport.clone()),
    )
}

#[tokio::test]
async fn full_snapshot_in_fixed_order() {
    let transport = ScriptedTransport::new()
        .push_ok("C|120.5|379.5|500|24.1\r\nD|10|90|100|10\r\n")
        .push_ok("7.81\r\n")
        .push_ok("31.86|12.4|19.46|38.92\r\n");

    let snapshot = monitor(&transport).collect_all().await.unwrap();

    assert_eq!(snapshot.disk.len(), 2);
    assert_eq!(snapshot.disk[1].name, "D");
    assert!((snapshot.cpu.percent - 7.81).abs() < f64::EPSILON);
    assert!((snapshot.memory.total_gb - 31.86).abs() < f64::EPSILON);
    assert_eq!(
        transport.executed_scripts(),
        vec![
            DiskCollector::SCRIPT,
            CpuCollector::SCRIPT,
            MemoryCollector::SCRIPT
        ]
    );
}

#[tokio::test]
async fn session_is_reused_across_calls() {
    let transport = ScriptedTransport::new()
        .push_ok("1.5")
        .push_ok("2.5")
        .push_ok("16|8|8|50");
    let monitor = monitor(&transport);

    monitor.cpu_info().await.unwrap();
    monitor.cpu_info().await.unwrap();
    monitor.memory_info().await.unwrap();

    assert_eq!(transport.open_count(), 1);
}

#[tokio::test]
async fn cpu_failure_skips_memory() {
    let transport = ScriptedTransport::new()
        .push_ok("C|1|2|3|33.33\r\n")
        .push_exit(1, "", "Get-Counter : The specified object was not found on the computer.")
        .push_ok("16|8|8|50\r\n");

    let err = monitor(&transport).collect_all().await.unwrap_err();

    assert_eq!(
        err,
        MonitorError::Script(
            "Get-Counter : The specified object was not found on the computer.".to_string()
        )
    );
    let scripts = transport.executed_scripts();
    assert_eq!(scripts.len(), 2);
    assert!(!scripts.contains(&MemoryCollector::SCRIPT.to_string()));
}

#[tokio::test]
async fn disk_failure_aborts_before_cpu() {
    let transport = ScriptedTransport::new().push_fault(TransportError::Fault(
        "error sending request: client error (Connect): tcp connect error: Connection refused (os error 111)"
            .to_string(),
    ));

    let err = monitor(&transport).collect_all().await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
    assert!(err.to_string().contains("win-srv-01:5985"));
    assert_eq!(transport.executed_scripts().len(), 1);
}

#[tokio::test]
async fn unauthorized_fault_is_auth_error() {
    let transport = ScriptedTransport::new().push_fault(TransportError::Fault(
        "Bad HTTP response returned from server. Code 401".to_string(),
    ));

    let err = monitor(&transport).memory_info().await.unwrap_err();

    assert_eq!(
        err,
        MonitorError::Auth("Authentication failed. Check username and password.".to_string())
    );
    assert_eq!(
        ErrorResponse::from_error(&err).detail,
        "Authentication failed: Authentication failed. Check username and password."
    );
}

#[tokio::test]
async fn access_denied_script_is_auth_error() {
    let transport = ScriptedTransport::new().push_exit(1, "", "Access is denied.");
    let err = monitor(&transport).disk_info().await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unauthorized);
    assert_eq!(ErrorResponse::from_error(&err).status, 401);
}

#[tokio::test]
async fn open_failure_is_retried_on_next_call() {
    let transport = ScriptedTransport::new()
        .fail_open(TransportError::Unsupported("no route to host".to_string()));
    let monitor = monitor(&transport);

    let first = monitor.cpu_info().await.unwrap_err();
    let second = monitor.cpu_info().await.unwrap_err();

    assert_eq!(first, second);
    assert_eq!(first.class(), ErrorClass::ServiceUnavailable);
    assert_eq!(transport.open_count(), 2);
    assert!(transport.executed_scripts().is_empty());
}

#[tokio::test]
async fn response_serializes_snapshot_under_data() {
    let transport = ScriptedTransport::new()
        .push_ok("C|60|40|100|60\r\n")
        .push_ok("12.5\r\n")
        .push_ok("16|8|8|50\r\n");
    let monitor = monitor(&transport);
    let snapshot = monitor.collect_all().await.unwrap();

    let response = MonitorResponse::new(monitor.target().host.clone(), snapshot);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["server"], "win-srv-01");
    assert_eq!(json["data"]["disk"][0]["name"], "C");
    assert_eq!(json["data"]["cpu"]["percent"], 12.5);
    assert_eq!(json["data"]["memory"]["percent_used"], 50.0);
    assert!(json["collected_at"].is_string());
}
