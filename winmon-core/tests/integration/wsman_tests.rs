//! WS-Management client against a local canned-response server

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use winmon_core::{
    ConnectionTarget, ErrorClass, MonitorError, SessionOptions, WindowsMonitor,
};

const DONE_STATE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/CommandState/Done";

type Responder = Arc<dyn Fn(&Request) -> (u16, String) + Send + Sync>;

/// One captured HTTP request
#[derive(Debug, Clone)]
struct Request {
    headers: String,
    body: String,
}

impl Request {
    fn is(&self, action_suffix: &str) -> bool {
        self.body.contains(action_suffix)
    }

    /// Script text carried by a Command request
    fn script(&self) -> Option<String> {
        let start = self.body.find("-encodedcommand</rsp:Arguments><rsp:Arguments>")?
            + "-encodedcommand</rsp:Arguments><rsp:Arguments>".len();
        let end = self.body[start..].find("</rsp:Arguments>")? + start;
        let bytes = STANDARD.decode(&self.body[start..end]).ok()?;
        let utf16: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&utf16).ok()
    }
}

struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockServer {
    async fn start(responder: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let responder = Arc::clone(&responder);
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    serve(stream, responder, captured).await;
                });
            }
        });

        Self { addr, requests }
    }

    fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn monitor(&self, transport: &str) -> WindowsMonitor {
        self.monitor_with(transport, SessionOptions::default())
    }

    fn monitor_with(&self, transport: &str, options: SessionOptions) -> WindowsMonitor {
        let target = ConnectionTarget::new(
            "127.0.0.1",
            self.addr.port(),
            "admin",
            SecretString::from("pw".to_string()),
            transport,
        );
        WindowsMonitor::new(target, options)
    }
}

async fn serve(mut stream: TcpStream, responder: Responder, captured: Arc<Mutex<Vec<Request>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let (head_end, content_length) = loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            break (pos + 4, length);
        }
    };
    while buf.len() < head_end + content_length {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = Request {
        headers: String::from_utf8_lossy(&buf[..head_end]).into_owned(),
        body: String::from_utf8_lossy(&buf[head_end..]).into_owned(),
    };
    let (status, body) = responder(&request);
    captured
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);

    let reason = match status {
        200 => "OK",
        401 => "Unauthorized",
        _ => "Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/soap+xml;charset=UTF-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn timed_out_fault() -> String {
    envelope(
        "<s:Fault><s:Code><s:Value>s:Receiver</s:Value><s:Subcode>\
         <s:Value>w:TimedOut</s:Value></s:Subcode></s:Code>\
         <s:Reason><s:Text>timed out waiting</s:Text></s:Reason></s:Fault>",
    )
}

fn envelope(body: &str) -> String {
    format!(
        "<s:Envelope xmlns:s=\"http://www.w3.org/2003/05/soap-envelope\" \
         xmlns:rsp=\"http://schemas.microsoft.com/wbem/wsman/1/windows/shell\">\
         <s:Header/><s:Body>{body}</s:Body></s:Envelope>"
    )
}

fn receive_body(stdout: &str, stderr: &str, exit_code: i32) -> String {
    let mut body = String::from("<rsp:ReceiveResponse>");
    if !stdout.is_empty() {
        body.push_str(&format!(
            "<rsp:Stream Name=\"stdout\" CommandId=\"CMD-1\">{}</rsp:Stream>",
            STANDARD.encode(stdout)
        ));
    }
    if !stderr.is_empty() {
        body.push_str(&format!(
            "<rsp:Stream Name=\"stderr\" CommandId=\"CMD-1\">{}</rsp:Stream>",
            STANDARD.encode(stderr)
        ));
    }
    body.push_str(&format!(
        "<rsp:CommandState CommandId=\"CMD-1\" State=\"{DONE_STATE}\"><rsp:ExitCode>{exit_code}</rsp:ExitCode></rsp:CommandState>"
    ));
    body.push_str("</rsp:ReceiveResponse>");
    envelope(&body)
}

/// Answers the shell lifecycle and delegates Receive to `on_receive`
fn shell_responder(
    on_receive: impl Fn(&str) -> (u16, String) + Send + Sync + 'static,
) -> Responder {
    let last_script = Arc::new(Mutex::new(String::new()));
    Arc::new(move |req: &Request| {
        if req.is("transfer/Create") {
            (
                200,
                envelope("<rsp:Shell><rsp:ShellId>SHELL-1</rsp:ShellId></rsp:Shell>"),
            )
        } else if req.is("shell/Command") {
            if let Some(script) = req.script() {
                *last_script.lock().unwrap_or_else(PoisonError::into_inner) = script;
            }
            (
                200,
                envelope("<rsp:CommandResponse><rsp:CommandId>CMD-1</rsp:CommandId></rsp:CommandResponse>"),
            )
        } else if req.is("shell/Receive") {
            let script = last_script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            on_receive(&script)
        } else {
            (200, envelope(""))
        }
    })
}

#[tokio::test]
async fn collects_snapshot_over_wsman() {
    let server = MockServer::start(shell_responder(|script| {
        let stdout = if script.contains("Get-PSDrive") {
            "C|60|40|100|60\r\n"
        } else if script.contains("Get-Counter") {
            "12.5\r\n"
        } else {
            "16|8|8|50\r\n"
        };
        (200, receive_body(stdout, "", 0))
    }))
    .await;

    let snapshot = server.monitor("basic").collect_all().await.unwrap();

    assert_eq!(snapshot.disk[0].name, "C");
    assert!((snapshot.cpu.percent - 12.5).abs() < f64::EPSILON);
    assert!((snapshot.memory.free_gb - 8.0).abs() < f64::EPSILON);

    let requests = server.requests();
    // Create, Command, Receive, Signal, Delete per script
    assert_eq!(requests.len(), 15);
    assert!(requests[0].is("transfer/Create"));
    assert!(requests[4].is("transfer/Delete"));
    assert!(
        requests[0]
            .headers
            .to_lowercase()
            .contains("authorization: basic ywrtaw46chc=")
    );
    assert!(
        requests[0]
            .headers
            .to_lowercase()
            .contains("application/soap+xml")
    );
}

#[tokio::test]
async fn receive_timeout_fault_is_polled_again() {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&polls);
    let server = MockServer::start(shell_responder(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            (500, timed_out_fault())
        } else {
            (200, receive_body("42.42\r\n", "", 0))
        }
    }))
    .await;

    let cpu = server.monitor("basic").cpu_info().await.unwrap();

    assert!((cpu.percent - 42.42).abs() < f64::EPSILON);
    assert_eq!(polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn command_that_never_finishes_is_bounded_by_read_timeout() {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&polls);
    let server = MockServer::start(shell_responder(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        (500, timed_out_fault())
    }))
    .await;
    let options = SessionOptions {
        operation_timeout: Duration::from_secs(1),
        read_timeout: Duration::from_secs(2),
        ..SessionOptions::default()
    };

    let err = tokio::time::timeout(
        Duration::from_secs(20),
        server.monitor_with("basic", options).cpu_info(),
    )
    .await
    .expect("cpu_info should give up once the read timeout has elapsed")
    .unwrap_err();

    assert_eq!(
        err,
        MonitorError::Connection(format!(
            "Cannot reach server 127.0.0.1:{}. Ensure WinRM is enabled and firewall allows connections.",
            server.addr.port()
        ))
    );
    // Paced polling, not a busy loop
    let polls = polls.load(Ordering::SeqCst);
    assert!((2..=40).contains(&polls), "polls: {polls}");

    let requests = server.requests();
    let signal = requests.iter().position(|r| r.is("shell/Signal"));
    let delete = requests.iter().position(|r| r.is("transfer/Delete"));
    assert!(signal.is_some(), "command was not terminated");
    assert!(delete > signal, "shell was not deleted after the signal");
}

#[tokio::test]
async fn clixml_access_denied_is_auth_error() {
    let server = MockServer::start(shell_responder(|_| {
        let stderr = "#< CLIXML\r\n<Objs Version=\"1.1.0.1\" xmlns=\"http://schemas.microsoft.com/powershell/2004/04\">\
                      <S S=\"Error\">Get-WmiObject : Access is denied._x000D__x000A_</S></Objs>";
        (200, receive_body("", stderr, 1))
    }))
    .await;

    let err = server.monitor("basic").memory_info().await.unwrap_err();

    assert_eq!(
        err,
        MonitorError::Auth("Get-WmiObject : Access is denied.".to_string())
    );
}

#[tokio::test]
async fn http_401_is_invalid_credentials() {
    let server = MockServer::start(Arc::new(|_: &Request| (401, String::new()))).await;

    let err = server.monitor("basic").cpu_info().await.unwrap_err();

    assert_eq!(
        err,
        MonitorError::Auth("Invalid username or password".to_string())
    );
}

#[tokio::test]
async fn http_500_without_fault_is_connection_error() {
    let server = MockServer::start(Arc::new(|_: &Request| (500, "oops".to_string()))).await;

    let err = server.monitor("basic").cpu_info().await.unwrap_err();

    assert_eq!(
        err,
        MonitorError::Connection(
            "WinRM connection error: Bad HTTP response returned from server. Code 500".to_string()
        )
    );
}

#[tokio::test]
async fn ntlm_is_rejected_before_any_request() {
    let server = MockServer::start(shell_responder(|_| (200, receive_body("1", "", 0)))).await;

    let err = server.monitor("ntlm").cpu_info().await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::ServiceUnavailable);
    assert!(
        err.to_string()
            .starts_with("Failed to establish WinRM connection:")
    );
    assert!(err.to_string().contains("use 'basic'"));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn refused_connection_names_host_and_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let target = ConnectionTarget::new(
        "127.0.0.1",
        port,
        "admin",
        SecretString::from("pw".to_string()),
        "basic",
    );
    let err = WindowsMonitor::new(target, SessionOptions::default())
        .cpu_info()
        .await
        .unwrap_err();

    assert_eq!(
        err,
        MonitorError::Connection(format!(
            "Cannot reach server 127.0.0.1:{port}. Ensure WinRM is enabled and firewall allows connections."
        ))
    );
}
