//! Failure classification rules
//!
//! Rules are evaluated in order and the first match wins. Both tables are
//! plain data so they can be inspected and tested on their own.

use crate::error::MonitorError;

/// How a needle is compared against a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Needle {
    /// Case-sensitive substring
    Exact(&'static str),
    /// Case-insensitive substring
    AnyCase(&'static str),
}

impl Needle {
    /// Tests the needle against a message and its lowercased copy
    #[must_use]
    pub fn matches(self, message: &str, lowered: &str) -> bool {
        match self {
            Self::Exact(needle) => message.contains(needle),
            Self::AnyCase(needle) => lowered.contains(&needle.to_lowercase()),
        }
    }
}

/// One classification rule: any needle matching selects `kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<K> {
    /// Outcome when the rule matches
    pub kind: K,
    /// Alternatives; one match is enough
    pub needles: &'static [Needle],
}

impl<K: Copy> Rule<K> {
    fn matches(&self, message: &str, lowered: &str) -> bool {
        self.needles.iter().any(|n| n.matches(message, lowered))
    }
}

fn first_match<K: Copy>(rules: &[Rule<K>], message: &str) -> Option<K> {
    let lowered = message.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(message, &lowered))
        .map(|rule| rule.kind)
}

/// Script failures singled out by stderr; unmatched stderr is a script error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFailure {
    /// The remote side refused the operation for the account
    Auth,
}

/// Rules applied to stderr of a failed script
pub const STDERR_AUTH_RULES: &[Rule<ScriptFailure>] = &[Rule {
    kind: ScriptFailure::Auth,
    needles: &[
        Needle::Exact("Access is denied"),
        Needle::AnyCase("authentication"),
    ],
}];

/// Stderr text used when a failed script wrote nothing
pub const UNKNOWN_SCRIPT_ERROR: &str = "Unknown error";

/// Classifies a failed script by its stderr
#[must_use]
pub fn classify_script_failure(stderr: &str) -> MonitorError {
    match first_match(STDERR_AUTH_RULES, stderr) {
        Some(ScriptFailure::Auth) => MonitorError::Auth(stderr.to_string()),
        None => MonitorError::Script(stderr.to_string()),
    }
}

/// Category of a transport fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Host did not answer
    Unreachable,
    /// Hostname did not resolve
    UnresolvedHost,
    /// Server rejected the credentials
    Unauthorized,
}

/// Rules applied to transport fault messages, in priority order
pub const TRANSPORT_FAULT_RULES: &[Rule<FaultKind>] = &[
    Rule {
        kind: FaultKind::Unreachable,
        needles: &[
            Needle::AnyCase("connection refused"),
            Needle::AnyCase("timed out"),
            Needle::AnyCase("unreachable"),
        ],
    },
    Rule {
        kind: FaultKind::UnresolvedHost,
        needles: &[
            Needle::AnyCase("nodename nor servname provided"),
            Needle::AnyCase("name or service not known"),
            Needle::AnyCase("failed to lookup address information"),
            Needle::AnyCase("no such host is known"),
        ],
    },
    Rule {
        kind: FaultKind::Unauthorized,
        needles: &[Needle::AnyCase("401"), Needle::AnyCase("unauthorized")],
    },
];

/// Message for credentials rejected at the transport level
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Classifies a transport fault message for a target
#[must_use]
pub fn classify_transport_fault(message: &str, host: &str, port: u16) -> MonitorError {
    match first_match(TRANSPORT_FAULT_RULES, message) {
        Some(FaultKind::Unreachable) => MonitorError::Connection(format!(
            "Cannot reach server {host}:{port}. Ensure WinRM is enabled and firewall allows connections."
        )),
        Some(FaultKind::UnresolvedHost) => MonitorError::Connection(format!(
            "Cannot resolve hostname '{host}'. Please check the server address."
        )),
        Some(FaultKind::Unauthorized) => {
            MonitorError::Auth("Authentication failed. Check username and password.".to_string())
        }
        None => MonitorError::Connection(format!("WinRM connection error: {message}")),
    }
}
