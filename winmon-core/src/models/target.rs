//! Connection target for a remote Windows host

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Default WinRM HTTP listener port
pub const DEFAULT_WINRM_PORT: u16 = 5985;

/// Default WinRM HTTPS listener port
pub const DEFAULT_WINRM_HTTPS_PORT: u16 = 5986;

/// Authentication scheme used when none is requested
pub const DEFAULT_TRANSPORT: &str = "ntlm";

/// Authentication schemes a WinRM listener may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthTransport {
    /// HTTP Basic
    Basic,
    /// NTLM challenge/response
    Ntlm,
    /// Kerberos (SPNEGO)
    Kerberos,
    /// `CredSSP` delegation
    CredSsp,
}

impl AuthTransport {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Ntlm => "ntlm",
            Self::Kerberos => "kerberos",
            Self::CredSsp => "credssp",
        }
    }
}

impl fmt::Display for AuthTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "ntlm" => Ok(Self::Ntlm),
            "kerberos" => Ok(Self::Kerberos),
            "credssp" => Ok(Self::CredSsp),
            other => Err(format!("unknown WinRM transport '{other}'")),
        }
    }
}

/// Everything needed to open a session against one host
///
/// The transport mode is kept as the raw requested string. It is checked
/// by the transport when a session is opened, not here.
pub struct ConnectionTarget {
    /// Hostname or IP address
    pub host: String,
    /// WinRM listener port
    pub port: u16,
    /// Account name (`user`, `DOMAIN\user` or `user@domain`)
    pub username: String,
    /// Account password
    pub password: SecretString,
    /// Requested authentication scheme
    pub transport: String,
}

impl ConnectionTarget {
    /// Creates a target with an explicit transport mode
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: SecretString,
        transport: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password,
            transport: transport.into(),
        }
    }

    /// Parses the requested transport mode
    ///
    /// # Errors
    ///
    /// Returns a message naming the value when it is outside the known set.
    pub fn auth_transport(&self) -> Result<AuthTransport, String> {
        self.transport.parse()
    }

    /// `host:port` label used in logs and messages
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("transport", &self.transport)
            .finish()
    }
}
