//! Built-in WS-Management client
//!
//! Speaks the remote shell exchange (Create, Command, Receive, Signal,
//! Delete) over HTTP(S) with Basic authentication. Each script runs in its
//! own shell, which is deleted afterwards.

pub mod envelope;
pub mod powershell;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};

use self::envelope::Envelope;
use self::response::{WsManResponse, parse_response};
use super::{ExecutionResult, RemoteShell, SessionOptions, ShellTransport, TransportError};
use crate::models::{AuthTransport, ConnectionTarget};

const SOAP_CONTENT_TYPE: &str = "application/soap+xml;charset=UTF-8";

/// Pause before polling again after a `TimedOut` Receive fault
const RECEIVE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Transport that opens [`WsManShell`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct WsManTransport;

impl WsManTransport {
    /// Creates the transport
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ShellTransport for WsManTransport {
    fn open(
        &self,
        target: &ConnectionTarget,
        options: &SessionOptions,
    ) -> Result<Arc<dyn RemoteShell>, TransportError> {
        match target.auth_transport() {
            Ok(AuthTransport::Basic) => {}
            Ok(other) => {
                return Err(TransportError::Unsupported(format!(
                    "the '{other}' transport is not supported by the built-in WS-Management client, use 'basic'"
                )));
            }
            Err(message) => return Err(TransportError::Unsupported(message)),
        }

        let endpoint = options.endpoint(target);
        reqwest::Url::parse(&endpoint).map_err(|e| {
            TransportError::Unsupported(format!("invalid endpoint '{endpoint}': {e}"))
        })?;

        let client = reqwest::Client::builder()
            .timeout(options.read_timeout)
            .connect_timeout(options.operation_timeout)
            .danger_accept_invalid_certs(!options.validate_server_cert)
            .danger_accept_invalid_hostnames(!options.validate_server_cert)
            .build()
            .map_err(|e| TransportError::Unsupported(format!("cannot build HTTP client: {e}")))?;

        debug!(%endpoint, username = %target.username, "WS-Management shell ready");

        Ok(Arc::new(WsManShell {
            client,
            endpoint,
            username: target.username.clone(),
            password: target.password.clone(),
            operation_timeout: options.operation_timeout,
            receive_deadline: options.read_timeout,
        }))
    }
}

/// Shell bound to one endpoint and set of credentials
pub struct WsManShell {
    client: reqwest::Client,
    endpoint: String,
    username: String,
    password: SecretString,
    operation_timeout: Duration,
    /// Upper bound on waiting for one command's output
    receive_deadline: Duration,
}

impl std::fmt::Debug for WsManShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsManShell")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("operation_timeout", &self.operation_timeout)
            .field("receive_deadline", &self.receive_deadline)
            .finish_non_exhaustive()
    }
}

impl WsManShell {
    /// Posts one envelope
    ///
    /// A SOAP fault is returned inside the response so callers can decide
    /// whether it is fatal.
    async fn post(&self, envelope: &Envelope<'_>) -> Result<WsManResponse, TransportError> {
        trace!(action = envelope.action(), "WS-Management request");
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(envelope.render())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::InvalidCredentials);
        }

        let body = response.text().await?;
        if status.is_success() {
            return parse_response(&body);
        }

        match parse_response(&body) {
            Ok(parsed) if parsed.fault.is_some() => Ok(parsed),
            _ => Err(TransportError::Fault(format!(
                "Bad HTTP response returned from server. Code {}",
                status.as_u16()
            ))),
        }
    }

    async fn create_shell(&self) -> Result<String, TransportError> {
        let envelope = Envelope::create_shell(&self.endpoint, self.operation_timeout);
        self.post(&envelope)
            .await?
            .into_result()?
            .shell_id
            .ok_or_else(|| TransportError::Fault("server did not return a shell id".to_string()))
    }

    async fn run_in_shell(
        &self,
        shell_id: &str,
        script: &str,
    ) -> Result<ExecutionResult, TransportError> {
        let (program, args) = powershell::command_line(script);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let envelope = Envelope::command(
            &self.endpoint,
            self.operation_timeout,
            shell_id,
            program,
            &arg_refs,
        );
        let command_id = self
            .post(&envelope)
            .await?
            .into_result()?
            .command_id
            .ok_or_else(|| {
                TransportError::Fault("server did not return a command id".to_string())
            })?;

        let outcome = tokio::time::timeout(
            self.receive_deadline,
            self.receive_output(shell_id, &command_id),
        )
        .await
        .unwrap_or_else(|_| {
            Err(TransportError::Fault(format!(
                "command {command_id} timed out after {:?} without completing",
                self.receive_deadline
            )))
        });

        let envelope = Envelope::signal_terminate(
            &self.endpoint,
            self.operation_timeout,
            shell_id,
            &command_id,
        );
        if let Err(err) = self.post(&envelope).await.and_then(WsManResponse::into_result) {
            debug!(%command_id, error = %err, "failed to signal command termination");
        }

        outcome
    }

    /// Polls Receive until the command reports Done
    ///
    /// A `TimedOut` fault only means no output arrived within the operation
    /// timeout; the caller bounds the whole loop.
    async fn receive_output(
        &self,
        shell_id: &str,
        command_id: &str,
    ) -> Result<ExecutionResult, TransportError> {
        let mut result = ExecutionResult::default();
        loop {
            let envelope =
                Envelope::receive(&self.endpoint, self.operation_timeout, shell_id, command_id);
            let chunk = self.post(&envelope).await?;
            if chunk.fault.as_ref().is_some_and(response::Fault::is_timeout) {
                trace!(%command_id, "receive timed out, polling again");
                tokio::time::sleep(RECEIVE_RETRY_DELAY).await;
                continue;
            }
            let chunk = chunk.into_result()?;
            result.stdout.extend_from_slice(&chunk.stdout);
            result.stderr.extend_from_slice(&chunk.stderr);
            if chunk.done {
                result.exit_status = chunk.exit_code.unwrap_or_default();
                return Ok(result);
            }
        }
    }

    async fn delete_shell(&self, shell_id: &str) {
        let envelope = Envelope::delete_shell(&self.endpoint, self.operation_timeout, shell_id);
        if let Err(err) = self.post(&envelope).await.and_then(WsManResponse::into_result) {
            debug!(%shell_id, error = %err, "failed to delete remote shell");
        }
    }
}

#[async_trait]
impl RemoteShell for WsManShell {
    async fn run_ps(&self, script: &str) -> Result<ExecutionResult, TransportError> {
        let shell_id = self.create_shell().await?;
        let outcome = self.run_in_shell(&shell_id, script).await;
        self.delete_shell(&shell_id).await;

        let mut result = outcome?;
        if let Some(stderr) = result.stderr_text() {
            result.stderr = powershell::clean_error_stream(&stderr).into_bytes();
        }
        Ok(result)
    }
}
