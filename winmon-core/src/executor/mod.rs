//! Command execution with failure classification
//!
//! [`CommandExecutor::run`] is the boundary below which errors are
//! transport-shaped and above which every failure is a [`MonitorError`].

pub mod classify;

use tracing::{Instrument, debug, info_span, warn};

pub use classify::{
    FaultKind, INVALID_CREDENTIALS, Needle, Rule, STDERR_AUTH_RULES, ScriptFailure,
    TRANSPORT_FAULT_RULES, UNKNOWN_SCRIPT_ERROR, classify_script_failure,
    classify_transport_fault,
};

use crate::error::{MonitorError, MonitorResult};
use crate::session::SessionManager;
use crate::tracing::{field_names, span_names};
use crate::transport::TransportError;

/// Runs scripts through a session and classifies their failures
#[derive(Debug)]
pub struct CommandExecutor {
    session: SessionManager,
}

impl CommandExecutor {
    /// Creates an executor over a session manager
    #[must_use]
    pub const fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// Runs a script and returns its stdout
    ///
    /// # Errors
    ///
    /// - [`MonitorError::Connection`] if the session cannot be opened or the
    ///   host cannot be reached
    /// - [`MonitorError::Auth`] if credentials are rejected
    /// - [`MonitorError::Script`] if the script exits with a non-zero status
    pub async fn run(&self, script: &str) -> MonitorResult<String> {
        let target = self.session.target();
        let span = info_span!(
            span_names::COMMAND_RUN,
            { field_names::HOST } = %target.host,
            { field_names::PORT } = target.port,
            { field_names::EXIT_STATUS } = tracing::field::Empty
        );
        self.run_inner(script).instrument(span).await
    }

    async fn run_inner(&self, script: &str) -> MonitorResult<String> {
        let shell = self.session.ensure_session().await?;
        let target = self.session.target();

        let result = match shell.run_ps(script).await {
            Ok(result) => result,
            Err(TransportError::InvalidCredentials) => {
                warn!("Remote host rejected the credentials");
                return Err(MonitorError::Auth(INVALID_CREDENTIALS.to_string()));
            }
            Err(TransportError::Unsupported(message) | TransportError::Fault(message)) => {
                let err = classify_transport_fault(&message, &target.host, target.port);
                warn!(fault = %message, error = %err, "Transport fault");
                return Err(err);
            }
        };

        tracing::Span::current().record(field_names::EXIT_STATUS, result.exit_status);

        if !result.success() {
            let stderr = result
                .stderr_text()
                .unwrap_or_else(|| UNKNOWN_SCRIPT_ERROR.to_string());
            let err = classify_script_failure(&stderr);
            warn!(exit_status = result.exit_status, error = %err, "Script failed");
            return Err(err);
        }

        debug!(bytes = result.stdout.len(), "Script completed");
        Ok(result.stdout_text())
    }

    /// Session manager backing this executor
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }
}
