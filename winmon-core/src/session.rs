//! Lazily opened remote session
//!
//! A [`SessionManager`] owns at most one shell per monitor. The shell is
//! opened on the first command and reused for every later one; a failed
//! open leaves the slot empty so the next call tries again.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::{MonitorError, MonitorResult};
use crate::models::ConnectionTarget;
use crate::tracing::{field_names, span_names};
use crate::transport::{RemoteShell, SessionOptions, ShellTransport};

/// Owner of the single session bound to one connection target
pub struct SessionManager {
    target: ConnectionTarget,
    options: SessionOptions,
    transport: Arc<dyn ShellTransport>,
    session: OnceCell<Arc<dyn RemoteShell>>,
}

impl SessionManager {
    /// Creates a manager; nothing is opened until [`Self::ensure_session`]
    #[must_use]
    pub fn new(
        target: ConnectionTarget,
        options: SessionOptions,
        transport: Arc<dyn ShellTransport>,
    ) -> Self {
        Self {
            target,
            options,
            transport,
            session: OnceCell::new(),
        }
    }

    /// Returns the session, opening it on first use
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Connection`] when the transport cannot open a
    /// session for the target.
    pub async fn ensure_session(&self) -> MonitorResult<Arc<dyn RemoteShell>> {
        let session = self
            .session
            .get_or_try_init(|| async { self.open() }.instrument(self.open_span()))
            .await?;
        Ok(Arc::clone(session))
    }

    fn open(&self) -> MonitorResult<Arc<dyn RemoteShell>> {
        debug!(
            endpoint = %self.options.endpoint(&self.target),
            username = %self.target.username,
            transport = %self.target.transport,
            "Opening WinRM session"
        );
        self.transport
            .open(&self.target, &self.options)
            .map_err(|e| {
                warn!(error = %e, "WinRM session could not be opened");
                MonitorError::Connection(format!("Failed to establish WinRM connection: {e}"))
            })
    }

    fn open_span(&self) -> tracing::Span {
        info_span!(
            span_names::SESSION_OPEN,
            { field_names::HOST } = %self.target.host,
            { field_names::PORT } = self.target.port
        )
    }

    /// Whether a session has been opened
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.initialized()
    }

    /// Target this manager connects to
    #[must_use]
    pub const fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Options used when opening the session
    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("session", &self.session.get())
            .finish_non_exhaustive()
    }
}
