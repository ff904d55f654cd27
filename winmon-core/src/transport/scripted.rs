//! In-memory transport that replays queued results
//!
//! Used by tests and dry runs. Each call to [`RemoteShell::run_ps`] pops the
//! next queued outcome and records the script it was given.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::{ExecutionResult, RemoteShell, SessionOptions, ShellTransport, TransportError};
use crate::models::ConnectionTarget;

#[derive(Debug, Default)]
struct ScriptedState {
    responses: VecDeque<Result<ExecutionResult, TransportError>>,
    scripts: Vec<String>,
    open_count: usize,
    open_error: Option<TransportError>,
}

/// Transport whose shells answer from a queue of canned outcomes
///
/// Clones share the same queue, so a test can keep one handle for
/// inspection while the monitor owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedTransport {
    /// Creates a transport with an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ScriptedState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Queues a successful run printing `stdout`
    #[must_use]
    pub fn push_ok(self, stdout: &str) -> Self {
        self.push_exit(0, stdout, "")
    }

    /// Queues a run with an explicit exit status and streams
    #[must_use]
    pub fn push_exit(self, exit_status: i32, stdout: &str, stderr: &str) -> Self {
        let result = ExecutionResult::new(exit_status, stdout, stderr);
        self.with_state(|s| s.responses.push_back(Ok(result)));
        self
    }

    /// Queues a transport failure
    #[must_use]
    pub fn push_fault(self, error: TransportError) -> Self {
        self.with_state(|s| s.responses.push_back(Err(error)));
        self
    }

    /// Makes every `open` call fail with `error`
    #[must_use]
    pub fn fail_open(self, error: TransportError) -> Self {
        self.with_state(|s| s.open_error = Some(error));
        self
    }

    /// Number of times a shell was opened
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.with_state(|s| s.open_count)
    }

    /// Scripts executed so far, in order
    #[must_use]
    pub fn executed_scripts(&self) -> Vec<String> {
        self.with_state(|s| s.scripts.clone())
    }
}

impl ShellTransport for ScriptedTransport {
    fn open(
        &self,
        _target: &ConnectionTarget,
        _options: &SessionOptions,
    ) -> Result<Arc<dyn RemoteShell>, TransportError> {
        self.with_state(|s| {
            s.open_count += 1;
            match &s.open_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })?;
        Ok(Arc::new(ScriptedShell {
            state: Arc::clone(&self.state),
        }))
    }
}

#[derive(Debug)]
struct ScriptedShell {
    state: Arc<Mutex<ScriptedState>>,
}

#[async_trait]
impl RemoteShell for ScriptedShell {
    async fn run_ps(&self, script: &str) -> Result<ExecutionResult, TransportError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.scripts.push(script.to_string());
        state.responses.pop_front().unwrap_or_else(|| {
            Err(TransportError::Fault(
                "scripted transport has no queued response".to_string(),
            ))
        })
    }
}
