//! Container lifecycle and exec sessions.
//!
//! This module is organized into focused submodules:
//! - `lifecycle`: create/start, wait, log fetch, removal and the one-shot run
//! - `exec`: secondary commands and stdout/stderr demultiplexing
//! - `state`: observed lifecycle states

mod exec;
mod lifecycle;
mod state;

pub use exec::Demultiplexer;
pub use state::ContainerState;

pub(crate) use exec::exec;
pub(crate) use lifecycle::{
    create, ensure_image, fetch_log, remove, run_and_clean, run_detached, stop_container, wait,
};

use crate::runtime::types::ContainerHandle;
use dockrun_shared::DockrunError;

/// Combined log of a one-shot run.
///
/// Log retrieval is best-effort: when it fails the run still succeeds, and
/// the failure is kept next to whatever was read before it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogOutcome {
    /// The whole log was read.
    Complete(String),

    /// The log could not be read to its end.
    Degraded {
        partial: String,
        cause: DockrunError,
    },
}

impl LogOutcome {
    /// Log text, complete or not.
    pub fn text(&self) -> &str {
        match self {
            LogOutcome::Complete(text) => text,
            LogOutcome::Degraded { partial, .. } => partial,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, LogOutcome::Degraded { .. })
    }

    /// Why the log is incomplete, if it is.
    pub fn cause(&self) -> Option<&DockrunError> {
        match self {
            LogOutcome::Complete(_) => None,
            LogOutcome::Degraded { cause, .. } => Some(cause),
        }
    }
}

/// Result of a one-shot run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    /// Exit status reported by the runtime.
    pub exit_code: i64,
    pub log: LogOutcome,
}

impl RunResult {
    /// Combined stdout+stderr as emitted by the container.
    pub fn combined_log(&self) -> &str {
        self.log.text()
    }

    /// Returns true if the exit code was 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Output and exit status of an exec session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
}

impl ExecResult {
    /// Returns true if the exit code was 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Failure to launch a container.
///
/// `handle` is set when the container was created before the failure (start
/// failed, for instance), so the caller can still clean it up.
#[derive(Debug)]
pub struct LaunchError {
    pub handle: Option<ContainerHandle>,
    pub error: DockrunError,
}

impl LaunchError {
    pub(crate) fn before_create(error: DockrunError) -> Self {
        Self {
            handle: None,
            error,
        }
    }

    pub(crate) fn after_create(handle: ContainerHandle, error: DockrunError) -> Self {
        Self {
            handle: Some(handle),
            error,
        }
    }
}

impl std::fmt::Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.handle {
            Some(handle) => write!(f, "{} (container {} left created)", self.error, handle),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<LaunchError> for DockrunError {
    fn from(err: LaunchError) -> Self {
        err.error
    }
}
