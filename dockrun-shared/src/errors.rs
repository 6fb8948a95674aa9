//! Error taxonomy for container orchestration.
//!
//! Every variant that wraps a runtime failure names the operation that
//! triggered it, so a message read in isolation still says what was being
//! attempted.

use std::time::Duration;
use thiserror::Error;

/// Result type for dockrun operations.
pub type DockrunResult<T> = Result<T, DockrunError>;

/// Errors produced while talking to the container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DockrunError {
    /// The runtime service could not be reached.
    #[error("cannot reach container runtime at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// Pulling an image failed.
    #[error("pull_image failed for {image}: {message}")]
    Image { image: String, message: String },

    /// The create call was rejected (bad image, invalid mount, exhaustion).
    #[error("create_container failed for image {image}: {message}")]
    Create { image: String, message: String },

    /// The container was created but could not be started.
    #[error("start_container failed for {container_id}: {message}")]
    Start {
        container_id: String,
        message: String,
    },

    /// Communication with the runtime broke while waiting for exit.
    #[error("wait_container failed for {container_id}: {message}")]
    Wait {
        container_id: String,
        message: String,
    },

    /// The combined log could not be retrieved.
    #[error("container_logs failed for {container_id}: {message}")]
    LogFetch {
        container_id: String,
        message: String,
    },

    /// The container could not be removed.
    #[error("remove_container failed for {container_id}: {message}")]
    Remove {
        container_id: String,
        message: String,
    },

    /// An exec context failed, or its output stream broke mid-copy.
    #[error("exec failed for {target}: {message}")]
    Exec { target: String, message: String },

    /// Listing running containers failed.
    #[error("list_containers failed: {0}")]
    List(String),

    /// A read from a runtime output stream failed before its clean end.
    #[error("output stream broke: {0}")]
    Stream(String),

    /// A bounded operation ran past its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Caller supplied something unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DockrunError {
    /// Name of the runtime operation this error belongs to.
    pub fn operation(&self) -> &'static str {
        match self {
            DockrunError::Connection { .. } => "connect",
            DockrunError::Image { .. } => "pull_image",
            DockrunError::Create { .. } => "create_container",
            DockrunError::Start { .. } => "start_container",
            DockrunError::Wait { .. } => "wait_container",
            DockrunError::LogFetch { .. } => "container_logs",
            DockrunError::Remove { .. } => "remove_container",
            DockrunError::Exec { .. } => "exec",
            DockrunError::List(_) => "list_containers",
            DockrunError::Stream(_) => "stream",
            DockrunError::Timeout { operation, .. } => operation,
            DockrunError::InvalidArgument(_) => "validate",
            DockrunError::Config(_) => "config",
            DockrunError::Internal(_) => "internal",
        }
    }

    /// Soft errors are reported but never become the primary failure of a
    /// composite run.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            DockrunError::LogFetch { .. } | DockrunError::Remove { .. }
        )
    }
}

impl From<serde_json::Error> for DockrunError {
    fn from(err: serde_json::Error) -> Self {
        DockrunError::Config(err.to_string())
    }
}
