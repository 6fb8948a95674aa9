//! Observed container lifecycle states.
//!
//! The runtime is authoritative; these states record what the orchestrator
//! has seen so far and refuse to move backward.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a container handle, as observed.
///
/// ```text
/// create() → Created
/// start()  → Running
/// wait()   → Exited
/// remove() → Removed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    /// Created but not started.
    Created,

    /// Started; the primary command may still be running.
    Running,

    /// The runtime reported an exit status.
    Exited,

    /// Removal succeeded. Terminal.
    Removed,
}

impl ContainerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ContainerState::Removed)
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: ContainerState) -> bool {
        use ContainerState::*;
        matches!(
            (self, target),
            // Created → Running (start) or Removed (start failed)
            (Created, Running) |
            (Created, Removed) |
            // Running → Exited (wait) or Removed (wait failed, run abandoned)
            (Running, Exited) |
            (Running, Removed) |
            (Exited, Removed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Exited => "exited",
            ContainerState::Removed => "removed",
        }
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
