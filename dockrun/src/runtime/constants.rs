//! Constants for the dockrun runtime
//!
//! Centralized location for environment variable names and defaults.

// Re-export shared constants from dockrun-shared
pub use dockrun_shared::constants::{client, exec, run};

pub mod envs {
    /// Runtime endpoint, same variable the Docker CLI honors
    pub const DOCKER_HOST: &str = "DOCKER_HOST";

    /// Override for the log fetch bound, in seconds
    pub const LOG_TIMEOUT_SECS: &str = "DOCKRUN_LOG_TIMEOUT_SECS";

    /// Default exec deadline, in seconds
    pub const EXEC_TIMEOUT_SECS: &str = "DOCKRUN_EXEC_TIMEOUT_SECS";

    /// Keep containers whose run failed (`1`/`true`)
    pub const KEEP_ON_FAILURE: &str = "DOCKRUN_KEEP_ON_FAILURE";
}
