//! Shared constants between the library and its callers.

/// Runtime client defaults
pub mod client {
    /// Timeout in seconds applied by the runtime client to each API request
    pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
}

/// Orchestration defaults
pub mod run {
    /// Upper bound for fetching a container's combined log
    pub const DEFAULT_LOG_TIMEOUT_SECS: u64 = 10;

    /// Tag used when an image reference carries none
    pub const DEFAULT_IMAGE_TAG: &str = "latest";
}

/// Exec session defaults
pub mod exec {
    /// How many times the exec context is inspected after its stream ends
    /// while the runtime still reports it as running
    pub const INSPECT_ATTEMPTS: u32 = 20;

    /// Pause between exec inspections
    pub const INSPECT_INTERVAL_MS: u64 = 50;
}
