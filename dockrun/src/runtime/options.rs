//! Configuration for dockrun.

use crate::runtime::constants::{client, envs, run};
use dockrun_shared::errors::{DockrunError, DockrunResult};
use dockrun_shared::Endpoint;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Options for a [`Controller`](crate::Controller).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockrunOptions {
    /// Where the runtime daemon listens.
    ///
    /// Default: `Endpoint::Local` (`DOCKER_HOST`, then the platform socket)
    #[serde(default)]
    pub endpoint: Endpoint,

    /// Per-request timeout applied by the runtime client, in seconds.
    ///
    /// Default: 120
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,

    /// Upper bound for fetching a container's combined log, in seconds.
    ///
    /// Default: 10
    #[serde(default = "default_log_timeout_secs")]
    pub log_timeout_secs: u64,

    /// Deadline applied to exec sessions that don't pass their own.
    ///
    /// Default: None (wait for the exec stream to end)
    #[serde(default)]
    pub exec_timeout_secs: Option<u64>,

    /// Leave the container in place when a one-shot run fails after
    /// creation, for post-mortem inspection.
    ///
    /// Default: false (always remove)
    #[serde(default)]
    pub keep_on_failure: bool,
}

fn default_api_timeout_secs() -> u64 {
    client::DEFAULT_API_TIMEOUT_SECS
}

fn default_log_timeout_secs() -> u64 {
    run::DEFAULT_LOG_TIMEOUT_SECS
}

impl Default for DockrunOptions {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Local,
            api_timeout_secs: default_api_timeout_secs(),
            log_timeout_secs: default_log_timeout_secs(),
            exec_timeout_secs: None,
            keep_on_failure: false,
        }
    }
}

impl DockrunOptions {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> DockrunResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> DockrunResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DockrunError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> DockrunResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(host) = lookup(envs::DOCKER_HOST) {
            // unix:// and tcp:// are parsed here; anything else is left to the
            // client's own DOCKER_HOST handling.
            if let Ok(endpoint) = Endpoint::from_uri(&host) {
                options.endpoint = endpoint;
            }
        }

        if let Some(raw) = lookup(envs::LOG_TIMEOUT_SECS) {
            options.log_timeout_secs = parse_secs(envs::LOG_TIMEOUT_SECS, &raw)?;
        }

        if let Some(raw) = lookup(envs::EXEC_TIMEOUT_SECS) {
            options.exec_timeout_secs = Some(parse_secs(envs::EXEC_TIMEOUT_SECS, &raw)?);
        }

        if let Some(raw) = lookup(envs::KEEP_ON_FAILURE) {
            options.keep_on_failure = matches!(raw.trim(), "1" | "true" | "yes");
        }

        Ok(options)
    }

    /// Bound for log fetches.
    pub fn log_timeout(&self) -> Duration {
        Duration::from_secs(self.log_timeout_secs)
    }

    /// Default deadline for exec sessions.
    pub fn exec_timeout(&self) -> Option<Duration> {
        self.exec_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_secs(key: &str, raw: &str) -> DockrunResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| DockrunError::Config(format!("{}='{}': {}", key, raw, e)))
}
