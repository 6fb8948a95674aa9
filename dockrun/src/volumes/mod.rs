//! Bind mount resolution.
//!
//! Turns caller-supplied `(host path, container path)` pairs into the bind
//! mounts carried by the runtime's container-creation call.

use bollard::models::{Mount, MountTypeEnum};
use dockrun_shared::errors::{DockrunError, DockrunResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A host directory made visible inside the container.
///
/// The host path must exist on the runtime host. That is not checked here;
/// the runtime rejects unknown paths at creation time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeMount {
    pub host_path: String,
    pub target_path: String,
}

impl VolumeMount {
    pub fn new(host_path: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            target_path: target_path.into(),
        }
    }
}

impl std::str::FromStr for VolumeMount {
    type Err = String;

    /// Parse `HOST:TARGET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((host, target)) if !host.is_empty() && !target.is_empty() => {
                Ok(Self::new(host, target))
            }
            _ => Err(format!(
                "invalid volume '{}': expected HOST_PATH:CONTAINER_PATH",
                s
            )),
        }
    }
}

impl std::fmt::Display for VolumeMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host_path, self.target_path)
    }
}

/// Runtime-native bind mount description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindMount {
    pub source: String,
    pub target: String,
}

impl BindMount {
    /// Build the mount entry of the create call's host config.
    pub fn to_runtime_mount(&self) -> Mount {
        Mount {
            typ: Some(MountTypeEnum::BIND),
            source: Some(self.source.clone()),
            target: Some(self.target.clone()),
            ..Default::default()
        }
    }
}

impl From<&VolumeMount> for BindMount {
    fn from(volume: &VolumeMount) -> Self {
        Self {
            source: volume.host_path.clone(),
            target: volume.target_path.clone(),
        }
    }
}

/// Resolve volume mounts into bind mounts.
///
/// Order is preserved and nothing is deduplicated or validated: empty paths
/// are forwarded as-is, and for duplicate targets the runtime's own rule
/// (last one wins) applies.
pub fn resolve(mounts: &[VolumeMount]) -> Vec<BindMount> {
    mounts.iter().map(BindMount::from).collect()
}

/// Opt-in validation for callers who want errors before reaching the runtime.
///
/// Rejects empty paths and targets mounted more than once.
pub fn validate(mounts: &[VolumeMount]) -> DockrunResult<()> {
    let mut targets = HashSet::new();
    for mount in mounts {
        if mount.host_path.is_empty() || mount.target_path.is_empty() {
            return Err(DockrunError::InvalidArgument(format!(
                "mount '{}' has an empty path",
                mount
            )));
        }
        if !targets.insert(mount.target_path.as_str()) {
            return Err(DockrunError::InvalidArgument(format!(
                "container path '{}' is mounted more than once",
                mount.target_path
            )));
        }
    }
    Ok(())
}
