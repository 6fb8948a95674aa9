//! Core data types for container runs.

use crate::volumes::VolumeMount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque container identifier returned by the runtime on creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerHandle {
    id: String,
}

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<String> for ContainerHandle {
    fn from(id: String) -> Self {
        Self { id }
    }
}

impl From<&str> for ContainerHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What to run: image, command and bind mounts.
///
/// Built per invocation with a `std::process::Command`-like API.
///
/// ```rust
/// use dockrun::{RunSpec, VolumeMount};
///
/// let spec = RunSpec::new("python:3.10-slim-buster")
///     .args(["ls", "-lah", "/test"])
///     .mount(VolumeMount::new("/tmp/x", "/test"));
/// assert_eq!(spec.command, vec!["ls", "-lah", "/test"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    pub image: String,
    /// Empty means the image's default command.
    pub command: Vec<String>,
    pub mounts: Vec<VolumeMount>,
    /// Pseudo-terminal allocation. `None` lets the operation pick: one-shot
    /// runs allocate one so the log is a single interleaved stream,
    /// detached runs do not.
    pub tty: Option<bool>,
}

impl RunSpec {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            command: Vec::new(),
            mounts: Vec::new(),
            tty: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.command.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a bind mount.
    pub fn mount(mut self, mount: VolumeMount) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Add several bind mounts.
    pub fn mounts<I>(mut self, mounts: I) -> Self
    where
        I: IntoIterator<Item = VolumeMount>,
    {
        self.mounts.extend(mounts);
        self
    }

    /// Force pseudo-terminal allocation on or off.
    pub fn tty(mut self, enable: bool) -> Self {
        self.tty = Some(enable);
        self
    }
}
