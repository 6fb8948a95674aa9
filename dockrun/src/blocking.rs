//! Synchronous facade over [`crate::Controller`].
//!
//! Owns a tokio runtime and blocks on each operation. Must not be used from
//! inside an async context.
//!
//! ```rust,no_run
//! use dockrun::{DockrunOptions, RunSpec};
//!
//! let controller = dockrun::blocking::Controller::connect(DockrunOptions::default())?;
//! let result = controller.run_and_clean(RunSpec::new("alpine").args(["echo", "hi"]))?;
//! println!("{}", result.combined_log());
//! # Ok::<(), dockrun::DockrunError>(())
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime as TokioRuntime;

use crate::container::{ExecResult, LaunchError, RunResult};
use crate::portal::RuntimeApi;
use crate::runtime::options::DockrunOptions;
use crate::runtime::types::{ContainerHandle, RunSpec};
use dockrun_shared::errors::{DockrunError, DockrunResult};

/// Blocking counterpart of [`crate::Controller`].
pub struct Controller {
    inner: crate::Controller,
    tokio_rt: Arc<TokioRuntime>,
}

impl Controller {
    pub fn connect(options: DockrunOptions) -> DockrunResult<Self> {
        let tokio_rt = new_tokio_runtime()?;
        let inner = tokio_rt.block_on(crate::Controller::connect(options))?;
        Ok(Self { inner, tokio_rt })
    }

    pub fn with_runtime(
        runtime: Arc<dyn RuntimeApi>,
        options: DockrunOptions,
    ) -> DockrunResult<Self> {
        Ok(Self {
            inner: crate::Controller::with_runtime(runtime, options),
            tokio_rt: new_tokio_runtime()?,
        })
    }

    /// The async controller this facade drives.
    pub fn as_async(&self) -> &crate::Controller {
        &self.inner
    }

    pub fn ensure_image(&self, image: &str) -> DockrunResult<()> {
        self.tokio_rt.block_on(self.inner.ensure_image(image))
    }

    pub fn create(&self, spec: &RunSpec) -> Result<ContainerHandle, LaunchError> {
        self.tokio_rt.block_on(self.inner.create(spec))
    }

    pub fn wait(&self, handle: &ContainerHandle) -> DockrunResult<i64> {
        self.tokio_rt.block_on(self.inner.wait(handle))
    }

    pub fn fetch_log(&self, handle: &ContainerHandle) -> DockrunResult<String> {
        self.tokio_rt.block_on(self.inner.fetch_log(handle))
    }

    pub fn fetch_log_with_timeout(
        &self,
        handle: &ContainerHandle,
        timeout: Duration,
    ) -> DockrunResult<String> {
        self.tokio_rt
            .block_on(self.inner.fetch_log_with_timeout(handle, timeout))
    }

    pub fn remove(&self, handle: &ContainerHandle) -> Option<DockrunError> {
        self.tokio_rt.block_on(self.inner.remove(handle))
    }

    pub fn run_and_clean(&self, spec: RunSpec) -> DockrunResult<RunResult> {
        self.tokio_rt.block_on(self.inner.run_and_clean(spec))
    }

    pub fn run_detached(&self, spec: RunSpec) -> Result<ContainerHandle, LaunchError> {
        self.tokio_rt.block_on(self.inner.run_detached(spec))
    }

    pub fn stop_container(&self, handle: &ContainerHandle) -> DockrunResult<String> {
        self.tokio_rt.block_on(self.inner.stop_container(handle))
    }

    pub fn exec<I, S>(&self, handle: &ContainerHandle, command: I) -> DockrunResult<ExecResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokio_rt.block_on(self.inner.exec(handle, command))
    }

    pub fn exec_with_deadline<I, S>(
        &self,
        handle: &ContainerHandle,
        command: I,
        deadline: Option<Duration>,
    ) -> DockrunResult<ExecResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokio_rt
            .block_on(self.inner.exec_with_deadline(handle, command, deadline))
    }

    pub fn list(&self) -> DockrunResult<Vec<String>> {
        self.tokio_rt.block_on(self.inner.list())
    }
}

fn new_tokio_runtime() -> DockrunResult<Arc<TokioRuntime>> {
    TokioRuntime::new()
        .map(Arc::new)
        .map_err(|e| DockrunError::Internal(format!("Failed to create async runtime: {}", e)))
}
