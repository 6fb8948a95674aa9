//! The orchestration entry point.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::container::{self, ExecResult, LaunchError, RunResult};
use crate::management::inventory;
use crate::portal::{DockerClient, RuntimeApi};
use crate::runtime::options::DockrunOptions;
use crate::runtime::types::{ContainerHandle, RunSpec};
use dockrun_shared::errors::{DockrunError, DockrunResult};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Drives containers through their lifecycle against a runtime.
///
/// **Cloning**: cheap, all clones share the same runtime client.
///
/// **Concurrency**: operations hold no locks and may run concurrently on
/// different containers.
#[derive(Clone)]
pub struct Controller {
    runtime: Arc<dyn RuntimeApi>,
    options: DockrunOptions,
}

impl Controller {
    /// Connect to the Docker daemon at `options.endpoint`.
    ///
    /// # Errors
    ///
    /// `DockrunError::Connection` if the daemon is unreachable.
    pub async fn connect(options: DockrunOptions) -> DockrunResult<Self> {
        let client =
            DockerClient::connect(options.endpoint.clone(), options.api_timeout_secs).await?;
        Ok(Self::with_runtime(Arc::new(client), options))
    }

    /// Use an already-built runtime client.
    pub fn with_runtime(runtime: Arc<dyn RuntimeApi>, options: DockrunOptions) -> Self {
        Self { runtime, options }
    }

    /// Connect, hand the controller to `f`, and release the client when `f`
    /// completes, successfully or not.
    pub async fn scoped<F, Fut, T>(options: DockrunOptions, f: F) -> DockrunResult<T>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = DockrunResult<T>>,
    {
        let controller = Self::connect(options).await?;
        let result = f(controller).await;
        tracing::debug!(ok = result.is_ok(), "Scoped controller released");
        result
    }

    pub fn options(&self) -> &DockrunOptions {
        &self.options
    }

    pub(crate) fn runtime(&self) -> &Arc<dyn RuntimeApi> {
        &self.runtime
    }

    // ========================================================================
    // IMAGES
    // ========================================================================

    /// Pull `image` so later creates find it locally.
    pub async fn ensure_image(&self, image: &str) -> DockrunResult<()> {
        container::ensure_image(self, image).await
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Create and start a container with a pseudo-terminal unless `RunSpec::tty`
    /// says otherwise.
    ///
    /// If start fails the error still carries the created handle.
    pub async fn create(&self, spec: &RunSpec) -> Result<ContainerHandle, LaunchError> {
        container::create(self, spec, true).await
    }

    /// Block until the container exits; returns its exit code.
    pub async fn wait(&self, handle: &ContainerHandle) -> DockrunResult<i64> {
        container::wait(self, handle).await
    }

    /// Combined stdout+stderr, bounded by the configured log timeout.
    pub async fn fetch_log(&self, handle: &ContainerHandle) -> DockrunResult<String> {
        container::fetch_log(self, handle, self.options.log_timeout()).await
    }

    pub async fn fetch_log_with_timeout(
        &self,
        handle: &ContainerHandle,
        timeout: Duration,
    ) -> DockrunResult<String> {
        container::fetch_log(self, handle, timeout).await
    }

    /// Best-effort removal of an exited container. The runtime refuses a
    /// running one. The failure, if any, is logged and returned.
    pub async fn remove(&self, handle: &ContainerHandle) -> Option<DockrunError> {
        container::remove(self, handle).await
    }

    /// Run a container to completion, collect its log and remove it.
    pub async fn run_and_clean(&self, spec: RunSpec) -> DockrunResult<RunResult> {
        container::run_and_clean(self, spec).await
    }

    /// Start a container and leave it running.
    pub async fn run_detached(&self, spec: RunSpec) -> Result<ContainerHandle, LaunchError> {
        container::run_detached(self, spec).await
    }

    /// Fetch the log of a container, then force-remove it.
    pub async fn stop_container(&self, handle: &ContainerHandle) -> DockrunResult<String> {
        container::stop_container(self, handle).await
    }

    // ========================================================================
    // EXEC
    // ========================================================================

    /// Run `command` inside a running container with the configured default
    /// deadline.
    pub async fn exec<I, S>(
        &self,
        handle: &ContainerHandle,
        command: I,
    ) -> DockrunResult<ExecResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exec_with_deadline(handle, command, self.options.exec_timeout())
            .await
    }

    /// Run `command` inside a running container; `None` waits for the output
    /// stream to end however long that takes.
    pub async fn exec_with_deadline<I, S>(
        &self,
        handle: &ContainerHandle,
        command: I,
        deadline: Option<Duration>,
    ) -> DockrunResult<ExecResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command: Vec<String> = command.into_iter().map(Into::into).collect();
        container::exec(self, handle, &command, deadline).await
    }

    // ========================================================================
    // INVENTORY
    // ========================================================================

    /// Ids of running containers, each also logged.
    pub async fn list(&self) -> DockrunResult<Vec<String>> {
        inventory::report_running(self.runtime.as_ref()).await
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
