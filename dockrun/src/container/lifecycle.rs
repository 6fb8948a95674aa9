//! Container lifecycle: create/start, wait, log fetch and removal.
//!
//! [`run_and_clean`] composes these into a single run. Once a container has
//! been created it is owned by a [`ContainerGuard`], which attempts removal
//! exactly once on every exit path, including a dropped future.

use super::{ContainerState, LaunchError, LogOutcome, RunResult};
use crate::management::inventory;
use crate::portal::{CreateRequest, RuntimeApi};
use crate::runtime::Controller;
use crate::runtime::types::{ContainerHandle, RunSpec};
use crate::util::split_image_reference;
use crate::volumes;
use dockrun_shared::errors::{DockrunError, DockrunResult};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// IMAGES
// ============================================================================

pub(crate) async fn ensure_image(controller: &Controller, image: &str) -> DockrunResult<()> {
    if image.trim().is_empty() {
        return Err(DockrunError::InvalidArgument(
            "image reference cannot be empty".to_string(),
        ));
    }

    let (name, tag) = split_image_reference(image);
    tracing::info!(image = %name, tag = %tag, "Pulling image");
    controller.runtime().pull_image(image).await?;
    tracing::info!(image = %name, tag = %tag, "Image ready");
    Ok(())
}

// ============================================================================
// CREATE / START
// ============================================================================

/// Create and start a container.
///
/// `default_tty` applies when `RunSpec::tty` leaves pseudo-terminal allocation
/// unset.
pub(crate) async fn create(
    controller: &Controller,
    spec: &RunSpec,
    default_tty: bool,
) -> Result<ContainerHandle, LaunchError> {
    if spec.image.trim().is_empty() {
        return Err(LaunchError::before_create(DockrunError::Create {
            image: spec.image.clone(),
            message: "image reference cannot be empty".to_string(),
        }));
    }

    let request = CreateRequest {
        image: spec.image.clone(),
        command: spec.command.clone(),
        tty: spec.tty.unwrap_or(default_tty),
        mounts: volumes::resolve(&spec.mounts),
    };

    tracing::debug!(
        image = %request.image,
        command = ?request.command,
        mounts = request.mounts.len(),
        tty = request.tty,
        "Creating container"
    );

    let runtime = controller.runtime();
    let handle = runtime
        .create_container(&request)
        .await
        .map(ContainerHandle::new)
        .map_err(LaunchError::before_create)?;

    tracing::debug!(container_id = %handle, "Container created, starting");

    if let Err(error) = runtime.start_container(handle.id()).await {
        tracing::error!(container_id = %handle, error = %error, "Failed to start container");
        return Err(LaunchError::after_create(handle, error));
    }

    tracing::info!(container_id = %handle, image = %spec.image, "Container started");
    Ok(handle)
}

// ============================================================================
// WAIT / LOGS / REMOVE
// ============================================================================

pub(crate) async fn wait(controller: &Controller, handle: &ContainerHandle) -> DockrunResult<i64> {
    tracing::debug!(container_id = %handle, "Waiting for container to exit");
    let exit_code = controller.runtime().wait_container(handle.id()).await?;
    tracing::info!(container_id = %handle, exit_code, "Container exited");
    Ok(exit_code)
}

/// Read the combined log, bounded by `timeout`. Any failure is an error.
pub(crate) async fn fetch_log(
    controller: &Controller,
    handle: &ContainerHandle,
    timeout: Duration,
) -> DockrunResult<String> {
    match collect_log(controller.runtime().as_ref(), handle, timeout).await {
        (log, None) => Ok(log),
        (_, Some(cause)) => Err(cause),
    }
}

/// Drain the log stream into a buffer that outlives the deadline, so a
/// failed read still returns whatever arrived before it.
async fn collect_log(
    runtime: &dyn RuntimeApi,
    handle: &ContainerHandle,
    timeout: Duration,
) -> (String, Option<DockrunError>) {
    let mut stream = match runtime.container_logs(handle.id()).await {
        Ok(stream) => stream,
        Err(e) => return (String::new(), Some(e)),
    };

    let mut buffer = Vec::new();
    let read = tokio::time::timeout(timeout, async {
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(chunk?.bytes());
        }
        Ok::<(), DockrunError>(())
    })
    .await;

    let log = String::from_utf8_lossy(&buffer).into_owned();
    let cause = match read {
        Ok(Ok(())) => None,
        Ok(Err(e @ DockrunError::LogFetch { .. })) => Some(e),
        Ok(Err(e)) => Some(DockrunError::LogFetch {
            container_id: handle.id().to_string(),
            message: e.to_string(),
        }),
        Err(_) => Some(DockrunError::Timeout {
            operation: "container_logs",
            after: timeout,
        }),
    };

    tracing::trace!(
        container_id = %handle,
        bytes = buffer.len(),
        complete = cause.is_none(),
        "Log read"
    );
    (log, cause)
}

/// Remove a stopped container. Failure is logged and returned, never raised.
pub(crate) async fn remove(
    controller: &Controller,
    handle: &ContainerHandle,
) -> Option<DockrunError> {
    remove_handle(controller.runtime().as_ref(), handle, false).await
}

async fn remove_handle(
    runtime: &dyn RuntimeApi,
    handle: &ContainerHandle,
    force: bool,
) -> Option<DockrunError> {
    match runtime.remove_container(handle.id(), force).await {
        Ok(()) => {
            tracing::info!(container_id = %handle, force, "Container removed");
            None
        }
        Err(e) => {
            tracing::warn!(container_id = %handle, error = %e, "Failed to remove container");
            Some(e)
        }
    }
}

// ============================================================================
// SCOPED REMOVAL
// ============================================================================

/// Owns a created container until it is released.
///
/// [`release`](Self::release) performs the removal. If the guard is dropped
/// without being released (the owning future was cancelled), removal is
/// spawned onto the current tokio runtime instead.
pub(crate) struct ContainerGuard {
    runtime: Arc<dyn RuntimeApi>,
    handle: ContainerHandle,
    state: ContainerState,
    released: bool,
}

impl ContainerGuard {
    pub(crate) fn new(
        runtime: Arc<dyn RuntimeApi>,
        handle: ContainerHandle,
        state: ContainerState,
    ) -> Self {
        Self {
            runtime,
            handle,
            state,
            released: false,
        }
    }

    pub(crate) fn handle(&self) -> &ContainerHandle {
        &self.handle
    }

    pub(crate) fn state(&self) -> ContainerState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: ContainerState) {
        if self.state.can_transition_to(next) {
            tracing::trace!(
                container_id = %self.handle,
                from = %self.state,
                to = %next,
                "State transition"
            );
            self.state = next;
        } else {
            tracing::warn!(
                container_id = %self.handle,
                from = %self.state,
                to = %next,
                "Ignoring invalid state transition"
            );
        }
    }

    /// A container that has not been seen to exit may still be running, and
    /// the runtime only removes a running container when forced.
    fn needs_force(&self) -> bool {
        self.state != ContainerState::Exited
    }

    /// Remove the container, or keep it when `keep` is set.
    pub(crate) async fn release(mut self, keep: bool) -> Option<DockrunError> {
        self.released = true;

        if keep {
            tracing::warn!(
                container_id = %self.handle,
                state = %self.state,
                "Keeping container after failed run"
            );
            return None;
        }

        let force = self.needs_force();
        let result = remove_handle(self.runtime.as_ref(), &self.handle, force).await;
        if result.is_none() {
            self.advance(ContainerState::Removed);
        }
        result
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let runtime = Arc::clone(&self.runtime);
        let handle = self.handle.clone();
        let force = self.needs_force();
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                tracing::warn!(
                    container_id = %handle,
                    state = %self.state,
                    "Run abandoned, removing container in background"
                );
                rt.spawn(async move {
                    let _ = remove_handle(runtime.as_ref(), &handle, force).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    container_id = %handle,
                    "Run abandoned outside a tokio runtime, container left behind"
                );
            }
        }
    }
}

// ============================================================================
// COMPOSITES
// ============================================================================

/// create → start → list → wait → log → remove.
///
/// Removal is attempted once the container exists, whatever happens after.
/// A log failure degrades the result; a removal failure is only logged.
pub(crate) async fn run_and_clean(
    controller: &Controller,
    spec: RunSpec,
) -> DockrunResult<RunResult> {
    let keep_on_failure = controller.options().keep_on_failure;

    let handle = match create(controller, &spec, true).await {
        Ok(handle) => handle,
        Err(LaunchError {
            handle: Some(handle),
            error,
        }) => {
            let guard = ContainerGuard::new(
                Arc::clone(controller.runtime()),
                handle,
                ContainerState::Created,
            );
            guard.release(keep_on_failure).await;
            return Err(error);
        }
        Err(LaunchError { handle: None, error }) => return Err(error),
    };

    let mut guard = ContainerGuard::new(
        Arc::clone(controller.runtime()),
        handle,
        ContainerState::Running,
    );
    let outcome = drive(controller, &mut guard).await;
    guard.release(outcome.is_err() && keep_on_failure).await;
    outcome
}

async fn drive(controller: &Controller, guard: &mut ContainerGuard) -> DockrunResult<RunResult> {
    inventory::report_running(controller.runtime().as_ref()).await?;

    let exit_code = wait(controller, guard.handle()).await?;
    guard.advance(ContainerState::Exited);

    let log = match collect_log(
        controller.runtime().as_ref(),
        guard.handle(),
        controller.options().log_timeout(),
    )
    .await
    {
        (text, None) => LogOutcome::Complete(text),
        (partial, Some(cause)) => {
            tracing::warn!(
                container_id = %guard.handle(),
                error = %cause,
                partial_bytes = partial.len(),
                "Container log incomplete"
            );
            LogOutcome::Degraded { partial, cause }
        }
    };

    tracing::debug!(container_id = %guard.handle(), state = %guard.state(), "Run finished");
    Ok(RunResult { exit_code, log })
}

/// create → start → list, without pseudo-terminal by default. The container
/// keeps running and is left to the caller.
pub(crate) async fn run_detached(
    controller: &Controller,
    spec: RunSpec,
) -> Result<ContainerHandle, LaunchError> {
    let handle = create(controller, &spec, false).await?;

    if let Err(error) = inventory::report_running(controller.runtime().as_ref()).await {
        return Err(LaunchError::after_create(handle, error));
    }

    Ok(handle)
}

/// Fetch the log of a container, then force-remove it, stopping it if it is
/// still running.
///
/// A log failure is logged and yields whatever was read. A removal failure is
/// returned.
pub(crate) async fn stop_container(
    controller: &Controller,
    handle: &ContainerHandle,
) -> DockrunResult<String> {
    let (log, cause) = collect_log(
        controller.runtime().as_ref(),
        handle,
        controller.options().log_timeout(),
    )
    .await;

    if let Some(cause) = cause {
        tracing::warn!(container_id = %handle, error = %cause, "Container log incomplete");
    }

    match remove_handle(controller.runtime().as_ref(), handle, true).await {
        None => Ok(log),
        Some(error) => Err(error),
    }
}
