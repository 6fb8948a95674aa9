//! Shared test helpers for dockrun.
//!
//! [`FakeRuntime`] is an in-memory [`RuntimeApi`] that records every call and
//! can be scripted to fail, stall or report specific exit codes, so the
//! orchestration can be tested without a Docker daemon.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dockrun::{
    Controller, CreateRequest, DockrunOptions, ExecInspection, OutputChunk, OutputStream,
    RuntimeApi,
};
use dockrun_shared::{DockrunError, DockrunResult};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

/// A recorded runtime call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    PullImage(String),
    CreateContainer(CreateRequest),
    StartContainer(String),
    WaitContainer(String),
    ContainerLogs(String),
    ListContainers,
    RemoveContainer { container_id: String, force: bool },
    CreateExec { container_id: String, command: Vec<String> },
    StartExec(String),
    InspectExec(String),
}

/// Where to inject a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Failpoint {
    Pull,
    Create,
    Start,
    Wait,
    /// Opening the log stream fails.
    Logs,
    /// The log stream yields its chunks, then an error.
    LogStream,
    List,
    Remove,
    CreateExec,
    StartExec,
    /// The exec stream yields its chunks, then an error.
    ExecStream,
    InspectExec,
}

const INJECTED: &str = "injected failure";

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    failpoints: HashSet<Failpoint>,
    containers: Vec<String>,
    /// Started and not yet waited on.
    running: HashSet<String>,
    next_id: u64,

    exit_code: i64,
    wait_delay: Option<Duration>,

    log_chunks: Vec<OutputChunk>,
    log_stall: bool,

    exec_chunks: Vec<OutputChunk>,
    exec_delay: Option<Duration>,
    exec_exit_code: Option<i64>,
    exec_running_inspections: u32,
    inspections: u32,
}

/// Scriptable in-memory runtime.
///
/// Defaults: every call succeeds, containers exit 0 with an empty log and
/// execs exit 0 with no output.
pub struct FakeRuntime {
    state: Mutex<FakeState>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                exec_exit_code: Some(0),
                ..Default::default()
            }),
        }
    }

    // ========================================================================
    // SCRIPTING
    // ========================================================================

    pub fn fail_at(self, failpoint: Failpoint) -> Self {
        self.state.lock().failpoints.insert(failpoint);
        self
    }

    /// Exit code reported by `wait_container`.
    pub fn with_exit_code(self, code: i64) -> Self {
        self.state.lock().exit_code = code;
        self
    }

    /// Delay `wait_container` before it answers.
    pub fn with_wait_delay(self, delay: Duration) -> Self {
        self.state.lock().wait_delay = Some(delay);
        self
    }

    pub fn with_log(self, chunks: Vec<OutputChunk>) -> Self {
        self.state.lock().log_chunks = chunks;
        self
    }

    /// After its chunks, the log stream never ends.
    pub fn with_log_stall(self) -> Self {
        self.state.lock().log_stall = true;
        self
    }

    pub fn with_exec_output(self, chunks: Vec<OutputChunk>) -> Self {
        self.state.lock().exec_chunks = chunks;
        self
    }

    /// Delay the exec stream before its first chunk.
    pub fn with_exec_delay(self, delay: Duration) -> Self {
        self.state.lock().exec_delay = Some(delay);
        self
    }

    /// `None` means the runtime never reports an exit code.
    pub fn with_exec_exit_code(self, code: Option<i64>) -> Self {
        self.state.lock().exec_exit_code = code;
        self
    }

    /// The exec is reported as still running for the first `count`
    /// inspections.
    pub fn with_exec_running_for(self, count: u32) -> Self {
        self.state.lock().exec_running_inspections = count;
        self
    }

    /// Pretend containers already exist (for list and remove).
    pub fn with_containers<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .containers
            .extend(ids.into_iter().map(Into::into));
        self
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Ids passed to `remove_container`, in call order.
    pub fn removals(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::RemoveContainer { container_id, .. } => Some(container_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Requests passed to `create_container`, in call order.
    pub fn creates(&self) -> Vec<CreateRequest> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::CreateContainer(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|call| pred(call)).count()
    }

    /// Containers that exist (created and not removed).
    pub fn containers(&self) -> Vec<String> {
        self.state.lock().containers.clone()
    }

    /// Whether each `remove_container` call was forced, in call order.
    pub fn forced_removals(&self) -> Vec<bool> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::RemoveContainer { force, .. } => Some(*force),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }

    fn fails(&self, failpoint: Failpoint) -> bool {
        self.state.lock().failpoints.contains(&failpoint)
    }
}

/// A controller over a fresh [`FakeRuntime`], returning both.
pub fn controller(runtime: FakeRuntime) -> (Controller, Arc<FakeRuntime>) {
    controller_with(runtime, DockrunOptions::default())
}

pub fn controller_with(
    runtime: FakeRuntime,
    options: DockrunOptions,
) -> (Controller, Arc<FakeRuntime>) {
    let runtime = Arc::new(runtime);
    let controller = Controller::with_runtime(runtime.clone(), options);
    (controller, runtime)
}

fn delayed(
    delay: Option<Duration>,
    items: Vec<DockrunResult<OutputChunk>>,
    stall: bool,
) -> OutputStream {
    let head = match delay {
        Some(delay) => stream::once(tokio::time::sleep(delay))
            .filter_map(|()| async { None::<DockrunResult<OutputChunk>> })
            .boxed(),
        None => stream::empty().boxed(),
    };
    let body = head.chain(stream::iter(items));
    if stall {
        body.chain(stream::pending()).boxed()
    } else {
        body.boxed()
    }
}

#[async_trait]
impl RuntimeApi for FakeRuntime {
    async fn pull_image(&self, image: &str) -> DockrunResult<()> {
        self.record(Call::PullImage(image.to_string()));
        if self.fails(Failpoint::Pull) {
            return Err(DockrunError::Image {
                image: image.to_string(),
                message: INJECTED.to_string(),
            });
        }
        Ok(())
    }

    async fn create_container(&self, request: &CreateRequest) -> DockrunResult<String> {
        self.record(Call::CreateContainer(request.clone()));
        if self.fails(Failpoint::Create) {
            return Err(DockrunError::Create {
                image: request.image.clone(),
                message: INJECTED.to_string(),
            });
        }

        let mut state = self.state.lock();
        state.next_id += 1;
        let id = format!("fake-{:04}", state.next_id);
        state.containers.push(id.clone());
        Ok(id)
    }

    async fn start_container(&self, container_id: &str) -> DockrunResult<()> {
        self.record(Call::StartContainer(container_id.to_string()));
        if self.fails(Failpoint::Start) {
            return Err(DockrunError::Start {
                container_id: container_id.to_string(),
                message: INJECTED.to_string(),
            });
        }
        self.state.lock().running.insert(container_id.to_string());
        Ok(())
    }

    async fn wait_container(&self, container_id: &str) -> DockrunResult<i64> {
        self.record(Call::WaitContainer(container_id.to_string()));
        let delay = self.state.lock().wait_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fails(Failpoint::Wait) {
            return Err(DockrunError::Wait {
                container_id: container_id.to_string(),
                message: INJECTED.to_string(),
            });
        }
        let mut state = self.state.lock();
        state.running.remove(container_id);
        Ok(state.exit_code)
    }

    async fn container_logs(&self, container_id: &str) -> DockrunResult<OutputStream> {
        self.record(Call::ContainerLogs(container_id.to_string()));
        if self.fails(Failpoint::Logs) {
            return Err(DockrunError::LogFetch {
                container_id: container_id.to_string(),
                message: INJECTED.to_string(),
            });
        }

        let state = self.state.lock();
        let mut items: Vec<DockrunResult<OutputChunk>> =
            state.log_chunks.iter().cloned().map(Ok).collect();
        if state.failpoints.contains(&Failpoint::LogStream) {
            items.push(Err(DockrunError::Stream(INJECTED.to_string())));
        }
        Ok(delayed(None, items, state.log_stall))
    }

    async fn list_containers(&self) -> DockrunResult<Vec<String>> {
        self.record(Call::ListContainers);
        if self.fails(Failpoint::List) {
            return Err(DockrunError::List(INJECTED.to_string()));
        }
        Ok(self.containers())
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> DockrunResult<()> {
        self.record(Call::RemoveContainer {
            container_id: container_id.to_string(),
            force,
        });
        let mut state = self.state.lock();
        if state.failpoints.contains(&Failpoint::Remove) {
            return Err(DockrunError::Remove {
                container_id: container_id.to_string(),
                message: INJECTED.to_string(),
            });
        }
        if !force && state.running.contains(container_id) {
            return Err(DockrunError::Remove {
                container_id: container_id.to_string(),
                message: "cannot remove a running container, stop it or force removal"
                    .to_string(),
            });
        }

        match state.containers.iter().position(|id| id == container_id) {
            Some(index) => {
                state.containers.remove(index);
                state.running.remove(container_id);
                Ok(())
            }
            None => Err(DockrunError::Remove {
                container_id: container_id.to_string(),
                message: format!("No such container: {}", container_id),
            }),
        }
    }

    async fn create_exec(&self, container_id: &str, command: &[String]) -> DockrunResult<String> {
        self.record(Call::CreateExec {
            container_id: container_id.to_string(),
            command: command.to_vec(),
        });
        if self.fails(Failpoint::CreateExec) {
            return Err(DockrunError::Exec {
                target: container_id.to_string(),
                message: INJECTED.to_string(),
            });
        }

        let mut state = self.state.lock();
        state.next_id += 1;
        Ok(format!("exec-{:04}", state.next_id))
    }

    async fn start_exec(&self, exec_id: &str) -> DockrunResult<OutputStream> {
        self.record(Call::StartExec(exec_id.to_string()));
        if self.fails(Failpoint::StartExec) {
            return Err(DockrunError::Exec {
                target: exec_id.to_string(),
                message: INJECTED.to_string(),
            });
        }

        let state = self.state.lock();
        let mut items: Vec<DockrunResult<OutputChunk>> =
            state.exec_chunks.iter().cloned().map(Ok).collect();
        if state.failpoints.contains(&Failpoint::ExecStream) {
            items.push(Err(DockrunError::Stream(INJECTED.to_string())));
        }
        Ok(delayed(state.exec_delay, items, false))
    }

    async fn inspect_exec(&self, exec_id: &str) -> DockrunResult<ExecInspection> {
        self.record(Call::InspectExec(exec_id.to_string()));
        if self.fails(Failpoint::InspectExec) {
            return Err(DockrunError::Exec {
                target: exec_id.to_string(),
                message: INJECTED.to_string(),
            });
        }

        let mut state = self.state.lock();
        state.inspections += 1;
        if state.inspections <= state.exec_running_inspections {
            return Ok(ExecInspection {
                running: true,
                exit_code: None,
            });
        }
        Ok(ExecInspection {
            running: false,
            exit_code: state.exec_exit_code,
        })
    }
}
