//! Host-side portal to the container runtime service.
//!
//! [`RuntimeApi`] is the seam between orchestration and transport: the
//! orchestrator only ever calls these methods, and [`DockerClient`] is the
//! implementation that speaks the Docker Engine API. Tests substitute an
//! in-memory implementation.

pub mod connection;
pub mod docker;

pub use docker::DockerClient;

use crate::volumes::BindMount;
use async_trait::async_trait;
use dockrun_shared::errors::DockrunResult;
use futures::stream::BoxStream;

/// Container creation parameters, already resolved for the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRequest {
    pub image: String,
    /// Empty means the image's default command.
    pub command: Vec<String>,
    /// Allocate a pseudo-terminal, so stdout and stderr arrive as one stream.
    pub tty: bool,
    pub mounts: Vec<BindMount>,
}

/// One frame of runtime output, tagged by the stream it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputChunk {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    /// Raw terminal output of a tty-attached process (not separable).
    Console(Vec<u8>),
}

impl OutputChunk {
    pub fn bytes(&self) -> &[u8] {
        match self {
            OutputChunk::Stdout(data) | OutputChunk::Stderr(data) | OutputChunk::Console(data) => {
                data
            }
        }
    }
}

/// Output stream from the runtime. Ends cleanly on `None`.
pub type OutputStream = BoxStream<'static, DockrunResult<OutputChunk>>;

/// Exec context status as reported by the runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecInspection {
    pub running: bool,
    pub exit_code: Option<i64>,
}

/// Container runtime operations consumed by the orchestrator.
///
/// Implementations must tolerate concurrent calls: a log or exec stream may
/// be read while another call is in flight.
#[async_trait]
pub trait RuntimeApi: Send + Sync {
    /// Pull an image, draining the pull progress.
    async fn pull_image(&self, image: &str) -> DockrunResult<()>;

    /// Create a container and return its id.
    async fn create_container(&self, request: &CreateRequest) -> DockrunResult<String>;

    async fn start_container(&self, container_id: &str) -> DockrunResult<()>;

    /// Block until the container exits and return its status code.
    ///
    /// A non-zero status is a result, not an error.
    async fn wait_container(&self, container_id: &str) -> DockrunResult<i64>;

    /// Open the container's stdout+stderr log.
    async fn container_logs(&self, container_id: &str) -> DockrunResult<OutputStream>;

    /// Ids of running containers, in runtime order.
    async fn list_containers(&self) -> DockrunResult<Vec<String>>;

    /// Remove a container. Without `force` the runtime refuses a running one.
    async fn remove_container(&self, container_id: &str, force: bool) -> DockrunResult<()>;

    /// Create an exec context attached to stdout and stderr; returns its id.
    async fn create_exec(&self, container_id: &str, command: &[String]) -> DockrunResult<String>;

    /// Start an exec context and attach to its multiplexed output.
    async fn start_exec(&self, exec_id: &str) -> DockrunResult<OutputStream>;

    async fn inspect_exec(&self, exec_id: &str) -> DockrunResult<ExecInspection>;
}
