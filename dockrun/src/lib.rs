//! dockrun - one-shot container runs and exec sessions over the Docker Engine API
//!
//! The [`Controller`] drives a container through create → start → wait →
//! log-fetch → remove, and runs secondary commands inside running containers
//! while splitting their output into separate stdout/stderr buffers.
//!
//! ```rust,no_run
//! # async fn example() -> dockrun::DockrunResult<()> {
//! use dockrun::{Controller, DockrunOptions, RunSpec};
//!
//! let controller = Controller::connect(DockrunOptions::default()).await?;
//! controller.ensure_image("alpine").await?;
//!
//! let result = controller
//!     .run_and_clean(RunSpec::new("alpine").args(["echo", "hello world"]))
//!     .await?;
//! assert_eq!(result.exit_code, 0);
//! print!("{}", result.combined_log());
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod container;
pub mod management;
pub mod portal;
pub mod runtime;
pub mod util;
pub mod volumes;

pub use container::{ContainerState, ExecResult, LaunchError, LogOutcome, RunResult};
pub use portal::{
    CreateRequest, DockerClient, ExecInspection, OutputChunk, OutputStream, RuntimeApi,
};
pub use runtime::Controller;
pub use runtime::options::DockrunOptions;
pub use runtime::types::{ContainerHandle, RunSpec};
pub use util::init_logging;
pub use volumes::{BindMount, VolumeMount};

pub use dockrun_shared::{DockrunError, DockrunResult, Endpoint};
