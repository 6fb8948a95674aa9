//! Container inventory.
//!
//! Lists the containers the runtime reports as running and logs them, one id
//! per line. The one-shot and detached runs call this right after start, so
//! the log shows the new container among its neighbours.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> dockrun::DockrunResult<()> {
//! use dockrun::{Controller, DockrunOptions};
//!
//! let controller = Controller::connect(DockrunOptions::default()).await?;
//! for id in controller.list().await? {
//!     println!("{}", id);
//! }
//! # Ok(())
//! # }
//! ```

pub(crate) mod inventory;
