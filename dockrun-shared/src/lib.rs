//! dockrun shared - types used by both the library and its callers
//!
//! This crate contains the error taxonomy, the runtime endpoint type
//! and the constants shared by the `dockrun` library and the CLI.

pub mod constants;
pub mod errors;
pub mod transport;

pub use errors::{DockrunError, DockrunResult};
pub use transport::Endpoint;
