pub mod constants;
pub mod options;
pub mod types;

mod core;
pub use core::Controller;
