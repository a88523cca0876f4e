//! Shared runtime infrastructure for the media decode core.
//!
//! Currently this is the logging layer: every crate in the workspace
//! emits events through `tracing`, and the host process calls
//! [`logging::init_logging`] exactly once to install the subscriber.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
