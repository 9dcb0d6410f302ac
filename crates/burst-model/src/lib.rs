//! Plain data shared by the burst engine, platform adapters and the CLI.
//!
//! Nothing in here performs I/O: these are the configuration structures a
//! run is described with, the identifiers the platform hands back, and the
//! events the engine publishes while a batch is in flight.

mod domain;
pub use domain::*;

mod kind;
pub use kind::{ActionExec, DEFAULT_EXEC_KIND};

mod spec;
pub use spec::*;

mod error;
pub use error::ModelError;
