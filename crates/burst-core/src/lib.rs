//! Dispatch, poll, retry and aggregation engine for bulk remote invocations.
//!
//! A batch runs through the following pieces:
//! - [`WorkRegistrar`]: stores the work unit on the platform (create-or-overwrite).
//! - [`Dispatcher`]: fans out one [`InvocationTask`] per logical index, owns the [`ActivationIndex`], re-invokes on transient failures.
//! - [`ResultAggregator`]: barrier over exactly `N` successful results, feeds the [`Workload`] reduction.
//! - [`BatchRunner`]: composes the above and measures the run.
//!
//! The remote side is abstracted by the [`Platform`] trait; progress is published to [`Subscribe`] implementations.

pub mod error;
pub use error::{CoreError, CoreResult};

pub mod platform;
pub use platform::{ActivationPoll, InvokeOutcome, Platform, PlatformError};

pub mod workload;
pub use workload::{ReduceError, Workload};

pub mod registrar;
pub use registrar::WorkRegistrar;

pub mod state;
pub use state::{ActivationIndex, IndexConflict};

pub mod task;
pub use task::{AttemptOutcome, AttemptReport, InvocationTask};

pub mod aggregate;
pub use aggregate::{Progress, ResultAggregator};

pub mod dispatcher;
pub use dispatcher::Dispatcher;

pub mod subscriber;
pub use subscriber::{Subscribe, Subscribers};

pub mod batch;
pub use batch::{BatchRunner, RunReport};

#[cfg(test)]
pub(crate) mod testing;
