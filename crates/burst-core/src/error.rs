use burst_model::{ActivationId, LogicalIndex, ModelError};
use thiserror::Error;

use crate::{platform::PlatformError, state::IndexConflict, workload::ReduceError};

pub type CoreResult<T> = Result<T, CoreError>;

/// Fatal outcomes of a batch.
///
/// Transient platform failures never show up here unless a logical index exhausts its attempts.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ModelError),

    #[error("registration of action '{action}' failed: {source}")]
    Registration {
        action: String,
        #[source]
        source: PlatformError,
    },

    #[error("invocation of logical index {index} rejected with HTTP {status}: {body}")]
    InvocationRejected {
        index: LogicalIndex,
        status: u16,
        body: String,
    },

    #[error("activation {activation} (logical index {index}) ended with status '{status}'")]
    UnrecognizedStatus {
        index: LogicalIndex,
        activation: ActivationId,
        status: String,
    },

    #[error("logical index {index} failed {attempts} attempts with transient platform errors, last: {reason}")]
    RetriesExhausted {
        index: LogicalIndex,
        attempts: u32,
        reason: String,
    },

    #[error("activation {activation} (logical index {index}) not finished after {polls} polls")]
    PollTimeout {
        index: LogicalIndex,
        activation: ActivationId,
        polls: u32,
    },

    #[error("platform request for logical index {index} failed: {source}")]
    Transport {
        index: LogicalIndex,
        #[source]
        source: PlatformError,
    },

    #[error("activation bookkeeping violated: {0}")]
    Conflict(#[from] IndexConflict),

    #[error("invocation task panicked: {0}")]
    TaskPanicked(String),

    #[error("logical index {0} produced more than one successful result")]
    DuplicateResult(LogicalIndex),

    #[error("aggregate incomplete: {completed} of {total} results")]
    Incomplete { completed: usize, total: usize },

    #[error("reduction failed: {0}")]
    Reduction(#[source] ReduceError),

    #[error("run cancelled")]
    Cancelled,
}
