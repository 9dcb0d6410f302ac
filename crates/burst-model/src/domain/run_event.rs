use crate::{ActivationId, LogicalIndex};

/// Progress notification published while a batch runs.
///
/// Events are emitted from the dispatcher loop only, so subscribers observe them in a single total order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Work unit stored on the platform.
    Registered { action: String },
    /// Platform accepted an invocation for `index`.
    Triggered {
        index: LogicalIndex,
        activation: ActivationId,
        attempt: u32,
    },
    /// One logical index reached its successful terminal state.
    Completed {
        index: LogicalIndex,
        activation: ActivationId,
        completed: usize,
        total: usize,
    },
    /// A transient platform failure; `index` will be invoked again after `delay_ms`.
    Retrying {
        index: LogicalIndex,
        activation: ActivationId,
        attempt: u32,
        delay_ms: u64,
        reason: String,
    },
    /// The batch stopped on a fatal failure.
    Aborted { reason: String },
    /// All results were reduced.
    Finished { total: usize, elapsed_ms: u64 },
}

impl RunEvent {
    /// Short symbolic name, used for logging and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::Registered { .. } => "registered",
            RunEvent::Triggered { .. } => "triggered",
            RunEvent::Completed { .. } => "completed",
            RunEvent::Retrying { .. } => "retrying",
            RunEvent::Aborted { .. } => "aborted",
            RunEvent::Finished { .. } => "finished",
        }
    }
}
