mod activation_id;
pub use activation_id::ActivationId;

mod invocation_status;
pub use invocation_status::InvocationStatus;

mod run_event;
pub use run_event::RunEvent;

/// Position of one invocation slot inside a batch, in `[0, numActions)`.
///
/// The index survives retries: every activation triggered for the same slot carries the same index.
pub type LogicalIndex = usize;

/// Timeout value in milliseconds.
pub type TimeoutMs = u64;
