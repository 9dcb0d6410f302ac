use serde::{Deserialize, Serialize};

/// Lifecycle state of one invocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvocationStatus {
    /// Invoke request is being sent.
    Triggering,
    /// Platform accepted the invocation, no poll issued yet.
    Pending,
    /// Result is being polled.
    Polling,
    /// Platform reported a successful result.
    Succeeded,
    /// Platform reported an internal error; the slot may be re-invoked.
    FailedTransient,
    /// Unrecoverable failure; aborts the whole batch.
    FailedFatal,
    /// Stopped because the batch was aborted.
    Cancelled,
}

impl InvocationStatus {
    /// Returns `true` if the attempt won't transition further.
    ///
    /// `FailedTransient` is terminal for the attempt: a retry is a new attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvocationStatus::Succeeded
                | InvocationStatus::FailedTransient
                | InvocationStatus::FailedFatal
                | InvocationStatus::Cancelled
        )
    }

    /// Returns `true` while the attempt owns a live activation slot.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            InvocationStatus::Triggering | InvocationStatus::Pending | InvocationStatus::Polling
        )
    }
}
