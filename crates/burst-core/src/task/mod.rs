use std::{sync::Arc, time::Duration};

use burst_model::{ActivationId, DispatchPolicy, InvocationStatus, LogicalIndex};
use serde_json::Value;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::{
    error::CoreError,
    platform::{ActivationPoll, InvokeOutcome, Platform},
};

/// Notification sent by a running attempt to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TaskEvent {
    /// Platform accepted the invocation (Triggering -> Pending).
    Triggered {
        index: LogicalIndex,
        activation: ActivationId,
        attempt: u32,
    },
}

/// Terminal state of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Succeeded {
        activation: ActivationId,
        result: Value,
    },
    Transient {
        activation: ActivationId,
        reason: String,
    },
    Fatal(CoreError),
    Cancelled,
}

impl AttemptOutcome {
    pub fn status(&self) -> InvocationStatus {
        match self {
            AttemptOutcome::Succeeded { .. } => InvocationStatus::Succeeded,
            AttemptOutcome::Transient { .. } => InvocationStatus::FailedTransient,
            AttemptOutcome::Fatal(_) => InvocationStatus::FailedFatal,
            AttemptOutcome::Cancelled => InvocationStatus::Cancelled,
        }
    }
}

/// What an attempt hands back to the dispatcher when it ends.
#[derive(Debug)]
pub struct AttemptReport {
    pub index: LogicalIndex,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
}

/// One invocation attempt of a logical index.
///
/// Lifecycle: (backoff) -> Triggering -> Pending -> Polling* -> terminal.
/// A transient failure ends the attempt; re-invocation is a new task created by the dispatcher.
pub struct InvocationTask {
    index: LogicalIndex,
    attempt: u32,
    action: Arc<str>,
    args: Value,
    delay: Duration,
    policy: DispatchPolicy,
    platform: Arc<dyn Platform>,
    permits: Arc<Semaphore>,
    events: mpsc::UnboundedSender<TaskEvent>,
    cancel: CancellationToken,
}

impl InvocationTask {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: LogicalIndex,
        attempt: u32,
        action: Arc<str>,
        args: Value,
        policy: DispatchPolicy,
        platform: Arc<dyn Platform>,
        permits: Arc<Semaphore>,
        events: mpsc::UnboundedSender<TaskEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            index,
            attempt,
            action,
            args,
            delay: Duration::ZERO,
            policy,
            platform,
            permits,
            events,
            cancel,
        }
    }

    /// Wait `delay` before triggering (used for retries).
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Drive the attempt to a terminal state.
    ///
    /// Every suspension point observes the cancellation token; a cancelled attempt is dropped mid-request.
    #[instrument(level = "debug", skip(self), fields(index = self.index, attempt = self.attempt))]
    pub async fn run(self) -> AttemptReport {
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => AttemptOutcome::Cancelled,
            outcome = self.drive() => outcome,
        };
        trace!(status = ?outcome.status(), "attempt finished");

        AttemptReport {
            index: self.index,
            attempt: self.attempt,
            outcome,
        }
    }

    async fn drive(&self) -> AttemptOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let Ok(_permit) = self.permits.acquire().await else {
            return AttemptOutcome::Cancelled;
        };

        let activation = match self.trigger().await {
            Ok(activation) => activation,
            Err(e) => return AttemptOutcome::Fatal(e),
        };
        // The receiver only disappears once the batch is over.
        let _ = self.events.send(TaskEvent::Triggered {
            index: self.index,
            activation: activation.clone(),
            attempt: self.attempt,
        });

        self.poll(activation).await
    }

    async fn trigger(&self) -> Result<ActivationId, CoreError> {
        trace!(action = %self.action, "triggering");
        match self.platform.invoke(&self.action, &self.args).await {
            Ok(InvokeOutcome::Accepted(activation)) => {
                debug!(%activation, "invocation accepted");
                Ok(activation)
            }
            Ok(InvokeOutcome::Rejected { status, body }) => Err(CoreError::InvocationRejected {
                index: self.index,
                status,
                body,
            }),
            Err(source) => Err(CoreError::Transport {
                index: self.index,
                source,
            }),
        }
    }

    async fn poll(&self, activation: ActivationId) -> AttemptOutcome {
        let mut polls = 0u32;
        loop {
            polls += 1;
            let answer = match self.platform.activation_result(&activation).await {
                Ok(answer) => answer,
                Err(source) => {
                    return AttemptOutcome::Fatal(CoreError::Transport {
                        index: self.index,
                        source,
                    });
                }
            };

            match answer {
                ActivationPoll::NotReady => {
                    if polls >= self.policy.max_polls {
                        return AttemptOutcome::Fatal(CoreError::PollTimeout {
                            index: self.index,
                            activation,
                            polls,
                        });
                    }
                    trace!(%activation, polls, "not ready, polling again");
                    tokio::time::sleep(self.policy.poll_interval()).await;
                }
                ActivationPoll::Success(result) => {
                    return AttemptOutcome::Succeeded { activation, result };
                }
                ActivationPoll::TransientInternalError(reason) => {
                    return AttemptOutcome::Transient { activation, reason };
                }
                ActivationPoll::OtherError { status } => {
                    return AttemptOutcome::Fatal(CoreError::UnrecognizedStatus {
                        index: self.index,
                        activation,
                        status,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        platform::PlatformError,
        testing::{Script, ScriptedPlatform},
    };
    use serde_json::json;
    use tokio::time::Instant;

    fn policy() -> DispatchPolicy {
        DispatchPolicy {
            poll_interval_ms: 5_000,
            max_polls: 10,
            ..DispatchPolicy::default()
        }
    }

    fn task(
        platform: Arc<ScriptedPlatform>,
        index: LogicalIndex,
        policy: DispatchPolicy,
    ) -> (InvocationTask, mpsc::UnboundedReceiver<TaskEvent>, CancellationToken) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = InvocationTask::new(
            index,
            1,
            Arc::from("act"),
            json!({ "index": index }),
            policy,
            platform,
            Arc::new(Semaphore::new(4)),
            tx,
            cancel.clone(),
        );
        (task, rx, cancel)
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::succeed(json!(42)));
        let (task, mut rx, _) = task(platform.clone(), 0, policy());

        let report = task.run().await;
        assert!(matches!(
            report.outcome,
            AttemptOutcome::Succeeded { ref result, .. } if *result == json!(42)
        ));
        assert!(matches!(rx.try_recv(), Ok(TaskEvent::Triggered { index: 0, attempt: 1, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn not_ready_k_times_waits_k_poll_intervals() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::not_ready_then(3, json!("done")));
        let (task, _rx, _) = task(platform.clone(), 0, policy());

        let started = Instant::now();
        let report = task.run().await;

        assert!(matches!(report.outcome, AttemptOutcome::Succeeded { .. }));
        assert!(started.elapsed() >= Duration::from_secs(15));
        assert_eq!(platform.polls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_invoke_is_fatal() {
        let platform = ScriptedPlatform::new();
        platform.script(1, Script::reject(403));
        let (task, mut rx, _) = task(platform.clone(), 1, policy());

        let report = task.run().await;
        assert!(matches!(
            report.outcome,
            AttemptOutcome::Fatal(CoreError::InvocationRejected { index: 1, status: 403, .. })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_invoke_request_is_fatal() {
        let platform = ScriptedPlatform::new();
        platform.script(2, Script::broken_invoke());
        let (task, mut rx, _) = task(platform.clone(), 2, policy());

        let report = task.run().await;
        assert!(matches!(
            report.outcome,
            AttemptOutcome::Fatal(CoreError::Transport { index: 2, .. })
        ));
        assert!(rx.try_recv().is_err());
        assert_eq!(platform.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_query_is_fatal() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::broken_poll());
        let (task, mut rx, _) = task(platform.clone(), 0, policy());

        let report = task.run().await;
        assert!(matches!(
            report.outcome,
            AttemptOutcome::Fatal(CoreError::Transport { index: 0, ref source })
                if matches!(source, PlatformError::Transport(_))
        ));
        assert!(matches!(rx.try_recv(), Ok(TaskEvent::Triggered { index: 0, .. })));
        assert_eq!(platform.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn internal_error_is_transient() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::transient());
        let (task, _rx, _) = task(platform.clone(), 0, policy());

        let report = task.run().await;
        assert_eq!(report.outcome.status(), InvocationStatus::FailedTransient);
    }

    #[tokio::test(start_paused = true)]
    async fn other_status_is_fatal() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::other("application error"));
        let (task, _rx, _) = task(platform.clone(), 0, policy());

        let report = task.run().await;
        assert!(matches!(
            report.outcome,
            AttemptOutcome::Fatal(CoreError::UnrecognizedStatus { ref status, .. }) if status == "application error"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_ceiling_is_fatal() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::hang());
        let (task, _rx, _) = task(
            platform.clone(),
            0,
            DispatchPolicy {
                max_polls: 3,
                ..policy()
            },
        );

        let report = task.run().await;
        assert!(matches!(
            report.outcome,
            AttemptOutcome::Fatal(CoreError::PollTimeout { polls: 3, .. })
        ));
        assert_eq!(platform.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_polling() {
        let platform = ScriptedPlatform::new();
        platform.script(0, Script::hang());
        let (task, _rx, cancel) = task(platform.clone(), 0, policy());

        let handle = tokio::spawn(task.run());
        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();

        let report = handle.await.unwrap();
        assert_eq!(report.outcome.status(), InvocationStatus::Cancelled);
        assert_eq!(platform.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_delay_is_honoured() {
        let platform = ScriptedPlatform::new();
        let (task, _rx, _) = task(platform.clone(), 0, policy());

        let started = Instant::now();
        let report = task.with_delay(Duration::from_secs(2)).run().await;
        assert!(matches!(report.outcome, AttemptOutcome::Succeeded { .. }));
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
