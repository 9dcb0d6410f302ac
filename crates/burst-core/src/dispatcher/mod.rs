use std::{sync::Arc, time::Duration};

use burst_model::{DispatchPolicy, LogicalIndex, RunEvent};
use tokio::{
    sync::{Semaphore, mpsc},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    aggregate::ResultAggregator,
    error::{CoreError, CoreResult},
    platform::Platform,
    state::ActivationIndex,
    subscriber::Subscribers,
    task::{AttemptOutcome, AttemptReport, InvocationTask, TaskEvent},
    workload::Workload,
};

/// Fans out one invocation per logical index and collects the results.
///
/// The dispatcher loop is the only writer of the [`ActivationIndex`]: attempts report
/// triggers over a channel and their terminal outcome through the join set.
pub struct Dispatcher {
    platform: Arc<dyn Platform>,
    policy: DispatchPolicy,
    subscribers: Subscribers,
}

/// Per-run state owned by the dispatcher loop.
struct Batch {
    action: Arc<str>,
    workload: Arc<dyn Workload>,
    permits: Arc<Semaphore>,
    events: mpsc::UnboundedSender<TaskEvent>,
    cancel: CancellationToken,
    tasks: JoinSet<AttemptReport>,
    index: ActivationIndex,
    aggregator: ResultAggregator,
}

impl Dispatcher {
    pub fn new(platform: Arc<dyn Platform>, policy: DispatchPolicy, subscribers: Subscribers) -> Self {
        Self {
            platform,
            policy,
            subscribers,
        }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Invoke `action` once per logical index in `[0, total)` and wait for all successes.
    ///
    /// Returns the full aggregate, or the first fatal error. On error every live attempt is
    /// cancelled before this returns.
    #[instrument(level = "info", skip(self, workload, cancel), fields(max_in_flight = self.policy.max_in_flight))]
    pub async fn run(
        &self,
        action: &str,
        total: usize,
        workload: Arc<dyn Workload>,
        cancel: &CancellationToken,
    ) -> CoreResult<ResultAggregator> {
        self.policy.validate()?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut batch = Batch {
            action: Arc::from(action),
            workload,
            permits: Arc::new(Semaphore::new(self.policy.max_in_flight)),
            events: tx,
            cancel: cancel.child_token(),
            tasks: JoinSet::new(),
            index: ActivationIndex::new(),
            aggregator: ResultAggregator::new(total),
        };

        info!("triggering actions");
        for i in 0..total {
            self.spawn(&mut batch, i, 1, Duration::ZERO);
        }

        let outcome = self.drive(&mut batch, &mut rx, cancel).await;

        batch.cancel.cancel();
        batch.permits.close();
        batch.tasks.shutdown().await;
        batch.index.clear();

        match outcome {
            Ok(()) => Ok(batch.aggregator),
            Err(e) => {
                error!(error = %e, "batch aborted");
                self.subscribers.emit(&RunEvent::Aborted {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        batch: &mut Batch,
        rx: &mut mpsc::UnboundedReceiver<TaskEvent>,
        cancel: &CancellationToken,
    ) -> CoreResult<()> {
        while !batch.aggregator.is_complete() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CoreError::Cancelled),
                Some(event) = rx.recv() => self.apply(batch, event)?,
                joined = batch.tasks.join_next() => {
                    // Triggers sent before the attempt ended must be applied first.
                    while let Ok(event) = rx.try_recv() {
                        self.apply(batch, event)?;
                    }
                    match joined {
                        Some(Ok(report)) => self.settle(batch, report)?,
                        Some(Err(e)) => return Err(CoreError::TaskPanicked(e.to_string())),
                        None => {
                            let p = batch.aggregator.progress();
                            return Err(CoreError::Incomplete {
                                completed: p.completed,
                                total: p.total,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(&self, batch: &mut Batch, event: TaskEvent) -> CoreResult<()> {
        match event {
            TaskEvent::Triggered {
                index,
                activation,
                attempt,
            } => {
                batch.index.record(activation.clone(), index)?;
                debug!(index, %activation, attempt, live = batch.index.live_count(), "activation live");
                self.subscribers.emit(&RunEvent::Triggered {
                    index,
                    activation,
                    attempt,
                });
            }
        }
        Ok(())
    }

    fn settle(&self, batch: &mut Batch, report: AttemptReport) -> CoreResult<()> {
        match report.outcome {
            AttemptOutcome::Succeeded { activation, result } => {
                batch.index.settle(&activation);
                let progress = batch.aggregator.push(report.index, result)?;
                self.subscribers.emit(&RunEvent::Completed {
                    index: report.index,
                    activation,
                    completed: progress.completed,
                    total: progress.total,
                });
                Ok(())
            }
            AttemptOutcome::Transient { activation, reason } => {
                let index = batch.index.supersede(&activation).unwrap_or(report.index);
                if report.attempt >= self.policy.max_attempts {
                    error!(index, %activation, attempts = report.attempt, %reason, "action failed, no attempts left");
                    return Err(CoreError::RetriesExhausted {
                        index,
                        attempts: report.attempt,
                        reason,
                    });
                }
                let delay = self.policy.backoff.delay(report.attempt);
                warn!(index, %activation, attempt = report.attempt, %reason, "action failed, trying again");
                self.subscribers.emit(&RunEvent::Retrying {
                    index,
                    activation,
                    attempt: report.attempt + 1,
                    delay_ms: delay.as_millis() as u64,
                    reason,
                });
                self.spawn(batch, index, report.attempt + 1, delay);
                Ok(())
            }
            AttemptOutcome::Fatal(e) => Err(e),
            AttemptOutcome::Cancelled => Err(CoreError::Cancelled),
        }
    }

    fn spawn(&self, batch: &mut Batch, index: LogicalIndex, attempt: u32, delay: Duration) {
        let task = InvocationTask::new(
            index,
            attempt,
            Arc::clone(&batch.action),
            batch.workload.args_for_index(index),
            self.policy,
            Arc::clone(&self.platform),
            Arc::clone(&batch.permits),
            batch.events.clone(),
            batch.cancel.child_token(),
        )
        .with_delay(delay);
        batch.tasks.spawn(task.run());
    }
}
