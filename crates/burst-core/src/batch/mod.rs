use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use burst_model::{ActionExec, DispatchPolicy, RunEvent, WorkUnit, WorkUnitConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    dispatcher::Dispatcher,
    error::{CoreError, CoreResult},
    platform::Platform,
    registrar::WorkRegistrar,
    subscriber::{Subscribe, Subscribers},
    workload::Workload,
};

/// Summary of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub elapsed: Duration,
}

/// Entry point of the engine: register, fan out, reduce.
pub struct BatchRunner {
    registrar: WorkRegistrar,
    dispatcher: Dispatcher,
    subscribers: Subscribers,
}

impl BatchRunner {
    pub fn new(
        platform: Arc<dyn Platform>,
        policy: DispatchPolicy,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let subscribers = Subscribers::new(subscribers);
        Self {
            registrar: WorkRegistrar::new(Arc::clone(&platform)),
            dispatcher: Dispatcher::new(platform, policy, subscribers.clone()),
            subscribers,
        }
    }

    /// Run one batch to completion.
    ///
    /// The configuration is validated before any request is sent. The reduction runs only
    /// when every logical index succeeded.
    #[instrument(
        level = "info",
        skip_all,
        fields(run_id = %Uuid::new_v4(), action = %config.action_name, total = config.num_actions)
    )]
    pub async fn run(
        &self,
        config: &WorkUnitConfig,
        exec: ActionExec,
        workload: Arc<dyn Workload>,
        cancel: CancellationToken,
    ) -> CoreResult<RunReport> {
        let started = Instant::now();
        config.validate()?;
        self.dispatcher.policy().validate()?;

        let unit = WorkUnit::from_config(config, exec);
        self.registrar
            .register(&unit)
            .await
            .map_err(|e| self.aborted(e))?;
        self.subscribers.emit(&RunEvent::Registered {
            action: unit.name.clone(),
        });

        let aggregator = self
            .dispatcher
            .run(&unit.name, config.num_actions, Arc::clone(&workload), &cancel)
            .await?;
        aggregator
            .reduce(workload.as_ref())
            .map_err(|e| self.aborted(e))?;

        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "run finished");
        self.subscribers.emit(&RunEvent::Finished {
            total: config.num_actions,
            elapsed_ms: elapsed.as_millis() as u64,
        });
        Ok(RunReport {
            total: config.num_actions,
            elapsed,
        })
    }

    /// Failures outside the dispatcher; the dispatcher reports its own.
    fn aborted(&self, e: CoreError) -> CoreError {
        error!(error = %e, "run aborted");
        self.subscribers.emit(&RunEvent::Aborted {
            reason: e.to_string(),
        });
        e
    }
}
