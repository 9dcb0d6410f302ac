use burst_core::Subscribe;
use burst_model::RunEvent;
use tracing::{debug, error, info, warn};

#[inline]
pub fn message_for(event: &RunEvent) -> String {
    match event {
        RunEvent::Registered { .. } => "action registered".to_string(),
        RunEvent::Triggered { .. } => "action triggered".to_string(),
        RunEvent::Completed {
            completed, total, ..
        } => format!("{completed} out of {total} actions have finished"),
        RunEvent::Retrying { .. } => "action failed, trying again".to_string(),
        RunEvent::Aborted { .. } => "operation failed".to_string(),
        RunEvent::Finished { elapsed_ms, .. } => {
            format!("finished in {} seconds", *elapsed_ms as f64 / 1000.0)
        }
    }
}

pub fn log_event(event: &RunEvent) {
    let msg = message_for(event);

    match event {
        RunEvent::Registered { action } => info!(%action, "{msg}"),
        RunEvent::Triggered {
            index,
            activation,
            attempt,
        } => debug!(index, %activation, attempt, "{msg}"),
        RunEvent::Completed {
            index, activation, ..
        } => info!(index, %activation, "{msg}"),
        RunEvent::Retrying {
            index,
            activation,
            attempt,
            delay_ms,
            reason,
        } => warn!(index, %activation, attempt, delay_ms, %reason, "{msg}"),
        RunEvent::Aborted { reason } => error!(%reason, "{msg}"),
        RunEvent::Finished { total, elapsed_ms } => info!(total, elapsed_ms, "{msg}"),
    }
}

/// Reports run progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSubscriber;

impl LogSubscriber {
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogSubscriber {
    fn on_event(&self, event: &RunEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
