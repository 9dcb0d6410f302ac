use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Delay schedule between re-invocations of the same logical index.
///
/// The n-th retry (1-based) waits `first_ms * factor^(n-1)`, capped at `max_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffStrategy {
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self {
            first_ms: 1_000,
            max_ms: 30_000,
            factor: 2.0,
        }
    }
}

impl BackoffStrategy {
    /// Fixed delay between retries.
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            first_ms: delay_ms,
            max_ms: delay_ms,
            factor: 1.0,
        }
    }

    /// Delay before the `retry`-th re-invocation; `retry == 0` means no wait.
    pub fn delay(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exp = self.factor.powi(retry.saturating_sub(1).min(i32::MAX as u32) as i32);
        let ms = (self.first_ms as f64 * exp).min(self.max_ms as f64);
        Duration::from_millis(ms as u64)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(ModelError::invalid("backoff.factor", "must be >= 1.0"));
        }
        if self.max_ms < self.first_ms {
            return Err(ModelError::invalid("backoff.maxMs", "must be >= firstMs"));
        }
        Ok(())
    }
}

/// How the dispatcher drives the remote invocations of one batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchPolicy {
    /// Upper bound of simultaneously live invocations.
    pub max_in_flight: usize,
    /// Delay between two polls of a not yet finished activation.
    pub poll_interval_ms: u64,
    /// Status queries allowed per attempt. The `max_polls`-th not-ready answer aborts the batch.
    pub max_polls: u32,
    /// Invocations allowed per logical index, the first one included.
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            max_in_flight: 64,
            poll_interval_ms: 5_000,
            max_polls: 720,
            max_attempts: 5,
            backoff: BackoffStrategy::default(),
        }
    }
}

impl DispatchPolicy {
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_in_flight == 0 {
            return Err(ModelError::invalid("dispatch.maxInFlight", "must be at least 1"));
        }
        if self.max_polls == 0 {
            return Err(ModelError::invalid("dispatch.maxPolls", "must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(ModelError::invalid("dispatch.maxAttempts", "must be at least 1"));
        }
        self.backoff.validate()
    }
}
