use async_trait::async_trait;
use burst_model::{ActivationId, WorkUnit};
use serde_json::Value;
use thiserror::Error;

/// Answer of the platform to an invoke request.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeOutcome {
    /// Invocation accepted; the result is fetched later under this id.
    Accepted(ActivationId),
    /// Invocation refused.
    Rejected { status: u16, body: String },
}

/// Answer of the platform to a result query.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationPoll {
    /// Activation is still running (or not yet visible).
    NotReady,
    /// Activation finished successfully with this result.
    Success(Value),
    /// Platform-internal failure; another attempt may succeed.
    TransientInternalError(String),
    /// Any other final status (application error, developer error, ...).
    OtherError { status: String },
}

/// Failure to talk to the platform at all.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid platform response: {0}")]
    InvalidResponse(String),
}

impl PlatformError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        PlatformError::Status {
            status,
            body: body.into(),
        }
    }
}

/// Remote serverless platform, as consumed by the engine.
///
/// Implementations must be safe to call from many concurrent invocation tasks.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Create or overwrite the stored definition of `unit`.
    async fn register_work(&self, unit: &WorkUnit) -> Result<(), PlatformError>;

    /// Trigger one non-blocking invocation of `action` with `args`.
    async fn invoke(&self, action: &str, args: &Value) -> Result<InvokeOutcome, PlatformError>;

    /// Query the result of a previously accepted invocation.
    async fn activation_result(&self, id: &ActivationId) -> Result<ActivationPoll, PlatformError>;
}
