use serde::{Deserialize, Serialize};

use crate::{ActionExec, ModelError, TimeoutMs};

/// Per-activation resource limits enforced by the platform.
///
/// Serialized with the platform's field names (`timeout`, `memory`, `logs`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLimits {
    /// Activation timeout in milliseconds.
    #[serde(rename = "timeout")]
    pub timeout_ms: TimeoutMs,
    /// Memory of each action container, in megabytes.
    #[serde(rename = "memory")]
    pub memory_mb: u32,
    /// Log quota of each activation, in megabytes.
    #[serde(rename = "logs")]
    pub logs_mb: u32,
}

impl Default for ActionLimits {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            memory_mb: 256,
            logs_mb: 10,
        }
    }
}

impl ActionLimits {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.timeout_ms == 0 {
            return Err(ModelError::invalid("actionLimits.timeout", "must be positive"));
        }
        if self.memory_mb == 0 {
            return Err(ModelError::invalid("actionLimits.memory", "must be positive"));
        }
        if self.logs_mb == 0 {
            return Err(ModelError::invalid("actionLimits.logs", "must be positive"));
        }
        Ok(())
    }
}

/// User-facing description of a batch.
///
/// `namespace`, `actionName` and `numActions` are required; the limits fall back to [`ActionLimits::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkUnitConfig {
    pub namespace: String,
    pub action_name: String,
    pub num_actions: usize,
    #[serde(default)]
    pub action_limits: ActionLimits,
}

impl WorkUnitConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.namespace.trim().is_empty() {
            return Err(ModelError::MissingField("namespace"));
        }
        if self.action_name.trim().is_empty() {
            return Err(ModelError::MissingField("actionName"));
        }
        if self.action_name.contains('/') || self.action_name.contains('?') {
            return Err(ModelError::invalid(
                "actionName",
                "must not contain '/' or '?'",
            ));
        }
        if self.num_actions == 0 {
            return Err(ModelError::invalid("numActions", "must be at least 1"));
        }
        self.action_limits.validate()
    }
}

/// Definition stored on the platform under `name`.
///
/// Immutable once built; registering it again replaces the platform copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub namespace: String,
    pub name: String,
    pub exec: ActionExec,
    pub limits: ActionLimits,
}

impl WorkUnit {
    pub fn from_config(config: &WorkUnitConfig, exec: ActionExec) -> Self {
        Self {
            namespace: config.namespace.clone(),
            name: config.action_name.clone(),
            exec,
            limits: config.action_limits,
        }
    }
}
