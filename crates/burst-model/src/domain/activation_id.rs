use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform-issued identifier of a single invocation attempt.
///
/// Unique per attempt: a retried logical index gets a fresh activation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationId(String);

impl ActivationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ActivationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ActivationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
