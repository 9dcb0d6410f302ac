use serde::{Deserialize, Serialize};

/// Default runtime kind for registered actions.
pub const DEFAULT_EXEC_KIND: &str = "nodejs:6";

/// Packaged code of a work unit, as stored on the platform.
///
/// `kind` names the platform runtime (e.g. `"nodejs:6"`, `"python:3"`) and `code` carries the source of the entry point.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionExec {
    pub kind: String,
    pub code: String,
}

impl ActionExec {
    pub fn new(kind: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            code: code.into(),
        }
    }

    /// Source wrapped in the default runtime kind.
    pub fn nodejs(code: impl Into<String>) -> Self {
        Self::new(DEFAULT_EXEC_KIND, code)
    }
}
