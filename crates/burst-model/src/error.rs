use thiserror::Error;

/// Validation failures of a work-unit description.
///
/// Every variant is fatal: a run described by an invalid config never reaches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("configs must contain '{0}' parameter")]
    MissingField(&'static str),
    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ModelError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ModelError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
