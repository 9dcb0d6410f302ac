use std::io::{IsTerminal, stdout};

use tracing_subscriber::EnvFilter;

use crate::logger::{error::LoggerError, format::LoggerFormat};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `burst_core=debug,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: stdout().is_terminal(),
        }
    }
}

impl LoggerConfig {
    pub fn new(level: impl Into<String>, format: LoggerFormat) -> Self {
        Self {
            level: level.into(),
            format,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|_| LoggerError::InvalidLogLevel(self.level.clone()))
    }
}
