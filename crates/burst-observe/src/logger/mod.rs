mod config;
mod error;
mod format;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global tracing subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] when called twice in one process.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    cfg.validate()?;
    log::install(cfg)
}
