use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type Output = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Build the output layer for `cfg.format` and install it as the global default.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let output = output_layer(cfg)?;
    tracing_subscriber::registry()
        .with(output)
        .with(level_filter(&cfg.level)?)
        .try_init()
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("SetGlobalDefaultError") || s.contains("global default") {
                LoggerError::AlreadyInitialized
            } else {
                LoggerError::InitializationFailed(s)
            }
        })
}

fn output_layer(cfg: &LoggerConfig) -> Result<Output, LoggerError> {
    match cfg.format {
        LoggerFormat::Text => Ok(fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_rfc3339())
            .boxed()),
        LoggerFormat::Json => Ok(fmt::layer()
            .json()
            .with_current_span(true)
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_timer(local_rfc3339())
            .boxed()),
        LoggerFormat::Journald => journald_layer(),
    }
}

/// `RUST_LOG` wins over the configured level when set.
fn level_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
    })
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<Output, LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?
        .with_syslog_identifier("burst".to_string());
    Ok(layer.boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<Output, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::fmt::time::FormatTime;

    use super::*;

    #[test]
    fn timer_writes_rfc3339() {
        let mut buf = String::new();
        local_rfc3339()
            .format_time(&mut fmt::format::Writer::new(&mut buf))
            .unwrap();
        let (date, clock) = buf.split_once('T').unwrap();
        assert_eq!(date.len(), 10, "{buf}");
        assert!(clock.ends_with('Z') || clock.contains('+') || clock.contains('-'), "{buf}");
    }

    #[test]
    fn text_and_json_layers_build() {
        for format in [LoggerFormat::Text, LoggerFormat::Json] {
            let cfg = LoggerConfig::new("info", format);
            assert!(output_layer(&cfg).is_ok());
        }
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_layer_needs_feature() {
        let cfg = LoggerConfig::new("info", LoggerFormat::Journald);
        assert!(matches!(output_layer(&cfg), Err(LoggerError::JournaldNotSupported)));
    }
}
