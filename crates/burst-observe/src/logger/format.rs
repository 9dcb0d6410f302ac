use std::{fmt, str::FromStr};

use crate::logger::error::LoggerError;

/// Output encoding of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerFormat {
    #[default]
    Text,
    Json,
    Journald,
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LoggerFormat::Text),
            "json" => Ok(LoggerFormat::Json),
            "journald" | "journal" => {
                if cfg!(all(target_os = "linux", feature = "journald")) {
                    Ok(LoggerFormat::Journald)
                } else {
                    Err(LoggerError::JournaldNotSupported)
                }
            }
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("TEXT".parse::<LoggerFormat>(), Ok(LoggerFormat::Text));
        assert_eq!(" json ".parse::<LoggerFormat>(), Ok(LoggerFormat::Json));
        assert_eq!(LoggerFormat::Json.to_string(), "json");
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert_eq!(
            "yaml".parse::<LoggerFormat>(),
            Err(LoggerError::InvalidFormat("yaml".into()))
        );
    }

    #[cfg(not(feature = "journald"))]
    #[test]
    fn journald_needs_feature() {
        assert_eq!(
            "journald".parse::<LoggerFormat>(),
            Err(LoggerError::JournaldNotSupported)
        );
    }
}
