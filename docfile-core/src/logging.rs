// logging.rs - tracing setup for embedders and the CLI
//
// The library only emits `tracing` events; nothing is printed unless the
// embedding process installs a subscriber, e.g. with `init_logging`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log levels (ordered by severity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Errors - failures that abort an operation
    Error,
    /// Warnings - duplicate ids and other suspicious but accepted input
    #[default]
    Warn,
    /// Info - open/close of the database
    Info,
    /// Debug - one line per store operation
    Debug,
    /// Trace - every collection file read and write
    Trace,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.to_uppercase().as_str() {
            "ERROR" => Some(LogLevel::Error),
            "WARN" => Some(LogLevel::Warn),
            "INFO" => Some(LogLevel::Info),
            "DEBUG" => Some(LogLevel::Debug),
            "TRACE" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    pub fn to_level(&self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Install a stderr fmt subscriber filtered at `level` for this crate.
///
/// `RUST_LOG` takes precedence when set. Calling this more than once, or
/// after another subscriber was installed, has no effect.
pub fn init_logging(level: LogLevel) {
    let default_filter = format!("docfile_core={},docfile={}", level.to_level(), level.to_level());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::parse("ERROR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("DeBuG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_to_level() {
        assert_eq!(LogLevel::Trace.to_level(), Level::TRACE);
        assert_eq!(LogLevel::default().to_level(), Level::WARN);
        assert_eq!(LogLevel::Info.as_str(), "INFO");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(LogLevel::Debug);
        init_logging(LogLevel::Error);
    }
}
