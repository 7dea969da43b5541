//! Logger capability
//!
//! The tracer core never reaches for a global logger. It is handed a
//! [`Logger`] at construction; the binary passes [`TracingLogger`], which
//! forwards to the `tracing` subscriber installed in `main`.

use std::fmt;
use std::sync::Arc;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured key/value pairs attached to a log event
pub type Fields<'a> = &'a [(&'a str, &'a dyn fmt::Display)];

/// Sink for tracer diagnostics
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, fields: Fields<'_>);

    fn debug(&self, message: &str, fields: Fields<'_>) {
        self.log(LogLevel::Debug, message, fields);
    }

    fn info(&self, message: &str, fields: Fields<'_>) {
        self.log(LogLevel::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: Fields<'_>) {
        self.log(LogLevel::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: Fields<'_>) {
        self.log(LogLevel::Error, message, fields);
    }
}

/// Shared handle to a logger
pub type SharedLogger = Arc<dyn Logger>;

/// Render fields as `key=value` pairs separated by spaces
pub fn render_fields(fields: Fields<'_>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Forwards events to the `tracing` macros
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, fields: Fields<'_>) {
        let rendered = render_fields(fields);
        match level {
            LogLevel::Debug => tracing::debug!(target: "deptrace", fields = %rendered, "{}", message),
            LogLevel::Info => tracing::info!(target: "deptrace", fields = %rendered, "{}", message),
            LogLevel::Warn => tracing::warn!(target: "deptrace", fields = %rendered, "{}", message),
            LogLevel::Error => tracing::error!(target: "deptrace", fields = %rendered, "{}", message),
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str, _fields: Fields<'_>) {}
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingLogger;
    use super::*;

    #[test]
    fn test_render_fields() {
        let count = 3;
        let path = "src/App.tsx";
        assert_eq!(
            render_fields(&[("path", &path), ("count", &count)]),
            "path=src/App.tsx count=3"
        );
        assert_eq!(render_fields(&[]), "");
    }

    #[test]
    fn test_default_methods_route_levels() {
        let logger = RecordingLogger::default();
        logger.info("resolved", &[("score", &100)]);
        logger.warn("stale", &[]);
        logger.debug("probe", &[]);

        assert_eq!(logger.messages(LogLevel::Info), vec!["resolved score=100"]);
        assert_eq!(logger.messages(LogLevel::Warn), vec!["stale"]);
        assert_eq!(logger.messages(LogLevel::Debug), vec!["probe"]);
        assert!(logger.messages(LogLevel::Error).is_empty());
    }
}
