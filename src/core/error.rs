//! Error types for deptrace
//!
//! Every failure the tracer can produce maps onto exactly one process exit
//! code (see [`super::exit_codes`]), so scripted callers can branch on the
//! code and `--json` callers can branch on [`ErrorReport::kind`].

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::exit_codes::{
    EXIT_AMBIGUOUS, EXIT_INDEX_FAILED, EXIT_REFACTOR_BLOCKED, EXIT_RESOLVER_FAILED, EXIT_TIMEOUT,
};

/// Result type alias using deptrace's Error
pub type Result<T> = std::result::Result<T, Error>;

/// deptrace error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Index not found: {path}")]
    IndexMissing { path: PathBuf },

    #[error("Index is corrupt: {path}")]
    IndexCorrupt { path: PathBuf, message: String },

    #[error("Index is stale: {path}")]
    IndexStale {
        path: PathBuf,
        age_ms: u64,
        max_age_ms: u64,
    },

    #[error("Failed to write index: {path}")]
    IndexWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ambiguous target: {target}")]
    AmbiguousTarget {
        target: String,
        candidates: Vec<String>,
    },

    #[error("No candidates found for target: {target}")]
    ResolverFailed { target: String },

    #[error("Refactor blocked: {message}")]
    RefactorBlocked { message: String },

    #[error("Operation timed out: {operation}")]
    OperationTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Build a timeout error from the configured deadline
    pub fn timeout(operation: &'static str, deadline: Duration) -> Self {
        Self::OperationTimeout {
            operation,
            timeout_ms: deadline.as_millis() as u64,
        }
    }

    /// Process exit code for this failure
    ///
    /// Ambient failures (config, raw I/O outside the index layer, internal
    /// errors) report as resolver failures so that no failure escapes the
    /// documented exit-code contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::IndexMissing { .. }
            | Error::IndexCorrupt { .. }
            | Error::IndexStale { .. }
            | Error::IndexWriteFailed { .. } => EXIT_INDEX_FAILED,
            Error::AmbiguousTarget { .. } => EXIT_AMBIGUOUS,
            Error::ResolverFailed { .. } => EXIT_RESOLVER_FAILED,
            Error::RefactorBlocked { .. } => EXIT_REFACTOR_BLOCKED,
            Error::OperationTimeout { .. } => EXIT_TIMEOUT,
            Error::Config { .. }
            | Error::Internal { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_) => EXIT_RESOLVER_FAILED,
        }
    }

    /// Stable machine-readable token for this failure
    pub fn kind(&self) -> &'static str {
        match self {
            Error::IndexMissing { .. } => "index_missing",
            Error::IndexCorrupt { .. } => "index_corrupt",
            Error::IndexStale { .. } => "index_stale",
            Error::IndexWriteFailed { .. } => "index_write_failed",
            Error::AmbiguousTarget { .. } => "ambiguous_target",
            Error::ResolverFailed { .. } => "resolver_failed",
            Error::RefactorBlocked { .. } => "refactor_blocked",
            Error::OperationTimeout { .. } => "operation_timeout",
            Error::Config { .. } => "config",
            Error::Internal { .. } => "internal",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::TomlParse(_) => "toml_parse",
        }
    }

    /// Optional detail line shown under the one-line message
    pub fn details(&self) -> Option<String> {
        match self {
            Error::IndexMissing { .. } => {
                Some("Build the dependency index before tracing".to_string())
            }
            Error::IndexCorrupt { message, .. } => Some(message.clone()),
            Error::IndexStale {
                age_ms, max_age_ms, ..
            } => Some(format!(
                "index age {}ms exceeds maximum {}ms",
                age_ms, max_age_ms
            )),
            Error::IndexWriteFailed { source, .. } => Some(source.to_string()),
            Error::AmbiguousTarget { candidates, .. } => {
                Some(format!("candidates: {}", candidates.join(", ")))
            }
            Error::OperationTimeout { timeout_ms, .. } => {
                Some(format!("deadline {}ms", timeout_ms))
            }
            _ => None,
        }
    }

    /// Serializable form used by `--json` output
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            code: self.exit_code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

/// Structured error, serialized instead of a formatted message in JSON mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
