//! Output formatters for trace results
//!
//! Provides two output formats:
//! - Plain: human-readable text (terminal, logs)
//! - JSON: machine-readable format (scripts, CI)
//!
//! @module trace/output

pub mod json;
pub mod plain;

use std::path::PathBuf;

use serde::Serialize;

use super::storage::IndexInfo;
use super::types::TraceResult;
use crate::core::error::ErrorReport;

// =============================================================================
// TYPES
// =============================================================================

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Plain,
    /// JSON for machine consumption
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Plain
        }
    }
}

/// Index health as reported by `deptrace info`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub path: PathBuf,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<IndexInfo>,
    pub should_rebuild: bool,
    pub max_age_ms: u64,
}

// =============================================================================
// FORMATTER TRAIT
// =============================================================================

/// Trait for formatting trace output
pub trait TraceFormatter {
    /// Format a trace result (resolved, ambiguous, or failed)
    fn format_trace(&self, result: &TraceResult) -> String;

    /// Format a failure that happened outside a trace
    fn format_error(&self, report: &ErrorReport) -> String;

    /// Format an index health probe
    fn format_index_status(&self, status: &IndexStatus) -> String;
}

// =============================================================================
// FACTORY FUNCTION
// =============================================================================

/// Create a formatter for the given output format
///
/// `max_items` bounds list lengths in plain output (0 = unlimited).
pub fn create_formatter(format: OutputFormat, max_items: usize) -> Box<dyn TraceFormatter> {
    match format {
        OutputFormat::Plain => Box::new(plain::PlainFormatter::new(max_items)),
        OutputFormat::Json => Box::new(json::JsonFormatter::new()),
    }
}

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use json::JsonFormatter;
pub use plain::{format_dependencies, PlainFormatter};
