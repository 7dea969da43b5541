//! JSON output formatter
//!
//! Field names are camelCase and optional fields are omitted when empty,
//! matching the persisted index format.
//!
//! @module trace/output/json

use super::{IndexStatus, TraceFormatter};
use crate::core::error::ErrorReport;
use crate::trace::types::TraceResult;

// =============================================================================
// FORMATTER IMPLEMENTATION
// =============================================================================

/// Pretty-printed JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceFormatter for JsonFormatter {
    fn format_trace(&self, result: &TraceResult) -> String {
        self.to_json(result)
    }

    fn format_error(&self, report: &ErrorReport) -> String {
        self.to_json(&serde_json::json!({ "error": report }))
    }

    fn format_index_status(&self, status: &IndexStatus) -> String {
        self.to_json(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::trace::types::{Candidate, DepSets};
    use std::path::PathBuf;

    #[test]
    fn test_trace_result_fields() {
        let result = TraceResult::resolved(
            "App",
            "src/App.tsx",
            DepSets {
                direct: vec!["src/lib.ts".into()],
                transitive: vec!["src/lib.ts".into()],
                reverse: vec![],
            },
        );
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new().format_trace(&result)).unwrap();

        assert_eq!(value["entry"], "App");
        assert_eq!(value["resolvedPath"], "src/App.tsx");
        assert_eq!(value["counts"]["direct"], 1);
        assert_eq!(value["deps"]["direct"][0], "src/lib.ts");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let result = TraceResult::ambiguous(
            "Foo",
            vec![Candidate {
                path: "src/a/Foo.tsx".into(),
                score: 50,
                reason: "filename match".into(),
                mtime: 0,
            }],
        );
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new().format_trace(&result)).unwrap();
        assert_eq!(value["status"], "ambiguous");
        assert_eq!(value["candidates"][0]["score"], 50);
    }

    #[test]
    fn test_error_report_shape() {
        let report = Error::IndexMissing {
            path: PathBuf::from(".cache/deptrace/file-deps.json"),
        }
        .report();
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new().format_error(&report)).unwrap();
        assert_eq!(value["error"]["kind"], "index_missing");
        assert_eq!(value["error"]["code"], 3);
    }

    #[test]
    fn test_index_status_without_info() {
        let status = IndexStatus {
            path: PathBuf::from("/work/.cache/deptrace/file-deps.json"),
            exists: false,
            info: None,
            should_rebuild: true,
            max_age_ms: 1000,
        };
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter::new().format_index_status(&status)).unwrap();
        assert_eq!(value["shouldRebuild"], true);
        assert!(value.get("info").is_none());
    }
}
