//! Plain text output formatter
//!
//! Simple text output without ANSI codes, suitable for terminals, pipes
//! and log files. Long lists are cut at `max_items` with an
//! "... and N more" trailer.
//!
//! @module trace/output/plain

use super::{IndexStatus, TraceFormatter};
use crate::core::error::ErrorReport;
use crate::trace::types::{RefactorPlan, TraceResult, TraceStatus};

// =============================================================================
// LIST FORMATTING
// =============================================================================

/// Render a titled list, truncated to `max_items` entries (0 = unlimited)
pub fn format_dependencies(deps: &[String], title: &str, max_items: usize) -> String {
    if deps.is_empty() {
        return format!("{}: None\n", title);
    }

    let shown = if max_items == 0 {
        deps.len()
    } else {
        deps.len().min(max_items)
    };

    let mut output = format!("{} ({}):\n", title, deps.len());
    for dep in &deps[..shown] {
        output.push_str(&format!("  • {}\n", dep));
    }
    let remaining = deps.len() - shown;
    if remaining > 0 {
        output.push_str(&format!("  ... and {} more\n", remaining));
    }
    output
}

// =============================================================================
// PLAIN TEXT FORMATTER
// =============================================================================

/// Plain text formatter (no ANSI codes)
pub struct PlainFormatter {
    max_items: usize,
}

impl PlainFormatter {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    fn format_plan(&self, plan: &RefactorPlan) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nPLAN: {}\n", plan.from));
        output.push_str(&format!("  -> {}\n", plan.to));
        output.push_str(&format!("  Domain: {}  Slug: {}\n", plan.domain, plan.slug));
        output.push_str(&format!("  Import updates: {}\n", plan.import_updates));
        for note in &plan.notes {
            output.push_str(&format!("  Note: {}\n", note));
        }
        output
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TraceFormatter for PlainFormatter {
    fn format_trace(&self, result: &TraceResult) -> String {
        let mut output = String::new();
        output.push_str(&format!("TRACE: {}\n", result.entry));

        match result.status {
            TraceStatus::Ambiguous => {
                let candidates = result.candidates.as_deref().unwrap_or(&[]);
                output.push_str(&format!(
                    "Ambiguous: {} equally ranked candidates\n",
                    candidates.len()
                ));
                output.push_str(&"-".repeat(60));
                output.push('\n');
                for candidate in candidates {
                    output.push_str(&format!(
                        "  [{:>3}] {}  ({})\n",
                        candidate.score, candidate.path, candidate.reason
                    ));
                }
                output.push_str("\nRe-run with --pick-first or --choose <path>\n");
            }
            TraceStatus::Error => {
                if let Some(report) = &result.error {
                    output.push_str(&self.format_error(report));
                }
            }
            TraceStatus::Ok => {
                output.push_str(&format!("Resolved: {}\n", result.resolved_path));
                output.push_str(&"-".repeat(60));
                output.push('\n');
                output.push_str(&format_dependencies(
                    &result.deps.direct,
                    "Direct imports",
                    self.max_items,
                ));
                output.push_str(&format_dependencies(
                    &result.deps.transitive,
                    "Transitive imports",
                    self.max_items,
                ));
                output.push_str(&format_dependencies(
                    &result.deps.reverse,
                    "Reverse dependents",
                    self.max_items,
                ));
                if let Some(refs) = &result.component_references {
                    output.push_str(&format_dependencies(
                        refs,
                        "Component references",
                        self.max_items,
                    ));
                }
                if let Some(plan) = &result.plan {
                    output.push_str(&self.format_plan(plan));
                }
            }
        }

        output
    }

    fn format_error(&self, report: &ErrorReport) -> String {
        let mut output = format!("ERROR [{}]: {}\n", report.kind, report.message);
        if let Some(details) = &report.details {
            output.push_str(&format!("  {}\n", details));
        }
        output
    }

    fn format_index_status(&self, status: &IndexStatus) -> String {
        let mut output = format!("INDEX: {}\n", status.path.display());
        match &status.info {
            Some(info) => {
                output.push_str(&format!(
                    "Files: {} ({} TypeScript)\n",
                    info.files, info.ts
                ));
                if let Some(generated_at) = info.generated_at {
                    output.push_str(&format!("Generated: {}\n", generated_at.to_rfc3339()));
                }
                output.push_str(&format!("Age: {}\n", format_age(info.age_ms)));
            }
            None if status.exists => output.push_str("Unreadable\n"),
            None => output.push_str("Missing\n"),
        }
        output.push_str(&format!(
            "Rebuild needed: {} (max age {})\n",
            if status.should_rebuild { "yes" } else { "no" },
            format_age(status.max_age_ms)
        ));
        output
    }
}

/// Coarse human-readable duration
fn format_age(ms: u64) -> String {
    let secs = ms / 1000;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::trace::types::{DepSets, RefactorPlan};
    use std::path::PathBuf;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("src/mod{}.ts", i)).collect()
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_dependencies(&[], "Direct imports", 10), "Direct imports: None\n");
    }

    #[test]
    fn test_truncation() {
        let output = format_dependencies(&ids(12), "Transitive imports", 10);
        assert!(output.starts_with("Transitive imports (12):\n"));
        assert_eq!(output.matches("  • ").count(), 10);
        assert!(output.ends_with("  ... and 2 more\n"));
    }

    #[test]
    fn test_zero_means_unlimited() {
        let output = format_dependencies(&ids(12), "Reverse dependents", 0);
        assert_eq!(output.matches("  • ").count(), 12);
        assert!(!output.contains("more"));
    }

    #[test]
    fn test_resolved_trace_with_plan() {
        let mut result = TraceResult::resolved(
            "Wizard",
            "src/old/ChurchWizardStep1.tsx",
            DepSets {
                direct: vec!["src/api.ts".into()],
                transitive: vec!["src/api.ts".into()],
                reverse: vec![],
            },
        );
        result.plan = Some(RefactorPlan {
            from: "src/old/ChurchWizardStep1.tsx".into(),
            to: "src/components/church-management/ch-wiz/ChurchWizardStep1.tsx".into(),
            domain: "church-management".into(),
            slug: "ch-wiz".into(),
            import_updates: 0,
            notes: vec!["already in place".into()],
            mixed_usage: false,
        });

        let output = PlainFormatter::default().format_trace(&result);
        assert!(output.contains("Resolved: src/old/ChurchWizardStep1.tsx"));
        assert!(output.contains("Direct imports (1):"));
        assert!(output.contains("Reverse dependents: None"));
        assert!(output.contains("  -> src/components/church-management/ch-wiz/ChurchWizardStep1.tsx"));
        assert!(output.contains("Note: already in place"));
    }

    #[test]
    fn test_failed_trace_shows_details() {
        let result = TraceResult::failed(
            "Foo",
            Error::IndexStale {
                path: PathBuf::from("x.json"),
                age_ms: 20,
                max_age_ms: 10,
            }
            .report(),
        );
        let output = PlainFormatter::default().format_trace(&result);
        assert!(output.contains("ERROR [index_stale]"));
        assert!(output.contains("index age 20ms exceeds maximum 10ms"));
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(5_000), "5s");
        assert_eq!(format_age(125_000), "2m");
        assert_eq!(format_age(12 * 60 * 60 * 1000), "12h 0m");
    }
}
