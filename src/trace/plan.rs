//! Refactor Planning
//!
//! Computes where a component should live and how many importers a move
//! would touch. Planning is a pure computation over the loaded index and
//! the classifier; nothing on disk is read or written.
//!
//! @module trace/plan

use std::path::Path;

use super::classify::RuleTable;
use super::normalize::validate_src_path;
use super::traverse::reverse_dependents;
use super::types::{DependencyIndex, RefactorPlan};
use crate::core::config::PlannerConfig;
use crate::core::error::{Error, Result};

pub const NOTE_MIXED_USAGE: &str =
    "component may have mixed public/admin usage; verify references before relocating";
pub const NOTE_IN_PLACE: &str = "already in place";

/// Relocation planner
#[derive(Debug, Clone)]
pub struct Planner {
    rules: RuleTable,
    components_dir: String,
    strict: bool,
}

impl Planner {
    pub fn new(config: &PlannerConfig) -> Self {
        Self::with_rules(config, RuleTable::default())
    }

    pub fn with_rules(config: &PlannerConfig, rules: RuleTable) -> Self {
        Self {
            rules,
            components_dir: config.components_dir.trim_end_matches('/').to_string(),
            strict: config.strict,
        }
    }

    /// Plan a move of `source_path` for the component `component_name`
    ///
    /// Fails with `RefactorBlocked` when the destination is not a valid
    /// source path, is already taken by another tracked file, or when
    /// strict mode meets a mixed-usage risk.
    pub fn plan(
        &self,
        index: &DependencyIndex,
        source_path: &str,
        component_name: &str,
    ) -> Result<RefactorPlan> {
        if component_name.is_empty() || component_name.contains(['/', '\\']) {
            return Err(Error::RefactorBlocked {
                message: format!("invalid component name '{}'", component_name),
            });
        }

        let classification = self.rules.classify(component_name);
        let file_name = match Path::new(source_path).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", component_name, ext),
            None => component_name.to_string(),
        };
        let to = format!(
            "{}/{}/{}/{}",
            self.components_dir, classification.domain, classification.slug, file_name
        );

        let mixed_usage = has_mixed_usage_risk(source_path);
        let mut notes = Vec::new();
        if mixed_usage {
            notes.push(NOTE_MIXED_USAGE.to_string());
        }

        if to == source_path {
            notes.push(NOTE_IN_PLACE.to_string());
        } else {
            if !validate_src_path(&to) {
                return Err(Error::RefactorBlocked {
                    message: format!("destination is not a valid source path: {}", to),
                });
            }
            if index.contains(&to) {
                return Err(Error::RefactorBlocked {
                    message: format!("destination already exists: {}", to),
                });
            }
        }

        if self.strict && mixed_usage {
            return Err(Error::RefactorBlocked {
                message: format!(
                    "{} has unresolved mixed-usage risk (strict mode)",
                    source_path
                ),
            });
        }

        Ok(RefactorPlan {
            from: source_path.to_string(),
            to,
            domain: classification.domain,
            slug: classification.slug,
            import_updates: reverse_dependents(index, source_path).len(),
            notes,
            mixed_usage,
        })
    }
}

/// A file under a `views` directory without an admin marker
fn has_mixed_usage_risk(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    let in_views = dirs.iter().any(|s| *s == "views");
    let admin = dirs.iter().any(|s| s.to_ascii_lowercase().contains("admin"));
    in_views && !admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::types::SourceNode;

    fn planner() -> Planner {
        Planner::new(&PlannerConfig::default())
    }

    fn strict_planner() -> Planner {
        Planner::new(&PlannerConfig {
            strict: true,
            ..PlannerConfig::default()
        })
    }

    fn index_with(source: &str, importers: &[&str]) -> DependencyIndex {
        let mut nodes = vec![SourceNode::new(source, vec![], 0)];
        nodes.extend(
            importers
                .iter()
                .map(|id| SourceNode::new(*id, vec![source.to_string()], 0)),
        );
        DependencyIndex::new("/work", nodes)
    }

    #[test]
    fn test_wizard_destination() {
        let index = index_with("src/old/ChurchWizardStep1.tsx", &["src/App.tsx"]);
        let plan = planner()
            .plan(&index, "src/old/ChurchWizardStep1.tsx", "ChurchWizardStep1")
            .unwrap();

        assert_eq!(
            plan.to,
            "src/components/church-management/ch-wiz/ChurchWizardStep1.tsx"
        );
        assert_eq!(plan.domain, "church-management");
        assert_eq!(plan.slug, "ch-wiz");
        assert_eq!(plan.import_updates, 1);
        assert!(plan.notes.is_empty());
    }

    #[test]
    fn test_extension_preserved() {
        let index = index_with("src/legacy/UserBadge.jsx", &[]);
        let plan = planner()
            .plan(&index, "src/legacy/UserBadge.jsx", "UserBadge")
            .unwrap();
        assert_eq!(plan.to, "src/components/user-management/usr-core/UserBadge.jsx");
        assert_eq!(plan.import_updates, 0);
    }

    #[test]
    fn test_views_without_admin_flagged() {
        let index = index_with("src/views/records/BaptismList.tsx", &["src/a.ts", "src/b.ts"]);
        let plan = planner()
            .plan(&index, "src/views/records/BaptismList.tsx", "BaptismList")
            .unwrap();
        assert!(plan.mixed_usage);
        assert_eq!(plan.notes, vec![NOTE_MIXED_USAGE.to_string()]);
        assert_eq!(plan.import_updates, 2);
    }

    #[test]
    fn test_admin_views_not_flagged() {
        let index = index_with("src/views/admin/UserTable.tsx", &[]);
        let plan = strict_planner()
            .plan(&index, "src/views/admin/UserTable.tsx", "UserTable")
            .unwrap();
        assert!(!plan.mixed_usage);
        assert!(plan.notes.is_empty());
    }

    #[test]
    fn test_strict_blocks_mixed_usage() {
        let index = index_with("src/views/Dashboard.tsx", &[]);
        let err = strict_planner()
            .plan(&index, "src/views/Dashboard.tsx", "Dashboard")
            .unwrap_err();
        assert!(matches!(err, Error::RefactorBlocked { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_occupied_destination_blocked() {
        let index = DependencyIndex::new(
            "/work",
            vec![
                SourceNode::new("src/old/UserCard.tsx", vec![], 0),
                SourceNode::new("src/components/user-management/usr-core/UserCard.tsx", vec![], 0),
            ],
        );
        let err = planner()
            .plan(&index, "src/old/UserCard.tsx", "UserCard")
            .unwrap_err();
        assert!(matches!(err, Error::RefactorBlocked { .. }));
    }

    #[test]
    fn test_already_in_place() {
        let source = "src/components/user-management/usr-core/UserCard.tsx";
        let index = index_with(source, &[]);
        let plan = planner().plan(&index, source, "UserCard").unwrap();
        assert_eq!(plan.to, plan.from);
        assert_eq!(plan.notes, vec![NOTE_IN_PLACE.to_string()]);
    }

    #[test]
    fn test_invalid_component_name_blocked() {
        let index = index_with("src/old/A.tsx", &[]);
        for name in ["", "../A", "nested/A"] {
            assert!(matches!(
                planner().plan(&index, "src/old/A.tsx", name),
                Err(Error::RefactorBlocked { .. })
            ));
        }
    }

    #[test]
    fn test_custom_components_dir() {
        let config = PlannerConfig {
            components_dir: "src/ui/".to_string(),
            ..PlannerConfig::default()
        };
        let index = index_with("src/old/Sidebar.tsx", &[]);
        let plan = Planner::new(&config)
            .plan(&index, "src/old/Sidebar.tsx", "Sidebar")
            .unwrap();
        assert_eq!(plan.to, "src/ui/shared/shared/Sidebar.tsx");
    }
}
