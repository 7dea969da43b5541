//! Domain/Slug Classification
//!
//! Maps a component name to the `(domain, slug)` pair that decides where
//! it belongs under the components directory. Rules are regex patterns
//! with a priority; the highest-priority match wins and declaration order
//! breaks ties. The default table ends in a `.*` catch-all, so every name
//! classifies.
//!
//! Numbered variants (`ChurchWizardStep1`, `ReportPart2`, `Chart3`) are
//! matched on their stem as well as their full name, so anchored suffix
//! rules like `Wizard$` still apply to them.
//!
//! @module trace/classify

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::core::error::{Error, Result};

/// Fallback for names no rule claims
pub const SHARED: &str = "shared";

// =============================================================================
// RULES
// =============================================================================

/// One classification rule
#[derive(Debug, Clone)]
pub struct SlugRule {
    pub pattern: Regex,
    /// Domain token, mapped through [`domain_name`]
    pub domain: String,
    pub slug: String,
    pub priority: i32,
}

impl SlugRule {
    /// Build a rule from a regex source
    pub fn new(pattern: &str, domain: &str, slug: &str, priority: i32) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::Config {
            message: format!("invalid slug rule pattern '{}': {}", pattern, e),
        })?;
        Ok(Self {
            pattern,
            domain: domain.to_string(),
            slug: slug.to_string(),
            priority,
        })
    }

    fn matches(&self, name: &str, stem: Option<&str>) -> bool {
        self.pattern.is_match(name) || stem.is_some_and(|s| self.pattern.is_match(s))
    }
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub domain: String,
    pub slug: String,
}

impl Classification {
    fn shared() -> Self {
        Self {
            domain: SHARED.to_string(),
            slug: SHARED.to_string(),
        }
    }
}

/// Map a rule's domain token to its directory name
pub fn domain_name(token: &str) -> String {
    match token {
        "church" => "church-management".to_string(),
        "user" => "user-management".to_string(),
        "record" => "records-management".to_string(),
        "admin" => "admin".to_string(),
        "shared" => "shared".to_string(),
        other => format!("{}-management", other),
    }
}

// =============================================================================
// DEFAULT TABLE
// =============================================================================

/// (pattern, domain token, slug, priority), in declaration order
const DEFAULT_RULES: &[(&str, &str, &str, i32)] = &[
    // Multi-step flows
    (r"Wizard$", "church", "ch-wiz", 80),
    (r"Setup", "church", "ch-wiz", 80),
    // Admin surfaces
    (r"^Admin", "admin", "adm-panel", 70),
    // Record builders and viewers
    (r"Template", "record", "rec-template", 60),
    (r"(Options|Config|Fields)$", "record", "rec-config", 60),
    (r"(Display|View)$", "record", "rec-view", 55),
    // Name families
    (r"^Church", "church", "ch-panel", 50),
    (r"^User", "user", "usr-core", 50),
    (r"^(Baptism|Marriage|Funeral|Record)", "record", "rec-core", 50),
    // Generic UI building blocks
    (r"(Button|Modal|Dialog|Card|Table)$", "shared", "ui", 10),
    // Catch-all
    (r".*", "shared", "shared", 0),
];

static DEFAULT_TABLE: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_rules(
        DEFAULT_RULES
            .iter()
            .map(|(pattern, domain, slug, priority)| SlugRule {
                pattern: Regex::new(pattern).unwrap(),
                domain: domain.to_string(),
                slug: slug.to_string(),
                priority: *priority,
            })
            .collect(),
    )
});

/// Trailing sequence markers: `Step1`, `Part2`, bare digits
static SEQUENCE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)(?:Step|Part)?\d+$").unwrap());

/// Name with a trailing sequence marker removed, if it had one
fn stem(name: &str) -> Option<&str> {
    SEQUENCE_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// RULE TABLE
// =============================================================================

/// Rules in evaluation order
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<SlugRule>,
}

impl RuleTable {
    /// Build a table from rules in declaration order
    pub fn new(rules: Vec<SlugRule>) -> Self {
        Self::from_rules(rules)
    }

    fn from_rules(mut rules: Vec<SlugRule>) -> Self {
        // Stable sort keeps declaration order among equal priorities
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[SlugRule] {
        &self.rules
    }

    /// Classify a component name; never fails
    pub fn classify(&self, name: &str) -> Classification {
        let stem = stem(name);
        self.rules
            .iter()
            .find(|rule| rule.matches(name, stem))
            .map(|rule| Classification {
                domain: domain_name(&rule.domain),
                slug: rule.slug.clone(),
            })
            .unwrap_or_else(Classification::shared)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        (*DEFAULT_TABLE).clone()
    }
}

/// Classify with the built-in rules
pub fn classify(name: &str) -> Classification {
    DEFAULT_TABLE.classify(name)
}
