//! Core Data Structures for the Dependency Index
//!
//! The persisted index is a JSON document (`generatedAt`, `root`, `stats`,
//! `nodes[]`). Unknown fields at any level are ignored so older binaries
//! can read indexes written by newer producers.
//!
//! @module trace/types

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::ErrorReport;

// =============================================================================
// SOURCE KIND
// =============================================================================

/// Category of a tracked source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Ts,
    Tsx,
    Js,
    Jsx,
    /// Anything a newer producer emits that this build does not know
    #[default]
    #[serde(other)]
    Other,
}

impl SourceKind {
    /// Detect kind from a file extension
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("ts") => Self::Ts,
            Some("tsx") => Self::Tsx,
            Some("js") | Some("mjs") | Some("cjs") => Self::Js,
            Some("jsx") => Self::Jsx,
            _ => Self::Other,
        }
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }
}

// =============================================================================
// SOURCE NODE
// =============================================================================

/// One tracked file and its outgoing import edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNode {
    /// Canonical `src/...` identifier
    pub id: String,
    /// Canonical ids this file imports, first occurrence order
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub kind: SourceKind,
    /// Last-modified time in milliseconds since the Unix epoch
    #[serde(default)]
    pub mtime: u64,
}

impl SourceNode {
    /// Create a node, dropping duplicate imports
    pub fn new(id: impl Into<String>, imports: Vec<String>, mtime: u64) -> Self {
        let id = id.into();
        let kind = SourceKind::from_path(&id);
        let mut node = Self {
            id,
            imports,
            kind,
            mtime,
        };
        node.dedup_imports();
        node
    }

    /// Remove repeated import entries, keeping the first of each
    pub fn dedup_imports(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.imports.retain(|import| seen.insert(import.clone()));
    }
}

// =============================================================================
// DEPENDENCY INDEX
// =============================================================================

/// Summary numbers for an index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexStats {
    /// Number of tracked files
    pub files: usize,
    /// Number of TypeScript files
    pub ts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// Age at the time the index was read (0 when freshly written)
    pub age_ms: u64,
}

/// The persisted module-dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyIndex {
    pub generated_at: DateTime<Utc>,
    /// Absolute path the index was built against
    pub root: PathBuf,
    #[serde(default)]
    pub stats: IndexStats,
    nodes: Vec<SourceNode>,
    /// Producer-specific metadata, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl DependencyIndex {
    /// Create an index from producer-supplied nodes
    pub fn new(root: impl Into<PathBuf>, nodes: Vec<SourceNode>) -> Self {
        let mut index = Self {
            generated_at: Utc::now(),
            root: root.into(),
            stats: IndexStats::default(),
            nodes,
            metadata: None,
            positions: HashMap::new(),
        };
        index.reindex();
        index.refresh_stats();
        index
    }

    /// Rebuild the id lookup table; the first node wins on duplicate ids
    pub(crate) fn reindex(&mut self) {
        self.positions.clear();
        for (pos, node) in self.nodes.iter_mut().enumerate() {
            node.dedup_imports();
            self.positions.entry(node.id.clone()).or_insert(pos);
        }
    }

    /// Order nodes by id so equal graphs serialize identically
    pub(crate) fn sort_nodes(&mut self) {
        self.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        self.reindex();
    }

    /// Recompute file counts from the node list
    pub(crate) fn refresh_stats(&mut self) {
        self.stats.files = self.nodes.len();
        self.stats.ts = self
            .nodes
            .iter()
            .filter(|n| n.kind.is_typescript())
            .count();
        self.stats.generated_at = Some(self.generated_at);
    }

    /// All nodes, in producer order
    pub fn nodes(&self) -> &[SourceNode] {
        &self.nodes
    }

    /// Look up a node by canonical id
    pub fn node(&self, id: &str) -> Option<&SourceNode> {
        self.positions.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Check whether an id is tracked
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// An import edge pointing outside the tracked set
    pub fn is_external(&self, id: &str) -> bool {
        !self.contains(id)
    }

    /// Age relative to `now` in milliseconds (clamped at zero)
    pub fn age_ms(&self, now: DateTime<Utc>) -> u64 {
        (now - self.generated_at).num_milliseconds().max(0) as u64
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// =============================================================================
// RESOLVER OUTPUT
// =============================================================================

/// One ranked resolver hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub path: String,
    pub score: u32,
    pub reason: String,
    pub mtime: u64,
}

// =============================================================================
// TRACE RESULT
// =============================================================================

/// Outcome category of a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    Ok,
    Ambiguous,
    Error,
}

/// Sizes of the three dependency sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepCounts {
    pub direct: usize,
    pub transitive: usize,
    pub reverse: usize,
}

/// The three dependency sets, as canonical ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepSets {
    pub direct: Vec<String>,
    pub transitive: Vec<String>,
    pub reverse: Vec<String>,
}

impl DepSets {
    pub fn counts(&self) -> DepCounts {
        DepCounts {
            direct: self.direct.len(),
            transitive: self.transitive.len(),
            reverse: self.reverse.len(),
        }
    }
}

/// Route that renders a traced component (filled in by route analyzers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRef {
    pub path: String,
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// Backend endpoint a traced component calls (filled in by API scanners)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRef {
    pub method: String,
    pub path: String,
    pub file: String,
    pub line: u32,
}

/// Result of one orchestrated trace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    /// Raw user input
    pub entry: String,
    pub resolved_path: String,
    pub status: TraceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
    pub counts: DepCounts,
    pub deps: DepSets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<ApiRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_references: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<RefactorPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

impl TraceResult {
    /// A resolved trace with its dependency sets
    pub fn resolved(entry: impl Into<String>, resolved_path: impl Into<String>, deps: DepSets) -> Self {
        Self {
            entry: entry.into(),
            resolved_path: resolved_path.into(),
            status: TraceStatus::Ok,
            candidates: None,
            counts: deps.counts(),
            deps,
            routes: None,
            api: None,
            component_references: None,
            plan: None,
            error: None,
        }
    }

    /// An unresolved trace listing the tied candidates
    pub fn ambiguous(entry: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            status: TraceStatus::Ambiguous,
            candidates: Some(candidates),
            ..Self::resolved(entry, String::new(), DepSets::default())
        }
    }

    /// A terminal failure
    pub fn failed(entry: impl Into<String>, error: ErrorReport) -> Self {
        Self {
            status: TraceStatus::Error,
            error: Some(error),
            ..Self::resolved(entry, String::new(), DepSets::default())
        }
    }

    /// Exit code a CLI should report for this result
    pub fn exit_code(&self) -> i32 {
        use crate::core::exit_codes::{EXIT_AMBIGUOUS, EXIT_RESOLVER_FAILED, EXIT_SUCCESS};
        match self.status {
            TraceStatus::Ok => EXIT_SUCCESS,
            TraceStatus::Ambiguous => EXIT_AMBIGUOUS,
            TraceStatus::Error => self
                .error
                .as_ref()
                .map(|e| e.code)
                .unwrap_or(EXIT_RESOLVER_FAILED),
        }
    }
}

// =============================================================================
// REFACTOR PLAN
// =============================================================================

/// A computed, unexecuted relocation proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorPlan {
    pub from: String,
    pub to: String,
    pub domain: String,
    pub slug: String,
    /// Number of files currently importing `from`
    pub import_updates: usize,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Component may be referenced from both admin and public surfaces
    #[serde(default)]
    pub mixed_usage: bool,
}

/// A relocation as executed by an external codemod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResult {
    #[serde(flatten)]
    pub plan: RefactorPlan,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub files_touched: Vec<String>,
}
