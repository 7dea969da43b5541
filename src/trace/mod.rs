//! Deptrace - Static Dependency Tracing and Refactor Planning
//!
//! This module answers, for a component-based source tree:
//! - what does a file import (directly and transitively)
//! - what imports it
//! - where should it live, and how many importers would a move touch
//!
//! It works from a persisted file-level dependency index; it never parses
//! source itself.
//!
//! @module trace

pub mod choices;
pub mod classify;
pub mod normalize;
pub mod output;
pub mod plan;
pub mod resolve;
pub mod storage;
pub mod tracer;
pub mod traverse;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Data Structures (types.rs)
// =============================================================================

pub use types::{
    ApiRef, Candidate, DepCounts, DepSets, DependencyIndex, IndexStats, RefactorPlan,
    RefactorResult, RouteRef, SourceKind, SourceNode, TraceResult, TraceStatus,
};

// =============================================================================
// RE-EXPORTS: Storage (storage.rs)
// =============================================================================

pub use storage::{
    default_index_path, get_index_info, read_index_or_throw, should_rebuild_index, write_index,
    IndexInfo,
};

// =============================================================================
// RE-EXPORTS: Resolution (normalize.rs, resolve.rs, choices.rs)
// =============================================================================

pub use choices::ChoiceCache;
pub use normalize::{candidate_key, normalize, validate_src_path, Normalized};
pub use resolve::{resolve, select, top_ties};

// =============================================================================
// RE-EXPORTS: Traversal (traverse.rs)
// =============================================================================

pub use traverse::{collect_deps, direct_imports, reverse_dependents, transitive_imports};

// =============================================================================
// RE-EXPORTS: Planning (classify.rs, plan.rs)
// =============================================================================

pub use classify::{classify, Classification, RuleTable, SlugRule};
pub use plan::Planner;

// =============================================================================
// RE-EXPORTS: Orchestration (tracer.rs)
// =============================================================================

pub use tracer::{TraceOutcome, TraceRequest, TraceStage, Tracer};

// =============================================================================
// RE-EXPORTS: Output (output/)
// =============================================================================

pub use output::{
    create_formatter, format_dependencies, IndexStatus, JsonFormatter, OutputFormat,
    PlainFormatter, TraceFormatter,
};
