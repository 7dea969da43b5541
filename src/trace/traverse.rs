//! Graph Traversal Algorithms
//!
//! Navigates the import graph of a dependency index:
//! - direct imports (one hop)
//! - transitive closure (BFS, cycle safe, optionally depth bounded)
//! - reverse dependents (who imports a file)
//!
//! Ids that are imported but not tracked (packages, generated files) are
//! reported as dependencies but never expanded.
//!
//! @module trace/traverse

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::types::{DependencyIndex, DepSets};

// =============================================================================
// DIRECT
// =============================================================================

/// Ids `id` imports directly, in import order
///
/// Returns an empty list for untracked ids.
pub fn direct_imports(index: &DependencyIndex, id: &str) -> Vec<String> {
    match index.node(id) {
        Some(node) => {
            let mut seen = HashSet::new();
            node.imports
                .iter()
                .filter(|import| seen.insert(import.as_str()))
                .cloned()
                .collect()
        }
        None => Vec::new(),
    }
}

// =============================================================================
// TRANSITIVE
// =============================================================================

/// Every id reachable from `id` through imports, in discovery order
///
/// `id` itself is never part of the result, even when a cycle leads back
/// to it. With `max_depth = Some(n)` only ids at most `n` hops away are
/// collected; `Some(0)` yields nothing.
pub fn transitive_imports(
    index: &DependencyIndex,
    id: &str,
    max_depth: Option<usize>,
) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order: Vec<String> = Vec::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();

    visited.insert(id);
    queue.push_back((id, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|limit| depth >= limit) {
            continue;
        }

        // Unknown start id
        let node = match index.node(current) {
            Some(n) => n,
            None => continue,
        };

        for import in &node.imports {
            if visited.insert(import.as_str()) {
                order.push(import.clone());
                // External ids are listed but not expanded
                if !index.is_external(import) {
                    queue.push_back((import.as_str(), depth + 1));
                }
            }
        }
    }

    order
}

// =============================================================================
// REVERSE
// =============================================================================

/// Tracked ids whose imports contain `id`, sorted
pub fn reverse_dependents(index: &DependencyIndex, id: &str) -> Vec<String> {
    let dependents: BTreeSet<&str> = index
        .nodes()
        .iter()
        .filter(|node| node.id != id && node.imports.iter().any(|import| import == id))
        .map(|node| node.id.as_str())
        .collect();

    dependents.into_iter().map(String::from).collect()
}

/// All three dependency sets for one resolved id
pub fn collect_deps(index: &DependencyIndex, id: &str, max_depth: Option<usize>) -> DepSets {
    DepSets {
        direct: direct_imports(index, id),
        transitive: transitive_imports(index, id, max_depth),
        reverse: reverse_dependents(index, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::types::SourceNode;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyIndex {
        DependencyIndex::new(
            "/work",
            edges
                .iter()
                .map(|(id, imports)| {
                    SourceNode::new(*id, imports.iter().map(|s| s.to_string()).collect(), 0)
                })
                .collect(),
        )
    }

    #[test]
    fn test_cycle_terminates_and_excludes_start() {
        let index = graph(&[
            ("src/A.ts", &["src/B.ts"]),
            ("src/B.ts", &["src/C.ts"]),
            ("src/C.ts", &["src/A.ts"]),
        ]);
        let closure = transitive_imports(&index, "src/A.ts", None);
        assert_eq!(closure, vec!["src/B.ts", "src/C.ts"]);
    }

    #[test]
    fn test_reverse_dependents_sorted() {
        let index = graph(&[
            ("src/C.ts", &["src/B.ts"]),
            ("src/A.ts", &["src/B.ts"]),
            ("src/B.ts", &[]),
        ]);
        assert_eq!(
            reverse_dependents(&index, "src/B.ts"),
            vec!["src/A.ts", "src/C.ts"]
        );
        assert!(reverse_dependents(&index, "src/A.ts").is_empty());
    }

    #[test]
    fn test_direct_is_one_hop() {
        let index = graph(&[
            ("src/A.ts", &["src/B.ts", "react"]),
            ("src/B.ts", &["src/C.ts"]),
            ("src/C.ts", &[]),
        ]);
        assert_eq!(direct_imports(&index, "src/A.ts"), vec!["src/B.ts", "react"]);
        assert!(direct_imports(&index, "src/Missing.ts").is_empty());
    }

    #[test]
    fn test_external_ids_reported_not_expanded() {
        let index = graph(&[
            ("src/A.ts", &["lodash", "src/B.ts"]),
            ("src/B.ts", &["lodash", "src/gen/api.ts"]),
        ]);
        let closure = transitive_imports(&index, "src/A.ts", None);
        assert_eq!(closure, vec!["lodash", "src/B.ts", "src/gen/api.ts"]);
    }

    #[test]
    fn test_depth_bound() {
        let index = graph(&[
            ("src/A.ts", &["src/B.ts"]),
            ("src/B.ts", &["src/C.ts"]),
            ("src/C.ts", &["src/D.ts"]),
            ("src/D.ts", &[]),
        ]);
        assert!(transitive_imports(&index, "src/A.ts", Some(0)).is_empty());
        assert_eq!(transitive_imports(&index, "src/A.ts", Some(1)), vec!["src/B.ts"]);
        assert_eq!(
            transitive_imports(&index, "src/A.ts", Some(2)),
            vec!["src/B.ts", "src/C.ts"]
        );
        assert_eq!(transitive_imports(&index, "src/A.ts", None).len(), 3);
    }

    #[test]
    fn test_direct_subset_of_transitive() {
        let index = graph(&[
            ("src/A.ts", &["src/B.ts", "src/C.ts"]),
            ("src/B.ts", &["src/C.ts", "src/D.ts"]),
            ("src/C.ts", &["src/A.ts"]),
            ("src/D.ts", &[]),
        ]);
        let deps = collect_deps(&index, "src/A.ts", None);
        for id in &deps.direct {
            assert!(deps.transitive.contains(id));
        }
        assert!(!deps.transitive.contains(&"src/A.ts".to_string()));
        assert_eq!(deps.reverse, vec!["src/C.ts"]);
        assert_eq!(deps.counts().transitive, 3);
    }
}
