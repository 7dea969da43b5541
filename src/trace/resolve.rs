//! Candidate Resolution
//!
//! Scores every index node against a normalized reference and ranks the
//! hits. Each node is scored once, at its best tier:
//!
//! | tier | match                                   | score |
//! |------|-----------------------------------------|-------|
//! | 1    | exact canonical id (not for bare names) | 100   |
//! | 2    | reference is a trailing path segment    | 75    |
//! | 3    | candidate key equals node basename      | 50    |
//! | 4    | candidate key is a substring of basename| 25    |
//!
//! Ordering is score descending, then path ascending, so repeated calls on
//! the same index always produce the same list.
//!
//! @module trace/resolve

use super::normalize::{candidate_key, strip_extension, validate_src_path, Normalized};
use super::types::{Candidate, DependencyIndex, SourceNode};
use crate::core::error::{Error, Result};

// =============================================================================
// SCORES
// =============================================================================

pub const SCORE_EXACT: u32 = 100;
pub const SCORE_SUFFIX: u32 = 75;
pub const SCORE_BASENAME: u32 = 50;
pub const SCORE_SUBSTRING: u32 = 25;

// =============================================================================
// RESOLVE
// =============================================================================

/// Rank index nodes matching `reference`
pub fn resolve(reference: &Normalized, index: &DependencyIndex) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = index
        .nodes()
        .iter()
        .filter(|node| validate_src_path(&node.id))
        .filter_map(|node| {
            score_node(reference, node).map(|(score, reason)| Candidate {
                path: node.id.clone(),
                score,
                reason: reason.to_string(),
                mtime: node.mtime,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    candidates.dedup_by(|a, b| a.path == b.path);
    candidates
}

/// Best tier a node reaches for `reference`, if any
fn score_node(reference: &Normalized, node: &SourceNode) -> Option<(u32, &'static str)> {
    let wanted = reference.normalized.as_str();
    let id = node.id.as_str();

    // A bare name carries no location, so its `src/` id is not a real path
    if !reference.bare {
        if id == wanted {
            return Some((SCORE_EXACT, "exact path match"));
        }
        if strip_extension(id) == wanted {
            return Some((SCORE_EXACT, "exact path match (extension inferred)"));
        }
    }

    let relative = wanted.strip_prefix("src/").unwrap_or(wanted);
    if relative.contains('/') || relative.contains('.') {
        let suffix = format!("/{}", relative);
        if id.ends_with(&suffix) || strip_extension(id).ends_with(&suffix) {
            return Some((SCORE_SUFFIX, "path suffix match"));
        }
    }

    let key = reference.candidate.as_str();
    if key.is_empty() {
        return None;
    }

    let basename = candidate_key(id);
    if basename == key {
        return Some((SCORE_BASENAME, "filename match"));
    }
    if basename.to_lowercase().contains(&key.to_lowercase()) {
        return Some((SCORE_SUBSTRING, "partial filename match"));
    }

    None
}

// =============================================================================
// DISAMBIGUATION
// =============================================================================

/// Leading candidates sharing the highest score
pub fn top_ties(candidates: &[Candidate]) -> &[Candidate] {
    match candidates.first() {
        Some(best) => {
            let n = candidates
                .iter()
                .take_while(|c| c.score == best.score)
                .count();
            &candidates[..n]
        }
        None => &[],
    }
}

/// Pick one candidate or explain why not
///
/// Zero candidates fail with `ResolverFailed`. A tie at the top score
/// fails with `AmbiguousTarget` unless `pick_first` is set, in which case
/// the first candidate by score then path wins.
pub fn select(target: &str, candidates: &[Candidate], pick_first: bool) -> Result<Candidate> {
    let ties = top_ties(candidates);
    match ties {
        [] => Err(Error::ResolverFailed {
            target: target.to_string(),
        }),
        [only] => Ok(only.clone()),
        [first, ..] if pick_first => Ok(first.clone()),
        _ => Err(Error::AmbiguousTarget {
            target: target.to_string(),
            candidates: ties.iter().map(|c| c.path.clone()).collect(),
        }),
    }
}
