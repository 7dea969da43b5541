//! Dependency Index Storage
//!
//! Reads and writes the persisted JSON index. Two read paths exist:
//! - [`read_index_or_throw`] validates required fields and freshness and
//!   fails with a typed error; scripted callers rely on it.
//! - [`get_index_info`] is a tolerant probe that never fails; interactive
//!   callers use it to decide whether a rebuild is due.
//!
//! Writes go to a temporary file in the destination directory which is
//! then renamed over the target, so an abandoned or concurrent write never
//! leaves a truncated index behind. Concurrent writers: last rename wins.
//!
//! @module trace/storage

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::types::{DependencyIndex, IndexStats};
use crate::core::config::{Config, DEFAULT_MAX_AGE_MS};
use crate::core::error::{Error, Result};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Index file name inside the cache directory
pub const INDEX_FILE_NAME: &str = "file-deps.json";

/// Default staleness threshold
pub const DEFAULT_MAX_AGE: Duration = Duration::from_millis(DEFAULT_MAX_AGE_MS);

/// Default index location for a tracked root
pub fn default_index_path(root: &Path) -> PathBuf {
    Config::cache_dir(root).join(INDEX_FILE_NAME)
}

// =============================================================================
// VALIDATED READ
// =============================================================================

/// Read and validate the index at `path`
///
/// Fails with `IndexMissing` when no file exists, `IndexCorrupt` when the
/// document cannot be parsed or lacks `generatedAt`/`root`/`nodes`, and
/// `IndexStale` when it is older than `max_age`.
pub fn read_index_or_throw(path: impl AsRef<Path>, max_age: Duration) -> Result<DependencyIndex> {
    read_index_at(path.as_ref(), max_age, Utc::now())
}

/// [`read_index_or_throw`] against an explicit clock
pub fn read_index_at(path: &Path, max_age: Duration, now: DateTime<Utc>) -> Result<DependencyIndex> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::IndexMissing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(Error::IndexCorrupt {
                path: path.to_path_buf(),
                message: format!("unreadable: {}", e),
            })
        }
    };

    let mut index: DependencyIndex =
        serde_json::from_str(&content).map_err(|e| Error::IndexCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let age_ms = index.age_ms(now);
    let max_age_ms = max_age.as_millis() as u64;
    if age_ms > max_age_ms {
        return Err(Error::IndexStale {
            path: path.to_path_buf(),
            age_ms,
            max_age_ms,
        });
    }

    index.reindex();
    index.refresh_stats();
    index.stats.age_ms = age_ms;
    Ok(index)
}

// =============================================================================
// WRITE
// =============================================================================

/// Persist `index` to `path`
///
/// Stamps `generated_at` with the current time, sorts nodes by id so equal
/// graphs serialize identically, and replaces the destination atomically.
pub fn write_index(index: &mut DependencyIndex, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let write_failed = |source: io::Error| Error::IndexWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    index.generated_at = Utc::now();
    index.sort_nodes();
    index.refresh_stats();
    index.stats.age_ms = 0;

    let bytes = serde_json::to_vec_pretty(&*index)
        .map_err(|e| write_failed(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_failed)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(&bytes).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    Ok(())
}

// =============================================================================
// TOLERANT PROBE
// =============================================================================

/// Cheap summary of an index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub path: PathBuf,
    pub age_ms: u64,
    /// Number of tracked files
    pub files: usize,
    /// Number of TypeScript files
    pub ts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Only the fields the probe needs; node bodies are skipped unparsed
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexHeader {
    generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    stats: Option<IndexStats>,
    #[serde(default)]
    nodes: Option<Vec<IgnoredAny>>,
}

/// Probe the index at `path`; `None` when absent or unreadable
pub fn get_index_info(path: impl AsRef<Path>) -> Option<IndexInfo> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).ok()?;
    let header: IndexHeader = serde_json::from_str(&content).ok()?;

    let now = Utc::now();
    let age_ms = match header.generated_at {
        Some(ts) => (now - ts).num_milliseconds().max(0) as u64,
        None => {
            let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
            let modified: DateTime<Utc> = modified.into();
            (now - modified).num_milliseconds().max(0) as u64
        }
    };

    let stats = header.stats.unwrap_or_default();
    let files = header.nodes.map(|n| n.len()).unwrap_or(stats.files);

    Some(IndexInfo {
        path: path.to_path_buf(),
        age_ms,
        files,
        ts: stats.ts,
        generated_at: header.generated_at,
    })
}

/// True when the index is absent, unreadable, or older than `max_age`
pub fn should_rebuild_index(path: impl AsRef<Path>, max_age: Duration) -> bool {
    match get_index_info(path) {
        Some(info) => info.age_ms > max_age.as_millis() as u64,
        None => true,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exit_codes::EXIT_INDEX_FAILED;
    use crate::trace::types::SourceNode;
    use chrono::Duration as ChronoDuration;
    use tempfile::tempdir;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn create_test_index() -> DependencyIndex {
        DependencyIndex::new(
            "/work/front-end",
            vec![
                SourceNode::new(
                    "src/App.tsx",
                    vec!["src/routes/Router.tsx".into(), "react".into()],
                    1_700_000_000_000,
                ),
                SourceNode::new("src/routes/Router.tsx", vec!["src/views/Home.jsx".into()], 0),
                SourceNode::new("src/views/Home.jsx", vec![], 0),
            ],
        )
    }

    fn write_raw(path: &Path, generated_at: DateTime<Utc>) {
        let json = serde_json::json!({
            "generatedAt": generated_at,
            "root": "/work",
            "stats": {"files": 1, "ts": 1, "ageMs": 0},
            "nodes": [{"id": "src/a.ts", "imports": [], "kind": "ts", "mtime": 0}]
        });
        fs::write(path, serde_json::to_string(&json).unwrap()).unwrap();
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".cache/deptrace/file-deps.json");

        let mut original = create_test_index();
        write_index(&mut original, &path).unwrap();

        let loaded = read_index_or_throw(&path, 24 * HOUR).unwrap();
        assert_eq!(loaded.len(), original.len());
        for node in original.nodes() {
            let other = loaded.node(&node.id).expect("node survives roundtrip");
            assert_eq!(other.imports, node.imports);
        }
        assert_eq!(loaded.stats.files, 3);
        assert_eq!(loaded.stats.ts, 2);
        assert_eq!(loaded.root, PathBuf::from("/work/front-end"));
    }

    #[test]
    fn test_write_stamps_generated_at() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");

        let mut index = create_test_index();
        index.generated_at = Utc::now() - ChronoDuration::days(30);
        write_index(&mut index, &path).unwrap();

        assert!(index.age_ms(Utc::now()) < 60_000);
        assert!(read_index_or_throw(&path, HOUR).is_ok());
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");

        let mut first = create_test_index();
        write_index(&mut first, &a).unwrap();
        let mut second = first.clone();
        write_index(&mut second, &b).unwrap();

        let a_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&a).unwrap()).unwrap();
        let b_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&b).unwrap()).unwrap();
        assert_eq!(a_json["nodes"], b_json["nodes"]);
        assert_eq!(a_json["nodes"][0]["id"], "src/App.tsx");
    }

    #[test]
    fn test_missing_index() {
        let dir = tempdir().unwrap();
        let err = read_index_or_throw(dir.path().join("nope.json"), HOUR).unwrap_err();
        assert!(matches!(err, Error::IndexMissing { .. }));
        assert_eq!(err.exit_code(), EXIT_INDEX_FAILED);
    }

    #[test]
    fn test_corrupt_index_missing_nodes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        fs::write(&path, r#"{"generatedAt": "2026-01-01T00:00:00Z", "root": "/w"}"#).unwrap();

        match read_index_or_throw(&path, HOUR).unwrap_err() {
            Error::IndexCorrupt { message, .. } => assert!(message.contains("nodes")),
            other => panic!("expected IndexCorrupt, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_index_not_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_index_or_throw(&path, HOUR),
            Err(Error::IndexCorrupt { .. })
        ));
    }

    #[test]
    fn test_stale_index_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        write_raw(&path, Utc::now() - ChronoDuration::hours(13));

        let err = read_index_or_throw(&path, DEFAULT_MAX_AGE).unwrap_err();
        assert!(matches!(err, Error::IndexStale { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_freshness_threshold_is_monotonic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        let generated = Utc::now() - ChronoDuration::hours(2);
        write_raw(&path, generated);

        let now = generated + ChronoDuration::hours(2);
        let age = Duration::from_secs(2 * 60 * 60);

        assert!(read_index_at(&path, age, now).is_ok());
        assert!(read_index_at(&path, age + HOUR, now).is_ok());
        for smaller in [age - Duration::from_millis(1), HOUR, Duration::ZERO] {
            assert!(matches!(
                read_index_at(&path, smaller, now),
                Err(Error::IndexStale { .. })
            ));
        }
    }

    #[test]
    fn test_age_recorded_in_stats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        let generated = Utc::now() - ChronoDuration::minutes(5);
        write_raw(&path, generated);

        let now = generated + ChronoDuration::minutes(5);
        let index = read_index_at(&path, HOUR, now).unwrap();
        assert_eq!(index.stats.age_ms, 5 * 60 * 1000);
    }

    #[test]
    fn test_index_info_probe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        assert!(get_index_info(&path).is_none());

        fs::write(&path, "garbage").unwrap();
        assert!(get_index_info(&path).is_none());

        let mut index = create_test_index();
        write_index(&mut index, &path).unwrap();
        let info = get_index_info(&path).unwrap();
        assert_eq!(info.files, 3);
        assert_eq!(info.ts, 2);
        assert!(info.age_ms < 60_000);
    }

    #[test]
    fn test_index_info_tolerates_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        fs::write(&path, r#"{"nodes": [{}, {}]}"#).unwrap();

        let info = get_index_info(&path).unwrap();
        assert_eq!(info.files, 2);
        assert!(info.generated_at.is_none());
    }

    #[test]
    fn test_should_rebuild_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deps.json");
        assert!(should_rebuild_index(&path, HOUR));

        write_raw(&path, Utc::now() - ChronoDuration::hours(3));
        assert!(should_rebuild_index(&path, HOUR));
        assert!(!should_rebuild_index(&path, 4 * HOUR));
    }

    #[test]
    fn test_default_index_path() {
        assert_eq!(
            default_index_path(Path::new("/repo")),
            PathBuf::from("/repo/.cache/deptrace/file-deps.json")
        );
    }
}
