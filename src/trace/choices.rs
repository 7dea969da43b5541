//! Remembered Disambiguation Choices
//!
//! When a reference is ambiguous and the user picks one of the tied
//! candidates, the pick is stored so the next trace of the same reference
//! against the same tie resolves without asking again.
//!
//! @module trace/choices

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::error::Result;
use crate::core::logger::Logger;

/// Persisted map of tie fingerprints to chosen paths
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChoiceCache {
    #[serde(skip)]
    path: PathBuf,
    choices: BTreeMap<String, StoredChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChoice {
    target: String,
    chosen: String,
}

impl ChoiceCache {
    /// Load choices from disk; a missing or unreadable file yields an empty cache
    pub fn load(path: &Path, logger: &dyn Logger) -> Self {
        let empty = || Self {
            path: path.to_path_buf(),
            choices: BTreeMap::new(),
        };

        if !path.exists() {
            return empty();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<ChoiceCache>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(mut cache) => {
                cache.path = path.to_path_buf();
                cache
            }
            Err(reason) => {
                let shown = path.display();
                logger.warn(
                    "ignoring unreadable choice cache",
                    &[("path", &shown), ("reason", &reason)],
                );
                empty()
            }
        }
    }

    /// Stable key for a reference and the exact set of tied paths
    fn key(target: &str, tied: &[String]) -> String {
        let mut paths: Vec<&str> = tied.iter().map(String::as_str).collect();
        paths.sort_unstable();
        let material = format!("{}\n{}", target, paths.join("\n"));
        format!("{:016x}", xxhash_rust::xxh3::xxh3_64(material.as_bytes()))
    }

    /// Previously chosen path, if it is still one of the tied candidates
    pub fn get(&self, target: &str, tied: &[String]) -> Option<&str> {
        self.choices
            .get(&Self::key(target, tied))
            .map(|stored| stored.chosen.as_str())
            .filter(|chosen| tied.iter().any(|t| t == chosen))
    }

    /// Record a pick for this tie
    pub fn remember(&mut self, target: &str, tied: &[String], chosen: &str) {
        self.choices.insert(
            Self::key(target, tied),
            StoredChoice {
                target: target.to_string(),
                chosen: chosen.to_string(),
            },
        );
    }

    /// Write choices to disk via temp file and rename
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let content = serde_json::to_vec_pretty(self)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&content)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Delete the cache file; returns whether one existed
    pub fn clear(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logger::testing::RecordingLogger;
    use crate::core::logger::{LogLevel, NullLogger};
    use tempfile::TempDir;

    fn tie() -> Vec<String> {
        vec!["src/a/Foo.tsx".to_string(), "src/b/Foo.tsx".to_string()]
    }

    #[test]
    fn test_remember_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".cache/deptrace/user-choices.json");

        let mut cache = ChoiceCache::load(&path, &NullLogger);
        assert!(cache.is_empty());
        cache.remember("Foo", &tie(), "src/b/Foo.tsx");
        cache.save().unwrap();

        let reloaded = ChoiceCache::load(&path, &NullLogger);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("Foo", &tie()), Some("src/b/Foo.tsx"));
    }

    #[test]
    fn test_key_ignores_tie_order() {
        let mut cache = ChoiceCache::default();
        cache.remember("Foo", &tie(), "src/a/Foo.tsx");

        let reversed: Vec<String> = tie().into_iter().rev().collect();
        assert_eq!(cache.get("Foo", &reversed), Some("src/a/Foo.tsx"));
    }

    #[test]
    fn test_changed_tie_invalidates_choice() {
        let mut cache = ChoiceCache::default();
        cache.remember("Foo", &tie(), "src/a/Foo.tsx");

        let mut grown = tie();
        grown.push("src/c/Foo.tsx".to_string());
        assert_eq!(cache.get("Foo", &grown), None);
        assert_eq!(cache.get("Bar", &tie()), None);
    }

    #[test]
    fn test_choice_outside_tie_ignored() {
        let mut cache = ChoiceCache::default();
        cache.remember("Foo", &tie(), "src/z/Foo.tsx");
        assert_eq!(cache.get("Foo", &tie()), None);
    }

    #[test]
    fn test_corrupt_file_warns_and_starts_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("user-choices.json");
        std::fs::write(&path, "{ nope").unwrap();

        let logger = RecordingLogger::default();
        let cache = ChoiceCache::load(&path, &logger);
        assert!(cache.is_empty());
        assert_eq!(logger.messages(LogLevel::Warn).len(), 1);
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cache");
        let path = dir.join("user-choices.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        let mut cache = ChoiceCache::load(&path, &NullLogger);
        assert!(cache.is_empty());
        cache.remember("Foo", &tie(), "src/a/Foo.tsx");
        cache.save().unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1, "no temp files left behind");
        let reloaded = ChoiceCache::load(&path, &NullLogger);
        assert_eq!(reloaded.get("Foo", &tie()), Some("src/a/Foo.tsx"));
    }

    #[test]
    fn test_clear() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("user-choices.json");

        let mut cache = ChoiceCache::load(&path, &NullLogger);
        cache.remember("Foo", &tie(), "src/a/Foo.tsx");
        cache.save().unwrap();

        assert!(ChoiceCache::clear(&path).unwrap());
        assert!(!path.exists());
        assert!(!ChoiceCache::clear(&path).unwrap());
    }
}
