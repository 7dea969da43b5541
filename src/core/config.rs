//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tool token used in cache paths under the tracked root
pub const TOOL_NAME: &str = "deptrace";

/// Default staleness threshold: 12 hours
pub const DEFAULT_MAX_AGE_MS: u64 = 12 * 60 * 60 * 1000;

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub timeouts: TimeoutConfig,
    pub resolver: ResolverConfig,
    pub planner: PlannerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum index age before it is rejected (milliseconds)
    pub max_age_ms: u64,
    /// Explicit index location (defaults to `.cache/deptrace/file-deps.json`)
    pub path: Option<PathBuf>,
    /// Depth bound for transitive closure (unbounded when absent)
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for reading the persisted index (0 disables)
    pub index_read_ms: u64,
    /// Deadline for the normalizer's existence probe (0 disables)
    pub normalize_ms: u64,
    /// Deadline for a whole trace invocation (0 disables)
    pub trace_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Select the first candidate instead of reporting ambiguity
    pub pick_first: bool,
    /// Reuse previously recorded disambiguation choices
    pub remember_choices: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Block plans that carry a mixed-usage risk
    pub strict: bool,
    /// Root directory for relocated components
    pub components_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Maximum list entries in human output (0 = unlimited)
    pub max_items: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            path: None,
            max_depth: None,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            index_read_ms: 30_000,
            normalize_ms: 5_000,
            trace_ms: 60_000,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pick_first: false,
            remember_choices: true,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strict: false,
            components_dir: "src/components".to_string(),
        }
    }
}

impl TimeoutConfig {
    pub fn index_read(&self) -> Duration {
        Duration::from_millis(self.index_read_ms)
    }

    pub fn normalize(&self) -> Duration {
        Duration::from_millis(self.normalize_ms)
    }

    pub fn trace(&self) -> Duration {
        Duration::from_millis(self.trace_ms)
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every query fail
    pub fn validate(&self) -> Result<()> {
        if self.planner.components_dir.trim().is_empty() {
            return Err(Error::Config {
                message: "planner.components_dir must not be empty".to_string(),
            });
        }
        if !self.planner.components_dir.starts_with("src/") {
            return Err(Error::Config {
                message: format!(
                    "planner.components_dir must live under src/: {}",
                    self.planner.components_dir
                ),
            });
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::deptrace_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the deptrace home directory
    pub fn deptrace_home() -> Result<PathBuf> {
        // Check DEPTRACE_HOME env var first
        if let Ok(home) = std::env::var("DEPTRACE_HOME") {
            return Ok(PathBuf::from(home));
        }

        // Use XDG directories
        ProjectDirs::from("dev", TOOL_NAME, TOOL_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::Config {
                message: "Could not determine deptrace home directory".to_string(),
            })
    }

    /// Cache directory under a tracked root
    pub fn cache_dir(root: &Path) -> PathBuf {
        root.join(".cache").join(TOOL_NAME)
    }

    /// Index location for a tracked root, honouring `index.path`
    pub fn index_path(&self, root: &Path) -> PathBuf {
        match &self.index.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => root.join(path),
            None => crate::trace::storage::default_index_path(root),
        }
    }

    /// Remembered disambiguation choices for a tracked root
    pub fn choices_path(root: &Path) -> PathBuf {
        Self::cache_dir(root).join("user-choices.json")
    }
}
