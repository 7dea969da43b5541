//! Path Normalization
//!
//! Maps whatever a human typed (absolute path, partial path, bare file
//! name) onto the canonical `src/...` identifiers used as index keys, plus
//! a short candidate key for fuzzy lookup. Normalization never fails;
//! whether the result actually names a tracked file is for the resolver
//! to decide.
//!
//! @module trace/normalize

use std::path::Path;

use serde::Serialize;

/// Extensions stripped when deriving the candidate key
pub const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "cjs"];

/// Directory names that hold third-party code
const VENDORED_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Canonical anchor for tracked files
const SRC_PREFIX: &str = "src/";

/// Alternate anchor used for backend files
const SERVER_SRC_PREFIX: &str = "server/src/";

// =============================================================================
// TYPES
// =============================================================================

/// Best-effort canonical form of a user reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    /// Canonical `src/...` path
    pub normalized: String,
    /// File found on disk under the source root (a hint only)
    pub exists: bool,
    /// Basename without a recognized extension
    pub candidate: String,
    /// Input was a bare file name with no directory part
    pub bare: bool,
}

// =============================================================================
// NORMALIZE
// =============================================================================

/// Normalize `input` against `source_root`
pub fn normalize(input: &str, source_root: &Path) -> Normalized {
    let cleaned = input.trim().replace('\\', "/");

    let bare = !is_absolute(&cleaned) && !cleaned.contains('/');

    let (normalized, probe) = if is_absolute(&cleaned) {
        (reanchor_absolute(&cleaned), true)
    } else if cleaned.starts_with(SRC_PREFIX) {
        (cleaned, true)
    } else if bare {
        // Location unknown; the resolver searches by candidate key
        (format!("{}{}", SRC_PREFIX, cleaned), false)
    } else {
        let relative = cleaned.trim_start_matches("./");
        let anchored = if relative.starts_with(SRC_PREFIX) {
            relative.to_string()
        } else {
            format!("{}{}", SRC_PREFIX, relative)
        };
        (anchored, true)
    };

    let exists = probe && source_root.join(&normalized).exists();
    let candidate = candidate_key(&normalized);

    Normalized {
        normalized,
        exists,
        candidate,
        bare,
    }
}

/// Basename with any recognized source extension removed
pub fn candidate_key(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    strip_extension(base).to_string()
}

/// Drop a trailing recognized extension
pub fn strip_extension(name: &str) -> &str {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if SOURCE_EXTENSIONS.contains(&ext) && !stem.is_empty() {
            return stem;
        }
    }
    name
}

/// Check that a path may be used as a resolution or relocation target
///
/// Rejects parent-directory traversal, vendored dependency directories,
/// absolute paths, and anything outside the `src/` (or `server/src/`) roots.
pub fn validate_src_path(path: &str) -> bool {
    if path.is_empty() || is_absolute(path) {
        return false;
    }
    if !(path.starts_with(SRC_PREFIX) || path.starts_with(SERVER_SRC_PREFIX)) {
        return false;
    }
    path.split(['/', '\\'])
        .all(|segment| segment != ".." && !VENDORED_DIRS.contains(&segment))
}

// =============================================================================
// HELPERS
// =============================================================================

fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    // Windows drive letter, e.g. C:/repo
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Strip deployment prefix segments up to and including the first `src/`
fn reanchor_absolute(path: &str) -> String {
    if let Some(pos) = path.find("/src/") {
        return format!("{}{}", SRC_PREFIX, &path[pos + "/src/".len()..]);
    }

    let without_drive = if path.as_bytes().get(1) == Some(&b':') {
        &path[2..]
    } else {
        path
    };
    let remainder = without_drive.trim_start_matches('/');
    format!("{}{}", SRC_PREFIX, remainder)
}
