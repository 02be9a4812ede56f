//! Path conventions used to key a store's metadata index.
//!
//! A lookup in the index only succeeds when the caller builds the key exactly
//! the way the store did when it loaded the index, so the convention is
//! declared by the store instead of being inferred from its shape.

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// How a remote store turns a logical path into an index key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendKind {
    /// Keys live under `location`: `safe_join(location, clean_name(path))`.
    LocationPrefixed {
        #[serde(default)]
        location: String,
    },
    /// Keys are bucket-relative: `clean_name(path)`.
    #[default]
    BucketRoot,
    /// Convention not known. Keys are guessed as `location/path`.
    Unknown {
        #[serde(default)]
        location: String,
    },
}

impl BackendKind {
    /// Translates a logical path into an index key.
    pub fn normalize(&self, path: &str) -> StorageResult<String> {
        match self {
            BackendKind::LocationPrefixed { location } => safe_join(location, &clean_name(path)),
            BackendKind::BucketRoot => Ok(clean_name(path)),
            BackendKind::Unknown { location } => Ok(guess_join(location, path)),
        }
    }

    /// Returns `true` for the fallback convention.
    pub fn is_unknown(&self) -> bool {
        matches!(self, BackendKind::Unknown { .. })
    }

    /// Key prefix the convention places objects under, if any.
    pub fn location(&self) -> &str {
        match self {
            BackendKind::LocationPrefixed { location } | BackendKind::Unknown { location } => {
                location
            }
            BackendKind::BucketRoot => "",
        }
    }
}

/// Cleans a path into a bucket key.
///
/// Backslashes become `/`, `.` / `..` / repeated separators are collapsed,
/// and a trailing `/` on the input is kept. A path that collapses to `.`
/// yields the empty key.
pub fn clean_name(name: &str) -> String {
    let slashed = name.replace('\\', "/");
    let mut clean = normpath(&slashed);
    if clean == "." {
        return String::new();
    }
    if slashed.ends_with('/') && !clean.ends_with('/') {
        clean.push('/');
    }
    clean
}

/// Joins `path` under `base`, refusing results outside of `base`.
///
/// The returned key never starts with `/`. An absolute `path` replaces the
/// base entirely and therefore only succeeds when `base` is empty.
pub fn safe_join(base: &str, path: &str) -> StorageResult<String> {
    let base = base.trim_end_matches('/');
    let start = format!("{base}/");

    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{start}{path}")
    };

    let mut final_path = normpath(&joined);
    if path.ends_with('/') || format!("{final_path}/") == start {
        final_path.push('/');
    }
    if final_path == base {
        final_path.push('/');
    }

    let inside = final_path.starts_with(base) && final_path[base.len()..].starts_with('/');
    if !inside {
        return Err(StorageError::InvalidPath(format!(
            "{path} is located outside of {base:?}"
        )));
    }

    Ok(final_path.trim_start_matches('/').to_string())
}

/// Best-effort `location/path` join for stores with an unknown convention.
pub fn guess_join(location: &str, path: &str) -> String {
    if path.starts_with('/') || location.is_empty() {
        path.to_string()
    } else if location.ends_with('/') {
        format!("{location}{path}")
    } else {
        format!("{location}/{path}")
    }
}

/// Lexical POSIX path normalization.
fn normpath(path: &str) -> String {
    if path.is_empty() {
        return ".".into();
    }

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".into()
    } else {
        joined
    }
}
