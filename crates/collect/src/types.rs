//! Data types for the collect pass.

use fastcollect_fingerprint::{Algorithm, DEFAULT_BLOCK_SIZE};
use fastcollect_storage::LocalSource;
use serde::Serialize;

use crate::ignore::IgnorePatterns;

/// One static asset to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Path relative to the source root.
    pub local_path: String,
    /// Logical path in the remote store.
    pub remote_path: String,
}

impl CandidateFile {
    pub fn new(local_path: impl Into<String>, remote_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
        }
    }

    /// Builds a candidate for `relative`, placing it under `prefix` remotely.
    pub fn for_source(relative: &str, prefix: Option<&str>) -> Self {
        let remote_path = match prefix.map(|p| p.trim_matches('/')) {
            Some(p) if !p.is_empty() => format!("{p}/{relative}"),
            _ => relative.to_string(),
        };
        Self::new(relative, remote_path)
    }
}

/// A source directory and the remote prefix its files are published under.
#[derive(Debug, Clone)]
pub struct StaticSource {
    pub storage: LocalSource,
    pub prefix: Option<String>,
}

impl StaticSource {
    pub fn new(storage: LocalSource, prefix: Option<String>) -> Self {
        Self { storage, prefix }
    }
}

/// Change detector settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Compare content digests instead of modification times.
    pub enabled: bool,
    /// Digest the remote store's entity tags are computed with.
    pub algorithm: Algorithm,
    /// Read size when hashing local files.
    pub block_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            algorithm: Algorithm::Md5,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl DetectorConfig {
    /// Hash-based comparison with default algorithm and block size.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}

/// Options for one collect pass.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Log what would be copied without uploading anything.
    pub dry_run: bool,
    /// Files and directories to leave out.
    pub ignore: IgnorePatterns,
}

/// A copy that failed; the pass continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCopy {
    pub path: String,
    pub error: String,
}

/// Outcome of a collect pass, by remote path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectResult {
    pub copied: Vec<String>,
    pub unmodified: Vec<String>,
    pub failed: Vec<FailedCopy>,
}

impl CollectResult {
    /// Returns `true` if no copy failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary, e.g. `3 static files copied to 'bucket', 5 unmodified.`
    pub fn summary(&self, destination: &str) -> String {
        let count = self.copied.len();
        let plural = if count == 1 { "" } else { "s" };
        let mut line = format!("{count} static file{plural} copied to '{destination}'");
        if !self.unmodified.is_empty() {
            line.push_str(&format!(", {} unmodified", self.unmodified.len()));
        }
        if !self.failed.is_empty() {
            line.push_str(&format!(", {} failed", self.failed.len()));
        }
        line.push('.');
        line
    }
}
