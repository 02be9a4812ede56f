//! Collect configuration.
//!
//! Configuration is stored as TOML, by default in `fastcollect.toml` in the
//! working directory. Relative paths are resolved against the working
//! directory. A missing default file means "use defaults"; a file named
//! explicitly with `--config` must exist.

use std::path::{Path, PathBuf};

use anyhow::Context;
use fastcollect_fingerprint::{Algorithm, DEFAULT_BLOCK_SIZE};
use fastcollect_storage::BackendKind;
use serde::{Deserialize, Serialize};

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "fastcollect.toml";

/// Largest accepted `block_size`. Each hash allocates one block.
pub const MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;

/// Environment variable overriding `fast_collect`.
pub const FAST_COLLECT_ENV: &str = "FAST_COLLECT";

/// Collect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Compare content digests instead of modification times.
    #[serde(default)]
    pub fast_collect: bool,

    /// Digest the destination's entity tags use.
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Read size when hashing local files. `0` means the default, values
    /// above [`MAX_BLOCK_SIZE`] are rejected.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Log what would be copied without uploading.
    #[serde(default)]
    pub dry_run: bool,

    /// Extra gitignore-style patterns to skip.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Also skip `CVS`, dotfiles and `*~` backups.
    #[serde(default = "default_true")]
    pub use_default_ignore_patterns: bool,

    /// Source directories, in priority order.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    #[serde(default)]
    pub destination: DestinationConfig,
}

/// One source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,

    /// Remote prefix for every file in this source.
    #[serde(default)]
    pub prefix: Option<String>,
}

/// The bucket files are published into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Directory holding the bucket's objects.
    #[serde(default = "default_destination_root")]
    pub root: PathBuf,

    /// Load the whole metadata index up front.
    #[serde(default)]
    pub preload_metadata: bool,

    /// Path convention for index keys.
    #[serde(default)]
    pub backend: BackendKind,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_true() -> bool {
    true
}

fn default_destination_root() -> PathBuf {
    PathBuf::from("staticfiles")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast_collect: false,
            algorithm: Algorithm::default(),
            block_size: default_block_size(),
            dry_run: false,
            ignore_patterns: Vec::new(),
            use_default_ignore_patterns: default_true(),
            sources: Vec::new(),
            destination: DestinationConfig::default(),
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            root: default_destination_root(),
            preload_metadata: false,
            backend: BackendKind::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from [`DEFAULT_CONFIG_PATH`].
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks values serde cannot bound.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.block_size > MAX_BLOCK_SIZE {
            anyhow::bail!(
                "block_size {} exceeds the {} byte limit",
                self.block_size,
                MAX_BLOCK_SIZE
            );
        }
        Ok(())
    }

    /// Applies the `FAST_COLLECT` environment value, if any.
    ///
    /// Unrecognized values are logged and ignored.
    pub fn apply_env_override(&mut self, value: Option<&str>) {
        let Some(raw) = value else {
            return;
        };
        match parse_flag(raw) {
            Some(enabled) => {
                tracing::debug!(enabled, "fast collect set from environment");
                self.fast_collect = enabled;
            }
            None => {
                tracing::warn!(value = raw, "ignoring unrecognized {FAST_COLLECT_ENV} value");
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
