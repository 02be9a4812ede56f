//! Source storage rooted at a local directory.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{StorageError, StorageResult};
use crate::traits::SourceStorage;
use crate::validation::validate_key;
use crate::walk::walk_files;

/// Static files read from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the source root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full filesystem path for a relative source path.
    pub fn path(&self, path: &str) -> StorageResult<PathBuf> {
        validate_key(path)?;
        Ok(self.root.join(path))
    }

    /// Lists every file under the root as sorted `/`-separated paths.
    ///
    /// `keep(relative, is_dir)` filters entries; rejected directories are
    /// skipped entirely. Fails if the root does not exist.
    pub fn list_files<F>(&self, keep: F) -> StorageResult<Vec<String>>
    where
        F: FnMut(&str, bool) -> bool,
    {
        if !self.root.is_dir() {
            return Err(StorageError::NotFound(self.root.display().to_string()));
        }
        Ok(walk_files(&self.root, keep)?)
    }
}

impl SourceStorage for LocalSource {
    fn open(&self, path: &str) -> StorageResult<Box<dyn Read + '_>> {
        let full = self.path(path)?;
        let file = std::fs::File::open(&full).map_err(|e| StorageError::from_io(e, path))?;
        Ok(Box::new(file))
    }

    fn modified_time(&self, path: &str) -> StorageResult<DateTime<Utc>> {
        let full = self.path(path)?;
        let metadata = std::fs::metadata(&full).map_err(|e| StorageError::from_io(e, path))?;
        Ok(DateTime::<Utc>::from(metadata.modified()?))
    }
}
