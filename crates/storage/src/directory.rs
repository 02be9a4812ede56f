//! A local directory acting as the bucket.
//!
//! Objects live at `root/<key>`. Entity tags are the quoted content digest,
//! computed when the index is loaded or an object is saved.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use fastcollect_fingerprint::{Algorithm, DEFAULT_BLOCK_SIZE, hash_file};
use tracing::{debug, info, warn};

use crate::convention::BackendKind;
use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectEntry, RemoteStore};
use crate::validation::validate_key;
use crate::walk::walk_files;
use crate::{read, write};

/// Directory-backed remote store.
pub struct DirectoryStore {
    root: PathBuf,
    kind: BackendKind,
    algorithm: Algorithm,
    block_size: usize,
    preload: AtomicBool,
    index: RwLock<Option<HashMap<String, ObjectEntry>>>,
    index_loads: AtomicUsize,
    index_failed: AtomicBool,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>, kind: BackendKind) -> Self {
        Self {
            root: root.into(),
            kind,
            algorithm: Algorithm::Md5,
            block_size: DEFAULT_BLOCK_SIZE,
            preload: AtomicBool::new(false),
            index: RwLock::new(None),
            index_loads: AtomicUsize::new(0),
            index_failed: AtomicBool::new(false),
        }
    }

    /// Sets the digest used for entity tags.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the block size used when hashing stored objects.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets whether metadata is bulk-loaded.
    pub fn with_preload(self, enabled: bool) -> Self {
        self.preload.store(enabled, Ordering::SeqCst);
        self
    }

    /// Returns the bucket root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// How many times loading the full index was attempted.
    pub fn index_loads(&self) -> usize {
        self.index_loads.load(Ordering::SeqCst)
    }

    fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Reads one object's metadata from disk.
    fn stat_entry(&self, key: &str) -> StorageResult<Option<ObjectEntry>> {
        let path = self.object_path(key)?;
        let metadata = match std::fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let fingerprint = hash_file(&path, self.algorithm, self.block_size)?;
        Ok(Some(ObjectEntry {
            key: key.to_string(),
            size: metadata.len(),
            etag: Some(fingerprint.to_etag()),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }))
    }

    fn load_index(&self) -> StorageResult<HashMap<String, ObjectEntry>> {
        self.index_loads.fetch_add(1, Ordering::SeqCst);
        let keys = walk_files(&self.root, |_, _| true)?;
        let mut index = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = self.stat_entry(&key)? {
                index.insert(key, entry);
            }
        }
        info!(
            root = %self.root.display(),
            objects = index.len(),
            "loaded bucket metadata index"
        );
        Ok(index)
    }

    /// Runs `f` against the loaded index, loading it first if needed.
    ///
    /// Returns `None` when preloading is off or the index could not be
    /// loaded. A failed load is not retried; callers fall back to reading
    /// single objects.
    fn with_index<T>(&self, f: impl FnOnce(&HashMap<String, ObjectEntry>) -> T) -> Option<T> {
        if !self.preload_metadata() || self.index_failed.load(Ordering::SeqCst) {
            return None;
        }
        if let Some(index) = read(&self.index).as_ref() {
            return Some(f(index));
        }

        let mut guard = write(&self.index);
        if guard.is_none() {
            match self.load_index() {
                Ok(index) => *guard = Some(index),
                Err(e) => {
                    warn!(
                        root = %self.root.display(),
                        error = %e,
                        "cannot load bucket metadata index, reading objects one by one"
                    );
                    self.index_failed.store(true, Ordering::SeqCst);
                    return None;
                }
            }
        }
        guard.as_ref().map(f)
    }
}

impl RemoteStore for DirectoryStore {
    fn kind(&self) -> &BackendKind {
        &self.kind
    }

    fn exists(&self, path: &str) -> StorageResult<bool> {
        let key = self.entry_key(path)?;
        if let Some(found) = self.with_index(|index| index.contains_key(&key)) {
            return Ok(found);
        }
        Ok(self.object_path(&key)?.is_file())
    }

    fn preload_metadata(&self) -> bool {
        self.preload.load(Ordering::SeqCst)
    }

    fn set_preload_metadata(&self, enabled: bool) {
        self.preload.store(enabled, Ordering::SeqCst);
    }

    fn entry(&self, key: &str) -> StorageResult<Option<ObjectEntry>> {
        if let Some(entry) = self.with_index(|index| index.get(key).cloned()) {
            return Ok(entry);
        }
        debug!(key, "reading single object metadata");
        self.stat_entry(key)
    }

    fn modified_time(&self, path: &str) -> StorageResult<DateTime<Utc>> {
        let key = self.entry_key(path)?;
        let metadata =
            std::fs::metadata(self.object_path(&key)?).map_err(|e| StorageError::from_io(e, &key))?;
        Ok(DateTime::<Utc>::from(metadata.modified()?))
    }

    fn save(&self, path: &str, content: &mut dyn Read) -> StorageResult<ObjectEntry> {
        let key = self.entry_key(path)?;
        let dest = self.object_path(&key)?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        {
            let mut file = File::create(&dest)?;
            std::io::copy(content, &mut file)?;
        }

        let entry = self
            .stat_entry(&key)?
            .ok_or_else(|| StorageError::NotFound(key.clone()))?;
        if let Some(index) = write(&self.index).as_mut() {
            index.insert(key, entry.clone());
        }
        Ok(entry)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
