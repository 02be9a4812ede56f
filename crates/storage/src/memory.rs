//! In-memory bucket.
//!
//! Useful as a remote store in tests and dry runs, and as a source storage
//! when candidate files are generated in memory.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use fastcollect_fingerprint::{Algorithm, hash_bytes};
use tracing::debug;

use crate::convention::BackendKind;
use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectEntry, RemoteStore, SourceStorage};
use crate::{read, write};

struct MemoryObject {
    data: Vec<u8>,
    etag: Option<String>,
    last_modified: DateTime<Utc>,
}

impl MemoryObject {
    fn entry(&self, key: &str) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            size: self.data.len() as u64,
            etag: self.etag.clone(),
            last_modified: Some(self.last_modified),
        }
    }
}

/// Thread-safe in-memory object store keyed by normalized path.
pub struct MemoryStore {
    kind: BackendKind,
    algorithm: Algorithm,
    preload: AtomicBool,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    index: RwLock<Option<HashMap<String, ObjectEntry>>>,
    index_loads: AtomicUsize,
    head_requests: AtomicUsize,
    opens: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(BackendKind::default())
    }
}

impl MemoryStore {
    /// Creates an empty store using MD5 entity tags.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            algorithm: Algorithm::Md5,
            preload: AtomicBool::new(false),
            objects: RwLock::new(BTreeMap::new()),
            index: RwLock::new(None),
            index_loads: AtomicUsize::new(0),
            head_requests: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
        }
    }

    /// Sets the digest used for entity tags of saved objects.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets whether metadata is bulk-loaded.
    pub fn with_preload(self, enabled: bool) -> Self {
        self.preload.store(enabled, Ordering::SeqCst);
        self
    }

    /// Stores `data` at `path` with a computed entity tag and the current time.
    pub fn insert(&self, path: &str, data: &[u8]) -> StorageResult<String> {
        let etag = hash_bytes(data, self.algorithm).to_etag();
        self.insert_with(path, data, Some(&etag), Utc::now())
    }

    /// Stores `data` at `path` with an explicit entity tag and timestamp.
    ///
    /// The etag is stored verbatim, which allows simulating multipart or
    /// otherwise unusual tags. Returns the index key used.
    pub fn insert_with(
        &self,
        path: &str,
        data: &[u8],
        etag: Option<&str>,
        last_modified: DateTime<Utc>,
    ) -> StorageResult<String> {
        let key = self.entry_key(path)?;
        let object = MemoryObject {
            data: data.to_vec(),
            etag: etag.map(str::to_string),
            last_modified,
        };
        let entry = object.entry(&key);
        write(&self.objects).insert(key.clone(), object);
        if let Some(index) = write(&self.index).as_mut() {
            index.insert(key.clone(), entry);
        }
        Ok(key)
    }

    /// Returns the stored bytes at the logical `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let key = self.entry_key(path).ok()?;
        read(&self.objects).get(&key).map(|o| o.data.clone())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        read(&self.objects).len()
    }

    /// Returns `true` if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        read(&self.objects).is_empty()
    }

    /// How many times the full index was bulk-loaded.
    pub fn index_loads(&self) -> usize {
        self.index_loads.load(Ordering::SeqCst)
    }

    /// How many single-object metadata reads were made.
    pub fn head_requests(&self) -> usize {
        self.head_requests.load(Ordering::SeqCst)
    }

    /// How many streams were opened through [`SourceStorage::open`].
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    fn cached_entry(&self, key: &str) -> Option<ObjectEntry> {
        if let Some(index) = read(&self.index).as_ref() {
            return index.get(key).cloned();
        }

        let mut index = write(&self.index);
        let index = index.get_or_insert_with(|| {
            self.index_loads.fetch_add(1, Ordering::SeqCst);
            let objects = read(&self.objects);
            debug!(objects = objects.len(), "loading memory store index");
            objects
                .iter()
                .map(|(k, o)| (k.clone(), o.entry(k)))
                .collect()
        });
        index.get(key).cloned()
    }
}

impl RemoteStore for MemoryStore {
    fn kind(&self) -> &BackendKind {
        &self.kind
    }

    fn exists(&self, path: &str) -> StorageResult<bool> {
        let key = self.entry_key(path)?;
        Ok(read(&self.objects).contains_key(&key))
    }

    fn preload_metadata(&self) -> bool {
        self.preload.load(Ordering::SeqCst)
    }

    fn set_preload_metadata(&self, enabled: bool) {
        self.preload.store(enabled, Ordering::SeqCst);
    }

    fn entry(&self, key: &str) -> StorageResult<Option<ObjectEntry>> {
        if self.preload_metadata() {
            return Ok(self.cached_entry(key));
        }
        self.head_requests.fetch_add(1, Ordering::SeqCst);
        Ok(read(&self.objects).get(key).map(|o| o.entry(key)))
    }

    fn modified_time(&self, path: &str) -> StorageResult<DateTime<Utc>> {
        let key = self.entry_key(path)?;
        read(&self.objects)
            .get(&key)
            .map(|o| o.last_modified)
            .ok_or(StorageError::NotFound(key))
    }

    fn save(&self, path: &str, content: &mut dyn Read) -> StorageResult<ObjectEntry> {
        let mut data = Vec::new();
        content.read_to_end(&mut data)?;
        let etag = hash_bytes(&data, self.algorithm).to_etag();
        let now = Utc::now();
        let key = self.insert_with(path, &data, Some(&etag), now)?;
        Ok(ObjectEntry {
            key,
            size: data.len() as u64,
            etag: Some(etag),
            last_modified: Some(now),
        })
    }

    fn describe(&self) -> String {
        format!("memory://{}", self.kind.location())
    }
}

impl SourceStorage for MemoryStore {
    fn open(&self, path: &str) -> StorageResult<Box<dyn Read + '_>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let data = self
            .contents(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn modified_time(&self, path: &str) -> StorageResult<DateTime<Utc>> {
        RemoteStore::modified_time(self, path)
    }
}
