//! Storage trait definitions.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::convention::BackendKind;
use crate::error::StorageResult;

/// Metadata for one stored object, as held in a store's index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Index key the entry is stored under.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Entity tag as reported by the store, usually a quoted digest.
    pub etag: Option<String>,
    /// Last modification time (if available).
    pub last_modified: Option<DateTime<Utc>>,
}

/// The bucket the collect pass publishes into.
///
/// All methods take `&self`; backends keep their metadata cache behind
/// interior locks.
pub trait RemoteStore {
    /// Declared path convention for index keys.
    fn kind(&self) -> &BackendKind;

    /// Translates a logical path into an index key.
    ///
    /// Must match the convention used when the index was loaded.
    fn entry_key(&self, path: &str) -> StorageResult<String> {
        self.kind().normalize(path)
    }

    /// Returns `true` if an object exists at the logical `path`.
    fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Whether [`entry`](Self::entry) is served from a bulk-loaded index.
    fn preload_metadata(&self) -> bool;

    /// Turns bulk index loading on or off.
    fn set_preload_metadata(&self, enabled: bool);

    /// Looks up index metadata by key (see [`entry_key`](Self::entry_key)).
    ///
    /// With preloading on, the first call loads the whole index in one bulk
    /// operation. Without it, each call reads a single object's metadata.
    fn entry(&self, key: &str) -> StorageResult<Option<ObjectEntry>>;

    /// Last modification time of the object at the logical `path`.
    fn modified_time(&self, path: &str) -> StorageResult<DateTime<Utc>>;

    /// Uploads `content` to the logical `path`, replacing any existing object.
    fn save(&self, path: &str, content: &mut dyn Read) -> StorageResult<ObjectEntry>;

    /// Human-readable destination for logs and summaries.
    fn describe(&self) -> String;
}

/// Where static files are read from.
pub trait SourceStorage {
    /// Opens `path` as a byte stream. The stream is closed when dropped.
    fn open(&self, path: &str) -> StorageResult<Box<dyn Read + '_>>;

    /// Last modification time of `path`.
    fn modified_time(&self, path: &str) -> StorageResult<DateTime<Utc>>;
}
