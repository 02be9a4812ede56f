//! Storage collaborators for the collect pass.
//!
//! The publishing pass reads static files from a [`SourceStorage`] and
//! writes them to a [`RemoteStore`]. Change detection needs three things from
//! the remote side: an existence check, a metadata index with entity tags,
//! and a path convention that matches how the index keys were built. The
//! conventions form a closed set, see [`BackendKind`].
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process bucket, also usable as a source.
//! - [`DirectoryStore`]: a local directory acting as the bucket.
//! - [`LocalSource`]: source storage rooted at a directory.

pub mod convention;
pub mod directory;
pub mod error;
pub mod memory;
pub mod source;
pub mod traits;
mod validation;
mod walk;

pub use convention::{BackendKind, clean_name, guess_join, safe_join};
pub use directory::DirectoryStore;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use source::LocalSource;
pub use traits::{ObjectEntry, RemoteStore, SourceStorage};
pub use validation::validate_key;

use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

/// Shared lock helpers: a poisoned lock still holds a usable cache.
pub(crate) fn read<T>(lock: &std::sync::RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &std::sync::RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
