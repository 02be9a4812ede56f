//! Hash-based change detection.
//!
//! Decides whether a static file must be re-uploaded by comparing the digest
//! of its local bytes with the entity tag the bucket reports for the stored
//! object. Object stores like S3 compute the tag as the MD5 of the object, so
//! an unchanged file produces an identical digest even when its modification
//! time was reset by a fresh checkout or container build.
//!
//! The detector fails open: whenever a comparison cannot be made the answer
//! is "publish", and the reason is logged.

use fastcollect_fingerprint::{Fingerprint, hash_reader};
use fastcollect_storage::{RemoteStore, SourceStorage};
use tracing::{debug, info, warn};

use crate::error::{ComparisonError, LocalFailure, LookupFailure};
use crate::policy::TimestampPolicy;
use crate::types::{CandidateFile, DetectorConfig};

/// Publish decision for candidates against one remote store.
pub struct ChangeDetector<'a> {
    store: &'a dyn RemoteStore,
    config: DetectorConfig,
    fallback: TimestampPolicy,
}

impl<'a> ChangeDetector<'a> {
    /// Creates a detector for `store`.
    ///
    /// When enabled, switches the store to bulk metadata loading so each
    /// lookup is served from one index load instead of a request per file.
    pub fn new(store: &'a dyn RemoteStore, config: DetectorConfig) -> Self {
        if config.enabled && !store.preload_metadata() {
            info!(store = %store.describe(), "Forcing storage to preload metadata");
            store.set_preload_metadata(true);
        }
        Self {
            store,
            config,
            fallback: TimestampPolicy,
        }
    }

    /// Returns `true` if `candidate` must be copied to the remote store.
    ///
    /// Never fails: lookup and read errors are logged and yield `true`.
    pub fn should_publish(&self, source: &dyn SourceStorage, candidate: &CandidateFile) -> bool {
        if !self.config.enabled {
            return self.fallback.should_publish(self.store, source, candidate);
        }

        let remote_path = candidate.remote_path.as_str();
        match self.store.exists(remote_path) {
            Ok(true) => {}
            Ok(false) => {
                debug!(path = remote_path, "not in remote store");
                return true;
            }
            Err(e) => {
                warn!(path = remote_path, error = %e, "existence check failed, publishing");
                return true;
            }
        }

        match self.compare(source, candidate) {
            Ok(true) => {
                info!(path = remote_path, "Skipping (not modified based on hash)");
                false
            }
            Ok(false) => {
                debug!(path = remote_path, "content changed");
                true
            }
            Err(e) => {
                warn!(path = remote_path, error = %e, "cannot compare fingerprints, publishing");
                true
            }
        }
    }

    /// Returns `true` when local and remote fingerprints match.
    pub fn compare(
        &self,
        source: &dyn SourceStorage,
        candidate: &CandidateFile,
    ) -> Result<bool, ComparisonError> {
        let remote = self.remote_fingerprint(&candidate.remote_path)?;
        let local = self.local_fingerprint(source, &candidate.local_path)?;
        Ok(remote == local)
    }

    /// Reads the fingerprint of `remote_path` from the store's metadata index.
    pub fn remote_fingerprint(&self, remote_path: &str) -> Result<Fingerprint, ComparisonError> {
        if self.store.kind().is_unknown() {
            info!(path = remote_path, "Unknown storage, guessing entry path");
        }

        let lookup = |key: &str, reason: LookupFailure| ComparisonError::Lookup {
            key: key.to_string(),
            reason,
        };

        let key = self
            .store
            .entry_key(remote_path)
            .map_err(|e| lookup(remote_path, e.into()))?;
        let entry = self
            .store
            .entry(&key)
            .map_err(|e| lookup(&key, e.into()))?
            .ok_or_else(|| lookup(&key, LookupFailure::MissingEntry))?;
        let etag = entry
            .etag
            .ok_or_else(|| lookup(&key, LookupFailure::MissingEtag))?;

        Fingerprint::from_etag(&etag).map_err(|e| lookup(&key, LookupFailure::Malformed(e)))
    }

    /// Streams `local_path` through the configured digest.
    pub fn local_fingerprint(
        &self,
        source: &dyn SourceStorage,
        local_path: &str,
    ) -> Result<Fingerprint, ComparisonError> {
        let local = |reason: LocalFailure| ComparisonError::Local {
            path: local_path.to_string(),
            reason,
        };

        let reader = source
            .open(local_path)
            .map_err(|e| local(LocalFailure::Open(e)))?;
        hash_reader(reader, self.config.algorithm, self.config.block_size)
            .map_err(|e| local(LocalFailure::Hash(e)))
    }
}
