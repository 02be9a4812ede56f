//! Collect pass orchestrator.
//!
//! Walks every source in order, asks the change detector about each file and
//! copies what changed. A failed copy is recorded and the pass moves on.

use std::collections::HashSet;

use fastcollect_storage::{ObjectEntry, RemoteStore, SourceStorage, StorageError};
use tracing::{debug, error, info};

use crate::detector::ChangeDetector;
use crate::error::CollectError;
use crate::scanner::scan_source;
use crate::types::{
    CandidateFile, CollectOptions, CollectResult, DetectorConfig, FailedCopy, StaticSource,
};

/// Publishes static sources into one remote store.
pub struct Collector<'a> {
    store: &'a dyn RemoteStore,
    detector: ChangeDetector<'a>,
    options: CollectOptions,
}

impl<'a> Collector<'a> {
    pub fn new(
        store: &'a dyn RemoteStore,
        detector: DetectorConfig,
        options: CollectOptions,
    ) -> Self {
        Self {
            store,
            detector: ChangeDetector::new(store, detector),
            options,
        }
    }

    /// Runs one pass over `sources`.
    ///
    /// When two sources provide the same remote path, the first one wins.
    /// Fails only if a source cannot be enumerated.
    pub fn run(&self, sources: &[StaticSource]) -> Result<CollectResult, CollectError> {
        let mut result = CollectResult::default();
        let mut seen = HashSet::new();

        for source in sources {
            let files = scan_source(&source.storage, &self.options.ignore)?;
            for relative in files {
                let candidate = CandidateFile::for_source(&relative, source.prefix.as_deref());
                if !seen.insert(candidate.remote_path.clone()) {
                    debug!(path = %candidate.remote_path, "Skipping (already copied earlier)");
                    continue;
                }
                self.collect_file(&source.storage, &candidate, &mut result);
            }
        }

        info!(
            copied = result.copied.len(),
            unmodified = result.unmodified.len(),
            failed = result.failed.len(),
            "{}",
            result.summary(&self.store.describe())
        );
        Ok(result)
    }

    fn collect_file(
        &self,
        source: &dyn SourceStorage,
        candidate: &CandidateFile,
        result: &mut CollectResult,
    ) {
        let remote_path = candidate.remote_path.clone();

        if !self.detector.should_publish(source, candidate) {
            result.unmodified.push(remote_path);
            return;
        }

        if self.options.dry_run {
            info!(path = %remote_path, "Pretending to copy");
            result.copied.push(remote_path);
            return;
        }

        match self.copy(source, candidate) {
            Ok(entry) => {
                info!(path = %remote_path, key = %entry.key, size = entry.size, "Copying");
                result.copied.push(remote_path);
            }
            Err(e) => {
                error!(path = %remote_path, error = %e, "copy failed");
                result.failed.push(FailedCopy {
                    path: remote_path,
                    error: e.to_string(),
                });
            }
        }
    }

    fn copy(
        &self,
        source: &dyn SourceStorage,
        candidate: &CandidateFile,
    ) -> Result<ObjectEntry, StorageError> {
        let mut reader = source.open(&candidate.local_path)?;
        self.store.save(&candidate.remote_path, reader.as_mut())
    }
}
