//! Default publish decision based on modification times.

use fastcollect_storage::{RemoteStore, SourceStorage};
use tracing::{debug, info, warn};

use crate::types::CandidateFile;

/// Skips a file when the remote copy is at least as new as the local one.
///
/// Times are compared at whole-second precision since most object stores
/// truncate sub-second modification times. Any missing information means the
/// file is published.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampPolicy;

impl TimestampPolicy {
    pub fn should_publish(
        &self,
        store: &dyn RemoteStore,
        source: &dyn SourceStorage,
        candidate: &CandidateFile,
    ) -> bool {
        let remote_path = candidate.remote_path.as_str();

        match store.exists(remote_path) {
            Ok(true) => {}
            Ok(false) => return true,
            Err(e) => {
                warn!(path = remote_path, error = %e, "existence check failed, publishing");
                return true;
            }
        }

        let target = match store.modified_time(remote_path) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = remote_path, error = %e, "remote modification time unavailable");
                return true;
            }
        };
        let local = match source.modified_time(&candidate.local_path) {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %candidate.local_path, error = %e, "local modification time unavailable");
                return true;
            }
        };

        if target.timestamp() >= local.timestamp() {
            info!(path = remote_path, "Skipping (not modified)");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use fastcollect_storage::{BackendKind, MemoryStore};

    fn candidate() -> CandidateFile {
        CandidateFile::new("app.js", "app.js")
    }

    #[test]
    fn absent_remote_publishes() {
        let remote = MemoryStore::new(BackendKind::BucketRoot);
        let local = MemoryStore::new(BackendKind::BucketRoot);
        local.insert("app.js", b"x").unwrap();
        assert!(TimestampPolicy.should_publish(&remote, &local, &candidate()));
    }

    #[test]
    fn newer_remote_skips() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let remote = MemoryStore::new(BackendKind::BucketRoot);
        let local = MemoryStore::new(BackendKind::BucketRoot);
        remote.insert_with("app.js", b"old", None, t).unwrap();
        local
            .insert_with("app.js", b"new", None, t - Duration::hours(1))
            .unwrap();
        assert!(!TimestampPolicy.should_publish(&remote, &local, &candidate()));
    }

    #[test]
    fn older_remote_publishes() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let remote = MemoryStore::new(BackendKind::BucketRoot);
        let local = MemoryStore::new(BackendKind::BucketRoot);
        remote.insert_with("app.js", b"x", None, t).unwrap();
        local
            .insert_with("app.js", b"x", None, t + Duration::seconds(1))
            .unwrap();
        assert!(TimestampPolicy.should_publish(&remote, &local, &candidate()));
    }

    #[test]
    fn sub_second_difference_is_ignored() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let remote = MemoryStore::new(BackendKind::BucketRoot);
        let local = MemoryStore::new(BackendKind::BucketRoot);
        remote.insert_with("app.js", b"x", None, t).unwrap();
        local
            .insert_with("app.js", b"x", None, t + Duration::milliseconds(700))
            .unwrap();
        assert!(!TimestampPolicy.should_publish(&remote, &local, &candidate()));
    }

    #[test]
    fn missing_local_time_publishes() {
        let remote = MemoryStore::new(BackendKind::BucketRoot);
        let local = MemoryStore::new(BackendKind::BucketRoot);
        remote.insert("app.js", b"x").unwrap();
        assert!(TimestampPolicy.should_publish(&remote, &local, &candidate()));
    }
}
