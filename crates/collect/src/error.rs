//! Collect error types.

use fastcollect_fingerprint::FingerprintError;
use fastcollect_storage::StorageError;

/// Errors that abort a collect pass.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid ignore pattern {pattern:?}: {message}")]
    IgnorePattern { pattern: String, message: String },
}

/// Reasons a fingerprint comparison could not be made.
///
/// None of these abort the pass: the detector logs them and publishes the
/// file.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("remote fingerprint for {key} unavailable: {reason}")]
    Lookup {
        key: String,
        #[source]
        reason: LookupFailure,
    },

    #[error("local fingerprint for {path} unavailable: {reason}")]
    Local {
        path: String,
        #[source]
        reason: LocalFailure,
    },
}

impl ComparisonError {
    /// Returns `true` when the failure was on the local side.
    pub fn is_local(&self) -> bool {
        matches!(self, ComparisonError::Local { .. })
    }
}

/// Why the remote fingerprint could not be read.
#[derive(Debug, thiserror::Error)]
pub enum LookupFailure {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no metadata entry")]
    MissingEntry,

    #[error("metadata entry has no entity tag")]
    MissingEtag,

    #[error("unusable entity tag: {0}")]
    Malformed(#[source] FingerprintError),
}

/// Why the local fingerprint could not be computed.
#[derive(Debug, thiserror::Error)]
pub enum LocalFailure {
    #[error("cannot open: {0}")]
    Open(#[source] StorageError),

    #[error("cannot hash: {0}")]
    Hash(#[source] FingerprintError),
}
