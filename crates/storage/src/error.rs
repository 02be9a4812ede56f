//! Storage error types.

use fastcollect_fingerprint::FingerprintError;

/// Errors produced by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Maps an I/O error to [`StorageError::NotFound`] when the object is
    /// missing, keeping every other kind as-is.
    pub(crate) fn from_io(err: std::io::Error, key: &str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Io(err)
        }
    }
}
