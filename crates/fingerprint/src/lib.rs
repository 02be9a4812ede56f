//! Content fingerprints for change detection.
//!
//! A fingerprint is the hex digest of a file's bytes. Local fingerprints are
//! computed by streaming a reader in fixed-size blocks so memory use stays
//! bounded regardless of file size. Remote fingerprints come from an object
//! store's entity tag and are parsed with [`Fingerprint::from_etag`].

mod chunked;
mod hash;

pub use chunked::ChunkReader;
pub use hash::{Algorithm, Fingerprint, hash_bytes, hash_file, hash_reader};

/// Default block size for streaming hashes: 1 MiB.
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// Errors produced while computing or parsing fingerprints.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed fingerprint: {0}")]
    Malformed(String),
}
