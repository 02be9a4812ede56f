use std::fmt;
use std::io::Read;
use std::path::Path;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ChunkReader, FingerprintError};

/// Hash function used to fingerprint content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// MD5, the digest object stores report as the entity tag of
    /// single-part uploads.
    #[default]
    Md5,
    /// SHA-256, for stores that record SHA-256 content digests.
    Sha256,
}

impl Algorithm {
    /// Length of the hex-encoded digest.
    pub fn hex_len(self) -> usize {
        match self {
            Algorithm::Md5 => 32,
            Algorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Md5 => f.write_str("md5"),
            Algorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

enum Accumulator {
    Md5(Md5),
    Sha256(Sha256),
}

impl Accumulator {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Md5 => Accumulator::Md5(Md5::new()),
            Algorithm::Sha256 => Accumulator::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Accumulator::Md5(h) => h.update(data),
            Accumulator::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Fingerprint {
        let hex = match self {
            Accumulator::Md5(h) => hex::encode(h.finalize()),
            Accumulator::Sha256(h) => hex::encode(h.finalize()),
        };
        Fingerprint(hex)
    }
}

/// Hex digest identifying a file's exact byte content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parses a remote entity tag.
    ///
    /// Every `"` is dropped, so both `"abc123"` and `abc123` parse to the same
    /// value. The remainder must be non-empty hex and is lowercased to match
    /// computed digests. Multipart tags such as
    /// `"9b2cf535f27731c974343645a3985328-3"` are rejected because they are
    /// not a digest of the object's bytes.
    pub fn from_etag(raw: &str) -> Result<Self, FingerprintError> {
        let value: String = raw.trim().chars().filter(|c| *c != '"').collect();
        let value = value.trim();

        if value.is_empty() {
            return Err(FingerprintError::Malformed(format!(
                "empty entity tag: {raw:?}"
            )));
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FingerprintError::Malformed(format!(
                "entity tag is not a hex digest: {raw:?}"
            )));
        }

        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Hex string as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Entity tag form, wrapped in quotes the way object stores report it.
    pub fn to_etag(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the fingerprint of an in-memory buffer.
pub fn hash_bytes(data: &[u8], algorithm: Algorithm) -> Fingerprint {
    let mut acc = Accumulator::new(algorithm);
    acc.update(data);
    acc.finalize()
}

/// Streams `reader` through the hash in `block_size` chunks.
///
/// The result does not depend on `block_size`. A `block_size` of 0 selects
/// [`DEFAULT_BLOCK_SIZE`](crate::DEFAULT_BLOCK_SIZE).
pub fn hash_reader<R: Read>(
    reader: R,
    algorithm: Algorithm,
    block_size: usize,
) -> Result<Fingerprint, FingerprintError> {
    let mut chunks = ChunkReader::new(reader, block_size);
    let mut acc = Accumulator::new(algorithm);
    while let Some(chunk) = chunks.next_chunk()? {
        acc.update(chunk);
    }
    Ok(acc.finalize())
}

/// Computes the fingerprint of a file on disk.
///
/// The file handle is closed when this returns, on success or error.
pub fn hash_file(
    path: &Path,
    algorithm: Algorithm,
    block_size: usize,
) -> Result<Fingerprint, FingerprintError> {
    let file = std::fs::File::open(path)?;
    hash_reader(file, algorithm, block_size)
}
