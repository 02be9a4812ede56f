use std::io::{ErrorKind, Read};

use crate::{DEFAULT_BLOCK_SIZE, FingerprintError};

/// Reads any byte stream in fixed-size chunks.
///
/// Each call to [`next_chunk`](Self::next_chunk) fills at most one block, so
/// the largest buffer alive at any time is `block_size` bytes.
pub struct ChunkReader<R> {
    inner: R,
    buf: Vec<u8>,
    offset: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Wraps `inner` for chunked reading.
    ///
    /// If `block_size` is 0, [`DEFAULT_BLOCK_SIZE`] (1 MiB) is used.
    pub fn new(inner: R, block_size: usize) -> Self {
        let block_size = if block_size == 0 {
            DEFAULT_BLOCK_SIZE
        } else {
            block_size
        };
        Self {
            inner,
            buf: vec![0u8; block_size],
            offset: 0,
        }
    }

    /// Reads the next chunk. Returns `None` at EOF.
    ///
    /// A chunk is only short when the stream ends, which keeps chunk
    /// boundaries deterministic for a given block size.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>, FingerprintError> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.inner.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        self.offset += filled as u64;
        Ok(Some(&self.buf[..filled]))
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Configured block size.
    pub fn block_size(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that returns at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn reads_all_chunks() {
        let mut reader = ChunkReader::new(Cursor::new(b"AABBCCDDEE".to_vec()), 4);

        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"AABB");
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"CCDD");
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"EE");
        assert!(reader.next_chunk().unwrap().is_none());
        assert_eq!(reader.offset(), 10);
    }

    #[test]
    fn empty_stream_has_no_chunks() {
        let mut reader = ChunkReader::new(Cursor::new(Vec::new()), 4);
        assert!(reader.next_chunk().unwrap().is_none());
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn zero_block_size_uses_default() {
        let reader = ChunkReader::new(Cursor::new(b"x".to_vec()), 0);
        assert_eq!(reader.block_size(), DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn short_reads_are_coalesced_into_full_blocks() {
        let data = b"0123456789";
        let mut reader = ChunkReader::new(Trickle { data, step: 3 }, 5);

        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"01234");
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"56789");
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn read_error_is_returned() {
        let mut reader = ChunkReader::new(Broken, 4);
        assert!(matches!(
            reader.next_chunk(),
            Err(FingerprintError::Io(_))
        ));
    }
}
