// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`Reader`].
//!
//! [`ChunkReader`] feeds the decoder from a byte slice, either all at once or
//! in fixed-size chunks. Chunked reading stands in for sockets and pipes that
//! deliver a document a few bytes at a time.
//!
//! ```rust
//! use nvlist::{decode, ChunkReader};
//!
//! let json = br#"{"name": "disk0", "size": 512}"#;
//! // Deliver a single byte per read() call
//! let nvl = decode(ChunkReader::new(json, 1)).unwrap();
//! assert_eq!(nvl.get_string("name"), Ok("disk0"));
//! ```

use crate::io::Reader;

/// A [`Reader`] over a byte slice, optionally limited to `chunk_size` bytes
/// per call.
#[derive(Debug)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> ChunkReader<'a> {
    /// Each call to `read()` returns at most `chunk_size` bytes (minimum 1).
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// A reader that hands out as much of the slice as the caller's buffer
    /// holds.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: usize::MAX,
        }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }
}

impl Reader for ChunkReader<'_> {
    type Error = core::convert::Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.remaining();
        let to_copy = remaining.len().min(buf.len()).min(self.chunk_size);
        if let (Some(dest), Some(src)) = (buf.get_mut(..to_copy), remaining.get(..to_copy)) {
            dest.copy_from_slice(src);
            self.pos = self.pos.saturating_add(to_copy);
            Ok(to_copy)
        } else {
            Ok(0)
        }
    }
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::json::decode;

    #[test]
    fn test_full_slice_reader_with_decoder() {
        let json = br#"{"name": "Alice", "age": 30, "active": true}"#;
        let nvl = decode(ChunkReader::full_slice(json)).unwrap();
        assert_eq!(nvl.get_string("name"), Ok("Alice"));
        assert_eq!(nvl.get_number("age"), Ok(30));
        assert_eq!(nvl.get_bool("active"), Ok(true));
    }

    #[test_log::test]
    fn test_tiny_chunks_match_full_slice() {
        let json = br#"{"escape": "hello\nworld", "list": [1, 2, 3], "o": {"x": null}}"#;
        let whole = decode(ChunkReader::full_slice(json)).unwrap();
        for chunk_size in 1..=4 {
            let chunked = decode(ChunkReader::new(json, chunk_size)).unwrap();
            assert_eq!(chunked, whole, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_decoder_stops_at_newline_sentinel() {
        let json = b"{\"a\": 1}\n{\"b\": 2}\n";
        let mut reader = ChunkReader::new(json, 1);
        let first = decode(&mut reader).unwrap();
        assert_eq!(first.get_number("a"), Ok(1));
        let second = decode(&mut reader).unwrap();
        assert_eq!(second.get_number("b"), Ok(2));
    }
}
