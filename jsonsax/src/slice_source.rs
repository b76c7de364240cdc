// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`ByteSource`].
//!
//! [`SliceSource`] hands out a borrowed byte slice. It can give the parser
//! everything its buffer will hold, or simulate a slow transport by limiting
//! each `fill()` to a fixed chunk size.
//!
//! # Examples
//!
//! ```rust
//! use jsonsax::{Event, EventFn, ParseOptions, Parser, SliceSource};
//!
//! let json = br#"{"name": "Alice", "age": 30}"#;
//! let mut keys = Vec::new();
//! let mut delegate = EventFn(|_cx: &mut jsonsax::ParseContext, event: Event<'_>| {
//!     if let Event::Key(key) = event {
//!         keys.push(key.to_owned());
//!     }
//! });
//!
//! let mut parser = Parser::new();
//! parser.configure(SliceSource::new(json, 3), ParseOptions::NONE);
//! parser.parse(&mut delegate).unwrap();
//! drop(delegate);
//! assert_eq!(keys, ["name", "age"]);
//! ```

use crate::byte_source::{ByteSource, SourceError};

/// A [`ByteSource`] that reads from a byte slice, optionally in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source that returns at most `chunk_size` bytes per `fill()`
    /// (minimum 1), even if the buffer could hold more.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Create a source that hands out as much of `data` as each buffer holds.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self::new(data, usize::MAX)
    }

    /// Create a source over the UTF-8 bytes of `text`.
    pub fn from_str(text: &'a str) -> Self {
        Self::full_slice(text.as_bytes())
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or_default()
    }
}

impl ByteSource for SliceSource<'_> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
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
mod tests {
    use super::*;
    use test_log::test;

    fn drain(mut source: SliceSource<'_>, buf_len: usize) -> Vec<usize> {
        let mut buf = vec![0u8; buf_len];
        let mut sizes = Vec::new();
        loop {
            match source.fill(&mut buf) {
                Ok(0) => return sizes,
                Ok(n) => sizes.push(n),
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }

    #[test]
    fn test_full_slice_limited_by_buffer() {
        let source = SliceSource::full_slice(b"0123456789");
        assert_eq!(drain(source, 4), vec![4, 4, 2]);
    }

    #[test]
    fn test_chunked_reads() {
        let source = SliceSource::new(b"0123456789", 3);
        assert_eq!(drain(source, 64), vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let source = SliceSource::new(b"ab", 0);
        assert_eq!(drain(source, 8), vec![1, 1]);
    }

    #[test]
    fn test_content_is_copied_in_order() {
        let mut source = SliceSource::new(br#"{"a":1}"#, 2);
        let mut out = Vec::new();
        let mut buf = [0u8; 8];
        while let Ok(n) = source.fill(&mut buf) {
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, br#"{"a":1}"#);
        assert!(source.remaining().is_empty());
    }

    #[test]
    fn test_empty_buffer_reads_nothing() {
        let mut source = SliceSource::from_str("[]");
        assert_eq!(source.fill(&mut []), Ok(0));
        assert_eq!(source.remaining(), b"[]");
    }
}
