// SPDX-License-Identifier: Apache-2.0

use crate::byte_source::ByteSource;
use crate::parse_error::{Location, ParseError};

/// Default size of the read window.
pub const DEFAULT_CAPACITY: usize = 4096;

/// A fixed-size read window over a [`ByteSource`].
///
/// Hands out one byte at a time, refilling from the source when the window
/// is exhausted, and keeps the position, line and column of the stream.
/// One byte may be pushed back to be returned again by the next read.
pub struct ScanBuffer<S> {
    source: S,
    buffer: Vec<u8>,
    cursor: usize,
    filled: usize,
    /// Replayed before anything else in the window.
    pushback: Option<u8>,
    exhausted: bool,
    /// Bytes handed out so far, not counting a pushed back byte.
    consumed: usize,
    line: usize,
    line_start: usize,
    prev_line_start: usize,
    last: Location,
}

impl<S: ByteSource> ScanBuffer<S> {
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, DEFAULT_CAPACITY)
    }

    /// Create a buffer with a window of `capacity` bytes (minimum 1).
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        Self {
            source,
            buffer: vec![0u8; capacity.max(1)],
            cursor: 0,
            filled: 0,
            pushback: None,
            exhausted: false,
            consumed: 0,
            line: 1,
            line_start: 0,
            prev_line_start: 0,
            last: Location::start(),
        }
    }

    /// Returns the next byte, or `None` once the source is exhausted.
    pub fn next_byte(&mut self) -> Result<Option<u8>, ParseError> {
        let byte = match self.pushback.take() {
            Some(byte) => byte,
            None => {
                if self.cursor >= self.filled && !self.refill()? {
                    return Ok(None);
                }
                match self.buffer.get(self.cursor) {
                    Some(&byte) => {
                        self.cursor += 1;
                        byte
                    }
                    None => return Ok(None),
                }
            }
        };

        self.last = self.location();
        self.consumed += 1;
        if byte == b'\n' {
            self.prev_line_start = self.line_start;
            self.line += 1;
            self.line_start = self.consumed;
        }
        Ok(Some(byte))
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&mut self) -> Result<Option<u8>, ParseError> {
        let byte = self.next_byte()?;
        if let Some(byte) = byte {
            self.push_back(byte);
        }
        Ok(byte)
    }

    /// Make `byte` the result of the next [`next_byte`](Self::next_byte).
    ///
    /// `byte` must be the byte just read, and only one byte can be pending.
    pub fn push_back(&mut self, byte: u8) {
        debug_assert!(
            self.pushback.is_none(),
            "push_back with a byte already pending"
        );
        self.pushback = Some(byte);
        self.consumed = self.consumed.saturating_sub(1);
        if byte == b'\n' {
            self.line = self.line.saturating_sub(1).max(1);
            self.line_start = self.prev_line_start;
        }
    }

    /// Byte offset of the next byte to be read.
    pub fn position(&self) -> usize {
        self.consumed
    }

    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Location of the next byte to be read.
    pub fn location(&self) -> Location {
        Location {
            position: self.consumed,
            line: self.line,
            column: self.consumed - self.line_start + 1,
        }
    }

    /// Location of the byte most recently returned by `next_byte`.
    pub fn last_location(&self) -> Location {
        self.last
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn refill(&mut self) -> Result<bool, ParseError> {
        if self.exhausted {
            return Ok(false);
        }
        match self.source.fill(&mut self.buffer) {
            Ok(0) => {
                log::trace!("source exhausted after {} bytes", self.consumed);
                self.exhausted = true;
                Ok(false)
            }
            Ok(n) => {
                log::trace!("refilled {n} bytes at offset {}", self.consumed);
                self.cursor = 0;
                self.filled = n.min(self.buffer.len());
                Ok(true)
            }
            Err(e) => {
                self.exhausted = true;
                Err(ParseError::from_source(e, self.location()))
            }
        }
    }
}
