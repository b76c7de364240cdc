// SPDX-License-Identifier: Apache-2.0

//! Text encoding support.
//!
//! The scanner works on UTF-8. [`TranscodingSource`] sits between any other
//! [`ByteSource`] and the parser and converts UTF-16 or Latin-1 input on the
//! fly, dropping a leading byte order mark. The encoding can be given up front
//! or sniffed from the first bytes of the stream.

use crate::byte_source::{ByteSource, SourceError, SourceErrorKind};

const READ_CHUNK: usize = 4096;
const REPLACEMENT: char = '\u{FFFD}';

/// Text encodings accepted by [`TranscodingSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1, every byte is the code point of the same value.
    Latin1,
}

impl Encoding {
    /// Guess the encoding from the first bytes of a document.
    ///
    /// Returns the encoding and the length of the byte order mark to drop.
    /// Byte order marks win; otherwise a zero byte in one of the first two
    /// positions means UTF-16 (JSON text starts with an ASCII character),
    /// and anything else is treated as UTF-8.
    pub fn sniff(prefix: &[u8]) -> (Encoding, usize) {
        match prefix {
            [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
            [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
            [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
            [0, b, ..] if *b != 0 => (Encoding::Utf16Be, 0),
            [b, 0, ..] if *b != 0 => (Encoding::Utf16Le, 0),
            _ => (Encoding::Utf8, 0),
        }
    }

    /// Byte order mark of this encoding, if it has one.
    pub const fn bom(&self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Latin1 => &[],
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Latin1 => "iso-8859-1",
        }
    }
}

impl core::str::FromStr for Encoding {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" => Ok(Encoding::Utf16Le),
            "utf16be" | "utf-16be" => Ok(Encoding::Utf16Be),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            _ => Err(SourceError::new(
                SourceErrorKind::Encoding,
                format!("unknown encoding '{s}'"),
            )),
        }
    }
}

/// A [`ByteSource`] adapter that re-encodes its inner source as UTF-8.
pub struct TranscodingSource<S> {
    inner: S,
    encoding: Option<Encoding>,
    bom_checked: bool,
    inner_done: bool,
    chunk: Vec<u8>,
    /// Input bytes not yet decoded (at most one odd byte for UTF-16).
    raw: Vec<u8>,
    /// Decoded UTF-8 waiting to be handed out.
    out: Vec<u8>,
    out_pos: usize,
    pending_high: Option<u16>,
}

impl<S: ByteSource> TranscodingSource<S> {
    /// Decode `inner` as `encoding`.
    pub fn new(inner: S, encoding: Encoding) -> Self {
        Self::with_encoding(inner, Some(encoding))
    }

    /// Decode `inner` in whatever encoding [`Encoding::sniff`] detects.
    pub fn detect(inner: S) -> Self {
        Self::with_encoding(inner, None)
    }

    pub(crate) fn with_encoding(inner: S, encoding: Option<Encoding>) -> Self {
        Self {
            inner,
            encoding,
            bom_checked: false,
            inner_done: false,
            chunk: vec![0u8; READ_CHUNK],
            raw: Vec::new(),
            out: Vec::new(),
            out_pos: 0,
            pending_high: None,
        }
    }

    /// The encoding in use, once known.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    fn serve(&mut self, buf: &mut [u8]) -> usize {
        let pending = self.out.get(self.out_pos..).unwrap_or_default();
        let n = pending.len().min(buf.len());
        if let (Some(dest), Some(src)) = (buf.get_mut(..n), pending.get(..n)) {
            dest.copy_from_slice(src);
            self.out_pos += n;
            n
        } else {
            0
        }
    }

    fn read_more(&mut self) -> Result<(), SourceError> {
        let n = self.inner.fill(&mut self.chunk)?;
        if n == 0 {
            self.inner_done = true;
        } else {
            self.raw
                .extend_from_slice(self.chunk.get(..n).unwrap_or(&self.chunk));
        }
        Ok(())
    }

    fn strip_bom(&mut self) {
        let (encoding, bom_len) = match self.encoding {
            Some(encoding) => {
                let bom = encoding.bom();
                let len = if !bom.is_empty() && self.raw.starts_with(bom) {
                    bom.len()
                } else {
                    0
                };
                (encoding, len)
            }
            None => {
                let (encoding, len) = Encoding::sniff(&self.raw);
                log::debug!("detected {} input", encoding.name());
                (encoding, len)
            }
        };
        self.raw.drain(..bom_len);
        self.encoding = Some(encoding);
        self.bom_checked = true;
    }

    fn push_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    fn push_utf16_unit(&mut self, unit: u16) {
        let high = self.pending_high.take();
        match (high, unit) {
            (Some(high), 0xDC00..=0xDFFF) => {
                let code =
                    0x10000 + ((u32::from(high) & 0x3FF) << 10) + (u32::from(unit) & 0x3FF);
                self.push_char(char::from_u32(code).unwrap_or(REPLACEMENT));
            }
            (high, _) => {
                if high.is_some() {
                    self.push_char(REPLACEMENT);
                }
                match unit {
                    0xD800..=0xDBFF => self.pending_high = Some(unit),
                    0xDC00..=0xDFFF => self.push_char(REPLACEMENT),
                    _ => self.push_char(char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT)),
                }
            }
        }
    }

    fn decode(&mut self) {
        let raw = core::mem::take(&mut self.raw);
        let consumed = match self.encoding.unwrap_or(Encoding::Utf8) {
            Encoding::Utf8 => {
                self.out.extend_from_slice(&raw);
                raw.len()
            }
            Encoding::Latin1 => {
                for &byte in &raw {
                    self.push_char(char::from(byte));
                }
                raw.len()
            }
            Encoding::Utf16Le | Encoding::Utf16Be => {
                let big_endian = self.encoding == Some(Encoding::Utf16Be);
                let mut pairs = raw.chunks_exact(2);
                for pair in &mut pairs {
                    let bytes = [pair[0], pair[1]];
                    let unit = if big_endian {
                        u16::from_be_bytes(bytes)
                    } else {
                        u16::from_le_bytes(bytes)
                    };
                    self.push_utf16_unit(unit);
                }
                raw.len() - pairs.remainder().len()
            }
        };
        self.raw = raw;
        self.raw.drain(..consumed);
    }

    fn flush_tail(&mut self) -> Result<(), SourceError> {
        if self.pending_high.take().is_some() {
            self.push_char(REPLACEMENT);
        }
        if !self.raw.is_empty() {
            self.raw.clear();
            return Err(SourceError::new(
                SourceErrorKind::Encoding,
                "input ends inside a UTF-16 code unit",
            ));
        }
        Ok(())
    }
}

impl<S: ByteSource> ByteSource for TranscodingSource<S> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let served = self.serve(buf);
            if served > 0 {
                return Ok(served);
            }
            self.out.clear();
            self.out_pos = 0;

            if self.inner_done {
                self.flush_tail()?;
                if self.out.is_empty() {
                    return Ok(0);
                }
                continue;
            }

            self.read_more()?;
            if !self.bom_checked {
                if self.raw.len() < 4 && !self.inner_done {
                    continue;
                }
                self.strip_bom();
            }
            self.decode();
        }
    }
}

impl<S> core::fmt::Debug for TranscodingSource<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TranscodingSource")
            .field("encoding", &self.encoding)
            .field("inner_done", &self.inner_done)
            .finish_non_exhaustive()
    }
}
