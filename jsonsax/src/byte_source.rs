// SPDX-License-Identifier: Apache-2.0

//! The [`ByteSource`] trait through which the parser pulls its input.
//!
//! Ready-made sources cover the common cases:
//!
//! - [`SliceSource`](crate::SliceSource) for bytes or text already in memory
//! - [`FileSource`](crate::FileSource) for a path on disk, opened lazily
//! - [`StreamSource`](crate::StreamSource) for any [`std::io::Read`]
//! - [`CallbackSource`](crate::CallbackSource) for a pull closure, the hook
//!   for transports this crate knows nothing about

use std::borrow::Cow;

/// Trait for input sources that supply bytes to the parser on demand.
pub trait ByteSource {
    /// Fill `buf` with up to `buf.len()` bytes.
    /// Returns the number of bytes written, or an error.
    ///
    /// # Contract
    /// - A return value of 0 **MUST** indicate true end of input
    /// - Implementations **MUST NOT** return 0 unless no more data will ever be available
    /// - The parser stops calling `fill` once it has seen 0 or an error
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        (**self).fill(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        (**self).fill(buf)
    }
}

/// Classification of a byte source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The source could not be opened.
    Open,
    /// A read from an open source failed.
    Io,
    /// A pull callback reported failure.
    Callback,
    /// Bytes could not be decoded in the declared text encoding.
    Encoding,
    /// The source could not allocate what it needed.
    OutOfMemory,
}

/// Error returned by [`ByteSource::fill`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: Cow<'static, str>,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wraps an I/O error, keeping out-of-memory distinguishable.
    pub fn io(err: &std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::OutOfMemory => SourceErrorKind::OutOfMemory,
            _ => SourceErrorKind::Io,
        };
        Self::new(kind, err.to_string())
    }
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let what = match self.kind {
            SourceErrorKind::Open => "cannot open source",
            SourceErrorKind::Io => "read failed",
            SourceErrorKind::Callback => "source callback failed",
            SourceErrorKind::Encoding => "cannot decode source",
            SourceErrorKind::OutOfMemory => "out of memory",
        };
        write!(f, "{what}: {}", self.message)
    }
}

impl std::error::Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown(u8);

    impl ByteSource for Countdown {
        fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
            match (self.0, buf.first_mut()) {
                (0, _) | (_, None) => Ok(0),
                (n, Some(slot)) => {
                    *slot = b'0' + n;
                    self.0 -= 1;
                    Ok(1)
                }
            }
        }
    }

    #[test]
    fn test_fill_through_box_and_reference() {
        let mut boxed: Box<dyn ByteSource> = Box::new(Countdown(2));
        let mut buf = [0u8; 4];
        assert_eq!(boxed.fill(&mut buf), Ok(1));
        assert_eq!(buf[0], b'2');

        let by_ref = &mut boxed;
        assert_eq!(by_ref.fill(&mut buf), Ok(1));
        assert_eq!(buf[0], b'1');
        assert_eq!(by_ref.fill(&mut buf), Ok(0));
    }

    #[test]
    fn test_io_error_classification() {
        let oom = std::io::Error::from(std::io::ErrorKind::OutOfMemory);
        assert_eq!(SourceError::io(&oom).kind(), SourceErrorKind::OutOfMemory);

        let other = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err = SourceError::io(&other);
        assert_eq!(err.kind(), SourceErrorKind::Io);
        assert_eq!(err.to_string(), "read failed: pipe");
    }
}
