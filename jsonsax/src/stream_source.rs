// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use crate::byte_source::{ByteSource, SourceError};

/// A [`ByteSource`] over any blocking [`std::io::Read`] (sockets, pipes,
/// decompressors, `stdin`).
///
/// Reads block the parsing thread; timeouts belong to the reader itself.
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
    finished: bool,
}

impl<R: Read> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }

    /// Gives the reader back, e.g. to read what follows the JSON document.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.finished {
            return Ok(0);
        }
        loop {
            match self.reader.read(buf) {
                Ok(0) => {
                    self.finished = true;
                    return Ok(0);
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Err(SourceError::io(&e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_source::SourceErrorKind;

    /// Reader that is interrupted once, then fails.
    struct Flaky {
        calls: usize,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.calls += 1;
            match self.calls {
                1 => Err(std::io::ErrorKind::Interrupted.into()),
                2 => {
                    buf[0] = b'[';
                    Ok(1)
                }
                _ => Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "peer went away",
                )),
            }
        }
    }

    #[test]
    fn test_reads_through_cursor() {
        let mut source = StreamSource::new(std::io::Cursor::new(b"true".to_vec()));
        let mut buf = [0u8; 16];
        assert_eq!(source.fill(&mut buf), Ok(4));
        assert_eq!(source.fill(&mut buf), Ok(0));
        assert_eq!(source.into_inner().position(), 4);
    }

    #[test]
    fn test_retries_interrupted_and_reports_failure() {
        let mut source = StreamSource::new(Flaky { calls: 0 });
        let mut buf = [0u8; 4];
        assert_eq!(source.fill(&mut buf), Ok(1));
        let err = source.fill(&mut buf).unwrap_err();
        assert_eq!(err.kind(), SourceErrorKind::Io);
        assert!(err.message().contains("peer went away"));
        // A failed stream is not read again.
        assert_eq!(source.fill(&mut buf), Ok(0));
        assert_eq!(source.into_inner().calls, 3);
    }
}
