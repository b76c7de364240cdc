// SPDX-License-Identifier: Apache-2.0

use crate::byte_source::{ByteSource, SourceError, SourceErrorKind};

/// A [`ByteSource`] driven by a pull closure.
///
/// The closure receives the destination buffer and returns the number of
/// bytes it wrote, `0` at end of input, or a negative value on failure.
/// Any state the closure needs travels in its captures.
///
/// ```rust
/// use jsonsax::{CallbackSource, Parser, ParseOptions, PropertyListBuilder, Value};
///
/// let mut packets = vec![&b"[1,"[..], &b" 2]"[..]].into_iter();
/// let source = CallbackSource::new(move |buf: &mut [u8]| match packets.next() {
///     Some(packet) => {
///         buf[..packet.len()].copy_from_slice(packet);
///         packet.len() as isize
///     }
///     None => 0,
/// });
///
/// let mut builder = PropertyListBuilder::new();
/// let mut parser = Parser::new();
/// parser.configure(source, ParseOptions::NONE);
/// parser.parse(&mut builder).unwrap();
/// assert_eq!(
///     builder.into_value(),
///     Some(Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
/// );
/// ```
pub struct CallbackSource<F> {
    pull: F,
    finished: bool,
}

impl<F> CallbackSource<F>
where
    F: FnMut(&mut [u8]) -> isize,
{
    pub fn new(pull: F) -> Self {
        Self {
            pull,
            finished: false,
        }
    }
}

impl<F> core::fmt::Debug for CallbackSource<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackSource")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<F> ByteSource for CallbackSource<F>
where
    F: FnMut(&mut [u8]) -> isize,
{
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if self.finished {
            return Ok(0);
        }
        let produced = (self.pull)(buf);
        match usize::try_from(produced) {
            Ok(0) => {
                self.finished = true;
                Ok(0)
            }
            Ok(n) if n <= buf.len() => Ok(n),
            Ok(n) => {
                self.finished = true;
                Err(SourceError::new(
                    SourceErrorKind::Callback,
                    format!("callback reported {n} bytes for a {} byte buffer", buf.len()),
                ))
            }
            Err(_) => {
                self.finished = true;
                Err(SourceError::new(
                    SourceErrorKind::Callback,
                    format!("callback returned {produced}"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_return_is_failure() {
        let mut source = CallbackSource::new(|_buf: &mut [u8]| -1);
        let err = source.fill(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), SourceErrorKind::Callback);
        assert_eq!(source.fill(&mut [0u8; 4]), Ok(0));
    }

    #[test]
    fn test_overlong_return_is_failure() {
        let mut source = CallbackSource::new(|_buf: &mut [u8]| 100);
        let err = source.fill(&mut [0u8; 4]).unwrap_err();
        assert!(err.message().contains("100 bytes"));
    }

    #[test]
    fn test_end_of_input_stops_calling() {
        let mut calls = 0;
        {
            let mut source = CallbackSource::new(|buf: &mut [u8]| {
                calls += 1;
                if calls == 1 {
                    buf[0] = b'7';
                    1
                } else {
                    0
                }
            });
            let mut buf = [0u8; 2];
            assert_eq!(source.fill(&mut buf), Ok(1));
            assert_eq!(source.fill(&mut buf), Ok(0));
            assert_eq!(source.fill(&mut buf), Ok(0));
        }
        assert_eq!(calls, 2);
    }
}
