// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::path::Path;

use crate::byte_source::ByteSource;
use crate::callback_source::CallbackSource;
use crate::delegate::{ParseContext, ParserDelegate};
use crate::dispatcher::Dispatcher;
use crate::file_source::FileSource;
use crate::options::ParseOptions;
use crate::parse_error::{ErrorCode, Location, ParseError, ParseFailure};
use crate::scan_buffer::{ScanBuffer, DEFAULT_CAPACITY};
use crate::scanner::Scanner;
use crate::slice_source::SliceSource;
use crate::stream_source::StreamSource;
use crate::transcoding::{Encoding, TranscodingSource};

/// A synchronous, event-driven JSON parser.
///
/// Bind a [`ByteSource`] with [`configure`](Self::configure), then call
/// [`parse`](Self::parse) with a [`ParserDelegate`]. Each configuration is
/// consumed by one parse; the source is released when `parse` returns.
///
/// ```rust
/// use jsonsax::{ParseContext, ParseOptions, Parser, ParserDelegate};
///
/// #[derive(Default)]
/// struct Sum(i64);
///
/// impl ParserDelegate for Sum {
///     fn found_integer(&mut self, _cx: &mut ParseContext, value: i64) {
///         self.0 += value;
///     }
/// }
///
/// let mut sum = Sum::default();
/// let mut parser = Parser::from_str("[1, 2, {\"x\": 3}]", ParseOptions::STRICT);
/// parser.parse(&mut sum).unwrap();
/// assert_eq!(sum.0, 6);
/// ```
pub struct Parser<'s> {
    source: Option<Box<dyn ByteSource + 's>>,
    options: ParseOptions,
    buffer_capacity: usize,
    context: ParseContext,
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> Parser<'s> {
    /// Creates a parser with no source bound.
    pub fn new() -> Self {
        Self {
            source: None,
            options: ParseOptions::NONE,
            buffer_capacity: DEFAULT_CAPACITY,
            context: ParseContext::default(),
        }
    }

    /// Sets the size of the read window (minimum 1 byte).
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Binds the source and options for the next parse.
    pub fn configure(&mut self, source: impl ByteSource + 's, options: ParseOptions) {
        self.source = Some(Box::new(source));
        self.options = options;
        self.context.reset();
    }

    /// Like [`configure`](Self::configure), converting the source from
    /// `encoding` to UTF-8. `None` detects the encoding from the input.
    pub fn configure_with_encoding(
        &mut self,
        source: impl ByteSource + 's,
        encoding: Option<Encoding>,
        options: ParseOptions,
    ) {
        self.configure(TranscodingSource::with_encoding(source, encoding), options);
    }

    fn configured(source: impl ByteSource + 's, options: ParseOptions) -> Self {
        let mut parser = Self::new();
        parser.configure(source, options);
        parser
    }

    pub fn from_str(text: &'s str, options: ParseOptions) -> Self {
        Self::configured(SliceSource::from_str(text), options)
    }

    /// Parses bytes in `encoding`, or in a sniffed encoding when `None`.
    pub fn from_slice(data: &'s [u8], encoding: Option<Encoding>, options: ParseOptions) -> Self {
        let mut parser = Self::new();
        parser.configure_with_encoding(SliceSource::full_slice(data), encoding, options);
        parser
    }

    pub fn from_path(path: impl AsRef<Path>, options: ParseOptions) -> Self {
        Self::configured(FileSource::new(path), options)
    }

    pub fn from_reader<R: Read + 's>(reader: R, options: ParseOptions) -> Self {
        Self::configured(StreamSource::new(reader), options)
    }

    /// Parses bytes produced by a pull closure, see [`CallbackSource`].
    pub fn from_fn<F>(pull: F, options: ParseOptions) -> Self
    where
        F: FnMut(&mut [u8]) -> isize + 's,
    {
        Self::configured(CallbackSource::new(pull), options)
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Whether a source is bound and waiting for `parse`.
    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    /// Parses the configured source to completion, calling `delegate` for
    /// every event.
    ///
    /// On failure the delegate has already received
    /// [`error`](ParserDelegate::error), unless it aborted the parse.
    pub fn parse<D: ParserDelegate + ?Sized>(
        &mut self,
        delegate: &mut D,
    ) -> Result<(), ParseFailure> {
        self.context.reset();
        let Some(source) = self.source.take() else {
            return self.fail_unconfigured(delegate);
        };
        log::debug!(
            "parse start: strict={} buffer={}",
            self.options.is_strict(),
            self.buffer_capacity
        );

        let buffer = ScanBuffer::with_capacity(source, self.buffer_capacity);
        let scanner = Scanner::new(buffer, self.options.is_strict());
        let result = Dispatcher::new(scanner, delegate, &mut self.context).run();
        if result.is_ok() {
            log::debug!("parse finished at {}", self.context.location());
        }
        result
    }

    fn fail_unconfigured<D: ParserDelegate + ?Sized>(
        &mut self,
        delegate: &mut D,
    ) -> Result<(), ParseFailure> {
        delegate.did_start_document(&mut self.context);
        if self.context.is_aborted() {
            return Err(ParseFailure::Aborted);
        }
        let err = ParseError::new(
            ErrorCode::General,
            "parser has no byte source configured",
            Location::start(),
        );
        delegate.error(&mut self.context, &err);
        Err(err.into())
    }

    /// Key of the most recent object member, during or after a parse.
    pub fn current_key(&self) -> Option<&str> {
        self.context.current_key()
    }

    /// Byte offset reached by the last parse.
    pub fn position(&self) -> usize {
        self.context.position()
    }

    pub fn line_number(&self) -> usize {
        self.context.line_number()
    }

    pub fn location(&self) -> Location {
        self.context.location()
    }
}
