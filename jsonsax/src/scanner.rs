// SPDX-License-Identifier: Apache-2.0

//! Lexical layer: turns bytes from a [`ScanBuffer`] into JSON lexemes.
//!
//! The scanner does not know about nesting. The dispatcher asks it for the
//! next significant byte and then, depending on what it expects, for the
//! rest of a string, key, number or literal starting at that byte.

use std::borrow::Cow;

use crate::byte_source::ByteSource;
use crate::escape_processor::{EscapeError, EscapeProcessor, UnicodeEscape};
use crate::number::{NumStep, Number, NumberLexer};
use crate::parse_error::{ErrorCode, Location, ParseError};
use crate::scan_buffer::ScanBuffer;

/// The three fixed-text literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    True,
    False,
    Null,
}

/// Longest literal is `false`.
const MAX_LITERAL_LEN: usize = 5;

pub struct Scanner<S> {
    buffer: ScanBuffer<S>,
    /// Unescaped content of the current string, key or number.
    scratch: Vec<u8>,
    strict: bool,
    token_start: Location,
}

impl<S: ByteSource> Scanner<S> {
    pub fn new(buffer: ScanBuffer<S>, strict: bool) -> Self {
        Self {
            buffer,
            scratch: Vec::new(),
            strict,
            token_start: Location::start(),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Location of the next unread byte.
    pub fn location(&self) -> Location {
        self.buffer.location()
    }

    /// Location of the byte returned by the last read.
    pub fn last_location(&self) -> Location {
        self.buffer.last_location()
    }

    /// Skips whitespace, and comments outside strict mode, and returns the
    /// first significant byte. `None` means end of input.
    pub fn next_token_byte(&mut self) -> Result<Option<u8>, ParseError> {
        loop {
            match self.buffer.next_byte()? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => continue,
                Some(b'/') => self.skip_comment()?,
                other => return Ok(other),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), ParseError> {
        let start = self.buffer.last_location();
        if self.strict {
            return Err(ParseError::new(
                ErrorCode::BadFormat,
                "comments are not allowed in strict mode",
                start,
            ));
        }
        match self.buffer.next_byte()? {
            Some(b'/') => loop {
                match self.buffer.next_byte()? {
                    Some(b'\n') | None => return Ok(()),
                    Some(_) => {}
                }
            },
            Some(b'*') => {
                let mut star = false;
                loop {
                    match self.buffer.next_byte()? {
                        Some(b'/') if star => return Ok(()),
                        Some(b) => star = b == b'*',
                        None => {
                            return Err(ParseError::new(
                                ErrorCode::PrematureEnd,
                                "unterminated block comment",
                                self.buffer.location(),
                            ))
                        }
                    }
                }
            }
            Some(_) => Err(ParseError::new(
                ErrorCode::BadToken,
                "expected '/' or '*' after '/'",
                self.buffer.last_location(),
            )),
            None => Err(self.premature("unexpected end of input after '/'")),
        }
    }

    /// Scans a string whose opening quote was just read.
    ///
    /// The unescaped bytes are available through [`text`](Self::text).
    pub fn scan_string(&mut self) -> Result<(), ParseError> {
        self.token_start = self.buffer.last_location();
        self.scratch.clear();
        loop {
            match self.buffer.next_byte()? {
                None => return Err(self.premature("unterminated string")),
                Some(b'"') => return Ok(()),
                Some(b'\\') => self.scan_escape()?,
                Some(b) if b < 0x20 && self.strict => {
                    return Err(ParseError::new(
                        ErrorCode::BadFormat,
                        format!("unescaped control character 0x{b:02x} in string"),
                        self.buffer.last_location(),
                    ))
                }
                Some(b) => self.push_scratch(&[b])?,
            }
        }
    }

    fn scan_escape(&mut self) -> Result<(), ParseError> {
        let escape = self
            .buffer
            .next_byte()?
            .ok_or_else(|| self.premature("unterminated escape sequence"))?;
        if escape != b'u' {
            let byte = EscapeProcessor::process_simple_escape(escape)
                .map_err(|e| self.escape_error(e, self.buffer.last_location()))?;
            return self.push_scratch(&[byte]);
        }

        let (codepoint, at) = self.read_hex4()?;
        let c = match EscapeProcessor::process_unicode_escape(codepoint, None)
            .map_err(|e| self.escape_error(e, at))?
        {
            UnicodeEscape::Char(c) => c,
            UnicodeEscape::HighSurrogate(high) => {
                let unpaired = EscapeError::UnpairedHighSurrogate(high);
                for expected in [b'\\', b'u'] {
                    match self.buffer.next_byte()? {
                        Some(b) if b == expected => {}
                        Some(_) => {
                            let at = self.buffer.last_location();
                            return Err(self.escape_error(unpaired, at));
                        }
                        None => return Err(self.premature("unterminated surrogate pair")),
                    }
                }
                let (low, at) = self.read_hex4()?;
                match EscapeProcessor::process_unicode_escape(low, Some(high))
                    .map_err(|e| self.escape_error(e, at))?
                {
                    UnicodeEscape::Char(c) => c,
                    UnicodeEscape::HighSurrogate(_) => return Err(self.escape_error(unpaired, at)),
                }
            }
        };
        let mut utf8 = [0u8; 4];
        self.push_scratch(c.encode_utf8(&mut utf8).as_bytes())
    }

    /// Reads the four hex digits of a `\u` escape. Returns the code unit and
    /// the location of its first digit.
    fn read_hex4(&mut self) -> Result<(u32, Location), ParseError> {
        let start = self.buffer.location();
        let mut codepoint = 0u32;
        for _ in 0..4 {
            let byte = self
                .buffer
                .next_byte()?
                .ok_or_else(|| self.premature("unterminated unicode escape"))?;
            let digit = EscapeProcessor::validate_hex_digit(byte)
                .map_err(|e| self.escape_error(e, self.buffer.last_location()))?;
            codepoint = (codepoint << 4) | digit;
        }
        Ok((codepoint, start))
    }

    /// Scans a bare object key starting with `first`.
    ///
    /// The key ends before `:`, whitespace, or a comment.
    pub fn scan_unquoted_key(&mut self, first: u8) -> Result<(), ParseError> {
        self.token_start = self.buffer.last_location();
        self.scratch.clear();
        self.check_key_byte(first, self.token_start)?;
        self.push_scratch(&[first])?;
        loop {
            match self.buffer.next_byte()? {
                None => return Err(self.premature("unexpected end of input in object key")),
                Some(b' ' | b'\t' | b'\n' | b'\r') => return Ok(()),
                Some(b @ (b':' | b'/')) => {
                    self.buffer.push_back(b);
                    return Ok(());
                }
                Some(b) => {
                    self.check_key_byte(b, self.buffer.last_location())?;
                    self.push_scratch(&[b])?;
                }
            }
        }
    }

    fn check_key_byte(&self, byte: u8, at: Location) -> Result<(), ParseError> {
        if byte < 0x20 || matches!(byte, b'"' | b',' | b'[' | b']' | b'{' | b'}') {
            return Err(ParseError::new(
                ErrorCode::BadToken,
                format!("unexpected '{}' in unquoted key", byte.escape_ascii()),
                at,
            ));
        }
        Ok(())
    }

    /// Text of the last string or key.
    ///
    /// Invalid UTF-8 is an error in strict mode and replaced otherwise.
    pub fn text(&self) -> Result<Cow<'_, str>, ParseError> {
        match core::str::from_utf8(&self.scratch) {
            Ok(text) => Ok(Cow::Borrowed(text)),
            Err(e) if self.strict => Err(ParseError::new(
                ErrorCode::BadFormat,
                format!("invalid UTF-8 in string: {e}"),
                self.token_start,
            )),
            Err(_) => {
                log::warn!(
                    "replacing invalid UTF-8 in string at {}",
                    self.token_start
                );
                Ok(String::from_utf8_lossy(&self.scratch))
            }
        }
    }

    /// Checks the last string or key without producing it. Only strict mode
    /// rejects invalid UTF-8.
    pub fn validate_text(&self) -> Result<(), ParseError> {
        if self.strict {
            self.text()?;
        }
        Ok(())
    }

    /// Scans a number starting with `first`, leaving the byte after it unread.
    pub fn scan_number(&mut self, first: u8) -> Result<Number, ParseError> {
        self.token_start = self.buffer.last_location();
        self.scratch.clear();
        let mut lexer = NumberLexer::new();
        if lexer.feed(first) != NumStep::Accept {
            return Err(self.bad_number(self.token_start));
        }
        self.push_scratch(&[first])?;
        loop {
            match self.buffer.next_byte()? {
                None if lexer.is_complete() => break,
                None => return Err(self.bad_number(self.buffer.location())),
                Some(b) => match lexer.feed(b) {
                    NumStep::Accept => self.push_scratch(&[b])?,
                    NumStep::End => {
                        self.buffer.push_back(b);
                        break;
                    }
                    NumStep::Reject => return Err(self.bad_number(self.buffer.last_location())),
                },
            }
        }
        Number::from_lexeme(&self.scratch, lexer.is_float())
            .ok_or_else(|| self.bad_number(self.token_start))
    }

    /// Scans `true`, `false` or `null` starting with `first`.
    pub fn scan_literal(&mut self, first: u8) -> Result<Literal, ParseError> {
        self.token_start = self.buffer.last_location();
        self.scratch.clear();
        self.push_scratch(&[first])?;
        loop {
            match self.buffer.next_byte()? {
                Some(b) if (b.is_ascii_alphanumeric() || b == b'_')
                    && self.scratch.len() <= MAX_LITERAL_LEN =>
                {
                    self.push_scratch(&[b])?
                }
                Some(b) => {
                    self.buffer.push_back(b);
                    break;
                }
                None => break,
            }
        }
        match self.scratch.as_slice() {
            b"true" => Ok(Literal::True),
            b"false" => Ok(Literal::False),
            b"null" => Ok(Literal::Null),
            word if b"true".starts_with(word)
                || b"false".starts_with(word)
                || b"null".starts_with(word) =>
            {
                if self.buffer.peek()?.is_none() {
                    Err(self.premature("unexpected end of input in literal"))
                } else {
                    Err(self.unrecognized_literal())
                }
            }
            _ => Err(self.unrecognized_literal()),
        }
    }

    fn unrecognized_literal(&self) -> ParseError {
        ParseError::new(
            ErrorCode::BadToken,
            format!("unrecognized token '{}'", self.scratch.escape_ascii()),
            self.token_start,
        )
    }

    fn push_scratch(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        self.scratch.try_reserve(bytes.len()).map_err(|_| {
            ParseError::new(
                ErrorCode::Memory,
                "out of memory growing token buffer",
                self.buffer.location(),
            )
        })?;
        self.scratch.extend_from_slice(bytes);
        Ok(())
    }

    fn premature(&self, message: &'static str) -> ParseError {
        ParseError::new(ErrorCode::PrematureEnd, message, self.buffer.location())
    }

    fn escape_error(&self, err: EscapeError, at: Location) -> ParseError {
        ParseError::new(ErrorCode::BadEscapeSequence, err.to_string(), at)
    }

    fn bad_number(&self, at: Location) -> ParseError {
        ParseError::new(
            ErrorCode::BadNumber,
            format!("malformed number '{}'", self.scratch.escape_ascii()),
            at,
        )
    }
}
