// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

use crate::byte_source::{SourceError, SourceErrorKind};
use crate::container_stack::StackUnderflow;

/// Error categories reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Uncategorized failure, including byte source I/O errors.
    General,
    /// A lexeme that is not valid where it appears.
    BadToken,
    /// Structurally invalid nesting, or a relaxed construct used in strict mode.
    BadFormat,
    /// Invalid escape inside a string.
    BadEscapeSequence,
    /// Non-whitespace after the root value closed.
    TrailingGarbage,
    /// Allocation or buffer failure.
    Memory,
    /// Input ran out mid-token or mid-structure.
    PrematureEnd,
    /// Malformed numeric literal.
    BadNumber,
}

impl ErrorCode {
    /// Short stable name of the code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::General => "general error",
            ErrorCode::BadToken => "bad token",
            ErrorCode::BadFormat => "bad format",
            ErrorCode::BadEscapeSequence => "bad escape sequence",
            ErrorCode::TrailingGarbage => "trailing garbage",
            ErrorCode::Memory => "memory error",
            ErrorCode::PrematureEnd => "premature end",
            ErrorCode::BadNumber => "bad number",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the input something happened.
///
/// `position` is a 0-based byte offset, `line` and `column` are 1-based with
/// columns counted in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Location of the first byte of a stream.
    pub const fn start() -> Self {
        Self {
            position: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "line {}, column {} (byte {})",
            self.line, self.column, self.position
        )
    }
}

/// An error detected while parsing, with the place it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    code: ErrorCode,
    message: Cow<'static, str>,
    location: Location,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>, location: Location) -> Self {
        Self {
            code,
            message: message.into(),
            location,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Byte offset of the offending input.
    pub fn position(&self) -> usize {
        self.location.position
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }

    /// Builds the error for a byte source failure.
    pub(crate) fn from_source(err: SourceError, location: Location) -> Self {
        let code = match err.kind() {
            SourceErrorKind::OutOfMemory => ErrorCode::Memory,
            _ => ErrorCode::General,
        };
        Self::new(code, err.to_string(), location)
    }

    /// Builds the error for a close bracket that has nothing to close.
    pub(crate) fn from_underflow(_: StackUnderflow, location: Location) -> Self {
        Self::new(
            ErrorCode::BadFormat,
            "closing bracket without matching open bracket",
            location,
        )
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {} at {}", self.code, self.message, self.location)
    }
}

impl std::error::Error for ParseError {}

/// Why [`Parser::parse`](crate::Parser::parse) did not complete.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    /// The input was rejected. The delegate has already received this error.
    Error(ParseError),
    /// The delegate called [`ParseContext::abort`](crate::ParseContext::abort).
    Aborted,
}

impl ParseFailure {
    /// The error, unless the parse was aborted.
    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseFailure::Error(e) => Some(e),
            ParseFailure::Aborted => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.error().map(ParseError::code)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ParseFailure::Aborted)
    }
}

impl From<ParseError> for ParseFailure {
    fn from(err: ParseError) -> Self {
        ParseFailure::Error(err)
    }
}

impl core::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseFailure::Error(e) => write!(f, "{e}"),
            ParseFailure::Aborted => f.write_str("parsing aborted by delegate"),
        }
    }
}

impl std::error::Error for ParseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseFailure::Error(e) => Some(e),
            ParseFailure::Aborted => None,
        }
    }
}
