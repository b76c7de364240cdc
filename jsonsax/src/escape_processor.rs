// SPDX-License-Identifier: Apache-2.0

/// What went wrong inside a string escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeError {
    /// Backslash followed by a character outside the escape set.
    InvalidEscape(u8),
    /// Non-hex character inside `\uXXXX`.
    InvalidHex(u8),
    /// Low surrogate without a preceding high surrogate.
    UnexpectedLowSurrogate(u32),
    /// High surrogate not followed by a `\u` low surrogate.
    UnpairedHighSurrogate(u32),
}

impl core::fmt::Display for EscapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EscapeError::InvalidEscape(b) => {
                write!(f, "invalid escape sequence '\\{}'", b.escape_ascii())
            }
            EscapeError::InvalidHex(b) => {
                write!(f, "invalid hex digit '{}' in unicode escape", b.escape_ascii())
            }
            EscapeError::UnexpectedLowSurrogate(cp) => {
                write!(f, "low surrogate \\u{cp:04X} without high surrogate")
            }
            EscapeError::UnpairedHighSurrogate(cp) => {
                write!(f, "high surrogate \\u{cp:04X} not followed by low surrogate")
            }
        }
    }
}

impl std::error::Error for EscapeError {}

/// Result of decoding one `\uXXXX` escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeEscape {
    /// A complete character.
    Char(char),
    /// A high surrogate; the next escape must be its low half.
    HighSurrogate(u32),
}

/// Pure helpers for JSON string escapes.
pub struct EscapeProcessor;

impl EscapeProcessor {
    /// Unescaped byte for the character following a backslash.
    ///
    /// `u` is not handled here, it needs four more bytes.
    pub fn process_simple_escape(escape_char: u8) -> Result<u8, EscapeError> {
        match escape_char {
            b'n' => Ok(b'\n'),
            b't' => Ok(b'\t'),
            b'r' => Ok(b'\r'),
            b'\\' => Ok(b'\\'),
            b'"' => Ok(b'"'),
            b'/' => Ok(b'/'),
            b'b' => Ok(0x08),
            b'f' => Ok(0x0C),
            other => Err(EscapeError::InvalidEscape(other)),
        }
    }

    /// Numeric value (0-15) of a hex digit.
    pub fn validate_hex_digit(byte: u8) -> Result<u32, EscapeError> {
        match byte {
            b'0'..=b'9' => Ok(u32::from(byte - b'0')),
            b'a'..=b'f' => Ok(u32::from(byte - b'a') + 10),
            b'A'..=b'F' => Ok(u32::from(byte - b'A') + 10),
            _ => Err(EscapeError::InvalidHex(byte)),
        }
    }

    pub fn is_high_surrogate(codepoint: u32) -> bool {
        (0xD800..=0xDBFF).contains(&codepoint)
    }

    pub fn is_low_surrogate(codepoint: u32) -> bool {
        (0xDC00..=0xDFFF).contains(&codepoint)
    }

    /// Combine a high and low surrogate into one code point.
    pub fn combine_surrogate_pair(high: u32, low: u32) -> Option<char> {
        if !Self::is_high_surrogate(high) || !Self::is_low_surrogate(low) {
            return None;
        }
        char::from_u32(0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF))
    }

    /// Decode the code unit of a `\uXXXX` escape.
    ///
    /// `pending_high` is the high surrogate from the escape immediately
    /// before, if any.
    pub fn process_unicode_escape(
        codepoint: u32,
        pending_high: Option<u32>,
    ) -> Result<UnicodeEscape, EscapeError> {
        match pending_high {
            Some(high) => {
                if !Self::is_low_surrogate(codepoint) {
                    return Err(EscapeError::UnpairedHighSurrogate(high));
                }
                Self::combine_surrogate_pair(high, codepoint)
                    .map(UnicodeEscape::Char)
                    .ok_or(EscapeError::UnpairedHighSurrogate(high))
            }
            None if Self::is_high_surrogate(codepoint) => {
                Ok(UnicodeEscape::HighSurrogate(codepoint))
            }
            None if Self::is_low_surrogate(codepoint) => {
                Err(EscapeError::UnexpectedLowSurrogate(codepoint))
            }
            None => char::from_u32(codepoint)
                .map(UnicodeEscape::Char)
                .ok_or(EscapeError::UnexpectedLowSurrogate(codepoint)),
        }
    }
}
