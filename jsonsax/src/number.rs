// SPDX-License-Identifier: Apache-2.0

//! Number lexing and conversion.
//!
//! Classification is lexical: a literal with a fraction or exponent is a
//! float even when its value is integral, everything else is an integer.

/// A numeric scalar as reported to the delegate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Converts a complete, already validated literal.
    ///
    /// Integer literals that do not fit `i64` become the nearest `f64`.
    pub fn from_lexeme(lexeme: &[u8], is_float: bool) -> Option<Number> {
        if !is_float {
            match from_ascii_i64(lexeme) {
                Ok(value) => return Some(Number::Integer(value)),
                Err(ConstParseIntegerError::Overflow) => {
                    log::warn!(
                        "integer {} does not fit in i64, reporting as float",
                        lexeme.escape_ascii()
                    );
                }
                Err(_) => return None,
            }
        }
        core::str::from_utf8(lexeme)
            .ok()?
            .parse::<f64>()
            .ok()
            .map(Number::Float)
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

/// Floats always print with a fraction or an exponent, so the text lexes
/// back as a float.
impl core::fmt::Display for Number {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(v) if !v.is_finite() => write!(f, "{v}"),
            // `Debug` keeps a `.0` or switches to `1e16` notation.
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Error from [`from_ascii_i64`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ConstParseIntegerError {
    Empty,
    SignOnly,
    InvalidDigit,
    Overflow,
}

/// Parses a base-10 `i64` without panicking.
///
/// Negative numbers are accumulated downwards so `i64::MIN` parses.
pub const fn from_ascii_i64(src: &[u8]) -> Result<i64, ConstParseIntegerError> {
    let (is_negative, mut digits) = match src {
        [] => return Err(ConstParseIntegerError::Empty),
        [b'+', rest @ ..] => (false, rest),
        [b'-', rest @ ..] => (true, rest),
        _ => (false, src),
    };

    if digits.is_empty() {
        return Err(ConstParseIntegerError::SignOnly);
    }

    let mut result: i64 = 0;
    while let Some((&byte, rest)) = digits.split_first() {
        let digit = match byte {
            b'0'..=b'9' => (byte - b'0') as i64,
            _ => return Err(ConstParseIntegerError::InvalidDigit),
        };
        result = match result.checked_mul(10) {
            Some(val) => val,
            None => return Err(ConstParseIntegerError::Overflow),
        };
        result = if is_negative {
            match result.checked_sub(digit) {
                Some(val) => val,
                None => return Err(ConstParseIntegerError::Overflow),
            }
        } else {
            match result.checked_add(digit) {
                Some(val) => val,
                None => return Err(ConstParseIntegerError::Overflow),
            }
        };
        digits = rest;
    }
    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumState {
    Start,
    Sign,
    LeadingZero,
    Integer,
    Dot,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentDigits,
}

/// Outcome of feeding one byte to a [`NumberLexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumStep {
    /// The byte belongs to the number.
    Accept,
    /// The number ended before this byte, which is not consumed.
    End,
    /// The byte makes the literal malformed.
    Reject,
}

/// Byte-at-a-time validator for the JSON number grammar.
#[derive(Debug, Clone)]
pub struct NumberLexer {
    state: NumState,
    is_float: bool,
}

impl Default for NumberLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberLexer {
    pub fn new() -> Self {
        Self {
            state: NumState::Start,
            is_float: false,
        }
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    /// Whether the bytes so far form a complete number.
    pub fn is_complete(&self) -> bool {
        matches!(
            self.state,
            NumState::LeadingZero
                | NumState::Integer
                | NumState::Fraction
                | NumState::ExponentDigits
        )
    }

    pub fn feed(&mut self, byte: u8) -> NumStep {
        let next = match (self.state, byte) {
            (NumState::Start, b'-') => Some(NumState::Sign),
            (NumState::Start | NumState::Sign, b'0') => Some(NumState::LeadingZero),
            (NumState::Start | NumState::Sign, b'1'..=b'9') => Some(NumState::Integer),
            (NumState::Integer, b'0'..=b'9') => Some(NumState::Integer),
            (NumState::LeadingZero | NumState::Integer, b'.') => Some(NumState::Dot),
            (NumState::Dot | NumState::Fraction, b'0'..=b'9') => Some(NumState::Fraction),
            (NumState::LeadingZero | NumState::Integer | NumState::Fraction, b'e' | b'E') => {
                Some(NumState::Exponent)
            }
            (NumState::Exponent, b'+' | b'-') => Some(NumState::ExponentSign),
            (
                NumState::Exponent | NumState::ExponentSign | NumState::ExponentDigits,
                b'0'..=b'9',
            ) => Some(NumState::ExponentDigits),
            _ => None,
        };
        match next {
            Some(state) => {
                if matches!(state, NumState::Dot | NumState::Exponent) {
                    self.is_float = true;
                }
                self.state = state;
                NumStep::Accept
            }
            None if self.is_complete() && is_delimiter(byte) => NumStep::End,
            None => NumStep::Reject,
        }
    }
}

/// Bytes allowed to follow a number.
pub fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b']' | b'}' | b'[' | b'{' | b'"' | b'/'
    )
}
