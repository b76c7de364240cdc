// SPDX-License-Identifier: Apache-2.0

//! Structural layer: drives the scanner, validates nesting and calls the
//! delegate.
//!
//! The loop is flat. Nesting lives in a [`ContainerStack`], so arbitrarily
//! deep documents do not grow the call stack.

use log::debug;

use crate::byte_source::ByteSource;
use crate::container_stack::{Container, ContainerStack};
use crate::delegate::{ParseContext, ParserDelegate};
use crate::parse_error::{ErrorCode, Location, ParseError, ParseFailure};
use crate::scanner::{Literal, Scanner};

/// What the next significant byte may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    RootValue,
    /// After `:`.
    Value,
    /// After `[`.
    ArrayValueOrEnd,
    /// After `,` in an array.
    ArrayValue,
    ArrayCommaOrEnd,
    /// After `{`.
    ObjectKeyOrEnd,
    /// After `,` in an object.
    ObjectKey,
    Colon,
    ObjectCommaOrEnd,
    Done,
}

/// Calls into the delegate, unless a value is being skipped.
struct Emitter<'a, D: ?Sized> {
    delegate: &'a mut D,
    cx: &'a mut ParseContext,
    /// Depth of the object whose value is being skipped.
    skip_depth: Option<usize>,
}

impl<D: ParserDelegate + ?Sized> Emitter<'_, D> {
    fn is_skipping(&self) -> bool {
        self.skip_depth.is_some()
    }

    fn emit<F>(&mut self, location: Location, depth: usize, f: F) -> Result<(), ParseFailure>
    where
        F: FnOnce(&mut D, &mut ParseContext),
    {
        if self.is_skipping() {
            return Ok(());
        }
        self.cx.location = location;
        self.cx.depth = depth;
        f(self.delegate, self.cx);
        self.check_abort()
    }

    fn check_abort(&self) -> Result<(), ParseFailure> {
        if self.cx.aborted {
            debug!("parse aborted by delegate at {}", self.cx.location);
            return Err(ParseFailure::Aborted);
        }
        Ok(())
    }
}

pub(crate) struct Dispatcher<'a, S, D: ?Sized> {
    scanner: Scanner<S>,
    stack: ContainerStack,
    /// Keys to restore as each open container closes.
    saved_keys: Vec<Option<String>>,
    emitter: Emitter<'a, D>,
}

impl<'a, S: ByteSource, D: ParserDelegate + ?Sized> Dispatcher<'a, S, D> {
    pub(crate) fn new(scanner: Scanner<S>, delegate: &'a mut D, cx: &'a mut ParseContext) -> Self {
        Self {
            scanner,
            stack: ContainerStack::new(),
            saved_keys: Vec::new(),
            emitter: Emitter {
                delegate,
                cx,
                skip_depth: None,
            },
        }
    }

    /// Parses the whole input.
    ///
    /// A parse error is reported to the delegate before it is returned.
    pub(crate) fn run(mut self) -> Result<(), ParseFailure> {
        match self.drive() {
            Err(ParseFailure::Error(err)) => {
                debug!("parse failed: {err}");
                let cx = &mut *self.emitter.cx;
                cx.location = err.location();
                cx.depth = self.stack.depth();
                self.emitter.delegate.error(cx, &err);
                Err(ParseFailure::Error(err))
            }
            other => other,
        }
    }

    fn drive(&mut self) -> Result<(), ParseFailure> {
        self.emitter
            .emit(self.scanner.location(), 0, |d, cx| d.did_start_document(cx))?;

        let mut expect = Expect::RootValue;
        loop {
            let Some(byte) = self.scanner.next_token_byte()? else {
                break;
            };
            let at = self.scanner.last_location();
            expect = match expect {
                Expect::Done => {
                    let byte = byte.escape_ascii();
                    let message = format!("unexpected '{byte}' after document end");
                    return Err(fail(ErrorCode::TrailingGarbage, message, at).into());
                }
                Expect::RootValue | Expect::Value => self.value(byte, at)?,
                Expect::ArrayValueOrEnd => match byte {
                    b']' => self.end_container(Container::Array, at)?,
                    _ => self.value(byte, at)?,
                },
                Expect::ArrayValue => match byte {
                    b']' => {
                        let message = "trailing comma in array";
                        return Err(fail(ErrorCode::BadToken, message, at).into());
                    }
                    _ => self.value(byte, at)?,
                },
                Expect::ArrayCommaOrEnd => match byte {
                    b',' => Expect::ArrayValue,
                    b']' => self.end_container(Container::Array, at)?,
                    b'}' => self.end_container(Container::Object, at)?,
                    _ => return Err(unexpected(byte, "',' or ']'", at).into()),
                },
                Expect::ObjectKeyOrEnd => match byte {
                    b'}' => self.end_container(Container::Object, at)?,
                    _ => self.key(byte, at)?,
                },
                Expect::ObjectKey => match byte {
                    b'}' => {
                        let message = "trailing comma in object";
                        return Err(fail(ErrorCode::BadToken, message, at).into());
                    }
                    _ => self.key(byte, at)?,
                },
                Expect::Colon => match byte {
                    b':' => Expect::Value,
                    _ => return Err(unexpected(byte, "':'", at).into()),
                },
                Expect::ObjectCommaOrEnd => match byte {
                    b',' => Expect::ObjectKey,
                    b'}' => self.end_container(Container::Object, at)?,
                    b']' => self.end_container(Container::Array, at)?,
                    _ => return Err(unexpected(byte, "',' or '}'", at).into()),
                },
            };
        }

        if expect != Expect::Done {
            let message = if expect == Expect::RootValue {
                "no value in input"
            } else {
                "unexpected end of input"
            };
            let at = self.scanner.location();
            return Err(fail(ErrorCode::PrematureEnd, message, at).into());
        }

        self.emitter
            .emit(self.scanner.location(), 0, |d, cx| d.did_end_document(cx))?;
        Ok(())
    }

    /// Handles a value starting with `byte`.
    fn value(&mut self, byte: u8, at: Location) -> Result<Expect, ParseFailure> {
        match byte {
            b'{' => {
                self.start_container(Container::Object)?;
                Ok(Expect::ObjectKeyOrEnd)
            }
            b'[' => {
                self.start_container(Container::Array)?;
                Ok(Expect::ArrayValueOrEnd)
            }
            b'"' => {
                self.scanner.scan_string()?;
                if self.emitter.is_skipping() {
                    self.scanner.validate_text()?;
                } else {
                    let location = self.scanner.location();
                    let text = self.scanner.text()?;
                    self.emitter
                        .emit(location, self.stack.depth(), |d, cx| d.found_string(cx, &text))?;
                }
                Ok(self.after_value())
            }
            b'-' | b'0'..=b'9' => {
                let number = self.scanner.scan_number(byte)?;
                self.emitter
                    .emit(self.scanner.location(), self.stack.depth(), |d, cx| {
                        d.found_number(cx, number)
                    })?;
                Ok(self.after_value())
            }
            b'a'..=b'z' | b'A'..=b'Z' => {
                let literal = self.scanner.scan_literal(byte)?;
                self.emitter
                    .emit(self.scanner.location(), self.stack.depth(), |d, cx| {
                        match literal {
                            Literal::True => d.found_bool(cx, true),
                            Literal::False => d.found_bool(cx, false),
                            Literal::Null => d.found_null(cx),
                        }
                    })?;
                Ok(self.after_value())
            }
            b']' | b'}' => {
                let kind = if byte == b']' {
                    Container::Array
                } else {
                    Container::Object
                };
                // Reports underflow or mismatch, otherwise a missing value.
                self.check_close(kind, at)?;
                Err(unexpected(byte, "a value", at).into())
            }
            _ => Err(unexpected(byte, "a value", at).into()),
        }
    }

    /// Handles an object key starting with `byte`.
    fn key(&mut self, byte: u8, at: Location) -> Result<Expect, ParseFailure> {
        match byte {
            b'"' => self.scanner.scan_string()?,
            b']' => {
                self.check_close(Container::Array, at)?;
                return Err(unexpected(byte, "an object key", at).into());
            }
            b',' | b':' | b'[' | b'{' => return Err(unexpected(byte, "an object key", at).into()),
            _ if self.scanner.is_strict() => {
                let message = "unquoted object key in strict mode";
                return Err(fail(ErrorCode::BadFormat, message, at).into());
            }
            _ => self.scanner.scan_unquoted_key(byte)?,
        }
        if self.emitter.is_skipping() {
            self.scanner.validate_text()?;
            return Ok(Expect::Colon);
        }

        let key = self.scanner.text()?.into_owned();
        let depth = self.stack.depth();
        let cx = &mut *self.emitter.cx;
        cx.current_key = Some(key.clone());
        cx.location = self.scanner.location();
        cx.depth = depth;
        if self.emitter.delegate.should_skip_value_for_key(cx, &key) {
            self.emitter.check_abort()?;
            debug!("skipping value for key '{key}'");
            self.emitter.skip_depth = Some(depth);
        } else {
            self.emitter.check_abort()?;
            self.emitter
                .emit(self.scanner.location(), depth, |d, cx| d.found_key(cx, &key))?;
        }
        Ok(Expect::Colon)
    }

    fn start_container(&mut self, kind: Container) -> Result<(), ParseFailure> {
        self.stack.push(kind);
        if self.emitter.is_skipping() {
            return Ok(());
        }
        self.saved_keys.push(self.emitter.cx.current_key.clone());
        let location = self.scanner.location();
        let depth = self.stack.depth();
        match kind {
            Container::Object => self
                .emitter
                .emit(location, depth, |d, cx| d.did_start_object(cx)),
            _ => self
                .emitter
                .emit(location, depth, |d, cx| d.did_start_array(cx)),
        }
    }

    fn end_container(&mut self, kind: Container, at: Location) -> Result<Expect, ParseFailure> {
        self.check_close(kind, at)?;
        self.stack
            .pop()
            .map_err(|e| ParseError::from_underflow(e, at))?;
        if !self.emitter.is_skipping() {
            if let Some(key) = self.saved_keys.pop() {
                self.emitter.cx.current_key = key;
            }
            let location = self.scanner.location();
            let depth = self.stack.depth();
            match kind {
                Container::Object => self
                    .emitter
                    .emit(location, depth, |d, cx| d.did_end_object(cx))?,
                _ => self
                    .emitter
                    .emit(location, depth, |d, cx| d.did_end_array(cx))?,
            }
        }
        Ok(self.after_value())
    }

    /// Checks that a bracket closing `kind` matches the innermost container.
    fn check_close(&self, kind: Container, at: Location) -> Result<(), ParseError> {
        let top = self.stack.top();
        if top == kind {
            return Ok(());
        }
        let closing = if kind == Container::Array { ']' } else { '}' };
        let message = match top {
            Container::None => format!("'{closing}' without matching open bracket"),
            Container::Array => format!("'{closing}' does not close the open array"),
            Container::Object => format!("'{closing}' does not close the open object"),
        };
        Err(fail(ErrorCode::BadFormat, message, at))
    }

    /// Next expectation after a complete value. Also ends a skip.
    fn after_value(&mut self) -> Expect {
        if self.emitter.skip_depth == Some(self.stack.depth()) {
            self.emitter.skip_depth = None;
        }
        match self.stack.top() {
            Container::Array => Expect::ArrayCommaOrEnd,
            Container::Object => Expect::ObjectCommaOrEnd,
            Container::None => Expect::Done,
        }
    }
}

fn fail(
    code: ErrorCode,
    message: impl Into<std::borrow::Cow<'static, str>>,
    at: Location,
) -> ParseError {
    ParseError::new(code, message, at)
}

fn unexpected(byte: u8, expected: &str, at: Location) -> ParseError {
    fail(
        ErrorCode::BadToken,
        format!("unexpected '{}', expected {expected}", byte.escape_ascii()),
        at,
    )
}
