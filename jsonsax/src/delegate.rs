// SPDX-License-Identifier: Apache-2.0

//! The callback contract between the parser and its consumer.

use crate::number::Number;
use crate::parse_error::{Location, ParseError};

/// Parser state visible to delegate callbacks.
///
/// Passed to every callback. Also the only way for a delegate to stop the
/// parse early, through [`abort`](Self::abort).
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub(crate) current_key: Option<String>,
    pub(crate) location: Location,
    pub(crate) depth: usize,
    pub(crate) aborted: bool,
}

impl ParseContext {
    /// The most recent object key.
    ///
    /// Inside an array this is the key the array was stored under.
    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    /// Byte offset just past the current token.
    pub fn position(&self) -> usize {
        self.location.position
    }

    pub fn line_number(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Stop parsing once the current callback returns.
    ///
    /// No further callbacks are made and `parse()` returns
    /// [`ParseFailure::Aborted`](crate::ParseFailure::Aborted).
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Receives parse events in document order.
///
/// Every method has an empty default, so a delegate implements only what it
/// needs.
#[allow(unused_variables)]
pub trait ParserDelegate {
    fn did_start_document(&mut self, cx: &mut ParseContext) {}

    fn did_end_document(&mut self, cx: &mut ParseContext) {}

    fn did_start_array(&mut self, cx: &mut ParseContext) {}

    fn did_end_array(&mut self, cx: &mut ParseContext) {}

    fn did_start_object(&mut self, cx: &mut ParseContext) {}

    fn did_end_object(&mut self, cx: &mut ParseContext) {}

    /// Asked once per key, before [`found_key`](Self::found_key).
    ///
    /// Returning `true` discards the key's value without any callbacks for
    /// it, and `found_key` is not called for that key either.
    fn should_skip_value_for_key(&mut self, cx: &mut ParseContext, key: &str) -> bool {
        false
    }

    fn found_key(&mut self, cx: &mut ParseContext, key: &str) {}

    fn found_string(&mut self, cx: &mut ParseContext, value: &str) {}

    /// Called for every number. The default forwards to
    /// [`found_integer`](Self::found_integer) or [`found_float`](Self::found_float).
    fn found_number(&mut self, cx: &mut ParseContext, value: Number) {
        match value {
            Number::Integer(i) => self.found_integer(cx, i),
            Number::Float(f) => self.found_float(cx, f),
        }
    }

    fn found_integer(&mut self, cx: &mut ParseContext, value: i64) {}

    fn found_float(&mut self, cx: &mut ParseContext, value: f64) {}

    fn found_bool(&mut self, cx: &mut ParseContext, value: bool) {}

    fn found_null(&mut self, cx: &mut ParseContext) {}

    /// Called at most once, right before `parse()` fails.
    fn error(&mut self, cx: &mut ParseContext, error: &ParseError) {}
}

impl<D: ParserDelegate + ?Sized> ParserDelegate for &mut D {
    fn did_start_document(&mut self, cx: &mut ParseContext) {
        (**self).did_start_document(cx)
    }
    fn did_end_document(&mut self, cx: &mut ParseContext) {
        (**self).did_end_document(cx)
    }
    fn did_start_array(&mut self, cx: &mut ParseContext) {
        (**self).did_start_array(cx)
    }
    fn did_end_array(&mut self, cx: &mut ParseContext) {
        (**self).did_end_array(cx)
    }
    fn did_start_object(&mut self, cx: &mut ParseContext) {
        (**self).did_start_object(cx)
    }
    fn did_end_object(&mut self, cx: &mut ParseContext) {
        (**self).did_end_object(cx)
    }
    fn should_skip_value_for_key(&mut self, cx: &mut ParseContext, key: &str) -> bool {
        (**self).should_skip_value_for_key(cx, key)
    }
    fn found_key(&mut self, cx: &mut ParseContext, key: &str) {
        (**self).found_key(cx, key)
    }
    fn found_string(&mut self, cx: &mut ParseContext, value: &str) {
        (**self).found_string(cx, value)
    }
    fn found_number(&mut self, cx: &mut ParseContext, value: Number) {
        (**self).found_number(cx, value)
    }
    fn found_integer(&mut self, cx: &mut ParseContext, value: i64) {
        (**self).found_integer(cx, value)
    }
    fn found_float(&mut self, cx: &mut ParseContext, value: f64) {
        (**self).found_float(cx, value)
    }
    fn found_bool(&mut self, cx: &mut ParseContext, value: bool) {
        (**self).found_bool(cx, value)
    }
    fn found_null(&mut self, cx: &mut ParseContext) {
        (**self).found_null(cx)
    }
    fn error(&mut self, cx: &mut ParseContext, error: &ParseError) {
        (**self).error(cx, error)
    }
}

/// One delegate callback as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    StartDocument,
    EndDocument,
    StartArray,
    EndArray,
    StartObject,
    EndObject,
    Key(&'a str),
    String(&'a str),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    Error(&'a ParseError),
}

/// Adapts a closure taking [`Event`]s into a [`ParserDelegate`].
///
/// No value is ever skipped.
pub struct EventFn<F>(pub F);

impl<F> ParserDelegate for EventFn<F>
where
    F: FnMut(&mut ParseContext, Event<'_>),
{
    fn did_start_document(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::StartDocument)
    }
    fn did_end_document(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::EndDocument)
    }
    fn did_start_array(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::StartArray)
    }
    fn did_end_array(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::EndArray)
    }
    fn did_start_object(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::StartObject)
    }
    fn did_end_object(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::EndObject)
    }
    fn found_key(&mut self, cx: &mut ParseContext, key: &str) {
        (self.0)(cx, Event::Key(key))
    }
    fn found_string(&mut self, cx: &mut ParseContext, value: &str) {
        (self.0)(cx, Event::String(value))
    }
    fn found_integer(&mut self, cx: &mut ParseContext, value: i64) {
        (self.0)(cx, Event::Integer(value))
    }
    fn found_float(&mut self, cx: &mut ParseContext, value: f64) {
        (self.0)(cx, Event::Float(value))
    }
    fn found_bool(&mut self, cx: &mut ParseContext, value: bool) {
        (self.0)(cx, Event::Bool(value))
    }
    fn found_null(&mut self, cx: &mut ParseContext) {
        (self.0)(cx, Event::Null)
    }
    fn error(&mut self, cx: &mut ParseContext, error: &ParseError) {
        (self.0)(cx, Event::Error(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IntegersOnly(Vec<i64>);

    impl ParserDelegate for IntegersOnly {
        fn found_integer(&mut self, _cx: &mut ParseContext, value: i64) {
            self.0.push(value);
        }
    }

    #[test]
    fn test_found_number_forwards_by_kind() {
        let mut cx = ParseContext::default();
        let mut delegate = IntegersOnly(Vec::new());
        delegate.found_number(&mut cx, Number::Integer(3));
        delegate.found_number(&mut cx, Number::Float(2.5));
        delegate.did_start_array(&mut cx);
        assert!(!delegate.should_skip_value_for_key(&mut cx, "a"));
        assert_eq!(delegate.0, vec![3]);
    }

    #[test]
    fn test_event_fn_collects() {
        let mut seen = Vec::new();
        {
            let mut delegate = EventFn(|_cx: &mut ParseContext, event: Event<'_>| {
                seen.push(format!("{event:?}"));
            });
            let mut cx = ParseContext::default();
            delegate.found_key(&mut cx, "k");
            delegate.found_number(&mut cx, Number::Float(1.5));
            delegate.found_null(&mut cx);
        }
        assert_eq!(seen, ["Key(\"k\")", "Float(1.5)", "Null"]);
    }

    #[test]
    fn test_abort_flag() {
        let mut cx = ParseContext::default();
        assert!(!cx.is_aborted());
        cx.abort();
        assert!(cx.is_aborted());
        cx.reset();
        assert!(!cx.is_aborted());
        assert_eq!(cx.line_number(), 1);
    }
}
