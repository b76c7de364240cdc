// SPDX-License-Identifier: Apache-2.0

//! Generic tree materialisation on top of the event stream.
//!
//! [`PropertyListBuilder`] is an ordinary [`ParserDelegate`] that collects
//! events into a [`Value`]. Keys can be filtered with
//! [`PropertyListOptions`]; filtered values are skipped by the parser and
//! never materialised.
//!
//! ```rust
//! use jsonsax::{ParseOptions, Value};
//!
//! let value = jsonsax::from_str(r#"{"a": [1, 2.5, "x"], "b": null}"#, ParseOptions::STRICT)?;
//! assert_eq!(value.get("b"), Some(&Value::Null));
//! assert_eq!(value.to_string(), r#"{"a":[1,2.5,"x"],"b":null}"#);
//! # Ok::<(), jsonsax::ParseFailure>(())
//! ```

use core::fmt::Write as _;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use crate::delegate::{ParseContext, ParserDelegate};
use crate::options::ParseOptions;
use crate::parse_error::{ParseError, ParseFailure};
use crate::parser::Parser;

pub type Map = BTreeMap<String, Value>;

/// A JSON value.
///
/// `Clone`, `PartialEq`, `Display` and `Drop` walk the tree with a heap
/// work-list, so any depth the parser accepts is safe to use.
#[derive(Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an integer or a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Member `key` of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Object(v)
    }
}

fn write_escaped_string<W: core::fmt::Write>(src: &str, f: &mut W) -> core::fmt::Result {
    f.write_char('"')?;
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() && (c as u32) <= 0xFFFF => write!(f, "\\u{:04X}", c as u32)?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Pending output of the compact writer.
enum Piece<'a> {
    Value(&'a Value),
    Key(&'a str),
    Text(&'static str),
}

/// Compact JSON.
impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut pending = vec![Piece::Value(self)];
        while let Some(piece) = pending.pop() {
            let value = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Key(key) => {
                    write_escaped_string(key, f)?;
                    f.write_char(':')?;
                    continue;
                }
                Piece::Value(value) => value,
            };
            match value {
                Value::Null => f.write_str("null")?,
                Value::Bool(b) => f.write_str(if *b { "true" } else { "false" })?,
                Value::Integer(i) => write!(f, "{i}")?,
                // JSON has no spelling for infinities.
                Value::Float(v) if !v.is_finite() => f.write_str("null")?,
                Value::Float(v) => write!(f, "{}", crate::Number::Float(*v))?,
                Value::String(s) => write_escaped_string(s, f)?,
                Value::Array(items) => {
                    f.write_char('[')?;
                    pending.push(Piece::Text("]"));
                    for (i, item) in items.iter().enumerate().rev() {
                        pending.push(Piece::Value(item));
                        if i > 0 {
                            pending.push(Piece::Text(","));
                        }
                    }
                }
                Value::Object(map) => {
                    f.write_char('{')?;
                    pending.push(Piece::Text("}"));
                    for (i, (key, item)) in map.iter().enumerate().rev() {
                        pending.push(Piece::Value(item));
                        pending.push(Piece::Key(key));
                        if i > 0 {
                            pending.push(Piece::Text(","));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Value::Null, Value::Null) => {}
                (Value::Bool(a), Value::Bool(b)) if a == b => {}
                (Value::Integer(a), Value::Integer(b)) if a == b => {}
                (Value::Float(a), Value::Float(b)) if a == b => {}
                (Value::String(a), Value::String(b)) if a == b => {}
                (Value::Array(a), Value::Array(b)) if a.len() == b.len() => {
                    pending.extend(a.iter().zip(b));
                }
                (Value::Object(a), Value::Object(b)) if a.len() == b.len() => {
                    for ((key_a, a), (key_b, b)) in a.iter().zip(b) {
                        if key_a != key_b {
                            return false;
                        }
                        pending.push((a, b));
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// A container being copied by [`Value::clone`].
enum CloneFrame<'a> {
    Array(Vec<Value>, core::slice::Iter<'a, Value>),
    Object {
        map: Map,
        members: std::collections::btree_map::Iter<'a, String, Value>,
        key: Option<String>,
    },
}

impl<'a> CloneFrame<'a> {
    fn accept(&mut self, value: Value) {
        match self {
            CloneFrame::Array(items, _) => items.push(value),
            CloneFrame::Object { map, key, .. } => {
                if let Some(key) = key.take() {
                    map.insert(key, value);
                }
            }
        }
    }

    fn next_child(&mut self) -> Option<&'a Value> {
        match self {
            CloneFrame::Array(_, rest) => rest.next(),
            CloneFrame::Object { members, key, .. } => {
                let (name, value) = members.next()?;
                *key = Some(name.clone());
                Some(value)
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            CloneFrame::Array(items, _) => Value::Array(items),
            CloneFrame::Object { map, .. } => Value::Object(map),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        let mut frames: Vec<CloneFrame<'_>> = Vec::new();
        let mut next = self;
        loop {
            let mut done = match next {
                Value::Null => Some(Value::Null),
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Integer(i) => Some(Value::Integer(*i)),
                Value::Float(v) => Some(Value::Float(*v)),
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Array(items) => {
                    let copy = Vec::with_capacity(items.len());
                    frames.push(CloneFrame::Array(copy, items.iter()));
                    None
                }
                Value::Object(map) => {
                    frames.push(CloneFrame::Object {
                        map: Map::new(),
                        members: map.iter(),
                        key: None,
                    });
                    None
                }
            };
            // Hand finished values to their parents until a frame has
            // another child to copy.
            loop {
                let Some(frame) = frames.last_mut() else {
                    return done.unwrap_or_default();
                };
                if let Some(value) = done.take() {
                    frame.accept(value);
                }
                if let Some(child) = frame.next_child() {
                    next = child;
                    break;
                }
                done = frames.pop().map(CloneFrame::finish);
            }
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(self, &mut pending);
        while let Some(mut value) = pending.pop() {
            take_children(&mut value, &mut pending);
        }
    }
}

/// Moves the members of a container into `pending`, leaving it empty.
fn take_children(value: &mut Value, pending: &mut Vec<Value>) {
    match value {
        Value::Array(items) => pending.append(items),
        Value::Object(map) => pending.extend(core::mem::take(map).into_values()),
        _ => {}
    }
}

/// Key filters for [`PropertyListBuilder`], applied at every depth.
#[derive(Debug, Clone, Default)]
pub struct PropertyListOptions {
    /// Members with these keys are left out.
    pub ignore_keys: HashSet<String>,
    /// When non-empty, only members with these keys are kept.
    pub consider_keys: HashSet<String>,
}

impl PropertyListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.ignore_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn consider<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.consider_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Whether the member `key` is filtered out.
    pub fn skips(&self, key: &str) -> bool {
        self.ignore_keys.contains(key)
            || (!self.consider_keys.is_empty() && !self.consider_keys.contains(key))
    }
}

#[derive(Debug)]
enum Frame {
    Array(Vec<Value>),
    Object { map: Map, key: Option<String> },
}

/// Builds a [`Value`] from parser events.
///
/// Open containers are kept on an explicit frame stack, so nesting depth
/// is bounded by memory only. A repeated key replaces the earlier member.
#[derive(Debug, Default)]
pub struct PropertyListBuilder {
    options: PropertyListOptions,
    frames: Vec<Frame>,
    root: Option<Value>,
}

impl PropertyListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PropertyListOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The finished document, `None` if parsing did not complete.
    pub fn into_value(self) -> Option<Value> {
        if self.frames.is_empty() {
            self.root
        } else {
            None
        }
    }

    fn insert(&mut self, value: Value) {
        match self.frames.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { map, key }) => {
                if let Some(key) = key.take() {
                    map.insert(key, value);
                }
            }
        }
    }

    fn close(&mut self) {
        match self.frames.pop() {
            Some(Frame::Array(items)) => self.insert(Value::Array(items)),
            Some(Frame::Object { map, .. }) => self.insert(Value::Object(map)),
            None => {}
        }
    }
}

impl ParserDelegate for PropertyListBuilder {
    fn did_start_document(&mut self, _cx: &mut ParseContext) {
        self.frames.clear();
        self.root = None;
    }

    fn did_start_array(&mut self, _cx: &mut ParseContext) {
        self.frames.push(Frame::Array(Vec::new()));
    }

    fn did_end_array(&mut self, _cx: &mut ParseContext) {
        self.close();
    }

    fn did_start_object(&mut self, _cx: &mut ParseContext) {
        self.frames.push(Frame::Object {
            map: Map::new(),
            key: None,
        });
    }

    fn did_end_object(&mut self, _cx: &mut ParseContext) {
        self.close();
    }

    fn should_skip_value_for_key(&mut self, _cx: &mut ParseContext, key: &str) -> bool {
        self.options.skips(key)
    }

    fn found_key(&mut self, _cx: &mut ParseContext, key: &str) {
        if let Some(Frame::Object { key: slot, .. }) = self.frames.last_mut() {
            *slot = Some(key.to_owned());
        }
    }

    fn found_string(&mut self, _cx: &mut ParseContext, value: &str) {
        self.insert(Value::String(value.to_owned()));
    }

    fn found_integer(&mut self, _cx: &mut ParseContext, value: i64) {
        self.insert(Value::Integer(value));
    }

    fn found_float(&mut self, _cx: &mut ParseContext, value: f64) {
        self.insert(Value::Float(value));
    }

    fn found_bool(&mut self, _cx: &mut ParseContext, value: bool) {
        self.insert(Value::Bool(value));
    }

    fn found_null(&mut self, _cx: &mut ParseContext) {
        self.insert(Value::Null);
    }

    fn error(&mut self, _cx: &mut ParseContext, _error: &ParseError) {
        self.frames.clear();
        self.root = None;
    }
}

fn build(mut parser: Parser<'_>) -> Result<Value, ParseFailure> {
    let mut builder = PropertyListBuilder::new();
    parser.parse(&mut builder)?;
    Ok(builder.into_value().unwrap_or_default())
}

/// Parses `text` into a [`Value`].
pub fn from_str(text: &str, options: ParseOptions) -> Result<Value, ParseFailure> {
    build(Parser::from_str(text, options))
}

/// Parses bytes in any supported encoding, detected from the input.
pub fn from_slice(data: &[u8], options: ParseOptions) -> Result<Value, ParseFailure> {
    build(Parser::from_slice(data, None, options))
}

/// Parses everything `reader` yields.
pub fn from_reader<R: Read>(reader: R, options: ParseOptions) -> Result<Value, ParseFailure> {
    build(Parser::from_reader(reader, options))
}
