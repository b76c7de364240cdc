// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::collections::HashSet;

use jsonsax::{
    ErrorCode, ParseContext, ParseError, ParseFailure, ParseOptions, Parser, ParserDelegate,
};

/// Owned copy of one delegate callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Ev {
    StartDoc,
    EndDoc,
    StartArr,
    EndArr,
    StartObj,
    EndObj,
    Key(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Error(ErrorCode),
}

pub fn key(k: &str) -> Ev {
    Ev::Key(k.to_owned())
}

pub fn s(v: &str) -> Ev {
    Ev::Str(v.to_owned())
}

/// Records every callback, optionally skipping keys or aborting.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Ev>,
    pub errors: Vec<ParseError>,
    pub skip: HashSet<String>,
    pub abort_on_key: Option<String>,
}

impl Recorder {
    pub fn skipping(keys: &[&str]) -> Self {
        Self {
            skip: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn aborting_at(key: &str) -> Self {
        Self {
            abort_on_key: Some(key.to_owned()),
            ..Self::default()
        }
    }
}

impl ParserDelegate for Recorder {
    fn did_start_document(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::StartDoc);
    }
    fn did_end_document(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::EndDoc);
    }
    fn did_start_array(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::StartArr);
    }
    fn did_end_array(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::EndArr);
    }
    fn did_start_object(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::StartObj);
    }
    fn did_end_object(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::EndObj);
    }
    fn should_skip_value_for_key(&mut self, _cx: &mut ParseContext, key: &str) -> bool {
        self.skip.contains(key)
    }
    fn found_key(&mut self, cx: &mut ParseContext, key: &str) {
        self.events.push(Ev::Key(key.to_owned()));
        if self.abort_on_key.as_deref() == Some(key) {
            cx.abort();
        }
    }
    fn found_string(&mut self, _cx: &mut ParseContext, value: &str) {
        self.events.push(Ev::Str(value.to_owned()));
    }
    fn found_integer(&mut self, _cx: &mut ParseContext, value: i64) {
        self.events.push(Ev::Int(value));
    }
    fn found_float(&mut self, _cx: &mut ParseContext, value: f64) {
        self.events.push(Ev::Float(value));
    }
    fn found_bool(&mut self, _cx: &mut ParseContext, value: bool) {
        self.events.push(Ev::Bool(value));
    }
    fn found_null(&mut self, _cx: &mut ParseContext) {
        self.events.push(Ev::Null);
    }
    fn error(&mut self, _cx: &mut ParseContext, error: &ParseError) {
        self.events.push(Ev::Error(error.code()));
        self.errors.push(error.clone());
    }
}

/// Parses `json` with a fresh [`Recorder`].
pub fn record(json: &str, options: ParseOptions) -> (Vec<Ev>, Result<(), ParseFailure>) {
    let mut recorder = Recorder::default();
    let result = Parser::from_str(json, options).parse(&mut recorder);
    (recorder.events, result)
}

/// Parses `json` and returns the reported error.
pub fn parse_err(json: &str, options: ParseOptions) -> ParseError {
    let mut recorder = Recorder::default();
    let result = Parser::from_str(json, options).parse(&mut recorder);
    let failure = result.expect_err("input should be rejected");
    let error = failure.error().cloned().expect("a parse error, not an abort");
    assert_eq!(recorder.errors, vec![error.clone()], "error reported exactly once");
    assert_eq!(recorder.events.last(), Some(&Ev::Error(error.code())));
    error
}

pub fn load_test_file(filename: &str) -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let path = std::path::Path::new(&manifest_dir)
        .join("tests/data")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read test file: {}", filename))
}

pub fn data_path(filename: &str) -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    std::path::Path::new(&manifest_dir).join("tests/data").join(filename)
}
