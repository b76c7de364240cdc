// SPDX-License-Identifier: Apache-2.0

// Error classification and positions.

mod common;

use common::{parse_err, record, Ev};
use jsonsax::{
    CallbackSource, ErrorCode, ParseContext, ParseFailure, ParseOptions, Parser, ParserDelegate,
    SourceError, SourceErrorKind,
};
use test_log::test;

fn code_at(json: &str, options: ParseOptions) -> (ErrorCode, usize) {
    let err = parse_err(json, options);
    (err.code(), err.position())
}

#[test]
fn test_bad_escape_points_at_escape_character() {
    let err = parse_err(r#""\q""#, ParseOptions::STRICT);
    assert_eq!(err.code(), ErrorCode::BadEscapeSequence);
    assert_eq!(err.position(), 2);
    assert_eq!(err.column(), 3);

    let err = parse_err(r#"{"key": "abc\x"}"#, ParseOptions::NONE);
    assert_eq!(err.code(), ErrorCode::BadEscapeSequence);
    assert_eq!(err.position(), 13);
}

#[test]
fn test_premature_end() {
    assert_eq!(
        code_at(r#"{"a":"#, ParseOptions::STRICT),
        (ErrorCode::PrematureEnd, 5)
    );
    assert_eq!(code_at("", ParseOptions::STRICT), (ErrorCode::PrematureEnd, 0));
    assert_eq!(code_at("   ", ParseOptions::NONE), (ErrorCode::PrematureEnd, 3));
    assert_eq!(code_at("[1, 2", ParseOptions::STRICT), (ErrorCode::PrematureEnd, 5));
    assert_eq!(code_at("\"open", ParseOptions::STRICT), (ErrorCode::PrematureEnd, 5));
    assert_eq!(code_at("[tr", ParseOptions::STRICT).0, ErrorCode::PrematureEnd);
    assert_eq!(code_at("{\"a\"", ParseOptions::STRICT).0, ErrorCode::PrematureEnd);
}

#[test]
fn test_trailing_garbage() {
    assert_eq!(code_at("[1]x", ParseOptions::STRICT), (ErrorCode::TrailingGarbage, 3));
    assert_eq!(code_at("{} {}", ParseOptions::NONE), (ErrorCode::TrailingGarbage, 3));
    assert_eq!(code_at("\"a\" 1", ParseOptions::STRICT), (ErrorCode::TrailingGarbage, 4));
}

#[test]
fn test_trailing_comment_allowed_when_relaxed() {
    let (events, result) = record("[1] // done\n/* really */", ParseOptions::NONE);
    assert!(result.is_ok());
    assert_eq!(events.last(), Some(&Ev::EndDoc));
    assert_eq!(
        code_at("[1] // done", ParseOptions::STRICT),
        (ErrorCode::BadFormat, 4)
    );
}

#[test]
fn test_mismatched_brackets() {
    assert_eq!(code_at("[1}", ParseOptions::STRICT), (ErrorCode::BadFormat, 2));
    assert_eq!(code_at("{\"a\":1]", ParseOptions::STRICT), (ErrorCode::BadFormat, 6));
    assert_eq!(code_at("]", ParseOptions::STRICT), (ErrorCode::BadFormat, 0));
    assert_eq!(code_at("[}", ParseOptions::NONE), (ErrorCode::BadFormat, 1));
    assert_eq!(code_at("{]", ParseOptions::NONE), (ErrorCode::BadFormat, 1));
}

#[test]
fn test_misplaced_comma_and_colon() {
    assert_eq!(code_at("[1,,2]", ParseOptions::STRICT), (ErrorCode::BadToken, 3));
    assert_eq!(code_at("[,1]", ParseOptions::NONE), (ErrorCode::BadToken, 1));
    assert_eq!(code_at("[1:2]", ParseOptions::STRICT), (ErrorCode::BadToken, 2));
    assert_eq!(code_at(":", ParseOptions::STRICT), (ErrorCode::BadToken, 0));
    assert_eq!(code_at("{\"a\" 1}", ParseOptions::STRICT), (ErrorCode::BadToken, 5));
    assert_eq!(code_at("{\"a\"::1}", ParseOptions::STRICT), (ErrorCode::BadToken, 5));
    assert_eq!(code_at("{,}", ParseOptions::NONE), (ErrorCode::BadToken, 1));
    assert_eq!(code_at("[1 2]", ParseOptions::STRICT), (ErrorCode::BadToken, 3));
}

#[test]
fn test_trailing_commas() {
    assert_eq!(code_at("[1,]", ParseOptions::STRICT), (ErrorCode::BadToken, 3));
    assert_eq!(code_at("[1,]", ParseOptions::NONE), (ErrorCode::BadToken, 3));
    assert_eq!(code_at("[[],\n]", ParseOptions::NONE), (ErrorCode::BadToken, 5));
    let (events, result) = record("[1,]", ParseOptions::NONE);
    assert_eq!(result.unwrap_err().code(), Some(ErrorCode::BadToken));
    assert_eq!(
        events,
        vec![
            Ev::StartDoc,
            Ev::StartArr,
            Ev::Int(1),
            Ev::Error(ErrorCode::BadToken)
        ]
    );

    assert_eq!(code_at("{\"a\":1,}", ParseOptions::STRICT), (ErrorCode::BadToken, 7));
    assert_eq!(code_at("{\"a\":1,}", ParseOptions::NONE), (ErrorCode::BadToken, 7));
}

#[test]
fn test_bad_numbers() {
    for (json, position) in [
        ("[01]", 2),
        ("[1a]", 2),
        ("[-]", 2),
        ("[1.]", 3),
        ("[1e+]", 4),
        ("[.5]", 1),
        ("[+1]", 1),
        ("-", 1),
        ("2.", 2),
    ] {
        let (code, at) = code_at(json, ParseOptions::STRICT);
        let expected = if json.starts_with("[.") || json.starts_with("[+") {
            // Not a number start at all.
            ErrorCode::BadToken
        } else {
            ErrorCode::BadNumber
        };
        assert_eq!((code, at), (expected, position), "{json}");
    }
}

#[test]
fn test_unknown_literals() {
    assert_eq!(code_at("[tru]", ParseOptions::STRICT), (ErrorCode::BadToken, 1));
    assert_eq!(code_at("[nulll]", ParseOptions::STRICT), (ErrorCode::BadToken, 1));
    assert_eq!(code_at("undefined", ParseOptions::NONE), (ErrorCode::BadToken, 0));
    assert_eq!(code_at("[True]", ParseOptions::NONE), (ErrorCode::BadToken, 1));
    assert_eq!(code_at("{\"a\": @}", ParseOptions::NONE), (ErrorCode::BadToken, 6));
}

#[test]
fn test_strict_mode_rejections() {
    assert_eq!(code_at("{a:1}", ParseOptions::STRICT), (ErrorCode::BadFormat, 1));
    assert_eq!(code_at("// c\n1", ParseOptions::STRICT), (ErrorCode::BadFormat, 0));
    assert_eq!(code_at("[/* c */1]", ParseOptions::STRICT), (ErrorCode::BadFormat, 1));
    assert_eq!(
        code_at("[\"tab\there\"]", ParseOptions::STRICT),
        (ErrorCode::BadFormat, 5)
    );
}

#[test]
fn test_invalid_surrogate_escapes() {
    assert_eq!(
        code_at(r#"["\uD83D"]"#, ParseOptions::STRICT).0,
        ErrorCode::BadEscapeSequence
    );
    assert_eq!(
        code_at(r#"["\uDE00"]"#, ParseOptions::NONE).0,
        ErrorCode::BadEscapeSequence
    );
    assert_eq!(
        code_at(r#"["\uD83DA"]"#, ParseOptions::NONE).0,
        ErrorCode::BadEscapeSequence
    );
    assert_eq!(
        code_at(r#"["\u00G0"]"#, ParseOptions::NONE),
        (ErrorCode::BadEscapeSequence, 6)
    );
}

#[test]
fn test_error_line_and_column() {
    let err = parse_err("[\n  1,\n  x]", ParseOptions::STRICT);
    assert_eq!(err.code(), ErrorCode::BadToken);
    assert_eq!((err.line(), err.column(), err.position()), (3, 3, 9));
    let text = err.to_string();
    assert!(text.starts_with("bad token: "), "{text}");
    assert!(text.ends_with("at line 3, column 3 (byte 9)"), "{text}");
}

#[test]
fn test_no_callbacks_after_error() {
    let (events, result) = record("[1, 2, }, 3]", ParseOptions::STRICT);
    assert_eq!(result.unwrap_err().code(), Some(ErrorCode::BadFormat));
    assert_eq!(
        events,
        vec![
            Ev::StartDoc,
            Ev::StartArr,
            Ev::Int(1),
            Ev::Int(2),
            Ev::Error(ErrorCode::BadFormat)
        ]
    );
}

#[test]
fn test_source_failure_is_general_error() {
    let mut recorder = common::Recorder::default();
    let mut sent = false;
    let source = CallbackSource::new(move |buf: &mut [u8]| {
        if sent {
            return -1;
        }
        sent = true;
        buf[..2].copy_from_slice(b"[1");
        2
    });
    let mut parser = Parser::new();
    parser.configure(source, ParseOptions::NONE);
    let failure = parser.parse(&mut recorder).unwrap_err();
    let err = failure.error().unwrap();
    assert_eq!(err.code(), ErrorCode::General);
    assert_eq!(err.position(), 2);
    assert_eq!(
        recorder.events,
        vec![
            Ev::StartDoc,
            Ev::StartArr,
            Ev::Error(ErrorCode::General)
        ]
    );
}

#[test]
fn test_out_of_memory_source_is_memory_error() {
    struct Exhausted;

    impl jsonsax::ByteSource for Exhausted {
        fn fill(&mut self, _buf: &mut [u8]) -> Result<usize, SourceError> {
            Err(SourceError::new(SourceErrorKind::OutOfMemory, "no buffers left"))
        }
    }

    let mut parser = Parser::new();
    parser.configure(Exhausted, ParseOptions::NONE);
    let failure = parser.parse(&mut common::Recorder::default()).unwrap_err();
    assert_eq!(failure.code(), Some(ErrorCode::Memory));
}

#[test]
fn test_error_callback_sees_error_location() {
    struct Where(Option<(usize, usize)>);

    impl ParserDelegate for Where {
        fn error(&mut self, cx: &mut ParseContext, _error: &jsonsax::ParseError) {
            self.0 = Some((cx.line_number(), cx.column()));
        }
    }

    let mut delegate = Where(None);
    let result = Parser::from_str("{\n\"a\": tx}", ParseOptions::NONE).parse(&mut delegate);
    assert!(matches!(result, Err(ParseFailure::Error(_))));
    assert_eq!(delegate.0, Some((2, 6)));
}
