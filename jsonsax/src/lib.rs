// SPDX-License-Identifier: Apache-2.0

//! Event-driven (SAX style) JSON parsing over pluggable byte sources.
//!
//! A [`Parser`] pulls bytes from a [`ByteSource`] (memory, file, any
//! [`std::io::Read`], or a pull closure), tokenizes them and reports each
//! structural element and scalar to a [`ParserDelegate`]. Nesting is
//! tracked on an explicit stack, so deep documents cannot overflow the call
//! stack. [`PropertyListBuilder`] turns the events into a [`Value`] tree.
//!
//! By default the parser accepts a few extensions to JSON: unquoted object
//! keys, `//` and `/* */` comments, and raw control characters in strings.
//! [`ParseOptions::STRICT`] turns them off. A trailing comma is an error in
//! both modes.
//!
//! ```rust
//! use jsonsax::{Event, EventFn, ParseContext, ParseOptions, Parser};
//!
//! let mut log = Vec::new();
//! let mut parser = Parser::from_str("{a: [1, 2.0], // comment\n b: null}", ParseOptions::NONE);
//! parser
//!     .parse(&mut EventFn(|_cx: &mut ParseContext, event: Event<'_>| {
//!         log.push(format!("{event:?}"));
//!     }))
//!     .unwrap();
//! assert_eq!(log[2], "Key(\"a\")");
//! assert_eq!(log[5], "Float(2.0)");
//! ```

mod byte_source;
pub use byte_source::{ByteSource, SourceError, SourceErrorKind};

mod callback_source;
pub use callback_source::CallbackSource;

mod file_source;
pub use file_source::FileSource;

mod slice_source;
pub use slice_source::SliceSource;

mod stream_source;
pub use stream_source::StreamSource;

mod transcoding;
pub use transcoding::{Encoding, TranscodingSource};

mod scan_buffer;
pub use scan_buffer::ScanBuffer;

mod container_stack;
pub use container_stack::{Container, ContainerStack, StackUnderflow};

mod escape_processor;

mod number;
pub use number::Number;

mod scanner;

mod delegate;
pub use delegate::{Event, EventFn, ParseContext, ParserDelegate};

mod dispatcher;

mod options;
pub use options::ParseOptions;

mod parse_error;
pub use parse_error::{ErrorCode, Location, ParseError, ParseFailure};

mod parser;
pub use parser::Parser;

mod property_list;
pub use property_list::{
    from_reader, from_slice, from_str, Map, PropertyListBuilder, PropertyListOptions, Value,
};
