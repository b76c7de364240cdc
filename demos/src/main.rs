// SPDX-License-Identifier: Apache-2.0

//! Prints the event stream (or the materialised tree) of a JSON document.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, ValueEnum};
use jsonsax::{
    ByteSource, CallbackSource, Encoding, FileSource, ParseContext, ParseError, ParseFailure,
    ParseOptions, Parser, ParserDelegate, PropertyListBuilder, PropertyListOptions,
    StreamSource,
};

/// `--encoding` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputEncoding {
    /// Detect from the byte order mark or the zero-byte pattern.
    Auto,
    #[value(name = "utf8")]
    Utf8,
    #[value(name = "utf16le")]
    Utf16Le,
    #[value(name = "utf16be")]
    Utf16Be,
    #[value(name = "latin1")]
    Latin1,
}

impl InputEncoding {
    fn encoding(self) -> Option<Encoding> {
        match self {
            InputEncoding::Auto => None,
            InputEncoding::Utf8 => Some(Encoding::Utf8),
            InputEncoding::Utf16Le => Some(Encoding::Utf16Le),
            InputEncoding::Utf16Be => Some(Encoding::Utf16Be),
            InputEncoding::Latin1 => Some(Encoding::Latin1),
        }
    }
}

#[derive(Debug, ClapParser)]
#[command(name = "jsonsax-events", about = "Print the parse events of a JSON document")]
struct Args {
    /// Reject comments, unquoted keys and other extensions.
    #[arg(long)]
    strict: bool,

    /// Input encoding; UTF-8 without transcoding when absent.
    #[arg(long, value_enum)]
    encoding: Option<InputEncoding>,

    /// Skip the value of this key (repeatable).
    #[arg(long = "skip", value_name = "KEY")]
    skip: Vec<String>,

    /// Print the document as compact JSON instead of events.
    #[arg(long)]
    tree: bool,

    /// Feed the parser through a callback pulling N bytes at a time.
    #[arg(long, value_name = "N")]
    chunk: Option<usize>,

    /// Input file, stdin when absent.
    file: Option<PathBuf>,
}

/// Prints one line per event, indented by depth.
struct EventPrinter {
    skip: HashSet<String>,
}

impl EventPrinter {
    fn line(&self, cx: &ParseContext, text: &str) {
        println!("{:indent$}{text}", "", indent = cx.depth() * 2);
    }
}

impl ParserDelegate for EventPrinter {
    fn did_start_document(&mut self, cx: &mut ParseContext) {
        self.line(cx, "start document");
    }
    fn did_end_document(&mut self, cx: &mut ParseContext) {
        self.line(cx, "end document");
    }
    fn did_start_array(&mut self, cx: &mut ParseContext) {
        self.line(cx, "[");
    }
    fn did_end_array(&mut self, cx: &mut ParseContext) {
        self.line(cx, "]");
    }
    fn did_start_object(&mut self, cx: &mut ParseContext) {
        self.line(cx, "{");
    }
    fn did_end_object(&mut self, cx: &mut ParseContext) {
        self.line(cx, "}");
    }
    fn should_skip_value_for_key(&mut self, cx: &mut ParseContext, key: &str) -> bool {
        let skip = self.skip.contains(key);
        if skip {
            self.line(cx, &format!("key {key:?} (skipped)"));
        }
        skip
    }
    fn found_key(&mut self, cx: &mut ParseContext, key: &str) {
        self.line(cx, &format!("key {key:?}"));
    }
    fn found_string(&mut self, cx: &mut ParseContext, value: &str) {
        self.line(cx, &format!("string {value:?}"));
    }
    fn found_integer(&mut self, cx: &mut ParseContext, value: i64) {
        self.line(cx, &format!("integer {value}"));
    }
    fn found_float(&mut self, cx: &mut ParseContext, value: f64) {
        self.line(cx, &format!("float {value:?}"));
    }
    fn found_bool(&mut self, cx: &mut ParseContext, value: bool) {
        self.line(cx, &format!("bool {value}"));
    }
    fn found_null(&mut self, cx: &mut ParseContext) {
        self.line(cx, "null");
    }
    fn error(&mut self, _cx: &mut ParseContext, error: &ParseError) {
        eprintln!("error: {error}");
    }
}

fn open_input(file: Option<&PathBuf>) -> io::Result<Box<dyn Read>> {
    Ok(match file {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    })
}

/// Picks the byte source for the command line.
fn source(args: &Args) -> io::Result<Box<dyn ByteSource>> {
    if let Some(chunk) = args.chunk {
        let mut input = open_input(args.file.as_ref())?;
        let chunk = chunk.max(1);
        return Ok(Box::new(CallbackSource::new(move |buf: &mut [u8]| {
            let len = buf.len().min(chunk);
            let Some(dest) = buf.get_mut(..len) else {
                return -1;
            };
            match input.read(dest) {
                Ok(n) => isize::try_from(n).unwrap_or(-1),
                Err(e) => {
                    log::error!("read failed: {e}");
                    -1
                }
            }
        })));
    }
    Ok(match &args.file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(StreamSource::new(io::stdin().lock())),
    })
}

fn run(args: &Args) -> Result<(), String> {
    let options = if args.strict {
        ParseOptions::STRICT
    } else {
        ParseOptions::NONE
    };
    let source = source(args).map_err(|e| e.to_string())?;

    let mut parser = Parser::new();
    match args.encoding {
        None => parser.configure(source, options),
        Some(choice) => parser.configure_with_encoding(source, choice.encoding(), options),
    }

    let result = if args.tree {
        let filters = PropertyListOptions::new().ignore(args.skip.iter().cloned());
        let mut builder = PropertyListBuilder::with_options(filters);
        let result = parser.parse(&mut builder);
        if let Some(value) = builder.into_value() {
            println!("{value}");
        }
        result
    } else {
        let mut printer = EventPrinter {
            skip: args.skip.iter().cloned().collect(),
        };
        parser.parse(&mut printer)
    };

    match result {
        Ok(()) => Ok(()),
        Err(ParseFailure::Aborted) => Err("aborted".to_owned()),
        Err(ParseFailure::Error(e)) if args.tree => Err(e.to_string()),
        // EventPrinter has printed it already.
        Err(ParseFailure::Error(_)) => Err(String::new()),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::debug!("{args:?}");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            ExitCode::FAILURE
        }
    }
}
