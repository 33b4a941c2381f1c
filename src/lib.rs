//! Streaming [HTML tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization).
//!
//! This crate implements the input preprocessor and the tokenizer state
//! machine of an HTML parser, built to run incrementally: input arrives in
//! chunks of any size, tokenization suspends cleanly between any two code
//! points, and a `document.write`-style host can splice new source in at
//! the current parse position while a script element is pending.
//!
//! Tree construction is deliberately not part of this crate; a tree
//! builder plugs in as a [`TokenSink`] and steers the tokenizer through
//! [`SinkDirective`]s and the public state hooks.
//!
//! ```
//! use html_stream::{
//!     CollectParseErrors, ScriptableStream, SinkDirective, TagToken, TokenSink, WriteOutcome,
//! };
//!
//! #[derive(Default)]
//! struct Sink {
//!     names: Vec<String>,
//! }
//!
//! impl TokenSink for Sink {
//!     fn on_start_tag(&mut self, tag: &mut TagToken) -> SinkDirective {
//!         self.names.push(tag.name.clone());
//!         SinkDirective::Continue
//!     }
//! }
//!
//! let mut stream = ScriptableStream::new(Sink::default(), CollectParseErrors::default());
//! assert_eq!(stream.write("<p>Hello", false).unwrap(), WriteOutcome::NeedMoreInput);
//! assert_eq!(stream.write(" world</p>", true).unwrap(), WriteOutcome::Finished);
//! assert_eq!(stream.sink().names, ["p"]);
//! ```

pub mod infra;
pub mod input;
pub mod location;
pub mod streaming;
pub mod tokenization;

pub use location::{SourcePosition, SourceSpan};
pub use streaming::{ScriptableStream, UsageError, WriteOutcome};
pub use tokenization::{
    Attribute, CharacterKind, CharacterToken, ChunkOutcome, CollectParseErrors, CommentToken,
    DoctypeToken, HtmlParseError, IgnoreParseErrors, ParseErrorHandler, ParserError,
    SinkDirective, TagToken, Token, TokenSink, Tokenizer, TokenizerState,
};
