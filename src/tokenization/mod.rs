//! The tokenization stage: token model, parse errors, named character
//! references, and the state machine itself.

mod error_handler;
mod named_character_reference;
mod token;
mod tokenizer;

pub use error_handler::{
    CollectParseErrors, HtmlParseError, IgnoreParseErrors, ParseErrorHandler, ParserError,
};
pub use named_character_reference::{entity_trie, lookup_character_reference, EntityTrie, TrieCursor};
pub use token::{
    Attribute, CharacterKind, CharacterToken, CommentToken, DoctypeToken, SinkDirective, TagToken,
    Token, TokenSink,
};
pub use tokenizer::{ChunkOutcome, Tokenizer, TokenizerState};
