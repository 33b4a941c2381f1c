//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use html_stream::{
    CharacterToken, ChunkOutcome, CollectParseErrors, CommentToken, DoctypeToken, ParserError,
    SinkDirective, SourceSpan, TagToken, Token, TokenSink, Tokenizer, TokenizerState,
};

/// Records every token, optionally steering the tokenizer the way a tree
/// builder would.
#[derive(Default)]
pub struct RecordingSink {
    pub tokens: Vec<Token>,

    /// Switch into RAWTEXT / RCDATA / script data / PLAINTEXT after the
    /// corresponding start tags.
    pub raw_text_aware: bool,

    /// Request a suspension once a `</script>` has been seen.
    pub suspend_on_script_end: bool,
}

impl RecordingSink {
    #[must_use]
    pub fn tree_builder_like() -> Self {
        Self {
            raw_text_aware: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn scripting() -> Self {
        Self {
            raw_text_aware: true,
            suspend_on_script_end: true,
            ..Self::default()
        }
    }
}

impl TokenSink for RecordingSink {
    fn on_character(&mut self, token: &CharacterToken) -> SinkDirective {
        self.tokens.push(Token::Character(token.clone()));
        SinkDirective::Continue
    }

    fn on_whitespace_character(&mut self, token: &CharacterToken) -> SinkDirective {
        self.tokens.push(Token::Character(token.clone()));
        SinkDirective::Continue
    }

    fn on_null_character(&mut self, token: &CharacterToken) -> SinkDirective {
        self.tokens.push(Token::Character(token.clone()));
        SinkDirective::Continue
    }

    fn on_comment(&mut self, token: &CommentToken) -> SinkDirective {
        self.tokens.push(Token::Comment(token.clone()));
        SinkDirective::Continue
    }

    fn on_doctype(&mut self, token: &DoctypeToken) -> SinkDirective {
        self.tokens.push(Token::Doctype(token.clone()));
        SinkDirective::Continue
    }

    fn on_start_tag(&mut self, token: &mut TagToken) -> SinkDirective {
        let directive = if self.raw_text_aware {
            match token.name.as_str() {
                "script" => SinkDirective::SwitchTo(TokenizerState::ScriptData),
                "style" | "iframe" | "noframes" | "xmp" | "noscript" => {
                    SinkDirective::SwitchTo(TokenizerState::RAWTEXT)
                },
                "textarea" | "title" => SinkDirective::SwitchTo(TokenizerState::RCDATA),
                "plaintext" => SinkDirective::SwitchTo(TokenizerState::PLAINTEXT),
                _ => SinkDirective::Continue,
            }
        } else {
            SinkDirective::Continue
        };
        self.tokens.push(Token::StartTag(token.clone()));
        directive
    }

    fn on_end_tag(&mut self, token: &mut TagToken) -> SinkDirective {
        let directive = if self.suspend_on_script_end && token.name == "script" {
            SinkDirective::Suspend
        } else {
            SinkDirective::Continue
        };
        self.tokens.push(Token::EndTag(token.clone()));
        directive
    }

    fn on_eof(&mut self, span: SourceSpan) {
        self.tokens.push(Token::EndOfFile(span));
    }
}

/// Tokenizes the whole input in one chunk with a tree-builder-like sink.
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<ParserError>) {
    let mut tokenizer = Tokenizer::new(
        RecordingSink::tree_builder_like(),
        CollectParseErrors::default(),
    );
    tokenizer
        .write(input, true)
        .expect("a fresh stream accepts writes");
    assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);

    let errors = std::mem::take(&mut tokenizer.error_handler_mut().errors);
    (tokenizer.into_sink().tokens, errors)
}

/// Tokenizes the input split into two chunks at the given UTF-16 code unit
/// index.
pub fn tokenize_split_at(input: &str, split: usize) -> (Vec<Token>, Vec<ParserError>) {
    let units: Vec<u16> = input.encode_utf16().collect();
    let mut tokenizer = Tokenizer::new(
        RecordingSink::tree_builder_like(),
        CollectParseErrors::default(),
    );

    tokenizer
        .write_utf16(&units[..split], false)
        .expect("a fresh stream accepts writes");
    let outcome = tokenizer.run_for_current_chunk();
    assert!(
        matches!(outcome, ChunkOutcome::EndOfChunk | ChunkOutcome::Paused),
        "unexpected outcome before the final chunk: {outcome:?}"
    );

    tokenizer
        .write_utf16(&units[split..], true)
        .expect("the stream is still open");
    assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);

    let errors = std::mem::take(&mut tokenizer.error_handler_mut().errors);
    (tokenizer.into_sink().tokens, errors)
}

/// The region of the input a token covers.
#[must_use]
pub fn span_of(token: &Token) -> SourceSpan {
    match token {
        Token::StartTag(tag) | Token::EndTag(tag) => tag.span,
        Token::Comment(comment) => comment.span,
        Token::Doctype(doctype) => doctype.span,
        Token::Character(characters) => characters.span,
        Token::EndOfFile(span) => *span,
    }
}
