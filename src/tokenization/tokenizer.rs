//! The [HTML Tokenizer](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! The tokenizer pulls code points from the [`Preprocessor`] one at a time
//! and runs them through the state machine below, emitting finished tokens
//! into a [`TokenSink`]. It is fully incremental: when the preprocessor
//! runs out of buffered input mid-state, the current dispatch is unwound
//! (the consumed code points are retreated), the loop deactivates, and the
//! next [`write`](Tokenizer::write) resumes in the same state with all
//! in-progress token data intact.

use super::{
    named_character_reference::entity_trie,
    token::{CharacterKind, CharacterToken, CurrentToken, SinkDirective, Token, TokenSink},
    HtmlParseError, ParseErrorHandler,
};
use crate::{
    infra,
    input::Preprocessor,
    location::{SourcePosition, SourceSpan},
    streaming::UsageError,
};

// Characters that are hard to read
const UNICODE_REPLACEMENT: char = '\u{FFFD}';
const TAB: char = '\u{0009}';
const LINE_FEED: char = '\u{000A}';
const FORM_FEED: char = '\u{000C}';
const SPACE: char = '\u{0020}';

/// The different states of the [Tokenizer] state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenizerState {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#data-state>
    Data,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state>
    RCDATA,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state>
    RAWTEXT,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-state>
    ScriptData,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state>
    PLAINTEXT,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state>
    TagOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state>
    EndTagOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state>
    TagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state>
    RCDATALessThanSign,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state>
    RCDATAEndTagOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state>
    RCDATAEndTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state>
    RAWTEXTLessThanSign,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state>
    RAWTEXTEndTagOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state>
    RAWTEXTEndTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state>
    ScriptDataLessThanSign,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state>
    ScriptDataEndTagOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state>
    ScriptDataEndTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state>
    ScriptDataEscapeStart,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state>
    ScriptDataEscapeStartDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state>
    ScriptDataEscaped,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state>
    ScriptDataEscapedDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state>
    ScriptDataEscapedDashDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state>
    ScriptDataEscapedLessThanSign,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state>
    ScriptDataEscapedEndTagOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state>
    ScriptDataEscapedEndTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state>
    ScriptDataDoubleEscapeStart,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state>
    ScriptDataDoubleEscaped,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state>
    ScriptDataDoubleEscapedDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state>
    ScriptDataDoubleEscapedDashDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state>
    ScriptDataDoubleEscapedLessThanSign,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state>
    ScriptDataDoubleEscapeEnd,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state>
    BeforeAttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state>
    AttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state>
    AfterAttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state>
    BeforeAttributeValue,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state>
    AttributeValueDoublequoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state>
    AttributeValueSinglequoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state>
    AttributeValueUnquoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state>
    AfterAttributeValueQuoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state>
    SelfClosingStartTag,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state>
    BogusComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state>
    MarkupDeclarationOpen,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state>
    CommentStart,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state>
    CommentStartDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-state>
    Comment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state>
    CommentLessThanSign,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state>
    CommentLessThanSignBang,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state>
    CommentLessThanSignBangDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state>
    CommentLessThanSignBangDashDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state>
    CommentEndDash,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state>
    CommentEnd,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state>
    CommentEndBang,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-state>
    DOCTYPE,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state>
    BeforeDOCTYPEName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state>
    DOCTYPEName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state>
    AfterDOCTYPEName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state>
    AfterDOCTYPEPublicKeyword,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state>
    BeforeDOCTYPEPublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state>
    DOCTYPEPublicIdentifierDoublequoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state>
    DOCTYPEPublicIdentifierSinglequoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state>
    AfterDOCTYPEPublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state>
    BetweenDOCTYPEPublicAndSystemIdentifiers,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state>
    AfterDOCTYPESystemKeyword,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state>
    BeforeDOCTYPESystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state>
    DOCTYPESystemIdentifierDoublequoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state>
    DOCTYPESystemIdentifierSinglequoted,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state>
    AfterDOCTYPESystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state>
    BogusDOCTYPE,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state>
    CDATASection,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state>
    CDATASectionBracket,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state>
    CDATASectionEnd,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state>
    CharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state>
    NamedCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state>
    AmbiguousAmpersand,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state>
    NumericCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state>
    HexadecimalCharacterReferenceStart,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state>
    DecimalCharacterReferenceStart,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state>
    HexadecimalCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state>
    DecimalCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state>
    NumericCharacterReferenceEnd,
}

/// Why [`Tokenizer::run_for_current_chunk`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The buffered input is exhausted; write more to continue.
    EndOfChunk,

    /// The sink asked for a suspension at a token boundary.
    SuspendedBySink,

    /// [`Tokenizer::pause`] was called, or the loop never started.
    Paused,

    /// [`Tokenizer::stop`] was called; the stream is abandoned.
    Stopped,

    /// The end-of-file token has been emitted.
    Finished,
}

pub struct Tokenizer<S, E> {
    input: Preprocessor<E>,
    sink: S,

    /// The current state of the state machine
    state: TokenizerState,

    /// Used by [TokenizerState::CharacterReference]
    return_state: Option<TokenizerState>,

    /// The token currently being assembled, if any
    current_token: CurrentToken,

    /// The pending run of coalesced character tokens, if any
    current_character_token: Option<CharacterToken>,

    /// A general-purpose temporary buffer
    buffer: String,

    last_start_tag_name: Option<String>,

    character_reference_code: u32,

    /// Position of the `&` that opened the character reference in flight
    character_reference_start: SourcePosition,

    /// Position of the `<` that may open an end tag in a text state
    text_less_than_start: SourcePosition,

    /// Start position stashed for a doctype token before it is created
    doctype_token_start: SourcePosition,

    /// Code points consumed since the current dispatch began; retreated
    /// wholesale when the chunk runs dry mid-state
    consumed_since_checkpoint: usize,

    /// Whether the parsing loop should keep running
    active: bool,

    /// Reentrancy guard for the parsing loop
    in_loop: bool,

    /// Set once the stream is abandoned; writes become no-ops
    stopped: bool,

    /// The sink requested a suspension at the last token boundary
    suspended_by_sink: bool,

    /// The end-of-file token went out; nothing more will be emitted
    eof_emitted: bool,

    /// Hint from the tree builder: the current node is not in the HTML
    /// namespace
    pub in_foreign_node: bool,

    allow_cdata: bool,
}

impl<S, E> Tokenizer<S, E>
where
    S: TokenSink,
    E: ParseErrorHandler,
{
    #[must_use]
    pub fn new(sink: S, error_handler: E) -> Self {
        Self {
            input: Preprocessor::new(error_handler),
            sink,
            state: TokenizerState::Data,
            return_state: None,
            current_token: CurrentToken::default(),
            current_character_token: None,
            buffer: String::new(),
            last_start_tag_name: None,
            character_reference_code: 0,
            character_reference_start: SourcePosition::default(),
            text_less_than_start: SourcePosition::default(),
            doctype_token_start: SourcePosition::default(),
            consumed_since_checkpoint: 0,
            active: false,
            in_loop: false,
            stopped: false,
            suspended_by_sink: false,
            eof_emitted: false,
            in_foreign_node: false,
            allow_cdata: false,
        }
    }

    /// Buffers another chunk of input. Does not drive the parsing loop;
    /// call [`run_for_current_chunk`](Self::run_for_current_chunk) for
    /// that.
    pub fn write(&mut self, chunk: &str, is_last: bool) -> Result<(), UsageError> {
        if self.in_loop {
            return Err(UsageError::ReentrantWrite);
        }
        if self.input.last_chunk_written() {
            return Err(UsageError::StreamClosed);
        }
        if self.stopped {
            return Ok(());
        }

        self.input.write(chunk, is_last);
        self.active = !self.eof_emitted && !self.suspended_by_sink;
        Ok(())
    }

    /// Like [`write`](Self::write), for input that is already UTF-16.
    pub fn write_utf16(&mut self, chunk: &[u16], is_last: bool) -> Result<(), UsageError> {
        if self.in_loop {
            return Err(UsageError::ReentrantWrite);
        }
        if self.input.last_chunk_written() {
            return Err(UsageError::StreamClosed);
        }
        if self.stopped {
            return Ok(());
        }

        self.input.write_utf16(chunk, is_last);
        self.active = !self.eof_emitted && !self.suspended_by_sink;
        Ok(())
    }

    /// Splices source text in right at the cursor, ahead of all
    /// not-yet-consumed input. This is the entry point for
    /// `document.write`-style insertions; the scriptable driver guards
    /// when it may be called.
    pub fn insert_html_at_current_pos(&mut self, chunk: &str) {
        self.input.insert_html_at_current_pos(chunk);
    }

    /// Runs the state machine until the buffered input is exhausted, the
    /// sink suspends, or the tokenizer is paused or stopped.
    pub fn run_for_current_chunk(&mut self) -> ChunkOutcome {
        if self.in_loop {
            return ChunkOutcome::Paused;
        }

        self.in_loop = true;
        while self.active {
            if self.state == TokenizerState::Data {
                // Between tokens nothing can retreat past the cursor, so
                // the consumed prefix is safe to throw away.
                self.input.drop_parsed_chunk();
            }

            self.consumed_since_checkpoint = 0;
            self.step();
        }
        self.in_loop = false;

        if self.eof_emitted {
            ChunkOutcome::Finished
        } else if self.stopped {
            ChunkOutcome::Stopped
        } else if self.suspended_by_sink {
            ChunkOutcome::SuspendedBySink
        } else if self.input.end_of_chunk_hit() {
            ChunkOutcome::EndOfChunk
        } else {
            ChunkOutcome::Paused
        }
    }

    /// Stops the parsing loop at the next state boundary. All in-progress
    /// state remains valid for resumption.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Abandons the stream. Further writes are ignored.
    pub fn stop(&mut self) {
        log::debug!("tokenizer stopped, further input will be ignored");
        self.stopped = true;
        self.active = false;
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Re-arms the parsing loop after a sink-requested suspension.
    pub(crate) fn reactivate(&mut self) {
        self.suspended_by_sink = false;
        self.active = !self.stopped && !self.eof_emitted;
    }

    /// Sets the current state to a specific state.
    ///
    /// Used by tree builders to select RAWTEXT, RCDATA, PLAINTEXT or
    /// script data handling after the corresponding start tag.
    pub fn switch_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    #[must_use]
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    pub fn set_last_start_tag(&mut self, last_start_tag: Option<String>) {
        self.last_start_tag_name = last_start_tag;
    }

    /// Allows `<![CDATA[` sections, as tree builders do while the
    /// adjusted current node is in a foreign namespace.
    pub fn set_allow_cdata(&mut self, allow_cdata: bool) {
        self.allow_cdata = allow_cdata;
    }

    /// The position just past the most recently consumed character.
    #[must_use]
    pub fn current_location(&self) -> SourcePosition {
        self.input.position_just_after()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn error_handler_mut(&mut self) -> &mut E {
        self.input.error_handler_mut()
    }

    fn consume(&mut self) -> Option<char> {
        self.consumed_since_checkpoint += 1;
        self.input.advance()
    }

    fn unconsume(&mut self, count: usize) {
        self.input.retreat(count);
        self.consumed_since_checkpoint -= count;
    }

    /// When the chunk ran dry mid-state, unwinds everything the current
    /// dispatch consumed and deactivates the loop so the state can be
    /// re-entered once more input arrives.
    fn ensure_hibernation(&mut self) -> bool {
        if self.input.end_of_chunk_hit() {
            self.input.retreat(self.consumed_since_checkpoint);
            self.consumed_since_checkpoint = 0;
            self.active = false;
            return true;
        }

        false
    }

    fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.input.retreat(1);
        self.switch_to(new_state);
    }

    /// Consumes `pattern` if the input starting at the current character
    /// matches it. The first pattern character must already have been
    /// consumed. A too-short buffer on a non-final chunk flags
    /// end-of-chunk and leaves the input untouched.
    fn consume_sequence_if_match(&mut self, pattern: &str, case_sensitive: bool) -> bool {
        if self.input.starts_with(pattern, case_sensitive) {
            for _ in 1..pattern.len() {
                let _ = self.consume();
            }
            return true;
        }

        false
    }

    fn parse_error(&mut self, code: HtmlParseError) {
        self.input.report(code);
    }

    fn apply_directive(&mut self, directive: SinkDirective) {
        match directive {
            SinkDirective::Continue => {},
            SinkDirective::SwitchTo(state) => self.switch_to(state),
            SinkDirective::Suspend => {
                self.suspended_by_sink = true;
                self.active = false;
            },
        }
    }

    fn return_state(&self) -> TokenizerState {
        self.return_state
            .expect("return state is set before entering the character reference states")
    }

    /// Whether the current token is an end tag whose name matches the name
    /// of the last start tag that was emitted.
    #[must_use]
    fn is_appropriate_end_token(&self) -> bool {
        match (&self.last_start_tag_name, self.current_token.tag_ref()) {
            (Some(last_emitted), Some(tag)) => !tag.is_start && tag.name == *last_emitted,
            _ => false,
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#charref-in-attribute>
    #[must_use]
    fn is_inside_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoublequoted
                    | TokenizerState::AttributeValueSinglequoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// Appends a character to the pending run, flushing first when the
    /// kind changes. `at` is the character's own position and becomes the
    /// start of a fresh run.
    fn emit_character_at(&mut self, c: char, at: SourcePosition) {
        let kind = CharacterKind::of(c);

        if let Some(token) = &mut self.current_character_token {
            if token.kind == kind {
                token.data.push(c);
                return;
            }
            self.flush_character_token(at);
        }

        self.current_character_token = Some(CharacterToken {
            kind,
            data: String::from(c),
            span: SourceSpan::new(at, at),
        });
    }

    fn emit_character(&mut self, c: char) {
        self.emit_character_at(c, self.input.position());
    }

    /// Delivers the pending character run, closing its span at `end`.
    fn flush_character_token(&mut self, end: SourcePosition) {
        let Some(mut token) = self.current_character_token.take() else {
            return;
        };
        token.span.end = end;

        let directive = match token.kind {
            CharacterKind::Whitespace => self.sink.on_whitespace_character(&token),
            CharacterKind::Null => self.sink.on_null_character(&token),
            CharacterKind::Normal => self.sink.on_character(&token),
        };
        self.apply_directive(directive);
    }

    fn emit_token(&mut self, mut token: Token) {
        let directive = match &mut token {
            Token::StartTag(tag) => {
                self.last_start_tag_name = Some(tag.name.clone());
                self.sink.on_start_tag(tag)
            },
            Token::EndTag(tag) => self.sink.on_end_tag(tag),
            Token::Comment(comment) => self.sink.on_comment(comment),
            Token::Doctype(doctype) => self.sink.on_doctype(doctype),
            Token::Character(_) | Token::EndOfFile(_) => {
                unreachable!("character runs and end-of-file take their own emission paths")
            },
        };
        self.apply_directive(directive);
    }

    fn emit_current_token(&mut self) {
        let end = self.input.position_just_after();
        let token = self.current_token.build(end);

        // The pending character run ends where this token starts
        let start = match &token {
            Token::StartTag(tag) | Token::EndTag(tag) => tag.span.start,
            Token::Comment(comment) => comment.span.start,
            Token::Doctype(doctype) => doctype.span.start,
            Token::Character(_) | Token::EndOfFile(_) => end,
        };
        self.flush_character_token(start);

        self.emit_token(token);
    }

    fn emit_eof(&mut self) {
        let at = self.input.position_of_eof();
        self.flush_character_token(at);

        self.eof_emitted = true;
        self.active = false;
        self.sink.on_eof(SourceSpan::new(at, at));
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#flush-code-points-consumed-as-a-character-reference>
    fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);

        if self.is_inside_attribute() {
            self.current_token
                .tag()
                .append_str_to_attribute_value(&buffer, self.character_reference_start);
        } else {
            for c in buffer.chars() {
                self.emit_character_at(c, self.character_reference_start);
            }
        }

        self.buffer = buffer;
    }

    /// Dispatches one state transition, usually consuming one code point.
    fn step(&mut self) {
        match self.state {
            // https://html.spec.whatwg.org/multipage/parsing.html#data-state
            TokenizerState::Data => {
                // Consume the next input character:
                match self.consume() {
                    Some('&') => {
                        // Set the return state to the data state. Switch to
                        // the character reference state.
                        self.return_state = Some(TokenizerState::Data);
                        self.character_reference_start = self.input.position();
                        self.switch_to(TokenizerState::CharacterReference);
                    },
                    Some('<') => {
                        // Switch to the tag open state.
                        self.switch_to(TokenizerState::TagOpen);
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Emit the current input character as a character
                        // token.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character('\0');
                    },
                    Some(c) => {
                        // Emit the current input character as a character
                        // token.
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit an end-of-file token.
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state
            TokenizerState::RCDATA => {
                // Consume the next input character:
                match self.consume() {
                    Some('&') => {
                        // Set the return state to the RCDATA state. Switch
                        // to the character reference state.
                        self.return_state = Some(TokenizerState::RCDATA);
                        self.character_reference_start = self.input.position();
                        self.switch_to(TokenizerState::CharacterReference);
                    },
                    Some('<') => {
                        // Switch to the RCDATA less-than sign state.
                        self.text_less_than_start = self.input.position();
                        self.switch_to(TokenizerState::RCDATALessThanSign);
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Emit a U+FFFD REPLACEMENT CHARACTER character
                        // token.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        // Emit the current input character as a character
                        // token.
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit an end-of-file token.
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state
            TokenizerState::RAWTEXT => {
                // Consume the next input character:
                match self.consume() {
                    Some('<') => {
                        // Switch to the RAWTEXT less-than sign state.
                        self.text_less_than_start = self.input.position();
                        self.switch_to(TokenizerState::RAWTEXTLessThanSign);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-state
            TokenizerState::ScriptData => {
                // Consume the next input character:
                match self.consume() {
                    Some('<') => {
                        // Switch to the script data less-than sign state.
                        self.text_less_than_start = self.input.position();
                        self.switch_to(TokenizerState::ScriptDataLessThanSign);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state
            TokenizerState::PLAINTEXT => {
                // Consume the next input character:
                match self.consume() {
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state
            TokenizerState::TagOpen => {
                // Consume the next input character:
                match self.consume() {
                    Some('!') => {
                        // Switch to the markup declaration open state.
                        self.switch_to(TokenizerState::MarkupDeclarationOpen);
                    },
                    Some('/') => {
                        // Switch to the end tag open state.
                        self.switch_to(TokenizerState::EndTagOpen);
                    },
                    Some(c) if c.is_ascii_alphabetic() => {
                        // Create a new start tag token, set its tag name to
                        // the empty string. Reconsume in the tag name
                        // state.
                        self.current_token
                            .create_start_tag(self.input.position_back(1));
                        self.reconsume_in(TokenizerState::TagName);
                    },
                    Some('?') => {
                        // This is an
                        // unexpected-question-mark-instead-of-tag-name
                        // parse error. Create a comment token whose data is
                        // the empty string. Reconsume in the bogus comment
                        // state.
                        self.parse_error(HtmlParseError::UnexpectedQuestionMarkInsteadOfTagName);
                        self.current_token
                            .create_comment(self.input.position_back(1));
                        self.reconsume_in(TokenizerState::BogusComment);
                    },
                    Some(_) => {
                        // This is an invalid-first-character-of-tag-name
                        // parse error. Emit a U+003C LESS-THAN SIGN
                        // character token. Reconsume in the data state.
                        self.parse_error(HtmlParseError::InvalidFirstCharacterOfTagName);
                        self.emit_character_at('<', self.input.position_back(1));
                        self.reconsume_in(TokenizerState::Data);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-before-tag-name parse error. Emit
                        // a U+003C LESS-THAN SIGN character token and an
                        // end-of-file token.
                        self.parse_error(HtmlParseError::EofBeforeTagName);
                        self.emit_character_at('<', self.input.position_back(1));
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state
            TokenizerState::EndTagOpen => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphabetic() => {
                        // Create a new end tag token, set its tag name to
                        // the empty string. Reconsume in the tag name
                        // state.
                        self.current_token
                            .create_end_tag(self.input.position_back(2));
                        self.reconsume_in(TokenizerState::TagName);
                    },
                    Some('>') => {
                        // This is a missing-end-tag-name parse error.
                        // Switch to the data state.
                        self.parse_error(HtmlParseError::MissingEndTagName);
                        self.switch_to(TokenizerState::Data);
                    },
                    Some(_) => {
                        // This is an invalid-first-character-of-tag-name
                        // parse error. Create a comment token whose data is
                        // the empty string. Reconsume in the bogus comment
                        // state.
                        self.parse_error(HtmlParseError::InvalidFirstCharacterOfTagName);
                        self.current_token
                            .create_comment(self.input.position_back(2));
                        self.reconsume_in(TokenizerState::BogusComment);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-before-tag-name parse error. Emit
                        // a U+003C LESS-THAN SIGN character token, a U+002F
                        // SOLIDUS character token and an end-of-file token.
                        self.parse_error(HtmlParseError::EofBeforeTagName);
                        self.emit_character_at('<', self.input.position_back(2));
                        self.emit_character_at('/', self.input.position_back(1));
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state
            TokenizerState::TagName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Switch to the before attribute name state.
                        self.switch_to(TokenizerState::BeforeAttributeName);
                    },
                    Some('/') => {
                        // Switch to the self-closing start tag state.
                        self.switch_to(TokenizerState::SelfClosingStartTag);
                    },
                    Some('>') => {
                        // Switch to the data state. Emit the current tag
                        // token.
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(mut c @ 'A'..='Z') => {
                        // Append the lowercase version of the current input
                        // character to the current tag token's tag name.
                        c.make_ascii_lowercase();
                        self.current_token.append_to_tag_name(c);
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Append a U+FFFD REPLACEMENT CHARACTER character
                        // to the current tag token's tag name.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token.append_to_tag_name(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        // Append the current input character to the current
                        // tag token's tag name.
                        self.current_token.append_to_tag_name(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-in-tag parse error. Emit an
                        // end-of-file token.
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state
            TokenizerState::RCDATALessThanSign => {
                // Consume the next input character:
                match self.consume() {
                    Some('/') => {
                        // Set the temporary buffer to the empty string.
                        // Switch to the RCDATA end tag open state.
                        self.buffer.clear();
                        self.switch_to(TokenizerState::RCDATAEndTagOpen);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit a U+003C LESS-THAN SIGN character token.
                        // Reconsume in the RCDATA state.
                        self.emit_character_at('<', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::RCDATA);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state
            TokenizerState::RCDATAEndTagOpen => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphabetic() => {
                        // Create a new end tag token, set its tag name to
                        // the empty string. Reconsume in the RCDATA end tag
                        // name state.
                        self.current_token.create_end_tag(self.text_less_than_start);
                        self.reconsume_in(TokenizerState::RCDATAEndTagName);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit a U+003C LESS-THAN SIGN character token and
                        // a U+002F SOLIDUS character token. Reconsume in
                        // the RCDATA state.
                        self.emit_character_at('<', self.text_less_than_start);
                        self.emit_character_at('/', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::RCDATA);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state
            TokenizerState::RCDATAEndTagName => {
                self.state_raw_text_end_tag_name(TokenizerState::RCDATA);
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state
            TokenizerState::RAWTEXTLessThanSign => {
                // Consume the next input character:
                match self.consume() {
                    Some('/') => {
                        self.buffer.clear();
                        self.switch_to(TokenizerState::RAWTEXTEndTagOpen);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_character_at('<', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::RAWTEXT);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state
            TokenizerState::RAWTEXTEndTagOpen => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphabetic() => {
                        self.current_token.create_end_tag(self.text_less_than_start);
                        self.reconsume_in(TokenizerState::RAWTEXTEndTagName);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_character_at('<', self.text_less_than_start);
                        self.emit_character_at('/', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::RAWTEXT);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state
            TokenizerState::RAWTEXTEndTagName => {
                self.state_raw_text_end_tag_name(TokenizerState::RAWTEXT);
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state
            TokenizerState::ScriptDataLessThanSign => {
                // Consume the next input character:
                match self.consume() {
                    Some('/') => {
                        // Set the temporary buffer to the empty string.
                        // Switch to the script data end tag open state.
                        self.buffer.clear();
                        self.switch_to(TokenizerState::ScriptDataEndTagOpen);
                    },
                    Some('!') => {
                        // Switch to the script data escape start state.
                        // Emit a U+003C LESS-THAN SIGN character token and
                        // a U+0021 EXCLAMATION MARK character token.
                        self.switch_to(TokenizerState::ScriptDataEscapeStart);
                        self.emit_character_at('<', self.text_less_than_start);
                        self.emit_character('!');
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_character_at('<', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptData);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state
            TokenizerState::ScriptDataEndTagOpen => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphabetic() => {
                        self.current_token.create_end_tag(self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptDataEndTagName);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_character_at('<', self.text_less_than_start);
                        self.emit_character_at('/', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptData);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state
            TokenizerState::ScriptDataEndTagName => {
                self.state_raw_text_end_tag_name(TokenizerState::ScriptData);
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state
            TokenizerState::ScriptDataEscapeStart => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        // Switch to the script data escape start dash
                        // state. Emit a U+002D HYPHEN-MINUS character
                        // token.
                        self.switch_to(TokenizerState::ScriptDataEscapeStartDash);
                        self.emit_character('-');
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Reconsume in the script data state.
                        self.reconsume_in(TokenizerState::ScriptData);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state
            TokenizerState::ScriptDataEscapeStartDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::ScriptDataEscapedDashDash);
                        self.emit_character('-');
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::ScriptData);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state
            TokenizerState::ScriptDataEscaped => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::ScriptDataEscapedDash);
                        self.emit_character('-');
                    },
                    Some('<') => {
                        self.text_less_than_start = self.input.position();
                        self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-in-script-html-comment-like-text
                        // parse error. Emit an end-of-file token.
                        self.parse_error(HtmlParseError::EofInScriptHtmlCommentLikeText);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state
            TokenizerState::ScriptDataEscapedDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::ScriptDataEscapedDashDash);
                        self.emit_character('-');
                    },
                    Some('<') => {
                        self.text_less_than_start = self.input.position();
                        self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.switch_to(TokenizerState::ScriptDataEscaped);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.switch_to(TokenizerState::ScriptDataEscaped);
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInScriptHtmlCommentLikeText);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state
            TokenizerState::ScriptDataEscapedDashDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.emit_character('-');
                    },
                    Some('<') => {
                        self.text_less_than_start = self.input.position();
                        self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign);
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::ScriptData);
                        self.emit_character('>');
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.switch_to(TokenizerState::ScriptDataEscaped);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.switch_to(TokenizerState::ScriptDataEscaped);
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInScriptHtmlCommentLikeText);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state
            TokenizerState::ScriptDataEscapedLessThanSign => {
                // Consume the next input character:
                match self.consume() {
                    Some('/') => {
                        self.buffer.clear();
                        self.switch_to(TokenizerState::ScriptDataEscapedEndTagOpen);
                    },
                    Some(c) if c.is_ascii_alphabetic() => {
                        // Set the temporary buffer to the empty string.
                        // Emit a U+003C LESS-THAN SIGN character token.
                        // Reconsume in the script data double escape start
                        // state.
                        self.buffer.clear();
                        self.emit_character_at('<', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptDataDoubleEscapeStart);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_character_at('<', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptDataEscaped);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state
            TokenizerState::ScriptDataEscapedEndTagOpen => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphabetic() => {
                        self.current_token.create_end_tag(self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptDataEscapedEndTagName);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.emit_character_at('<', self.text_less_than_start);
                        self.emit_character_at('/', self.text_less_than_start);
                        self.reconsume_in(TokenizerState::ScriptDataEscaped);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state
            TokenizerState::ScriptDataEscapedEndTagName => {
                self.state_raw_text_end_tag_name(TokenizerState::ScriptDataEscaped);
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state
            TokenizerState::ScriptDataDoubleEscapeStart => {
                // Consume the next input character:
                match self.consume() {
                    Some(c @ (TAB | LINE_FEED | FORM_FEED | SPACE | '/' | '>')) => {
                        // If the temporary buffer is the string "script",
                        // switch to the script data double escaped state,
                        // otherwise the script data escaped state. Emit the
                        // current input character.
                        if self.buffer == "script" {
                            self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                        } else {
                            self.switch_to(TokenizerState::ScriptDataEscaped);
                        }
                        self.emit_character(c);
                    },
                    Some(c) if c.is_ascii_alphabetic() => {
                        // Append the lowercase version of the current input
                        // character to the temporary buffer. Emit the
                        // current input character.
                        self.buffer.push(c.to_ascii_lowercase());
                        self.emit_character(c);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::ScriptDataEscaped);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state
            TokenizerState::ScriptDataDoubleEscaped => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedDash);
                        self.emit_character('-');
                    },
                    Some('<') => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
                        self.emit_character('<');
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInScriptHtmlCommentLikeText);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state
            TokenizerState::ScriptDataDoubleEscapedDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedDashDash);
                        self.emit_character('-');
                    },
                    Some('<') => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
                        self.emit_character('<');
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInScriptHtmlCommentLikeText);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state
            TokenizerState::ScriptDataDoubleEscapedDashDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.emit_character('-');
                    },
                    Some('<') => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
                        self.emit_character('<');
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::ScriptData);
                        self.emit_character('>');
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                        self.emit_character(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInScriptHtmlCommentLikeText);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state
            TokenizerState::ScriptDataDoubleEscapedLessThanSign => {
                // Consume the next input character:
                match self.consume() {
                    Some('/') => {
                        // Set the temporary buffer to the empty string.
                        // Switch to the script data double escape end
                        // state. Emit a U+002F SOLIDUS character token.
                        self.buffer.clear();
                        self.switch_to(TokenizerState::ScriptDataDoubleEscapeEnd);
                        self.emit_character('/');
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::ScriptDataDoubleEscaped);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state
            TokenizerState::ScriptDataDoubleEscapeEnd => {
                // Consume the next input character:
                match self.consume() {
                    Some(c @ (TAB | LINE_FEED | FORM_FEED | SPACE | '/' | '>')) => {
                        // If the temporary buffer is the string "script",
                        // switch to the script data escaped state,
                        // otherwise the script data double escaped state.
                        // Emit the current input character.
                        if self.buffer == "script" {
                            self.switch_to(TokenizerState::ScriptDataEscaped);
                        } else {
                            self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                        }
                        self.emit_character(c);
                    },
                    Some(c) if c.is_ascii_alphabetic() => {
                        self.buffer.push(c.to_ascii_lowercase());
                        self.emit_character(c);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::ScriptDataDoubleEscaped);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state
            TokenizerState::BeforeAttributeName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('/' | '>') => {
                        // Reconsume in the after attribute name state.
                        self.reconsume_in(TokenizerState::AfterAttributeName);
                    },
                    Some('=') => {
                        // This is an
                        // unexpected-equals-sign-before-attribute-name
                        // parse error. Start a new attribute in the current
                        // tag token. Set that attribute's name to the
                        // current input character. Switch to the attribute
                        // name state.
                        self.parse_error(HtmlParseError::UnexpectedEqualsSignBeforeAttributeName);
                        let at = self.input.position();
                        let tag = self.current_token.tag();
                        tag.start_new_attribute();
                        tag.append_to_attribute_name('=', at);
                        self.switch_to(TokenizerState::AttributeName);
                    },
                    Some(_) => {
                        // Start a new attribute in the current tag token.
                        // Reconsume in the attribute name state.
                        self.current_token.tag().start_new_attribute();
                        self.reconsume_in(TokenizerState::AttributeName);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::AfterAttributeName);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state
            TokenizerState::AttributeName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE | '/' | '>') => {
                        // Reconsume in the after attribute name state.
                        self.leave_attribute_name();
                        self.reconsume_in(TokenizerState::AfterAttributeName);
                    },
                    Some('=') => {
                        // Switch to the before attribute value state.
                        self.leave_attribute_name();
                        self.switch_to(TokenizerState::BeforeAttributeValue);
                    },
                    Some(mut c @ 'A'..='Z') => {
                        // Append the lowercase version of the current input
                        // character to the current attribute's name.
                        c.make_ascii_lowercase();
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_name(c, at);
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Append a U+FFFD REPLACEMENT CHARACTER character
                        // to the current attribute's name.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        let at = self.input.position();
                        self.current_token
                            .tag()
                            .append_to_attribute_name(UNICODE_REPLACEMENT, at);
                    },
                    Some(c @ ('"' | '\'' | '<')) => {
                        // This is an unexpected-character-in-attribute-name
                        // parse error. Append the character anyway.
                        self.parse_error(HtmlParseError::UnexpectedCharacterInAttributeName);
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_name(c, at);
                    },
                    Some(c) => {
                        // Append the current input character to the current
                        // attribute's name.
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_name(c, at);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.leave_attribute_name();
                        self.reconsume_in(TokenizerState::AfterAttributeName);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state
            TokenizerState::AfterAttributeName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('/') => {
                        // Switch to the self-closing start tag state.
                        self.switch_to(TokenizerState::SelfClosingStartTag);
                    },
                    Some('=') => {
                        // Switch to the before attribute value state.
                        self.switch_to(TokenizerState::BeforeAttributeValue);
                    },
                    Some('>') => {
                        // Switch to the data state. Emit the current tag
                        // token.
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        // Start a new attribute in the current tag token.
                        // Reconsume in the attribute name state.
                        self.current_token.tag().start_new_attribute();
                        self.reconsume_in(TokenizerState::AttributeName);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-in-tag parse error. Emit an
                        // end-of-file token.
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state
            TokenizerState::BeforeAttributeValue => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('"') => {
                        // Switch to the attribute value (double-quoted)
                        // state.
                        self.switch_to(TokenizerState::AttributeValueDoublequoted);
                    },
                    Some('\'') => {
                        // Switch to the attribute value (single-quoted)
                        // state.
                        self.switch_to(TokenizerState::AttributeValueSinglequoted);
                    },
                    Some('>') => {
                        // This is a missing-attribute-value parse error.
                        // Switch to the data state. Emit the current tag
                        // token.
                        self.parse_error(HtmlParseError::MissingAttributeValue);
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Reconsume in the attribute value (unquoted)
                        // state.
                        self.reconsume_in(TokenizerState::AttributeValueUnquoted);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state
            TokenizerState::AttributeValueDoublequoted => {
                // Consume the next input character:
                match self.consume() {
                    Some('"') => {
                        // Switch to the after attribute value (quoted)
                        // state.
                        let end = self.input.position();
                        self.current_token.tag().finish_attribute_value(end);
                        self.switch_to(TokenizerState::AfterAttributeValueQuoted);
                    },
                    Some('&') => {
                        // Set the return state to the attribute value
                        // (double-quoted) state. Switch to the character
                        // reference state.
                        self.return_state = Some(TokenizerState::AttributeValueDoublequoted);
                        self.character_reference_start = self.input.position();
                        self.current_token
                            .tag()
                            .note_attribute_value_at(self.character_reference_start);
                        self.switch_to(TokenizerState::CharacterReference);
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Append a U+FFFD REPLACEMENT CHARACTER character
                        // to the current attribute's value.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        let at = self.input.position();
                        self.current_token
                            .tag()
                            .append_to_attribute_value(UNICODE_REPLACEMENT, at);
                    },
                    Some(c) => {
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_value(c, at);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state
            TokenizerState::AttributeValueSinglequoted => {
                // Consume the next input character:
                match self.consume() {
                    Some('\'') => {
                        let end = self.input.position();
                        self.current_token.tag().finish_attribute_value(end);
                        self.switch_to(TokenizerState::AfterAttributeValueQuoted);
                    },
                    Some('&') => {
                        self.return_state = Some(TokenizerState::AttributeValueSinglequoted);
                        self.character_reference_start = self.input.position();
                        self.current_token
                            .tag()
                            .note_attribute_value_at(self.character_reference_start);
                        self.switch_to(TokenizerState::CharacterReference);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        let at = self.input.position();
                        self.current_token
                            .tag()
                            .append_to_attribute_value(UNICODE_REPLACEMENT, at);
                    },
                    Some(c) => {
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_value(c, at);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state
            TokenizerState::AttributeValueUnquoted => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Switch to the before attribute name state.
                        let end = self.input.position();
                        self.current_token.tag().finish_attribute_value(end);
                        self.switch_to(TokenizerState::BeforeAttributeName);
                    },
                    Some('&') => {
                        self.return_state = Some(TokenizerState::AttributeValueUnquoted);
                        self.character_reference_start = self.input.position();
                        self.current_token
                            .tag()
                            .note_attribute_value_at(self.character_reference_start);
                        self.switch_to(TokenizerState::CharacterReference);
                    },
                    Some('>') => {
                        // Switch to the data state. Emit the current tag
                        // token.
                        let end = self.input.position();
                        self.current_token.tag().finish_attribute_value(end);
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        let at = self.input.position();
                        self.current_token
                            .tag()
                            .append_to_attribute_value(UNICODE_REPLACEMENT, at);
                    },
                    Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                        // This is an
                        // unexpected-character-in-unquoted-attribute-value
                        // parse error. Append the character anyway.
                        self.parse_error(
                            HtmlParseError::UnexpectedCharacterInUnquotedAttributeValue,
                        );
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_value(c, at);
                    },
                    Some(c) => {
                        let at = self.input.position();
                        self.current_token.tag().append_to_attribute_value(c, at);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state
            TokenizerState::AfterAttributeValueQuoted => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        self.switch_to(TokenizerState::BeforeAttributeName);
                    },
                    Some('/') => {
                        self.switch_to(TokenizerState::SelfClosingStartTag);
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        // This is a missing-whitespace-between-attributes
                        // parse error. Reconsume in the before attribute
                        // name state.
                        self.parse_error(HtmlParseError::MissingWhitespaceBetweenAttributes);
                        self.reconsume_in(TokenizerState::BeforeAttributeName);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state
            TokenizerState::SelfClosingStartTag => {
                // Consume the next input character:
                match self.consume() {
                    Some('>') => {
                        // Set the self-closing flag of the current tag
                        // token. Switch to the data state. Emit the current
                        // tag token.
                        self.current_token.set_self_closing();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        // This is an unexpected-solidus-in-tag parse error.
                        // Reconsume in the before attribute name state.
                        self.parse_error(HtmlParseError::UnexpectedSolidusInTag);
                        self.reconsume_in(TokenizerState::BeforeAttributeName);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInTag);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state
            TokenizerState::BogusComment => {
                // Consume the next input character:
                match self.consume() {
                    Some('>') => {
                        // Switch to the data state. Emit the current
                        // comment token.
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Append a U+FFFD REPLACEMENT CHARACTER character
                        // to the comment token's data.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token.append_to_comment(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.current_token.append_to_comment(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit the comment token. Emit an end-of-file
                        // token.
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state
            TokenizerState::MarkupDeclarationOpen => {
                // One character is consumed up front so the sequence
                // look-aheads below start at the current character.
                let _ = self.consume();

                if self.consume_sequence_if_match("--", true) {
                    // Create a comment token whose data is the empty
                    // string. Switch to the comment start state.
                    self.current_token
                        .create_comment(self.input.position_back(3));
                    self.switch_to(TokenizerState::CommentStart);
                } else if self.consume_sequence_if_match("doctype", false) {
                    // Switch to the DOCTYPE state.
                    self.doctype_token_start = self.input.position_back(8);
                    self.switch_to(TokenizerState::DOCTYPE);
                } else if self.consume_sequence_if_match("[CDATA[", true) {
                    if self.allow_cdata || self.in_foreign_node {
                        // Switch to the CDATA section state.
                        self.switch_to(TokenizerState::CDATASection);
                    } else {
                        // This is a cdata-in-html-content parse error.
                        // Create a comment token whose data is the
                        // "[CDATA[" string. Switch to the bogus comment
                        // state.
                        self.parse_error(HtmlParseError::CdataInHtmlContent);
                        self.current_token
                            .create_comment(self.input.position_back(8));
                        self.current_token.append_str_to_comment("[CDATA[");
                        self.switch_to(TokenizerState::BogusComment);
                    }
                }
                // Sequence look-aheads can be cut short by the end of the
                // chunk, in which case the lookup starts over once more
                // input arrives.
                else if !self.ensure_hibernation() {
                    // This is an incorrectly-opened-comment parse error.
                    // Create a comment token whose data is the empty
                    // string. Switch to the bogus comment state (don't
                    // consume anything in the current state).
                    self.parse_error(HtmlParseError::IncorrectlyOpenedComment);
                    self.current_token
                        .create_comment(self.input.position_back(2));
                    self.reconsume_in(TokenizerState::BogusComment);
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state
            TokenizerState::CommentStart => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        // Switch to the comment start dash state.
                        self.switch_to(TokenizerState::CommentStartDash);
                    },
                    Some('>') => {
                        // This is an abrupt-closing-of-empty-comment parse
                        // error. Switch to the data state. Emit the current
                        // comment token.
                        self.parse_error(HtmlParseError::AbruptClosingOfEmptyComment);
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Reconsume in the comment state.
                        self.reconsume_in(TokenizerState::Comment);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state
            TokenizerState::CommentStartDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        // Switch to the comment end state.
                        self.switch_to(TokenizerState::CommentEnd);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::AbruptClosingOfEmptyComment);
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        // Append a U+002D HYPHEN-MINUS character to the
                        // comment token's data. Reconsume in the comment
                        // state.
                        self.current_token.append_to_comment('-');
                        self.reconsume_in(TokenizerState::Comment);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-in-comment parse error. Emit the
                        // comment token. Emit an end-of-file token.
                        self.parse_error(HtmlParseError::EofInComment);
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-state
            TokenizerState::Comment => {
                // Consume the next input character:
                match self.consume() {
                    Some('<') => {
                        // Append the current input character to the comment
                        // token's data. Switch to the comment less-than
                        // sign state.
                        self.current_token.append_to_comment('<');
                        self.switch_to(TokenizerState::CommentLessThanSign);
                    },
                    Some('-') => {
                        // Switch to the comment end dash state.
                        self.switch_to(TokenizerState::CommentEndDash);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token.append_to_comment(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.current_token.append_to_comment(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInComment);
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state
            TokenizerState::CommentLessThanSign => {
                // Consume the next input character:
                match self.consume() {
                    Some('!') => {
                        // Append the current input character to the comment
                        // token's data. Switch to the comment less-than
                        // sign bang state.
                        self.current_token.append_to_comment('!');
                        self.switch_to(TokenizerState::CommentLessThanSignBang);
                    },
                    Some('<') => {
                        self.current_token.append_to_comment('<');
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::Comment);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state
            TokenizerState::CommentLessThanSignBang => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::CommentLessThanSignBangDash);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::Comment);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state
            TokenizerState::CommentLessThanSignBangDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        self.switch_to(TokenizerState::CommentLessThanSignBangDashDash);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::CommentEndDash);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state
            TokenizerState::CommentLessThanSignBangDashDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('>') => {
                        // Reconsume in the comment end state.
                        self.reconsume_in(TokenizerState::CommentEnd);
                    },
                    Some(_) => {
                        // This is a nested-comment parse error. Reconsume
                        // in the comment end state.
                        self.parse_error(HtmlParseError::NestedComment);
                        self.reconsume_in(TokenizerState::CommentEnd);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(TokenizerState::CommentEnd);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state
            TokenizerState::CommentEndDash => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        // Switch to the comment end state.
                        self.switch_to(TokenizerState::CommentEnd);
                    },
                    Some(_) => {
                        // Append a U+002D HYPHEN-MINUS character to the
                        // comment token's data. Reconsume in the comment
                        // state.
                        self.current_token.append_to_comment('-');
                        self.reconsume_in(TokenizerState::Comment);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInComment);
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state
            TokenizerState::CommentEnd => {
                // Consume the next input character:
                match self.consume() {
                    Some('>') => {
                        // Switch to the data state. Emit the current
                        // comment token.
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some('!') => {
                        // Switch to the comment end bang state.
                        self.switch_to(TokenizerState::CommentEndBang);
                    },
                    Some('-') => {
                        // Append a U+002D HYPHEN-MINUS character to the
                        // comment token's data.
                        self.current_token.append_to_comment('-');
                    },
                    Some(_) => {
                        // Append two U+002D HYPHEN-MINUS characters to the
                        // comment token's data. Reconsume in the comment
                        // state.
                        self.current_token.append_str_to_comment("--");
                        self.reconsume_in(TokenizerState::Comment);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInComment);
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state
            TokenizerState::CommentEndBang => {
                // Consume the next input character:
                match self.consume() {
                    Some('-') => {
                        // Append two U+002D HYPHEN-MINUS characters and a
                        // U+0021 EXCLAMATION MARK character to the comment
                        // token's data. Switch to the comment end dash
                        // state.
                        self.current_token.append_str_to_comment("--!");
                        self.switch_to(TokenizerState::CommentEndDash);
                    },
                    Some('>') => {
                        // This is an incorrectly-closed-comment parse
                        // error. Switch to the data state. Emit the current
                        // comment token.
                        self.parse_error(HtmlParseError::IncorrectlyClosedComment);
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        self.current_token.append_str_to_comment("--!");
                        self.reconsume_in(TokenizerState::Comment);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInComment);
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-state
            TokenizerState::DOCTYPE => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Switch to the before DOCTYPE name state.
                        self.switch_to(TokenizerState::BeforeDOCTYPEName);
                    },
                    Some('>') => {
                        // Reconsume in the before DOCTYPE name state.
                        self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
                    },
                    Some(_) => {
                        // This is a missing-whitespace-before-doctype-name
                        // parse error. Reconsume in the before DOCTYPE name
                        // state.
                        self.parse_error(HtmlParseError::MissingWhitespaceBeforeDoctypeName);
                        self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-in-doctype parse error. Create a
                        // new DOCTYPE token. Set its force-quirks flag to
                        // on. Emit the current token. Emit an end-of-file
                        // token.
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.create_doctype(self.doctype_token_start);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state
            TokenizerState::BeforeDOCTYPEName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some(mut c @ 'A'..='Z') => {
                        // Create a new DOCTYPE token. Set the token's name
                        // to the lowercase version of the current input
                        // character. Switch to the DOCTYPE name state.
                        c.make_ascii_lowercase();
                        self.current_token.create_doctype(self.doctype_token_start);
                        self.current_token.append_to_doctype_name(c);
                        self.switch_to(TokenizerState::DOCTYPEName);
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Create a new DOCTYPE token. Set the token's name
                        // to a U+FFFD REPLACEMENT CHARACTER character.
                        // Switch to the DOCTYPE name state.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token.create_doctype(self.doctype_token_start);
                        self.current_token.append_to_doctype_name(UNICODE_REPLACEMENT);
                        self.switch_to(TokenizerState::DOCTYPEName);
                    },
                    Some('>') => {
                        // This is a missing-doctype-name parse error.
                        // Create a new DOCTYPE token. Set its force-quirks
                        // flag to on. Switch to the data state. Emit the
                        // current token.
                        self.parse_error(HtmlParseError::MissingDoctypeName);
                        self.current_token.create_doctype(self.doctype_token_start);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(c) => {
                        // Create a new DOCTYPE token. Set the token's name
                        // to the current input character. Switch to the
                        // DOCTYPE name state.
                        self.current_token.create_doctype(self.doctype_token_start);
                        self.current_token.append_to_doctype_name(c);
                        self.switch_to(TokenizerState::DOCTYPEName);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.create_doctype(self.doctype_token_start);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state
            TokenizerState::DOCTYPEName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Switch to the after DOCTYPE name state.
                        self.switch_to(TokenizerState::AfterDOCTYPEName);
                    },
                    Some('>') => {
                        // Switch to the data state. Emit the current
                        // DOCTYPE token.
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(mut c @ 'A'..='Z') => {
                        c.make_ascii_lowercase();
                        self.current_token.append_to_doctype_name(c);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token.append_to_doctype_name(UNICODE_REPLACEMENT);
                    },
                    Some(c) => {
                        self.current_token.append_to_doctype_name(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state
            TokenizerState::AfterDOCTYPEName => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        if self.consume_sequence_if_match("public", false) {
                            // Switch to the after DOCTYPE public keyword
                            // state.
                            self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
                        } else if self.consume_sequence_if_match("system", false) {
                            // Switch to the after DOCTYPE system keyword
                            // state.
                            self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
                        } else if !self.ensure_hibernation() {
                            // This is an
                            // invalid-character-sequence-after-doctype-name
                            // parse error. Set the force-quirks flag.
                            // Reconsume in the bogus DOCTYPE state.
                            self.parse_error(
                                HtmlParseError::InvalidCharacterSequenceAfterDoctypeName,
                            );
                            self.current_token.set_force_quirks();
                            self.reconsume_in(TokenizerState::BogusDOCTYPE);
                        }
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state
            TokenizerState::AfterDOCTYPEPublicKeyword => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        self.switch_to(TokenizerState::BeforeDOCTYPEPublicIdentifier);
                    },
                    Some('"') => {
                        // This is a
                        // missing-whitespace-after-doctype-public-keyword
                        // parse error. Set the public identifier to the
                        // empty string, then switch to the DOCTYPE public
                        // identifier (double-quoted) state.
                        self.parse_error(
                            HtmlParseError::MissingWhitespaceAfterDoctypePublicKeyword,
                        );
                        self.current_token.init_doctype_public_id();
                        self.switch_to(TokenizerState::DOCTYPEPublicIdentifierDoublequoted);
                    },
                    Some('\'') => {
                        self.parse_error(
                            HtmlParseError::MissingWhitespaceAfterDoctypePublicKeyword,
                        );
                        self.current_token.init_doctype_public_id();
                        self.switch_to(TokenizerState::DOCTYPEPublicIdentifierSinglequoted);
                    },
                    Some('>') => {
                        // This is a missing-doctype-public-identifier parse
                        // error. Set the force-quirks flag. Switch to the
                        // data state and emit the token.
                        self.parse_error(HtmlParseError::MissingDoctypePublicIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        // This is a
                        // missing-quote-before-doctype-public-identifier
                        // parse error. Set the force-quirks flag. Reconsume
                        // in the bogus DOCTYPE state.
                        self.parse_error(
                            HtmlParseError::MissingQuoteBeforeDoctypePublicIdentifier,
                        );
                        self.current_token.set_force_quirks();
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state
            TokenizerState::BeforeDOCTYPEPublicIdentifier => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('"') => {
                        self.current_token.init_doctype_public_id();
                        self.switch_to(TokenizerState::DOCTYPEPublicIdentifierDoublequoted);
                    },
                    Some('\'') => {
                        self.current_token.init_doctype_public_id();
                        self.switch_to(TokenizerState::DOCTYPEPublicIdentifierSinglequoted);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::MissingDoctypePublicIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        self.parse_error(
                            HtmlParseError::MissingQuoteBeforeDoctypePublicIdentifier,
                        );
                        self.current_token.set_force_quirks();
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state
            TokenizerState::DOCTYPEPublicIdentifierDoublequoted => {
                // Consume the next input character:
                match self.consume() {
                    Some('"') => {
                        self.switch_to(TokenizerState::AfterDOCTYPEPublicIdentifier);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_doctype_public_id(UNICODE_REPLACEMENT);
                    },
                    Some('>') => {
                        // This is an abrupt-doctype-public-identifier parse
                        // error. Set the force-quirks flag. Switch to the
                        // data state and emit the token.
                        self.parse_error(HtmlParseError::AbruptDoctypePublicIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(c) => {
                        self.current_token.append_to_doctype_public_id(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state
            TokenizerState::DOCTYPEPublicIdentifierSinglequoted => {
                // Consume the next input character:
                match self.consume() {
                    Some('\'') => {
                        self.switch_to(TokenizerState::AfterDOCTYPEPublicIdentifier);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_doctype_public_id(UNICODE_REPLACEMENT);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::AbruptDoctypePublicIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(c) => {
                        self.current_token.append_to_doctype_public_id(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state
            TokenizerState::AfterDOCTYPEPublicIdentifier => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some('"') => {
                        // This is a
                        // missing-whitespace-between-doctype-public-and-system-identifiers
                        // parse error. Set the system identifier to the
                        // empty string, then switch to the DOCTYPE system
                        // identifier (double-quoted) state.
                        self.parse_error(
                            HtmlParseError::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                        );
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoublequoted);
                    },
                    Some('\'') => {
                        self.parse_error(
                            HtmlParseError::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
                        );
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierSinglequoted);
                    },
                    Some(_) => {
                        self.parse_error(
                            HtmlParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        );
                        self.current_token.set_force_quirks();
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state
            TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some('"') => {
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoublequoted);
                    },
                    Some('\'') => {
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierSinglequoted);
                    },
                    Some(_) => {
                        self.parse_error(
                            HtmlParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        );
                        self.current_token.set_force_quirks();
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state
            TokenizerState::AfterDOCTYPESystemKeyword => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        self.switch_to(TokenizerState::BeforeDOCTYPESystemIdentifier);
                    },
                    Some('"') => {
                        self.parse_error(
                            HtmlParseError::MissingWhitespaceAfterDoctypeSystemKeyword,
                        );
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoublequoted);
                    },
                    Some('\'') => {
                        self.parse_error(
                            HtmlParseError::MissingWhitespaceAfterDoctypeSystemKeyword,
                        );
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierSinglequoted);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::MissingDoctypeSystemIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        self.parse_error(
                            HtmlParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        );
                        self.current_token.set_force_quirks();
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state
            TokenizerState::BeforeDOCTYPESystemIdentifier => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('"') => {
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierDoublequoted);
                    },
                    Some('\'') => {
                        self.current_token.init_doctype_system_id();
                        self.switch_to(TokenizerState::DOCTYPESystemIdentifierSinglequoted);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::MissingDoctypeSystemIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        self.parse_error(
                            HtmlParseError::MissingQuoteBeforeDoctypeSystemIdentifier,
                        );
                        self.current_token.set_force_quirks();
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state
            TokenizerState::DOCTYPESystemIdentifierDoublequoted => {
                // Consume the next input character:
                match self.consume() {
                    Some('"') => {
                        self.switch_to(TokenizerState::AfterDOCTYPESystemIdentifier);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_doctype_system_id(UNICODE_REPLACEMENT);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::AbruptDoctypeSystemIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(c) => {
                        self.current_token.append_to_doctype_system_id(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state
            TokenizerState::DOCTYPESystemIdentifierSinglequoted => {
                // Consume the next input character:
                match self.consume() {
                    Some('\'') => {
                        self.switch_to(TokenizerState::AfterDOCTYPESystemIdentifier);
                    },
                    Some('\0') => {
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                        self.current_token
                            .append_to_doctype_system_id(UNICODE_REPLACEMENT);
                    },
                    Some('>') => {
                        self.parse_error(HtmlParseError::AbruptDoctypeSystemIdentifier);
                        self.current_token.set_force_quirks();
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(c) => {
                        self.current_token.append_to_doctype_system_id(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state
            TokenizerState::AfterDOCTYPESystemIdentifier => {
                // Consume the next input character:
                match self.consume() {
                    Some(TAB | LINE_FEED | FORM_FEED | SPACE) => {
                        // Ignore the character.
                    },
                    Some('>') => {
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some(_) => {
                        // This is an
                        // unexpected-character-after-doctype-system-identifier
                        // parse error. Reconsume in the bogus DOCTYPE state
                        // (this does not set the force-quirks flag).
                        self.parse_error(
                            HtmlParseError::UnexpectedCharacterAfterDoctypeSystemIdentifier,
                        );
                        self.reconsume_in(TokenizerState::BogusDOCTYPE);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::EofInDoctype);
                        self.current_token.set_force_quirks();
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state
            TokenizerState::BogusDOCTYPE => {
                // Consume the next input character:
                match self.consume() {
                    Some('>') => {
                        // Switch to the data state. Emit the DOCTYPE token.
                        self.switch_to(TokenizerState::Data);
                        self.emit_current_token();
                    },
                    Some('\0') => {
                        // This is an unexpected-null-character parse error.
                        // Ignore the character.
                        self.parse_error(HtmlParseError::UnexpectedNullCharacter);
                    },
                    Some(_) => {
                        // Ignore the character.
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit the DOCTYPE token. Emit an end-of-file
                        // token.
                        self.emit_current_token();
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state
            TokenizerState::CDATASection => {
                // Consume the next input character:
                match self.consume() {
                    Some(']') => {
                        // Switch to the CDATA section bracket state.
                        self.switch_to(TokenizerState::CDATASectionBracket);
                    },
                    Some(c) => {
                        // Emit the current input character as a character
                        // token. NULL characters pass through here without
                        // an error; the tree construction stage deals with
                        // them.
                        self.emit_character(c);
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an eof-in-cdata parse error. Emit an
                        // end-of-file token.
                        self.parse_error(HtmlParseError::EofInCdata);
                        self.emit_eof();
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state
            TokenizerState::CDATASectionBracket => {
                // Consume the next input character:
                match self.consume() {
                    Some(']') => {
                        // Switch to the CDATA section end state.
                        self.switch_to(TokenizerState::CDATASectionEnd);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit a U+005D RIGHT SQUARE BRACKET character
                        // token. Reconsume in the CDATA section state.
                        self.emit_character_at(']', self.input.position_back(1));
                        self.reconsume_in(TokenizerState::CDATASection);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state
            TokenizerState::CDATASectionEnd => {
                // Consume the next input character:
                match self.consume() {
                    Some(']') => {
                        // Emit a U+005D RIGHT SQUARE BRACKET character
                        // token.
                        self.emit_character(']');
                    },
                    Some('>') => {
                        // Switch to the data state.
                        self.switch_to(TokenizerState::Data);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Emit two U+005D RIGHT SQUARE BRACKET character
                        // tokens. Reconsume in the CDATA section state.
                        self.emit_character_at(']', self.input.position_back(2));
                        self.emit_character_at(']', self.input.position_back(1));
                        self.reconsume_in(TokenizerState::CDATASection);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state
            TokenizerState::CharacterReference => {
                // Set the temporary buffer to the empty string. Append a
                // U+0026 AMPERSAND character to the temporary buffer.
                self.buffer.clear();
                self.buffer.push('&');

                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphanumeric() => {
                        // Reconsume in the named character reference state.
                        self.reconsume_in(TokenizerState::NamedCharacterReference);
                    },
                    Some('#') => {
                        // Append the current input character to the
                        // temporary buffer. Switch to the numeric character
                        // reference state.
                        self.buffer.push('#');
                        self.switch_to(TokenizerState::NumericCharacterReference);
                    },
                    Some(_) => {
                        // Flush code points consumed as a character
                        // reference. Reconsume in the return state.
                        self.flush_code_points_consumed_as_character_reference();
                        self.reconsume_in(self.return_state());
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.flush_code_points_consumed_as_character_reference();
                        self.reconsume_in(self.return_state());
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state
            TokenizerState::NamedCharacterReference => {
                self.state_named_character_reference();
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state
            TokenizerState::AmbiguousAmpersand => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_alphanumeric() => {
                        // If the character reference was consumed as part
                        // of an attribute, append the current input
                        // character to the current attribute's value.
                        // Otherwise, emit it as a character token.
                        if self.is_inside_attribute() {
                            let at = self.input.position();
                            self.current_token.tag().append_to_attribute_value(c, at);
                        } else {
                            self.emit_character(c);
                        }
                    },
                    Some(';') => {
                        // This is an unknown-named-character-reference
                        // parse error. Reconsume in the return state.
                        self.parse_error(HtmlParseError::UnknownNamedCharacterReference);
                        self.reconsume_in(self.return_state());
                    },
                    Some(_) => {
                        self.reconsume_in(self.return_state());
                    },
                    None => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.reconsume_in(self.return_state());
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state
            TokenizerState::NumericCharacterReference => {
                // Set the character reference code to zero (0).
                self.character_reference_code = 0;

                // Consume the next input character:
                match self.consume() {
                    Some(c @ ('x' | 'X')) => {
                        // Append the current input character to the
                        // temporary buffer. Switch to the hexadecimal
                        // character reference start state.
                        self.buffer.push(c);
                        self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // Reconsume in the decimal character reference
                        // start state.
                        self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state
            TokenizerState::HexadecimalCharacterReferenceStart => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_hexdigit() => {
                        // Reconsume in the hexadecimal character reference
                        // state.
                        self.reconsume_in(TokenizerState::HexadecimalCharacterReference);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is an
                        // absence-of-digits-in-numeric-character-reference
                        // parse error. Flush code points consumed as a
                        // character reference. Reconsume in the return
                        // state.
                        self.parse_error(
                            HtmlParseError::AbsenceOfDigitsInNumericCharacterReference,
                        );
                        self.flush_code_points_consumed_as_character_reference();
                        self.reconsume_in(self.return_state());
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state
            TokenizerState::DecimalCharacterReferenceStart => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_digit() => {
                        // Reconsume in the decimal character reference
                        // state.
                        self.reconsume_in(TokenizerState::DecimalCharacterReference);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(
                            HtmlParseError::AbsenceOfDigitsInNumericCharacterReference,
                        );
                        self.flush_code_points_consumed_as_character_reference();
                        self.reconsume_in(self.return_state());
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state
            TokenizerState::HexadecimalCharacterReference => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_hexdigit() => {
                        // Multiply the character reference code by 16, then
                        // add a numeric version of the current input
                        // character to it.
                        self.character_reference_code = self
                            .character_reference_code
                            .saturating_mul(16)
                            .saturating_add(c.to_digit(16).expect("hex digits convert"));
                    },
                    Some(';') => {
                        // Switch to the numeric character reference end
                        // state.
                        self.switch_to(TokenizerState::NumericCharacterReferenceEnd);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        // This is a
                        // missing-semicolon-after-character-reference parse
                        // error. Reconsume in the numeric character
                        // reference end state.
                        self.parse_error(HtmlParseError::MissingSemicolonAfterCharacterReference);
                        self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state
            TokenizerState::DecimalCharacterReference => {
                // Consume the next input character:
                match self.consume() {
                    Some(c) if c.is_ascii_digit() => {
                        // Multiply the character reference code by 10, then
                        // add a numeric version of the current input
                        // character to it.
                        self.character_reference_code = self
                            .character_reference_code
                            .saturating_mul(10)
                            .saturating_add(c.to_digit(10).expect("decimal digits convert"));
                    },
                    Some(';') => {
                        self.switch_to(TokenizerState::NumericCharacterReferenceEnd);
                    },
                    _ => {
                        if self.ensure_hibernation() {
                            return;
                        }
                        self.parse_error(HtmlParseError::MissingSemicolonAfterCharacterReference);
                        self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
                    },
                }
            },
            // https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state
            TokenizerState::NumericCharacterReferenceEnd => {
                // Check the character reference code (this state consumes
                // nothing):
                let code = self.character_reference_code;
                match code {
                    0x00 => {
                        // This is a null-character-reference parse error.
                        // Set the character reference code to 0xFFFD.
                        self.parse_error(HtmlParseError::NullCharacterReference);
                        self.character_reference_code = 0xFFFD;
                    },
                    0x0011_0000.. => {
                        // This is a
                        // character-reference-outside-unicode-range parse
                        // error. Set the character reference code to
                        // 0xFFFD.
                        self.parse_error(HtmlParseError::CharacterReferenceOutsideUnicodeRange);
                        self.character_reference_code = 0xFFFD;
                    },
                    0xD800..=0xDFFF => {
                        // This is a surrogate-character-reference parse
                        // error. Set the character reference code to
                        // 0xFFFD.
                        self.parse_error(HtmlParseError::SurrogateCharacterReference);
                        self.character_reference_code = 0xFFFD;
                    },
                    code if infra::is_noncharacter(code) => {
                        // This is a noncharacter-character-reference parse
                        // error. The code is used as-is.
                        self.parse_error(HtmlParseError::NoncharacterCharacterReference);
                    },
                    code if code == 0x0D || infra::is_problematic_control(code) => {
                        // This is a control-character-reference parse
                        // error. Some of the affected codes have
                        // replacements:
                        self.parse_error(HtmlParseError::ControlCharacterReference);
                        self.character_reference_code = match code {
                            0x80 => 0x20AC,
                            0x82 => 0x201A,
                            0x83 => 0x0192,
                            0x84 => 0x201E,
                            0x85 => 0x2026,
                            0x86 => 0x2020,
                            0x87 => 0x2021,
                            0x88 => 0x02C6,
                            0x89 => 0x2030,
                            0x8A => 0x0160,
                            0x8B => 0x2039,
                            0x8C => 0x0152,
                            0x8E => 0x017D,
                            0x91 => 0x2018,
                            0x92 => 0x2019,
                            0x93 => 0x201C,
                            0x94 => 0x201D,
                            0x95 => 0x2022,
                            0x96 => 0x2013,
                            0x97 => 0x2014,
                            0x98 => 0x02DC,
                            0x99 => 0x2122,
                            0x9A => 0x0161,
                            0x9B => 0x203A,
                            0x9C => 0x0153,
                            0x9E => 0x017E,
                            0x9F => 0x0178,
                            other => other,
                        };
                    },
                    _ => {},
                }

                // Set the temporary buffer to a string containing the code
                // point. Flush code points consumed as a character
                // reference. Switch to the return state.
                self.buffer.clear();
                self.buffer.push(
                    char::from_u32(self.character_reference_code)
                        .expect("substitutions leave a scalar value"),
                );
                self.flush_code_points_consumed_as_character_reference();
                self.switch_to(self.return_state());
            },
        }
    }

    /// Shared by the RCDATA, RAWTEXT, script data and script data escaped
    /// end tag name states; they differ only in the text state that takes
    /// the input back on a mismatch.
    fn state_raw_text_end_tag_name(&mut self, text_state: TokenizerState) {
        // Consume the next input character:
        match self.consume() {
            Some(TAB | LINE_FEED | FORM_FEED | SPACE) if self.is_appropriate_end_token() => {
                // Switch to the before attribute name state.
                self.switch_to(TokenizerState::BeforeAttributeName);
            },
            Some('/') if self.is_appropriate_end_token() => {
                // Switch to the self-closing start tag state.
                self.switch_to(TokenizerState::SelfClosingStartTag);
            },
            Some('>') if self.is_appropriate_end_token() => {
                // Switch to the data state. Emit the current tag token.
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            },
            Some(c) if c.is_ascii_alphabetic() => {
                // Append the lowercase version of the current input
                // character to the current tag token's tag name. Append
                // the current input character to the temporary buffer.
                self.current_token
                    .append_to_tag_name(c.to_ascii_lowercase());
                self.buffer.push(c);
            },
            _ => {
                if self.ensure_hibernation() {
                    return;
                }
                // Not an appropriate end tag after all; what looked like a
                // tag is just text. Emit a U+003C LESS-THAN SIGN character
                // token, a U+002F SOLIDUS character token and a character
                // token for each character in the temporary buffer.
                // Reconsume in the text state.
                self.emit_character_at('<', self.text_less_than_start);
                self.emit_character_at('/', self.text_less_than_start);
                let buffer = std::mem::take(&mut self.buffer);
                for c in buffer.chars() {
                    self.emit_character_at(c, self.text_less_than_start);
                }
                self.buffer = buffer;
                self.reconsume_in(text_state);
            },
        }
    }

    /// <https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state>
    ///
    /// Walks the reference-name trie one code point at a time, which keeps
    /// the lookup restartable when the chunk runs dry mid-name.
    fn state_named_character_reference(&mut self) {
        let trie = entity_trie();

        // The temporary buffer is rebuilt from scratch on every (re)entry;
        // a hibernation in the middle of the walk discards it.
        self.buffer.clear();
        self.buffer.push('&');

        let mut cursor = trie.root();
        let mut consumed = 0_usize;
        let mut last_match: Option<(usize, &'static str, bool)> = None;

        loop {
            let Some(c) = self.consume() else {
                if self.ensure_hibernation() {
                    return;
                }
                // Undo the end-of-input read so the rollback below is
                // relative to the last real character.
                self.unconsume(1);
                break;
            };

            let Some(next) = trie.step(cursor, c) else {
                self.unconsume(1);
                break;
            };
            cursor = next;
            consumed += 1;
            self.buffer.push(c);

            if let Some(value) = trie.value(cursor) {
                last_match = Some((consumed, value, c == ';'));
            }

            // No reference name continues past a semicolon
            if c == ';' {
                break;
            }
        }

        let Some((matched, replacement, had_semicolon)) = last_match else {
            // Flush code points consumed as a character reference. Switch
            // to the ambiguous ampersand state.
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(TokenizerState::AmbiguousAmpersand);
            return;
        };

        // Put back everything consumed past the (longest) match
        let excess = consumed - matched;
        if excess > 0 {
            self.unconsume(excess);
            self.buffer.truncate(self.buffer.len() - excess);
        }

        if !had_semicolon && self.is_inside_attribute() {
            // If the character reference was consumed as part of an
            // attribute, and the last character matched is not a
            // U+003B SEMICOLON character (;), and the next input character
            // is either a U+003D EQUALS SIGN character (=) or an ASCII
            // alphanumeric, then, for historical reasons, flush code
            // points consumed as a character reference and switch to the
            // return state.
            let next = self.input.peek(1);
            if self.input.end_of_chunk_hit() {
                // The terminator is not buffered yet; redo the lookup once
                // it is.
                self.ensure_hibernation();
                return;
            }

            if let Some(next) = next {
                if next == '=' || next.is_ascii_alphanumeric() {
                    self.flush_code_points_consumed_as_character_reference();
                    self.switch_to(self.return_state());
                    return;
                }
            }
        }

        if !had_semicolon {
            // This is a missing-semicolon-after-character-reference parse
            // error.
            self.parse_error(HtmlParseError::MissingSemicolonAfterCharacterReference);
        }

        // Set the temporary buffer to the empty string. Append the
        // characters corresponding to the character reference name to the
        // temporary buffer. Flush code points consumed as a character
        // reference. Switch to the return state.
        self.buffer.clear();
        self.buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state());
    }

    /// Closes the attribute name under construction, reporting a
    /// duplicate-attribute parse error when the tag already has an
    /// attribute of that name.
    fn leave_attribute_name(&mut self) {
        let end = self.input.position();
        if self.current_token.tag().finish_attribute_name(end) {
            self.parse_error(HtmlParseError::DuplicateAttribute);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenization::{
        CollectParseErrors, CommentToken, DoctypeToken, ParserError, TagToken,
    };

    #[derive(Default)]
    struct Collect {
        tokens: Vec<Token>,
    }

    impl TokenSink for Collect {
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
            self.tokens.push(Token::StartTag(token.clone()));
            SinkDirective::Continue
        }

        fn on_end_tag(&mut self, token: &mut TagToken) -> SinkDirective {
            self.tokens.push(Token::EndTag(token.clone()));
            SinkDirective::Continue
        }

        fn on_eof(&mut self, span: SourceSpan) {
            self.tokens.push(Token::EndOfFile(span));
        }
    }

    /// Switches into the matching text state after a few well-known start
    /// tags, the way a tree builder would.
    #[derive(Default)]
    struct RawTextAware {
        inner: Collect,
    }

    impl TokenSink for RawTextAware {
        fn on_character(&mut self, token: &CharacterToken) -> SinkDirective {
            self.inner.on_character(token)
        }

        fn on_whitespace_character(&mut self, token: &CharacterToken) -> SinkDirective {
            self.inner.on_whitespace_character(token)
        }

        fn on_null_character(&mut self, token: &CharacterToken) -> SinkDirective {
            self.inner.on_null_character(token)
        }

        fn on_start_tag(&mut self, token: &mut TagToken) -> SinkDirective {
            let directive = match token.name.as_str() {
                "script" => SinkDirective::SwitchTo(TokenizerState::ScriptData),
                "style" | "iframe" | "noframes" | "xmp" => {
                    SinkDirective::SwitchTo(TokenizerState::RAWTEXT)
                },
                "textarea" | "title" => SinkDirective::SwitchTo(TokenizerState::RCDATA),
                "plaintext" => SinkDirective::SwitchTo(TokenizerState::PLAINTEXT),
                _ => SinkDirective::Continue,
            };
            let _ = self.inner.on_start_tag(token);
            directive
        }

        fn on_end_tag(&mut self, token: &mut TagToken) -> SinkDirective {
            self.inner.on_end_tag(token)
        }

        fn on_eof(&mut self, span: SourceSpan) {
            self.inner.on_eof(span);
        }
    }

    fn tokenize_with<S: TokenSink>(sink: S, input: &str) -> (S, Vec<ParserError>) {
        let mut tokenizer = Tokenizer::new(sink, CollectParseErrors::default());
        tokenizer
            .write(input, true)
            .expect("a fresh stream accepts writes");
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);

        let errors = std::mem::take(&mut tokenizer.error_handler_mut().errors);
        (tokenizer.into_sink(), errors)
    }

    fn tokenize(input: &str) -> (Vec<Token>, Vec<ParserError>) {
        let (sink, errors) = tokenize_with(Collect::default(), input);
        (sink.tokens, errors)
    }

    fn text_of(token: &Token) -> &str {
        match token {
            Token::Character(c) => &c.data,
            _ => panic!("expected a character token, found {token:?}"),
        }
    }

    #[test]
    fn simple_tag_sequence() {
        let (tokens, errors) = tokenize("<p>Hi</p>");
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 4);

        let Token::StartTag(p) = &tokens[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(p.name, "p");
        assert!(!p.self_closing);
        assert_eq!(p.span.start.offset, 0);
        assert_eq!(p.span.end.offset, 3);

        let Token::Character(hi) = &tokens[1] else {
            panic!("expected characters");
        };
        assert_eq!(hi.data, "Hi");
        assert_eq!(hi.kind, CharacterKind::Normal);
        assert_eq!(hi.span.start.offset, 3);
        assert_eq!(hi.span.end.offset, 5);

        let Token::EndTag(p) = &tokens[2] else {
            panic!("expected an end tag");
        };
        assert_eq!(p.name, "p");
        assert_eq!(p.span.start.offset, 5);
        assert_eq!(p.span.end.offset, 9);

        assert!(matches!(&tokens[3], Token::EndOfFile(span) if span.start.offset == 9));
    }

    #[test]
    fn comment() {
        let (tokens, errors) = tokenize("<!-- a -->");
        assert!(errors.is_empty());

        let Token::Comment(comment) = &tokens[0] else {
            panic!("expected a comment");
        };
        assert_eq!(comment.data, " a ");
        assert_eq!(comment.span.start.offset, 0);
        assert_eq!(comment.span.end.offset, 10);
        assert!(matches!(&tokens[1], Token::EndOfFile(_)));
    }

    #[test]
    fn character_references_in_data() {
        let (tokens, errors) = tokenize("&amp;&lt;&#65;");
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        assert_eq!(tokens.len(), 2);
        assert_eq!(text_of(&tokens[0]), "&<A");
        assert!(matches!(&tokens[1], Token::EndOfFile(_)));
    }

    #[test]
    fn newline_normalization_and_positions() {
        let (tokens, errors) = tokenize("a\r\nb\rc\nd");
        assert!(errors.is_empty());

        // Runs alternate between normal characters and newline whitespace
        let texts: Vec<&str> = tokens
            .iter()
            .take(7)
            .map(|token| text_of(token))
            .collect();
        assert_eq!(texts, vec!["a", "\n", "b", "\n", "c", "\n", "d"]);

        let expected_starts = [(1, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1), (4, 0)];
        for (token, (line, column)) in tokens.iter().zip(expected_starts) {
            let Token::Character(c) = token else {
                panic!("expected characters");
            };
            assert_eq!((c.span.start.line, c.span.start.column), (line, column));
        }
    }

    #[test]
    fn null_in_data_is_kept_with_error() {
        let (tokens, errors) = tokenize("a\0b");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::UnexpectedNullCharacter);
        assert_eq!(errors[0].span.start.offset, 1);

        assert_eq!(text_of(&tokens[0]), "a");
        let Token::Character(null) = &tokens[1] else {
            panic!("expected characters");
        };
        assert_eq!(null.kind, CharacterKind::Null);
        assert_eq!(null.data, "\0");
        assert_eq!(text_of(&tokens[2]), "b");
    }

    #[test]
    fn script_data_with_appropriate_end_tag() {
        let (sink, errors) = tokenize_with(RawTextAware::default(), "<script>x<</script>y");
        let tokens = sink.inner.tokens;
        assert!(errors.is_empty());

        assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "script"));
        assert_eq!(text_of(&tokens[1]), "x<");
        assert!(matches!(&tokens[2], Token::EndTag(tag) if tag.name == "script"));
        assert_eq!(text_of(&tokens[3]), "y");
        assert!(matches!(&tokens[4], Token::EndOfFile(_)));
    }

    #[test]
    fn rcdata_keeps_markup_as_text() {
        let (sink, errors) = tokenize_with(RawTextAware::default(), "<title>a<b></title>");
        let tokens = sink.inner.tokens;
        assert!(errors.is_empty());

        assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "title"));
        assert_eq!(text_of(&tokens[1]), "a<b>");
        assert!(matches!(&tokens[2], Token::EndTag(tag) if tag.name == "title"));
    }

    #[test]
    fn doctype() {
        let (tokens, errors) = tokenize("<!DOCTYPE html>");
        assert!(errors.is_empty());

        let Token::Doctype(doctype) = &tokens[0] else {
            panic!("expected a doctype");
        };
        assert_eq!(doctype.name.as_deref(), Some("html"));
        assert!(doctype.public_id.is_none());
        assert!(doctype.system_id.is_none());
        assert!(!doctype.force_quirks);
        assert_eq!(doctype.span.start.offset, 0);
        assert_eq!(doctype.span.end.offset, 15);
    }

    #[test]
    fn doctype_with_public_and_system_id() {
        let (tokens, errors) =
            tokenize("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">");
        assert!(errors.is_empty());

        let Token::Doctype(doctype) = &tokens[0] else {
            panic!("expected a doctype");
        };
        assert_eq!(doctype.name.as_deref(), Some("html"));
        assert_eq!(doctype.public_id.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
        assert_eq!(
            doctype.system_id.as_deref(),
            Some("http://www.w3.org/TR/html4/strict.dtd")
        );
        assert!(!doctype.force_quirks);
    }

    #[test]
    fn attributes_with_duplicate() {
        let (tokens, errors) = tokenize("<div id=\"a\" id=\"b\" class=c>");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::DuplicateAttribute);

        let Token::StartTag(div) = &tokens[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(div.name, "div");
        assert_eq!(div.attributes.len(), 2);
        assert_eq!(div.attributes[0].name, "id");
        assert_eq!(div.attributes[0].value, "a");
        assert_eq!(div.attributes[1].name, "class");
        assert_eq!(div.attributes[1].value, "c");
    }

    #[test]
    fn attribute_spans() {
        let (tokens, _) = tokenize("<a href=\"x\">");

        let Token::StartTag(a) = &tokens[0] else {
            panic!("expected a start tag");
        };
        let href = &a.attributes[0];
        assert_eq!(href.name_span.start.offset, 3);
        assert_eq!(href.name_span.end.offset, 7);
        assert_eq!(href.value_span.start.offset, 9);
        assert_eq!(href.value_span.end.offset, 10);
    }

    #[test]
    fn character_reference_in_attribute_value() {
        let (tokens, errors) = tokenize("<a href=\"?a=b&amp;c=d\">");
        assert!(errors.is_empty());

        let Token::StartTag(a) = &tokens[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(a.attributes[0].value, "?a=b&c=d");
    }

    #[test]
    fn legacy_reference_before_alphanumeric_stays_verbatim() {
        let (tokens, errors) = tokenize("<a b=\"&ampx\">");
        assert!(errors.is_empty());

        let Token::StartTag(a) = &tokens[0] else {
            panic!("expected a start tag");
        };
        assert_eq!(a.attributes[0].value, "&ampx");
    }

    #[test]
    fn legacy_reference_in_data_converts_with_error() {
        let (tokens, errors) = tokenize("&ampx");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            HtmlParseError::MissingSemicolonAfterCharacterReference
        );
        assert_eq!(text_of(&tokens[0]), "&x");
    }

    #[test]
    fn unmatched_reference_rolls_back_verbatim() {
        let (tokens, errors) = tokenize("&q1;x");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::UnknownNamedCharacterReference);

        let Token::Character(run) = &tokens[0] else {
            panic!("expected characters");
        };
        assert_eq!(run.data, "&q1;x");
        assert_eq!(run.span.start.offset, 0);
    }

    #[test]
    fn numeric_reference_control_substitution() {
        let (tokens, errors) = tokenize("&#x80;");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::ControlCharacterReference);
        assert_eq!(text_of(&tokens[0]), "\u{20AC}");
    }

    #[test]
    fn numeric_reference_out_of_range() {
        let (tokens, errors) = tokenize("&#x110000;");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].code,
            HtmlParseError::CharacterReferenceOutsideUnicodeRange
        );
        assert_eq!(text_of(&tokens[0]), "\u{FFFD}");
    }

    #[test]
    fn cdata_allowed_in_foreign_content() {
        let mut tokenizer = Tokenizer::new(Collect::default(), CollectParseErrors::default());
        tokenizer.set_allow_cdata(true);
        tokenizer.write("<![CDATA[x]]>", true).expect("accepts writes");
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);
        assert!(tokenizer.error_handler_mut().errors.is_empty());

        let tokens = tokenizer.into_sink().tokens;
        assert_eq!(text_of(&tokens[0]), "x");
        assert!(matches!(&tokens[1], Token::EndOfFile(_)));
    }

    #[test]
    fn cdata_in_html_content_is_a_bogus_comment() {
        let (tokens, errors) = tokenize("<![CDATA[x]]>");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::CdataInHtmlContent);

        let Token::Comment(comment) = &tokens[0] else {
            panic!("expected a comment");
        };
        assert_eq!(comment.data, "[CDATA[x]]");
    }

    #[test]
    fn eof_in_tag() {
        let (tokens, errors) = tokenize("<div");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::EofInTag);
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0], Token::EndOfFile(_)));
    }

    #[test]
    fn tag_split_across_chunks() {
        let mut tokenizer = Tokenizer::new(Collect::default(), CollectParseErrors::default());

        tokenizer.write("<di", false).expect("accepts writes");
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::EndOfChunk);
        assert!(tokenizer.sink().tokens.is_empty());

        tokenizer.write("v>", true).expect("accepts writes");
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);

        let tokens = tokenizer.into_sink().tokens;
        assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "div"));
    }

    #[test]
    fn entity_split_across_chunks() {
        let mut tokenizer = Tokenizer::new(Collect::default(), CollectParseErrors::default());

        tokenizer.write("a&am", false).expect("accepts writes");
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::EndOfChunk);

        tokenizer.write("p;b", true).expect("accepts writes");
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);
        assert!(tokenizer.error_handler_mut().errors.is_empty());

        let tokens = tokenizer.into_sink().tokens;
        assert_eq!(text_of(&tokens[0]), "a&b");
    }

    #[test]
    fn write_after_close_is_rejected() {
        let mut tokenizer = Tokenizer::new(Collect::default(), CollectParseErrors::default());
        tokenizer.write("x", true).expect("accepts writes");
        assert_eq!(
            tokenizer.write("y", true),
            Err(UsageError::StreamClosed),
        );
    }

    #[test]
    fn sink_suspension_stops_at_token_boundary() {
        struct SuspendOnB {
            inner: Collect,
        }

        impl TokenSink for SuspendOnB {
            fn on_character(&mut self, token: &CharacterToken) -> SinkDirective {
                self.inner.on_character(token)
            }

            fn on_start_tag(
                &mut self,
                token: &mut TagToken,
            ) -> SinkDirective {
                let _ = self.inner.on_start_tag(token);
                if token.name == "b" {
                    SinkDirective::Suspend
                } else {
                    SinkDirective::Continue
                }
            }

            fn on_end_tag(&mut self, token: &mut TagToken) -> SinkDirective {
                self.inner.on_end_tag(token)
            }

            fn on_eof(&mut self, span: SourceSpan) {
                self.inner.on_eof(span);
            }
        }

        let mut tokenizer = Tokenizer::new(
            SuspendOnB {
                inner: Collect::default(),
            },
            CollectParseErrors::default(),
        );
        tokenizer.write("<b>rest", true).expect("accepts writes");
        assert_eq!(
            tokenizer.run_for_current_chunk(),
            ChunkOutcome::SuspendedBySink
        );
        assert_eq!(tokenizer.sink().inner.tokens.len(), 1);

        tokenizer.reactivate();
        assert_eq!(tokenizer.run_for_current_chunk(), ChunkOutcome::Finished);
        let tokens = tokenizer.into_sink().inner.tokens;
        assert_eq!(text_of(&tokens[1]), "rest");
        assert!(matches!(&tokens[2], Token::EndOfFile(_)));
    }
}
