//! Token model for the tokenization stage.
//!
//! Tokens are assembled incrementally by the state machine through the
//! builder types in this module, then handed to a [`TokenSink`] by
//! reference. Anything the sink wants to keep it has to copy.

use super::tokenizer::TokenizerState;
use crate::{
    infra,
    infra::Namespace,
    location::{SourcePosition, SourceSpan},
};

/// A fully assembled token.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    Doctype(DoctypeToken),
    StartTag(TagToken),
    EndTag(TagToken),
    Comment(CommentToken),
    Character(CharacterToken),
    EndOfFile(SourceSpan),
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoctypeToken {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub force_quirks: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentToken {
    pub data: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagToken {
    /// The tag identifier, lowercased.
    ///
    /// For `<script>`, this would be `"script"` for example.
    pub name: String,

    /// Whether the tag declaration closes itself (`<tag/>`)
    pub self_closing: bool,

    /// Set by the tree builder once it has honored the self-closing flag.
    /// The tokenizer only records `self_closing`.
    pub self_closing_acknowledged: bool,

    pub attributes: Vec<Attribute>,

    pub span: SourceSpan,
}

impl TagToken {
    pub fn acknowledge_self_closing(&mut self) {
        self.self_closing_acknowledged = true;
    }

    #[must_use]
    pub fn lookup_attribute<'a>(&'a self, want: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == want)
            .map(|attribute| attribute.value.as_str())
    }
}

/// A single tag attribute.
///
/// `prefix` and `namespace` stay empty during tokenization; foreign-content
/// attribute adjustment in the tree construction stage fills them in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub prefix: Option<String>,
    pub namespace: Option<Namespace>,
    pub name_span: SourceSpan,
    pub value_span: SourceSpan,
}

/// Classification of a character run.
///
/// Runs never mix kinds; a kind change flushes the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterKind {
    Whitespace,
    Null,
    Normal,
}

impl CharacterKind {
    #[must_use]
    pub const fn of(c: char) -> Self {
        if c == '\0' {
            Self::Null
        } else if infra::is_ascii_whitespace(c) {
            Self::Whitespace
        } else {
            Self::Normal
        }
    }
}

/// A coalesced run of adjacent characters of one kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterToken {
    pub kind: CharacterKind,
    pub data: String,
    pub span: SourceSpan,
}

/// Tells the tokenizer what to do after a token was delivered.
///
/// [`SwitchTo`](SinkDirective::SwitchTo) is how a tree builder moves the
/// tokenizer into RAWTEXT, RCDATA, PLAINTEXT or script data after seeing
/// the corresponding start tag. Returning
/// [`Suspend`](SinkDirective::Suspend) stops the parsing loop at the
/// current token boundary; the scriptable driver turns that into the
/// script-execution pause. All in-progress state stays valid for
/// resumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkDirective {
    #[default]
    Continue,
    SwitchTo(TokenizerState),
    Suspend,
}

/// Consumer interface for the token stream.
///
/// Every token is passed by reference and only valid for the duration of
/// the call. Tag tokens come as `&mut` so a tree builder can acknowledge
/// the self-closing flag in place.
pub trait TokenSink {
    fn on_character(&mut self, token: &CharacterToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_whitespace_character(&mut self, token: &CharacterToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_null_character(&mut self, token: &CharacterToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_comment(&mut self, token: &CommentToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_doctype(&mut self, token: &DoctypeToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_start_tag(&mut self, token: &mut TagToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_end_tag(&mut self, token: &mut TagToken) -> SinkDirective {
        _ = token;
        SinkDirective::Continue
    }

    fn on_eof(&mut self, span: SourceSpan) {
        _ = span;
    }
}

/// The token currently being assembled, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentToken {
    current_token: Option<TokenBuilder>,
}

#[derive(Debug, Clone)]
pub enum TokenBuilder {
    Doctype(DoctypeBuilder),
    Tag(TagBuilder),
    Comment(CommentBuilder),
}

#[derive(Debug, Clone, Default)]
pub struct DoctypeBuilder {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub force_quirks: bool,
    pub start: SourcePosition,
}

#[derive(Debug, Clone, Default)]
pub struct CommentBuilder {
    pub data: String,
    pub start: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct TagBuilder {
    pub is_start: bool,
    pub name: String,
    pub self_closing: bool,
    pub attributes: Vec<Attribute>,
    pub start: SourcePosition,

    current_attribute_name: String,
    current_attribute_value: String,
    current_attribute_name_span: SourceSpan,
    current_attribute_value_span: SourceSpan,
    current_attribute_value_started: bool,
    current_attribute_is_duplicate: bool,
    has_current_attribute: bool,
}

impl CurrentToken {
    pub fn create_start_tag(&mut self, start: SourcePosition) {
        self.current_token = Some(TokenBuilder::Tag(TagBuilder::new(true, start)));
    }

    pub fn create_end_tag(&mut self, start: SourcePosition) {
        self.current_token = Some(TokenBuilder::Tag(TagBuilder::new(false, start)));
    }

    pub fn create_comment(&mut self, start: SourcePosition) {
        self.current_token = Some(TokenBuilder::Comment(CommentBuilder {
            data: String::new(),
            start,
        }));
    }

    pub fn create_doctype(&mut self, start: SourcePosition) {
        self.current_token = Some(TokenBuilder::Doctype(DoctypeBuilder {
            start,
            ..DoctypeBuilder::default()
        }));
    }

    pub fn tag(&mut self) -> &mut TagBuilder {
        match self.current_token {
            Some(TokenBuilder::Tag(ref mut tag)) => tag,
            _ => panic!("current token is not a tag"),
        }
    }

    #[must_use]
    pub fn tag_ref(&self) -> Option<&TagBuilder> {
        match self.current_token {
            Some(TokenBuilder::Tag(ref tag)) => Some(tag),
            _ => None,
        }
    }

    pub fn append_to_tag_name(&mut self, c: char) {
        if let Some(TokenBuilder::Tag(TagBuilder { ref mut name, .. })) = self.current_token {
            name.push(c);
        }
    }

    pub fn append_to_comment(&mut self, c: char) {
        if let Some(TokenBuilder::Comment(CommentBuilder { ref mut data, .. })) =
            self.current_token
        {
            data.push(c);
        }
    }

    pub fn append_str_to_comment(&mut self, s: &str) {
        if let Some(TokenBuilder::Comment(CommentBuilder { ref mut data, .. })) =
            self.current_token
        {
            data.push_str(s);
        }
    }

    pub fn set_self_closing(&mut self) {
        if let Some(TokenBuilder::Tag(TagBuilder {
            ref mut self_closing,
            ..
        })) = self.current_token
        {
            *self_closing = true;
        }
    }

    pub fn set_force_quirks(&mut self) {
        if let Some(TokenBuilder::Doctype(DoctypeBuilder {
            ref mut force_quirks,
            ..
        })) = self.current_token
        {
            *force_quirks = true;
        }
    }

    pub fn append_to_doctype_name(&mut self, c: char) {
        if let Some(TokenBuilder::Doctype(DoctypeBuilder { ref mut name, .. })) =
            self.current_token
        {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    pub fn init_doctype_public_id(&mut self) {
        if let Some(TokenBuilder::Doctype(DoctypeBuilder {
            ref mut public_id, ..
        })) = self.current_token
        {
            *public_id = Some(String::new());
        }
    }

    pub fn append_to_doctype_public_id(&mut self, c: char) {
        if let Some(TokenBuilder::Doctype(DoctypeBuilder {
            public_id: Some(ref mut public_id),
            ..
        })) = self.current_token
        {
            public_id.push(c);
        }
    }

    pub fn init_doctype_system_id(&mut self) {
        if let Some(TokenBuilder::Doctype(DoctypeBuilder {
            ref mut system_id, ..
        })) = self.current_token
        {
            *system_id = Some(String::new());
        }
    }

    pub fn append_to_doctype_system_id(&mut self, c: char) {
        if let Some(TokenBuilder::Doctype(DoctypeBuilder {
            system_id: Some(ref mut system_id),
            ..
        })) = self.current_token
        {
            system_id.push(c);
        }
    }

    /// Finalizes the token under construction.
    ///
    /// `end` points just past the last character that belongs to the token.
    pub fn build(&mut self, end: SourcePosition) -> Token {
        match self.current_token.take() {
            Some(TokenBuilder::Doctype(doctype)) => Token::Doctype(DoctypeToken {
                name: doctype.name,
                public_id: doctype.public_id,
                system_id: doctype.system_id,
                force_quirks: doctype.force_quirks,
                span: SourceSpan::new(doctype.start, end),
            }),
            Some(TokenBuilder::Comment(comment)) => Token::Comment(CommentToken {
                data: comment.data,
                span: SourceSpan::new(comment.start, end),
            }),
            Some(TokenBuilder::Tag(tag)) => tag.build(end),
            None => panic!("no token under construction"),
        }
    }
}

impl TagBuilder {
    fn new(is_start: bool, start: SourcePosition) -> Self {
        Self {
            is_start,
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
            start,
            current_attribute_name: String::new(),
            current_attribute_value: String::new(),
            current_attribute_name_span: SourceSpan::default(),
            current_attribute_value_span: SourceSpan::default(),
            current_attribute_value_started: false,
            current_attribute_is_duplicate: false,
            has_current_attribute: false,
        }
    }

    /// Commits the attribute under construction and begins a fresh one.
    pub fn start_new_attribute(&mut self) {
        self.commit_current_attribute();
        self.has_current_attribute = true;
    }

    pub fn append_to_attribute_name(&mut self, c: char, at: SourcePosition) {
        if self.current_attribute_name.is_empty() {
            self.current_attribute_name_span.start = at;
        }
        self.current_attribute_name.push(c);
    }

    /// Records where the attribute value begins, the first time it is
    /// called for an attribute. Needed so a value that opens with a
    /// character reference is anchored at the `&`.
    pub fn note_attribute_value_at(&mut self, at: SourcePosition) {
        if !self.current_attribute_value_started {
            self.current_attribute_value_started = true;
            self.current_attribute_value_span.start = at;
        }
    }

    pub fn append_to_attribute_value(&mut self, c: char, at: SourcePosition) {
        self.note_attribute_value_at(at);
        self.current_attribute_value.push(c);
    }

    pub fn append_str_to_attribute_value(&mut self, s: &str, at: SourcePosition) {
        self.note_attribute_value_at(at);
        self.current_attribute_value.push_str(s);
    }

    /// Closes the attribute name. Returns `true` when the name duplicates
    /// an earlier attribute of this tag, in which case the whole attribute
    /// will be dropped on commit.
    pub fn finish_attribute_name(&mut self, end: SourcePosition) -> bool {
        self.current_attribute_name_span.end = end;

        let is_duplicate = self
            .attributes
            .iter()
            .any(|attribute| attribute.name == self.current_attribute_name);
        self.current_attribute_is_duplicate = is_duplicate;
        is_duplicate
    }

    pub fn finish_attribute_value(&mut self, end: SourcePosition) {
        self.note_attribute_value_at(end);
        self.current_attribute_value_span.end = end;
    }

    fn commit_current_attribute(&mut self) {
        if !self.has_current_attribute {
            return;
        }

        if !self.current_attribute_value_started {
            // Valueless attribute; give the value a zero-width span at the
            // end of the name.
            self.current_attribute_value_span =
                self.current_attribute_name_span.end.collapsed();
        }

        if self.current_attribute_is_duplicate {
            self.current_attribute_name.clear();
            self.current_attribute_value.clear();
        } else {
            self.attributes.push(Attribute {
                name: std::mem::take(&mut self.current_attribute_name),
                value: std::mem::take(&mut self.current_attribute_value),
                prefix: None,
                namespace: None,
                name_span: self.current_attribute_name_span,
                value_span: self.current_attribute_value_span,
            });
        }

        self.current_attribute_name_span = SourceSpan::default();
        self.current_attribute_value_span = SourceSpan::default();
        self.current_attribute_value_started = false;
        self.current_attribute_is_duplicate = false;
        self.has_current_attribute = false;
    }

    pub fn build(mut self, end: SourcePosition) -> Token {
        self.commit_current_attribute();

        let token = TagToken {
            name: self.name,
            self_closing: self.self_closing,
            self_closing_acknowledged: false,
            attributes: self.attributes,
            span: SourceSpan::new(self.start, end),
        };

        if self.is_start {
            Token::StartTag(token)
        } else {
            Token::EndTag(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_attributes_are_dropped() {
        let mut tag = TagBuilder::new(true, SourcePosition::default());

        tag.start_new_attribute();
        tag.append_to_attribute_name('i', SourcePosition::default());
        tag.append_to_attribute_name('d', SourcePosition::default());
        assert!(!tag.finish_attribute_name(SourcePosition::default()));
        tag.append_to_attribute_value('a', SourcePosition::default());

        tag.start_new_attribute();
        tag.append_to_attribute_name('i', SourcePosition::default());
        tag.append_to_attribute_name('d', SourcePosition::default());
        assert!(tag.finish_attribute_name(SourcePosition::default()));
        tag.append_to_attribute_value('b', SourcePosition::default());

        let Token::StartTag(tag) = tag.build(SourcePosition::default()) else {
            panic!("expected a start tag");
        };

        assert_eq!(tag.attributes.len(), 1);
        assert_eq!(tag.attributes[0].name, "id");
        assert_eq!(tag.attributes[0].value, "a");
    }

    #[test]
    fn character_kinds() {
        assert_eq!(CharacterKind::of('\0'), CharacterKind::Null);
        assert_eq!(CharacterKind::of(' '), CharacterKind::Whitespace);
        assert_eq!(CharacterKind::of('\n'), CharacterKind::Whitespace);
        assert_eq!(CharacterKind::of('x'), CharacterKind::Normal);
        assert_eq!(CharacterKind::of('\u{FFFD}'), CharacterKind::Normal);
    }
}
