//! The [parse error](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors) catalog
//! and the handler interface through which errors are delivered.
//!
//! Parse errors are recoverable diagnostics; tokenization never aborts on
//! one. Contract violations are a different beast and live in
//! [`crate::streaming::UsageError`].

use crate::location::SourceSpan;

use std::fmt;

/// Every parse error the tokenization stage can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HtmlParseError {
    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-closing-of-empty-comment>
    AbruptClosingOfEmptyComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-doctype-public-identifier>
    AbruptDoctypePublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-abrupt-doctype-system-identifier>
    AbruptDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-absence-of-digits-in-numeric-character-reference>
    AbsenceOfDigitsInNumericCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-cdata-in-html-content>
    CdataInHtmlContent,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-character-reference-outside-unicode-range>
    CharacterReferenceOutsideUnicodeRange,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-control-character-in-input-stream>
    ControlCharacterInInputStream,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-control-character-reference>
    ControlCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-duplicate-attribute>
    DuplicateAttribute,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-end-tag-with-attributes>
    ///
    /// Reported by the token consumer; the tokenizer itself keeps the
    /// attributes on the token.
    EndTagWithAttributes,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-end-tag-with-trailing-solidus>
    ///
    /// Reported by the token consumer.
    EndTagWithTrailingSolidus,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-before-tag-name>
    EofBeforeTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-cdata>
    EofInCdata,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-comment>
    EofInComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-doctype>
    EofInDoctype,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-script-html-comment-like-text>
    EofInScriptHtmlCommentLikeText,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-eof-in-tag>
    EofInTag,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-incorrectly-closed-comment>
    IncorrectlyClosedComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-incorrectly-opened-comment>
    IncorrectlyOpenedComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-invalid-character-sequence-after-doctype-name>
    InvalidCharacterSequenceAfterDoctypeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-invalid-first-character-of-tag-name>
    InvalidFirstCharacterOfTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-attribute-value>
    MissingAttributeValue,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-doctype-name>
    MissingDoctypeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-doctype-public-identifier>
    MissingDoctypePublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-doctype-system-identifier>
    MissingDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-end-tag-name>
    MissingEndTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-quote-before-doctype-public-identifier>
    MissingQuoteBeforeDoctypePublicIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-quote-before-doctype-system-identifier>
    MissingQuoteBeforeDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-semicolon-after-character-reference>
    MissingSemicolonAfterCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-after-doctype-public-keyword>
    MissingWhitespaceAfterDoctypePublicKeyword,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-after-doctype-system-keyword>
    MissingWhitespaceAfterDoctypeSystemKeyword,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-before-doctype-name>
    MissingWhitespaceBeforeDoctypeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-between-attributes>
    MissingWhitespaceBetweenAttributes,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-missing-whitespace-between-doctype-public-and-system-identifiers>
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-nested-comment>
    NestedComment,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-noncharacter-character-reference>
    NoncharacterCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-noncharacter-in-input-stream>
    NoncharacterInInputStream,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-non-void-html-element-start-tag-with-trailing-solidus>
    ///
    /// Reported by the token consumer when it declines to acknowledge the
    /// self-closing flag.
    NonVoidHtmlElementStartTagWithTrailingSolidus,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-null-character-reference>
    NullCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-surrogate-character-reference>
    SurrogateCharacterReference,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-surrogate-in-input-stream>
    SurrogateInInputStream,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-character-after-doctype-system-identifier>
    UnexpectedCharacterAfterDoctypeSystemIdentifier,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-character-in-attribute-name>
    UnexpectedCharacterInAttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-character-in-unquoted-attribute-value>
    UnexpectedCharacterInUnquotedAttributeValue,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-equals-sign-before-attribute-name>
    UnexpectedEqualsSignBeforeAttributeName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-null-character>
    UnexpectedNullCharacter,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-question-mark-instead-of-tag-name>
    UnexpectedQuestionMarkInsteadOfTagName,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unexpected-solidus-in-tag>
    UnexpectedSolidusInTag,

    /// <https://html.spec.whatwg.org/multipage/parsing.html#parse-error-unknown-named-character-reference>
    UnknownNamedCharacterReference,
}

impl HtmlParseError {
    /// The identifier used by the standard for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            Self::AbruptDoctypePublicIdentifier => "abrupt-doctype-public-identifier",
            Self::AbruptDoctypeSystemIdentifier => "abrupt-doctype-system-identifier",
            Self::AbsenceOfDigitsInNumericCharacterReference => {
                "absence-of-digits-in-numeric-character-reference"
            },
            Self::CdataInHtmlContent => "cdata-in-html-content",
            Self::CharacterReferenceOutsideUnicodeRange => {
                "character-reference-outside-unicode-range"
            },
            Self::ControlCharacterInInputStream => "control-character-in-input-stream",
            Self::ControlCharacterReference => "control-character-reference",
            Self::DuplicateAttribute => "duplicate-attribute",
            Self::EndTagWithAttributes => "end-tag-with-attributes",
            Self::EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            Self::EofBeforeTagName => "eof-before-tag-name",
            Self::EofInCdata => "eof-in-cdata",
            Self::EofInComment => "eof-in-comment",
            Self::EofInDoctype => "eof-in-doctype",
            Self::EofInScriptHtmlCommentLikeText => "eof-in-script-html-comment-like-text",
            Self::EofInTag => "eof-in-tag",
            Self::IncorrectlyClosedComment => "incorrectly-closed-comment",
            Self::IncorrectlyOpenedComment => "incorrectly-opened-comment",
            Self::InvalidCharacterSequenceAfterDoctypeName => {
                "invalid-character-sequence-after-doctype-name"
            },
            Self::InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            Self::MissingAttributeValue => "missing-attribute-value",
            Self::MissingDoctypeName => "missing-doctype-name",
            Self::MissingDoctypePublicIdentifier => "missing-doctype-public-identifier",
            Self::MissingDoctypeSystemIdentifier => "missing-doctype-system-identifier",
            Self::MissingEndTagName => "missing-end-tag-name",
            Self::MissingQuoteBeforeDoctypePublicIdentifier => {
                "missing-quote-before-doctype-public-identifier"
            },
            Self::MissingQuoteBeforeDoctypeSystemIdentifier => {
                "missing-quote-before-doctype-system-identifier"
            },
            Self::MissingSemicolonAfterCharacterReference => {
                "missing-semicolon-after-character-reference"
            },
            Self::MissingWhitespaceAfterDoctypePublicKeyword => {
                "missing-whitespace-after-doctype-public-keyword"
            },
            Self::MissingWhitespaceAfterDoctypeSystemKeyword => {
                "missing-whitespace-after-doctype-system-keyword"
            },
            Self::MissingWhitespaceBeforeDoctypeName => "missing-whitespace-before-doctype-name",
            Self::MissingWhitespaceBetweenAttributes => "missing-whitespace-between-attributes",
            Self::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers => {
                "missing-whitespace-between-doctype-public-and-system-identifiers"
            },
            Self::NestedComment => "nested-comment",
            Self::NoncharacterCharacterReference => "noncharacter-character-reference",
            Self::NoncharacterInInputStream => "noncharacter-in-input-stream",
            Self::NonVoidHtmlElementStartTagWithTrailingSolidus => {
                "non-void-html-element-start-tag-with-trailing-solidus"
            },
            Self::NullCharacterReference => "null-character-reference",
            Self::SurrogateCharacterReference => "surrogate-character-reference",
            Self::SurrogateInInputStream => "surrogate-in-input-stream",
            Self::UnexpectedCharacterAfterDoctypeSystemIdentifier => {
                "unexpected-character-after-doctype-system-identifier"
            },
            Self::UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            Self::UnexpectedCharacterInUnquotedAttributeValue => {
                "unexpected-character-in-unquoted-attribute-value"
            },
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            },
            Self::UnexpectedNullCharacter => "unexpected-null-character",
            Self::UnexpectedQuestionMarkInsteadOfTagName => {
                "unexpected-question-mark-instead-of-tag-name"
            },
            Self::UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            Self::UnknownNamedCharacterReference => "unknown-named-character-reference",
        }
    }
}

impl fmt::Display for HtmlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A parse error together with where it occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserError {
    pub code: HtmlParseError,
    pub span: SourceSpan,
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.code, self.span)
    }
}

/// Receives parse errors as they are discovered.
pub trait ParseErrorHandler {
    /// When `false`, the input stream skips its detailed per-character
    /// checks (control characters, noncharacters) entirely. State-machine
    /// errors are still not delivered anywhere, so implementations setting
    /// this to `false` get the fastest path.
    const REPORTS_ERRORS: bool = true;

    fn handle(&mut self, error: ParserError);
}

/// Discards all parse errors and disables the detailed input-stream checks.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreParseErrors;

impl ParseErrorHandler for IgnoreParseErrors {
    const REPORTS_ERRORS: bool = false;

    fn handle(&mut self, error: ParserError) {
        _ = error;
    }
}

/// Accumulates every reported error, mostly useful for conformance checks.
#[derive(Clone, Debug, Default)]
pub struct CollectParseErrors {
    pub errors: Vec<ParserError>,
}

impl ParseErrorHandler for CollectParseErrors {
    fn handle(&mut self, error: ParserError) {
        self.errors.push(error);
    }
}
