//! End-to-end tokenization scenarios through the public API.

mod common;

use common::{span_of, tokenize};
use html_stream::{CharacterKind, HtmlParseError, Token};

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character(c) => Some(c.data.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn paragraph() {
    let (tokens, errors) = tokenize("<p>Hi</p>");
    assert!(errors.is_empty());

    assert_eq!(tokens.len(), 4);
    assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "p"));
    assert!(matches!(
        &tokens[1],
        Token::Character(c) if c.data == "Hi" && c.kind == CharacterKind::Normal
    ));
    assert!(matches!(&tokens[2], Token::EndTag(tag) if tag.name == "p"));
    assert!(matches!(&tokens[3], Token::EndOfFile(_)));
}

#[test]
fn comment() {
    let (tokens, errors) = tokenize("<!-- a -->");
    assert!(errors.is_empty());

    assert_eq!(tokens.len(), 2);
    assert!(matches!(&tokens[0], Token::Comment(c) if c.data == " a "));
    assert!(matches!(&tokens[1], Token::EndOfFile(_)));
}

#[test]
fn character_references() {
    let (tokens, errors) = tokenize("&amp;&lt;&#65;");
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");

    assert_eq!(texts(&tokens), vec!["&<A"]);
}

#[test]
fn newline_normalization_and_line_numbers() {
    let (tokens, errors) = tokenize("a\r\nb\rc\nd");
    assert!(errors.is_empty());

    // Character runs alternate between the letters and the normalized
    // newlines; all carriage returns read as line feeds.
    assert_eq!(texts(&tokens), vec!["a", "\n", "b", "\n", "c", "\n", "d"]);

    let starts: Vec<(u32, u32)> = tokens
        .iter()
        .filter(|token| matches!(token, Token::Character(_)))
        .map(|token| {
            let span = span_of(token);
            (span.start.line, span.start.column)
        })
        .collect();
    assert_eq!(
        starts,
        vec![(1, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1), (4, 0)]
    );
}

#[test]
fn script_data_with_appropriate_end_tag() {
    let (tokens, errors) = tokenize("<script>x<</script>y");
    assert!(errors.is_empty());

    assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "script"));
    assert!(matches!(
        &tokens[1],
        Token::Character(c) if c.data == "x<" && c.kind == CharacterKind::Normal
    ));
    assert!(matches!(&tokens[2], Token::EndTag(tag) if tag.name == "script"));
    assert!(matches!(&tokens[3], Token::Character(c) if c.data == "y"));
    assert!(matches!(&tokens[4], Token::EndOfFile(_)));
}

#[test]
fn rawtext_and_rcdata_content() {
    let (tokens, errors) = tokenize("<style>a { content: \"<b>\" }</style>");
    assert!(errors.is_empty());

    assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "style"));
    let body: String = texts(&tokens).concat();
    assert_eq!(body, "a { content: \"<b>\" }");
}

#[test]
fn plaintext_swallows_everything() {
    let (tokens, errors) = tokenize("<plaintext></plaintext><p>");
    assert!(errors.is_empty());

    assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "plaintext"));
    assert_eq!(texts(&tokens), vec!["</plaintext><p>"]);
}

#[test]
fn self_closing_flag_is_recorded() {
    let (tokens, _) = tokenize("<br/>");

    let Token::StartTag(br) = &tokens[0] else {
        panic!("expected a start tag");
    };
    assert_eq!(br.name, "br");
    assert!(br.self_closing);
    assert!(!br.self_closing_acknowledged);
}

#[test]
fn end_tag_with_attributes_keeps_them_for_the_consumer() {
    let (tokens, errors) = tokenize("</p class=x>");
    assert!(errors.is_empty());

    let Token::EndTag(p) = &tokens[0] else {
        panic!("expected an end tag");
    };
    assert_eq!(p.name, "p");
    assert_eq!(p.attributes.len(), 1);
    assert_eq!(p.attributes[0].name, "class");
}

#[test]
fn location_monotonicity() {
    let inputs = [
        "<p>Hi</p>",
        "<!DOCTYPE html><html><body>text &amp; more<br/></body></html>",
        "a\r\nb\rc\nd",
        "<script>x<</script>y",
        "x💚y<em a=\"💚\">z</em>",
        "<!--c--><![CDATA[y]]>&unknown;",
    ];

    for input in inputs {
        let (tokens, _) = tokenize(input);

        for token in &tokens {
            let span = span_of(token);
            assert!(
                span.start.offset <= span.end.offset,
                "span inverted for {token:?} in {input:?}"
            );
        }

        for window in tokens.windows(2) {
            let first = span_of(&window[0]);
            let second = span_of(&window[1]);
            assert!(
                first.end.offset <= second.start.offset,
                "tokens overlap: {:?} then {:?} in {input:?}",
                window[0],
                window[1]
            );
        }
    }
}

#[test]
fn offsets_count_utf16_code_units() {
    let (tokens, errors) = tokenize("💚<b>");
    assert!(errors.is_empty());

    let heart = span_of(&tokens[0]);
    assert_eq!(heart.start.offset, 0);
    assert_eq!(heart.end.offset, 2);

    let b = span_of(&tokens[1]);
    assert_eq!(b.start.offset, 2);
    assert_eq!(b.end.offset, 5);
}

#[test]
fn eof_errors_still_salvage_tokens() {
    let (tokens, errors) = tokenize("<!-- unterminated");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, HtmlParseError::EofInComment);
    assert!(matches!(&tokens[0], Token::Comment(c) if c.data == " unterminated"));
    assert!(matches!(&tokens[1], Token::EndOfFile(_)));
}

#[test]
fn eof_in_doctype_forces_quirks() {
    let (tokens, errors) = tokenize("<!DOCTYPE html");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, HtmlParseError::EofInDoctype);

    let Token::Doctype(doctype) = &tokens[0] else {
        panic!("expected a doctype");
    };
    assert_eq!(doctype.name.as_deref(), Some("html"));
    assert!(doctype.force_quirks);
}

#[test]
fn parse_errors_carry_positions() {
    let (_, errors) = tokenize("x\n<div\u{0000}>");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, HtmlParseError::UnexpectedNullCharacter);
    assert_eq!(errors[0].span.start.line, 2);
    assert_eq!(errors[0].span.start.column, 4);
    assert_eq!(errors[0].span.start.offset, 6);
}

#[test]
fn input_stream_errors_deduplicate() {
    // The ambiguous-ampersand rollback re-reads the same region; the
    // control character in it must be reported once.
    let (_, errors) = tokenize("&x\u{0001};");

    let control_errors: Vec<_> = errors
        .iter()
        .filter(|error| error.code == HtmlParseError::ControlCharacterInInputStream)
        .collect();
    assert_eq!(control_errors.len(), 1);
}
