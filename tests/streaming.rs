//! Incremental delivery: chunking invariance and the script suspension
//! protocol.

mod common;

use common::{tokenize, tokenize_split_at, RecordingSink};
use html_stream::{CollectParseErrors, ScriptableStream, Token, UsageError, WriteOutcome};

/// Splitting the input at any UTF-16 code unit boundary must not change
/// the tokens, their spans, or the reported errors.
#[test]
fn chunking_invariance() {
    let inputs = [
        "<p>Hi</p>",
        "<!DOCTYPE html><p class=\"a b\" id=x>text</p>",
        "a\r\nb\rc\nd",
        "x💚y",
        "&amp;&lt;&#65;&notin;&ampx",
        "<script>if (a < b) { x-- }</script>done",
        "<title>a<b></title>",
        "<!--comment--><!-->",
        "<em style=\"color: &quot;red&quot;\">!</em>",
        "<div\u{0000}attr>&#x110000;",
    ];

    for input in inputs {
        let (reference_tokens, reference_errors) = tokenize(input);
        let unit_count = input.encode_utf16().count();

        for split in 0..=unit_count {
            let (tokens, errors) = tokenize_split_at(input, split);
            assert_eq!(
                tokens, reference_tokens,
                "tokens diverge for {input:?} split at {split}"
            );
            assert_eq!(
                errors, reference_errors,
                "errors diverge for {input:?} split at {split}"
            );
        }
    }
}

/// A suspension mid-chunk leaves the rest of the chunk for after the
/// resume, with inserted text taking priority.
#[test]
fn document_write_interleaving() {
    let mut stream = ScriptableStream::new(RecordingSink::scripting(), CollectParseErrors::default());
    stream.set_scripting(true);

    let outcome = stream
        .write("<script></script><b>", true)
        .expect("stream accepts writes");
    assert_eq!(outcome, WriteOutcome::SuspendedForScript);

    stream.document_write("<i>").expect("suspended for script");
    let outcome = stream.resume().expect("suspended for script");
    assert_eq!(outcome, WriteOutcome::Finished);

    let names: Vec<&str> = stream
        .sink()
        .tokens
        .iter()
        .filter_map(|token| match token {
            Token::StartTag(tag) => Some(tag.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["script", "i", "b"]);
}

/// Nested document.write payloads tokenize before the text that was
/// already buffered, and in call order among themselves.
#[test]
fn document_write_stack_order() {
    let mut stream = ScriptableStream::new(RecordingSink::scripting(), CollectParseErrors::default());
    stream.set_scripting(true);

    stream
        .write("<script></script>rest", true)
        .expect("stream accepts writes");
    stream.document_write("one ").expect("suspended");
    stream.document_write("two ").expect("suspended");
    stream.resume().expect("suspended");

    let text: String = stream
        .sink()
        .tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character(c) => Some(c.data.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "one two rest");
}

#[test]
fn resume_and_document_write_require_a_suspension() {
    let mut stream =
        ScriptableStream::new(RecordingSink::scripting(), CollectParseErrors::default());
    stream.set_scripting(true);

    assert_eq!(stream.resume().unwrap_err(), UsageError::AlreadyResumed);
    assert_eq!(
        stream.document_write("x").unwrap_err(),
        UsageError::NotPausedByScript
    );

    stream
        .write("<script></script>", true)
        .expect("stream accepts writes");
    stream.resume().expect("suspended");
    assert_eq!(stream.resume().unwrap_err(), UsageError::AlreadyResumed);
}

#[test]
fn writes_during_suspension_are_buffered_in_order() {
    let mut stream =
        ScriptableStream::new(RecordingSink::scripting(), CollectParseErrors::default());
    stream.set_scripting(true);

    stream
        .write("<script></script>", false)
        .expect("stream accepts writes");
    assert!(stream.is_suspended_for_script());

    stream.write("a", false).expect("buffered");
    stream.write("b", true).expect("buffered");
    assert!(stream.sink().tokens.len() == 2, "only the script tags so far");

    stream.document_write("c").expect("suspended");
    assert_eq!(stream.resume().expect("suspended"), WriteOutcome::Finished);

    let text: String = stream
        .sink()
        .tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character(c) => Some(c.data.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "cab");
}

#[test]
fn suspension_across_chunk_boundary_keeps_positions() {
    let single = {
        let mut stream =
            ScriptableStream::new(RecordingSink::tree_builder_like(), CollectParseErrors::default());
        stream.write("<b>x</b>", true).expect("accepts writes");
        stream.into_sink().tokens
    };

    let chunked = {
        let mut stream =
            ScriptableStream::new(RecordingSink::tree_builder_like(), CollectParseErrors::default());
        stream.write("<b>", false).expect("accepts writes");
        stream.write("x", false).expect("accepts writes");
        stream.write("</b>", true).expect("accepts writes");
        stream.into_sink().tokens
    };

    assert_eq!(single, chunked);
}

#[test]
fn stopping_abandons_the_rest_of_the_stream() {
    let mut stream =
        ScriptableStream::new(RecordingSink::tree_builder_like(), CollectParseErrors::default());

    stream.write("<p>", false).expect("accepts writes");
    stream.stop();

    let before = stream.sink().tokens.len();
    assert_eq!(
        stream.write("<i>never seen", true).expect("ignored"),
        WriteOutcome::Finished
    );
    assert_eq!(stream.sink().tokens.len(), before);
}
