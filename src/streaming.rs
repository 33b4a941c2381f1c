//! Driving the tokenizer over a chunked input stream, with cooperative
//! suspension around scripts.
//!
//! The driver owns the tokenizer and the `document.write` machinery: while
//! suspended for a script, insertions pile up on a stack and inbound
//! chunks are buffered; [`resume`](ScriptableStream::resume) splices the
//! insertions in at the cursor and picks the loop back up.

use std::collections::VecDeque;

use crate::tokenization::{ChunkOutcome, ParseErrorHandler, TokenSink, Tokenizer};

/// What a [`ScriptableStream::write`] (or `resume`) accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The buffered input was tokenized completely; send more.
    NeedMoreInput,

    /// A script element finished; run it, optionally feed
    /// [`document_write`](ScriptableStream::document_write), then call
    /// [`resume`](ScriptableStream::resume).
    SuspendedForScript,

    /// The stream is over, either by end-of-file or because the tokenizer
    /// was stopped.
    Finished,
}

/// Contract violations. These are caller bugs and are never triggered by
/// the content of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// `resume` was called without a pending script suspension.
    #[error("the stream is not suspended for a script")]
    AlreadyResumed,

    /// `write` was called from within the parsing loop.
    #[error("write called while the parsing loop is running")]
    ReentrantWrite,

    /// `document_write` is only available while suspended for a script.
    #[error("document.write is only available while suspended for a script")]
    NotPausedByScript,

    /// More input arrived after the last chunk was already written.
    #[error("the input stream was already closed")]
    StreamClosed,
}

/// Incremental tokenization frontend with the `document.write` suspension
/// protocol.
pub struct ScriptableStream<S, E> {
    tokenizer: Tokenizer<S, E>,

    /// Pending `document.write` payloads, last write on top. Each one is
    /// spliced in right at the cursor, so draining the stack in reverse
    /// order of receipt reproduces the original call order in the stream.
    pending_insertions: Vec<String>,

    /// Chunks that arrived while suspended for a script.
    pending_chunks: VecDeque<(String, bool)>,

    paused_by_script: bool,

    /// When scripting is off, sink suspensions are overridden and parsing
    /// just continues.
    scripting: bool,
}

impl<S, E> ScriptableStream<S, E>
where
    S: TokenSink,
    E: ParseErrorHandler,
{
    #[must_use]
    pub fn new(sink: S, error_handler: E) -> Self {
        Self {
            tokenizer: Tokenizer::new(sink, error_handler),
            pending_insertions: Vec::new(),
            pending_chunks: VecDeque::new(),
            paused_by_script: false,
            scripting: false,
        }
    }

    /// Enables the script suspension protocol. Without it, the driver
    /// never pauses.
    pub fn set_scripting(&mut self, scripting: bool) {
        self.scripting = scripting;
    }

    /// Feeds a chunk and tokenizes as far as the input allows.
    ///
    /// While suspended for a script the chunk is buffered and picked up by
    /// [`resume`](Self::resume).
    pub fn write(&mut self, chunk: &str, is_last: bool) -> Result<WriteOutcome, UsageError> {
        if self.tokenizer.is_stopped() {
            return Ok(WriteOutcome::Finished);
        }

        if self.paused_by_script {
            self.pending_chunks.push_back((chunk.to_owned(), is_last));
            return Ok(WriteOutcome::SuspendedForScript);
        }

        self.tokenizer.write(chunk, is_last)?;
        Ok(self.run())
    }

    /// Queues HTML to be inserted at the current parse position, the way
    /// `document.write` does. Only legal while suspended for a script.
    pub fn document_write(&mut self, html: &str) -> Result<(), UsageError> {
        if !self.paused_by_script {
            return Err(UsageError::NotPausedByScript);
        }

        if !self.tokenizer.is_stopped() {
            self.pending_insertions.push(html.to_owned());
        }
        Ok(())
    }

    /// Ends a script suspension: splices all pending insertions in at the
    /// cursor and continues tokenizing.
    ///
    /// Fails with [`UsageError::AlreadyResumed`] when nothing is
    /// suspended.
    pub fn resume(&mut self) -> Result<WriteOutcome, UsageError> {
        if !self.paused_by_script {
            return Err(UsageError::AlreadyResumed);
        }
        self.paused_by_script = false;

        // Last write first; every insertion lands directly after the
        // cursor, so this puts the payloads in call order.
        while let Some(html) = self.pending_insertions.pop() {
            self.tokenizer.insert_html_at_current_pos(&html);
        }

        self.tokenizer.reactivate();
        let mut outcome = self.run();

        // Chunks that queued up during the suspension
        while !self.paused_by_script && !self.tokenizer.is_stopped() {
            let Some((chunk, is_last)) = self.pending_chunks.pop_front() else {
                break;
            };
            self.tokenizer.write(&chunk, is_last)?;
            outcome = self.run();
        }

        Ok(outcome)
    }

    /// Abandons the stream; subsequent writes are accepted and ignored.
    pub fn stop(&mut self) {
        self.tokenizer.stop();
    }

    #[must_use]
    pub fn is_suspended_for_script(&self) -> bool {
        self.paused_by_script
    }

    #[must_use]
    pub fn tokenizer(&self) -> &Tokenizer<S, E> {
        &self.tokenizer
    }

    pub fn tokenizer_mut(&mut self) -> &mut Tokenizer<S, E> {
        &mut self.tokenizer
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        self.tokenizer.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.tokenizer.sink_mut()
    }

    pub fn into_sink(self) -> S {
        self.tokenizer.into_sink()
    }

    fn run(&mut self) -> WriteOutcome {
        loop {
            match self.tokenizer.run_for_current_chunk() {
                ChunkOutcome::SuspendedBySink => {
                    if self.scripting {
                        log::debug!("suspending tokenization for script execution");
                        self.paused_by_script = true;
                        return WriteOutcome::SuspendedForScript;
                    }

                    // Nobody is listening for scripts; keep going
                    self.tokenizer.reactivate();
                },
                ChunkOutcome::EndOfChunk | ChunkOutcome::Paused => {
                    return WriteOutcome::NeedMoreInput;
                },
                ChunkOutcome::Stopped | ChunkOutcome::Finished => {
                    return WriteOutcome::Finished;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceSpan;
    use crate::tokenization::{
        CharacterToken, CollectParseErrors, SinkDirective, TagToken, Token, TokenizerState,
    };

    /// Minimal stand-in for a tree builder: switches to script data after
    /// `<script>` and suspends when the script element is done.
    #[derive(Default)]
    struct ScriptHost {
        tokens: Vec<Token>,
    }

    impl TokenSink for ScriptHost {
        fn on_character(&mut self, token: &CharacterToken) -> SinkDirective {
            self.tokens.push(Token::Character(token.clone()));
            SinkDirective::Continue
        }

        fn on_whitespace_character(&mut self, token: &CharacterToken) -> SinkDirective {
            self.tokens.push(Token::Character(token.clone()));
            SinkDirective::Continue
        }

        fn on_start_tag(&mut self, token: &mut TagToken) -> SinkDirective {
            let directive = if token.name == "script" {
                SinkDirective::SwitchTo(TokenizerState::ScriptData)
            } else {
                SinkDirective::Continue
            };
            self.tokens.push(Token::StartTag(token.clone()));
            directive
        }

        fn on_end_tag(&mut self, token: &mut TagToken) -> SinkDirective {
            let directive = if token.name == "script" {
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

    fn tag_names(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .filter_map(|token| match token {
                Token::StartTag(tag) => Some(tag.name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn document_write_precedes_remaining_input() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());
        stream.set_scripting(true);

        let outcome = stream
            .write("<script></script><b>", true)
            .expect("stream accepts writes");
        assert_eq!(outcome, WriteOutcome::SuspendedForScript);
        assert!(stream.is_suspended_for_script());

        stream.document_write("<i>").expect("suspended for script");
        let outcome = stream.resume().expect("suspended for script");
        assert_eq!(outcome, WriteOutcome::Finished);

        assert_eq!(tag_names(&stream.sink().tokens), vec!["script", "i", "b"]);
    }

    #[test]
    fn multiple_document_writes_keep_call_order() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());
        stream.set_scripting(true);

        stream
            .write("<script></script><b>", true)
            .expect("stream accepts writes");
        stream.document_write("<i>").expect("suspended");
        stream.document_write("<u>").expect("suspended");
        stream.resume().expect("suspended");

        assert_eq!(
            tag_names(&stream.sink().tokens),
            vec!["script", "i", "u", "b"]
        );
    }

    #[test]
    fn no_tokens_are_emitted_while_suspended() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());
        stream.set_scripting(true);

        stream
            .write("<script></script><b>x", true)
            .expect("stream accepts writes");
        let emitted = stream.sink().tokens.len();

        stream.document_write("<i>").expect("suspended");
        assert_eq!(stream.sink().tokens.len(), emitted);

        stream.resume().expect("suspended");
        assert!(stream.sink().tokens.len() > emitted);
    }

    #[test]
    fn chunks_written_during_suspension_are_deferred() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());
        stream.set_scripting(true);

        let outcome = stream
            .write("<script></script>", false)
            .expect("stream accepts writes");
        assert_eq!(outcome, WriteOutcome::SuspendedForScript);

        let outcome = stream.write("<b>", true).expect("buffered while suspended");
        assert_eq!(outcome, WriteOutcome::SuspendedForScript);

        stream.document_write("<i>").expect("suspended");
        let outcome = stream.resume().expect("suspended");
        assert_eq!(outcome, WriteOutcome::Finished);

        assert_eq!(tag_names(&stream.sink().tokens), vec!["script", "i", "b"]);
    }

    #[test]
    fn resume_without_suspension_fails() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());

        assert_eq!(stream.resume().unwrap_err(), UsageError::AlreadyResumed);
        assert_eq!(
            stream.document_write("<i>").unwrap_err(),
            UsageError::NotPausedByScript
        );
    }

    #[test]
    fn scripting_disabled_never_pauses() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());

        let outcome = stream
            .write("<script></script><b>", true)
            .expect("stream accepts writes");
        assert_eq!(outcome, WriteOutcome::Finished);
        assert_eq!(tag_names(&stream.sink().tokens), vec!["script", "b"]);
    }

    #[test]
    fn stop_makes_writes_no_ops() {
        let mut stream = ScriptableStream::new(ScriptHost::default(), CollectParseErrors::default());

        stream.write("<b>", false).expect("stream accepts writes");
        stream.stop();

        let before = stream.sink().tokens.len();
        assert_eq!(
            stream.write("<i>", true).expect("writes become no-ops"),
            WriteOutcome::Finished
        );
        assert_eq!(stream.sink().tokens.len(), before);
    }
}
