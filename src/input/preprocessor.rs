//! The [input stream preprocessor](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream).
//!
//! Owns the growing text buffer that chunks are written into and hands out
//! one code point at a time to the tokenizer. Newline normalization
//! (CR → LF, CRLF collapsed) and surrogate-pair combination happen here, so
//! the state machine above never sees a carriage return or a bare surrogate.
//!
//! Positions the cursor steps over without yielding a code point (the CR of
//! a collapsed CRLF, the trailing half of a surrogate pair) are recorded as
//! *gaps*. Gaps are what keep column arithmetic and [`retreat`] exact even
//! though the buffer is indexed in UTF-16 code units.
//!
//! [`retreat`]: Preprocessor::retreat

use crate::{
    infra,
    location::{SourcePosition, SourceSpan},
    tokenization::{HtmlParseError, ParseErrorHandler, ParserError},
};

const CARRIAGE_RETURN: u16 = 0x0D;
const LINE_FEED: u16 = 0x0A;

/// The buffer prefix is only truncated once the cursor has moved past this
/// many code units.
pub const DEFAULT_BUFFER_WATERLINE: usize = 1 << 16;

/// Streaming text buffer with a reversible, location-tracking cursor.
#[derive(Debug)]
pub struct Preprocessor<E> {
    /// Buffered source text, as UTF-16 code units.
    html: Vec<u16>,

    /// Index of the current (most recently consumed) code unit.
    ///
    /// `-1` before the first character has been consumed.
    pos: isize,

    /// Index of the first code unit of the current line.
    ///
    /// May go negative after buffer compaction; only the difference to
    /// `pos` matters.
    line_start_pos: isize,

    /// 1-based line of the current character.
    line: u32,

    /// Previously recorded gap positions, innermost last.
    gap_stack: Vec<isize>,

    /// The most recently recorded gap position, `-2` if none.
    last_gap_pos: isize,

    /// Code units already discarded by [`Self::drop_parsed_chunk`].
    dropped_buffer_size: usize,

    /// Set once the producer has signalled end-of-stream.
    last_chunk_written: bool,

    /// Set when a read ran out of buffered data before end-of-stream.
    end_of_chunk_hit: bool,

    buffer_waterline: usize,

    /// The next LF is the second half of a CRLF pair and must be skipped.
    skip_next_new_line: bool,

    /// The current character ends a line; the line counter moves on the
    /// next `advance`.
    is_eol: bool,

    /// Offset of the last reported input-stream error, for deduplication.
    last_error_offset: Option<usize>,

    error_handler: E,
}

impl<E> Preprocessor<E>
where
    E: ParseErrorHandler,
{
    #[must_use]
    pub fn new(error_handler: E) -> Self {
        Self {
            html: Vec::new(),
            pos: -1,
            line_start_pos: 0,
            line: 1,
            gap_stack: Vec::new(),
            last_gap_pos: -2,
            dropped_buffer_size: 0,
            last_chunk_written: false,
            end_of_chunk_hit: false,
            buffer_waterline: DEFAULT_BUFFER_WATERLINE,
            skip_next_new_line: false,
            is_eol: false,
            last_error_offset: None,
            error_handler,
        }
    }

    /// Appends a chunk of source text.
    pub fn write(&mut self, chunk: &str, is_last: bool) {
        self.html.extend(chunk.encode_utf16());
        self.last_chunk_written = self.last_chunk_written || is_last;
        self.end_of_chunk_hit = false;
    }

    /// Appends a chunk that is already UTF-16 encoded.
    ///
    /// Unlike [`write`](Self::write) this can carry unpaired surrogates and
    /// pairs torn across chunk boundaries, the way JS-originated streams
    /// deliver them.
    pub fn write_utf16(&mut self, chunk: &[u16], is_last: bool) {
        self.html.extend_from_slice(chunk);
        self.last_chunk_written = self.last_chunk_written || is_last;
        self.end_of_chunk_hit = false;
    }

    /// Splices `chunk` into the stream immediately after the current
    /// character, so it is the very next text the cursor will see.
    pub fn insert_html_at_current_pos(&mut self, chunk: &str) {
        let insert_at = usize::try_from(self.pos + 1).expect("cursor is at -1 or later");
        let units: Vec<u16> = chunk.encode_utf16().collect();
        self.html.splice(insert_at..insert_at, units);
        self.end_of_chunk_hit = false;
    }

    #[must_use]
    pub fn end_of_chunk_hit(&self) -> bool {
        self.end_of_chunk_hit
    }

    #[must_use]
    pub fn last_chunk_written(&self) -> bool {
        self.last_chunk_written
    }

    /// Consumes and returns the next code point.
    ///
    /// `None` means there is nothing (more) to read. If
    /// [`end_of_chunk_hit`](Self::end_of_chunk_hit) is set afterwards, the
    /// stream merely ran dry and the caller should retreat and wait for the
    /// next chunk; otherwise this is the real end of input.
    pub fn advance(&mut self) -> Option<char> {
        self.pos += 1;

        // The LF sits in the last column of its line, so the line counter
        // only moves on the character after it.
        if self.is_eol {
            self.is_eol = false;
            self.line += 1;
            self.line_start_pos = self.pos;
        }

        if self.pos as usize >= self.html.len() {
            self.end_of_chunk_hit = !self.last_chunk_written;
            return None;
        }

        let unit = self.html[self.pos as usize];

        if unit == CARRIAGE_RETURN {
            self.is_eol = true;
            self.skip_next_new_line = true;
            return Some('\n');
        }

        if unit == LINE_FEED {
            self.is_eol = true;

            if self.skip_next_new_line {
                self.line -= 1;
                self.skip_next_new_line = false;
                self.add_gap();
                return self.advance();
            }
        }

        self.skip_next_new_line = false;

        let code_point = if infra::is_surrogate(unit) {
            self.process_surrogate(unit)?
        } else {
            u32::from(unit)
        };

        if E::REPORTS_ERRORS {
            self.check_problematic_character(code_point);
        }

        Some(char::from_u32(code_point).expect("surrogates were filtered out"))
    }

    /// Combines a surrogate pair into its code point, recording a gap at
    /// the trailing half.
    ///
    /// A leading surrogate that is the last buffered unit of a non-final
    /// chunk reports end-of-chunk instead, so a pair split across chunks is
    /// never torn apart.
    fn process_surrogate(&mut self, unit: u16) -> Option<u32> {
        if self.pos as usize != self.html.len() - 1 {
            let next = self.html[self.pos as usize + 1];

            if infra::is_leading_surrogate(unit) && infra::is_trailing_surrogate(next) {
                self.pos += 1;
                self.add_gap();

                let code_point = 0x10000
                    + ((u32::from(unit) - 0xD800) << 10)
                    + (u32::from(next) - 0xDC00);
                return Some(code_point);
            }
        } else if !self.last_chunk_written {
            self.end_of_chunk_hit = true;
            return None;
        }

        // A lone surrogate cannot travel in a Rust string, so it degrades
        // to the replacement character after being reported.
        self.error_for_current_unit(HtmlParseError::SurrogateInInputStream);
        Some(0xFFFD)
    }

    fn check_problematic_character(&mut self, code_point: u32) {
        // Common valid range, checked first so ordinary text skips the
        // detailed classification.
        if (0x20..0x7F).contains(&code_point)
            || code_point == u32::from(LINE_FEED)
            || (0xA0..0xFDD0).contains(&code_point)
        {
            return;
        }

        if infra::is_problematic_control(code_point) {
            self.error_for_current_unit(HtmlParseError::ControlCharacterInInputStream);
        } else if infra::is_noncharacter(code_point) {
            self.error_for_current_unit(HtmlParseError::NoncharacterInInputStream);
        }
    }

    fn add_gap(&mut self) {
        self.gap_stack.push(self.last_gap_pos);
        self.last_gap_pos = self.pos;
    }

    /// Moves the cursor back over the last `count` consumed code points,
    /// stepping over recorded gaps.
    pub fn retreat(&mut self, count: usize) {
        self.pos -= count as isize;

        while self.pos < self.last_gap_pos {
            self.last_gap_pos = self.gap_stack.pop().expect("one stack entry per gap");
            self.pos -= 1;
        }

        self.is_eol = false;
    }

    /// Looks ahead `offset` code units past the current character without
    /// moving the cursor. CR reads as LF; reading past the buffered end of
    /// a non-final chunk flags end-of-chunk.
    pub fn peek(&mut self, offset: usize) -> Option<char> {
        let Ok(pos) = usize::try_from(self.pos + offset as isize) else {
            return None;
        };

        if pos >= self.html.len() {
            self.end_of_chunk_hit = !self.last_chunk_written;
            return None;
        }

        let unit = self.html[pos];

        if unit == CARRIAGE_RETURN {
            return Some('\n');
        }

        if infra::is_surrogate(unit) {
            return Some('\u{FFFD}');
        }

        Some(char::from_u32(u32::from(unit)).expect("surrogates were filtered out"))
    }

    /// Buffered look-ahead starting at the current character.
    ///
    /// Returns `false` without consuming anything on a mismatch, and also
    /// when the remaining buffer is shorter than `pattern` on a non-final
    /// chunk (flagging end-of-chunk so the caller can suspend).
    pub fn starts_with(&mut self, pattern: &str, case_sensitive: bool) -> bool {
        let start = self.pos.max(0) as usize;
        let pattern_len = pattern.encode_utf16().count();

        if start + pattern_len > self.html.len() {
            self.end_of_chunk_hit = !self.last_chunk_written;
            return false;
        }

        pattern
            .encode_utf16()
            .zip(self.html[start..].iter().copied())
            .all(|(expected, actual)| {
                if case_sensitive {
                    expected == actual
                } else {
                    (expected | 0x20) == (actual | 0x20)
                }
            })
    }

    /// Discards the consumed buffer prefix once it has grown past the
    /// waterline. Absolute offsets, line and column are unaffected.
    ///
    /// Only sound between tokens, when nothing will retreat over the
    /// dropped range; the tokenizer upholds that.
    pub fn drop_parsed_chunk(&mut self) {
        if self.pos > self.buffer_waterline as isize {
            let dropped = self.pos as usize;

            self.html.drain(..dropped);
            self.line_start_pos -= self.pos;
            self.dropped_buffer_size += dropped;
            self.pos = 0;
            self.last_gap_pos = -2;
            self.gap_stack.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn set_buffer_waterline(&mut self, waterline: usize) {
        self.buffer_waterline = waterline;
    }

    /// UTF-16 code-unit offset of the current character from the start of
    /// the stream.
    #[must_use]
    pub fn offset(&self) -> usize {
        let pos = self.pos.min(self.html.len() as isize).max(0);
        self.dropped_buffer_size + pos as usize
    }

    /// 0-based column of the current character.
    #[must_use]
    pub fn column(&self) -> u32 {
        let on_gap: isize = if self.last_gap_pos == self.pos { 1 } else { 0 };
        (self.pos - self.line_start_pos - on_gap).max(0) as u32
    }

    /// Position of the current (most recently consumed) character.
    #[must_use]
    pub fn position(&self) -> SourcePosition {
        let start_unit = if self.last_gap_pos == self.pos {
            // Current character is a surrogate pair; it starts one unit
            // before the cursor.
            self.offset().saturating_sub(1)
        } else {
            self.offset()
        };

        SourcePosition::new(self.line, self.column(), start_unit)
    }

    /// Position just past the current character, clamped to the end of
    /// the input.
    #[must_use]
    pub fn position_just_after(&self) -> SourcePosition {
        let pos = (self.pos + 1).min(self.html.len() as isize);
        let column = (pos - self.line_start_pos).max(0) as u32;
        let offset = self.dropped_buffer_size + pos.max(0) as usize;
        SourcePosition::new(self.line, column, offset)
    }

    /// Position `count` code units before the current character, on the
    /// same line. Used to backdate token starts over short ASCII prefixes
    /// such as `<!--`.
    #[must_use]
    pub fn position_back(&self, count: u32) -> SourcePosition {
        let position = self.position();
        SourcePosition::new(
            position.line,
            position.column.saturating_sub(count),
            position.offset.saturating_sub(count as usize),
        )
    }

    /// Builds a parser error spanning the current character.
    #[must_use]
    pub fn error_here(&self, code: HtmlParseError) -> ParserError {
        ParserError {
            code,
            span: SourceSpan::new(self.position(), self.position_just_after()),
        }
    }

    /// Reports a tokenizer-level parse error at the current position.
    pub fn report(&mut self, code: HtmlParseError) {
        let error = self.error_here(code);
        self.error_handler.handle(error);
    }

    /// Reports an input-stream error, deduplicated by offset so that
    /// retreat/re-advance over the same character never double-fires.
    fn error_for_current_unit(&mut self, code: HtmlParseError) {
        if !E::REPORTS_ERRORS {
            return;
        }

        let offset = self.offset();
        if self.last_error_offset == Some(offset) {
            return;
        }
        self.last_error_offset = Some(offset);

        let error = self.error_here(code);
        self.error_handler.handle(error);
    }

    /// Position of end-of-input, just past the last character.
    #[must_use]
    pub fn position_of_eof(&self) -> SourcePosition {
        let pos = self.pos.min(self.html.len() as isize);
        let column = (pos - self.line_start_pos).max(0) as u32;
        SourcePosition::new(self.line, column, self.dropped_buffer_size + pos.max(0) as usize)
    }

    pub fn error_handler_mut(&mut self) -> &mut E {
        &mut self.error_handler
    }

    pub fn into_error_handler(self) -> E {
        self.error_handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenization::{CollectParseErrors, IgnoreParseErrors};

    fn preprocessor(input: &str) -> Preprocessor<IgnoreParseErrors> {
        let mut preprocessor = Preprocessor::new(IgnoreParseErrors);
        preprocessor.write(input, true);
        preprocessor
    }

    #[test]
    fn newline_normalization() {
        let mut input = preprocessor("a\r\nb\rc\nd");

        let mut seen = String::new();
        while let Some(c) = input.advance() {
            seen.push(c);
        }

        assert_eq!(seen, "a\nb\nc\nd");
    }

    #[test]
    fn line_and_column_tracking() {
        let mut input = preprocessor("a\r\nb\rc\nd");

        let mut positions = Vec::new();
        while let Some(c) = input.advance() {
            positions.push((c, input.position().line, input.position().column));
        }

        assert_eq!(
            positions,
            vec![
                ('a', 1, 0),
                ('\n', 1, 1),
                ('b', 2, 0),
                ('\n', 2, 1),
                ('c', 3, 0),
                ('\n', 3, 1),
                ('d', 4, 0),
            ]
        );
    }

    #[test]
    fn surrogate_pairs_combine_and_keep_offsets() {
        let mut input = preprocessor("a💚b");

        assert_eq!(input.advance(), Some('a'));
        assert_eq!(input.position().offset, 0);

        assert_eq!(input.advance(), Some('💚'));
        assert_eq!(input.position().offset, 1);
        assert_eq!(input.position().column, 1);

        assert_eq!(input.advance(), Some('b'));
        assert_eq!(input.position().offset, 3);
        assert_eq!(input.position().column, 3);
    }

    #[test]
    fn end_of_chunk_vs_end_of_stream() {
        let mut input = Preprocessor::new(IgnoreParseErrors);
        input.write("ab", false);

        assert_eq!(input.advance(), Some('a'));
        assert_eq!(input.advance(), Some('b'));
        assert_eq!(input.advance(), None);
        assert!(input.end_of_chunk_hit());

        input.retreat(1);
        input.write("c", true);
        assert!(!input.end_of_chunk_hit());

        assert_eq!(input.advance(), Some('c'));
        assert_eq!(input.advance(), None);
        assert!(!input.end_of_chunk_hit());
    }

    #[test]
    fn split_surrogate_pair_waits_for_the_next_chunk() {
        let mut input = Preprocessor::new(IgnoreParseErrors);
        let units: Vec<u16> = "a💚".encode_utf16().collect();

        input.write_utf16(&units[..2], false);

        assert_eq!(input.advance(), Some('a'));
        // The leading surrogate is buffered but must not be torn apart
        assert_eq!(input.advance(), None);
        assert!(input.end_of_chunk_hit());

        input.retreat(1);
        input.write_utf16(&units[2..], true);
        assert_eq!(input.advance(), Some('💚'));
        assert_eq!(input.position().offset, 1);
    }

    #[test]
    fn lone_surrogate_is_reported_and_replaced() {
        let mut input = Preprocessor::new(CollectParseErrors::default());
        input.write_utf16(&[u16::from(b'a'), 0xD800, u16::from(b'b')], true);

        assert_eq!(input.advance(), Some('a'));
        assert_eq!(input.advance(), Some('\u{FFFD}'));
        assert_eq!(input.advance(), Some('b'));

        let errors = &input.error_handler_mut().errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::SurrogateInInputStream);
        assert_eq!(errors[0].span.start.offset, 1);
    }

    #[test]
    fn retreat_round_trip() {
        let mut input = preprocessor("ab💚\r\ncd");

        let mut first_pass = Vec::new();
        for _ in 0..4 {
            let c = input.advance().expect("enough input");
            first_pass.push((c, input.position()));
        }

        input.retreat(4);

        let mut second_pass = Vec::new();
        for _ in 0..4 {
            let c = input.advance().expect("enough input");
            second_pass.push((c, input.position()));
        }

        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn starts_with_sets_end_of_chunk_when_short() {
        let mut input = Preprocessor::new(IgnoreParseErrors);
        input.write("<!DO", false);

        assert_eq!(input.advance(), Some('<'));
        assert!(!input.starts_with("<!DOCTYPE", true));
        assert!(input.end_of_chunk_hit());

        input.write("CTYPE html>", true);
        assert!(input.starts_with("<!doctype", false));
        assert!(input.starts_with("<!DOCTYPE", true));
        assert!(!input.starts_with("<!DOCTYPF", true));
    }

    #[test]
    fn drop_parsed_chunk_keeps_absolute_positions() {
        let mut input = preprocessor("abcdef\nghi");
        input.set_buffer_waterline(2);

        for _ in 0..8 {
            input.advance();
        }
        let before = input.position();

        input.drop_parsed_chunk();
        assert_eq!(input.position(), before);

        input.advance();
        assert_eq!(input.position().line, 2);
        assert_eq!(input.position().column, 1);
        assert_eq!(input.position().offset, 8);
    }

    #[test]
    fn insert_html_at_current_pos_is_read_next() {
        let mut input = preprocessor("ab");

        assert_eq!(input.advance(), Some('a'));
        input.insert_html_at_current_pos("XY");

        assert_eq!(input.advance(), Some('X'));
        assert_eq!(input.advance(), Some('Y'));
        assert_eq!(input.advance(), Some('b'));
    }

    #[test]
    fn input_stream_errors_deduplicate_by_offset() {
        let mut input = Preprocessor::new(CollectParseErrors::default());
        input.write("a\u{0001}b", true);

        input.advance();
        input.advance();
        input.retreat(1);
        input.advance();
        input.advance();

        let errors = &input.error_handler_mut().errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseError::ControlCharacterInInputStream);
        assert_eq!(errors[0].span.start.offset, 1);
    }
}
