//! Source positions as seen by the input preprocessor.
//!
//! Offsets and columns are measured in UTF-16 code units so that locations
//! line up with what devtools-style consumers expect. Lines are 1-based,
//! columns 0-based.

use std::fmt;

/// A single point in the input stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePosition {
    /// 1-based line number
    pub line: u32,

    /// 0-based column, in UTF-16 code units from the start of the line
    pub column: u32,

    /// UTF-16 code-unit distance from the start of the stream
    pub offset: usize,
}

/// A half-open region of the input stream.
///
/// `end` points just past the last code unit that belongs to the region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourcePosition {
    #[must_use]
    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// A zero-width span at this position.
    #[must_use]
    pub const fn collapsed(self) -> SourceSpan {
        SourceSpan {
            start: self,
            end: self,
        }
    }
}

impl SourceSpan {
    #[must_use]
    pub const fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}
