use std::fmt::{self, Display};

/// A line and column within some text. Both are 1-based, so the zero value
/// does not point anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    /// The invalid zero position.
    pub const ZERO: TextPosition = TextPosition { line: 0, column: 0 };

    /// The start position of any text.
    pub const START: TextPosition = TextPosition { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        TextPosition { line, column }
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}

impl Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A region of text. `end` is the position right after the last consumed
/// character, so a zero-width range has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        TextRange { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this range contains the entirety of the other range.
    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

impl Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}
