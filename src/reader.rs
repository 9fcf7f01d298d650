use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::position::TextPosition;

/// The character returned at the end of every line.
pub const LINE_BREAK: char = '\n';

/// Save and restore points over some cursor, nestable as a stack.
pub trait Transactional {
    /// Push the current position.
    fn begin(&mut self);

    /// Pop the most recent position without moving the cursor.
    fn commit(&mut self) -> Result<()>;

    /// Pop the most recent position and move the cursor back to it.
    fn rollback(&mut self) -> Result<()>;
}

/// A character cursor that parsers read from.
pub trait Reader: Transactional {
    /// Read the next character, advancing the cursor.
    fn read_rune(&mut self) -> Result<char>;

    /// Position of the next character to be read.
    fn current_position(&self) -> TextPosition;

    /// All text from the cursor to the end of input, including the line
    /// breaks `read_rune` would produce.
    fn remaining(&self) -> Cow<'_, str>;
}

#[derive(Debug)]
struct Line {
    /// Byte offset of the line within the source.
    offset: usize,
    chars: Vec<char>,
}

/// A reader holding the whole input in memory, indexed by line.
///
/// Line terminators are dropped when the input is split, and a single
/// `LINE_BREAK` is produced after the content of every line, including the
/// last one when the input does not end with a line feed.
#[derive(Debug)]
pub struct InMemoryReader {
    source: String,
    lines: Vec<Line>,
    pos: TextPosition,
    stack: Vec<TextPosition>,
}

impl InMemoryReader {
    pub fn new<S: AsRef<str>>(input: S) -> Self {
        let input = input.as_ref();
        let mut lines = Vec::with_capacity(input.matches(LINE_BREAK).count() + 1);
        let mut offset = 0;
        for line in input.split_terminator(LINE_BREAK) {
            lines.push(Line {
                offset,
                chars: line.chars().collect(),
            });
            offset += line.len() + LINE_BREAK.len_utf8();
        }

        let mut source = input.to_owned();
        if !source.is_empty() && !source.ends_with(LINE_BREAK) {
            source.push(LINE_BREAK);
        }

        InMemoryReader {
            source,
            lines,
            pos: TextPosition::START,
            stack: Vec::new(),
        }
    }

    /// Create a reader from raw bytes. Invalid UTF-8 sequences are replaced
    /// with U+FFFD.
    pub fn from_bytes(buf: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(buf))
    }

    /// Number of currently open transactions.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn current_line(&self) -> Option<&Line> {
        if !self.pos.is_valid() {
            return None;
        }
        self.lines.get(self.pos.line - 1)
    }
}

impl Reader for InMemoryReader {
    fn read_rune(&mut self) -> Result<char> {
        let line = self.current_line().ok_or(Error::EndOfInput)?;
        let next = line.chars.get(self.pos.column - 1).copied();
        match next {
            Some(c) => {
                self.pos.column += 1;
                Ok(c)
            }
            None => {
                self.pos.line += 1;
                self.pos.column = 1;
                Ok(LINE_BREAK)
            }
        }
    }

    fn current_position(&self) -> TextPosition {
        self.pos
    }

    fn remaining(&self) -> Cow<'_, str> {
        let line = match self.current_line() {
            Some(line) => line,
            None => return Cow::Borrowed(""),
        };
        let read = (self.pos.column - 1).min(line.chars.len());
        let offset = line.offset + line.chars[..read].iter().map(|c| c.len_utf8()).sum::<usize>();
        Cow::Borrowed(&self.source[offset..])
    }
}

impl Transactional for InMemoryReader {
    fn begin(&mut self) {
        self.stack.push(self.pos);
    }

    fn commit(&mut self) -> Result<()> {
        self.stack.pop().ok_or(Error::NoActiveTransaction)?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.pos = self.stack.pop().ok_or(Error::NoActiveTransaction)?;
        Ok(())
    }
}
