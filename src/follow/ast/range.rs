//! Position and range tracking for block source text
//!
//! Every token, node and edit carries a [`Range`] whose endpoints are [`Position`] triples:
//! a zero-based line, a zero-based character column (counted in Unicode scalar values,
//! which is what the editor surface reports for its caret), and a byte offset into the
//! block text. The three coordinates are always derived together by [`SourceLocation`],
//! so they cannot drift apart.
//!
//! Byte offsets are what edits splice against; line/character pairs are what the host
//! matches the caret against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range as ByteRange;

/// A point in the block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, character: usize, offset: usize) -> Self {
        Self {
            line,
            character,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// A half-open span of block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty range sitting at `position`, used for insertions.
    pub fn empty(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Byte span of this range.
    pub fn span(&self) -> ByteRange<usize> {
        self.start.offset..self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Inclusive on both ends, matching how a caret sitting right after a token still
    /// counts as touching it.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset <= self.end.offset
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Converts byte offsets into full [`Position`] triples.
pub struct SourceLocation<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceLocation<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to the end of the
    /// text; offsets inside a multi-byte character snap back to its first byte.
    pub fn position(&self, byte_offset: usize) -> Position {
        let mut offset = byte_offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = self.source[line_start..offset].chars().count();
        Position::new(line, character, offset)
    }

    pub fn range(&self, span: &ByteRange<usize>) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset for the start of a line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}
