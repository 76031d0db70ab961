//! # Buffer positions
//!
//! ## Overview
//!
//! A [Position] is a zero-indexed line and a character offset within that line. Positions are
//! ordered by line, then by character, which is the document order used when iterating over
//! cursors.
//!
//! A [PositionDiff] describes how a caret should move once an edit has been applied, and is
//! accumulated per cursor by the engine's batch editor.

/// A location within a buffer.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position {
    /// Zero-indexed line number.
    pub line: usize,

    /// Zero-indexed character offset within the line.
    pub character: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, character: usize) -> Self {
        Position { line, character }
    }

    /// Copy this position onto a different line.
    pub fn with_line(self, line: usize) -> Self {
        Position { line, ..self }
    }

    /// Copy this position onto a different column.
    pub fn with_character(self, character: usize) -> Self {
        Position { character, ..self }
    }

    /// Shift this position by a [PositionDiff].
    ///
    /// Offsets saturate at zero.
    pub fn apply(self, diff: &PositionDiff) -> Position {
        match diff {
            PositionDiff::Offset { line, character } => {
                Position::new(shift(self.line, *line), shift(self.character, *character))
            },
            PositionDiff::Exact { line, character } => {
                Position::new(shift(self.line, *line), *character)
            },
        }
    }
}

/// An adjustment applied to a caret after the edit it was attached to has landed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PositionDiff {
    /// Move the caret by a relative number of lines and characters.
    Offset {
        /// Lines to move down (or up, when negative).
        line: isize,

        /// Characters to move right (or left, when negative).
        character: isize,
    },

    /// Move the caret by a relative number of lines, and then to an exact column.
    Exact {
        /// Lines to move down (or up, when negative).
        line: isize,

        /// The column to place the caret at.
        character: usize,
    },
}

impl PositionDiff {
    /// A diff that moves the caret horizontally.
    pub fn characters(character: isize) -> Self {
        PositionDiff::Offset { line: 0, character }
    }

    /// A diff that moves the caret to the start of a following line.
    pub fn next_line(line: isize) -> Self {
        PositionDiff::Exact { line, character: 0 }
    }

    /// Whether applying this diff leaves every position where it was.
    pub fn is_identity(&self) -> bool {
        matches!(self, PositionDiff::Offset { line: 0, character: 0 })
    }
}

impl Default for PositionDiff {
    fn default() -> Self {
        PositionDiff::Offset { line: 0, character: 0 }
    }
}

fn shift(base: usize, amount: isize) -> usize {
    if amount < 0 {
        base.saturating_sub(amount.unsigned_abs())
    } else {
        base.saturating_add(amount.unsigned_abs())
    }
}
