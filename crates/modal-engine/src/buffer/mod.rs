//! # Host buffer
//!
//! ## Overview
//!
//! The engine reads and edits text through the [TextBuffer] trait, which a host implements over
//! its own document storage. Every batch of edits handed to [TextBuffer::apply_edits] is
//! addressed in the coordinates of the text before any of the batch was applied, and must be
//! applied atomically.
//!
//! [RopeBuffer] is an in-memory implementation backed by a rope, suitable for tests and for hosts
//! without a document model of their own.
use editor_types::prelude::*;

mod rope;

pub use self::rope::RopeBuffer;

/// Errors raised by a [TextBuffer].
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum BufferError {
    /// A position lies outside of the buffer.
    #[error("Invalid buffer position: line {0}, character {1}")]
    InvalidPosition(usize, usize),

    /// The host refused to apply an edit.
    #[error("Edit rejected: {0}")]
    Rejected(String),
}

/// Access to the text being edited.
pub trait TextBuffer {
    /// The number of lines in the buffer. Always at least one.
    fn line_count(&self) -> usize;

    /// The contents of a line, without its line terminator.
    fn line(&self, line: usize) -> String;

    /// The number of characters in a line, excluding its line terminator.
    fn line_len(&self, line: usize) -> usize;

    /// The character offset of a position from the start of the buffer.
    ///
    /// Positions past the end of a line are clamped to the end of that line.
    fn offset_at(&self, pos: Position) -> usize;

    /// The position of a character offset.
    fn position_at(&self, offset: usize) -> Position;

    /// The number of characters in the buffer.
    fn len_chars(&self) -> usize;

    /// The text in `[start, end)`.
    fn text_in(&self, start: Position, end: Position) -> String;

    /// Apply a batch of edits atomically.
    ///
    /// All positions refer to the text before the batch, and the edits do not overlap.
    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), BufferError>;

    /// The host's current selections.
    fn selections(&self) -> Vec<Cursor>;

    /// Show the engine's cursors in the host's view.
    fn set_selections(&mut self, cursors: &[Cursor]);

    /// End the current undo group, so that later edits are undone separately.
    fn close_undo_group(&mut self);

    /// Undo the most recent undo group, returning where the change happened.
    fn undo(&mut self) -> Result<Option<Position>, BufferError>;

    /// Redo the most recently undone group, returning where the change happened.
    fn redo(&mut self) -> Result<Option<Position>, BufferError>;

    /// The index of the last line.
    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// The character at a position, or `None` at the end of a line.
    fn char_at(&self, pos: Position) -> Option<char> {
        if pos.line >= self.line_count() {
            return None;
        }

        self.line(pos.line).chars().nth(pos.character)
    }

    /// The position just past the last character of the buffer.
    fn end(&self) -> Position {
        let last = self.last_line();

        Position::new(last, self.line_len(last))
    }

    /// Clamp a position into the buffer.
    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());

        Position::new(line, pos.character.min(self.line_len(line)))
    }

    /// The column of the first non-blank character of a line.
    fn first_non_blank(&self, line: usize) -> usize {
        let text = self.line(line);
        let blank = text.chars().take_while(|c| c.is_whitespace()).count();

        return blank.min(text.chars().count());
    }

    /// The position one character to the right, crossing line breaks.
    fn right_through_line_breaks(&self, pos: Position) -> Position {
        let offset = self.offset_at(pos);

        if offset >= self.len_chars() {
            return self.end();
        }

        self.position_at(offset + 1)
    }

    /// The position one character to the left, crossing line breaks.
    fn left_through_line_breaks(&self, pos: Position) -> Position {
        let offset = self.offset_at(pos);

        self.position_at(offset.saturating_sub(1))
    }

    /// The whole contents of the buffer.
    fn contents(&self) -> String {
        self.text_in(Position::default(), self.end())
    }
}
