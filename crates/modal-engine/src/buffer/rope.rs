use ropey::Rope;

use editor_types::prelude::*;

use super::{BufferError, TextBuffer};

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[derive(Clone, Debug)]
struct UndoStep {
    text: Rope,
    position: Position,
}

/// An in-memory [TextBuffer].
///
/// Undo groups are stored as snapshots of the rope taken before each group's first edit.
#[derive(Clone, Debug)]
pub struct RopeBuffer {
    rope: Rope,
    selections: Vec<Cursor>,
    undo: Vec<UndoStep>,
    redo: Vec<UndoStep>,
    group_open: bool,
}

impl RopeBuffer {
    /// Create a buffer holding `text`, with a single cursor at its start.
    pub fn new(text: &str) -> Self {
        RopeBuffer {
            rope: Rope::from_str(text),
            selections: vec![Cursor::default()],
            undo: Vec::new(),
            redo: Vec::new(),
            group_open: false,
        }
    }

    /// Replace the buffer's selections.
    pub fn with_selections(mut self, selections: Vec<Cursor>) -> Self {
        if !selections.is_empty() {
            self.selections = selections;
        }

        self
    }

    /// The number of undo groups that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    fn line_char_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();

        if len >= 2 && slice.char(len - 2) == '\r' && slice.char(len - 1) == '\n' {
            len - 2
        } else if len >= 1 && is_line_break(slice.char(len - 1)) {
            len - 1
        } else {
            len
        }
    }

    fn checked_offset(&self, pos: Position) -> Result<usize, BufferError> {
        if pos.line >= self.line_count() || pos.character > self.line_len(pos.line) {
            return Err(BufferError::InvalidPosition(pos.line, pos.character));
        }

        Ok(self.rope.line_to_char(pos.line) + pos.character)
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        RopeBuffer::new("")
    }
}

impl From<&str> for RopeBuffer {
    fn from(text: &str) -> Self {
        RopeBuffer::new(text)
    }
}

impl TextBuffer for RopeBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines().max(1)
    }

    fn line(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }

        let len = self.line_char_len(line);

        self.rope.line(line).slice(..len).to_string()
    }

    fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }

        self.line_char_len(line)
    }

    fn offset_at(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);

        self.rope.line_to_char(pos.line) + pos.character
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);

        Position::new(line, offset - self.rope.line_to_char(line))
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn text_in(&self, start: Position, end: Position) -> String {
        let (start, end) = (self.offset_at(start), self.offset_at(end));

        if start >= end {
            return String::new();
        }

        self.rope.slice(start..end).to_string()
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), BufferError> {
        let mut ranges = Vec::with_capacity(edits.len());

        for edit in edits {
            let (start, end) = edit.span();
            let (start, end) = (self.checked_offset(start)?, self.checked_offset(end)?);

            if start > end {
                return Err(BufferError::Rejected(format!("backwards edit {edit:?}")));
            }

            ranges.push((start, end, edit.text()));
        }

        if ranges.is_empty() {
            return Ok(());
        }

        if !self.group_open {
            let position = edits.iter().map(|e| e.span().0).min().unwrap_or_default();

            self.undo.push(UndoStep { text: self.rope.clone(), position });
            self.redo.clear();
            self.group_open = true;
        }

        // Apply from the end of the buffer backwards, so earlier offsets stay valid.
        ranges.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        for (start, end, text) in ranges {
            self.rope.remove(start..end);
            self.rope.insert(start, text);
        }

        Ok(())
    }

    fn selections(&self) -> Vec<Cursor> {
        self.selections.clone()
    }

    fn set_selections(&mut self, cursors: &[Cursor]) {
        self.selections = cursors.to_vec();
    }

    fn close_undo_group(&mut self) {
        self.group_open = false;
    }

    fn undo(&mut self) -> Result<Option<Position>, BufferError> {
        self.group_open = false;

        let Some(step) = self.undo.pop() else {
            return Ok(None);
        };

        let current = std::mem::replace(&mut self.rope, step.text);
        self.redo.push(UndoStep { text: current, position: step.position });

        Ok(Some(self.clamp(step.position)))
    }

    fn redo(&mut self) -> Result<Option<Position>, BufferError> {
        self.group_open = false;

        let Some(step) = self.redo.pop() else {
            return Ok(None);
        };

        let current = std::mem::replace(&mut self.rope, step.text);
        self.undo.push(UndoStep { text: current, position: step.position });

        Ok(Some(self.clamp(step.position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, character: usize) -> Position {
        Position::new(line, character)
    }

    #[test]
    fn test_lines() {
        let b = RopeBuffer::from("hello\nworld\r\n\nend");

        assert_eq!(b.line_count(), 4);
        assert_eq!(b.line(0), "hello");
        assert_eq!(b.line(1), "world");
        assert_eq!(b.line_len(1), 5);
        assert_eq!(b.line(2), "");
        assert_eq!(b.line(3), "end");
        assert_eq!(b.line(9), "");
        assert_eq!(b.end(), pos(3, 3));
        assert_eq!(b.first_non_blank(0), 0);

        let empty = RopeBuffer::default();
        assert_eq!(empty.line_count(), 1);
        assert_eq!(empty.line_len(0), 0);
        assert_eq!(empty.contents(), "");
    }

    #[test]
    fn test_offsets() {
        let b = RopeBuffer::from("ab\ncd");

        assert_eq!(b.offset_at(pos(1, 1)), 4);
        assert_eq!(b.offset_at(pos(0, 10)), 2);
        assert_eq!(b.position_at(3), pos(1, 0));
        assert_eq!(b.position_at(100), pos(1, 2));
        assert_eq!(b.right_through_line_breaks(pos(0, 2)), pos(1, 0));
        assert_eq!(b.left_through_line_breaks(pos(1, 0)), pos(0, 2));
        assert_eq!(b.text_in(pos(0, 1), pos(1, 1)), "b\nc");
        assert_eq!(b.char_at(pos(1, 1)), Some('d'));
        assert_eq!(b.char_at(pos(1, 2)), None);
    }

    #[test]
    fn test_apply_edits_pre_edit_coordinates() {
        let mut b = RopeBuffer::from("aa\nbb");
        let edits = vec![
            TextEdit::Delete { start: pos(0, 0), end: pos(0, 1) },
            TextEdit::Insert { position: pos(1, 2), text: "!".into() },
            TextEdit::Replace { start: pos(1, 0), end: pos(1, 1), text: "BB".into() },
        ];

        b.apply_edits(&edits).unwrap();
        assert_eq!(b.contents(), "a\nBBb!");
    }

    #[test]
    fn test_apply_edits_invalid() {
        let mut b = RopeBuffer::from("aa");
        let edits = vec![TextEdit::Delete { start: pos(0, 0), end: pos(0, 5) }];

        assert_eq!(b.apply_edits(&edits), Err(BufferError::InvalidPosition(0, 5)));
        assert_eq!(b.contents(), "aa");
        assert_eq!(b.undo_depth(), 0);
    }

    #[test]
    fn test_undo_groups() {
        let mut b = RopeBuffer::from("");

        b.apply_edits(&[TextEdit::Insert { position: pos(0, 0), text: "a".into() }]).unwrap();
        b.apply_edits(&[TextEdit::Insert { position: pos(0, 1), text: "b".into() }]).unwrap();
        b.close_undo_group();
        b.apply_edits(&[TextEdit::Insert { position: pos(0, 2), text: "c".into() }]).unwrap();
        assert_eq!(b.contents(), "abc");
        assert_eq!(b.undo_depth(), 2);

        assert_eq!(b.undo().unwrap(), Some(pos(0, 2)));
        assert_eq!(b.contents(), "ab");
        assert_eq!(b.undo().unwrap(), Some(pos(0, 0)));
        assert_eq!(b.contents(), "");
        assert_eq!(b.undo().unwrap(), None);

        assert_eq!(b.redo().unwrap(), Some(pos(0, 0)));
        assert_eq!(b.contents(), "ab");
        assert_eq!(b.redo().unwrap(), Some(pos(0, 2)));
        assert_eq!(b.contents(), "abc");
        assert_eq!(b.redo().unwrap(), None);
    }
}
