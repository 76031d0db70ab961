//! # Text edits
//!
//! ## Overview
//!
//! Operators and commands never touch the buffer directly. They describe what they want to change
//! as [TextTransformation] values, each tagged with the index of the cursor that produced it and,
//! optionally, a [PositionDiff] to apply to that cursor once the edit has landed. The engine then
//! applies every transformation produced by a keystroke as a single batch.
use serde::{Deserialize, Serialize};

use crate::position::{Position, PositionDiff};

/// How a range of text should be interpreted.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetShape {
    /// The range runs from one character to another.
    #[default]
    CharWise,

    /// The range covers whole lines.
    LineWise,

    /// The range covers the same columns on each line.
    BlockWise,
}

/// The kind of a [TextEdit].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EditKind {
    /// Text is added.
    Insert,

    /// Text is removed.
    Delete,

    /// Text is removed and new text takes its place.
    Replace,
}

/// A single change to the buffer, addressed in pre-edit coordinates.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TextEdit {
    /// Insert `text` at `position`.
    Insert {
        /// Where the text goes.
        position: Position,

        /// The text to insert.
        text: String,
    },

    /// Remove the text in `[start, end)`.
    Delete {
        /// First removed position.
        start: Position,

        /// Position after the last removed character.
        end: Position,
    },

    /// Replace the text in `[start, end)` with `text`.
    Replace {
        /// First replaced position.
        start: Position,

        /// Position after the last replaced character.
        end: Position,

        /// The replacement text.
        text: String,
    },
}

impl TextEdit {
    /// The kind of this edit.
    pub fn kind(&self) -> EditKind {
        match self {
            TextEdit::Insert { .. } => EditKind::Insert,
            TextEdit::Delete { .. } => EditKind::Delete,
            TextEdit::Replace { .. } => EditKind::Replace,
        }
    }

    /// The half-open span of existing text this edit touches.
    pub fn span(&self) -> (Position, Position) {
        match self {
            TextEdit::Insert { position, .. } => (*position, *position),
            TextEdit::Delete { start, end } => (*start, *end),
            TextEdit::Replace { start, end, .. } => (*start, *end),
        }
    }

    /// The text this edit adds.
    pub fn text(&self) -> &str {
        match self {
            TextEdit::Insert { text, .. } => text.as_str(),
            TextEdit::Delete { .. } => "",
            TextEdit::Replace { text, .. } => text.as_str(),
        }
    }

    /// Copy this edit with a new span, keeping its text.
    pub fn with_span(&self, start: Position, end: Position) -> TextEdit {
        match self {
            TextEdit::Insert { text, .. } => TextEdit::Insert { position: start, text: text.clone() },
            TextEdit::Delete { .. } => TextEdit::Delete { start, end },
            TextEdit::Replace { text, .. } => TextEdit::Replace { start, end, text: text.clone() },
        }
    }
}

/// An edit produced by an operator or a command, together with its caret bookkeeping.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TextTransformation {
    /// The change to make.
    pub edit: TextEdit,

    /// How to move the originating cursor once the edit lands.
    pub diff: Option<PositionDiff>,

    /// The index of the cursor that produced this edit.
    pub cursor_index: Option<usize>,
}

impl TextTransformation {
    /// Wrap a [TextEdit].
    pub fn new(edit: TextEdit) -> Self {
        TextTransformation { edit, diff: None, cursor_index: None }
    }

    /// Insert text at a position.
    pub fn insert<T: Into<String>>(position: Position, text: T) -> Self {
        Self::new(TextEdit::Insert { position, text: text.into() })
    }

    /// Delete the text in `[start, end)`.
    pub fn delete(start: Position, end: Position) -> Self {
        Self::new(TextEdit::Delete { start, end })
    }

    /// Replace the text in `[start, end)`.
    pub fn replace<T: Into<String>>(start: Position, end: Position, text: T) -> Self {
        Self::new(TextEdit::Replace { start, end, text: text.into() })
    }

    /// Attach a caret adjustment.
    pub fn with_diff(mut self, diff: PositionDiff) -> Self {
        self.diff = Some(diff);
        self
    }

    /// Tag this transformation with the cursor that produced it.
    pub fn with_cursor(mut self, index: usize) -> Self {
        self.cursor_index = Some(index);
        self
    }

    /// Whether this transformation and `other` touch the same text.
    ///
    /// Spans that merely touch do not overlap, but two spans beginning at the same position
    /// always do, since their relative order would be ambiguous.
    pub fn overlaps(&self, other: &TextTransformation) -> bool {
        let (s1, e1) = self.edit.span();
        let (s2, e2) = other.edit.span();

        if s1 == s2 {
            return true;
        }

        return s1 < e2 && s2 < e1;
    }
}

/// Find the first pair of transformations whose spans overlap.
pub fn find_overlap(transformations: &[TextTransformation]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..transformations.len()).collect();
    order.sort_by_key(|i| transformations[*i].edit.span());

    for pair in order.windows(2) {
        let (a, b) = (pair[0], pair[1]);

        if transformations[a].overlaps(&transformations[b]) {
            return Some((a, b));
        }
    }

    return None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, character: usize) -> Position {
        Position::new(line, character)
    }

    #[test]
    fn test_edit_accessors() {
        let ins = TextTransformation::insert(pos(0, 1), "ab");
        assert_eq!(ins.edit.kind(), EditKind::Insert);
        assert_eq!(ins.edit.span(), (pos(0, 1), pos(0, 1)));
        assert_eq!(ins.edit.text(), "ab");

        let del = TextTransformation::delete(pos(0, 1), pos(0, 4)).with_cursor(2);
        assert_eq!(del.edit.kind(), EditKind::Delete);
        assert_eq!(del.edit.text(), "");
        assert_eq!(del.cursor_index, Some(2));

        let rep = TextEdit::Replace { start: pos(1, 0), end: pos(1, 2), text: "x".into() };
        assert_eq!(rep.with_span(pos(2, 0), pos(2, 1)).span(), (pos(2, 0), pos(2, 1)));
    }

    #[test]
    fn test_overlap() {
        let a = TextTransformation::delete(pos(0, 0), pos(0, 3));
        let b = TextTransformation::delete(pos(0, 2), pos(0, 5));
        let c = TextTransformation::delete(pos(0, 3), pos(0, 5));
        let d = TextTransformation::insert(pos(0, 3), "z");
        let e = TextTransformation::insert(pos(0, 3), "y");

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
        assert!(c.overlaps(&d));
        assert!(d.overlaps(&e));
    }

    #[test]
    fn test_find_overlap() {
        let disjoint = vec![
            TextTransformation::delete(pos(1, 0), pos(1, 1)),
            TextTransformation::delete(pos(0, 0), pos(0, 1)),
        ];
        assert_eq!(find_overlap(&disjoint), None);

        let overlapping = vec![
            TextTransformation::delete(pos(1, 0), pos(1, 1)),
            TextTransformation::delete(pos(0, 0), pos(0, 1)),
            TextTransformation::replace(pos(0, 0), pos(0, 4), "q"),
        ];
        assert_eq!(find_overlap(&overlapping), Some((1, 2)));
    }
}
