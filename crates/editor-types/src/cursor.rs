//! # Cursors and movement results
//!
//! ## Overview
//!
//! A [Cursor] is a pair of positions. Its `stop` is the caret that moves when the user types a
//! motion, and its `start` anchors a selection in the Visual modes. Outside of Visual modes the
//! two positions coincide.
//!
//! A movement produces a [MovementResult]: either a plain [Position], or a [Range] which may be
//! marked as failed when the movement could not find its target.
use crate::position::Position;
use crate::util::sort2;

/// A caret, together with the anchor of its selection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Cursor {
    /// The selection anchor.
    pub start: Position,

    /// The active caret end.
    pub stop: Position,
}

impl Cursor {
    /// Create a cursor with a selection running from `start` to `stop`.
    pub fn new(start: Position, stop: Position) -> Self {
        Cursor { start, stop }
    }

    /// Create a cursor with no selection.
    pub fn at(pos: Position) -> Self {
        Cursor { start: pos, stop: pos }
    }

    /// Whether the anchor and the caret coincide.
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Return the two ends of this cursor in document order.
    pub fn sorted(&self) -> (Position, Position) {
        sort2(self.start, self.stop)
    }

    /// Keep the anchor, and move the caret to `stop`.
    pub fn with_stop(self, stop: Position) -> Self {
        Cursor { stop, ..self }
    }

    /// Drop the selection, keeping the caret.
    pub fn collapse(self) -> Self {
        Cursor::at(self.stop)
    }
}

/// Sort cursors into document order and remove any duplicates.
///
/// This never increases the number of cursors, and the result contains no two cursors with the
/// same `(start, stop)` pair.
pub fn normalize_cursors(mut cursors: Vec<Cursor>) -> Vec<Cursor> {
    cursors.sort_by(|a, b| a.sorted().cmp(&b.sorted()).then(a.cmp(b)));
    cursors.dedup();

    return cursors;
}

/// The span covered by a movement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    /// Where the span begins.
    pub start: Position,

    /// Where the span ends.
    pub stop: Position,

    /// Whether the movement failed to find its target.
    pub failed: bool,
}

impl Range {
    /// Create a successful range.
    pub fn new(start: Position, stop: Position) -> Self {
        Range { start, stop, failed: false }
    }

    /// Create a range marking a movement that could not find its target.
    pub fn failed(start: Position, stop: Position) -> Self {
        Range { start, stop, failed: true }
    }
}

/// The outcome of running a movement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MovementResult {
    /// The caret should move to this position.
    Position(Position),

    /// The movement covered this span.
    Range(Range),
}

impl MovementResult {
    /// A failed movement that leaves the caret at `pos`.
    pub fn fail(pos: Position) -> Self {
        MovementResult::Range(Range::failed(pos, pos))
    }

    /// Whether this result reports a failed movement.
    pub fn is_failed(&self) -> bool {
        matches!(self, MovementResult::Range(Range { failed: true, .. }))
    }

    /// Where the caret ends up.
    pub fn stop(&self) -> Position {
        match self {
            MovementResult::Position(pos) => *pos,
            MovementResult::Range(range) => range.stop,
        }
    }
}

impl From<Position> for MovementResult {
    fn from(pos: Position) -> Self {
        MovementResult::Position(pos)
    }
}

impl From<Range> for MovementResult {
    fn from(range: Range) -> Self {
        MovementResult::Range(range)
    }
}
