//! # Operator ranges
//!
//! ## Overview
//!
//! Operators receive half-open ranges. These helpers turn the selection an operator applies to
//! into the ranges it runs on, depending on the shape of the target:
//!
//! - Character-wise targets are used as-is.
//! - Line-wise targets cover whole lines, from the first column of the first line to the end of
//!   the last one. Operators decide themselves whether to include the final line break.
//! - Block-wise targets are split into one range per line, covering the same columns.
use editor_types::prelude::*;

use crate::buffer::TextBuffer;

pub mod operators;

/// The range covering every line from `first` to `last`, without the final line break.
pub fn line_span(buffer: &dyn TextBuffer, first: usize, last: usize) -> (Position, Position) {
    let last = last.min(buffer.last_line());

    (Position::new(first.min(last), 0), Position::new(last, buffer.line_len(last)))
}

/// The ranges covered by a block selection between two corners, inclusive of both.
pub fn block_segments(buffer: &dyn TextBuffer, a: Position, b: Position) -> Vec<(Position, Position)> {
    let (top, bottom) = (a.line.min(b.line), a.line.max(b.line).min(buffer.last_line()));
    let (left, right) = (a.character.min(b.character), a.character.max(b.character) + 1);

    (top..=bottom)
        .map(|line| {
            let len = buffer.line_len(line);

            (Position::new(line, left.min(len)), Position::new(line, right.min(len)))
        })
        .collect()
}

/// Split a target into the ranges an operator runs on.
pub fn target_ranges(
    buffer: &dyn TextBuffer,
    shape: TargetShape,
    start: Position,
    stop: Position,
) -> Vec<(Position, Position)> {
    match shape {
        TargetShape::CharWise => vec![(start, stop)],
        TargetShape::LineWise => vec![line_span(buffer, start.line, stop.line)],
        TargetShape::BlockWise => block_segments(buffer, start, stop),
    }
}
