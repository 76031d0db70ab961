//! # Batch editing
//!
//! ## Overview
//!
//! Commands and operators never touch the buffer directly. They queue [Transformation] values
//! on the command being composed, addressed in the coordinates of the text as it was before the
//! keystroke, and tagged with the cursor that produced them. Once every cursor has run, the text
//! transformations are handed to [apply_text_transformations], which applies them as one batch
//! and moves each cursor to where its edits left it.
//!
//! Overlapping transformations can't be applied as a batch, since their order would be
//! ambiguous. They are applied one at a time instead, ordered by start position and then by
//! cursor index, with every later transformation remapped through the ones already applied.
use editor_types::prelude::*;
use tracing::warn;

use crate::buffer::{BufferError, TextBuffer};

/// A change queued by an action, applied once every cursor has run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Transformation {
    /// Edit the buffer.
    Text(TextTransformation),

    /// Replay the last repeatable command.
    Dot,

    /// Replay the macro held by a register.
    Macro {
        /// The register's name.
        register: char,
    },

    /// Undo the last undo group.
    Undo,

    /// Redo the last undone group.
    Redo,
}

/// An edit in character offsets: `[start, end)` is replaced by `len` new characters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Span {
    start: usize,
    end: usize,
    len: usize,
}

/// Map an offset through a sorted list of non-overlapping edits.
///
/// Text inserted exactly at the offset lands after it, and offsets inside replaced text move to
/// the start of the replacement.
fn map_offset(offset: usize, spans: &[Span]) -> usize {
    let mut shift: isize = 0;

    for span in spans {
        if span.start >= offset {
            break;
        }

        if span.end > offset {
            return shift_by(span.start, shift);
        }

        shift += span.len as isize - (span.end - span.start) as isize;
    }

    return shift_by(offset, shift);
}

fn shift_by(offset: usize, shift: isize) -> usize {
    if shift < 0 {
        offset.saturating_sub(shift.unsigned_abs())
    } else {
        offset.saturating_add(shift.unsigned_abs())
    }
}

/// Apply text transformations as a single change, returning the new cursors.
///
/// `cursors` are in the coordinates of the text before the change. Each cursor is moved through
/// the edits, and then by the [PositionDiff] values of the transformations it produced, in the
/// order they were queued.
pub fn apply_text_transformations(
    buffer: &mut dyn TextBuffer,
    cursors: &[Cursor],
    transformations: &[TextTransformation],
) -> Result<Vec<Cursor>, BufferError> {
    if transformations.is_empty() {
        let clamped = cursors.iter().map(|c| Cursor::new(buffer.clamp(c.start), buffer.clamp(c.stop)));

        return Ok(clamped.collect());
    }

    let mut offsets: Vec<(usize, usize)> = cursors
        .iter()
        .map(|c| (buffer.offset_at(c.start), buffer.offset_at(c.stop)))
        .collect();

    if let Some((a, b)) = find_overlap(transformations) {
        warn!(first = a, second = b, "overlapping edits; applying them one at a time");
        apply_serially(buffer, &mut offsets, transformations)?;
    } else {
        let mut spans: Vec<Span> = transformations
            .iter()
            .map(|t| {
                let (start, end) = t.edit.span();

                Span {
                    start: buffer.offset_at(start),
                    end: buffer.offset_at(end),
                    len: t.edit.text().chars().count(),
                }
            })
            .collect();
        spans.sort_by_key(|s| (s.start, s.end));

        let edits: Vec<TextEdit> = transformations.iter().map(|t| t.edit.clone()).collect();
        buffer.apply_edits(&edits)?;

        for (start, stop) in offsets.iter_mut() {
            *start = map_offset(*start, &spans);
            *stop = map_offset(*stop, &spans);
        }
    }

    let mut result = Vec::with_capacity(cursors.len());

    for (idx, (orig, (start, stop))) in cursors.iter().zip(offsets).enumerate() {
        let mut start = buffer.position_at(start);
        let mut stop = buffer.position_at(stop);
        let collapsed = orig.is_empty();

        for diff in transformations
            .iter()
            .filter(|t| t.cursor_index == Some(idx))
            .filter_map(|t| t.diff.as_ref())
        {
            stop = stop.apply(diff);

            if collapsed {
                start = stop;
            }
        }

        result.push(Cursor::new(buffer.clamp(start), buffer.clamp(stop)));
    }

    Ok(result)
}

fn apply_serially(
    buffer: &mut dyn TextBuffer,
    offsets: &mut [(usize, usize)],
    transformations: &[TextTransformation],
) -> Result<(), BufferError> {
    let mut order: Vec<&TextTransformation> = transformations.iter().collect();
    order.sort_by_key(|t| (t.edit.span().0, t.cursor_index));

    let mut pending: Vec<(Span, &TextTransformation)> = order
        .into_iter()
        .map(|t| {
            let (start, end) = t.edit.span();
            let span = Span {
                start: buffer.offset_at(start),
                end: buffer.offset_at(end),
                len: t.edit.text().chars().count(),
            };

            (span, t)
        })
        .collect();

    while !pending.is_empty() {
        let (span, t) = pending.remove(0);
        let start = buffer.position_at(span.start);
        let end = buffer.position_at(span.end.max(span.start));
        buffer.apply_edits(&[t.edit.with_span(start, end)])?;

        let applied = [span];

        for (later, _) in pending.iter_mut() {
            later.start = map_offset(later.start, &applied);
            later.end = map_offset(later.end, &applied).max(later.start);
        }

        for (start, stop) in offsets.iter_mut() {
            *start = map_offset(*start, &applied);
            *stop = map_offset(*stop, &applied);
        }
    }

    Ok(())
}
