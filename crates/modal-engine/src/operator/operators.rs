//! # Operators
//!
//! The operators bound by the default keybindings. Each receives a half-open range in the
//! coordinates of the text before the keystroke, and describes the edits to make, where the
//! cursor should go, and what text belongs in the register.
use editor_types::prelude::*;

use crate::action::{OperatorContext, OperatorOutput};
use crate::errors::EditResult;

fn lines_of(ctx: &OperatorContext<'_>, start: Position, end: Position) -> (usize, usize) {
    (start.line, end.line.min(ctx.buffer.last_line()))
}

/// Remove text, placing it in the register.
pub fn delete(ctx: &OperatorContext<'_>, start: Position, end: Position) -> EditResult<OperatorOutput> {
    let buffer = ctx.buffer;
    let register_text = buffer.text_in(start, end);

    if ctx.shape != TargetShape::LineWise {
        return Ok(OperatorOutput {
            transformations: vec![TextTransformation::delete(start, end)],
            cursor: Some(Cursor::at(start)),
            register_text: Some(register_text),
            deleted: true,
            ..Default::default()
        });
    }

    let (first, last) = lines_of(ctx, start, end);

    let (edit, cursor) = if last < buffer.last_line() {
        let edit = TextTransformation::delete(Position::new(first, 0), Position::new(last + 1, 0));

        (edit, Position::new(first, 0))
    } else if first > 0 {
        let from = Position::new(first - 1, buffer.line_len(first - 1));
        let edit = TextTransformation::delete(from, Position::new(last, buffer.line_len(last)));

        (edit, Position::new(first - 1, 0))
    } else {
        let edit = TextTransformation::delete(Position::default(), buffer.end());

        (edit, Position::default())
    };

    Ok(OperatorOutput {
        transformations: vec![edit],
        cursor: Some(Cursor::at(cursor)),
        register_text: Some(register_text),
        deleted: true,
        ..Default::default()
    })
}

/// Copy text into the register.
pub fn yank(ctx: &OperatorContext<'_>, start: Position, end: Position) -> EditResult<OperatorOutput> {
    let cursor = if ctx.shape == TargetShape::LineWise && !ctx.mode.is_visual() {
        ctx.cursor.collapse()
    } else {
        Cursor::at(start)
    };

    Ok(OperatorOutput {
        cursor: Some(cursor),
        register_text: Some(ctx.buffer.text_in(start, end)),
        ..Default::default()
    })
}

/// Remove text, and start inserting in its place.
///
/// Changing whole lines keeps an empty line to type on.
pub fn change(ctx: &OperatorContext<'_>, start: Position, end: Position) -> EditResult<OperatorOutput> {
    let register_text = ctx.buffer.text_in(start, end);

    Ok(OperatorOutput {
        transformations: vec![TextTransformation::delete(start, end)],
        cursor: Some(Cursor::at(start)),
        mode: Some(Mode::Insert),
        register_text: Some(register_text),
        deleted: true,
    })
}

fn recase(
    ctx: &OperatorContext<'_>,
    start: Position,
    end: Position,
    f: fn(char) -> String,
) -> EditResult<OperatorOutput> {
    let text = ctx.buffer.text_in(start, end);
    let cased: String = text.chars().map(f).collect();
    let transformations = if cased == text {
        vec![]
    } else {
        vec![TextTransformation::replace(start, end, cased)]
    };

    Ok(OperatorOutput {
        transformations,
        cursor: Some(Cursor::at(start)),
        ..Default::default()
    })
}

/// Convert text to lowercase.
pub fn lowercase(ctx: &OperatorContext<'_>, start: Position, end: Position) -> EditResult<OperatorOutput> {
    recase(ctx, start, end, |c| c.to_lowercase().collect())
}

/// Convert text to uppercase.
pub fn uppercase(ctx: &OperatorContext<'_>, start: Position, end: Position) -> EditResult<OperatorOutput> {
    recase(ctx, start, end, |c| c.to_uppercase().collect())
}

/// Swap the case of each character.
pub fn toggle_case(ctx: &OperatorContext<'_>, start: Position, end: Position) -> EditResult<OperatorOutput> {
    recase(ctx, start, end, |c| {
        if c.is_lowercase() {
            c.to_uppercase().collect()
        } else if c.is_uppercase() {
            c.to_lowercase().collect()
        } else {
            c.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RopeBuffer;
    use crate::operator::line_span;

    macro_rules! pos {
        ($l: expr, $c: expr) => {
            Position::new($l, $c)
        };
    }

    fn ctx<'a>(buffer: &'a RopeBuffer, shape: TargetShape, cursor: Position) -> OperatorContext<'a> {
        OperatorContext { buffer, shape, mode: Mode::Normal, cursor: Cursor::at(cursor) }
    }

    #[test]
    fn test_delete_charwise() {
        let buffer = RopeBuffer::new("hello world");
        let out = delete(&ctx(&buffer, TargetShape::CharWise, pos!(0, 0)), pos!(0, 0), pos!(0, 6)).unwrap();

        assert_eq!(out.transformations, vec![TextTransformation::delete(pos!(0, 0), pos!(0, 6))]);
        assert_eq!(out.register_text.as_deref(), Some("hello "));
        assert_eq!(out.cursor, Some(Cursor::at(pos!(0, 0))));
        assert!(out.deleted);
    }

    #[test]
    fn test_delete_lines() {
        let buffer = RopeBuffer::new("one\ntwo\nthree");
        let c = ctx(&buffer, TargetShape::LineWise, pos!(0, 1));

        let (s, e) = line_span(&buffer, 0, 1);
        let out = delete(&c, s, e).unwrap();
        assert_eq!(out.transformations, vec![TextTransformation::delete(pos!(0, 0), pos!(2, 0))]);
        assert_eq!(out.register_text.as_deref(), Some("one\ntwo"));

        let (s, e) = line_span(&buffer, 2, 2);
        let out = delete(&c, s, e).unwrap();
        assert_eq!(out.transformations, vec![TextTransformation::delete(pos!(1, 3), pos!(2, 5))]);
        assert_eq!(out.cursor, Some(Cursor::at(pos!(1, 0))));

        let (s, e) = line_span(&buffer, 0, 2);
        let out = delete(&c, s, e).unwrap();
        assert_eq!(out.transformations, vec![TextTransformation::delete(pos!(0, 0), pos!(2, 5))]);
    }

    #[test]
    fn test_yank_cursor() {
        let buffer = RopeBuffer::new("one\ntwo");

        let out = yank(&ctx(&buffer, TargetShape::LineWise, pos!(1, 2)), pos!(0, 0), pos!(1, 3)).unwrap();
        assert!(out.transformations.is_empty());
        assert_eq!(out.cursor, Some(Cursor::at(pos!(1, 2))));
        assert_eq!(out.register_text.as_deref(), Some("one\ntwo"));

        let out = yank(&ctx(&buffer, TargetShape::CharWise, pos!(1, 2)), pos!(1, 0), pos!(1, 2)).unwrap();
        assert_eq!(out.cursor, Some(Cursor::at(pos!(1, 0))));
        assert_eq!(out.register_text.as_deref(), Some("tw"));
    }

    #[test]
    fn test_change_enters_insert() {
        let buffer = RopeBuffer::new("one\ntwo");
        let out = change(&ctx(&buffer, TargetShape::LineWise, pos!(0, 0)), pos!(0, 0), pos!(0, 3)).unwrap();

        assert_eq!(out.mode, Some(Mode::Insert));
        assert_eq!(out.transformations, vec![TextTransformation::delete(pos!(0, 0), pos!(0, 3))]);
    }

    #[test]
    fn test_case() {
        let buffer = RopeBuffer::new("Hello World");
        let c = ctx(&buffer, TargetShape::CharWise, pos!(0, 0));

        let out = uppercase(&c, pos!(0, 0), pos!(0, 5)).unwrap();
        assert_eq!(out.transformations, vec![TextTransformation::replace(pos!(0, 0), pos!(0, 5), "HELLO")]);

        let out = toggle_case(&c, pos!(0, 0), pos!(0, 11)).unwrap();
        assert_eq!(out.transformations[0].edit.text(), "hELLO wORLD");

        let out = lowercase(&c, pos!(0, 1), pos!(0, 5)).unwrap();
        assert!(out.transformations.is_empty());
    }
}
