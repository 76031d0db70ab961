//! # Movements
//!
//! The steps and counted movements bound by the default keybindings. Steps are handed the
//! position to move from, which is the result of the previous iteration when a count repeats
//! them.
//!
//! Positions at the end of a line (`character == line_len`) stand for the line break, so
//! movements that cross lines treat them as whitespace.
use editor_types::prelude::*;
use editor_types::util::{char_class, CharClass};
use keybindings::key_to_text;
use regex::Regex;

use crate::action::{Iteration, MotionContext};
use crate::buffer::TextBuffer;

fn char_or_newline(buffer: &dyn TextBuffer, pos: Position) -> Option<char> {
    if pos.character < buffer.line_len(pos.line) {
        buffer.char_at(pos)
    } else if pos.line < buffer.last_line() {
        Some('\n')
    } else {
        None
    }
}

fn next_pos(buffer: &dyn TextBuffer, pos: Position) -> Option<Position> {
    if pos.character < buffer.line_len(pos.line) {
        Some(pos.with_character(pos.character + 1))
    } else if pos.line < buffer.last_line() {
        Some(Position::new(pos.line + 1, 0))
    } else {
        None
    }
}

fn prev_pos(buffer: &dyn TextBuffer, pos: Position) -> Option<Position> {
    if let Some(col) = pos.character.min(buffer.line_len(pos.line)).checked_sub(1) {
        Some(pos.with_character(col))
    } else if pos.line > 0 {
        Some(Position::new(pos.line - 1, buffer.line_len(pos.line - 1)))
    } else {
        None
    }
}

fn is_empty_line(buffer: &dyn TextBuffer, pos: Position) -> bool {
    pos.character == 0 && buffer.line_len(pos.line) == 0
}

fn last_column(buffer: &dyn TextBuffer, line: usize) -> usize {
    buffer.line_len(line).saturating_sub(1)
}

/// The character captured by the movement's pattern, such as the `x` in `fx`.
fn target_char(ctx: &MotionContext<'_>) -> Option<char> {
    let key = ctx.action.captured(0)?;

    key_to_text(key)?.chars().next()
}

/// Move one character left, without leaving the line.
pub fn left(_: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    if pos.character == 0 {
        return MovementResult::fail(pos);
    }

    pos.with_character(pos.character - 1).into()
}

/// Move one character right, stopping on the last character of the line.
pub fn right(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    if pos.character + 1 >= ctx.buffer.line_len(pos.line) {
        return MovementResult::fail(pos);
    }

    pos.with_character(pos.character + 1).into()
}

/// Move one character right under an operator, which may reach the end of the line.
pub fn right_operator(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    if pos.character >= ctx.buffer.line_len(pos.line) {
        return MovementResult::fail(pos);
    }

    pos.with_character(pos.character + 1).into()
}

/// Move one line down.
pub fn down(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    if pos.line >= ctx.buffer.last_line() {
        return MovementResult::fail(pos);
    }

    let line = pos.line + 1;

    Position::new(line, pos.character.min(last_column(ctx.buffer, line))).into()
}

/// Move one line up.
pub fn up(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    if pos.line == 0 {
        return MovementResult::fail(pos);
    }

    let line = pos.line - 1;

    Position::new(line, pos.character.min(last_column(ctx.buffer, line))).into()
}

/// The start of the next word, or `None` when there is no later word.
fn next_word_start(buffer: &dyn TextBuffer, pos: Position) -> Option<Position> {
    let mut p = pos;
    let first = char_or_newline(buffer, p)?;

    if first != '\n' && char_class(first) != CharClass::Space {
        let class = char_class(first);

        while let Some(c) = char_or_newline(buffer, p) {
            if c == '\n' || char_class(c) != class {
                break;
            }

            p = next_pos(buffer, p)?;
        }
    }

    loop {
        let c = char_or_newline(buffer, p)?;

        if c != '\n' && char_class(c) != CharClass::Space {
            return Some(p);
        }

        p = next_pos(buffer, p)?;

        if is_empty_line(buffer, p) {
            return Some(p);
        }
    }
}

/// Move to the start of the next word.
pub fn word_forward(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    if let Some(next) = next_word_start(ctx.buffer, pos) {
        return next.into();
    }

    let end = ctx.buffer.end();
    let last = end.with_character(last_column(ctx.buffer, end.line));

    if last > pos {
        last.into()
    } else {
        MovementResult::fail(pos)
    }
}

/// Move to the start of the next word under an operator, without crossing into the next line.
///
/// Under `change`, a cursor on a non-blank only covers the rest of the current word.
pub fn word_forward_operator(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    let eol = Position::new(pos.line, ctx.buffer.line_len(pos.line));

    if ctx.operator == Some("change") {
        if let Some(end) = current_word_end(ctx.buffer, pos) {
            return end.into();
        }
    }

    match next_word_start(ctx.buffer, pos) {
        Some(next) if next.line == pos.line => next.into(),
        Some(next) if pos.character >= eol.character => next.into(),
        _ if eol > pos => eol.into(),
        _ => MovementResult::fail(pos),
    }
}

/// The position just after the word under `pos`, or `None` when `pos` is on a blank.
fn current_word_end(buffer: &dyn TextBuffer, pos: Position) -> Option<Position> {
    let class = match buffer.char_at(pos) {
        Some(c) if char_class(c) != CharClass::Space => char_class(c),
        _ => return None,
    };
    let mut end = pos.character + 1;

    while matches!(buffer.char_at(pos.with_character(end)), Some(c) if char_class(c) == class) {
        end += 1;
    }

    Some(pos.with_character(end))
}

/// Move to the start of the current or previous word.
pub fn word_backward(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    let buffer = ctx.buffer;

    let Some(mut p) = prev_pos(buffer, pos) else {
        return MovementResult::fail(pos);
    };

    loop {
        match char_or_newline(buffer, p) {
            Some(c) if c != '\n' && char_class(c) != CharClass::Space => break,
            _ if is_empty_line(buffer, p) => return p.into(),
            _ => {},
        }

        match prev_pos(buffer, p) {
            Some(prev) => p = prev,
            None => return p.into(),
        }
    }

    let class = char_class(buffer.char_at(p).unwrap_or(' '));

    while p.character > 0 {
        let prev = p.with_character(p.character - 1);

        match buffer.char_at(prev) {
            Some(c) if char_class(c) == class => p = prev,
            _ => break,
        }
    }

    p.into()
}

/// Move to the end of the current or next word.
pub fn word_end(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    let buffer = ctx.buffer;

    let Some(mut p) = next_pos(buffer, pos) else {
        return MovementResult::fail(pos);
    };

    loop {
        match char_or_newline(buffer, p) {
            Some(c) if c != '\n' && char_class(c) != CharClass::Space => break,
            Some(_) => {},
            None => return MovementResult::fail(pos),
        }

        match next_pos(buffer, p) {
            Some(next) => p = next,
            None => return MovementResult::fail(pos),
        }
    }

    let class = char_class(buffer.char_at(p).unwrap_or(' '));

    while p.character + 1 < buffer.line_len(p.line) {
        let next = p.with_character(p.character + 1);

        match buffer.char_at(next) {
            Some(c) if char_class(c) == class => p = next,
            _ => break,
        }
    }

    p.into()
}

/// Move to the end of the word under an operator, including its last character.
pub fn word_end_operator(ctx: &MotionContext<'_>, pos: Position, it: Iteration) -> MovementResult {
    match word_end(ctx, pos, it) {
        MovementResult::Position(p) => p.with_character(p.character + 1).into(),
        failed => failed,
    }
}

/// Move to the first column.
pub fn line_start(_: &MotionContext<'_>, pos: Position, _: usize) -> MovementResult {
    pos.with_character(0).into()
}

/// Move to the first non-blank character of the line.
pub fn first_word(ctx: &MotionContext<'_>, pos: Position, _: usize) -> MovementResult {
    pos.with_character(ctx.buffer.first_non_blank(pos.line)).into()
}

fn count_line(ctx: &MotionContext<'_>, pos: Position, count: usize) -> usize {
    pos.line.saturating_add(count.max(1) - 1).min(ctx.buffer.last_line())
}

/// Move to the last character of the line, or of the `count - 1`th line below.
pub fn line_end(ctx: &MotionContext<'_>, pos: Position, count: usize) -> MovementResult {
    let line = count_line(ctx, pos, count);

    Position::new(line, last_column(ctx.buffer, line)).into()
}

/// Move past the last character of the line under an operator.
pub fn line_end_operator(ctx: &MotionContext<'_>, pos: Position, count: usize) -> MovementResult {
    let line = count_line(ctx, pos, count);

    Position::new(line, ctx.buffer.line_len(line)).into()
}

/// Move to the first line, or to line `count`.
pub fn buffer_start(ctx: &MotionContext<'_>, _: Position, count: usize) -> MovementResult {
    let line = count.saturating_sub(1).min(ctx.buffer.last_line());

    Position::new(line, ctx.buffer.first_non_blank(line)).into()
}

/// Move to the last line, or to line `count`.
pub fn buffer_end(ctx: &MotionContext<'_>, _: Position, count: usize) -> MovementResult {
    let line = match count {
        0 => ctx.buffer.last_line(),
        n => (n - 1).min(ctx.buffer.last_line()),
    };

    Position::new(line, ctx.buffer.first_non_blank(line)).into()
}

/// Find `target` on the line of `pos`, searching from `skip` characters away.
fn find_in_line(
    buffer: &dyn TextBuffer,
    pos: Position,
    target: char,
    forward: bool,
    skip: usize,
) -> Option<usize> {
    let chars: Vec<char> = buffer.line(pos.line).chars().collect();

    if forward {
        let from = pos.character + skip;

        (from..chars.len()).find(|i| chars[*i] == target)
    } else {
        let to = pos.character.min(chars.len()).checked_sub(skip - 1)?;

        (0..to).rev().find(|i| chars[*i] == target)
    }
}

fn search_step(ctx: &MotionContext<'_>, pos: Position, forward: bool, skip: usize) -> Option<usize> {
    let target = target_char(ctx)?;

    find_in_line(ctx.buffer, pos, target, forward, skip)
}

/// Move onto the next occurrence of the captured character in the line.
pub fn find_forward(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    match search_step(ctx, pos, true, 1) {
        Some(col) => pos.with_character(col).into(),
        None => MovementResult::fail(pos),
    }
}

/// Move past the next occurrence of the captured character under an operator.
pub fn find_forward_operator(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    match search_step(ctx, pos, true, 1) {
        Some(col) => pos.with_character(col + 1).into(),
        None => MovementResult::fail(pos),
    }
}

/// Move onto the previous occurrence of the captured character in the line.
pub fn find_backward(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    match search_step(ctx, pos, false, 1) {
        Some(col) => pos.with_character(col).into(),
        None => MovementResult::fail(pos),
    }
}

/// Move up to the next occurrence of the captured character in the line.
pub fn till_forward(ctx: &MotionContext<'_>, pos: Position, it: Iteration) -> MovementResult {
    let skip = if it.first { 1 } else { 2 };

    match search_step(ctx, pos, true, skip) {
        Some(col) => pos.with_character(col - 1).into(),
        None => MovementResult::fail(pos),
    }
}

/// Move onto the next occurrence of the captured character under an operator, leaving it out
/// of the range.
pub fn till_forward_operator(ctx: &MotionContext<'_>, pos: Position, it: Iteration) -> MovementResult {
    let skip = if it.first { 1 } else { 2 };

    match search_step(ctx, pos, true, skip) {
        Some(col) => pos.with_character(col).into(),
        None => MovementResult::fail(pos),
    }
}

/// Move back to just after the previous occurrence of the captured character in the line.
pub fn till_backward(ctx: &MotionContext<'_>, pos: Position, it: Iteration) -> MovementResult {
    let skip = if it.first { 1 } else { 2 };

    match search_step(ctx, pos, false, skip) {
        Some(col) => pos.with_character(col + 1).into(),
        None => MovementResult::fail(pos),
    }
}

/// Find the `count`th match of `needle`, starting just after (or before) `from` and wrapping
/// around the ends of the buffer.
pub fn find_text(
    buffer: &dyn TextBuffer,
    from: Position,
    needle: &Regex,
    forward: bool,
    count: usize,
) -> Option<Position> {
    let text = buffer.contents();
    let start = buffer.offset_at(from);
    let start = text.char_indices().nth(start).map_or(text.len(), |(b, _)| b);
    let ms: Vec<_> = needle.find_iter(&text).collect();
    let modulus = ms.len();

    if modulus == 0 {
        return None;
    }

    let count = count.max(1) % modulus;
    let idx = if forward {
        let first = ms.iter().position(|m| m.start() > start).unwrap_or(0);

        (first + count + modulus - 1) % modulus
    } else {
        let first = ms.iter().position(|m| m.start() >= start).unwrap_or(modulus);

        (first + modulus - count) % modulus
    };

    let offset = text[..ms[idx].start()].chars().count();

    return Some(buffer.position_at(offset));
}

fn search_result(ctx: &MotionContext<'_>, pos: Position, count: usize, reverse: bool) -> MovementResult {
    let Some(search) = ctx.search else {
        return MovementResult::fail(pos);
    };

    match find_text(ctx.buffer, pos, &search.needle, search.forward != reverse, count) {
        Some(next) => next.into(),
        None => MovementResult::fail(pos),
    }
}

/// Move to the next match of the last search.
pub fn search_next(ctx: &MotionContext<'_>, pos: Position, count: usize) -> MovementResult {
    search_result(ctx, pos, count, false)
}

/// Move to the next match of the last search, in the opposite direction.
pub fn search_previous(ctx: &MotionContext<'_>, pos: Position, count: usize) -> MovementResult {
    search_result(ctx, pos, count, true)
}

/// Jump to a mark. The mark `` ` `` is the position before the last jump.
pub fn goto_mark(ctx: &MotionContext<'_>, pos: Position, _: usize) -> MovementResult {
    let target = match target_char(ctx) {
        Some('`') => ctx.last_jump,
        Some(c) => ctx.marks.get(&c).copied(),
        None => None,
    };

    match target {
        Some(p) => ctx.buffer.clamp(p).into(),
        None => MovementResult::fail(pos),
    }
}

/// The run of characters in the same class as the one at `pos`, as `[start, end)` columns.
fn class_run(chars: &[char], col: usize) -> (usize, usize) {
    let class = char_class(chars[col]);
    let mut start = col;
    let mut end = col + 1;

    while start > 0 && char_class(chars[start - 1]) == class {
        start -= 1;
    }

    while end < chars.len() && char_class(chars[end]) == class {
        end += 1;
    }

    (start, end)
}

/// Select the word under the cursor, or the run of whitespace it sits on.
pub fn inner_word(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    let chars: Vec<char> = ctx.buffer.line(pos.line).chars().collect();

    if pos.character >= chars.len() {
        return MovementResult::fail(pos);
    }

    let (start, end) = class_run(&chars, pos.character);

    Range::new(pos.with_character(start), pos.with_character(end)).into()
}

/// Select the word under the cursor together with the whitespace around it.
pub fn a_word(ctx: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
    let chars: Vec<char> = ctx.buffer.line(pos.line).chars().collect();

    if pos.character >= chars.len() {
        return MovementResult::fail(pos);
    }

    let (mut start, mut end) = class_run(&chars, pos.character);

    if char_class(chars[pos.character]) == CharClass::Space {
        if end < chars.len() {
            end = class_run(&chars, end).1;
        }
    } else if end < chars.len() && char_class(chars[end]) == CharClass::Space {
        end = class_run(&chars, end).1;
    } else if start > 0 && char_class(chars[start - 1]) == CharClass::Space {
        start = class_run(&chars, start - 1).0;
    }

    Range::new(pos.with_character(start), pos.with_character(end)).into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::action::{Action, ActionDef, StepFn};
    use crate::buffer::RopeBuffer;
    use crate::state::SearchState;
    use keybindings::Pattern;

    const FIRST: Iteration = Iteration { first: true, last: true };

    macro_rules! pos {
        ($l: expr, $c: expr) => {
            Position::new($l, $c)
        };
    }

    fn action(keys: &[&str]) -> Action {
        fn stay(_: &MotionContext<'_>, pos: Position, _: Iteration) -> MovementResult {
            pos.into()
        }

        let first = keys.first().copied().unwrap_or("t");
        let def = ActionDef::movement("test", Pattern::keys(&[first, "<character>"]), stay);
        let keys = keys.iter().map(|k| k.to_string()).collect();

        Action::new(Arc::new(def), keys, "\\")
    }

    fn step(text: &str, f: StepFn, start: Position, keys: &[&str]) -> MovementResult {
        let buffer = RopeBuffer::new(text);
        let action = action(keys);
        let marks = HashMap::new();
        let ctx = MotionContext {
            buffer: &buffer,
            action: &action,
            cursor: Cursor::at(start),
            mode: Mode::Normal,
            operator_pending: false,
            operator: None,
            is_repeat: false,
            search: None,
            marks: &marks,
            last_jump: None,
        };

        f(&ctx, start, FIRST)
    }

    #[test]
    fn test_horizontal() {
        assert!(step("abc", left, pos!(0, 0), &[]).is_failed());
        assert_eq!(step("abc", left, pos!(0, 2), &[]), pos!(0, 1).into());
        assert!(step("abc", right, pos!(0, 2), &[]).is_failed());
        assert_eq!(step("abc", right_operator, pos!(0, 2), &[]), pos!(0, 3).into());
        assert!(step("", right, pos!(0, 0), &[]).is_failed());
    }

    #[test]
    fn test_vertical() {
        assert_eq!(step("abcd\nx\nabc", down, pos!(0, 3), &[]), pos!(1, 0).into());
        assert_eq!(step("abcd\nx\nabc", up, pos!(2, 2), &[]), pos!(1, 0).into());
        assert!(step("abcd\nx", down, pos!(1, 0), &[]).is_failed());
        assert!(step("abcd\nx", up, pos!(0, 0), &[]).is_failed());
    }

    #[test]
    fn test_words() {
        let text = "foo.bar  baz\n\n  qux";

        assert_eq!(step(text, word_forward, pos!(0, 0), &[]), pos!(0, 3).into());
        assert_eq!(step(text, word_forward, pos!(0, 3), &[]), pos!(0, 4).into());
        assert_eq!(step(text, word_forward, pos!(0, 4), &[]), pos!(0, 9).into());
        assert_eq!(step(text, word_forward, pos!(0, 9), &[]), pos!(1, 0).into());
        assert_eq!(step(text, word_forward, pos!(1, 0), &[]), pos!(2, 2).into());
        assert_eq!(step(text, word_forward, pos!(2, 2), &[]), pos!(2, 4).into());
        assert!(step(text, word_forward, pos!(2, 4), &[]).is_failed());

        assert_eq!(step(text, word_backward, pos!(2, 2), &[]), pos!(1, 0).into());
        assert_eq!(step(text, word_backward, pos!(1, 0), &[]), pos!(0, 9).into());
        assert_eq!(step(text, word_backward, pos!(0, 10), &[]), pos!(0, 9).into());
        assert_eq!(step(text, word_backward, pos!(0, 4), &[]), pos!(0, 3).into());
        assert!(step(text, word_backward, pos!(0, 0), &[]).is_failed());

        assert_eq!(step(text, word_end, pos!(0, 0), &[]), pos!(0, 2).into());
        assert_eq!(step(text, word_end, pos!(0, 2), &[]), pos!(0, 3).into());
        assert_eq!(step(text, word_end, pos!(0, 9), &[]), pos!(0, 11).into());
        assert_eq!(step(text, word_end, pos!(0, 11), &[]), pos!(2, 4).into());
        assert_eq!(step(text, word_end_operator, pos!(0, 0), &[]), pos!(0, 3).into());
        assert!(step(text, word_end, pos!(2, 4), &[]).is_failed());
    }

    #[test]
    fn test_word_operator_stays_on_line() {
        assert_eq!(step("ab cd\nef", word_forward_operator, pos!(0, 0), &[]), pos!(0, 3).into());
        assert_eq!(step("ab cd\nef", word_forward_operator, pos!(0, 3), &[]), pos!(0, 5).into());
        assert_eq!(step("ab\n\nef", word_forward_operator, pos!(1, 0), &[]), pos!(2, 0).into());
        assert_eq!(step("hello", word_forward_operator, pos!(0, 0), &[]), pos!(0, 5).into());
    }

    #[test]
    fn test_find_and_till() {
        let text = "a,b,c";

        assert_eq!(step(text, find_forward, pos!(0, 0), &["f", ","]), pos!(0, 1).into());
        assert_eq!(step(text, find_forward, pos!(0, 1), &["f", ","]), pos!(0, 3).into());
        assert_eq!(step(text, find_forward_operator, pos!(0, 0), &["f", ","]), pos!(0, 2).into());
        assert!(step(text, find_forward, pos!(0, 0), &["f", "z"]).is_failed());
        assert_eq!(step(text, find_backward, pos!(0, 4), &["F", ","]), pos!(0, 3).into());
        assert!(step(text, find_backward, pos!(0, 1), &["F", ","]).is_failed());

        assert_eq!(step(text, till_forward, pos!(0, 2), &["t", ","]), pos!(0, 2).into());
        assert_eq!(step(text, till_forward, pos!(0, 0), &["t", "c"]), pos!(0, 3).into());
        assert_eq!(step(text, till_forward_operator, pos!(0, 0), &["t", "c"]), pos!(0, 4).into());
        assert_eq!(step(text, till_backward, pos!(0, 4), &["T", "a"]), pos!(0, 1).into());
    }

    #[test]
    fn test_counted() {
        let buffer = RopeBuffer::new("  one\ntwo\n three");
        let action = action(&[]);
        let marks = HashMap::from([('a', pos!(1, 2))]);
        let search = SearchState { needle: Regex::new("t").unwrap(), forward: true };
        let ctx = MotionContext {
            buffer: &buffer,
            action: &action,
            cursor: Cursor::default(),
            mode: Mode::Normal,
            operator_pending: false,
            operator: None,
            is_repeat: false,
            search: Some(&search),
            marks: &marks,
            last_jump: Some(pos!(2, 3)),
        };
        let start = pos!(0, 3);

        assert_eq!(line_start(&ctx, start, 0), pos!(0, 0).into());
        assert_eq!(first_word(&ctx, start, 0), pos!(0, 2).into());
        assert_eq!(line_end(&ctx, start, 0), pos!(0, 4).into());
        assert_eq!(line_end(&ctx, start, 2), pos!(1, 2).into());
        assert_eq!(line_end_operator(&ctx, start, 1), pos!(0, 5).into());
        assert_eq!(buffer_start(&ctx, start, 0), pos!(0, 2).into());
        assert_eq!(buffer_start(&ctx, start, 3), pos!(2, 1).into());
        assert_eq!(buffer_end(&ctx, start, 0), pos!(2, 1).into());
        assert_eq!(buffer_end(&ctx, start, 2), pos!(1, 0).into());
        assert_eq!(search_next(&ctx, start, 0), pos!(1, 0).into());
        assert_eq!(search_next(&ctx, start, 2), pos!(2, 1).into());
        assert_eq!(search_previous(&ctx, start, 0), pos!(2, 1).into());
    }

    #[test]
    fn test_marks() {
        let buffer = RopeBuffer::new("abc\ndef");
        let marks = HashMap::from([('a', pos!(1, 2))]);
        let ctx_for = |keys: &[&str]| {
            let action = action(keys);
            let ctx = MotionContext {
                buffer: &buffer,
                action: &action,
                cursor: Cursor::default(),
                mode: Mode::Normal,
                operator_pending: false,
                operator: None,
                is_repeat: false,
                search: None,
                marks: &marks,
                last_jump: Some(pos!(0, 1)),
            };

            goto_mark(&ctx, pos!(0, 0), 0)
        };

        assert_eq!(ctx_for(&["`", "a"]), pos!(1, 2).into());
        assert_eq!(ctx_for(&["`", "`"]), pos!(0, 1).into());
        assert!(ctx_for(&["`", "z"]).is_failed());
    }

    #[test]
    fn test_prev_pos_past_line_end() {
        let buffer = RopeBuffer::new("ab\n\ncd");

        assert_eq!(prev_pos(&buffer, pos!(1, 3)), Some(pos!(0, 2)));
        assert_eq!(prev_pos(&buffer, pos!(0, 5)), Some(pos!(0, 1)));
        assert_eq!(prev_pos(&buffer, pos!(2, 1)), Some(pos!(2, 0)));
        assert_eq!(prev_pos(&buffer, pos!(0, 0)), None);
    }

    #[test]
    fn test_find_text_wraps() {
        let buffer = RopeBuffer::new("ab ab\nab");
        let ab = Regex::new("ab").unwrap();
        let zz = Regex::new("zz").unwrap();

        assert_eq!(find_text(&buffer, pos!(0, 0), &ab, true, 1), Some(pos!(0, 3)));
        assert_eq!(find_text(&buffer, pos!(1, 0), &ab, true, 1), Some(pos!(0, 0)));
        assert_eq!(find_text(&buffer, pos!(0, 0), &ab, false, 1), Some(pos!(1, 0)));
        assert_eq!(find_text(&buffer, pos!(0, 3), &ab, false, 1), Some(pos!(0, 0)));
        assert_eq!(find_text(&buffer, pos!(0, 0), &zz, true, 1), None);

        // Counts step through the matches, wrapping as often as needed.
        assert_eq!(find_text(&buffer, pos!(0, 0), &ab, true, 2), Some(pos!(1, 0)));
        assert_eq!(find_text(&buffer, pos!(0, 0), &ab, true, 4), Some(pos!(0, 3)));
        assert_eq!(find_text(&buffer, pos!(0, 0), &ab, false, 99999), Some(pos!(0, 0)));
    }

    #[test]
    fn test_find_text_pattern() {
        let buffer = RopeBuffer::new("abc a.c\nxaxc");
        let needle = Regex::new("a.c").unwrap();

        assert_eq!(find_text(&buffer, pos!(0, 0), &needle, true, 1), Some(pos!(0, 4)));
        assert_eq!(find_text(&buffer, pos!(0, 4), &needle, true, 1), Some(pos!(1, 1)));

        let literal = Regex::new(&regex::escape("a.c")).unwrap();
        assert_eq!(find_text(&buffer, pos!(1, 1), &literal, true, 1), Some(pos!(0, 4)));

        // Positions count characters, not bytes.
        let buffer = RopeBuffer::new("é\nbé");
        let needle = Regex::new("é").unwrap();
        assert_eq!(find_text(&buffer, pos!(0, 0), &needle, true, 1), Some(pos!(1, 1)));
    }

    #[test]
    fn test_word_objects() {
        let text = "one  two three";

        let iw = |col| step(text, inner_word, pos!(0, col), &[]);
        assert_eq!(iw(5), Range::new(pos!(0, 5), pos!(0, 8)).into());
        assert_eq!(iw(3), Range::new(pos!(0, 3), pos!(0, 5)).into());

        let aw = |col| step(text, a_word, pos!(0, col), &[]);
        assert_eq!(aw(1), Range::new(pos!(0, 0), pos!(0, 5)).into());
        assert_eq!(aw(3), Range::new(pos!(0, 3), pos!(0, 8)).into());
        assert_eq!(aw(10), Range::new(pos!(0, 8), pos!(0, 14)).into());

        assert!(step("", inner_word, pos!(0, 0), &[]).is_failed());
    }
}
