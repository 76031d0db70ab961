//! # Motion execution
//!
//! ## Overview
//!
//! A movement is run from each cursor by [execute], which repeats the movement's step once per
//! count and feeds each result into the next iteration. On the final iteration, a movement run
//! under a pending operator may use a different step, so that, for example, `dw` on the last
//! word of a line stops at the end of the line instead of crossing into the next one.
//!
//! A step that can't find its target returns a failed [Range]. The loop stops there, and returns
//! the last successful result, so that `5l` on a short line still moves as far as it can. A
//! failure on the very first iteration is returned as-is.
use editor_types::prelude::*;

use crate::action::{Behavior, Iteration, MotionContext, MovementBehavior, SelectionType};

pub mod movements;

/// Run the movement in `ctx` from `start`.
///
/// `count` is the count typed for the movement, or 0 if none was typed. Stepwise movements clamp
/// it into `bounds`, while counted movements receive it as-is.
pub fn execute(
    ctx: &MotionContext<'_>,
    start: Position,
    count: usize,
    bounds: (usize, usize),
) -> MovementResult {
    let movement = match ctx.action.behavior() {
        Behavior::Movement(movement) => movement,
        Behavior::Operator(_) | Behavior::Command(_) => return MovementResult::fail(start),
    };

    match movement {
        MovementBehavior::Step { step, operator_step, selection } => {
            let (lo, hi) = bounds;
            let n = count.clamp(lo, hi);
            let mut pos = start;
            let mut result: Option<MovementResult> = None;

            for i in 0..n {
                let iteration = Iteration { first: i == 0, last: i + 1 == n };
                let f = match operator_step {
                    Some(alternate) if iteration.last && ctx.operator_pending => alternate,
                    _ => step,
                };

                let next = f(ctx, pos, iteration);

                if next.is_failed() {
                    return result.unwrap_or(next);
                }

                let next = match (selection, result, next) {
                    (
                        SelectionType::Concatenating,
                        Some(MovementResult::Range(prev)),
                        MovementResult::Range(range),
                    ) => Range::new(prev.start, range.stop).into(),
                    _ => next,
                };

                pos = next.stop();
                result = Some(next);
            }

            return result.unwrap_or(MovementResult::Position(start));
        },
        MovementBehavior::Counted { run, operator_run } => {
            let f = match operator_run {
                Some(alternate) if ctx.operator_pending => alternate,
                _ => run,
            };

            return f(ctx, start, count.min(bounds.1));
        },
        MovementBehavior::RepeatCharSearch { .. } => {
            // Resolved into the repeated movement before it gets here.
            return MovementResult::fail(start);
        },
    }
}

/// Repeat a character search with `;` or `,`.
///
/// Without a count, a repeat that wouldn't move (like `;` after `tx`, when the cursor already
/// sits before an `x`) is retried with a count of 2, so that it advances to the next match.
pub fn repeat_char_search(
    ctx: &MotionContext<'_>,
    start: Position,
    count: usize,
    bounds: (usize, usize),
) -> MovementResult {
    let result = execute(ctx, start, count, bounds);

    if count == 0 && !result.is_failed() && result.stop() == start {
        return execute(ctx, start, 2, bounds);
    }

    return result;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use rand::Rng;

    use super::*;
    use crate::action::{Action, ActionDef};
    use crate::buffer::{RopeBuffer, TextBuffer};
    use keybindings::Pattern;

    const BOUNDS: (usize, usize) = (1, 99999);

    fn action(def: ActionDef, keys: &[&str]) -> Action {
        let keys = keys.iter().map(|k| k.to_string()).collect();

        Action::new(Arc::new(def), keys, "\\")
    }

    fn run(buffer: &RopeBuffer, action: &Action, start: Position, count: usize, op: bool) -> MovementResult {
        let marks = HashMap::new();
        let ctx = MotionContext {
            buffer,
            action,
            cursor: Cursor::at(start),
            mode: Mode::Normal,
            operator_pending: op,
            operator: None,
            is_repeat: false,
            search: None,
            marks: &marks,
            last_jump: None,
        };

        execute(&ctx, start, count, BOUNDS)
    }

    fn right() -> Action {
        action(ActionDef::movement("right", Pattern::keys(&["l"]), movements::right), &["l"])
    }

    #[test]
    fn test_count_stops_at_failure() {
        let buffer = RopeBuffer::new("abcde");
        let l = right();
        let start = Position::new(0, 0);

        assert_eq!(run(&buffer, &l, start, 0, false), Position::new(0, 1).into());
        assert_eq!(run(&buffer, &l, start, 3, false), Position::new(0, 3).into());
        assert_eq!(run(&buffer, &l, start, 100, false), Position::new(0, 4).into());

        let end = Position::new(0, 4);
        assert!(run(&buffer, &l, end, 1, false).is_failed());
        assert!(run(&buffer, &l, end, 7, false).is_failed());
    }

    #[test]
    fn test_monotonic_failure() {
        let mut rng = rand::thread_rng();
        let buffer = RopeBuffer::new("some text of varying length");
        let l = right();
        let len = buffer.line_len(0);

        for _ in 0..200 {
            let col = rng.gen_range(0..len);
            let count = rng.gen_range(1..64);
            let start = Position::new(0, col);

            // The step fails on its k-th call.
            let k = len - col;

            if count < k {
                continue;
            }

            let result = run(&buffer, &l, start, count, false);

            if k == 1 {
                assert!(result.is_failed());
            } else {
                assert_eq!(result, run(&buffer, &l, start, k - 1, false));
            }
        }
    }

    #[test]
    fn test_operator_step_on_last_iteration() {
        let buffer = RopeBuffer::new("hello world\nnext");
        let w = action(
            ActionDef::movement("word", Pattern::keys(&["w"]), movements::word_forward)
                .operator_step(movements::word_forward_operator),
            &["w"],
        );
        let start = Position::new(0, 0);

        assert_eq!(run(&buffer, &w, start, 1, true), Position::new(0, 6).into());
        assert_eq!(run(&buffer, &w, start, 2, true), Position::new(0, 11).into());
        assert_eq!(run(&buffer, &w, start, 2, false), Position::new(1, 0).into());
    }

    #[test]
    fn test_concatenating_ranges() {
        let buffer = RopeBuffer::new("one two three");
        let iw = action(
            ActionDef::movement("inner-word", Pattern::keys(&["i", "w"]), movements::inner_word),
            &["i", "w"],
        );

        let expected = Range::new(Position::new(0, 0), Position::new(0, 3));
        assert_eq!(run(&buffer, &iw, Position::new(0, 1), 1, true), expected.into());

        let expected = Range::new(Position::new(0, 0), Position::new(0, 7));
        assert_eq!(run(&buffer, &iw, Position::new(0, 1), 3, true), expected.into());
    }

    #[test]
    fn test_repeat_till_advances() {
        let buffer = RopeBuffer::new("axbxcx");
        let till = action(
            ActionDef::movement(
                "till-forward",
                Pattern::keys(&["t", "<character>"]),
                movements::till_forward,
            ),
            &["t", "x"],
        );
        let marks = HashMap::new();
        let start = Position::new(0, 0);
        let ctx = MotionContext {
            buffer: &buffer,
            action: &till,
            cursor: Cursor::at(start),
            mode: Mode::Normal,
            operator_pending: false,
            operator: None,
            is_repeat: true,
            search: None,
            marks: &marks,
            last_jump: None,
        };

        assert_eq!(execute(&ctx, start, 0, BOUNDS), start.into());
        assert_eq!(repeat_char_search(&ctx, start, 0, BOUNDS), Position::new(0, 2).into());
        assert_eq!(repeat_char_search(&ctx, start, 1, BOUNDS), start.into());
    }
}
