//! # Commands
//!
//! The commands bound by the default keybindings. A command runs once per cursor (or once in
//! total, when flagged [ONCE](crate::action::ActionFlags::ONCE)), evaluating against the
//! cursor in [CommandContext::cursor] and updating it to move the cursor.
//!
//! Edits are queued with [CommandContext::edit] in the coordinates of the text before the
//! keystroke, and land together once every cursor has run.
use editor_types::prelude::*;
use keybindings::key_to_text;
use regex::Regex;
use tracing::debug;

use crate::action::{CommandContext, GuardContext};
use crate::errors::EditResult;
use crate::motion::movements::find_text;
use crate::repeat::MacroRecording;
use crate::state::SearchState;
use crate::transform::Transformation;

/// The name of the command that stops recording a macro, which is left out of the recording.
pub const STOP_RECORDING: &str = "stop-recording";

fn captured_char(ctx: &CommandContext<'_>) -> Option<char> {
    let key = ctx.action.captured(0)?;

    key_to_text(key)?.chars().next()
}

fn typed_text(ctx: &CommandContext<'_>) -> Option<String> {
    let key = ctx.action.keys().last()?;

    key_to_text(key)
}

/// A literal `0` continues a count, but starts the `0` movement otherwise.
pub fn is_count_continuation(ctx: &GuardContext<'_>) -> bool {
    match ctx.keys.last() {
        Some(key) if key == "0" => ctx.state.recorded.count() > 0,
        _ => true,
    }
}

/// Whether macros are enabled, and none is being recorded.
pub fn can_start_recording(ctx: &GuardContext<'_>) -> bool {
    ctx.config.features.macros && ctx.state.recording.is_none()
}

/// Whether a macro is being recorded.
pub fn is_recording(ctx: &GuardContext<'_>) -> bool {
    ctx.state.recording.is_some()
}

/// Whether macros are enabled.
pub fn macros_enabled(ctx: &GuardContext<'_>) -> bool {
    ctx.config.features.macros
}

/// Whether `;` and `,` are enabled.
pub fn char_search_repeat_enabled(ctx: &GuardContext<'_>) -> bool {
    ctx.config.features.char_search_repeat
}

/// Whether text objects are enabled.
pub fn text_objects_enabled(ctx: &GuardContext<'_>) -> bool {
    ctx.config.features.text_objects
}

/// Add a digit to the count.
pub fn count_digit(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let digit = ctx
        .action
        .keys()
        .last()
        .and_then(|k| k.parse::<usize>().ok())
        .unwrap_or_default();

    ctx.state.recorded.push_digit(digit);

    Ok(())
}

/// Select the register for the rest of the command.
pub fn select_register(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    if let Some(register) = captured_char(ctx).and_then(char_to_register) {
        ctx.state.recorded.register = Some(register);
    }

    Ok(())
}

/// Start inserting before the cursor.
pub fn insert_before(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    ctx.set_mode(Mode::Insert);

    Ok(())
}

/// Start inserting after the cursor.
pub fn insert_after(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let pos = ctx.cursor.stop;
    let len = ctx.buffer.line_len(pos.line);

    ctx.cursor = Cursor::at(pos.with_character((pos.character + 1).min(len)));
    ctx.set_mode(Mode::Insert);

    Ok(())
}

/// Start inserting before the first non-blank character of the line.
pub fn insert_line_start(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let line = ctx.cursor.stop.line;

    ctx.cursor = Cursor::at(Position::new(line, ctx.buffer.first_non_blank(line)));
    ctx.set_mode(Mode::Insert);

    Ok(())
}

/// Start inserting at the end of the line.
pub fn insert_line_end(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let line = ctx.cursor.stop.line;

    ctx.cursor = Cursor::at(Position::new(line, ctx.buffer.line_len(line)));
    ctx.set_mode(Mode::Insert);

    Ok(())
}

/// Open a new line below the cursor, and start inserting on it.
pub fn open_below(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let line = ctx.cursor.stop.line;
    let eol = Position::new(line, ctx.buffer.line_len(line));

    ctx.cursor = Cursor::at(eol);
    ctx.edit(TextTransformation::insert(eol, "\n").with_diff(PositionDiff::next_line(1)));
    ctx.set_mode(Mode::Insert);

    Ok(())
}

/// Open a new line above the cursor, and start inserting on it.
pub fn open_above(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let bol = Position::new(ctx.cursor.stop.line, 0);

    ctx.cursor = Cursor::at(bol);
    ctx.edit(TextTransformation::insert(bol, "\n"));
    ctx.set_mode(Mode::Insert);

    Ok(())
}

/// Start overwriting text.
pub fn replace_mode(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    ctx.set_mode(Mode::Replace);

    Ok(())
}

/// Return to Normal mode.
pub fn normal_mode(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    ctx.set_mode(Mode::Normal);

    Ok(())
}

/// Type a character in Insert or Replace mode.
pub fn type_char(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let Some(text) = typed_text(ctx) else {
        return Ok(());
    };

    let pos = ctx.cursor.stop;
    let n = text.chars().count();
    let diff = PositionDiff::characters(n as isize);

    let edit = if ctx.state.mode == Mode::Replace {
        let end = (pos.character + n).min(ctx.buffer.line_len(pos.line));

        TextTransformation::replace(pos, pos.with_character(end.max(pos.character)), text)
    } else {
        TextTransformation::insert(pos, text)
    };

    ctx.edit(edit.with_diff(diff));

    Ok(())
}

/// Break the line at the cursor.
pub fn insert_newline(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let pos = ctx.cursor.stop;

    ctx.edit(TextTransformation::insert(pos, "\n").with_diff(PositionDiff::next_line(1)));

    Ok(())
}

/// Delete the character before the cursor, joining lines at the start of one.
///
/// In Replace mode this only moves the cursor back.
pub fn backspace(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let pos = ctx.cursor.stop;

    if ctx.state.mode == Mode::Replace {
        if pos.character > 0 {
            ctx.cursor = Cursor::at(pos.with_character(pos.character - 1));
        }

        return Ok(());
    }

    let col = pos.character.min(ctx.buffer.line_len(pos.line));

    if let Some(col) = col.checked_sub(1) {
        ctx.edit(TextTransformation::delete(pos.with_character(col), pos));
    } else if pos.line > 0 {
        let prev = Position::new(pos.line - 1, ctx.buffer.line_len(pos.line - 1));

        ctx.edit(TextTransformation::delete(prev, pos));
    }

    Ok(())
}

/// Delete characters under and after the cursor.
pub fn delete_char(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let pos = ctx.cursor.stop;
    let len = ctx.buffer.line_len(pos.line);

    if pos.character >= len {
        return Ok(());
    }

    let end = pos.with_character(pos.character.saturating_add(ctx.count1()).min(len));
    let text = ctx.buffer.text_in(pos, end);

    ctx.edit(TextTransformation::delete(pos, end));
    ctx.store(TargetShape::CharWise, text, true);

    Ok(())
}

/// Delete characters before the cursor.
pub fn delete_char_before(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let pos = ctx.cursor.stop;

    if pos.character == 0 {
        return Ok(());
    }

    let start = pos.with_character(pos.character.saturating_sub(ctx.count1()));
    let text = ctx.buffer.text_in(start, pos);

    ctx.edit(TextTransformation::delete(start, pos));
    ctx.store(TargetShape::CharWise, text, true);
    ctx.cursor = Cursor::at(start);

    Ok(())
}

/// Replace characters under the cursor with the captured character.
pub fn replace_char(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let Some(c) = captured_char(ctx) else {
        return Ok(());
    };

    let pos = ctx.cursor.stop;
    let n = ctx.count1();

    if pos.character.saturating_add(n) > ctx.buffer.line_len(pos.line) {
        ctx.state.last_movement_failed = true;
        return Ok(());
    }

    let end = pos.with_character(pos.character + n);
    let text: String = std::iter::repeat(c).take(n).collect();
    let diff = PositionDiff::characters(n as isize - 1);

    ctx.edit(TextTransformation::replace(pos, end, text).with_diff(diff));

    Ok(())
}

fn paste(ctx: &mut CommandContext<'_>, after: bool) -> EditResult<()> {
    let (register, _) = ctx.state.recorded.register();
    let cell = ctx.state.registers.get(&register);

    if cell.is_empty() {
        return Ok(());
    }

    let total = ctx.state.cursors.len();
    let value = cell.value_for(ctx.cursor_index, total);
    let pos = ctx.cursor.stop;
    let count = ctx.count1().min(ctx.config.count_bounds().1);

    if cell.shape == TargetShape::LineWise {
        let text = vec![value; count].join("\n");

        if !after {
            let bol = Position::new(pos.line, 0);

            ctx.cursor = Cursor::at(bol);
            ctx.edit(TextTransformation::insert(bol, text + "\n"));
        } else if pos.line < ctx.buffer.last_line() {
            let next = Position::new(pos.line + 1, 0);

            ctx.cursor = Cursor::at(next);
            ctx.edit(TextTransformation::insert(next, text + "\n"));
        } else {
            let eol = Position::new(pos.line, ctx.buffer.line_len(pos.line));
            let edit = TextTransformation::insert(eol, format!("\n{text}"))
                .with_diff(PositionDiff::next_line(1));

            ctx.cursor = Cursor::at(eol);
            ctx.edit(edit);
        }

        return Ok(());
    }

    let text = value.repeat(count);
    let len = ctx.buffer.line_len(pos.line);
    let at = if after && len > 0 {
        pos.with_character((pos.character + 1).min(len))
    } else {
        pos.with_character(pos.character.min(len))
    };
    let diff = PositionDiff::characters(text.chars().count().saturating_sub(1) as isize);

    ctx.cursor = Cursor::at(at);
    ctx.edit(TextTransformation::insert(at, text).with_diff(diff));

    Ok(())
}

/// Paste the register after the cursor.
pub fn paste_after(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    paste(ctx, true)
}

/// Paste the register before the cursor.
pub fn paste_before(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    paste(ctx, false)
}

/// Undo the last change.
pub fn undo(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    ctx.push(Transformation::Undo);

    Ok(())
}

/// Redo the last undone change.
pub fn redo(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    ctx.push(Transformation::Redo);

    Ok(())
}

/// Repeat the last change.
pub fn dot_repeat(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    ctx.push(Transformation::Dot);

    Ok(())
}

/// Start recording a macro into the captured register.
pub fn start_recording(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let Some((Register::Named(name), append)) = captured_char(ctx).and_then(char_to_register) else {
        return Ok(());
    };

    debug!(register = %name, append, "recording macro");
    ctx.state.recording = Some(MacroRecording::new(name, append));

    Ok(())
}

/// Stop recording, and store the macro.
pub fn stop_recording(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    if let Some(recording) = ctx.state.recording.take() {
        debug!(register = %recording.register, keys = recording.keys.len(), "recorded macro");

        let (name, append, recorded) = recording.finish();
        ctx.state.registers.put_macro(name, recorded, append);
    }

    Ok(())
}

/// Replay the macro in the captured register.
pub fn replay_macro(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    let Some(register) = captured_char(ctx) else {
        return Ok(());
    };

    ctx.state.last_macro = Some(register);
    ctx.push(Transformation::Macro { register });

    Ok(())
}

/// Replay the last replayed macro.
pub fn replay_last_macro(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    if let Some(register) = ctx.state.last_macro {
        ctx.push(Transformation::Macro { register });
    }

    Ok(())
}

/// Set a mark at the cursor.
pub fn set_mark(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    if let Some(name) = captured_char(ctx) {
        ctx.state.marks.insert(name, ctx.cursor.stop);
    }

    Ok(())
}

fn toggle_visual(ctx: &mut CommandContext<'_>, mode: Mode) {
    if ctx.state.mode == mode {
        ctx.set_mode(Mode::Normal);
    } else {
        ctx.set_mode(mode);
    }
}

/// Toggle character-wise Visual mode.
pub fn visual(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    toggle_visual(ctx, Mode::Visual);

    Ok(())
}

/// Toggle line-wise Visual mode.
pub fn visual_line(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    toggle_visual(ctx, Mode::VisualLine);

    Ok(())
}

/// Toggle block-wise Visual mode.
pub fn visual_block(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    toggle_visual(ctx, Mode::VisualBlock);

    Ok(())
}

fn search(ctx: &mut CommandContext<'_>, forward: bool) -> EditResult<()> {
    let prompt = if forward { "/" } else { "?" };
    let text = ctx.prompt.read_line(prompt)?;

    if text.is_empty() {
        return Ok(());
    }

    let needle = Regex::new(&text)?;
    let visual = ctx.state.mode.is_visual();
    let mut cursors = ctx.state.cursors.clone();

    for cursor in cursors.iter_mut() {
        match find_text(ctx.buffer, cursor.stop, &needle, forward, 1) {
            Some(pos) if visual => *cursor = cursor.with_stop(pos),
            Some(pos) => *cursor = Cursor::at(pos),
            None => ctx.state.last_movement_failed = true,
        }
    }

    ctx.state.search = Some(SearchState { needle, forward });

    if let Some(first) = cursors.first() {
        ctx.state.last_jump = Some(ctx.cursor.stop);
        ctx.cursor = *first;
    }

    ctx.state.cursors = cursors;

    Ok(())
}

/// Prompt for a pattern, and move to its next match.
pub fn search_forward(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    search(ctx, true)
}

/// Prompt for a pattern, and move to its previous match.
pub fn search_backward(ctx: &mut CommandContext<'_>) -> EditResult<()> {
    search(ctx, false)
}
