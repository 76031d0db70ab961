//! # Keystroke engine
//!
//! ## Overview
//!
//! An [Engine] owns an editing session. The host feeds it one key at a time through
//! [Engine::handle_key], and each key is processed to completion before the call returns:
//!
//! 1. User remaps rewrite the key, or hold it back while a longer remap might still match.
//! 2. The key is appended to the command being composed, and the typed keys are resolved
//!    against the [ActionTable] for the current mode.
//! 3. A resolved movement runs from every cursor. A resolved operator becomes pending, and runs
//!    on every cursor once it has its range. Other commands run per cursor, or once.
//! 4. The text transformations produced by every cursor are applied as a single edit.
//! 5. When the command is complete it is cleared, and when it leaves the session in Normal mode
//!    it becomes the command repeated by `.` and closes the current undo group.
//!
//! ## Example
//!
//! ```
//! use modal_engine::prelude::*;
//!
//! let mut engine = Engine::new(RopeBuffer::new("hello world"), EngineConfig::default());
//!
//! engine.handle_keys("dw").unwrap();
//! assert_eq!(engine.buffer().contents(), "world");
//!
//! engine.handle_keys("ihey <Esc>").unwrap();
//! assert_eq!(engine.buffer().contents(), "hey world");
//! assert_eq!(engine.mode(), Mode::Normal);
//! ```
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::KeyEvent;
use tracing::{debug, trace, warn};

use editor_types::prelude::*;
use keybindings::{normalize_key, parse_keys, RemapTable, Remapper, Resolution};

use crate::action::{
    Action,
    ActionDef,
    ActionFlags,
    ActionTable,
    Behavior,
    CommandContext,
    CommandFn,
    GuardContext,
    MotionContext,
    MovementBehavior,
    OperatorContext,
};
use crate::buffer::{RopeBuffer, TextBuffer};
use crate::commands::STOP_RECORDING;
use crate::config::{remap_mode, EngineConfig};
use crate::errors::EditResult;
use crate::key::TerminalKey;
use crate::bindings::default_actions;
use crate::motion::{execute, repeat_char_search};
use crate::operator::target_ranges;
use crate::prompt::{NoPrompt, Prompt};
use crate::repeat::{DotSnapshot, VisualExtent};
use crate::state::{RecordedState, RegisterCell, RegisterPutFlags, RegisterWrite, VimState};
use crate::transform::{apply_text_transformations, Transformation};

/// What running an action did to the command being composed.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Outcome {
    /// A command or an operator ran.
    ran_action: bool,

    /// What ran can be repeated with `.`.
    repeatable: bool,
}

/// A modal editing session over a host buffer.
pub struct Engine<B: TextBuffer = RopeBuffer> {
    pub(crate) buffer: B,
    pub(crate) state: VimState,
    pub(crate) config: EngineConfig,
    actions: ActionTable,
    leader: String,
    remaps: RemapTable<Mode>,
    remapper: Remapper,
    prompt: Box<dyn Prompt>,
    selection_sync: Option<Vec<Cursor>>,
}

impl<B: TextBuffer> Engine<B> {
    /// Start a session over `buffer`, with the default actions.
    ///
    /// The cursors are taken from the buffer's selections. Remaps that can't be parsed are
    /// logged and skipped.
    pub fn new(buffer: B, config: EngineConfig) -> Self {
        let state = VimState::new(&buffer);
        let leader = config.leader();
        let remaps = config.remap_table();
        let remapper = Remapper::new(config.timeout());

        Engine {
            buffer,
            state,
            config,
            actions: default_actions(),
            leader,
            remaps,
            remapper,
            prompt: Box::new(NoPrompt),
            selection_sync: None,
        }
    }

    /// Use `prompt` for commands that read a line of input.
    pub fn with_prompt<P: Prompt + 'static>(mut self, prompt: P) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Replace the action table.
    pub fn with_actions(mut self, actions: ActionTable) -> Self {
        self.actions = actions;
        self
    }

    /// Register an extra action. Actions registered earlier win when both match.
    pub fn register(&mut self, def: ActionDef) -> Arc<ActionDef> {
        self.actions.register(def)
    }

    /// The action table.
    pub fn actions_mut(&mut self) -> &mut ActionTable {
        &mut self.actions
    }

    /// The buffer being edited.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// The session state.
    pub fn state(&self) -> &VimState {
        &self.state
    }

    /// The active mode.
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// The cursors, in document order.
    pub fn cursors(&self) -> &[Cursor] {
        &self.state.cursors
    }

    /// Whether a macro is being recorded.
    pub fn is_recording(&self) -> bool {
        self.state.recording.is_some()
    }

    /// The text to show for the current mode in a status line.
    pub fn show_mode(&self) -> Option<String> {
        let recording = self.state.recording_register().map(|r| format!("recording @{r}"));

        match (self.state.mode.show(), recording) {
            (Some(mode), Some(rec)) => Some(format!("{mode}{rec}")),
            (Some(mode), None) => Some(mode.to_string()),
            (None, rec) => rec,
        }
    }

    /// The keys typed so far for the command being composed.
    pub fn show_command(&self) -> String {
        let mut shown = self.state.recorded.command_string(&self.leader);

        for key in self.remapper.pending() {
            if *key == self.leader {
                shown.push_str(keybindings::LEADER);
            } else {
                shown.push_str(key);
            }
        }

        return shown;
    }

    /// Replace the cursors with the host's selections before the next key is processed.
    ///
    /// Only the latest selections are kept, if several arrive between keys.
    pub fn queue_selection_sync(&mut self, selections: Vec<Cursor>) {
        self.selection_sync = Some(selections);
    }

    fn drain_selection_sync(&mut self) {
        let Some(selections) = self.selection_sync.take() else {
            return;
        };

        let selections = normalize_cursors(selections);

        if selections.is_empty() {
            return;
        }

        let selecting = selections.iter().any(|c| !c.is_empty());

        match self.state.mode {
            Mode::Normal if selecting => {
                debug!("host selection; entering Visual mode");
                self.state.mode = Mode::Visual;
            },
            mode if mode.is_visual() && !selecting => {
                self.state.mode = Mode::Normal;
            },
            _ => {},
        }

        self.state.cursors = selections;
    }

    fn resolution_mode(&self) -> Mode {
        if self.state.mode == Mode::Normal && self.state.recorded.operator_pending() {
            Mode::OperatorPending
        } else {
            self.state.mode
        }
    }

    /// Process a key press, returning whether it was consumed.
    ///
    /// Keys are written in the notation of [keybindings::notation], such as `"x"` or `"<C-r>"`.
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.handle_key_at(key, Instant::now())
    }

    /// Process a key press that happened at `now`.
    pub fn handle_key_at(&mut self, key: &str, now: Instant) -> bool {
        self.drain_selection_sync();

        let mode = remap_mode(self.resolution_mode());
        let keys = self.remapper.feed(&self.remaps, mode, normalize_key(key), now);

        if keys.is_empty() {
            trace!(key, "holding key for remap");
            return true;
        }

        let mut applied = false;

        for key in keys {
            applied = self.dispatch_key(&key) || applied;
        }

        return applied;
    }

    /// Dispatch keys held back for a remap, if they have waited longer than the timeout.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        let mut applied = false;

        for key in self.remapper.expire(now) {
            applied = self.dispatch_key(&key) || applied;
        }

        return applied;
    }

    /// Process every key in a string of key notation, such as `"d2w"` or `"ihi<Esc>"`.
    pub fn handle_keys(&mut self, keys: &str) -> EditResult<()> {
        for key in parse_keys(keys)? {
            self.handle_key(&key);
        }

        Ok(())
    }

    /// Process a terminal key event.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        match TerminalKey::from(*event).notation() {
            Some(key) => self.handle_key(&key),
            None => false,
        }
    }

    fn dispatch_key(&mut self, key: &str) -> bool {
        trace!(key, mode = ?self.state.mode, "dispatching key");

        self.state.last_movement_failed = false;

        let applied = match self.process_key(key) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(key, error = %e, "discarding keystroke");

                self.state.recorded = RecordedState::default();
                self.state.replaying_dot = false;
                self.state.macro_depth = 0;
                self.normalize_cursors();

                false
            },
        };

        self.buffer.set_selections(&self.state.cursors);

        return applied;
    }

    pub(crate) fn process_key(&mut self, key: &str) -> EditResult<bool> {
        if self.state.macro_depth == 0 {
            if let Some(recording) = self.state.recording.as_mut() {
                recording.keys.push(key.to_string());
            }
        }

        let recorded = &mut self.state.recorded;
        recorded.command_list.push(key.to_string());
        recorded.action_keys.push(key.to_string());

        let mode = self.resolution_mode();
        let resolved = {
            let keys = &self.state.recorded.action_keys;
            let ctx = GuardContext { state: &self.state, config: &self.config, keys };

            match self.actions.resolve(mode, keys, &self.leader, &ctx) {
                Resolution::Matched(def) => Some(def.clone()),
                Resolution::Waiting => return Ok(true),
                Resolution::NoMatch => None,
            }
        };

        let Some(def) = resolved else {
            debug!(keys = ?self.state.recorded.action_keys, ?mode, "no matching action");

            if self.state.mode.is_insert() {
                self.state.recorded.finish_composition();
            } else {
                self.state.recorded = RecordedState::default();
            }

            return Ok(false);
        };

        let keys = std::mem::take(&mut self.state.recorded.action_keys);
        let action = Action::new(def, keys, &self.leader);
        debug!(action = action.name(), "resolved action");

        self.handle_action(action)?;

        Ok(true)
    }

    pub(crate) fn handle_action(&mut self, action: Action) -> EditResult<()> {
        if self.state.macro_depth == 0 {
            if let Some(recording) = self.state.recording.as_mut() {
                if action.name() == STOP_RECORDING {
                    recording.keys.pop();
                } else {
                    recording.actions.push(action.clone());
                }
            }
        }

        let outcome = self.run_action(action)?;
        self.coordinate(outcome);

        Ok(())
    }

    pub(crate) fn run_action(&mut self, action: Action) -> EditResult<Outcome> {
        let was_pending = self.state.recorded.operator_pending();

        if was_pending && action.is_operator() {
            let pending = self.state.recorded.operator().map(Action::name);

            if pending != Some(action.name()) {
                debug!(?pending, operator = action.name(), "mismatched operators; cancelling");
                self.state.recorded = RecordedState::default();
                return Ok(Outcome::default());
            }
        }

        self.state.recorded.actions_run.push(action.clone());

        let mut outcome = Outcome::default();
        let mut motion_failed = false;

        match action.behavior() {
            Behavior::Movement(_) => {
                motion_failed = !self.execute_movement(&action);
                outcome.ran_action = !was_pending;
            },
            Behavior::Command(run) => {
                self.execute_command(&action, run)?;
                outcome.ran_action = !action.flags().contains(ActionFlags::PARTIAL);
                outcome.repeatable = action.flags().contains(ActionFlags::DOT_REPEAT);
            },
            Behavior::Operator(_) => {
                if !was_pending {
                    self.state.recorded.start_operator();
                }
            },
        }

        if self.state.recorded.operator_ready_to_execute(self.state.mode) {
            if motion_failed {
                debug!("movement failed; abandoning operator");
                self.state.recorded = RecordedState::default();
                return Ok(Outcome::default());
            }

            if let Some(op) = self.state.recorded.operator().cloned() {
                self.execute_operator(&op)?;
                self.state.recorded.has_run_operator = true;
                outcome.ran_action = true;
                outcome.repeatable = op.flags().contains(ActionFlags::DOT_REPEAT);
            }
        }

        self.flush_register_writes();

        let transformations = std::mem::take(&mut self.state.recorded.transformations);
        self.execute_transformations(transformations)?;

        Ok(outcome)
    }

    pub(crate) fn coordinate(&mut self, outcome: Outcome) {
        let mode = self.state.mode;
        let complete = outcome.ran_action && (mode == Mode::Normal || mode.is_visual());
        let repeatable = outcome.repeatable && mode == Mode::Normal;

        if repeatable && !self.state.replaying_dot {
            let recorded = &mut self.state.recorded;
            let snapshot = DotSnapshot {
                actions: recorded.actions_run.clone(),
                visual_extent: recorded.visual_extent.take(),
            };

            debug!(actions = snapshot.actions.len(), "updated repeatable command");
            self.state.previous_full_action = Some(snapshot);
        }

        if complete {
            trace!(command = ?self.state.recorded.command_list, "command complete");
            self.state.recorded = RecordedState::default();
        } else if outcome.ran_action && mode.is_insert() {
            self.state.recorded.finish_composition();
        }

        if repeatable {
            self.buffer.close_undo_group();
        }

        self.normalize_cursors();
    }

    fn normalize_cursors(&mut self) {
        let cursors = std::mem::take(&mut self.state.cursors);
        let buffer = &self.buffer;
        let cursors = cursors
            .into_iter()
            .map(|c| Cursor::new(buffer.clamp(c.start), buffer.clamp(c.stop)))
            .collect();

        self.state.cursors = normalize_cursors(cursors);

        if self.state.cursors.is_empty() {
            self.state.cursors.push(Cursor::default());
        }
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        let old = self.state.mode;

        if old == mode {
            return;
        }

        debug!(from = ?old, to = ?mode, "switching mode");

        if old.is_visual() && !mode.is_visual() {
            for cursor in self.state.cursors.iter_mut() {
                *cursor = cursor.collapse();
            }
        }

        self.state.mode = mode;
    }

    /// Run a movement from every cursor, returning whether it succeeded everywhere.
    fn execute_movement(&mut self, action: &Action) -> bool {
        let operator_pending = self.state.recorded.operator_pending();
        let operator = if operator_pending {
            self.state.recorded.operator().map(Action::name)
        } else {
            None
        };
        let count = self.state.recorded.take_motion_count(operator_pending);

        let (movement, is_repeat) = match action.behavior() {
            Behavior::Movement(MovementBehavior::RepeatCharSearch { reverse }) => {
                let last = self.state.last_char_search.clone();
                let movement = match (last, reverse) {
                    (Some(last), true) => self.actions.inverse(&last),
                    (last, _) => last,
                };

                match movement {
                    Some(movement) => (movement, true),
                    None => {
                        self.state.last_movement_failed = true;
                        return false;
                    },
                }
            },
            _ => (action.clone(), false),
        };

        let mode = self.state.mode;
        let bounds = self.config.count_bounds();
        let mut cursors = Vec::with_capacity(self.state.cursors.len());
        let mut failed = false;

        for cursor in self.state.cursors.iter() {
            let ctx = MotionContext {
                buffer: &self.buffer,
                action: &movement,
                cursor: *cursor,
                mode,
                operator_pending,
                operator,
                is_repeat,
                search: self.state.search.as_ref(),
                marks: &self.state.marks,
                last_jump: self.state.last_jump,
            };

            let result = if is_repeat {
                repeat_char_search(&ctx, cursor.stop, count, bounds)
            } else {
                execute(&ctx, cursor.stop, count, bounds)
            };

            if result.is_failed() {
                failed = true;
                cursors.push(*cursor);
                continue;
            }

            let moved = match result {
                MovementResult::Position(pos) if mode.is_visual() => cursor.with_stop(pos),
                MovementResult::Position(pos) if operator_pending => Cursor::new(cursor.stop, pos),
                MovementResult::Position(pos) => Cursor::at(pos),
                MovementResult::Range(range) if mode.is_visual() => {
                    let stop = self.buffer.left_through_line_breaks(range.stop).max(range.start);

                    Cursor::new(range.start, stop)
                },
                MovementResult::Range(range) if operator_pending => Cursor::new(range.start, range.stop),
                MovementResult::Range(range) => Cursor::at(range.stop),
            };

            cursors.push(moved);
        }

        if failed {
            self.state.last_movement_failed = true;

            if operator_pending {
                return false;
            }
        }

        let flags = movement.flags();

        if action.flags().contains(ActionFlags::JUMP) && !failed {
            self.state.last_jump = self.state.cursors.first().map(|c| c.stop);
        }

        if operator_pending && flags.contains(ActionFlags::LINEWISE) {
            self.state.recorded.shape = Some(TargetShape::LineWise);
        }

        if flags.contains(ActionFlags::CHAR_SEARCH) && !is_repeat && !failed {
            self.state.last_char_search = Some(movement);
        }

        self.state.cursors = cursors;

        return !failed;
    }

    fn execute_operator(&mut self, op: &Action) -> EditResult<()> {
        let Behavior::Operator(run) = op.behavior() else {
            return Ok(());
        };

        let mode = self.state.mode;
        let doubled = self.state.recorded.is_doubled_operator();
        let shape = if doubled || mode == Mode::VisualLine {
            TargetShape::LineWise
        } else if mode == Mode::VisualBlock {
            TargetShape::BlockWise
        } else {
            self.state.recorded.shape.unwrap_or_default()
        };
        let lines = if doubled {
            self.state.recorded.take_motion_count(true).clamp(1, self.config.count_bounds().1)
        } else {
            0
        };

        if mode.is_visual() {
            let extent = self.state.cursors.first().map(|c| VisualExtent::of(mode, c));
            self.state.recorded.visual_extent = extent;
        }

        let mut transformations = vec![];
        let mut writes = vec![];
        let mut cursors = Vec::with_capacity(self.state.cursors.len());
        let mut next_mode = None;

        let mut targets: Vec<(Cursor, Position, Position)> = Vec::with_capacity(self.state.cursors.len());

        for cursor in self.state.cursors.iter() {
            let (start, stop) = if doubled {
                let line = cursor.stop.line;

                (Position::new(line, 0), Position::new(line.saturating_add(lines - 1), 0))
            } else {
                let (start, end) = cursor.sorted();

                if mode == Mode::Visual {
                    (start, self.buffer.right_through_line_breaks(end))
                } else {
                    (start, end)
                }
            };

            // Touching line-wise targets become one, so their edits never overlap.
            let touching = shape == TargetShape::LineWise &&
                targets.last().map_or(false, |(_, _, last)| start.line <= last.line.saturating_add(1));

            if let Some((_, first, last)) = targets.last_mut().filter(|_| touching) {
                *first = (*first).min(start);
                *last = (*last).max(stop);
            } else {
                targets.push((*cursor, start, stop));
            }
        }

        for (idx, (cursor, start, stop)) in targets.into_iter().enumerate() {
            let origin = if mode.is_visual() { cursor } else { Cursor::at(cursor.start) };
            let ctx = OperatorContext { buffer: &self.buffer, shape, mode, cursor: origin };
            let mut texts = vec![];
            let mut deleted = false;
            let mut moved = None;

            for (s, e) in target_ranges(&self.buffer, shape, start, stop) {
                let out = run(&ctx, s, e)?;

                transformations.extend(out.transformations.into_iter().map(|t| t.with_cursor(idx)));
                moved = moved.or(out.cursor);
                next_mode = out.mode.or(next_mode);
                deleted |= out.deleted;
                texts.extend(out.register_text);
            }

            if !texts.is_empty() {
                writes.push(RegisterWrite { cursor_index: idx, shape, text: texts.join("\n"), deleted });
            }

            cursors.push(moved.unwrap_or(Cursor::at(start)));
        }

        debug!(operator = op.name(), ?shape, edits = transformations.len(), "running operator");

        let recorded = &mut self.state.recorded;
        recorded.register_writes.extend(writes);
        recorded.transformations.extend(transformations.into_iter().map(Transformation::Text));

        self.set_mode(next_mode.unwrap_or(Mode::Normal));
        self.state.cursors = cursors;

        Ok(())
    }

    fn execute_command(&mut self, action: &Action, run: CommandFn) -> EditResult<()> {
        let flags = action.flags();
        let count = if flags.contains(ActionFlags::PARTIAL) {
            0
        } else {
            self.state.recorded.take_count().min(self.config.count_bounds().1)
        };
        let repeats = if flags.contains(ActionFlags::COUNT_REPEATS) {
            count.max(1)
        } else {
            1
        };

        let mut next_mode = None;

        for _ in 0..repeats {
            if flags.contains(ActionFlags::ONCE) {
                let cursor = self.state.cursors.first().copied().unwrap_or_default();
                let mut ctx = CommandContext {
                    buffer: &self.buffer,
                    state: &mut self.state,
                    config: &self.config,
                    prompt: self.prompt.as_mut(),
                    action,
                    cursor,
                    cursor_index: 0,
                    count,
                    mode: None,
                };

                run(&mut ctx)?;

                let (cursor, mode) = (ctx.cursor, ctx.mode);
                next_mode = mode.or(next_mode);

                match self.state.cursors.first_mut() {
                    Some(first) => *first = cursor,
                    None => self.state.cursors.push(cursor),
                }
            } else {
                let before = self.state.cursors.clone();
                let mut cursors = Vec::with_capacity(before.len());

                for (idx, cursor) in before.into_iter().enumerate() {
                    let mut ctx = CommandContext {
                        buffer: &self.buffer,
                        state: &mut self.state,
                        config: &self.config,
                        prompt: self.prompt.as_mut(),
                        action,
                        cursor,
                        cursor_index: idx,
                        count,
                        mode: None,
                    };

                    run(&mut ctx)?;

                    next_mode = ctx.mode.or(next_mode);
                    cursors.push(ctx.cursor);
                }

                self.state.cursors = cursors;
            }
        }

        if let Some(mode) = next_mode {
            self.set_mode(mode);
        }

        Ok(())
    }

    fn flush_register_writes(&mut self) {
        let mut writes = std::mem::take(&mut self.state.recorded.register_writes);

        if writes.is_empty() {
            return;
        }

        writes.sort_by_key(|w| w.cursor_index);

        let (register, append) = self.state.recorded.register();
        let shape = writes[0].shape;
        let mut flags = RegisterPutFlags::NONE;

        if writes.iter().any(|w| w.deleted) {
            flags |= RegisterPutFlags::DELETE;
        }

        if append {
            flags |= RegisterPutFlags::APPEND;
        }

        let values = writes.into_iter().map(|w| w.text).collect();
        self.state.registers.put(&register, RegisterCell::new(shape, values), flags);
    }

    fn apply_text(&mut self, transformations: Vec<TextTransformation>) -> EditResult<()> {
        if transformations.is_empty() {
            return Ok(());
        }

        let cursors =
            apply_text_transformations(&mut self.buffer, &self.state.cursors, &transformations)?;
        self.state.cursors = cursors;

        Ok(())
    }

    fn execute_transformations(&mut self, transformations: Vec<Transformation>) -> EditResult<()> {
        let mut text = vec![];
        let mut dot_failed = false;
        let mut macro_failed = false;

        for transformation in transformations {
            match transformation {
                Transformation::Text(t) => {
                    text.push(t);
                    continue;
                },
                other => {
                    self.apply_text(std::mem::take(&mut text))?;

                    match other {
                        Transformation::Dot if !dot_failed => {
                            dot_failed = !self.replay_dot()?;
                        },
                        Transformation::Macro { register } if !macro_failed => {
                            macro_failed = !self.replay_macro(register)?;
                        },
                        Transformation::Undo => {
                            if let Some(pos) = self.buffer.undo()? {
                                self.state.cursors = vec![Cursor::at(pos)];
                            }
                        },
                        Transformation::Redo => {
                            if let Some(pos) = self.buffer.redo()? {
                                self.state.cursors = vec![Cursor::at(pos)];
                            }
                        },
                        _ => {},
                    }
                },
            }
        }

        self.apply_text(text)
    }
}
