//! # Repeating commands
//!
//! ## Overview
//!
//! Completed commands can be replayed in three ways:
//!
//! - `.` replays the last repeatable command. Its actions are kept in a [DotSnapshot], and are
//!   rerun against a fresh [RecordedState](crate::state::RecordedState). When the command ran on
//!   a Visual selection, the snapshot also keeps the selection's extent, and the replay selects
//!   the same extent from the cursor first.
//! - `;` and `,` rerun the last character search, or its inverse.
//! - `q` records a macro into a register, and `@` replays it. Macros keep both the keys typed
//!   and the actions they resolved to, and the engine can replay either.
//!
//! Replays stop as soon as a movement fails.
use editor_types::prelude::*;
use keybindings::parse_keys;
use tracing::debug;

use crate::action::Action;
use crate::buffer::TextBuffer;
use crate::config::MacroReplay;
use crate::engine::Engine;
use crate::errors::{EditError, EditResult};
use crate::state::RegisterContent;

/// How deeply macro replays may nest before they are assumed to loop forever.
pub const MAX_MACRO_DEPTH: usize = 100;

/// The size of a Visual selection, relative to its first position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VisualExtent {
    /// The Visual mode the selection was made in.
    pub mode: Mode,

    /// How many lines the selection extends below its first line.
    pub lines: usize,

    /// For a selection within one line, the number of characters after the first one. For
    /// anything longer, the column the selection ends on.
    pub columns: usize,
}

impl VisualExtent {
    /// Measure a selection.
    pub fn of(mode: Mode, cursor: &Cursor) -> Self {
        let (start, end) = cursor.sorted();
        let lines = end.line - start.line;
        let columns = if lines == 0 {
            end.character - start.character
        } else {
            end.character
        };

        VisualExtent { mode, lines, columns }
    }

    /// Select the same extent, starting from `pos`.
    pub fn select_from(&self, buffer: &dyn TextBuffer, pos: Position) -> Cursor {
        let stop = if self.lines == 0 {
            pos.with_character(pos.character + self.columns)
        } else {
            Position::new(pos.line + self.lines, self.columns)
        };

        Cursor::new(pos, buffer.clamp(stop))
    }
}

/// The command replayed by `.`.
#[derive(Clone, Debug)]
pub struct DotSnapshot {
    /// Every action the command ran.
    pub actions: Vec<Action>,

    /// The selection the command ran on, if it ran in a Visual mode.
    pub visual_extent: Option<VisualExtent>,
}

/// A recorded macro.
#[derive(Clone, Debug, Default)]
pub struct RecordedMacro {
    /// The actions the typed keys resolved to.
    pub actions: Vec<Action>,

    /// The keys typed.
    pub keys: Vec<String>,
}

impl RecordedMacro {
    /// Add another recording to the end of this one.
    pub fn append(&mut self, other: RecordedMacro) {
        self.actions.extend(other.actions);
        self.keys.extend(other.keys);
    }
}

/// A macro being recorded.
#[derive(Clone, Debug)]
pub struct MacroRecording {
    /// The register the macro will be stored in.
    pub register: char,

    /// Whether the macro will be appended to the register's contents.
    pub append: bool,

    pub(crate) actions: Vec<Action>,
    pub(crate) keys: Vec<String>,
}

impl MacroRecording {
    /// Start recording into `register`.
    pub fn new(register: char, append: bool) -> Self {
        MacroRecording { register, append, actions: vec![], keys: vec![] }
    }

    /// Finish recording.
    pub fn finish(self) -> (char, bool, RecordedMacro) {
        let recorded = RecordedMacro { actions: self.actions, keys: self.keys };

        (self.register, self.append, recorded)
    }
}

enum Replay {
    Keys(Vec<String>),
    Actions(Vec<Action>),
}

impl<B: TextBuffer> Engine<B> {
    /// Replay the last repeatable command, returning whether it ran without a movement failing.
    pub(crate) fn replay_dot(&mut self) -> EditResult<bool> {
        let Some(snapshot) = self.state.previous_full_action.clone() else {
            return Ok(true);
        };

        debug!(actions = snapshot.actions.len(), "repeating last change");

        let outer = std::mem::take(&mut self.state.recorded);
        self.state.replaying_dot = true;
        self.state.last_movement_failed = false;

        if let Some(extent) = snapshot.visual_extent {
            let cursors = self
                .state
                .cursors
                .iter()
                .map(|c| extent.select_from(&self.buffer, c.stop))
                .collect();

            self.state.cursors = cursors;
            self.state.mode = extent.mode;
        }

        let mut ok = true;

        for action in snapshot.actions {
            let outcome = self.run_action(action)?;
            self.coordinate(outcome);

            if self.state.last_movement_failed {
                debug!("movement failed; abandoning repeat");
                ok = false;
                break;
            }
        }

        if !ok && self.state.mode != Mode::Normal {
            self.set_mode(Mode::Normal);
        }

        self.state.replaying_dot = false;
        self.state.recorded = outer;
        self.buffer.close_undo_group();

        Ok(ok)
    }

    /// Replay the macro in `register`, returning whether it ran without a movement failing.
    pub(crate) fn replay_macro(&mut self, register: char) -> EditResult<bool> {
        if self.state.macro_depth >= MAX_MACRO_DEPTH {
            return Err(EditError::LoopingMacro(self.state.macro_depth));
        }

        let replay = match self.state.registers.get_macro(register) {
            Some(RegisterContent::Macro(recorded)) => {
                match self.config.macro_replay {
                    MacroReplay::Keys => Replay::Keys(recorded.keys),
                    MacroReplay::Actions => Replay::Actions(recorded.actions),
                }
            },
            Some(RegisterContent::Text(cell)) => Replay::Keys(parse_keys(&cell.text())?),
            None => return Ok(true),
        };

        debug!(register = %register, depth = self.state.macro_depth, "replaying macro");

        let outer = std::mem::take(&mut self.state.recorded);
        self.state.macro_depth += 1;
        self.state.last_movement_failed = false;

        let mut ok = true;

        match replay {
            Replay::Keys(keys) => {
                for key in keys {
                    self.process_key(&key)?;

                    if self.state.last_movement_failed {
                        ok = false;
                        break;
                    }
                }
            },
            Replay::Actions(actions) => {
                for action in actions {
                    self.handle_action(action)?;

                    if self.state.last_movement_failed {
                        ok = false;
                        break;
                    }
                }
            },
        }

        self.state.macro_depth -= 1;
        self.state.recorded = outer;

        Ok(ok)
    }
}
