//! # Session state
//!
//! ## Overview
//!
//! [VimState] is everything an editing session remembers between keystrokes: the active mode,
//! the cursors, the command being composed ([RecordedState]), the registers, and what the repeat
//! commands (`.`, `;`, `,`, `@`) need to replay.
//!
//! The state is owned by a single [Engine](crate::Engine), and is only ever mutated while it
//! processes a keystroke.
use std::collections::HashMap;

use editor_types::prelude::*;
use regex::Regex;

use crate::action::Action;
use crate::buffer::TextBuffer;
use crate::repeat::{DotSnapshot, MacroRecording};

mod recorded;
mod register;

pub(crate) use self::recorded::RegisterWrite;
pub use self::recorded::RecordedState;
pub use self::register::{RegisterCell, RegisterContent, RegisterPutFlags, RegisterStore};

/// The last search made with `/` or `?`.
#[derive(Clone, Debug)]
pub struct SearchState {
    /// The compiled pattern searched for.
    pub needle: Regex,

    /// Whether the search went towards the end of the buffer.
    pub forward: bool,
}

/// The state of an editing session.
#[derive(Debug)]
pub struct VimState {
    pub(crate) mode: Mode,
    pub(crate) cursors: Vec<Cursor>,
    pub(crate) recorded: RecordedState,
    pub(crate) registers: RegisterStore,

    /// The last movement from the character-search family.
    pub(crate) last_char_search: Option<Action>,

    /// The last repeatable command.
    pub(crate) previous_full_action: Option<DotSnapshot>,

    /// The macro currently being recorded.
    pub(crate) recording: Option<MacroRecording>,

    /// The register most recently replayed with `@`.
    pub(crate) last_macro: Option<char>,

    pub(crate) marks: HashMap<char, Position>,
    pub(crate) last_jump: Option<Position>,
    pub(crate) search: Option<SearchState>,

    /// Whether a movement failed since this was last reset.
    pub(crate) last_movement_failed: bool,

    /// Set while replaying the dot-repeat snapshot.
    pub(crate) replaying_dot: bool,

    /// How many macro replays are currently nested.
    pub(crate) macro_depth: usize,
}

impl VimState {
    /// Create a new session, taking its cursors from the host's selections.
    pub fn new(buffer: &dyn TextBuffer) -> Self {
        let mut cursors = normalize_cursors(buffer.selections());

        if cursors.is_empty() {
            cursors.push(Cursor::default());
        }

        VimState {
            mode: Mode::Normal,
            cursors,
            recorded: RecordedState::default(),
            registers: RegisterStore::default(),
            last_char_search: None,
            previous_full_action: None,
            recording: None,
            last_macro: None,
            marks: HashMap::new(),
            last_jump: None,
            search: None,
            last_movement_failed: false,
            replaying_dot: false,
            macro_depth: 0,
        }
    }

    /// The active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The cursors, in document order. Never empty.
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// The command being composed.
    pub fn recorded(&self) -> &RecordedState {
        &self.recorded
    }

    /// The registers.
    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    /// The register a macro is being recorded into.
    pub fn recording_register(&self) -> Option<char> {
        self.recording.as_ref().map(|r| r.register)
    }

    /// The position of a mark.
    pub fn mark(&self, name: char) -> Option<Position> {
        self.marks.get(&name).copied()
    }

    /// The last movement that `;` and `,` repeat.
    pub fn last_char_search(&self) -> Option<&Action> {
        self.last_char_search.as_ref()
    }

    /// The command that `.` repeats.
    pub fn previous_full_action(&self) -> Option<&DotSnapshot> {
        self.previous_full_action.as_ref()
    }

    /// The last search made with `/` or `?`.
    pub fn search(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }
}
