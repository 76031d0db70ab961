//! # Actions
//!
//! ## Overview
//!
//! An [ActionDef] describes one bindable unit of behaviour: its name, the [Pattern] that
//! triggers it, the modes it is eligible in, its [ActionFlags], an optional guard, and its
//! [Behavior]. Behaviours come in three kinds:
//!
//! - [Behavior::Movement] computes a new position or range from a starting position.
//! - [Behavior::Operator] turns a range into text transformations.
//! - [Behavior::Command] performs any other side effect, like switching modes or pasting.
//!
//! When a key buffer resolves to a definition, it is instantiated as an [Action], which keeps
//! the keys that were pressed and the keys captured by the pattern's wildcards (such as the
//! character searched for by `f`).
//!
//! Definitions are stored in an [ActionTable], which also knows which character-search actions
//! are the inverses of each other, so that `,` can reverse the last `f`, `F`, `t` or `T`.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use editor_types::prelude::*;
use keybindings::{ActionRegistry, Binding, Pattern, Resolution};

use crate::buffer::TextBuffer;
use crate::config::EngineConfig;
use crate::errors::EditResult;
use crate::prompt::Prompt;
use crate::state::{RegisterWrite, SearchState, VimState};
use crate::transform::Transformation;

bitflags! {
    /// Capabilities of an [ActionDef].
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ActionFlags: u32 {
        /// No flags set.
        const NONE = 0b0000000000;

        /// The action is a movement.
        const MOTION = 0b0000000001;

        /// The action is an operator.
        const OPERATOR = 0b0000000010;

        /// The position before this movement is remembered as the last jump.
        const JUMP = 0b0000000100;

        /// Completing this action updates the dot-repeat snapshot.
        const DOT_REPEAT = 0b0000001000;

        /// The action is only eligible as the first key of a command.
        const FIRST_KEY = 0b0000010000;

        /// The action only contributes to the command being composed (counts, registers).
        const PARTIAL = 0b0000100000;

        /// The command runs once, instead of once per cursor.
        const ONCE = 0b0001000000;

        /// The command runs once for each time the count specifies.
        const COUNT_REPEATS = 0b0010000000;

        /// Under an operator, this movement makes the operator line-wise.
        const LINEWISE = 0b0100000000;

        /// The movement belongs to the family repeated by `;` and `,`.
        const CHAR_SEARCH = 0b1000000000;
    }
}

/// Which iteration of a counted movement is being computed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Iteration {
    /// Whether this is the first iteration.
    pub first: bool,

    /// Whether this is the last iteration.
    pub last: bool,
}

/// How a movement repeated by a count combines the ranges it produces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SelectionType {
    /// Keep the start of the first range, and extend to the stop of the last.
    #[default]
    Concatenating,

    /// Each iteration computes its own range from scratch.
    Expanding,
}

/// A single step of a movement.
pub type StepFn = fn(&MotionContext<'_>, Position, Iteration) -> MovementResult;

/// A movement that interprets the count itself. The count is 0 when none was typed.
pub type CountedFn = fn(&MotionContext<'_>, Position, usize) -> MovementResult;

/// The body of an operator, applied to a half-open range.
pub type OperatorFn = fn(&OperatorContext<'_>, Position, Position) -> EditResult<OperatorOutput>;

/// The body of a command.
pub type CommandFn = fn(&mut CommandContext<'_>) -> EditResult<()>;

/// An extra eligibility check run after an action's pattern matches.
pub type GuardFn = fn(&GuardContext<'_>) -> bool;

/// How a movement computes its result.
#[derive(Clone, Copy)]
pub enum MovementBehavior {
    /// Run `step` once per count, chaining each result into the next iteration.
    Step {
        /// The step used normally.
        step: StepFn,

        /// The step used on the final iteration while an operator is pending.
        operator_step: Option<StepFn>,

        /// How repeated ranges are combined.
        selection: SelectionType,
    },

    /// Run once, with the count as an argument.
    Counted {
        /// The movement used normally.
        run: CountedFn,

        /// The movement used while an operator is pending.
        operator_run: Option<CountedFn>,
    },

    /// Repeat the last character search, reversed when `reverse` is set.
    RepeatCharSearch {
        /// Whether to run the inverse of the last search.
        reverse: bool,
    },
}

/// What an action does once it resolves.
#[derive(Clone, Copy)]
pub enum Behavior {
    /// Compute a new position or range.
    Movement(MovementBehavior),

    /// Transform the text in a range.
    Operator(OperatorFn),

    /// Any other side effect.
    Command(CommandFn),
}

/// A bindable action.
pub struct ActionDef {
    /// A unique name for this action.
    pub name: &'static str,

    /// The keys that trigger this action.
    pub pattern: Pattern,

    /// The modes this action is eligible in.
    pub modes: Vec<Mode>,

    /// This action's capabilities.
    pub flags: ActionFlags,

    /// An extra eligibility check.
    pub guard: Option<GuardFn>,

    /// What the action does.
    pub behavior: Behavior,
}

/// Modes in which movements resolve.
pub const MOTION_MODES: [Mode; 5] =
    [Mode::Normal, Mode::Visual, Mode::VisualLine, Mode::VisualBlock, Mode::OperatorPending];

/// Modes in which operators resolve.
pub const OPERATOR_MODES: [Mode; 5] = MOTION_MODES;

/// The Visual modes.
pub const VISUAL_MODES: [Mode; 3] = [Mode::Visual, Mode::VisualLine, Mode::VisualBlock];

impl ActionDef {
    fn new(
        name: &'static str,
        pattern: Pattern,
        modes: &[Mode],
        flags: ActionFlags,
        behavior: Behavior,
    ) -> Self {
        ActionDef { name, pattern, modes: modes.to_vec(), flags, guard: None, behavior }
    }

    /// A movement that repeats `step` once per count.
    pub fn movement(name: &'static str, pattern: Pattern, step: StepFn) -> Self {
        let behavior = MovementBehavior::Step {
            step,
            operator_step: None,
            selection: SelectionType::Concatenating,
        };

        Self::new(name, pattern, &MOTION_MODES, ActionFlags::MOTION, Behavior::Movement(behavior))
    }

    /// A movement that interprets the count itself.
    pub fn counted(name: &'static str, pattern: Pattern, run: CountedFn) -> Self {
        let behavior = MovementBehavior::Counted { run, operator_run: None };

        Self::new(name, pattern, &MOTION_MODES, ActionFlags::MOTION, Behavior::Movement(behavior))
    }

    /// A movement repeating the last character search.
    pub fn char_search_repeat(name: &'static str, pattern: Pattern, reverse: bool) -> Self {
        let behavior = MovementBehavior::RepeatCharSearch { reverse };

        Self::new(name, pattern, &MOTION_MODES, ActionFlags::MOTION, Behavior::Movement(behavior))
    }

    /// An operator.
    pub fn operator(name: &'static str, pattern: Pattern, run: OperatorFn) -> Self {
        let flags = ActionFlags::OPERATOR | ActionFlags::DOT_REPEAT;

        Self::new(name, pattern, &OPERATOR_MODES, flags, Behavior::Operator(run))
    }

    /// A command, eligible in `modes`.
    pub fn command(name: &'static str, pattern: Pattern, modes: &[Mode], run: CommandFn) -> Self {
        Self::new(name, pattern, modes, ActionFlags::NONE, Behavior::Command(run))
    }

    /// Add capability flags.
    pub fn flags(mut self, flags: ActionFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Remove capability flags.
    pub fn without_flags(mut self, flags: ActionFlags) -> Self {
        self.flags -= flags;
        self
    }

    /// Replace the modes this action is eligible in.
    pub fn modes(mut self, modes: &[Mode]) -> Self {
        self.modes = modes.to_vec();
        self
    }

    /// Add a guard.
    pub fn guard(mut self, guard: GuardFn) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Use a different step on the final iteration while an operator is pending.
    pub fn operator_step(mut self, alternate: StepFn) -> Self {
        if let Behavior::Movement(MovementBehavior::Step { ref mut operator_step, .. }) = self.behavior {
            *operator_step = Some(alternate);
        }

        self
    }

    /// Use a different counted movement while an operator is pending.
    pub fn operator_run(mut self, alternate: CountedFn) -> Self {
        if let Behavior::Movement(MovementBehavior::Counted { ref mut operator_run, .. }) = self.behavior {
            *operator_run = Some(alternate);
        }

        self
    }

    /// Change how repeated ranges are combined.
    pub fn selection(mut self, policy: SelectionType) -> Self {
        if let Behavior::Movement(MovementBehavior::Step { ref mut selection, .. }) = self.behavior {
            *selection = policy;
        }

        self
    }

    /// Whether this action may resolve in the current state.
    pub fn applies(&self, ctx: &GuardContext<'_>) -> bool {
        if self.flags.contains(ActionFlags::FIRST_KEY) {
            let recorded = &ctx.state.recorded;

            if recorded.operator_pending() ||
                recorded.keys_without_count_prefix().len() > ctx.keys.len()
            {
                return false;
            }
        }

        return self.guard.map_or(true, |guard| guard(ctx));
    }
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("modes", &self.modes)
            .field("flags", &self.flags)
            .finish()
    }
}

impl Binding<Mode> for ActionDef {
    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn modes(&self) -> &[Mode] {
        &self.modes
    }
}

/// A resolved action, with the keys that triggered it.
#[derive(Clone)]
pub struct Action {
    def: Arc<ActionDef>,
    keys: Vec<String>,
    captures: Vec<String>,
}

impl Action {
    /// Instantiate a definition for the keys that matched it.
    pub fn new(def: Arc<ActionDef>, keys: Vec<String>, leader: &str) -> Self {
        let captures = def.pattern.captures(&keys, leader);

        Action { def, keys, captures }
    }

    /// The definition this action was created from.
    pub fn def(&self) -> &Arc<ActionDef> {
        &self.def
    }

    /// The definition's name.
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// The definition's flags.
    pub fn flags(&self) -> ActionFlags {
        self.def.flags
    }

    /// The definition's behaviour.
    pub fn behavior(&self) -> Behavior {
        self.def.behavior
    }

    /// The keys pressed to trigger this action.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The key captured by the `n`th wildcard of the pattern.
    pub fn captured(&self, n: usize) -> Option<&str> {
        self.captures.get(n).map(String::as_str)
    }

    /// Whether this action is a movement.
    pub fn is_motion(&self) -> bool {
        matches!(self.def.behavior, Behavior::Movement(_))
    }

    /// Whether this action is an operator.
    pub fn is_operator(&self) -> bool {
        matches!(self.def.behavior, Behavior::Operator(_))
    }

    /// Rebind this action's keys to another definition.
    pub(crate) fn with_def(&self, def: Arc<ActionDef>) -> Action {
        Action { def, keys: self.keys.clone(), captures: self.captures.clone() }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.def.name)
            .field("keys", &self.keys)
            .finish()
    }
}

/// The state visible to an action's guard.
pub struct GuardContext<'a> {
    /// The session state.
    pub state: &'a VimState,

    /// The engine configuration.
    pub config: &'a EngineConfig,

    /// The keys being resolved.
    pub keys: &'a [String],
}

/// The state a movement is computed against.
#[derive(Clone, Copy)]
pub struct MotionContext<'a> {
    /// The text being edited.
    pub buffer: &'a dyn TextBuffer,

    /// The movement being run.
    pub action: &'a Action,

    /// The cursor the movement starts from.
    pub cursor: Cursor,

    /// The active mode.
    pub mode: Mode,

    /// Whether an operator is waiting for this movement.
    pub operator_pending: bool,

    /// The name of the waiting operator, if any.
    pub operator: Option<&'static str>,

    /// Whether this run repeats an earlier movement (`;` and `,`).
    pub is_repeat: bool,

    /// The last search made with `/` or `?`.
    pub search: Option<&'a SearchState>,

    /// Named marks.
    pub marks: &'a HashMap<char, Position>,

    /// The caret position before the last jump.
    pub last_jump: Option<Position>,
}

/// The state an operator runs against.
pub struct OperatorContext<'a> {
    /// The text being edited.
    pub buffer: &'a dyn TextBuffer,

    /// The shape of the range.
    pub shape: TargetShape,

    /// The active mode.
    pub mode: Mode,

    /// The cursor the range was computed from, before the operator ran.
    pub cursor: Cursor,
}

/// What an operator produced for one range.
#[derive(Clone, Debug, Default)]
pub struct OperatorOutput {
    /// Edits to make.
    pub transformations: Vec<TextTransformation>,

    /// Where the cursor should end up, in pre-edit coordinates.
    pub cursor: Option<Cursor>,

    /// The mode to switch to.
    pub mode: Option<Mode>,

    /// Text to place in the register.
    pub register_text: Option<String>,

    /// Whether the register text was removed from the buffer.
    pub deleted: bool,
}

/// The state a command runs against.
pub struct CommandContext<'a> {
    /// The text being edited.
    pub buffer: &'a dyn TextBuffer,

    /// The session state.
    pub state: &'a mut VimState,

    /// The engine configuration.
    pub config: &'a EngineConfig,

    /// A source of user input.
    pub prompt: &'a mut dyn Prompt,

    /// The command being run.
    pub action: &'a Action,

    /// The cursor this run evaluates against; commands update it to move the cursor.
    pub cursor: Cursor,

    /// The index of that cursor.
    pub cursor_index: usize,

    /// The count typed before the command, or 0 if none was typed.
    pub count: usize,

    /// The mode the command wants to switch to.
    pub mode: Option<Mode>,
}

impl<'a> CommandContext<'a> {
    /// Queue an edit from this cursor.
    pub fn edit(&mut self, transformation: TextTransformation) {
        let transformation = transformation.with_cursor(self.cursor_index);

        self.state.recorded.transformations.push(Transformation::Text(transformation));
    }

    /// Queue text for the selected register.
    ///
    /// Writes from every cursor are stored together, once the command has run everywhere.
    pub fn store(&mut self, shape: TargetShape, text: String, deleted: bool) {
        let write = RegisterWrite { cursor_index: self.cursor_index, shape, text, deleted };

        self.state.recorded.register_writes.push(write);
    }

    /// Queue a non-text transformation.
    pub fn push(&mut self, transformation: Transformation) {
        self.state.recorded.transformations.push(transformation);
    }

    /// Request a mode switch once the command finishes.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = Some(mode);
    }

    /// The count, treating an unspecified count as 1.
    pub fn count1(&self) -> usize {
        self.count.max(1)
    }
}

/// The registered actions, and the inverse relation between character searches.
#[derive(Default)]
pub struct ActionTable {
    registry: ActionRegistry<Mode, Arc<ActionDef>>,
    inverses: HashMap<&'static str, Arc<ActionDef>>,
}

impl ActionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Earlier registrations win over later ones.
    pub fn register(&mut self, def: ActionDef) -> Arc<ActionDef> {
        let def = Arc::new(def);
        self.registry.register(def.clone());

        return def;
    }

    /// Register a pair of character-search movements that reverse each other.
    pub fn register_char_search(&mut self, forward: ActionDef, backward: ActionDef) {
        let forward = self.register(forward.flags(ActionFlags::CHAR_SEARCH));
        let backward = self.register(backward.flags(ActionFlags::CHAR_SEARCH));

        self.inverses.insert(forward.name, backward.clone());
        self.inverses.insert(backward.name, forward);
    }

    /// The inverse of a character-search action, keeping its keys.
    pub fn inverse(&self, action: &Action) -> Option<Action> {
        self.inverses.get(action.name()).map(|def| action.with_def(def.clone()))
    }

    /// The number of registered actions.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Resolve a key buffer in `mode`.
    pub fn resolve(
        &self,
        mode: Mode,
        keys: &[String],
        leader: &str,
        ctx: &GuardContext<'_>,
    ) -> Resolution<'_, Arc<ActionDef>> {
        self.registry.resolve(mode, keys, leader, |def| def.applies(ctx))
    }
}
