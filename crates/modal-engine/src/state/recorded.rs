use editor_types::prelude::*;
use keybindings::LEADER;

use crate::action::Action;
use crate::repeat::VisualExtent;
use crate::transform::Transformation;

fn is_count_key(key: &str, first: bool) -> bool {
    let mut chars = key.chars();

    match (chars.next(), chars.next()) {
        (Some('0'), None) => !first,
        (Some(c), None) => c.is_ascii_digit(),
        _ => false,
    }
}

/// Text waiting to be stored in the selected register.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RegisterWrite {
    pub(crate) cursor_index: usize,
    pub(crate) shape: TargetShape,
    pub(crate) text: String,
    pub(crate) deleted: bool,
}

/// The command currently being composed.
///
/// This accumulates the count, the register, the pending operator and every action run while
/// composing a command. It is reset once the command completes, or when the typed keys can't
/// resolve to anything.
#[derive(Clone, Debug, Default)]
pub struct RecordedState {
    /// The count typed so far, or 0 if none was.
    pub(crate) count: usize,

    /// The count typed before the pending operator.
    pub(crate) operator_count: usize,

    /// The register selected with `"`, and whether writes append to it.
    pub(crate) register: Option<(Register, bool)>,

    /// Every action run while composing this command.
    pub(crate) actions_run: Vec<Action>,

    /// Keys typed since the last action resolved.
    pub(crate) action_keys: Vec<String>,

    /// Every key typed while composing this command.
    pub(crate) command_list: Vec<String>,

    /// Transformations waiting to be applied.
    pub(crate) transformations: Vec<Transformation>,

    /// Register writes waiting for every cursor to run.
    pub(crate) register_writes: Vec<RegisterWrite>,

    /// Whether the pending operator has already run.
    pub(crate) has_run_operator: bool,

    /// A shape forced by the movement given to the operator.
    pub(crate) shape: Option<TargetShape>,

    /// The selection an operator ran on in a Visual mode.
    pub(crate) visual_extent: Option<VisualExtent>,
}

impl RecordedState {
    /// The count typed so far, or 0 if none was.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The register selected for this command.
    pub fn register(&self) -> (Register, bool) {
        self.register.unwrap_or((Register::Unnamed, false))
    }

    /// The actions run so far.
    pub fn actions_run(&self) -> &[Action] {
        &self.actions_run
    }

    /// The most recent operator.
    pub fn operator(&self) -> Option<&Action> {
        self.actions_run.iter().rev().find(|a| a.is_operator())
    }

    /// Whether an operator is waiting for its range.
    pub fn operator_pending(&self) -> bool {
        self.operator().is_some() && !self.has_run_operator
    }

    fn last_operator_index(&self) -> Option<usize> {
        self.actions_run.iter().rposition(Action::is_operator)
    }

    /// Whether a movement has run since the last operator.
    pub fn has_run_movement(&self) -> bool {
        match self.last_operator_index() {
            Some(idx) => self.actions_run[idx + 1..].iter().any(Action::is_motion),
            None => false,
        }
    }

    /// Whether the same operator was typed twice in a row, as in `dd` or `y2y`.
    pub fn is_doubled_operator(&self) -> bool {
        let Some(second) = self.last_operator_index() else {
            return false;
        };

        let Some(first) = self.actions_run[..second].iter().rposition(Action::is_operator) else {
            return false;
        };

        let between = &self.actions_run[first + 1..second];

        return self.actions_run[first].name() == self.actions_run[second].name() &&
            !between.iter().any(Action::is_motion);
    }

    /// Whether the pending operator has everything it needs to run.
    pub fn operator_ready_to_execute(&self, mode: Mode) -> bool {
        self.operator_pending() &&
            (self.has_run_movement() || mode.is_visual() || self.is_doubled_operator())
    }

    /// The count to repeat a movement, combining the operator's count and the movement's.
    pub fn effective_count(&self) -> usize {
        self.operator_count.max(1).saturating_mul(self.count.max(1))
    }

    /// Take the count typed so far.
    pub(crate) fn take_count(&mut self) -> usize {
        std::mem::take(&mut self.count)
    }

    /// Take the count for a movement, or 0 if no count was typed at all.
    pub(crate) fn take_motion_count(&mut self, operator_pending: bool) -> usize {
        if !operator_pending {
            return self.take_count();
        }

        let specified = self.count > 0 || self.operator_count > 0;
        let count = self.effective_count();
        self.count = 0;
        self.operator_count = 0;

        if specified {
            count
        } else {
            0
        }
    }

    /// Move the typed count onto a newly pending operator.
    pub(crate) fn start_operator(&mut self) {
        self.operator_count = self.take_count();
    }

    /// Append a digit to the count.
    pub(crate) fn push_digit(&mut self, digit: usize) {
        self.count = self.count.saturating_mul(10).saturating_add(digit);
    }

    /// The keys of this command, without a leading count.
    pub fn keys_without_count_prefix(&self) -> &[String] {
        let mut skip = 0;

        for key in self.command_list.iter() {
            if !is_count_key(key, skip == 0) {
                break;
            }

            skip += 1;
        }

        &self.command_list[skip..]
    }

    /// The keys typed so far, for display in a status line.
    pub fn command_string(&self, leader: &str) -> String {
        self.command_list
            .iter()
            .map(|k| if k == leader { LEADER } else { k.as_str() })
            .collect()
    }

    /// Clear the keys and prefixes of a command that has switched into an insert session, while
    /// keeping the actions run so far for dot-repeat.
    pub(crate) fn finish_composition(&mut self) {
        self.count = 0;
        self.operator_count = 0;
        self.register = None;
        self.action_keys.clear();
        self.command_list.clear();
    }
}
