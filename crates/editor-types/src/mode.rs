//! # Editing modes
use serde::{Deserialize, Serialize};

use crate::edit::TargetShape;

/// The modal editing state gating which actions are eligible.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The baseline mode, where keys compose commands.
    #[default]
    Normal,

    /// Typed characters are inserted into the buffer.
    Insert,

    /// A character-wise selection is being made.
    Visual,

    /// A line-wise selection is being made.
    VisualLine,

    /// A block-wise selection is being made.
    VisualBlock,

    /// Typed characters overwrite the buffer contents.
    Replace,

    /// Transient mode used for resolving keys while an operator waits for its motion.
    OperatorPending,
}

impl Mode {
    /// Whether this is one of the selection modes.
    pub fn is_visual(&self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine | Mode::VisualBlock)
    }

    /// Whether typed characters modify the buffer in this mode.
    pub fn is_insert(&self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }

    /// The shape of the selection made in a Visual mode.
    pub fn shape(&self) -> Option<TargetShape> {
        match self {
            Mode::Visual => Some(TargetShape::CharWise),
            Mode::VisualLine => Some(TargetShape::LineWise),
            Mode::VisualBlock => Some(TargetShape::BlockWise),
            _ => None,
        }
    }

    /// The text shown in a status line while this mode is active.
    pub fn show(&self) -> Option<&'static str> {
        match self {
            Mode::Normal | Mode::OperatorPending => None,
            Mode::Insert => Some("-- INSERT --"),
            Mode::Replace => Some("-- REPLACE --"),
            Mode::Visual => Some("-- VISUAL --"),
            Mode::VisualLine => Some("-- VISUAL LINE --"),
            Mode::VisualBlock => Some("-- VISUAL BLOCK --"),
        }
    }
}
