//! # Error Types
//!
//! ## Overview
//!
//! Failures that happen inside the engine (a motion that can't find its target, an operator
//! whose motion failed, keys that match nothing) are reported as values and handled where they
//! occur. The errors in this module are the ones raised at the host boundary: by the buffer, by
//! an interactive prompt, by a search pattern that doesn't compile, or by runaway macro replay.
//! They propagate up to [Engine::handle_key](crate::Engine::handle_key), which logs and discards
//! them.
use keybindings::NotationError;

use crate::buffer::BufferError;
use crate::prompt::PromptError;

/// Errors returned while processing a keystroke.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum EditError {
    /// The host buffer rejected a read or an edit.
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// An interactive prompt failed or was cancelled.
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// A register held text that couldn't be replayed as keys.
    #[error("Invalid key notation: {0}")]
    Notation(#[from] NotationError),

    /// A macro kept invoking macros.
    #[error("Ending suspected macro loop; macro nested {0} levels deep")]
    LoopingMacro(usize),

    /// A search pattern couldn't be compiled.
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Common result type for editing operations.
pub type EditResult<V> = Result<V, EditError>;
