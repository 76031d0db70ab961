//! # modal-engine
//!
//! ## Overview
//!
//! This crate implements a keystroke-driven modal editing engine in the style of
//! [vi](https://en.wikipedia.org/wiki/Vi). A host application (a terminal editor, or an editor
//! extension) owns the text, and exposes it through the [TextBuffer](buffer::TextBuffer) trait;
//! the [Engine] turns each key press into movements, operators and commands over that text.
//!
//! The main pieces are:
//!
//! - [action], the bindable actions, and the table they're resolved from
//! - [bindings], the default vi-like bindings
//! - [motion] and [operator], the movements and operators those bindings run
//! - [transform], which applies the edits from every cursor as one batch
//! - [repeat], which replays commands with `.`, character searches with `;` and `,`, and macros
//!   with `@`
//!
//! ## Example
//!
//! ```
//! use modal_engine::prelude::*;
//!
//! let buffer = RopeBuffer::new("foo bar\nbaz");
//! let mut engine = Engine::new(buffer, EngineConfig::default());
//!
//! // Delete to the end of the word, and then repeat it.
//! engine.handle_keys("de.").unwrap();
//! assert_eq!(engine.buffer().contents(), "\nbaz");
//!
//! // Open a line and type into it.
//! engine.handle_keys("jOqux<Esc>").unwrap();
//! assert_eq!(engine.buffer().contents(), "\nqux\nbaz");
//! assert_eq!(engine.cursors(), &[Cursor::at(Position::new(1, 3))]);
//! ```
#![deny(missing_docs)]
#![allow(clippy::new_without_default)]

pub mod action;
pub mod bindings;
pub mod buffer;
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod key;
pub mod motion;
pub mod operator;
pub mod prompt;
pub mod repeat;
pub mod state;
pub mod transform;

pub use self::engine::Engine;

/// Common types for hosts of the engine.
pub mod prelude {
    pub use editor_types::prelude::*;

    pub use crate::action::{ActionDef, ActionFlags, ActionTable};
    pub use crate::buffer::{BufferError, RopeBuffer, TextBuffer};
    pub use crate::config::{EngineConfig, Features, MacroReplay, RemapEntry};
    pub use crate::engine::Engine;
    pub use crate::errors::{EditError, EditResult};
    pub use crate::key::TerminalKey;
    pub use crate::prompt::{NoPrompt, Prompt, PromptError, ScriptedPrompt};
}
