//! # Editor Types
//!
//! ## Overview
//!
//! The types in this crate describe the pieces of editor state that a modal command engine and
//! its host buffer exchange: where the carets are, which mode is active, and what edits a
//! command wants to make.
//!
//! They carry no behaviour beyond simple arithmetic on positions, so that keybinding layers,
//! engines and buffer adapters can all agree on them without depending on each other.
//!
//! ## Examples
//!
//! ```
//! use editor_types::prelude::*;
//!
//! // Delete the first word of "hello world", leaving the caret where it was.
//! let edit = TextTransformation::delete(Position::new(0, 0), Position::new(0, 6));
//! assert_eq!(edit.edit.span(), (Position::new(0, 0), Position::new(0, 6)));
//!
//! // Type a character, moving the caret one column to the right once the edit lands.
//! let edit = TextTransformation::insert(Position::new(0, 0), "a")
//!     .with_diff(PositionDiff::characters(1));
//! assert_eq!(Position::new(0, 0).apply(&edit.diff.unwrap()), Position::new(0, 1));
//! ```
#![deny(missing_docs)]

pub mod cursor;
pub mod edit;
pub mod mode;
pub mod position;
pub mod prelude;
pub mod register;
pub mod util;
