//! # Common types
//!
//! Re-exports of the types most consumers of this crate need.
pub use crate::cursor::{normalize_cursors, Cursor, MovementResult, Range};
pub use crate::edit::{find_overlap, EditKind, TargetShape, TextEdit, TextTransformation};
pub use crate::mode::Mode;
pub use crate::position::{Position, PositionDiff};
pub use crate::register::{char_to_register, register_to_char, Register};
