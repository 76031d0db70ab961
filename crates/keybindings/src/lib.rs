//! # keybindings
//!
//! ## Overview
//!
//! This crate provides environment-agnostic pieces for matching and resolving modal key
//! sequences, similar to the keybinding grammar of applications descended from
//! [vi](https://en.wikipedia.org/wiki/Vi).
//!
//! Keys are normalized notation strings (see [notation]). Bindings declare a [Pattern] of
//! [KeyToken] values and the modes they apply in, and are stored in an [ActionRegistry], which
//! resolves a buffer of typed keys into the first exactly matching binding. Before keys reach the
//! registry, a [Remapper] can rewrite them according to user-defined remaps.
//!
//! ## Example
//!
//! ```
//! use keybindings::{ActionRegistry, Binding, Pattern, Resolution};
//!
//! #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
//! enum ProgMode {
//!     Normal,
//!     Insert,
//! }
//!
//! struct Bound {
//!     name: &'static str,
//!     pattern: Pattern,
//!     modes: Vec<ProgMode>,
//! }
//!
//! impl Binding<ProgMode> for Bound {
//!     fn pattern(&self) -> &Pattern {
//!         &self.pattern
//!     }
//!
//!     fn modes(&self) -> &[ProgMode] {
//!         &self.modes
//!     }
//! }
//!
//! let mut reg = ActionRegistry::new();
//! reg.register(Bound {
//!     name: "quit",
//!     pattern: Pattern::keys(&["q", "q"]),
//!     modes: vec![ProgMode::Normal],
//! });
//! reg.register(Bound {
//!     name: "normal",
//!     pattern: Pattern::keys(&["<Esc>"]),
//!     modes: vec![ProgMode::Insert],
//! });
//!
//! let keys = keybindings::parse_keys("q").unwrap();
//! assert!(matches!(reg.resolve(ProgMode::Normal, &keys, "\\", |_| true), Resolution::Waiting));
//!
//! let keys = keybindings::parse_keys("qq").unwrap();
//! match reg.resolve(ProgMode::Normal, &keys, "\\", |_| true) {
//!     Resolution::Matched(b) => assert_eq!(b.name, "quit"),
//!     _ => panic!("expected a match"),
//! }
//! ```
#![deny(missing_docs)]
#![allow(clippy::new_without_default)]

pub mod notation;
pub mod pattern;
pub mod registry;
pub mod remap;

pub use self::notation::{
    is_control_key,
    key_to_text,
    normalize_key,
    parse_keys,
    NotationError,
    LEADER,
};
pub use self::pattern::{tokens_match, KeyMatch, KeyToken, Pattern};
pub use self::registry::{ActionRegistry, Binding, Resolution};
pub use self::remap::{RemapLookup, RemapTable, Remapper};
