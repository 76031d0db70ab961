//! # Engine configuration
//!
//! ## Overview
//!
//! [EngineConfig] holds the settings a host passes to the engine: the leader key, the remap
//! timeout, the count bound, feature flags and user remaps. Every field has a default, so hosts
//! can deserialize a partial configuration with [serde].
//!
//! ```
//! use modal_engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.leader(), "\\");
//! assert!(config.features.macros);
//! ```
use std::time::Duration;

use serde::Deserialize;

use editor_types::prelude::Mode;
use keybindings::{normalize_key, parse_keys, NotationError, RemapTable, LEADER};

/// Features that can be switched off by the host.
///
/// A disabled feature's keys resolve as though they were never bound.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Features {
    /// Macro recording and replay (`q`, `@`).
    pub macros: bool,

    /// Repeating character searches with `;` and `,`.
    pub char_search_repeat: bool,

    /// The `iw` and `aw` text objects.
    pub text_objects: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features { macros: true, char_search_repeat: true, text_objects: true }
    }
}

/// How `@` replays a recorded macro.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MacroReplay {
    /// Feed the recorded keys back through the resolver.
    #[default]
    Keys,

    /// Re-run the recorded actions directly.
    Actions,
}

/// A single user remap, written in key notation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RemapEntry {
    /// The keys the user types.
    pub before: String,

    /// The keys the engine receives instead.
    pub after: String,
}

impl RemapEntry {
    /// Create a remap from notation strings.
    pub fn new(before: &str, after: &str) -> Self {
        RemapEntry { before: before.to_string(), after: after.to_string() }
    }
}

/// Settings for an [Engine](crate::Engine).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// The key that `<leader>` stands for.
    pub leader: String,

    /// How long, in milliseconds, a partially typed remap waits for its next key.
    pub timeout_ms: u64,

    /// The largest count a motion will be repeated.
    pub max_count: usize,

    /// Feature flags.
    pub features: Features,

    /// How recorded macros are replayed.
    pub macro_replay: MacroReplay,

    /// Remaps applied in Normal mode.
    pub normal_remaps: Vec<RemapEntry>,

    /// Remaps applied in the Visual modes.
    pub visual_remaps: Vec<RemapEntry>,

    /// Remaps applied while an operator is waiting for its motion.
    pub operator_pending_remaps: Vec<RemapEntry>,

    /// Remaps applied in Insert and Replace mode.
    pub insert_remaps: Vec<RemapEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            leader: "\\".to_string(),
            timeout_ms: 1000,
            max_count: 99999,
            features: Features::default(),
            macro_replay: MacroReplay::default(),
            normal_remaps: vec![],
            visual_remaps: vec![],
            operator_pending_remaps: vec![],
            insert_remaps: vec![],
        }
    }
}

/// The mode whose remaps apply while `mode` is active.
pub(crate) fn remap_mode(mode: Mode) -> Mode {
    match mode {
        Mode::Visual | Mode::VisualLine | Mode::VisualBlock => Mode::Visual,
        Mode::Insert | Mode::Replace => Mode::Insert,
        m => m,
    }
}

impl EngineConfig {
    /// The normalized leader key.
    pub fn leader(&self) -> String {
        normalize_key(&self.leader)
    }

    /// The remap timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The range counts are clamped to.
    pub fn count_bounds(&self) -> (usize, usize) {
        (1, self.max_count.max(1))
    }

    fn parse_remap_keys(&self, keys: &str) -> Result<Vec<String>, NotationError> {
        let leader = self.leader();
        let keys = parse_keys(keys)?
            .into_iter()
            .map(|k| if k == LEADER { leader.clone() } else { k })
            .collect();

        Ok(keys)
    }

    /// Build the remap table, skipping entries whose notation can't be parsed.
    ///
    /// `<leader>` in either side of a remap stands for the configured leader key.
    pub fn remap_table(&self) -> RemapTable<Mode> {
        let mut table = RemapTable::new();
        let groups = [
            (Mode::Normal, &self.normal_remaps),
            (Mode::Visual, &self.visual_remaps),
            (Mode::OperatorPending, &self.operator_pending_remaps),
            (Mode::Insert, &self.insert_remaps),
        ];

        for (mode, entries) in groups {
            for entry in entries.iter() {
                match (self.parse_remap_keys(&entry.before), self.parse_remap_keys(&entry.after)) {
                    (Ok(before), Ok(after)) => {
                        table.add(mode, before, after);
                    },
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::warn!(before = %entry.before, error = %e, "skipping invalid remap");
                    },
                }
            }
        }

        return table;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.leader(), "\\");
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.count_bounds(), (1, 99999));
        assert_eq!(config.macro_replay, MacroReplay::Keys);
        assert!(config.remap_table().is_empty(Mode::Normal));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig = serde_json::from_str(
            r#"{
                "leader": "<space>",
                "features": { "macros": false },
                "macro_replay": "actions",
                "insert_remaps": [ { "before": "jj", "after": "<Esc>" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.leader(), " ");
        assert_eq!(config.timeout_ms, 1000);
        assert!(!config.features.macros);
        assert!(config.features.text_objects);
        assert_eq!(config.macro_replay, MacroReplay::Actions);
        assert_eq!(config.insert_remaps, vec![RemapEntry::new("jj", "<Esc>")]);

        let table = config.remap_table();
        let jj = vec!["j".to_string(), "j".to_string()];
        assert_eq!(table.lookup(Mode::Insert, &jj).exact, Some(&["<Esc>".to_string()][..]));
        assert!(table.is_empty(Mode::Normal));
    }

    #[test]
    fn test_remap_leader() {
        let mut config = EngineConfig::default();
        config.leader = ",".into();
        config.normal_remaps = vec![RemapEntry::new("<leader>w", "dw")];

        let table = config.remap_table();
        let keys = vec![",".to_string(), "w".to_string()];
        let after = vec!["d".to_string(), "w".to_string()];
        assert_eq!(table.lookup(Mode::Normal, &keys).exact, Some(after.as_slice()));
        assert!(table.lookup(Mode::Normal, &keys[..1]).longer);
    }

    #[test]
    fn test_remap_modes() {
        assert_eq!(remap_mode(Mode::VisualBlock), Mode::Visual);
        assert_eq!(remap_mode(Mode::Replace), Mode::Insert);
        assert_eq!(remap_mode(Mode::OperatorPending), Mode::OperatorPending);
        assert_eq!(remap_mode(Mode::Normal), Mode::Normal);
    }
}
