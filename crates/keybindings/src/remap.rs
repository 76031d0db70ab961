//! # User remaps
//!
//! ## Overview
//!
//! Remaps let users bind one key sequence to another (for example, `jj` to `<Esc>` in Insert
//! mode). They are consulted by a [Remapper] before keys reach the action resolver.
//!
//! While the typed keys are a prefix of a longer remap, they are held back. If the next key
//! makes the sequence impossible, the held keys are released unchanged; if the sequence
//! completes, the remap's replacement keys are released instead. Held keys are also released
//! unchanged once they have waited longer than the configured timeout.
//!
//! Replacement keys are not remapped again.
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use radix_trie::{Trie, TrieCommon};

const SEPARATOR: char = '\u{1F}';

fn trie_key(keys: &[String]) -> String {
    let mut s = String::new();

    for key in keys {
        s.push_str(key);
        s.push(SEPARATOR);
    }

    return s;
}

/// The result of looking up a key sequence in a [RemapTable].
#[derive(Debug, Default, Eq, PartialEq)]
pub struct RemapLookup<'a> {
    /// The replacement, if the keys exactly match a remap.
    pub exact: Option<&'a [String]>,

    /// Whether a longer remap begins with these keys.
    pub longer: bool,
}

/// Remaps for each mode.
#[derive(Clone, Debug)]
pub struct RemapTable<M: Eq + Hash> {
    tries: HashMap<M, Trie<String, Vec<String>>>,
}

impl<M: Eq + Hash> Default for RemapTable<M> {
    fn default() -> Self {
        RemapTable { tries: HashMap::new() }
    }
}

impl<M: Copy + Eq + Hash> RemapTable<M> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remap `before` to `after` in `mode`.
    pub fn add(&mut self, mode: M, before: Vec<String>, after: Vec<String>) {
        if before.is_empty() {
            return;
        }

        self.tries.entry(mode).or_default().insert(trie_key(&before), after);
    }

    /// Whether there are any remaps for `mode`.
    pub fn is_empty(&self, mode: M) -> bool {
        self.tries.get(&mode).map_or(true, |t| t.is_empty())
    }

    /// Look up a sequence of keys.
    pub fn lookup(&self, mode: M, keys: &[String]) -> RemapLookup<'_> {
        let Some(trie) = self.tries.get(&mode) else {
            return RemapLookup::default();
        };

        let key = trie_key(keys);
        let exact = trie.get(&key).map(Vec::as_slice);
        let longer = trie
            .get_raw_descendant(&key)
            .map_or(false, |sub| sub.keys().any(|k| k != &key && k.starts_with(&key)));

        RemapLookup { exact, longer }
    }
}

/// Tracks keys held back while a remap might still complete.
#[derive(Debug)]
pub struct Remapper {
    pending: Vec<String>,
    last: Option<Instant>,
    timeout: Duration,
}

impl Remapper {
    /// Create a remapper that releases held keys after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Remapper { pending: Vec::new(), last: None, timeout }
    }

    /// The keys currently being held.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    fn expired(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) > self.timeout,
            None => false,
        }
    }

    /// Release the held keys if they have waited too long.
    pub fn expire(&mut self, now: Instant) -> Vec<String> {
        if !self.pending.is_empty() && self.expired(now) {
            self.last = None;
            return std::mem::take(&mut self.pending);
        }

        return vec![];
    }

    /// Feed a key into the remapper, returning the keys that should now be dispatched.
    ///
    /// An empty result means the key is being held.
    pub fn feed<M: Copy + Eq + Hash>(
        &mut self,
        table: &RemapTable<M>,
        mode: M,
        key: String,
        now: Instant,
    ) -> Vec<String> {
        let mut out = self.expire(now);

        if table.is_empty(mode) && self.pending.is_empty() {
            out.push(key);
            return out;
        }

        self.last = Some(now);

        let mut candidate = std::mem::take(&mut self.pending);
        candidate.push(key);

        while !candidate.is_empty() {
            let lookup = table.lookup(mode, &candidate);

            if lookup.longer {
                self.pending = candidate;
                return out;
            }

            if let Some(after) = lookup.exact {
                out.extend(after.iter().cloned());
                return out;
            }

            // Nothing starts with these keys, so release the first one and try the rest.
            out.push(candidate.remove(0));
        }

        return out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    enum TestMode {
        Normal,
        Insert,
    }

    macro_rules! keys {
        () => {
            Vec::<String>::new()
        };
        ($($k: expr),+) => {
            vec![$($k.to_string()),*]
        };
    }

    fn table() -> RemapTable<TestMode> {
        let mut table = RemapTable::new();
        table.add(TestMode::Insert, keys!("j", "j"), keys!("<Esc>"));
        table.add(TestMode::Insert, keys!("j", "k", "l"), keys!("<Esc>", "x"));
        table.add(TestMode::Normal, keys!("<leader>", "w"), keys!("d", "w"));
        table.add(TestMode::Normal, keys!("g"), keys!("x"));
        table.add(TestMode::Normal, keys!("g", "o"), keys!("g", "g"));
        table
    }

    #[test]
    fn test_lookup() {
        let table = table();

        let l = table.lookup(TestMode::Insert, &keys!("j"));
        assert_eq!(l.exact, None);
        assert!(l.longer);

        let l = table.lookup(TestMode::Insert, &keys!("j", "j"));
        assert_eq!(l.exact, Some(keys!("<Esc>").as_slice()));
        assert!(!l.longer);

        let l = table.lookup(TestMode::Normal, &keys!("g"));
        assert_eq!(l.exact, Some(keys!("x").as_slice()));
        assert!(l.longer);

        assert!(table.is_empty(TestMode::Insert) == false);
        assert_eq!(table.lookup(TestMode::Insert, &keys!("a")), RemapLookup::default());
    }

    #[test]
    fn test_feed_remap() {
        let table = table();
        let mut r = Remapper::new(Duration::from_secs(1));
        let now = Instant::now();

        assert_eq!(r.feed(&table, TestMode::Insert, "j".into(), now), keys!());
        assert_eq!(r.pending(), keys!("j").as_slice());
        assert_eq!(r.feed(&table, TestMode::Insert, "j".into(), now), keys!("<Esc>"));
        assert_eq!(r.pending(), keys!().as_slice());
    }

    #[test]
    fn test_feed_unmapped_flush() {
        let table = table();
        let mut r = Remapper::new(Duration::from_secs(1));
        let now = Instant::now();

        assert_eq!(r.feed(&table, TestMode::Insert, "a".into(), now), keys!("a"));
        assert_eq!(r.feed(&table, TestMode::Insert, "j".into(), now), keys!());
        assert_eq!(r.feed(&table, TestMode::Insert, "k".into(), now), keys!());

        // "jkj" can't complete "jkl", so "j" and "k" are released, and "j" is held again.
        assert_eq!(r.feed(&table, TestMode::Insert, "j".into(), now), keys!("j", "k"));
        assert_eq!(r.feed(&table, TestMode::Insert, "j".into(), now), keys!("<Esc>"));
    }

    #[test]
    fn test_timeout_replays_literally() {
        let table = table();
        let mut r = Remapper::new(Duration::from_millis(100));
        let now = Instant::now();

        assert_eq!(r.feed(&table, TestMode::Normal, "g".into(), now), keys!());
        assert_eq!(r.expire(now + Duration::from_millis(50)), keys!());
        assert_eq!(r.expire(now + Duration::from_millis(200)), keys!("g"));
        assert_eq!(r.pending(), keys!().as_slice());

        // A late key flushes the timed out keys before being processed itself.
        assert_eq!(r.feed(&table, TestMode::Normal, "g".into(), now), keys!());
        let later = now + Duration::from_millis(500);
        assert_eq!(r.feed(&table, TestMode::Normal, "w".into(), later), keys!("g", "w"));
    }

    #[test]
    fn test_no_remaps_passthrough() {
        let table = RemapTable::<TestMode>::new();
        let mut r = Remapper::new(Duration::from_secs(1));

        assert_eq!(r.feed(&table, TestMode::Normal, "x".into(), Instant::now()), keys!("x"));
        assert!(table.is_empty(TestMode::Normal));
    }
}
