//! # Action registry
//!
//! ## Overview
//!
//! An [ActionRegistry] stores bound values (typically action definitions) along with the modes
//! they are eligible in. Registration order matters: when a key buffer is an exact match for
//! several bindings, the one registered first wins.
//!
//! [ActionRegistry::resolve] walks the bindings for a mode and reports whether the buffer
//! resolved to a binding, whether more keys could still produce one, or whether nothing can
//! match. Consumers can layer extra eligibility checks (feature flags, state-dependent guards)
//! on top of pattern matching through the `applies` callback.
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::pattern::Pattern;

/// A value that can be placed in an [ActionRegistry].
pub trait Binding<M> {
    /// The keys that trigger this binding.
    fn pattern(&self) -> &Pattern;

    /// The modes this binding is eligible in.
    fn modes(&self) -> &[M];
}

impl<M, B: Binding<M>> Binding<M> for Arc<B> {
    fn pattern(&self) -> &Pattern {
        self.as_ref().pattern()
    }

    fn modes(&self) -> &[M] {
        self.as_ref().modes()
    }
}

/// The outcome of resolving a key buffer.
#[derive(Debug, Eq, PartialEq)]
pub enum Resolution<'a, B> {
    /// The buffer exactly matches this binding.
    Matched(&'a B),

    /// No binding matches yet, but one could once more keys arrive.
    Waiting,

    /// No binding can match this buffer.
    NoMatch,
}

/// An insertion-ordered table of bindings, indexed by mode.
pub struct ActionRegistry<M, B> {
    bindings: Vec<B>,
    by_mode: HashMap<M, Vec<usize>>,
}

impl<M, B> Default for ActionRegistry<M, B> {
    fn default() -> Self {
        ActionRegistry { bindings: Vec::new(), by_mode: HashMap::new() }
    }
}

impl<M, B> ActionRegistry<M, B>
where
    M: Copy + Eq + Hash,
    B: Binding<M>,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding under every mode it declares.
    pub fn register(&mut self, binding: B) -> usize {
        let idx = self.bindings.len();

        for mode in binding.modes() {
            let entries = self.by_mode.entry(*mode).or_default();

            if !entries.contains(&idx) {
                entries.push(idx);
            }
        }

        self.bindings.push(binding);

        return idx;
    }

    /// The number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Fetch a binding by the index [ActionRegistry::register] returned.
    pub fn get(&self, idx: usize) -> Option<&B> {
        self.bindings.get(idx)
    }

    /// Iterate over the bindings eligible in `mode`, in registration order.
    pub fn candidates(&self, mode: M) -> impl Iterator<Item = &B> + '_ {
        self.by_mode
            .get(&mode)
            .into_iter()
            .flatten()
            .filter_map(|idx| self.bindings.get(*idx))
    }

    /// Resolve a key buffer for `mode`.
    ///
    /// A binding is only considered if `applies` returns `true` for it. The first binding in
    /// registration order whose pattern exactly matches `keys` is returned. If there is none,
    /// [Resolution::Waiting] is returned when some binding's pattern could still match once
    /// more keys are typed.
    pub fn resolve<F>(&self, mode: M, keys: &[String], leader: &str, applies: F) -> Resolution<'_, B>
    where
        F: Fn(&B) -> bool,
    {
        let mut waiting = false;

        for binding in self.candidates(mode) {
            let pattern = binding.pattern();

            if pattern.matches(keys, leader) {
                if applies(binding) {
                    return Resolution::Matched(binding);
                }
            } else if !waiting && pattern.could_match(keys, leader) && applies(binding) {
                waiting = true;
            }
        }

        if waiting {
            Resolution::Waiting
        } else {
            Resolution::NoMatch
        }
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

    #[derive(Debug, Eq, PartialEq)]
    struct TestBinding {
        name: &'static str,
        pattern: Pattern,
        modes: Vec<TestMode>,
    }

    impl Binding<TestMode> for TestBinding {
        fn pattern(&self) -> &Pattern {
            &self.pattern
        }

        fn modes(&self) -> &[TestMode] {
            &self.modes
        }
    }

    macro_rules! binding {
        ($name: expr, [$($k: expr),*], [$($m: expr),*]) => {
            TestBinding { name: $name, pattern: Pattern::keys(&[$($k),*]), modes: vec![$($m),*] }
        };
    }

    macro_rules! keys {
        () => {
            Vec::<String>::new()
        };
        ($($k: expr),+) => {
            vec![$($k.to_string()),*]
        };
    }

    macro_rules! assert_resolves {
        ($reg: expr, $mode: expr, $keys: expr, $name: expr) => {
            match $reg.resolve($mode, &$keys, "\\", |_| true) {
                Resolution::Matched(b) => assert_eq!(b.name, $name),
                other => panic!("expected {}, got {:?}", $name, other),
            }
        };
    }

    fn registry() -> ActionRegistry<TestMode, TestBinding> {
        let mut reg = ActionRegistry::new();
        reg.register(binding!("delete-line", ["d", "d"], [TestMode::Normal]));
        reg.register(binding!("delete", ["d"], [TestMode::Normal]));
        reg.register(binding!("find", ["f", "<character>"], [TestMode::Normal]));
        reg.register(binding!("find-x", ["f", "x"], [TestMode::Normal]));
        reg.register(binding!("insert-char", ["<character>"], [TestMode::Insert]));
        reg.register(binding!("go-top", ["g", "g"], [TestMode::Normal, TestMode::Insert]));
        reg
    }

    #[test]
    fn test_first_exact_wins() {
        let reg = registry();

        // "d" is an exact match, even though "dd" could still match.
        assert_resolves!(reg, TestMode::Normal, keys!("d"), "delete");
        assert_resolves!(reg, TestMode::Normal, keys!("d", "d"), "delete-line");

        // Both "find" and "find-x" match; "find" was registered first.
        assert_resolves!(reg, TestMode::Normal, keys!("f", "x"), "find");
    }

    #[test]
    fn test_waiting_and_nomatch() {
        let reg = registry();

        assert_eq!(reg.resolve(TestMode::Normal, &keys!("f"), "\\", |_| true), Resolution::Waiting);
        assert_eq!(reg.resolve(TestMode::Normal, &keys!("g"), "\\", |_| true), Resolution::Waiting);
        assert_eq!(reg.resolve(TestMode::Normal, &keys!("z"), "\\", |_| true), Resolution::NoMatch);
        assert_eq!(
            reg.resolve(TestMode::Normal, &keys!("f", "<Esc>"), "\\", |_| true),
            Resolution::NoMatch
        );
    }

    #[test]
    fn test_modes() {
        let reg = registry();

        assert_resolves!(reg, TestMode::Insert, keys!("d"), "insert-char");
        assert_resolves!(reg, TestMode::Insert, keys!("g", "g"), "go-top");
        assert_eq!(reg.candidates(TestMode::Insert).count(), 2);
        assert_eq!(reg.candidates(TestMode::Normal).count(), 5);
        assert_eq!(reg.len(), 6);
        assert_eq!(reg.get(1).map(|b| b.name), Some("delete"));
    }

    #[test]
    fn test_guard() {
        let reg = registry();

        // Guarding the first exact match falls through to the next one.
        let res = reg.resolve(TestMode::Normal, &keys!("f", "x"), "\\", |b| b.name != "find");
        assert!(matches!(res, Resolution::Matched(b) if b.name == "find-x"));

        // Guarded partial matches don't keep the buffer waiting.
        let res = reg.resolve(TestMode::Normal, &keys!("f"), "\\", |b| !b.name.starts_with("find"));
        assert_eq!(res, Resolution::NoMatch);
    }

    #[test]
    fn test_arc_bindings() {
        let mut reg = ActionRegistry::new();
        reg.register(Arc::new(binding!("undo", ["u"], [TestMode::Normal])));

        match reg.resolve(TestMode::Normal, &keys!("u"), "\\", |_| true) {
            Resolution::Matched(b) => assert_eq!(b.name, "undo"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
