//! # Key patterns
//!
//! ## Overview
//!
//! A [Pattern] is one or more alternative sequences of [KeyToken] values. Tokens are either
//! literal keys, or wildcard classes that accept any key of a given kind:
//!
//! | Notation      | Token                   | Accepts                                   |
//! | ------------- | ----------------------- | ----------------------------------------- |
//! | `<number>`    | [KeyToken::Digit]       | a single decimal digit                    |
//! | `<alpha>`     | [KeyToken::Letter]      | a single ASCII letter                     |
//! | `<any>`       | [KeyToken::Any]         | any key                                   |
//! | `<character>` | [KeyToken::Character]   | any key that is not a control key         |
//! | `<leader>`    | [KeyToken::Leader]      | the configured leader key                 |
//!
//! Keys in a typed buffer are tokenized the same way, so a buffer holding the `<leader>` marker
//! matches a pattern holding the literal leader key, and the other way around.
//!
//! Matching is total: any pattern compared with any key buffer produces a [KeyMatch], without
//! panicking.
use crate::notation::{is_control_key, normalize_key, LEADER};

/// A single element of a [Pattern].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum KeyToken {
    /// A literal, normalized key.
    Key(String),

    /// A single decimal digit.
    Digit,

    /// A single ASCII letter.
    Letter,

    /// Any key.
    Any,

    /// Any key that isn't a control key.
    Character,

    /// The configured leader key.
    Leader,
}

/// The result of comparing a key buffer against a [Pattern].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyMatch {
    /// The buffer is a complete match for one of the alternatives.
    Exact,

    /// The buffer is a proper prefix of one of the alternatives.
    Partial,

    /// The buffer cannot become a match.
    None,
}

impl KeyToken {
    /// Parse a pattern element.
    pub fn parse(key: &str) -> KeyToken {
        match key {
            "<number>" => KeyToken::Digit,
            "<alpha>" => KeyToken::Letter,
            "<any>" => KeyToken::Any,
            "<character>" => KeyToken::Character,
            k => {
                let k = normalize_key(k);

                if k == LEADER {
                    KeyToken::Leader
                } else {
                    KeyToken::Key(k)
                }
            },
        }
    }

    /// Whether this token is a wildcard whose matching key gets captured.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, KeyToken::Digit | KeyToken::Letter | KeyToken::Any | KeyToken::Character)
    }
}

fn is_digit(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}

fn is_letter(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

fn buffer_token(key: &str) -> KeyToken {
    if key == LEADER {
        KeyToken::Leader
    } else {
        KeyToken::Key(key.to_string())
    }
}

/// Compare two tokens, with `leader` as the value of the leader key.
///
/// The comparison is symmetric, so it doesn't matter which side came from the pattern.
pub fn tokens_match(left: &KeyToken, right: &KeyToken, leader: &str) -> bool {
    use KeyToken::*;

    match (left, right) {
        (Any, _) | (_, Any) => true,
        (Key(a), Key(b)) => a == b,
        (Digit, Key(k)) | (Key(k), Digit) => is_digit(k),
        (Letter, Key(k)) | (Key(k), Letter) => is_letter(k),
        (Character, Key(k)) | (Key(k), Character) => !is_control_key(k),
        (Leader, Key(k)) | (Key(k), Leader) => k == leader,
        (Character, Leader) | (Leader, Character) => !is_control_key(leader),
        (a, b) => a == b,
    }
}

/// One or more alternative token sequences.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Pattern {
    alternatives: Vec<Vec<KeyToken>>,
}

impl Pattern {
    /// Create a pattern with a single sequence of keys, written in key notation.
    pub fn keys(keys: &[&str]) -> Self {
        Pattern { alternatives: vec![keys.iter().map(|k| KeyToken::parse(k)).collect()] }
    }

    /// Create a pattern that matches any of several key sequences.
    pub fn any_of(alternatives: &[&[&str]]) -> Self {
        let alternatives = alternatives
            .iter()
            .map(|keys| keys.iter().map(|k| KeyToken::parse(k)).collect())
            .collect();

        Pattern { alternatives }
    }

    /// The alternative token sequences of this pattern.
    pub fn alternatives(&self) -> &[Vec<KeyToken>] {
        &self.alternatives
    }

    /// The length of the longest alternative.
    pub fn max_len(&self) -> usize {
        self.alternatives.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn matches_alternative(alt: &[KeyToken], keys: &[String], leader: &str) -> bool {
        alt.len() == keys.len() &&
            alt.iter().zip(keys.iter()).all(|(t, k)| tokens_match(t, &buffer_token(k), leader))
    }

    /// Whether `keys` is a complete match for any alternative.
    pub fn matches(&self, keys: &[String], leader: &str) -> bool {
        self.alternatives
            .iter()
            .any(|alt| Self::matches_alternative(alt, keys, leader))
    }

    /// Whether `keys` matches the start of any alternative.
    ///
    /// Each alternative is truncated to the number of keys pressed, and then compared using the
    /// same rules as [Pattern::matches].
    pub fn could_match(&self, keys: &[String], leader: &str) -> bool {
        self.alternatives.iter().any(|alt| {
            alt.len() >= keys.len() && Self::matches_alternative(&alt[..keys.len()], keys, leader)
        })
    }

    /// Compare a key buffer against this pattern.
    pub fn compare(&self, keys: &[String], leader: &str) -> KeyMatch {
        if self.matches(keys, leader) {
            KeyMatch::Exact
        } else if self.could_match(keys, leader) {
            KeyMatch::Partial
        } else {
            KeyMatch::None
        }
    }

    /// Return the keys that filled the wildcard slots of the first matching alternative.
    pub fn captures(&self, keys: &[String], leader: &str) -> Vec<String> {
        let alt = self
            .alternatives
            .iter()
            .find(|alt| Self::matches_alternative(alt, keys, leader));

        match alt {
            Some(alt) => {
                alt.iter()
                    .zip(keys.iter())
                    .filter(|(t, _)| t.is_wildcard())
                    .map(|(_, k)| k.clone())
                    .collect()
            },
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;

    macro_rules! keys {
        () => {
            Vec::<String>::new()
        };
        ($($k: expr),+) => {
            vec![$($k.to_string()),*]
        };
    }

    #[test]
    fn test_literal_match() {
        let p = Pattern::keys(&["d", "d"]);

        assert_eq!(p.compare(&keys!("d"), "\\"), KeyMatch::Partial);
        assert_eq!(p.compare(&keys!("d", "d"), "\\"), KeyMatch::Exact);
        assert_eq!(p.compare(&keys!("d", "w"), "\\"), KeyMatch::None);
        assert_eq!(p.compare(&keys!("d", "d", "d"), "\\"), KeyMatch::None);
        assert_eq!(p.compare(&keys!(), "\\"), KeyMatch::Partial);
    }

    #[test]
    fn test_wildcards() {
        let find = Pattern::keys(&["f", "<character>"]);
        assert!(find.matches(&keys!("f", "x"), "\\"));
        assert!(find.matches(&keys!("f", "<BS>"), "\\"));
        assert!(!find.matches(&keys!("f", "<Esc>"), "\\"));
        assert_eq!(find.captures(&keys!("f", "x"), "\\"), keys!("x"));

        let digit = Pattern::keys(&["<number>"]);
        assert!(digit.matches(&keys!("7"), "\\"));
        assert!(!digit.matches(&keys!("x"), "\\"));
        assert!(!digit.matches(&keys!("<C-1>"), "\\"));

        let mark = Pattern::keys(&["m", "<alpha>"]);
        assert!(mark.matches(&keys!("m", "Q"), "\\"));
        assert!(!mark.matches(&keys!("m", "1"), "\\"));
        assert!(!mark.matches(&keys!("m", "é"), "\\"));

        let any = Pattern::keys(&["<C-k>", "<any>"]);
        assert!(any.matches(&keys!("<C-k>", "<Esc>"), "\\"));
        assert_eq!(any.captures(&keys!("<C-k>", "<Esc>"), "\\"), keys!("<Esc>"));
    }

    #[test]
    fn test_alternatives() {
        let p = Pattern::any_of(&[&["g", "g"], &["<Home>"], &["g", "<Up>"]]);

        assert_eq!(p.max_len(), 2);
        assert_eq!(p.compare(&keys!("g"), "\\"), KeyMatch::Partial);
        assert_eq!(p.compare(&keys!("<Home>"), "\\"), KeyMatch::Exact);
        assert_eq!(p.compare(&keys!("g", "<Up>"), "\\"), KeyMatch::Exact);
        assert_eq!(p.compare(&keys!("<End>"), "\\"), KeyMatch::None);
    }

    #[test]
    fn test_leader_symmetry() {
        // The pattern holds the marker, and the buffer holds the value.
        let marker = Pattern::keys(&["<leader>", "w"]);
        assert!(marker.matches(&keys!(" ", "w"), " "));
        assert!(!marker.matches(&keys!("\\", "w"), " "));

        // The pattern holds the value, and the buffer holds the marker.
        let value = Pattern::keys(&[" ", "w"]);
        assert!(value.matches(&keys!("<leader>", "w"), " "));
        assert!(!value.matches(&keys!("<leader>", "w"), ","));

        // Both sides hold the marker.
        assert!(marker.matches(&keys!("<leader>", "w"), ","));

        for (a, b) in [(KeyToken::Leader, KeyToken::Key(",".into()))] {
            assert_eq!(tokens_match(&a, &b, ","), tokens_match(&b, &a, ","));
        }
    }

    #[test]
    fn test_match_totality() {
        let pool = [
            "a", "Z", "0", "9", " ", "<Esc>", "<BS>", "<Tab>", "<C-r>", "<leader>", "\\", "é",
            "<number>", "<alpha>", "<any>", "<character>", "<", ">", "",
        ];
        let mut rng = rand::thread_rng();

        for _ in 0..2000 {
            let len = rng.gen_range(0..4);
            let pat: Vec<&str> = (0..len).map(|_| *pool.choose(&mut rng).unwrap()).collect();
            let buf: Vec<String> = (0..len).map(|_| pool.choose(&mut rng).unwrap().to_string()).collect();
            let leader = *pool.choose(&mut rng).unwrap();
            let p = Pattern::keys(&pat);

            let m = p.compare(&buf, leader);
            assert!(matches!(m, KeyMatch::Exact | KeyMatch::None), "{pat:?} {buf:?}");

            for (t, k) in p.alternatives()[0].iter().zip(buf.iter()) {
                let k = buffer_token(k);
                assert_eq!(tokens_match(t, &k, leader), tokens_match(&k, t, leader));
            }
        }
    }
}
