//! # Key notation
//!
//! ## Overview
//!
//! Keys are passed around as normalized notation strings. A printable key is a single grapheme
//! (`"a"`, `"é"`, `" "`), and any other key is a bracketed name (`"<Esc>"`, `"<C-r>"`). The
//! configured leader key can also be written with the `"<leader>"` marker.
//!
//! [parse_keys] splits a whole string of keys, like `"ihello<Esc>."`, into individual keys.
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::char,
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::delimited,
    IResult,
};
use unicode_segmentation::UnicodeSegmentation;

/// The marker used for the leader key in patterns and key buffers.
pub const LEADER: &str = "<leader>";

/// Error produced when a notation string cannot be split into keys.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum NotationError {
    /// Trailing input could not be parsed.
    #[error("Unable to parse key notation at {0:?}")]
    Trailing(String),
}

const MODIFIERS: [(&str, &str); 9] = [
    ("c-", "C-"),
    ("ctrl+", "C-"),
    ("a-", "A-"),
    ("alt+", "A-"),
    ("m-", "A-"),
    ("s-", "S-"),
    ("shift+", "S-"),
    ("d-", "D-"),
    ("cmd+", "D-"),
];

fn is_bracketed(key: &str) -> bool {
    key.len() > 2 && key.starts_with('<') && key.ends_with('>')
}

/// Whether a key is a control-key encoding.
///
/// Backspace and Tab are bracketed but still count as characters, so that they can be captured
/// by patterns that accept any character.
pub fn is_control_key(key: &str) -> bool {
    if !is_bracketed(key) {
        return false;
    }

    let upper = key.to_uppercase();

    return upper != "<BS>" && upper != "<S-BS>" && upper != "<TAB>";
}

fn named_key(name: &str) -> Option<&'static str> {
    let named = match name {
        "esc" | "escape" => "Esc",
        "bs" | "backspace" => "BS",
        "del" | "delete" => "Del",
        "cr" | "enter" | "return" => "Enter",
        "tab" => "Tab",
        "space" => "Space",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "home" => "Home",
        "end" => "End",
        "insert" => "Insert",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        "leader" => "leader",
        _ => return None,
    };

    Some(named)
}

/// Normalize a single key into its canonical notation.
///
/// Names are case-insensitive, modifiers may be written in several styles (`<C-a>`,
/// `<ctrl+a>`), and a shifted letter becomes the uppercase letter.
pub fn normalize_key(key: &str) -> String {
    if key.graphemes(true).count() <= 1 {
        return key.to_string();
    }

    let inner = if is_bracketed(key) { &key[1..key.len() - 1] } else { key };
    let mut rest = inner;
    let mut mods = Vec::new();

    'outer: loop {
        for (prefix, canonical) in MODIFIERS.iter() {
            let matched = rest.len() > prefix.len() &&
                rest.get(..prefix.len()).map_or(false, |p| p.eq_ignore_ascii_case(prefix));

            if matched {
                if !mods.contains(canonical) {
                    mods.push(*canonical);
                }

                rest = &rest[prefix.len()..];
                continue 'outer;
            }
        }

        break;
    }

    let lower = rest.to_lowercase();

    let name = match named_key(&lower) {
        Some("Space") if mods.is_empty() => return " ".to_string(),
        Some("leader") if mods.is_empty() => return LEADER.to_string(),
        Some(named) => named.to_string(),
        None if rest.graphemes(true).count() == 1 => {
            if mods == ["S-"] && rest.chars().all(|c| c.is_alphabetic()) {
                return rest.to_uppercase();
            }

            if mods.is_empty() {
                return rest.to_string();
            }

            lower
        },
        None => rest.to_string(),
    };

    mods.sort_unstable();

    return format!("<{}{}>", mods.concat(), name);
}

/// The text a key inserts when typed, if it is not a control key.
pub fn key_to_text(key: &str) -> Option<String> {
    match key {
        "<Tab>" => Some("\t".to_string()),
        "<Enter>" => Some("\n".to_string()),
        "<Space>" => Some(" ".to_string()),
        k if is_bracketed(k) => None,
        k => Some(k.to_string()),
    }
}

fn parse_bracketed(input: &str) -> IResult<&str, String> {
    let (rest, name) = delimited(char('<'), take_while1(|c| c != '<' && c != '>'), char('>'))(input)?;

    Ok((rest, normalize_key(&format!("<{name}>"))))
}

fn parse_grapheme(input: &str) -> IResult<&str, String> {
    match input.graphemes(true).next() {
        Some(g) => Ok((&input[g.len()..], g.to_string())),
        None => Err(nom::Err::Error(NomError::new(input, ErrorKind::Eof))),
    }
}

/// Split a notation string into normalized keys.
pub fn parse_keys(input: &str) -> Result<Vec<String>, NotationError> {
    match many0(alt((parse_bracketed, parse_grapheme)))(input) {
        Ok(("", keys)) => Ok(keys),
        Ok((rest, _)) => Err(NotationError::Trailing(rest.to_string())),
        Err(_) => Err(NotationError::Trailing(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! keys {
        () => {
            Vec::<String>::new()
        };
        ($($k: expr),+) => {
            vec![$($k.to_string()),*]
        };
    }

    #[test]
    fn test_normalize_names() {
        assert_eq!(normalize_key("a"), "a");
        assert_eq!(normalize_key("<esc>"), "<Esc>");
        assert_eq!(normalize_key("<ESCAPE>"), "<Esc>");
        assert_eq!(normalize_key("<cr>"), "<Enter>");
        assert_eq!(normalize_key("<space>"), " ");
        assert_eq!(normalize_key("<Leader>"), "<leader>");
        assert_eq!(normalize_key("esc"), "<Esc>");
        assert_eq!(normalize_key("<bs>"), "<BS>");
    }

    #[test]
    fn test_normalize_modifiers() {
        assert_eq!(normalize_key("<C-r>"), "<C-r>");
        assert_eq!(normalize_key("<c-R>"), "<C-r>");
        assert_eq!(normalize_key("<ctrl+r>"), "<C-r>");
        assert_eq!(normalize_key("<m-x>"), "<A-x>");
        assert_eq!(normalize_key("<S-a>"), "A");
        assert_eq!(normalize_key("<s-tab>"), "<S-Tab>");
        assert_eq!(normalize_key("<a-c-x>"), "<A-C-x>");
        assert_eq!(normalize_key("<C-->"), "<C-->");
    }

    #[test]
    fn test_control_keys() {
        assert!(is_control_key("<Esc>"));
        assert!(is_control_key("<C-v>"));
        assert!(is_control_key("<leader>"));
        assert!(!is_control_key("<BS>"));
        assert!(!is_control_key("<bs>"));
        assert!(!is_control_key("<S-BS>"));
        assert!(!is_control_key("<Tab>"));
        assert!(!is_control_key("<"));
        assert!(!is_control_key("<>"));
        assert!(!is_control_key("a"));
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(parse_keys("dw").unwrap(), keys!("d", "w"));
        assert_eq!(
            parse_keys("ihello<Esc>.").unwrap(),
            keys!("i", "h", "e", "l", "l", "o", "<Esc>", ".")
        );
        assert_eq!(parse_keys("<leader>w").unwrap(), keys!("<leader>", "w"));
        assert_eq!(parse_keys("a<b").unwrap(), keys!("a", "<", "b"));
        assert_eq!(parse_keys("<>").unwrap(), keys!("<", ">"));
        assert_eq!(parse_keys("").unwrap(), Vec::<String>::new());
        assert_eq!(parse_keys("e\u{301}x").unwrap(), keys!("e\u{301}", "x"));
    }

    #[test]
    fn test_key_to_text() {
        assert_eq!(key_to_text("a").as_deref(), Some("a"));
        assert_eq!(key_to_text("<Tab>").as_deref(), Some("\t"));
        assert_eq!(key_to_text("<Enter>").as_deref(), Some("\n"));
        assert_eq!(key_to_text("<Esc>"), None);
        assert_eq!(key_to_text("<"), Some("<".to_string()));
    }
}
