//! # Terminal keys
//!
//! ## Overview
//!
//! Terminal hosts receive key presses as [crossterm] events. [TerminalKey] converts them into
//! the notation strings accepted by [Engine::handle_key](crate::Engine::handle_key).
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use keybindings::normalize_key;

/// A key pressed in a terminal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TerminalKey {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl TerminalKey {
    /// Create a new key.
    pub fn new(code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        if let KeyCode::Char(_) = code {
            // SHIFT is reported for characters like ':' on some platforms, but the character
            // itself already reflects it.
            modifiers -= KeyModifiers::SHIFT;
        }

        Self { code, modifiers }
    }

    /// The normalized notation for this key, if it has one.
    pub fn notation(&self) -> Option<String> {
        let mut mods = String::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            mods.push_str("C-");
        }

        if self.modifiers.contains(KeyModifiers::SHIFT) {
            mods.push_str("S-");
        }

        if self.modifiers.contains(KeyModifiers::ALT) {
            mods.push_str("A-");
        }

        let name = match self.code {
            KeyCode::Char(c) if mods.is_empty() => return Some(c.to_string()),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Backspace => "BS".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => return Some("<S-Tab>".to_string()),
            KeyCode::F(n) => format!("F{n}"),
            _ => return None,
        };

        Some(normalize_key(&format!("<{mods}{name}>")))
    }
}

impl From<KeyEvent> for TerminalKey {
    fn from(ke: KeyEvent) -> Self {
        TerminalKey::new(ke.code, ke.modifiers)
    }
}

impl From<KeyCode> for TerminalKey {
    fn from(code: KeyCode) -> Self {
        TerminalKey::new(code, KeyModifiers::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation() {
        let key = |code, mods| TerminalKey::new(code, mods).notation();

        assert_eq!(key(KeyCode::Char('a'), KeyModifiers::NONE).as_deref(), Some("a"));
        assert_eq!(key(KeyCode::Char(':'), KeyModifiers::SHIFT).as_deref(), Some(":"));
        assert_eq!(key(KeyCode::Char('r'), KeyModifiers::CONTROL).as_deref(), Some("<C-r>"));
        assert_eq!(key(KeyCode::Char(' '), KeyModifiers::NONE).as_deref(), Some(" "));
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE).as_deref(), Some("<Esc>"));
        assert_eq!(key(KeyCode::Backspace, KeyModifiers::NONE).as_deref(), Some("<BS>"));
        assert_eq!(key(KeyCode::Enter, KeyModifiers::NONE).as_deref(), Some("<Enter>"));
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE).as_deref(), Some("<Tab>"));
        assert_eq!(key(KeyCode::BackTab, KeyModifiers::SHIFT).as_deref(), Some("<S-Tab>"));
        assert_eq!(key(KeyCode::Left, KeyModifiers::ALT).as_deref(), Some("<A-Left>"));
        assert_eq!(key(KeyCode::Null, KeyModifiers::NONE), None);
        assert_eq!(TerminalKey::from(KeyCode::Char('x')).notation().as_deref(), Some("x"));
    }
}
