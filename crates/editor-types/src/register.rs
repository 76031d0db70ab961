//! # Registers
//!
//! Registers hold yanked and deleted text, and recorded macros. This module names them, and maps
//! them to and from the single characters typed after `"`, `q` and `@`.

/// A named storage slot for text or macros.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Register {
    /// The default register, updated by every yank and delete.
    #[default]
    Unnamed,

    /// A register named by a lowercase letter.
    Named(char),

    /// One of the nine most recent multi-line deletions, most recent first.
    RecentlyDeleted(usize),

    /// The most recent deletion within a single line.
    SmallDelete,

    /// The most recently yanked text.
    LastYanked,

    /// The text typed during the last insert session.
    LastInserted,

    /// Discards everything written to it.
    Blackhole,
}

impl Register {
    /// Whether this register can hold a recorded macro.
    pub fn is_macro_register(&self) -> bool {
        matches!(self, Register::Named(_) | Register::Unnamed)
    }
}

/// Map a typed character to the register it names, and whether writes to it should append.
pub fn char_to_register(c: char) -> Option<(Register, bool)> {
    let r = match c {
        // Numbers
        '0' => Register::LastYanked,
        c @ '1'..='9' => Register::RecentlyDeleted(c as usize - '1' as usize),

        // Lowercase letters
        c @ 'a'..='z' => Register::Named(c),

        // Uppercase letters append
        c @ 'A'..='Z' => return Some((Register::Named(c.to_ascii_lowercase()), true)),

        // Special characters
        '"' => Register::Unnamed,
        '-' => Register::SmallDelete,
        '.' => Register::LastInserted,
        '_' => Register::Blackhole,

        _ => return None,
    };

    return Some((r, false));
}

/// Map a register back to the character that names it.
pub fn register_to_char(reg: &Register, append: bool) -> char {
    match reg {
        Register::Named(c) => {
            if append {
                c.to_ascii_uppercase()
            } else {
                *c
            }
        },
        Register::RecentlyDeleted(n) => char::from_digit((*n as u32 + 1).min(9), 10).unwrap_or('9'),
        Register::Unnamed => '"',
        Register::SmallDelete => '-',
        Register::LastYanked => '0',
        Register::LastInserted => '.',
        Register::Blackhole => '_',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_register() {
        assert_eq!(char_to_register('a'), Some((Register::Named('a'), false)));
        assert_eq!(char_to_register('Q'), Some((Register::Named('q'), true)));
        assert_eq!(char_to_register('0'), Some((Register::LastYanked, false)));
        assert_eq!(char_to_register('1'), Some((Register::RecentlyDeleted(0), false)));
        assert_eq!(char_to_register('9'), Some((Register::RecentlyDeleted(8), false)));
        assert_eq!(char_to_register('_'), Some((Register::Blackhole, false)));
        assert_eq!(char_to_register('!'), None);
    }

    #[test]
    fn test_register_roundtrip_chars() {
        for c in "0123456789abcxyzABCXYZ\"-._".chars() {
            let (reg, append) = char_to_register(c).unwrap();
            assert_eq!(register_to_char(&reg, append), c);
        }
    }
}
