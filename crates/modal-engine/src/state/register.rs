use std::collections::HashMap;

use bitflags::bitflags;

use editor_types::prelude::*;

use crate::repeat::RecordedMacro;

bitflags! {
    /// Flags that control the behaviour of [RegisterStore::put].
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct RegisterPutFlags: u32 {
        /// No flags set.
        const NONE = 0b00000000;

        /// Append contents to register.
        const APPEND = 0b00000001;

        /// The value being put came from deleting text.
        const DELETE = 0b00000010;
    }
}

/// The text held by a register.
///
/// Multiple cursors yank one value each, so that pasting with the same number of cursors puts
/// each value back under its own cursor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterCell {
    /// The shape of the text.
    pub shape: TargetShape,

    /// One value per cursor.
    pub values: Vec<String>,
}

impl RegisterCell {
    /// Create a new cell.
    pub fn new(shape: TargetShape, values: Vec<String>) -> Self {
        RegisterCell { shape, values }
    }

    /// All of the values, joined by newlines.
    pub fn text(&self) -> String {
        self.values.join("\n")
    }

    /// The value to paste at cursor `idx` of `total`.
    pub fn value_for(&self, idx: usize, total: usize) -> String {
        if total == self.values.len() {
            self.values[idx].clone()
        } else {
            self.text()
        }
    }

    /// Whether the cell holds no text.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Append another cell's contents to this one.
    pub fn merge(&self, other: &RegisterCell) -> RegisterCell {
        let shape = match (self.shape, other.shape) {
            (_, TargetShape::LineWise) | (TargetShape::LineWise, _) => TargetShape::LineWise,
            (shape, _) => shape,
        };
        let sep = if shape == TargetShape::LineWise { "\n" } else { "" };

        let values = if self.values.len() == other.values.len() {
            self.values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| format!("{a}{sep}{b}"))
                .collect()
        } else {
            vec![format!("{}{sep}{}", self.text(), other.text())]
        };

        RegisterCell::new(shape, values)
    }
}

impl From<&str> for RegisterCell {
    fn from(s: &str) -> RegisterCell {
        RegisterCell::new(TargetShape::CharWise, vec![s.to_string()])
    }
}

/// What a named register holds.
#[derive(Clone, Debug)]
pub enum RegisterContent {
    /// Text from a yank or a delete.
    Text(RegisterCell),

    /// A recorded macro.
    Macro(RecordedMacro),
}

/// Storage for register values.
#[derive(Debug, Default)]
pub struct RegisterStore {
    unnamed: RegisterCell,
    named: HashMap<char, RegisterContent>,
    last_yanked: RegisterCell,
    last_deleted: Vec<RegisterCell>,
    small_delete: RegisterCell,
    last_inserted: RegisterCell,
}

impl RegisterStore {
    fn push_deleted(&mut self, cell: RegisterCell) {
        if cell.shape == TargetShape::LineWise || cell.values.iter().any(|v| v.contains('\n')) {
            self.last_deleted.insert(0, cell);
            self.last_deleted.truncate(9);
        } else {
            self.small_delete = cell;
        }
    }

    /// Get the text of a register.
    pub fn get(&self, reg: &Register) -> RegisterCell {
        match reg {
            Register::Unnamed => self.unnamed.clone(),
            Register::Named(c) => {
                match self.named.get(c) {
                    Some(RegisterContent::Text(cell)) => cell.clone(),
                    Some(RegisterContent::Macro(m)) => RegisterCell::from(m.keys.concat().as_str()),
                    None => RegisterCell::default(),
                }
            },
            Register::RecentlyDeleted(n) => self.last_deleted.get(*n).cloned().unwrap_or_default(),
            Register::SmallDelete => self.small_delete.clone(),
            Register::LastYanked => self.last_yanked.clone(),
            Register::LastInserted => self.last_inserted.clone(),
            Register::Blackhole => RegisterCell::default(),
        }
    }

    /// Update a register.
    ///
    /// Writes to any register other than the black hole also update the unnamed register, and
    /// yanks and deletes also update the numbered registers.
    pub fn put(&mut self, reg: &Register, cell: RegisterCell, flags: RegisterPutFlags) {
        let cell = if flags.contains(RegisterPutFlags::APPEND) {
            self.get(reg).merge(&cell)
        } else {
            cell
        };

        match reg {
            Register::Blackhole => return,
            Register::Named(c) => {
                self.named.insert(*c, RegisterContent::Text(cell.clone()));
            },
            Register::LastInserted => {
                self.last_inserted = cell;
                return;
            },
            Register::RecentlyDeleted(n) => {
                if let Some(slot) = self.last_deleted.get_mut(*n) {
                    *slot = cell.clone();
                }
            },
            Register::SmallDelete => {
                self.small_delete = cell.clone();
            },
            Register::LastYanked => {
                self.last_yanked = cell.clone();
            },
            Register::Unnamed => {},
        }

        if flags.contains(RegisterPutFlags::DELETE) {
            self.push_deleted(cell.clone());
        } else if *reg == Register::Unnamed {
            self.last_yanked = cell.clone();
        }

        self.unnamed = cell;
    }

    /// Store a recorded macro in a named register.
    pub fn put_macro(&mut self, name: char, recorded: RecordedMacro, append: bool) {
        let recorded = match (append, self.named.remove(&name)) {
            (true, Some(RegisterContent::Macro(mut prev))) => {
                prev.append(recorded);
                prev
            },
            (_, _) => recorded,
        };

        self.named.insert(name, RegisterContent::Macro(recorded));
    }

    /// Get the contents of a named register, for replaying as a macro.
    pub fn get_macro(&self, name: char) -> Option<RegisterContent> {
        match name {
            '"' => Some(RegisterContent::Text(self.unnamed.clone())),
            c => self.named.get(&c.to_ascii_lowercase()).cloned(),
        }
    }
}
