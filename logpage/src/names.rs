use std::fmt;

/// Display names for the numeric keys used inside vendor pages.
pub type KeyNameTable = [(u32, &'static str)];

/// Result of a key lookup. Keys missing from a table keep their raw value
/// so the label can be produced by whoever renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeName {
    Known(&'static str),
    Unknown(u32),
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeName::Known(name) => f.pad(name),
            AttributeName::Unknown(key) => f.pad(&format!("Attribute {:#x}", key)),
        }
    }
}

pub fn lookup(table: &KeyNameTable, key: u32) -> AttributeName {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(AttributeName::Unknown(key), |(_, name)| {
            AttributeName::Known(name)
        })
}
