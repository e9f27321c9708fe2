use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One participant on the wheel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub section_index: usize,
    #[serde(default)]
    pub is_protected_winner: bool,
}

impl Entry {
    pub fn new(id: EntryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            section_index: 0,
            is_protected_winner: false,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Audit record for an entry that left the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemovedEntry {
    pub id: EntryId,
    pub name: String,
    pub removed_at_ms: u64,
    pub was_protected_winner: bool,
}

impl RemovedEntry {
    pub fn from_entry(entry: &Entry, removed_at_ms: u64) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            removed_at_ms,
            was_protected_winner: entry.is_protected_winner,
        }
    }
}

/// Lowercase, trim, and drop every whitespace character so that "  Mary Ann"
/// and "maryann" name the same participant.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_ignores_case_and_spacing() {
        assert_eq!(normalize_name("  Mary Ann "), "maryann");
        assert_eq!(normalize_name("BOB"), "bob");
        assert_eq!(normalize_name("a\tb\nc"), "abc");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn removed_entry_copies_identity() {
        let mut entry = Entry::new(EntryId(4), "Dana");
        entry.section_index = 2;
        let removed = RemovedEntry::from_entry(&entry, 1200);
        assert_eq!(removed.id, EntryId(4));
        assert_eq!(removed.name, "Dana");
        assert_eq!(removed.removed_at_ms, 1200);
        assert!(!removed.was_protected_winner);
    }
}
