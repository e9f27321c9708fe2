//! Protected-winner bookkeeping. The guard only owns the designated name; the
//! per-entry flag lives on the roster and is checked against it here.

use crate::{normalize_name, Entry, EntryId};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GuardViolation {
    /// A designated name is set but no live entry carries it.
    NoMatchingEntry,
    /// The entry matching the designated name is not flagged.
    MatchNotFlagged,
    /// More than one entry is flagged.
    MultipleFlagged,
    /// A flag sits on an entry that is not the designated one.
    StrayFlag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerGuard {
    designated: Option<String>,
}

impl WinnerGuard {
    pub fn designated(&self) -> Option<&str> {
        self.designated.as_deref()
    }

    /// Sets the designated name and flags exactly the first matching entry.
    /// A name that normalizes to empty clears the designation.
    pub fn designate(&mut self, name: &str, roster: &mut [Entry]) -> Option<EntryId> {
        let normalized = normalize_name(name);
        self.designated = if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        };
        self.apply(roster)
    }

    pub fn clear(&mut self, roster: &mut [Entry]) {
        self.designated = None;
        for entry in roster.iter_mut() {
            entry.is_protected_winner = false;
        }
    }

    /// Index of the entry that should carry the flag, if any.
    pub fn expected_index(&self, roster: &[Entry]) -> Option<usize> {
        let name = self.designated.as_deref()?;
        roster
            .iter()
            .position(|entry| entry.is_protected_winner && entry.normalized_name() == name)
            .or_else(|| roster.iter().position(|entry| entry.normalized_name() == name))
    }

    pub fn check(&self, roster: &[Entry]) -> Result<(), GuardViolation> {
        let flagged = roster.iter().filter(|entry| entry.is_protected_winner).count();
        if flagged > 1 {
            return Err(GuardViolation::MultipleFlagged);
        }
        match self.expected_index(roster) {
            None if self.designated.is_some() => Err(GuardViolation::NoMatchingEntry),
            None if flagged > 0 => Err(GuardViolation::StrayFlag),
            None => Ok(()),
            Some(idx) if !roster[idx].is_protected_winner => {
                if flagged > 0 {
                    Err(GuardViolation::StrayFlag)
                } else {
                    Err(GuardViolation::MatchNotFlagged)
                }
            }
            Some(_) => Ok(()),
        }
    }

    pub fn validate(&self, roster: &[Entry]) -> bool {
        match self.check(roster) {
            Ok(()) => true,
            Err(violation) => {
                warn!(?violation, designated = ?self.designated, "winner designation invalid");
                false
            }
        }
    }

    /// Restores a unique, correct flag where the roster allows it. Returns
    /// whether anything changed.
    pub fn repair(&self, roster: &mut [Entry]) -> bool {
        if self.check(roster).is_ok() {
            return false;
        }
        let before: Vec<bool> = roster.iter().map(|entry| entry.is_protected_winner).collect();
        self.apply(roster);
        let changed = roster
            .iter()
            .zip(&before)
            .any(|(entry, was)| entry.is_protected_winner != *was);
        if changed {
            warn!(designated = ?self.designated, "winner designation repaired");
        }
        changed
    }

    /// Flag at most the expected entry and clear every other flag.
    fn apply(&self, roster: &mut [Entry]) -> Option<EntryId> {
        let keep = self.expected_index(roster);
        for (idx, entry) in roster.iter_mut().enumerate() {
            entry.is_protected_winner = Some(idx) == keep;
        }
        keep.map(|idx| roster[idx].id)
    }
}
