use crate::{Entry, EntryId, PartitionRule, RngState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("protected winner count changed from {before} to {after}")]
    ProtectedCountChanged { before: usize, after: usize },
    #[error("protected winner moved from {before:?} to {after:?}")]
    ProtectedIdentityChanged {
        before: Option<EntryId>,
        after: Option<EntryId>,
    },
    #[error("entry {id} assigned to section {index} of {count}")]
    SectionOutOfRange {
        id: EntryId,
        index: usize,
        count: usize,
    },
}

/// A wheel wedge. Derived from the roster on every read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub index: usize,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn contains_protected(&self) -> bool {
        self.entries.iter().any(|entry| entry.is_protected_winner)
    }

    pub fn is_safe(&self) -> bool {
        !self.contains_protected()
    }
}

/// Section count for a roster of `entries` under the default rule.
pub fn section_count(entries: usize) -> usize {
    PartitionRule::default().section_count(entries)
}

/// Rewrites every `section_index` for the roster, keeping display order and
/// protection flags intact. Falls back to the input roster if the result
/// fails verification.
pub fn assign(roster: &[Entry], rule: &PartitionRule, rng: &mut RngState) -> Vec<Entry> {
    match try_assign(roster, rule, rng) {
        Ok(entries) => entries,
        Err(err) => {
            error!(%err, "partition aborted, keeping previous section layout");
            roster.to_vec()
        }
    }
}

pub fn try_assign(
    roster: &[Entry],
    rule: &PartitionRule,
    rng: &mut RngState,
) -> Result<Vec<Entry>, PartitionError> {
    let count = rule.section_count(roster.len());
    let mut out = roster.to_vec();
    if roster.len() <= rule.individual_max {
        for (pos, entry) in out.iter_mut().enumerate() {
            entry.section_index = pos;
        }
    } else {
        let mut order: Vec<usize> = (0..out.len()).collect();
        rng.shuffle(&mut order);
        for (pos, idx) in order.into_iter().enumerate() {
            out[idx].section_index = pos % count;
        }
    }
    verify(roster, &out, count)?;
    debug!(entries = out.len(), sections = count, "roster partitioned");
    Ok(out)
}

fn verify(before: &[Entry], after: &[Entry], count: usize) -> Result<(), PartitionError> {
    let flagged = |entries: &[Entry]| -> Vec<EntryId> {
        entries
            .iter()
            .filter(|entry| entry.is_protected_winner)
            .map(|entry| entry.id)
            .collect()
    };
    let prior = flagged(before);
    let next = flagged(after);
    if prior.len() != next.len() {
        return Err(PartitionError::ProtectedCountChanged {
            before: prior.len(),
            after: next.len(),
        });
    }
    if prior != next {
        return Err(PartitionError::ProtectedIdentityChanged {
            before: prior.first().copied(),
            after: next.first().copied(),
        });
    }
    if let Some(entry) = after.iter().find(|entry| entry.section_index >= count) {
        return Err(PartitionError::SectionOutOfRange {
            id: entry.id,
            index: entry.section_index,
            count,
        });
    }
    Ok(())
}

/// Groups the roster by `section_index`. Entries keep roster order inside a
/// section.
pub fn sections(roster: &[Entry], rule: &PartitionRule) -> Vec<Section> {
    let count = rule.section_count(roster.len());
    let mut out: Vec<Section> = (0..count)
        .map(|index| Section {
            index,
            entries: Vec::new(),
        })
        .collect();
    for entry in roster {
        if let Some(section) = out.get_mut(entry.section_index) {
            section.entries.push(entry.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<Entry> {
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| Entry::new(EntryId(idx as u64 + 1), *name))
            .collect()
    }

    #[test]
    fn section_count_tiers() {
        assert_eq!(section_count(0), 0);
        assert_eq!(section_count(1), 1);
        assert_eq!(section_count(6), 6);
        assert_eq!(section_count(7), 6);
        assert_eq!(section_count(50), 6);
        assert_eq!(section_count(51), 6);
        assert_eq!(section_count(61), 7);
        assert_eq!(section_count(120), 12);
        assert_eq!(section_count(500), 12);
        assert_eq!(section_count(501), 19);
        assert_eq!(section_count(5000), 20);
    }

    #[test]
    fn small_rosters_get_individual_slices_in_order() {
        let mut rng = RngState::from_seed(1);
        let rule = PartitionRule::default();
        let out = assign(&roster(&["A", "B", "C", "D"]), &rule, &mut rng);
        let indices: Vec<usize> = out.iter().map(|entry| entry.section_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn seven_entries_fill_six_sections() {
        let mut rng = RngState::from_seed(11);
        let rule = PartitionRule::default();
        let out = assign(&roster(&["A", "B", "C", "D", "E", "F", "G"]), &rule, &mut rng);
        let mut sizes: Vec<usize> = sections(&out, &rule)
            .iter()
            .map(|section| section.entries.len())
            .collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 1, 1, 1, 1, 2]);
    }

    #[test]
    fn assign_keeps_order_and_protection() {
        let mut rng = RngState::from_seed(5);
        let rule = PartitionRule::default();
        let names: Vec<String> = (0..80).map(|idx| format!("p{idx}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut input = roster(&refs);
        input[17].is_protected_winner = true;
        let out = assign(&input, &rule, &mut rng);
        assert_eq!(out.len(), input.len());
        for (before, after) in input.iter().zip(&out) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.is_protected_winner, after.is_protected_winner);
            assert!(after.section_index < section_count(80));
        }
    }

    #[test]
    fn load_is_near_even() {
        let mut rng = RngState::from_seed(21);
        let rule = PartitionRule::default();
        let names: Vec<String> = (0..233).map(|idx| format!("p{idx}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let out = assign(&roster(&refs), &rule, &mut rng);
        let sizes: Vec<usize> = sections(&out, &rule)
            .iter()
            .map(|section| section.entries.len())
            .collect();
        let min = sizes.iter().min().copied().unwrap_or(0);
        let max = sizes.iter().max().copied().unwrap_or(0);
        assert!(max - min <= 1, "uneven sections: {sizes:?}");
    }

    #[test]
    fn verify_rejects_dropped_protection() {
        let mut before = roster(&["A", "B"]);
        before[1].is_protected_winner = true;
        let mut after = before.clone();
        after[1].is_protected_winner = false;
        assert_eq!(
            verify(&before, &after, 2),
            Err(PartitionError::ProtectedCountChanged {
                before: 1,
                after: 0
            })
        );
    }
}
