use crate::{Entry, EntryId, RemovedEntry};
use serde::{Deserialize, Serialize};

/// Append-only record of everyone who left the wheel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemovalLedger {
    records: Vec<RemovedEntry>,
}

impl RemovalLedger {
    pub fn record(&mut self, entry: &Entry, removed_at_ms: u64) -> RemovedEntry {
        let record = RemovedEntry::from_entry(entry, removed_at_ms);
        self.records.push(record.clone());
        record
    }

    pub fn records(&self) -> &[RemovedEntry] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.records.iter().any(|record| record.id == id)
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
