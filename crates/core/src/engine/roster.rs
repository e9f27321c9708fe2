use super::*;
use crate::*;
use tracing::{debug, info};

impl WheelEngine {
    /// Adds every name found in free text. Returns how many were added.
    pub fn add_entries(&mut self, raw: &str, events: &mut EventBus) -> Result<usize, GameError> {
        self.ensure_mutable()?;
        let names = split_names(raw);
        Ok(self.append_names(names, events))
    }

    /// Adds names from pre-tokenized rows, skipping numeric and e-mail cells.
    pub fn import_entries(
        &mut self,
        rows: &[Vec<String>],
        events: &mut EventBus,
    ) -> Result<usize, GameError> {
        self.ensure_mutable()?;
        let names = names_from_rows(rows);
        Ok(self.append_names(names, events))
    }

    pub fn remove_entry(
        &mut self,
        id: EntryId,
        events: &mut EventBus,
    ) -> Result<RemovedEntry, GameError> {
        self.ensure_mutable()?;
        let idx = self
            .roster
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(GameError::UnknownEntry(id))?;
        if self.roster[idx].is_protected_winner {
            return Err(GameError::ProtectedEntry(id));
        }
        let entry = self.roster.remove(idx);
        let record = self.ledger.record(&entry, self.clock.now_ms());
        self.repartition();
        self.refresh_guard(events);
        info!(id = %entry.id, name = %entry.name, "entry removed");
        events.push(Event::EntryRemoved {
            id: entry.id,
            name: entry.name,
        });
        Ok(record)
    }

    /// Re-deals sections without spinning.
    pub fn shuffle(&mut self, events: &mut EventBus) -> Result<(), GameError> {
        self.ensure_mutable()?;
        self.repartition();
        self.refresh_guard(events);
        events.push(Event::RosterShuffled {
            sections: self.section_count(),
        });
        Ok(())
    }

    fn append_names(&mut self, names: Vec<String>, events: &mut EventBus) -> usize {
        let count = names.len();
        if count == 0 {
            return 0;
        }
        for name in names {
            let id = self.alloc_entry_id();
            self.roster.push(Entry::new(id, name));
        }
        self.repartition();
        self.refresh_guard(events);
        debug!(added = count, roster = self.roster.len(), "entries added");
        events.push(Event::EntriesAdded {
            count,
            roster: self.roster.len(),
        });
        count
    }
}
