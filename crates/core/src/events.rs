use crate::{EntryId, SpinKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    EntriesAdded { count: usize, roster: usize },
    EntryRemoved { id: EntryId, name: String },
    RosterShuffled { sections: usize },
    WinnerDesignated { name: Option<String>, matched: Option<EntryId> },
    DesignationRepaired,
    SpinStarted {
        kind: SpinKind,
        target_section: usize,
        rotation: f64,
        duration_secs: f64,
        attempt: u32,
    },
    EntriesEliminated {
        section: usize,
        names: Vec<String>,
        remaining: usize,
    },
    SafetyRespinScheduled { landed_section: usize, attempt: u32 },
    WinnerDeclared { name: String },
    GameReset,
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
