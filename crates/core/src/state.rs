use crate::{Entry, EntryId, RemovedEntry, Section, SpinDecision, SpinKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    FinalWinnerDeclared,
}

/// What the engine is waiting on, if anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Pending {
    /// The wheel is turning; resolution fires at `resolves_at_ms`.
    Spinning {
        decision: SpinDecision,
        resolves_at_ms: u64,
        attempt: u32,
    },
    /// A landing was rejected; a fresh spin starts at `respin_at_ms`.
    Cooldown { respin_at_ms: u64, attempt: u32 },
}

/// Returned as soon as a spin is requested. The decision is final.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinTicket {
    pub decision: SpinDecision,
    pub started_at_ms: u64,
    pub resolves_at_ms: u64,
    pub attempt: u32,
}

impl SpinTicket {
    pub fn kind(&self) -> SpinKind {
        self.decision.kind
    }

    pub fn rotation_at(&self, progress: f64) -> f64 {
        self.decision.rotation_at(progress)
    }
}

/// The settled result of a spin, available once its resolution fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinResult {
    pub outcome_kind: SpinKind,
    pub target_rotation_degrees: f64,
    pub duration_secs: f64,
    pub landed_section: usize,
    pub eliminated: Vec<Entry>,
    pub final_winner: Option<String>,
}

/// Read-only view of the whole engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSnapshot {
    pub phase: GamePhase,
    pub roster: Vec<Entry>,
    pub sections: Vec<Section>,
    pub section_count: usize,
    pub removed: Vec<RemovedEntry>,
    pub designated_winner: Option<String>,
    pub protected_entry: Option<EntryId>,
    pub eliminable_population: usize,
    pub pending: Option<Pending>,
    pub final_winner: Option<String>,
}
