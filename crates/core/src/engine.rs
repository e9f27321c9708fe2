use crate::{
    sections, Clock, EngineConfig, EngineSnapshot, Entry, EntryId, Event, EventBus, GamePhase,
    Pending, RemovalLedger, RngState, Section, SpinError, SystemClock, WinnerGuard,
};
use thiserror::Error;
use tracing::{info, warn};

mod designation;
mod resolve;
mod roster;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("a spin is already in progress")]
    SpinInProgress,
    #[error("roster is empty")]
    EmptyRoster,
    #[error("a final winner has already been declared")]
    GameOver,
    #[error("designated winner {0:?} is not on the roster")]
    DesignationUnresolved(String),
    #[error("no section is free of the protected winner")]
    NoSafeSection,
    #[error("unknown entry {0}")]
    UnknownEntry(EntryId),
    #[error("entry {0} is the protected winner")]
    ProtectedEntry(EntryId),
    #[error("wheel landed on the protected winner after {0} re-spins")]
    RespinLimitExceeded(u32),
}

impl From<SpinError> for GameError {
    fn from(value: SpinError) -> Self {
        match value {
            SpinError::EmptyRoster => Self::EmptyRoster,
            SpinError::NoSafeSection => Self::NoSafeSection,
        }
    }
}

/// The elimination game. Owns the roster, the removal ledger and the winner
/// designation; every other component is a pure function over its state.
#[derive(Debug)]
pub struct WheelEngine {
    pub config: EngineConfig,
    rng: RngState,
    clock: Box<dyn Clock>,
    roster: Vec<Entry>,
    ledger: RemovalLedger,
    guard: WinnerGuard,
    phase: GamePhase,
    pending: Option<Pending>,
    final_winner: Option<String>,
    next_entry_id: u64,
}

impl WheelEngine {
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        Self::with_clock(config, seed, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: EngineConfig, seed: u64, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            rng: RngState::from_seed(seed),
            clock,
            roster: Vec::new(),
            ledger: RemovalLedger::default(),
            guard: WinnerGuard::default(),
            phase: GamePhase::Playing,
            pending: None,
            final_winner: None,
            next_entry_id: 1,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn roster(&self) -> &[Entry] {
        &self.roster
    }

    pub fn ledger(&self) -> &RemovalLedger {
        &self.ledger
    }

    pub fn designated_winner(&self) -> Option<&str> {
        self.guard.designated()
    }

    pub fn final_winner(&self) -> Option<&str> {
        self.final_winner.as_deref()
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn sections(&self) -> Vec<Section> {
        sections(&self.roster, &self.config.partition)
    }

    pub fn section_count(&self) -> usize {
        self.config.partition.section_count(self.roster.len())
    }

    pub fn protected_entry(&self) -> Option<&Entry> {
        self.roster.iter().find(|entry| entry.is_protected_winner)
    }

    pub fn eliminable_population(&self) -> usize {
        crate::eliminable_population(&self.roster)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            phase: self.phase,
            roster: self.roster.clone(),
            sections: self.sections(),
            section_count: self.section_count(),
            removed: self.ledger.records().to_vec(),
            designated_winner: self.guard.designated().map(str::to_string),
            protected_entry: self.protected_entry().map(|entry| entry.id),
            eliminable_population: self.eliminable_population(),
            pending: self.pending.clone(),
            final_winner: self.final_winner.clone(),
        }
    }

    /// Clears everything and starts over. Allowed in any state, including
    /// mid-spin; a pending resolution is dropped.
    pub fn reset(&mut self, events: &mut EventBus) {
        if self.pending.is_some() {
            warn!("reset dropped a pending spin");
        }
        self.roster.clear();
        self.ledger.clear();
        self.guard.clear(&mut self.roster);
        self.phase = GamePhase::Playing;
        self.pending = None;
        self.final_winner = None;
        info!("game reset");
        events.push(Event::GameReset);
    }

    fn ensure_mutable(&self) -> Result<(), GameError> {
        if self.pending.is_some() {
            return Err(GameError::SpinInProgress);
        }
        if self.phase == GamePhase::FinalWinnerDeclared {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn alloc_entry_id(&mut self) -> EntryId {
        let id = EntryId(self.next_entry_id);
        self.next_entry_id = self.next_entry_id.saturating_add(1);
        id
    }

    /// Re-checks the designation after a mutation, repairing it when the
    /// roster allows. Returns whether a repair happened.
    fn refresh_guard(&mut self, events: &mut EventBus) -> bool {
        if self.guard.check(&self.roster).is_ok() {
            return false;
        }
        let repaired = self.guard.repair(&mut self.roster);
        if repaired {
            events.push(Event::DesignationRepaired);
        }
        repaired
    }

    fn repartition(&mut self) {
        self.roster = crate::assign(&self.roster, &self.config.partition, &mut self.rng);
    }

    fn declare_winner(&mut self, name: String, events: &mut EventBus) {
        info!(winner = %name, removed = self.ledger.len(), "final winner declared");
        self.phase = GamePhase::FinalWinnerDeclared;
        self.pending = None;
        self.final_winner = Some(name.clone());
        events.push(Event::WinnerDeclared { name });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, SpinKind};

    pub(super) fn engine(seed: u64) -> (WheelEngine, ManualClock) {
        let clock = ManualClock::new();
        let engine =
            WheelEngine::with_clock(EngineConfig::default(), seed, Box::new(clock.clone()));
        (engine, clock)
    }

    pub(super) fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[test]
    fn new_engine_is_idle_and_empty() {
        let (engine, _) = engine(1);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.roster().is_empty());
        assert!(!engine.is_spinning());
        assert_eq!(engine.section_count(), 0);
    }

    #[test]
    fn reset_after_final_winner_restores_playing() {
        let (mut engine, clock) = engine(3);
        let mut events = EventBus::default();
        engine.add_entries("A, B", &mut events).expect("add");
        engine.designate_winner("b", &mut events).expect("designate");
        let ticket = engine.spin(&mut events).expect("spin");
        assert_eq!(ticket.kind(), SpinKind::Final);
        clock.set_ms(ticket.resolves_at_ms);
        let result = engine.poll(&mut events).expect("poll").expect("resolved");
        assert_eq!(result.final_winner.as_deref(), Some("B"));
        assert_eq!(engine.phase(), GamePhase::FinalWinnerDeclared);

        engine.reset(&mut events);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.roster().is_empty());
        assert!(engine.ledger().is_empty());
        assert_eq!(engine.designated_winner(), None);
        assert_eq!(engine.final_winner(), None);
        assert!(events.drain().any(|event| event == Event::GameReset));
    }

    #[test]
    fn reset_mid_spin_drops_pending() {
        let (mut engine, _) = engine(5);
        let mut events = EventBus::default();
        engine.add_entries("A B C D", &mut events).expect("add");
        engine.spin(&mut events).expect("spin");
        assert!(engine.is_spinning());
        engine.reset(&mut events);
        assert!(!engine.is_spinning());
        assert_eq!(engine.poll(&mut events), Ok(None));
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut engine, _) = engine(8);
        let mut events = EventBus::default();
        engine
            .add_entries("Ann, Ben, Cat, Dan, Eve, Fay, Gus", &mut events)
            .expect("add");
        engine.designate_winner("Cat", &mut events).expect("designate");
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.roster.len(), 7);
        assert_eq!(snapshot.section_count, 6);
        assert_eq!(snapshot.sections.len(), 6);
        assert_eq!(snapshot.eliminable_population, 6);
        assert_eq!(snapshot.designated_winner.as_deref(), Some("cat"));
        let protected = snapshot.protected_entry.expect("protected");
        let cat = snapshot
            .roster
            .iter()
            .find(|entry| entry.name == "Cat")
            .expect("cat");
        assert_eq!(protected, cat.id);
        assert_eq!(names(&snapshot.roster)[2], "Cat");
    }
}
