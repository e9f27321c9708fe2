use crate::{check_invariants, GameStatus, GameTrace, SimConfig, SimError, SpinRecord};
use spinout_core::{
    EngineConfig, Event, EventBus, GamePhase, ManualClock, Pending, SpinResult, WheelEngine,
};
use tracing::{debug, info};

/// Polls allowed per spin before the driver gives up; covers the spin, every
/// safety re-spin and its cooldown.
const MAX_POLLS_PER_SPIN: u32 = 64;

#[derive(Debug)]
pub struct Simulator {
    pub engine: WheelEngine,
    pub events: EventBus,
    clock: ManualClock,
    check: bool,
    starting_entries: usize,
    spins: Vec<SpinRecord>,
}

impl Simulator {
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let clock = ManualClock::new();
        Self {
            engine: WheelEngine::with_clock(config, seed, Box::new(clock.clone())),
            events: EventBus::default(),
            clock,
            check: true,
            starting_entries: 0,
            spins: Vec::new(),
        }
    }

    pub fn from_config(config: &SimConfig, game: u32) -> Self {
        let mut sim = Self::new(config.engine.clone(), config.seed.wrapping_add(game as u64));
        sim.check = config.check_invariants;
        sim
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn spins(&self) -> &[SpinRecord] {
        &self.spins
    }

    /// Adds names from free text; separators follow the engine's rules.
    pub fn seed_roster(&mut self, raw: &str) -> Result<usize, SimError> {
        let added = self.engine.add_entries(raw, &mut self.events)?;
        self.starting_entries += added;
        self.verify()?;
        Ok(added)
    }

    pub fn import_rows(&mut self, rows: &[Vec<String>]) -> Result<usize, SimError> {
        let added = self.engine.import_entries(rows, &mut self.events)?;
        self.starting_entries += added;
        self.verify()?;
        Ok(added)
    }

    pub fn designate(&mut self, name: &str) -> Result<(), SimError> {
        self.engine.designate_winner(name, &mut self.events)?;
        self.verify()
    }

    /// Runs one spin end to end, fast-forwarding the clock through the
    /// animation and any safety re-spins.
    pub fn step(&mut self) -> Result<SpinRecord, SimError> {
        self.events.drain().for_each(drop);
        let roster_before = self.engine.roster().len();
        let section_count = self.engine.section_count();
        let ticket = self.engine.spin(&mut self.events)?;
        debug!(kind = ?ticket.kind(), target = ticket.decision.target_section, "sim spin");
        let result = self.settle()?;
        let mut safety_respins = 0;
        let mut event_count = 0;
        for event in self.events.drain() {
            event_count += 1;
            if matches!(event, Event::SafetyRespinScheduled { .. }) {
                safety_respins += 1;
            }
        }
        let record = SpinRecord {
            spin: self.spins.len() as u32 + 1,
            kind: result.outcome_kind,
            target_section: ticket.decision.target_section,
            landed_section: result.landed_section,
            section_count,
            rotation_degrees: result.target_rotation_degrees,
            duration_secs: result.duration_secs,
            roster_before,
            roster_after: self.engine.roster().len(),
            eliminated: result
                .eliminated
                .iter()
                .map(|entry| entry.name.clone())
                .collect(),
            safety_respins,
            event_count,
        };
        self.spins.push(record.clone());
        self.verify()?;
        Ok(record)
    }

    pub fn run_to_completion(&mut self, max_spins: u32) -> Result<GameTrace, SimError> {
        let mut status = GameStatus::SpinLimit;
        for _ in 0..max_spins {
            if self.engine.phase() == GamePhase::FinalWinnerDeclared {
                break;
            }
            self.step()?;
        }
        if self.engine.phase() == GamePhase::FinalWinnerDeclared {
            status = GameStatus::WinnerDeclared;
        }
        let trace = GameTrace {
            seed: self.engine.seed(),
            status,
            starting_entries: self.starting_entries,
            designated_winner: self.engine.designated_winner().map(str::to_string),
            spins: self.spins.clone(),
            winner: self.engine.final_winner().map(str::to_string),
            removed: self.engine.ledger().records().to_vec(),
        };
        info!(
            seed = trace.seed,
            spins = trace.spins.len(),
            winner = trace.winner.as_deref().unwrap_or("-"),
            "simulated game finished"
        );
        if trace.status == GameStatus::SpinLimit {
            return Err(SimError::SpinLimit(max_spins));
        }
        Ok(trace)
    }

    fn settle(&mut self) -> Result<SpinResult, SimError> {
        for _ in 0..MAX_POLLS_PER_SPIN {
            match self.engine.pending() {
                Some(Pending::Spinning { resolves_at_ms, .. }) => {
                    self.clock.set_ms(*resolves_at_ms)
                }
                Some(Pending::Cooldown { respin_at_ms, .. }) => self.clock.set_ms(*respin_at_ms),
                None => {}
            }
            if let Some(result) = self.engine.poll(&mut self.events)? {
                return Ok(result);
            }
            if self.engine.pending().is_none() {
                break;
            }
        }
        Err(SimError::Stalled(MAX_POLLS_PER_SPIN))
    }

    fn verify(&self) -> Result<(), SimError> {
        if !self.check {
            return Ok(());
        }
        check_invariants(&self.engine.snapshot()).map_err(SimError::Invariant)
    }
}

/// Plays `config.games` games over the same roster, one seed per game.
pub fn run_batch(
    config: &SimConfig,
    roster: &str,
    designated: Option<&str>,
) -> Result<Vec<GameTrace>, SimError> {
    let mut traces = Vec::with_capacity(config.games as usize);
    for game in 0..config.games {
        let mut sim = Simulator::from_config(config, game);
        sim.seed_roster(roster)?;
        if let Some(name) = designated {
            sim.designate(name)?;
        }
        traces.push(sim.run_to_completion(config.max_spins)?);
    }
    Ok(traces)
}
