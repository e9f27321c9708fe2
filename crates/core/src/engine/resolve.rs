use super::*;
use crate::*;
use std::collections::HashSet;
use tracing::{error, info, warn};

impl WheelEngine {
    /// Commits the next spin's outcome and schedules its resolution. The
    /// returned ticket is everything a renderer needs to animate the wheel.
    pub fn spin(&mut self, events: &mut EventBus) -> Result<SpinTicket, GameError> {
        if self.pending.is_some() {
            return Err(GameError::SpinInProgress);
        }
        if self.phase == GamePhase::FinalWinnerDeclared {
            return Err(GameError::GameOver);
        }
        if self.roster.is_empty() {
            return Err(GameError::EmptyRoster);
        }
        self.ensure_designation(events)?;
        self.start_spin(0, events)
    }

    /// Fires whatever continuation is due: a spin resolution or an automatic
    /// re-spin. Returns the result once a spin settles.
    ///
    /// The pending slot is vacated before any resolution work, so an error
    /// always leaves the engine idle.
    pub fn poll(&mut self, events: &mut EventBus) -> Result<Option<SpinResult>, GameError> {
        let now = self.clock.now_ms();
        let due = match &self.pending {
            None => false,
            Some(Pending::Spinning { resolves_at_ms, .. }) => now >= *resolves_at_ms,
            Some(Pending::Cooldown { respin_at_ms, .. }) => now >= *respin_at_ms,
        };
        if !due {
            return Ok(None);
        }
        match self.pending.take() {
            Some(Pending::Spinning {
                decision, attempt, ..
            }) => self.resolve(decision, attempt, events),
            Some(Pending::Cooldown { attempt, .. }) => {
                self.ensure_designation(events)?;
                self.start_spin(attempt, events)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn start_spin(&mut self, attempt: u32, events: &mut EventBus) -> Result<SpinTicket, GameError> {
        let decision = decide(&self.roster, &self.config, &mut self.rng)?;
        let started_at_ms = self.clock.now_ms();
        let duration_ms = (decision.duration_secs * 1000.0).round().max(0.0) as u64;
        let resolves_at_ms = started_at_ms.saturating_add(duration_ms);
        events.push(Event::SpinStarted {
            kind: decision.kind,
            target_section: decision.target_section,
            rotation: decision.target_rotation_degrees,
            duration_secs: decision.duration_secs,
            attempt,
        });
        self.pending = Some(Pending::Spinning {
            decision: decision.clone(),
            resolves_at_ms,
            attempt,
        });
        Ok(SpinTicket {
            decision,
            started_at_ms,
            resolves_at_ms,
            attempt,
        })
    }

    fn resolve(
        &mut self,
        decision: SpinDecision,
        attempt: u32,
        events: &mut EventBus,
    ) -> Result<Option<SpinResult>, GameError> {
        self.refresh_guard(events);
        let landed = decision.landed_section();
        if decision.kind == SpinKind::Final {
            if let Some(winner) = self.final_candidate() {
                if winner.section_index != landed {
                    warn!(landed, winner = %winner.name, "final spin missed the winner's section");
                    return self.schedule_respin(landed, attempt, events).map(|_| None);
                }
                return Ok(Some(self.resolve_final(&decision, winner, events)));
            }
            warn!(landed, "final spin lost its winner, resolving as regular");
        }

        let landed_entries: Vec<Entry> = self
            .roster
            .iter()
            .filter(|entry| entry.section_index == landed)
            .cloned()
            .collect();
        if landed_entries.iter().any(|entry| entry.is_protected_winner) {
            return self.schedule_respin(landed, attempt, events).map(|_| None);
        }

        let population = self.eliminable_population();
        let eliminated = select(
            &landed_entries,
            population,
            &self.config.elimination,
            &mut self.rng,
        );
        let removed_at_ms = self.clock.now_ms();
        let ids: HashSet<EntryId> = eliminated.iter().map(|entry| entry.id).collect();
        for entry in &eliminated {
            self.ledger.record(entry, removed_at_ms);
        }
        self.roster.retain(|entry| !ids.contains(&entry.id));
        self.repartition();
        self.refresh_guard(events);

        let names: Vec<String> = eliminated.iter().map(|entry| entry.name.clone()).collect();
        info!(
            section = landed,
            eliminated = names.len(),
            remaining = self.roster.len(),
            "entries eliminated"
        );
        events.push(Event::EntriesEliminated {
            section: landed,
            names,
            remaining: self.roster.len(),
        });

        let final_winner = if self.roster.len() == 1 {
            let name = self.roster[0].name.clone();
            self.declare_winner(name.clone(), events);
            Some(name)
        } else {
            None
        };
        Ok(Some(SpinResult {
            outcome_kind: SpinKind::Regular,
            target_rotation_degrees: decision.target_rotation_degrees,
            duration_secs: decision.duration_secs,
            landed_section: landed,
            eliminated,
            final_winner,
        }))
    }

    /// The entry a final spin crowns: the protected winner, or the sole
    /// entry of an undesignated game.
    fn final_candidate(&self) -> Option<Entry> {
        self.protected_entry()
            .or_else(|| match self.roster.as_slice() {
                [only] => Some(only),
                _ => None,
            })
            .cloned()
    }

    /// Clears everyone but the winner off the wheel and ends the game.
    fn resolve_final(
        &mut self,
        decision: &SpinDecision,
        winner: Entry,
        events: &mut EventBus,
    ) -> SpinResult {
        let landed = decision.landed_section();
        let removed_at_ms = self.clock.now_ms();
        let eliminated: Vec<Entry> = self
            .roster
            .iter()
            .filter(|entry| entry.id != winner.id)
            .cloned()
            .collect();
        for entry in &eliminated {
            self.ledger.record(entry, removed_at_ms);
        }
        self.roster.retain(|entry| entry.id == winner.id);
        self.repartition();
        self.refresh_guard(events);
        if !eliminated.is_empty() {
            events.push(Event::EntriesEliminated {
                section: landed,
                names: eliminated.iter().map(|entry| entry.name.clone()).collect(),
                remaining: self.roster.len(),
            });
        }
        self.declare_winner(winner.name.clone(), events);
        SpinResult {
            outcome_kind: SpinKind::Final,
            target_rotation_degrees: decision.target_rotation_degrees,
            duration_secs: decision.duration_secs,
            landed_section: landed,
            eliminated,
            final_winner: Some(winner.name),
        }
    }

    fn schedule_respin(
        &mut self,
        landed: usize,
        attempt: u32,
        events: &mut EventBus,
    ) -> Result<(), GameError> {
        let next = attempt.saturating_add(1);
        if next > self.config.safety.max_respins {
            error!(attempt, landed, "wheel keeps landing on the protected winner");
            return Err(GameError::RespinLimitExceeded(attempt));
        }
        let respin_at_ms = self
            .clock
            .now_ms()
            .saturating_add(self.config.safety.respin_cooldown_ms);
        warn!(landed, attempt = next, "landed on protected winner, re-spinning");
        self.pending = Some(Pending::Cooldown {
            respin_at_ms,
            attempt: next,
        });
        events.push(Event::SafetyRespinScheduled {
            landed_section: landed,
            attempt: next,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{engine, names};

    fn settle(engine: &mut WheelEngine, clock: &ManualClock, events: &mut EventBus) -> SpinResult {
        for _ in 0..16 {
            match engine.pending() {
                Some(Pending::Spinning { resolves_at_ms, .. }) => clock.set_ms(*resolves_at_ms),
                Some(Pending::Cooldown { respin_at_ms, .. }) => clock.set_ms(*respin_at_ms),
                None => {}
            }
            if let Some(result) = engine.poll(events).expect("poll") {
                return result;
            }
        }
        panic!("spin never settled");
    }

    #[test]
    fn spin_requires_entries() {
        let (mut engine, _) = engine(1);
        let mut events = EventBus::default();
        assert_eq!(engine.spin(&mut events), Err(GameError::EmptyRoster));
    }

    #[test]
    fn second_spin_is_rejected_while_pending() {
        let (mut engine, clock) = engine(2);
        let mut events = EventBus::default();
        engine.add_entries("A B C D E", &mut events).expect("add");
        let ticket = engine.spin(&mut events).expect("spin");
        assert_eq!(engine.spin(&mut events), Err(GameError::SpinInProgress));
        clock.set_ms(ticket.resolves_at_ms - 1);
        assert_eq!(engine.poll(&mut events), Ok(None));
        assert!(engine.is_spinning());
        clock.set_ms(ticket.resolves_at_ms);
        let result = engine.poll(&mut events).expect("poll").expect("resolved");
        assert_eq!(result.eliminated.len(), 1);
        assert_eq!(engine.roster().len(), 4);
        assert!(!engine.is_spinning());
    }

    #[test]
    fn decision_is_fixed_before_resolution() {
        let (mut engine, clock) = engine(3);
        let mut events = EventBus::default();
        engine.add_entries("A B C D E F", &mut events).expect("add");
        let target_entry = {
            let ticket = engine.spin(&mut events).expect("spin");
            assert_eq!(ticket.kind(), SpinKind::Regular);
            clock.set_ms(ticket.resolves_at_ms);
            engine.roster()[ticket.decision.target_section].clone()
        };
        let result = engine.poll(&mut events).expect("poll").expect("resolved");
        assert_eq!(result.eliminated, vec![target_entry]);
    }

    #[test]
    fn two_left_with_designee_is_final() {
        let (mut engine, clock) = engine(4);
        let mut events = EventBus::default();
        engine.add_entries("A, B", &mut events).expect("add");
        engine.designate_winner("B", &mut events).expect("designate");
        let ticket = engine.spin(&mut events).expect("spin");
        assert_eq!(ticket.kind(), SpinKind::Final);
        let b_section = engine.protected_entry().expect("protected").section_index;
        assert_eq!(ticket.decision.landed_section(), b_section);
        clock.set_ms(ticket.resolves_at_ms);
        let result = engine.poll(&mut events).expect("poll").expect("resolved");
        assert_eq!(result.outcome_kind, SpinKind::Final);
        assert_eq!(result.final_winner.as_deref(), Some("B"));
        assert_eq!(names(&result.eliminated), vec!["A"]);
        assert_eq!(engine.phase(), GamePhase::FinalWinnerDeclared);
        assert_eq!(engine.eliminable_population(), 0);
        assert_eq!(names(engine.roster()), vec!["B"]);
        assert_eq!(engine.ledger().len(), 1);
        assert_eq!(engine.ledger().records()[0].removed_at_ms, ticket.resolves_at_ms);
        assert_eq!(engine.spin(&mut events), Err(GameError::GameOver));
    }

    #[test]
    fn final_spin_redesignated_mid_spin_respins_onto_new_winner() {
        let (mut engine, clock) = engine(10);
        let mut events = EventBus::default();
        engine.add_entries("A, B", &mut events).expect("add");
        engine.designate_winner("B", &mut events).expect("designate");
        let ticket = engine.spin(&mut events).expect("spin");
        assert_eq!(ticket.kind(), SpinKind::Final);
        engine.designate_winner("A", &mut events).expect("designate");
        let a_section = engine.protected_entry().expect("protected").section_index;
        assert_ne!(ticket.decision.landed_section(), a_section);

        clock.set_ms(ticket.resolves_at_ms);
        assert_eq!(engine.poll(&mut events), Ok(None));
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(matches!(
            engine.pending(),
            Some(Pending::Cooldown { attempt: 1, .. })
        ));

        let result = settle(&mut engine, &clock, &mut events);
        assert_eq!(result.outcome_kind, SpinKind::Final);
        assert_eq!(result.landed_section, a_section);
        assert_eq!(result.final_winner.as_deref(), Some("A"));
        assert_eq!(names(&result.eliminated), vec!["B"]);
    }

    #[test]
    fn designee_survives_full_game() {
        let (mut engine, clock) = engine(5);
        let mut events = EventBus::default();
        engine.add_entries("A B C D E F G", &mut events).expect("add");
        engine.designate_winner("B", &mut events).expect("designate");
        let mut spins = 0;
        while engine.eliminable_population() > 1 {
            engine.spin(&mut events).expect("spin");
            let result = settle(&mut engine, &clock, &mut events);
            assert_eq!(result.outcome_kind, SpinKind::Regular);
            assert!(result.eliminated.iter().all(|entry| entry.name != "B"));
            assert!(names(engine.roster()).contains(&"B"));
            spins += 1;
            assert!(spins < 20);
        }
        assert_eq!(engine.roster().len(), 2);
        let ticket = engine.spin(&mut events).expect("spin");
        assert_eq!(ticket.kind(), SpinKind::Final);
        let result = settle(&mut engine, &clock, &mut events);
        assert_eq!(result.final_winner.as_deref(), Some("B"));
        assert_eq!(result.eliminated.len(), 1);
        assert_eq!(names(engine.roster()), vec!["B"]);
        assert_eq!(engine.ledger().len(), 6);
        assert!(engine
            .ledger()
            .records()
            .iter()
            .all(|record| !record.was_protected_winner));
    }

    #[test]
    fn undesignated_game_ends_with_last_entry() {
        let (mut engine, clock) = engine(6);
        let mut events = EventBus::default();
        engine.add_entries("A B C", &mut events).expect("add");
        let mut winner = None;
        for _ in 0..10 {
            engine.spin(&mut events).expect("spin");
            let result = settle(&mut engine, &clock, &mut events);
            if let Some(name) = result.final_winner {
                winner = Some(name);
                break;
            }
        }
        let winner = winner.expect("winner declared");
        assert_eq!(names(engine.roster()), vec![winner.as_str()]);
        assert_eq!(engine.phase(), GamePhase::FinalWinnerDeclared);
    }

    #[test]
    fn mid_spin_designation_triggers_safety_respin() {
        let (mut engine, clock) = engine(7);
        let mut events = EventBus::default();
        engine.add_entries("A B C D E F", &mut events).expect("add");
        let ticket = engine.spin(&mut events).expect("spin");
        let doomed = engine.roster()[ticket.decision.target_section].name.clone();
        engine.designate_winner(&doomed, &mut events).expect("designate");

        clock.set_ms(ticket.resolves_at_ms);
        assert_eq!(engine.poll(&mut events), Ok(None));
        assert!(matches!(
            engine.pending(),
            Some(Pending::Cooldown { attempt: 1, .. })
        ));
        assert_eq!(engine.roster().len(), 6);
        assert!(events.drain().any(|event| matches!(
            event,
            Event::SafetyRespinScheduled { attempt: 1, .. }
        )));

        let result = settle(&mut engine, &clock, &mut events);
        assert_eq!(result.outcome_kind, SpinKind::Regular);
        assert_eq!(result.eliminated.len(), 1);
        assert_ne!(result.eliminated[0].name, doomed);
        assert!(names(engine.roster()).contains(&doomed.as_str()));
    }

    #[test]
    fn respin_limit_is_fatal_but_leaves_engine_idle() {
        let clock = ManualClock::new();
        let mut config = EngineConfig::default();
        config.safety.max_respins = 0;
        let mut engine = WheelEngine::with_clock(config, 8, Box::new(clock.clone()));
        let mut events = EventBus::default();
        engine.add_entries("A B C D", &mut events).expect("add");
        let ticket = engine.spin(&mut events).expect("spin");
        let doomed = engine.roster()[ticket.decision.target_section].name.clone();
        engine.designate_winner(&doomed, &mut events).expect("designate");
        clock.set_ms(ticket.resolves_at_ms);
        assert_eq!(
            engine.poll(&mut events),
            Err(GameError::RespinLimitExceeded(0))
        );
        assert!(!engine.is_spinning());
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.roster().len(), 4);
        assert!(engine.spin(&mut events).is_ok());
    }

    #[test]
    fn large_roster_eliminates_by_population() {
        let (mut engine, clock) = engine(9);
        let mut events = EventBus::default();
        let batch: Vec<String> = (0..2000).map(|idx| format!("p{idx}")).collect();
        engine.add_entries(&batch.join("\n"), &mut events).expect("add");
        engine.designate_winner("p42", &mut events).expect("designate");
        assert_eq!(engine.section_count(), 20);
        engine.spin(&mut events).expect("spin");
        let result = settle(&mut engine, &clock, &mut events);
        assert_eq!(result.eliminated.len(), 100);
        assert_eq!(engine.roster().len(), 1900);
        assert!(engine.validate_designation());
    }
}
