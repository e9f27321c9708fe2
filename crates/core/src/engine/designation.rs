use super::*;
use crate::*;
use tracing::{info, warn};

impl WheelEngine {
    /// Designates the protected winner by name. Allowed while a spin is in
    /// flight: the resolution re-checks the landed section against the
    /// current flags before eliminating anyone.
    pub fn designate_winner(
        &mut self,
        name: &str,
        events: &mut EventBus,
    ) -> Result<Option<EntryId>, GameError> {
        if self.phase == GamePhase::FinalWinnerDeclared {
            return Err(GameError::GameOver);
        }
        let matched = self.guard.designate(name, &mut self.roster);
        let designated = self.guard.designated().map(str::to_string);
        match (&designated, matched) {
            (Some(name), None) => warn!(%name, "designated winner is not on the roster yet"),
            (Some(name), Some(id)) => info!(%name, %id, "winner designated"),
            (None, _) => info!("winner designation cleared"),
        }
        events.push(Event::WinnerDesignated {
            name: designated,
            matched,
        });
        Ok(matched)
    }

    pub fn clear_designation(&mut self, events: &mut EventBus) -> Result<(), GameError> {
        self.designate_winner("", events).map(|_| ())
    }

    pub fn validate_designation(&self) -> bool {
        self.guard.validate(&self.roster)
    }

    /// Runs the guard's repair policy. Returns whether a repair was needed.
    pub fn repair_designation(&mut self, events: &mut EventBus) -> bool {
        self.refresh_guard(events)
    }

    /// Brings the designation into a valid state or explains why it cannot be.
    pub(super) fn ensure_designation(&mut self, events: &mut EventBus) -> Result<(), GameError> {
        self.refresh_guard(events);
        match self.guard.check(&self.roster) {
            Ok(()) => Ok(()),
            Err(violation) => {
                let name = self.guard.designated().unwrap_or_default().to_string();
                warn!(?violation, %name, "spin refused, designation unresolved");
                Err(GameError::DesignationUnresolved(name))
            }
        }
    }
}
