//! Spin outcome decisions and wheel geometry.
//!
//! The pointer sits at 0 degrees (top). Sections are laid out so that
//! section `s` spans `[s * angle, (s + 1) * angle)` measured the opposite
//! way to the wheel's rotation, so a wheel rotated by `360 - center(s)`
//! puts the middle of `s` under the pointer. [`landed_section`] is the exact
//! inverse of [`target_rotation`].

use crate::{sections, EngineConfig, Entry, RngState, SpinProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpinKind {
    /// Lands on the protected entry and ends the game.
    Final,
    /// Lands on a section with no protected entry and eliminates from it.
    Regular,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpinError {
    #[error("roster is empty")]
    EmptyRoster,
    #[error("no section is free of the protected winner")]
    NoSafeSection,
}

/// Everything fixed at the moment a spin is requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinDecision {
    pub kind: SpinKind,
    pub target_section: usize,
    pub section_count: usize,
    pub full_turns: u32,
    pub target_rotation_degrees: f64,
    pub duration_secs: f64,
}

impl SpinDecision {
    /// Section under the pointer once the wheel stops.
    pub fn landed_section(&self) -> usize {
        landed_section(self.target_rotation_degrees, self.section_count)
    }

    /// Rotation after `progress` (0..=1) of the animation, eased so the wheel
    /// starts fast and settles slowly.
    pub fn rotation_at(&self, progress: f64) -> f64 {
        self.target_rotation_degrees * ease_out_cubic(progress)
    }
}

pub fn section_angle(section_count: usize) -> f64 {
    if section_count == 0 {
        return FULL_TURN;
    }
    FULL_TURN / section_count as f64
}

pub fn center_angle(section: usize, section_count: usize) -> f64 {
    let angle = section_angle(section_count);
    section as f64 * angle + angle / 2.0
}

/// Rotation within one turn that puts the middle of `section` under the
/// pointer.
pub fn target_rotation(section: usize, section_count: usize) -> f64 {
    FULL_TURN - center_angle(section, section_count)
}

pub fn landed_section(rotation: f64, section_count: usize) -> usize {
    if section_count == 0 {
        return 0;
    }
    let normalized = rotation.rem_euclid(FULL_TURN);
    let offset = (FULL_TURN - normalized) / section_angle(section_count);
    (offset.floor() as usize) % section_count
}

pub fn ease_out_cubic(progress: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Live entries excluding the protected winner.
pub fn eliminable_population(roster: &[Entry]) -> usize {
    roster
        .iter()
        .filter(|entry| !entry.is_protected_winner)
        .count()
}

pub fn is_final(roster: &[Entry]) -> bool {
    if roster.iter().any(|entry| entry.is_protected_winner) {
        eliminable_population(roster) <= 1
    } else {
        roster.len() == 1
    }
}

/// Decides the next spin from the roster as it is right now. Sections are
/// rebuilt here on every call; nothing is cached between decisions.
pub fn decide(
    roster: &[Entry],
    config: &EngineConfig,
    rng: &mut RngState,
) -> Result<SpinDecision, SpinError> {
    if roster.is_empty() {
        return Err(SpinError::EmptyRoster);
    }
    let layout = sections(roster, &config.partition);
    let section_count = layout.len();
    let (kind, target_section, profile) = if is_final(roster) {
        let target = roster
            .iter()
            .find(|entry| entry.is_protected_winner)
            .or_else(|| roster.first())
            .map(|entry| entry.section_index)
            .ok_or(SpinError::EmptyRoster)?;
        (SpinKind::Final, target, &config.final_spin)
    } else {
        let safe: Vec<usize> = layout
            .iter()
            .filter(|section| section.is_safe() && !section.entries.is_empty())
            .map(|section| section.index)
            .collect();
        if safe.is_empty() {
            return Err(SpinError::NoSafeSection);
        }
        let target = safe[rng.index(safe.len())];
        (SpinKind::Regular, target, &config.regular_spin)
    };
    let decision = build(kind, target_section, section_count, profile, rng);
    debug!(
        ?kind,
        target = decision.target_section,
        sections = section_count,
        rotation = decision.target_rotation_degrees,
        "spin decided"
    );
    Ok(decision)
}

fn build(
    kind: SpinKind,
    target_section: usize,
    section_count: usize,
    profile: &SpinProfile,
    rng: &mut RngState,
) -> SpinDecision {
    let full_turns = rng.range_u32(profile.min_turns, profile.max_turns);
    let duration_secs = rng.range_f64(profile.min_duration_secs, profile.max_duration_secs);
    SpinDecision {
        kind,
        target_section,
        section_count,
        full_turns,
        target_rotation_degrees: target_rotation(target_section, section_count)
            + FULL_TURN * full_turns as f64,
        duration_secs,
    }
}
