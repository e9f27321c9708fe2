use crate::SimError;
use serde::{Deserialize, Serialize};
use spinout_core::{RemovedEntry, SpinKind};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinRecord {
    pub spin: u32,
    pub kind: SpinKind,
    pub target_section: usize,
    pub landed_section: usize,
    pub section_count: usize,
    pub rotation_degrees: f64,
    pub duration_secs: f64,
    pub roster_before: usize,
    pub roster_after: usize,
    pub eliminated: Vec<String>,
    #[serde(default)]
    pub safety_respins: u32,
    pub event_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    WinnerDeclared,
    SpinLimit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTrace {
    pub seed: u64,
    pub status: GameStatus,
    pub starting_entries: usize,
    #[serde(default)]
    pub designated_winner: Option<String>,
    pub spins: Vec<SpinRecord>,
    #[serde(default)]
    pub winner: Option<String>,
    pub removed: Vec<RemovedEntry>,
}

impl GameTrace {
    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            format!("seed: {}", self.seed),
            format!("status: {:?}", self.status),
            format!(
                "entries: {} designated: {}",
                self.starting_entries,
                self.designated_winner.as_deref().unwrap_or("(none)")
            ),
            String::new(),
            "spins:".to_string(),
        ];
        for record in &self.spins {
            lines.push(format!(
                "  spin {:>3} | {:?} section {}/{} rotation {:.1} over {:.2}s",
                record.spin,
                record.kind,
                record.landed_section,
                record.section_count,
                record.rotation_degrees,
                record.duration_secs
            ));
            lines.push(format!(
                "    roster {} -> {} eliminated: [{}]",
                record.roster_before,
                record.roster_after,
                record.eliminated.join(", ")
            ));
            if record.safety_respins > 0 {
                lines.push(format!("    safety re-spins: {}", record.safety_respins));
            }
        }
        lines.push(String::new());
        lines.push(format!(
            "winner: {}",
            self.winner.as_deref().unwrap_or("(undecided)")
        ));
        lines.join("\n")
    }
}

pub fn write_json(path: &Path, trace: &GameTrace) -> Result<(), SimError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(trace)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, trace: &GameTrace) -> Result<(), SimError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, trace.to_text_report())?;
    Ok(())
}

pub fn read_json(path: &Path) -> Result<GameTrace, SimError> {
    let body = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}
