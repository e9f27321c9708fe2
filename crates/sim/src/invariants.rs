use spinout_core::{normalize_name, EngineSnapshot, GamePhase};

/// Structural checks that must hold after every engine operation.
pub fn check_invariants(snapshot: &EngineSnapshot) -> Result<(), String> {
    let count = snapshot.section_count;
    if let Some(entry) = snapshot
        .roster
        .iter()
        .find(|entry| entry.section_index >= count)
    {
        return Err(format!(
            "{} sits in section {} of {}",
            entry.name, entry.section_index, count
        ));
    }
    let flagged: Vec<_> = snapshot
        .roster
        .iter()
        .filter(|entry| entry.is_protected_winner)
        .collect();
    if flagged.len() > 1 {
        return Err(format!("{} entries are protected", flagged.len()));
    }
    if let Some(name) = snapshot.designated_winner.as_deref() {
        let present = snapshot
            .roster
            .iter()
            .any(|entry| normalize_name(&entry.name) == name);
        if present && flagged.len() != 1 {
            return Err(format!("designated {name:?} is present but not protected"));
        }
        if let Some(entry) = flagged.first() {
            if normalize_name(&entry.name) != name {
                return Err(format!("{} is protected instead of {name:?}", entry.name));
            }
        }
    }
    if let Some(record) = snapshot.removed.iter().find(|record| record.was_protected_winner) {
        return Err(format!("protected {} was removed", record.name));
    }
    if snapshot.phase == GamePhase::FinalWinnerDeclared && snapshot.final_winner.is_none() {
        return Err("game over without a winner".to_string());
    }
    if snapshot.phase == GamePhase::FinalWinnerDeclared && snapshot.pending.is_some() {
        return Err("game over with a spin still pending".to_string());
    }
    Ok(())
}
