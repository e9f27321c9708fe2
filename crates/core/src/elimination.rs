use crate::{EliminationRule, Entry, RngState};

/// How many entries a round removes for a given eliminable population.
pub fn elimination_count(population: usize) -> usize {
    EliminationRule::default().count_for(population)
}

/// Picks this round's eliminated entries uniformly from `eligible`.
///
/// The count follows the whole eliminable population, clamped to what the
/// landed section actually holds. Protected entries are skipped even if a
/// caller forgets to filter them.
pub fn select(
    eligible: &[Entry],
    population: usize,
    rule: &EliminationRule,
    rng: &mut RngState,
) -> Vec<Entry> {
    let mut pool: Vec<Entry> = eligible
        .iter()
        .filter(|entry| !entry.is_protected_winner)
        .cloned()
        .collect();
    if pool.is_empty() {
        return Vec::new();
    }
    let count = rule.count_for(population).min(pool.len());
    rng.choose_prefix(&mut pool, count).to_vec()
}
