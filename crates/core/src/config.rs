use serde::{Deserialize, Deserializer, Serialize};

/// How a roster size maps to a number of wheel sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PartitionRule {
    /// Up to this many entries every entry gets its own slice.
    pub individual_max: usize,
    pub small_max: usize,
    pub small_cap: usize,
    pub medium_max: usize,
    pub medium_entries_per_section: usize,
    pub medium_cap: usize,
    pub large_log_factor: f64,
    pub large_cap: usize,
}

impl Default for PartitionRule {
    fn default() -> Self {
        Self {
            individual_max: 6,
            small_max: 50,
            small_cap: 6,
            medium_max: 500,
            medium_entries_per_section: 10,
            medium_cap: 12,
            large_log_factor: 3.0,
            large_cap: 20,
        }
    }
}

impl PartitionRule {
    pub fn section_count(&self, entries: usize) -> usize {
        if entries <= self.individual_max {
            entries
        } else if entries <= self.small_max {
            entries.min(self.small_cap)
        } else if entries <= self.medium_max {
            let per = self.medium_entries_per_section.max(1);
            entries.div_ceil(per).min(self.medium_cap)
        } else {
            let scaled = ((entries as f64).ln() * self.large_log_factor).ceil() as usize;
            scaled.min(self.large_cap).max(1)
        }
    }
}

/// Per-round elimination pacing, keyed on the whole eliminable population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EliminationRule {
    pub single_max: usize,
    pub small_max: usize,
    pub small_rate: f64,
    pub medium_max: usize,
    pub medium_rate: f64,
    pub large_rate: f64,
}

impl Default for EliminationRule {
    fn default() -> Self {
        Self {
            single_max: 6,
            small_max: 50,
            small_rate: 0.20,
            medium_max: 500,
            medium_rate: 0.15,
            large_rate: 0.10,
        }
    }
}

impl EliminationRule {
    pub fn count_for(&self, population: usize) -> usize {
        if population <= self.single_max {
            return 1;
        }
        let rate = if population <= self.small_max {
            self.small_rate
        } else if population <= self.medium_max {
            self.medium_rate
        } else {
            self.large_rate
        };
        // Nudge before flooring so 0.15 * 200 cannot land on 29.999...
        ((population as f64 * rate + 1e-9).floor() as usize).max(1)
    }
}

/// Animation envelope for one kind of spin. Only the landing angle matters
/// for the outcome; turns and duration are flourish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpinProfile {
    pub min_turns: u32,
    pub max_turns: u32,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
}

impl SpinProfile {
    pub fn final_spin() -> Self {
        Self {
            min_turns: 25,
            max_turns: 35,
            min_duration_secs: 6.0,
            max_duration_secs: 8.0,
        }
    }

    pub fn regular_spin() -> Self {
        Self {
            min_turns: 20,
            max_turns: 35,
            min_duration_secs: 4.0,
            max_duration_secs: 6.0,
        }
    }

    fn overlay(mut self, patch: SpinProfilePatch) -> Self {
        if let Some(value) = patch.min_turns {
            self.min_turns = value;
        }
        if let Some(value) = patch.max_turns {
            self.max_turns = value;
        }
        if let Some(value) = patch.min_duration_secs {
            self.min_duration_secs = value;
        }
        if let Some(value) = patch.max_duration_secs {
            self.max_duration_secs = value;
        }
        self
    }
}

/// Partial profile as written in a config file; absent fields keep the
/// defaults of whichever spin kind is being read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpinProfilePatch {
    min_turns: Option<u32>,
    max_turns: Option<u32>,
    min_duration_secs: Option<f64>,
    max_duration_secs: Option<f64>,
}

fn final_profile<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpinProfile, D::Error> {
    let patch = SpinProfilePatch::deserialize(deserializer)?;
    Ok(SpinProfile::final_spin().overlay(patch))
}

fn regular_profile<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpinProfile, D::Error> {
    let patch = SpinProfilePatch::deserialize(deserializer)?;
    Ok(SpinProfile::regular_spin().overlay(patch))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SafetyRule {
    pub respin_cooldown_ms: u64,
    pub max_respins: u32,
}

impl Default for SafetyRule {
    fn default() -> Self {
        Self {
            respin_cooldown_ms: 1500,
            max_respins: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub partition: PartitionRule,
    pub elimination: EliminationRule,
    #[serde(deserialize_with = "final_profile")]
    pub final_spin: SpinProfile,
    #[serde(deserialize_with = "regular_profile")]
    pub regular_spin: SpinProfile,
    pub safety: SafetyRule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            partition: PartitionRule::default(),
            elimination: EliminationRule::default(),
            final_spin: SpinProfile::final_spin(),
            regular_spin: SpinProfile::regular_spin(),
            safety: SafetyRule::default(),
        }
    }
}
