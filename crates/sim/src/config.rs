use anyhow::Context;
use serde::Deserialize;
use spinout_core::EngineConfig;
use std::fs;
use std::path::Path;

/// Settings for a batch of simulated games.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub engine: EngineConfig,
    pub seed: u64,
    pub games: u32,
    pub max_spins: u32,
    pub check_invariants: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            seed: 0x5EED,
            games: 1,
            max_spins: 500,
            check_invariants: true,
        }
    }
}

pub fn load_engine_config(path: &Path) -> anyhow::Result<EngineConfig> {
    load_json(path)
}

pub fn load_sim_config(path: &Path) -> anyhow::Result<SimConfig> {
    load_json(path)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
