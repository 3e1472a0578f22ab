//! Simulation settings, loaded from TOML

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use versus_core::{BattlePolicy, EloScope, KFactor, SessionConfig};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Everything a simulated ranking run needs.
///
/// Every field has a default, so a settings file only lists what it changes:
///
/// ```toml
/// name = "weekend watchlist"
/// items = 12
/// policy = "per-movie"
/// limit = 4
/// dynamic_k = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub name: String,
    /// Number of simulated items
    pub items: u32,
    pub policy: BattlePolicy,
    pub limit: Option<u32>,
    pub elo_scope: EloScope,
    pub dynamic_k: bool,
    /// Elo gap between the strongest and the weakest hidden strength
    pub strength_spread: f64,
    /// Probability that the judge skips a pair
    pub skip_rate: f64,
    /// Hard stop, needed for infinite sessions
    pub max_battles: u32,
    /// Seed for pairing and judging; random when unset
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            name: "simulation".to_string(),
            items: 8,
            policy: BattlePolicy::Complete,
            limit: None,
            elo_scope: EloScope::Local,
            dynamic_k: false,
            strength_spread: 800.0,
            skip_rate: 0.0,
            max_battles: 1000,
            seed: None,
            verbose: false,
        }
    }
}

impl SimulationSettings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(contents)?)
    }

    /// Session configuration these settings describe
    pub fn session_config(&self) -> SessionConfig {
        let k_factor = if self.dynamic_k {
            KFactor::Dynamic
        } else {
            KFactor::default()
        };
        SessionConfig::new(self.policy, self.limit)
            .with_scope(self.elo_scope)
            .with_k_factor(k_factor)
    }
}
