//! Session runner for versus rankings
//!
//! This crate provides infrastructure for:
//! - Playing ranking sessions out with simulated judges
//! - Saving and reporting session results
//! - Checking how well a battle policy recovers a known preference order
//!
//! # Usage
//!
//! ```bash
//! # Rank 10 simulated movies, every pair once
//! cargo run -p versus -- simulate --items 10 --policy complete
//!
//! # Endless random battles, stopped after 300, with settings from a file
//! cargo run -p versus -- simulate --config versus.toml --policy infinite --max-battles 300
//! ```

mod judge;
mod report;
mod runner;
mod settings;
pub mod telemetry;

pub use judge::*;
pub use report::*;
pub use runner::*;
pub use settings::*;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use versus_core::{InvalidBattleError, InvalidConfigError, ItemId, ItemSeed, RankingSession};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] InvalidConfigError),
    #[error(transparent)]
    Battle(#[from] InvalidBattleError),
}

/// Ids of the simulated items, `item-01` style, strongest first
pub fn simulated_ids(count: u32) -> Vec<ItemId> {
    let width = count.to_string().len().max(2);
    (1..=count)
        .map(|i| ItemId::from(format!("item-{:0width$}", i, width = width)))
        .collect()
}

/// Run one simulated session as described by `settings`.
///
/// Hidden strengths fall linearly from `strength_spread` to zero in id order,
/// so the reference order is the id order.
pub fn simulate(settings: &SimulationSettings) -> Result<SessionReport, SimulationError> {
    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let ids = simulated_ids(settings.items);
    let step = if ids.len() > 1 {
        settings.strength_spread / (ids.len() - 1) as f64
    } else {
        0.0
    };
    let strengths: HashMap<ItemId, f64> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), settings.strength_spread - step * i as f64))
        .collect();

    let mut judge =
        StrengthJudge::new(strengths, seed.wrapping_add(1)).with_skip_rate(settings.skip_rate);
    let mut session = RankingSession::start_with_rng(
        Uuid::new_v4(),
        ids.iter().cloned().map(ItemSeed::new),
        settings.session_config(),
        &mut rng,
    )?;

    info!(
        name = %settings.name,
        items = settings.items,
        policy = %settings.policy,
        seed,
        "starting simulation"
    );

    let runner = SessionRunner::new(RunConfig {
        max_battles: Some(settings.max_battles),
        verbose: settings.verbose,
    });
    let summary = runner.run(&mut session, &mut judge, &mut rng)?;

    Ok(SessionReport::new(&settings.name, &session, summary).with_reference(judge.reference_order()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use versus_core::{BattlePolicy, SessionStatus};

    #[test]
    fn test_simulated_ids_are_padded() {
        let ids = simulated_ids(12);
        assert_eq!(ids.len(), 12);
        assert_eq!(ids[0], ItemId::from("item-01"));
        assert_eq!(ids[11], ItemId::from("item-12"));
        assert_eq!(simulated_ids(120)[0], ItemId::from("item-001"));
    }

    #[test]
    fn test_simulate_complete_policy() {
        let settings = SimulationSettings {
            items: 6,
            seed: Some(42),
            ..Default::default()
        };
        let report = simulate(&settings).unwrap();

        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.summary.battles, 15);
        assert_eq!(report.standings.len(), 6);
        assert!(report.agreement().unwrap() > 0.5);
    }

    #[test]
    fn test_simulate_rejects_bad_config() {
        let settings = SimulationSettings {
            policy: BattlePolicy::Fixed,
            limit: None,
            seed: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            simulate(&settings),
            Err(SimulationError::Config(_))
        ));
    }
}
