//! Session runner: plays a ranking session out with a judge

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use versus_core::{InvalidBattleError, RankingSession, SessionStatus};

use crate::judge::{Judge, Verdict};

/// Configuration for a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Stop after this many judged pairs (None = until the session ends)
    pub max_battles: Option<u32>,
    /// Log every battle at info level
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_battles: Some(1000),
            verbose: false,
        }
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Session reached its target or ran out of pairs
    Completed,
    /// No pair to present while the session is still active
    NoPairs,
    /// `max_battles` reached
    BattleLimit,
    /// Session was not active to begin with
    NotActive,
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub battles: u32,
    pub skips: u32,
    pub stop: StopReason,
}

/// Drives sessions with a judge
pub struct SessionRunner {
    config: RunConfig,
}

impl SessionRunner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Present pairs to `judge` until the session ends or the limit is hit.
    pub fn run<R: Rng + ?Sized>(
        &self,
        session: &mut RankingSession,
        judge: &mut dyn Judge,
        rng: &mut R,
    ) -> Result<RunSummary, InvalidBattleError> {
        let mut battles = 0;
        let mut skips = 0;

        let stop = loop {
            match session.status() {
                SessionStatus::Completed => break StopReason::Completed,
                SessionStatus::Paused => break StopReason::NotActive,
                SessionStatus::Active => {}
            }
            if let Some(max) = self.config.max_battles {
                if battles + skips >= max {
                    break StopReason::BattleLimit;
                }
            }
            let pair = match session.next_pair() {
                Some(pair) => pair.clone(),
                None => break StopReason::NoPairs,
            };

            match judge.choose(&pair) {
                Verdict::Skip => {
                    session.skip_battle_with_rng(&pair, rng)?;
                    skips += 1;
                    debug!(pair = %pair.key(), "skipped");
                }
                verdict => {
                    let (winner, loser) = if verdict == Verdict::First {
                        (&pair.first, &pair.second)
                    } else {
                        (&pair.second, &pair.first)
                    };
                    let outcome = session.record_battle_with_rng(winner, loser, rng)?;
                    battles += 1;

                    if self.config.verbose {
                        let percent = outcome
                            .progress
                            .completion_percent
                            .map(|p| format!("{:.1}%", p))
                            .unwrap_or_else(|| "-".to_string());
                        info!(
                            "Battle {}: {} ({:.1}) beat {} ({:.1}) - {}",
                            battles,
                            winner,
                            outcome.battle.winner_rating_after,
                            loser,
                            outcome.battle.loser_rating_after,
                            percent
                        );
                    }
                }
            }
        };

        debug!(judge = judge.name(), battles, skips, ?stop, "run finished");
        Ok(RunSummary {
            battles,
            skips,
            stop,
        })
    }
}

/// Quick utility to play a session out with default settings
pub fn quick_run(
    session: &mut RankingSession,
    judge: &mut dyn Judge,
    max_battles: u32,
) -> Result<RunSummary, InvalidBattleError> {
    let runner = SessionRunner::new(RunConfig {
        max_battles: Some(max_battles),
        ..Default::default()
    });
    runner.run(session, judge, &mut rand::thread_rng())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
