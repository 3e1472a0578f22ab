//! Elo rating calculation

use serde::{Deserialize, Serialize};

/// Baseline rating for items that have never been rated
pub const DEFAULT_RATING: f64 = 1200.0;

/// Default K-factor (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Rating difference at which the favourite is expected to win 10:1
pub const ELO_SCALE: f64 = 400.0;

/// Result of a single rating update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub winner_new: f64,
    pub loser_new: f64,
    pub winner_delta: f64,
    pub loser_delta: f64,
}

/// Selects the K-factor for each battle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum KFactor {
    /// Same K for every battle
    Fixed { k: f64 },
    /// K grows with the rating gap between the two items
    Dynamic,
}

impl Default for KFactor {
    fn default() -> Self {
        KFactor::Fixed { k: K_FACTOR }
    }
}

impl KFactor {
    /// K to use for a battle between these two ratings.
    ///
    /// Dynamic: |diff| > 400 gives 40, > 200 gives 32, anything closer 24.
    pub fn resolve(self, winner_rating: f64, loser_rating: f64) -> f64 {
        match self {
            KFactor::Fixed { k } => k,
            KFactor::Dynamic => {
                let diff = (winner_rating - loser_rating).abs();
                if diff > 400.0 {
                    40.0
                } else if diff > 200.0 {
                    32.0
                } else {
                    24.0
                }
            }
        }
    }
}

/// Expected score of `rating` against `opponent`, in (0, 1)
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / ELO_SCALE))
}

/// Compute new ratings after `winner` beat `loser`.
///
/// Inputs are first brought to one decimal place, so the update is exact at
/// that precision: `winner_new - winner_rating == winner_delta` and the
/// update is zero-sum, `winner_delta == -loser_delta`.
pub fn update(winner_rating: f64, loser_rating: f64, k_factor: f64) -> RatingUpdate {
    let winner_rating = round_rating(winner_rating);
    let loser_rating = round_rating(loser_rating);

    let expected_winner = expected_score(winner_rating, loser_rating);
    let winner_delta = round_rating(k_factor * (1.0 - expected_winner));
    let loser_delta = -winner_delta;

    RatingUpdate {
        winner_new: round_rating(winner_rating + winner_delta),
        loser_new: round_rating(loser_rating + loser_delta),
        winner_delta,
        loser_delta,
    }
}

/// Round a rating to one decimal place
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[path = "elo_tests.rs"]
mod tests;
