//! Judges decide battles in place of a user

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use versus_core::{expected_score, ItemId, Pair};

/// Decision on a presented pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    First,
    Second,
    Skip,
}

/// Anything that can pick a winner from a pair.
///
/// Implemented by the simulated judges here; a UI would implement it by
/// asking the user.
pub trait Judge {
    /// Decide which item of `pair` wins
    fn choose(&mut self, pair: &Pair) -> Verdict;

    /// Short name for reports
    fn name(&self) -> &str;
}

/// Judge with hidden strengths on the Elo scale.
///
/// The first item wins with the Elo expected score of the two strengths, so a
/// gap of 400 means a 10:1 preference. Unknown items have strength 0.
pub struct StrengthJudge {
    strengths: HashMap<ItemId, f64>,
    skip_rate: f64,
    rng: StdRng,
}

impl StrengthJudge {
    pub fn new(strengths: HashMap<ItemId, f64>, seed: u64) -> Self {
        Self {
            strengths,
            skip_rate: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Probability of declining to judge a pair
    pub fn with_skip_rate(mut self, skip_rate: f64) -> Self {
        self.skip_rate = skip_rate.clamp(0.0, 1.0);
        self
    }

    pub fn strength(&self, id: &ItemId) -> f64 {
        self.strengths.get(id).copied().unwrap_or(0.0)
    }

    /// Items ordered strongest first
    pub fn reference_order(&self) -> Vec<ItemId> {
        let mut ids: Vec<&ItemId> = self.strengths.keys().collect();
        ids.sort_by(|a, b| {
            self.strength(b)
                .partial_cmp(&self.strength(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        ids.into_iter().cloned().collect()
    }
}

impl Judge for StrengthJudge {
    fn choose(&mut self, pair: &Pair) -> Verdict {
        if self.skip_rate > 0.0 && self.rng.gen_bool(self.skip_rate) {
            return Verdict::Skip;
        }
        let p_first = expected_score(self.strength(&pair.first), self.strength(&pair.second));
        if self.rng.gen::<f64>() < p_first {
            Verdict::First
        } else {
            Verdict::Second
        }
    }

    fn name(&self) -> &str {
        "strength"
    }
}

/// Judge that always prefers the item listed earlier in a fixed order.
///
/// Items missing from the order lose to every listed item.
pub struct OrderJudge {
    order: Vec<ItemId>,
}

impl OrderJudge {
    pub fn new(order: Vec<ItemId>) -> Self {
        Self { order }
    }

    fn position(&self, id: &ItemId) -> usize {
        self.order
            .iter()
            .position(|candidate| candidate == id)
            .unwrap_or(usize::MAX)
    }
}

impl Judge for OrderJudge {
    fn choose(&mut self, pair: &Pair) -> Verdict {
        if self.position(&pair.first) <= self.position(&pair.second) {
            Verdict::First
        } else {
            Verdict::Second
        }
    }

    fn name(&self) -> &str {
        "order"
    }
}
