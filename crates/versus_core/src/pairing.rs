//! Pair scheduling for versus battles.
//!
//! Finite policies enumerate every unique unordered pair over the eligible
//! items, drop the pairs already judged, and shuffle the rest so the order of
//! the input list does not leak into presentation order. The infinite policy
//! draws one uniformly random pair per call and never looks at history.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::config::BattlePolicy;
use crate::types::{ComparableItem, CompletedPairs, ItemId, Pair};

/// Ids of the items that may take part in a pair, first occurrence wins.
pub fn eligible_ids(items: &[ComparableItem]) -> Vec<&ItemId> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| item.is_eligible())
        .map(|item| &item.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Number of unique unordered pairs over `n` items
pub fn unique_pair_count(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}

/// Generate the next batch of pairs for a session.
///
/// Returns an empty list when fewer than two items are eligible. Under the
/// infinite policy the list holds at most one pair.
pub fn generate_pairs<R: Rng + ?Sized>(
    items: &[ComparableItem],
    completed: &CompletedPairs,
    policy: BattlePolicy,
    limit: Option<u32>,
    rng: &mut R,
) -> Vec<Pair> {
    if policy == BattlePolicy::Infinite {
        return random_pair(items, rng).into_iter().collect();
    }

    let ids = eligible_ids(items);
    let mut pairs = Vec::with_capacity(unique_pair_count(ids.len()));
    for (i, first) in ids.iter().enumerate() {
        for second in &ids[i + 1..] {
            let pair = Pair::new((*first).clone(), (*second).clone());
            if !completed.contains(&pair.key()) {
                pairs.push(pair);
            }
        }
    }

    // Fisher-Yates
    pairs.shuffle(rng);

    let cap = match policy {
        BattlePolicy::Fixed => Some(policy.effective_limit(limit) as usize),
        BattlePolicy::PerMovie => {
            Some(ids.len().saturating_mul(policy.effective_limit(limit) as usize))
        }
        BattlePolicy::Complete | BattlePolicy::Infinite => None,
    };
    if let Some(cap) = cap {
        pairs.truncate(cap);
    }

    debug!(
        %policy,
        eligible = ids.len(),
        already_completed = completed.len(),
        generated = pairs.len(),
        "generated pair queue"
    );

    pairs
}

/// Draw one uniformly random pair of two distinct eligible items.
pub fn random_pair<R: Rng + ?Sized>(items: &[ComparableItem], rng: &mut R) -> Option<Pair> {
    let ids = eligible_ids(items);
    if ids.len() < 2 {
        return None;
    }

    let i = rng.gen_range(0..ids.len());
    let mut j = rng.gen_range(0..ids.len());
    while j == i {
        j = rng.gen_range(0..ids.len());
    }

    Some(Pair::new(ids[i].clone(), ids[j].clone()))
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod tests;
