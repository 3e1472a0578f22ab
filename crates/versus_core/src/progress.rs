//! Session progress and completion

use serde::{Deserialize, Serialize};

use crate::config::BattlePolicy;

/// Snapshot of how far a session has come
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Battles needed to finish, `None` for infinite sessions
    pub target_battles: Option<u32>,
    pub completed_battles: u32,
    pub is_completed: bool,
    /// `None` when there is no target or the target is zero. Not clamped, so
    /// a history longer than the target shows up as more than 100.
    pub completion_percent: Option<f64>,
}

/// Number of battles a session of `total_items` needs under `policy`.
pub fn target_battles(total_items: usize, policy: BattlePolicy, limit: Option<u32>) -> Option<u32> {
    let n = total_items as u64;
    let target = match policy {
        BattlePolicy::Infinite => return None,
        BattlePolicy::Complete => {
            if n < 2 {
                0
            } else {
                n * (n - 1) / 2
            }
        }
        BattlePolicy::Fixed => u64::from(policy.effective_limit(limit)),
        BattlePolicy::PerMovie => n * u64::from(policy.effective_limit(limit)),
    };
    Some(u32::try_from(target).unwrap_or(u32::MAX))
}

/// Compute progress for a session with `completed` recorded battles.
pub fn progress(
    total_items: usize,
    policy: BattlePolicy,
    limit: Option<u32>,
    completed: u32,
) -> Progress {
    let target = target_battles(total_items, policy, limit);

    let completion_percent = match target {
        Some(target) if target > 0 => Some(100.0 * f64::from(completed) / f64::from(target)),
        _ => None,
    };

    Progress {
        target_battles: target,
        completed_battles: completed,
        is_completed: target.is_some_and(|target| completed >= target),
        completion_percent,
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
