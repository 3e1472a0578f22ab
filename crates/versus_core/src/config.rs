//! Session configuration: battle limit policy, Elo scope and K-factor

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::elo::KFactor;
use crate::error::InvalidConfigError;

/// Target battle count used by the fixed policy when no limit is set
pub const DEFAULT_FIXED_LIMIT: u32 = 50;

/// Battles per item used by the per-movie policy when no limit is set
pub const DEFAULT_PER_MOVIE_LIMIT: u32 = 10;

/// How many battles a session runs before it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BattlePolicy {
    /// Every unique pair exactly once
    #[default]
    Complete,
    /// Stop after `limit` battles in total
    Fixed,
    /// Stop after `limit` battles per item on average
    PerMovie,
    /// Random pairs until the user stops
    Infinite,
}

impl BattlePolicy {
    pub fn is_finite(self) -> bool {
        self != BattlePolicy::Infinite
    }

    /// Whether the policy needs an explicit limit
    pub fn requires_limit(self) -> bool {
        matches!(self, BattlePolicy::Fixed | BattlePolicy::PerMovie)
    }

    /// Limit to use, falling back to the policy default
    pub fn effective_limit(self, limit: Option<u32>) -> u32 {
        match self {
            BattlePolicy::Fixed => limit.unwrap_or(DEFAULT_FIXED_LIMIT),
            BattlePolicy::PerMovie => limit.unwrap_or(DEFAULT_PER_MOVIE_LIMIT),
            BattlePolicy::Complete | BattlePolicy::Infinite => 0,
        }
    }
}

impl fmt::Display for BattlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattlePolicy::Complete => "complete",
            BattlePolicy::Fixed => "fixed",
            BattlePolicy::PerMovie => "per-movie",
            BattlePolicy::Infinite => "infinite",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for BattlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" | "all" => Ok(BattlePolicy::Complete),
            "fixed" => Ok(BattlePolicy::Fixed),
            "per-movie" | "per_movie" | "permovie" => Ok(BattlePolicy::PerMovie),
            "infinite" | "endless" => Ok(BattlePolicy::Infinite),
            other => Err(format!("unknown battle policy: {}", other)),
        }
    }
}

/// Which rating pool a session reads and writes.
///
/// The engine only carries the flag; the item store decides what it means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EloScope {
    /// Ratings private to the session
    #[default]
    Local,
    /// Ratings shared by every session of the same user
    Global,
}

impl fmt::Display for EloScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EloScope::Local => f.write_str("local"),
            EloScope::Global => f.write_str("global"),
        }
    }
}

/// Configuration of a ranking session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub policy: BattlePolicy,
    /// Battle limit, interpreted per policy
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub elo_scope: EloScope,
    #[serde(default)]
    pub k_factor: KFactor,
}

impl SessionConfig {
    pub fn new(policy: BattlePolicy, limit: Option<u32>) -> Self {
        Self {
            policy,
            limit,
            ..Default::default()
        }
    }

    pub fn complete() -> Self {
        Self::new(BattlePolicy::Complete, None)
    }

    pub fn fixed(limit: u32) -> Self {
        Self::new(BattlePolicy::Fixed, Some(limit))
    }

    pub fn per_movie(limit: u32) -> Self {
        Self::new(BattlePolicy::PerMovie, Some(limit))
    }

    pub fn infinite() -> Self {
        Self::new(BattlePolicy::Infinite, None)
    }

    pub fn with_scope(mut self, scope: EloScope) -> Self {
        self.elo_scope = scope;
        self
    }

    pub fn with_k_factor(mut self, k_factor: KFactor) -> Self {
        self.k_factor = k_factor;
        self
    }

    /// Check the configuration before a session starts.
    ///
    /// Fixed and per-movie policies need a positive limit; a fixed K-factor
    /// must be positive and finite.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        if self.policy.requires_limit() && !matches!(self.limit, Some(limit) if limit > 0) {
            return Err(InvalidConfigError::MissingLimit {
                policy: self.policy,
            });
        }

        if let KFactor::Fixed { k } = self.k_factor {
            if !k.is_finite() || k <= 0.0 {
                return Err(InvalidConfigError::InvalidKFactor(k));
            }
        }

        Ok(())
    }
}
