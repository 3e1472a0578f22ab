//! Core data types shared by the ranking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::config::SessionConfig;

/// Opaque identifier of a comparable item (a movie id, usually).
///
/// Integers and strings both convert into it. An id that is empty or made of
/// whitespace only is not resolvable and never takes part in a pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id can identify an item at all
    pub fn is_resolvable(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for ItemId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// An item as supplied by the caller, before the session seeds its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSeed {
    pub id: ItemId,
    /// Stored rating, `None` when the item has never been rated
    #[serde(default)]
    pub rating: Option<f64>,
}

impl ItemSeed {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            rating: None,
        }
    }

    pub fn rated(id: impl Into<ItemId>, rating: f64) -> Self {
        Self {
            id: id.into(),
            rating: Some(rating),
        }
    }
}

/// An item taking part in a ranking session, with its current rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableItem {
    pub id: ItemId,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
}

impl ComparableItem {
    pub fn new(id: impl Into<ItemId>, rating: f64) -> Self {
        Self {
            id: id.into(),
            rating,
            wins: 0,
            losses: 0,
        }
    }

    /// Number of battles this item has been part of
    pub fn battles(&self) -> u32 {
        self.wins + self.losses
    }

    /// Eligible for pairing: resolvable id and a usable rating
    pub fn is_eligible(&self) -> bool {
        self.id.is_resolvable() && self.rating.is_finite()
    }
}

/// Canonical, order-independent key of a pair of items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub low: ItemId,
    pub high: ItemId,
}

impl PairKey {
    pub fn new(a: ItemId, b: ItemId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.low, self.high)
    }
}

/// Set of pairs that have been judged or skipped.
pub type CompletedPairs = BTreeSet<PairKey>;

/// Two items presented against each other, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub first: ItemId,
    pub second: ItemId,
}

impl Pair {
    pub fn new(first: impl Into<ItemId>, second: impl Into<ItemId>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.first.clone(), self.second.clone())
    }
}

/// Record of a single battle outcome. Never modified once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub winner_id: ItemId,
    pub loser_id: ItemId,
    pub winner_rating_before: f64,
    pub winner_rating_after: f64,
    pub loser_rating_before: f64,
    pub loser_rating_after: f64,
    pub created_at: DateTime<Utc>,
}

impl Battle {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.winner_id.clone(), self.loser_id.clone())
    }
}

/// Lifecycle state of a ranking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A new rating to persist for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub id: ItemId,
    pub rating: f64,
}

/// Persisted header of a session: everything except items and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub config: SessionConfig,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}
