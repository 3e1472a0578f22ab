//! Persistence seams used by [`crate::RankingService`].
//!
//! The engine never talks to a database itself. These traits describe the
//! get/put/query operations it needs, and [`InMemoryStore`] implements all of
//! them for tests and the simulator.

use std::collections::HashMap;
use uuid::Uuid;

use crate::config::EloScope;
use crate::error::StoreError;
use crate::types::{Battle, ItemId, ItemSeed, PairKey, RatingChange, SessionRecord, SessionStatus};

/// Items of a session and their stored ratings
pub trait ItemStore {
    /// Items belonging to `session`, with ratings read from the pool `scope` selects
    fn list_items(&self, session: &Uuid, scope: EloScope) -> Result<Vec<ItemSeed>, StoreError>;

    /// Persist new ratings into the pool `scope` selects
    fn save_ratings(
        &mut self,
        session: &Uuid,
        scope: EloScope,
        updates: &[RatingChange],
    ) -> Result<(), StoreError>;
}

/// Append-only battle history, plus skipped pairs
pub trait BattleStore {
    fn append_battle(&mut self, session: &Uuid, battle: &Battle) -> Result<(), StoreError>;

    /// Battles in submission order
    fn list_battles(&self, session: &Uuid) -> Result<Vec<Battle>, StoreError>;

    /// Remove and return the most recent battle (undo)
    fn remove_last_battle(&mut self, session: &Uuid) -> Result<Option<Battle>, StoreError>;

    fn append_skip(&mut self, session: &Uuid, key: &PairKey) -> Result<(), StoreError>;

    fn list_skips(&self, session: &Uuid) -> Result<Vec<PairKey>, StoreError>;
}

/// Session headers and status transitions
pub trait SessionStore {
    fn load_session(&self, session: &Uuid) -> Result<SessionRecord, StoreError>;

    fn save_session(&mut self, record: &SessionRecord) -> Result<(), StoreError>;

    fn save_session_status(
        &mut self,
        session: &Uuid,
        status: SessionStatus,
    ) -> Result<(), StoreError>;
}

/// In-process store backed by hash maps.
///
/// Local ratings are keyed by (session, item); global ratings by item only,
/// so every session that uses the global scope sees the same value.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    members: HashMap<Uuid, Vec<ItemId>>,
    local_ratings: HashMap<(Uuid, ItemId), f64>,
    global_ratings: HashMap<ItemId, f64>,
    battles: HashMap<Uuid, Vec<Battle>>,
    skips: HashMap<Uuid, Vec<PairKey>>,
    sessions: HashMap<Uuid, SessionRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the items a session will rank
    pub fn add_items<I, T>(&mut self, session: Uuid, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        let members = self.members.entry(session).or_default();
        for id in ids {
            let id = id.into();
            if !members.contains(&id) {
                members.push(id);
            }
        }
    }

    pub fn set_global_rating(&mut self, id: impl Into<ItemId>, rating: f64) {
        self.global_ratings.insert(id.into(), rating);
    }

    /// Stored rating of an item, if any
    pub fn rating(&self, session: &Uuid, scope: EloScope, id: &ItemId) -> Option<f64> {
        match scope {
            EloScope::Local => self.local_ratings.get(&(*session, id.clone())).copied(),
            EloScope::Global => self.global_ratings.get(id).copied(),
        }
    }
}

impl ItemStore for InMemoryStore {
    fn list_items(&self, session: &Uuid, scope: EloScope) -> Result<Vec<ItemSeed>, StoreError> {
        let members = match self.members.get(session) {
            Some(members) => members,
            None => return Ok(Vec::new()),
        };

        Ok(members
            .iter()
            .map(|id| ItemSeed {
                id: id.clone(),
                rating: self.rating(session, scope, id),
            })
            .collect())
    }

    fn save_ratings(
        &mut self,
        session: &Uuid,
        scope: EloScope,
        updates: &[RatingChange],
    ) -> Result<(), StoreError> {
        self.add_items(*session, updates.iter().map(|change| change.id.clone()));
        for change in updates {
            match scope {
                EloScope::Local => {
                    self.local_ratings
                        .insert((*session, change.id.clone()), change.rating);
                }
                EloScope::Global => {
                    self.global_ratings.insert(change.id.clone(), change.rating);
                }
            }
        }
        Ok(())
    }
}

impl BattleStore for InMemoryStore {
    fn append_battle(&mut self, session: &Uuid, battle: &Battle) -> Result<(), StoreError> {
        self.battles.entry(*session).or_default().push(battle.clone());
        Ok(())
    }

    fn list_battles(&self, session: &Uuid) -> Result<Vec<Battle>, StoreError> {
        Ok(self.battles.get(session).cloned().unwrap_or_default())
    }

    fn remove_last_battle(&mut self, session: &Uuid) -> Result<Option<Battle>, StoreError> {
        Ok(self.battles.get_mut(session).and_then(Vec::pop))
    }

    fn append_skip(&mut self, session: &Uuid, key: &PairKey) -> Result<(), StoreError> {
        self.skips.entry(*session).or_default().push(key.clone());
        Ok(())
    }

    fn list_skips(&self, session: &Uuid) -> Result<Vec<PairKey>, StoreError> {
        Ok(self.skips.get(session).cloned().unwrap_or_default())
    }
}

impl SessionStore for InMemoryStore {
    fn load_session(&self, session: &Uuid) -> Result<SessionRecord, StoreError> {
        self.sessions
            .get(session)
            .cloned()
            .ok_or(StoreError::SessionNotFound(*session))
    }

    fn save_session(&mut self, record: &SessionRecord) -> Result<(), StoreError> {
        self.sessions.insert(record.id, record.clone());
        Ok(())
    }

    fn save_session_status(
        &mut self,
        session: &Uuid,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        let record = self
            .sessions
            .get_mut(session)
            .ok_or(StoreError::SessionNotFound(*session))?;
        record.status = status;
        Ok(())
    }
}
