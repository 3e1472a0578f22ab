//! Wires ranking sessions to a store.
//!
//! Every call reads what it needs, runs the engine, then persists the result
//! before returning. The service keeps opened sessions in memory; callers
//! must not drive the same session from two threads at once. A session whose
//! changes fail to persist is dropped from memory and reloaded on next use.

use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{EloScope, SessionConfig};
use crate::elo;
use crate::error::{InvalidBattleError, RankingError, StoreError};
use crate::session::{BattleOutcome, RankingSession, SkipOutcome};
use crate::store::{BattleStore, ItemStore, SessionStore};
use crate::types::{Battle, ItemId, Pair, RatingChange, SessionStatus};

/// Ranking sessions backed by a persistent store
pub struct RankingService<S> {
    store: S,
    sessions: HashMap<Uuid, RankingSession>,
}

impl<S> RankingService<S>
where
    S: ItemStore + BattleStore + SessionStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            sessions: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// An already opened session
    pub fn session(&self, id: &Uuid) -> Option<&RankingSession> {
        self.sessions.get(id)
    }

    /// Start ranking the items the store lists for `id`.
    ///
    /// Seeded ratings and the session header are written back immediately.
    pub fn start_session(
        &mut self,
        id: Uuid,
        config: SessionConfig,
    ) -> Result<&RankingSession, RankingError> {
        self.start_session_with_rng(id, config, &mut rand::thread_rng())
    }

    pub fn start_session_with_rng<R: Rng + ?Sized>(
        &mut self,
        id: Uuid,
        config: SessionConfig,
        rng: &mut R,
    ) -> Result<&RankingSession, RankingError> {
        let scope = config.elo_scope;
        let seeds = self.store.list_items(&id, scope)?;
        let session = RankingSession::start_with_rng(id, seeds, config, rng)?;

        let ratings: Vec<RatingChange> = session
            .items()
            .iter()
            .map(|item| RatingChange {
                id: item.id.clone(),
                rating: item.rating,
            })
            .collect();
        self.store.save_ratings(&id, scope, &ratings)?;
        self.store.save_session(&session.record())?;

        self.sessions.insert(id, session);
        Ok(&self.sessions[&id])
    }

    /// Load a session from the store, rebuilding judged pairs from history.
    pub fn open_session(&mut self, id: Uuid) -> Result<&RankingSession, RankingError> {
        self.ensure_open(id, &mut rand::thread_rng())?;
        self.sessions
            .get(&id)
            .ok_or_else(|| StoreError::SessionNotFound(id).into())
    }

    pub fn record_battle(
        &mut self,
        id: Uuid,
        winner: &ItemId,
        loser: &ItemId,
    ) -> Result<BattleOutcome, RankingError> {
        self.record_battle_with_rng(id, winner, loser, &mut rand::thread_rng())
    }

    /// Record a battle and persist the new ratings, the battle and any
    /// status change.
    pub fn record_battle_with_rng<R: Rng + ?Sized>(
        &mut self,
        id: Uuid,
        winner: &ItemId,
        loser: &ItemId,
        rng: &mut R,
    ) -> Result<BattleOutcome, RankingError> {
        self.ensure_open(id, rng)?;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionNotFound(id))?;
        let scope = session.config().elo_scope;

        // Other sessions may have moved shared ratings since this one loaded
        if scope == EloScope::Global {
            let current: Vec<RatingChange> = self
                .store
                .list_items(&id, scope)?
                .into_iter()
                .filter(|seed| seed.id == *winner || seed.id == *loser)
                .filter_map(|seed| {
                    seed.rating.map(|rating| RatingChange {
                        id: seed.id,
                        rating,
                    })
                })
                .collect();
            session.refresh_ratings(&current);
        }

        let outcome = session.record_battle_with_rng(winner, loser, rng)?;

        let persisted = self.persist_battle(id, scope, &outcome);
        self.keep_if_persisted(id, persisted)?;
        Ok(outcome)
    }

    /// Skip a pair and persist it so it stays skipped after a reload.
    pub fn skip_battle(&mut self, id: Uuid, pair: &Pair) -> Result<SkipOutcome, RankingError> {
        let mut rng = rand::thread_rng();
        self.ensure_open(id, &mut rng)?;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionNotFound(id))?;

        let outcome = session.skip_battle_with_rng(pair, &mut rng)?;

        let persisted = self.persist_skip(id, &outcome);
        self.keep_if_persisted(id, persisted)?;
        Ok(outcome)
    }

    pub fn pause(&mut self, id: Uuid) -> Result<(), RankingError> {
        self.change_status(id, RankingSession::pause)
    }

    pub fn resume(&mut self, id: Uuid) -> Result<(), RankingError> {
        self.change_status(id, RankingSession::resume)
    }

    /// Undo the most recent battle in the session and in the store.
    ///
    /// Under global scope the battle's rating changes are taken back from
    /// the current shared ratings, so updates made since by other sessions
    /// are kept.
    pub fn undo_last_battle(&mut self, id: Uuid) -> Result<Battle, RankingError> {
        self.ensure_open(id, &mut rand::thread_rng())?;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionNotFound(id))?;
        let status_before = session.status();
        let scope = session.config().elo_scope;

        let battle = session.undo_last_battle()?;
        let status = (session.status() != status_before).then_some(session.status());

        let persisted = self.persist_undo(id, scope, &battle, status);
        let ratings = self.keep_if_persisted(id, persisted)?;
        if let Some(session) = self.sessions.get_mut(&id) {
            session.refresh_ratings(&ratings);
        }
        Ok(battle)
    }

    fn change_status<F, E>(&mut self, id: Uuid, change: F) -> Result<(), RankingError>
    where
        F: FnOnce(&mut RankingSession) -> Result<(), E>,
        E: Into<RankingError>,
    {
        self.ensure_open(id, &mut rand::thread_rng())?;
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(StoreError::SessionNotFound(id))?;

        if let Err(err) = change(session) {
            return Err(err.into());
        }
        let status = session.status();

        let persisted = self.store.save_session_status(&id, status).map_err(RankingError::from);
        self.keep_if_persisted(id, persisted)
    }

    fn persist_battle(
        &mut self,
        id: Uuid,
        scope: EloScope,
        outcome: &BattleOutcome,
    ) -> Result<(), RankingError> {
        self.store.append_battle(&id, &outcome.battle)?;
        self.store.save_ratings(&id, scope, &outcome.rating_changes())?;
        if outcome.newly_completed {
            self.store.save_session_status(&id, SessionStatus::Completed)?;
            info!(session = %id, "completed session persisted");
        }
        Ok(())
    }

    fn persist_skip(&mut self, id: Uuid, outcome: &SkipOutcome) -> Result<(), RankingError> {
        self.store.append_skip(&id, &outcome.key)?;
        if outcome.newly_completed {
            self.store.save_session_status(&id, SessionStatus::Completed)?;
        }
        Ok(())
    }

    /// Remove `battle` from the store and write back the restored ratings.
    fn persist_undo(
        &mut self,
        id: Uuid,
        scope: EloScope,
        battle: &Battle,
        status: Option<SessionStatus>,
    ) -> Result<Vec<RatingChange>, RankingError> {
        if self.store.remove_last_battle(&id)?.is_none() {
            return Err(InvalidBattleError::NothingToUndo.into());
        }

        let mut restored = vec![
            RatingChange {
                id: battle.winner_id.clone(),
                rating: battle.winner_rating_before,
            },
            RatingChange {
                id: battle.loser_id.clone(),
                rating: battle.loser_rating_before,
            },
        ];
        if scope == EloScope::Global {
            let current = self.store.list_items(&id, scope)?;
            let deltas = [
                battle.winner_rating_after - battle.winner_rating_before,
                battle.loser_rating_after - battle.loser_rating_before,
            ];
            for (change, delta) in restored.iter_mut().zip(deltas) {
                let shared = current
                    .iter()
                    .find(|seed| seed.id == change.id)
                    .and_then(|seed| seed.rating)
                    .filter(|rating| rating.is_finite());
                if let Some(rating) = shared {
                    change.rating = elo::round_rating(rating - delta);
                }
            }
        }

        self.store.save_ratings(&id, scope, &restored)?;
        if let Some(status) = status {
            self.store.save_session_status(&id, status)?;
        }
        Ok(restored)
    }

    /// Drop the cached session when its changes did not reach the store,
    /// so the next call rebuilds it from what was persisted.
    fn keep_if_persisted<T>(
        &mut self,
        id: Uuid,
        persisted: Result<T, RankingError>,
    ) -> Result<T, RankingError> {
        if let Err(err) = &persisted {
            self.sessions.remove(&id);
            warn!(session = %id, error = %err, "store write failed, session evicted");
        }
        persisted
    }

    fn ensure_open<R: Rng + ?Sized>(&mut self, id: Uuid, rng: &mut R) -> Result<(), RankingError> {
        if self.sessions.contains_key(&id) {
            return Ok(());
        }

        let record = self.store.load_session(&id)?;
        let items = self.store.list_items(&id, record.config.elo_scope)?;
        let battles = self.store.list_battles(&id)?;
        let skips = self.store.list_skips(&id)?;
        let session = RankingSession::restore(record, items, battles, skips, rng)?;

        debug!(session = %id, "session loaded from store");
        self.sessions.insert(id, session);
        Ok(())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
