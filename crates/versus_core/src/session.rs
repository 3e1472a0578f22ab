//! Ranking session state machine.
//!
//! A session owns its items, the set of judged pairs, the battle history and
//! the queue of pairs still to present. Status moves `active -> paused ->
//! active` on user request and `active -> completed` once progress reaches
//! the target or, for finite policies, once no unjudged pair is left.
//!
//! Sessions do no I/O. Callers persist whatever the returned outcomes
//! describe, and serialize calls per session: a battle is a read-modify-write
//! over two item ratings.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::elo::{self, DEFAULT_RATING};
use crate::error::{InvalidBattleError, InvalidConfigError, TransitionError};
use crate::pairing;
use crate::progress::{self, Progress};
use crate::types::{
    Battle, ComparableItem, CompletedPairs, ItemId, ItemSeed, Pair, PairKey, RatingChange,
    SessionRecord, SessionStatus,
};

/// What recording a battle produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub battle: Battle,
    pub progress: Progress,
    /// True when this battle moved the session to `completed`
    pub newly_completed: bool,
}

impl BattleOutcome {
    /// Ratings to persist for the two items involved
    pub fn rating_changes(&self) -> [RatingChange; 2] {
        [
            RatingChange {
                id: self.battle.winner_id.clone(),
                rating: self.battle.winner_rating_after,
            },
            RatingChange {
                id: self.battle.loser_id.clone(),
                rating: self.battle.loser_rating_after,
            },
        ]
    }
}

/// What skipping a pair produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipOutcome {
    pub key: PairKey,
    pub progress: Progress,
    pub newly_completed: bool,
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub rank: usize,
    pub id: ItemId,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
}

/// A single user's ranking session over a set of items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSession {
    id: Uuid,
    status: SessionStatus,
    config: SessionConfig,
    items: Vec<ComparableItem>,
    completed_pairs: CompletedPairs,
    skipped_pairs: CompletedPairs,
    battles: Vec<Battle>,
    queue: VecDeque<Pair>,
    created_at: DateTime<Utc>,
}

impl RankingSession {
    /// Start a new session with a random id.
    pub fn start(
        items: impl IntoIterator<Item = ItemSeed>,
        config: SessionConfig,
    ) -> Result<Self, InvalidConfigError> {
        Self::start_with_rng(Uuid::new_v4(), items, config, &mut rand::thread_rng())
    }

    /// Start a new session with an explicit id and random source.
    ///
    /// Items with an unresolvable id and repeated ids are dropped. Items
    /// without a usable rating start at [`DEFAULT_RATING`]; the rest are
    /// rounded to one decimal place. A finite session with nothing to judge
    /// starts out `completed`.
    pub fn start_with_rng<R: Rng + ?Sized>(
        id: Uuid,
        items: impl IntoIterator<Item = ItemSeed>,
        config: SessionConfig,
        rng: &mut R,
    ) -> Result<Self, InvalidConfigError> {
        config.validate()?;

        let mut session = Self {
            id,
            status: SessionStatus::Active,
            config,
            items: seed_items(items),
            completed_pairs: CompletedPairs::new(),
            skipped_pairs: CompletedPairs::new(),
            battles: Vec::new(),
            queue: VecDeque::new(),
            created_at: Utc::now(),
        };
        session.refill_queue(rng);
        session.evaluate_completion();

        info!(
            session = %session.id,
            status = %session.status,
            policy = %session.config.policy,
            items = session.items.len(),
            queued = session.queue.len(),
            "ranking session started"
        );

        Ok(session)
    }

    /// Rebuild a session from persisted state.
    ///
    /// Ratings come from `items` as stored; win/loss counts and judged pairs
    /// are derived from `battles` and `skipped`. The stored status is kept
    /// as is.
    pub fn restore<R: Rng + ?Sized>(
        record: SessionRecord,
        items: impl IntoIterator<Item = ItemSeed>,
        battles: Vec<Battle>,
        skipped: impl IntoIterator<Item = PairKey>,
        rng: &mut R,
    ) -> Result<Self, InvalidConfigError> {
        record.config.validate()?;

        let mut items = seed_items(items);
        for battle in &battles {
            if let Some(winner) = items.iter_mut().find(|item| item.id == battle.winner_id) {
                winner.wins += 1;
            }
            if let Some(loser) = items.iter_mut().find(|item| item.id == battle.loser_id) {
                loser.losses += 1;
            }
        }

        let skipped_pairs: CompletedPairs = skipped.into_iter().collect();
        let mut completed_pairs: CompletedPairs = battles.iter().map(Battle::key).collect();
        completed_pairs.extend(skipped_pairs.iter().cloned());

        let mut session = Self {
            id: record.id,
            status: record.status,
            config: record.config,
            items,
            completed_pairs,
            skipped_pairs,
            battles,
            queue: VecDeque::new(),
            created_at: record.created_at,
        };
        session.refill_queue(rng);

        debug!(
            session = %session.id,
            status = %session.status,
            battles = session.battles.len(),
            "ranking session restored"
        );

        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[ComparableItem] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&ComparableItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Battle history in submission order
    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }

    pub fn completed_pairs(&self) -> &CompletedPairs {
        &self.completed_pairs
    }

    pub fn skipped_pairs(&self) -> &CompletedPairs {
        &self.skipped_pairs
    }

    /// The pair to present next, `None` when nothing is left to judge
    pub fn next_pair(&self) -> Option<&Pair> {
        self.queue.front()
    }

    pub fn pending_pairs(&self) -> impl Iterator<Item = &Pair> {
        self.queue.iter()
    }

    /// Persistable header of this session
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id,
            config: self.config.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    /// Progress against the configured battle limit. Skips do not count.
    pub fn progress(&self) -> Progress {
        let completed = u32::try_from(self.battles.len()).unwrap_or(u32::MAX);
        progress::progress(
            self.items.len(),
            self.config.policy,
            self.config.limit,
            completed,
        )
    }

    /// Items ordered by rating, highest first. Ties are ordered by id.
    pub fn leaderboard(&self) -> Vec<Standing> {
        let mut sorted: Vec<&ComparableItem> = self.items.iter().collect();
        sorted.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        sorted
            .into_iter()
            .enumerate()
            .map(|(index, item)| Standing {
                rank: index + 1,
                id: item.id.clone(),
                rating: item.rating,
                wins: item.wins,
                losses: item.losses,
            })
            .collect()
    }

    /// Record that `winner` was preferred over `loser`.
    pub fn record_battle(
        &mut self,
        winner: &ItemId,
        loser: &ItemId,
    ) -> Result<BattleOutcome, InvalidBattleError> {
        self.record_battle_with_rng(winner, loser, &mut rand::thread_rng())
    }

    pub fn record_battle_with_rng<R: Rng + ?Sized>(
        &mut self,
        winner: &ItemId,
        loser: &ItemId,
        rng: &mut R,
    ) -> Result<BattleOutcome, InvalidBattleError> {
        self.ensure_active()?;
        let (w, l) = self.battle_indices(winner, loser)?;

        let winner_before = self.items[w].rating;
        let loser_before = self.items[l].rating;
        let k = self.config.k_factor.resolve(winner_before, loser_before);
        let update = elo::update(winner_before, loser_before, k);

        self.items[w].rating = update.winner_new;
        self.items[w].wins += 1;
        self.items[l].rating = update.loser_new;
        self.items[l].losses += 1;

        let battle = Battle {
            winner_id: winner.clone(),
            loser_id: loser.clone(),
            winner_rating_before: winner_before,
            winner_rating_after: update.winner_new,
            loser_rating_before: loser_before,
            loser_rating_after: update.loser_new,
            created_at: Utc::now(),
        };
        self.battles.push(battle.clone());

        let key = battle.key();
        self.completed_pairs.insert(key.clone());
        self.advance_queue(&key, rng);
        let newly_completed = self.evaluate_completion();

        debug!(
            session = %self.id,
            winner = %winner,
            loser = %loser,
            k,
            winner_delta = update.winner_delta,
            loser_delta = update.loser_delta,
            "battle recorded"
        );

        Ok(BattleOutcome {
            battle,
            progress: self.progress(),
            newly_completed,
        })
    }

    /// Mark a pair as judged without changing any rating.
    pub fn skip_battle(&mut self, pair: &Pair) -> Result<SkipOutcome, InvalidBattleError> {
        self.skip_battle_with_rng(pair, &mut rand::thread_rng())
    }

    pub fn skip_battle_with_rng<R: Rng + ?Sized>(
        &mut self,
        pair: &Pair,
        rng: &mut R,
    ) -> Result<SkipOutcome, InvalidBattleError> {
        self.ensure_active()?;
        self.battle_indices(&pair.first, &pair.second)?;

        let key = pair.key();
        self.completed_pairs.insert(key.clone());
        self.skipped_pairs.insert(key.clone());
        self.advance_queue(&key, rng);
        let newly_completed = self.evaluate_completion();

        debug!(session = %self.id, pair = %key, "pair skipped");

        Ok(SkipOutcome {
            key,
            progress: self.progress(),
            newly_completed,
        })
    }

    /// Take back the most recent battle.
    ///
    /// Both items return to their before-ratings, the pair becomes available
    /// again and a completed session reopens. Paused sessions must resume
    /// first.
    pub fn undo_last_battle(&mut self) -> Result<Battle, InvalidBattleError> {
        if self.status == SessionStatus::Paused {
            return Err(InvalidBattleError::NotActive {
                status: self.status,
            });
        }
        let battle = self.battles.pop().ok_or(InvalidBattleError::NothingToUndo)?;

        if let Some(winner) = self.items.iter_mut().find(|item| item.id == battle.winner_id) {
            winner.rating = battle.winner_rating_before;
            winner.wins = winner.wins.saturating_sub(1);
        }
        if let Some(loser) = self.items.iter_mut().find(|item| item.id == battle.loser_id) {
            loser.rating = battle.loser_rating_before;
            loser.losses = loser.losses.saturating_sub(1);
        }

        let key = battle.key();
        let still_judged =
            self.skipped_pairs.contains(&key) || self.battles.iter().any(|b| b.key() == key);
        if !still_judged {
            self.completed_pairs.remove(&key);
            self.queue.retain(|pair| pair.key() != key);
            self.queue
                .push_front(Pair::new(battle.winner_id.clone(), battle.loser_id.clone()));
        }

        if self.status == SessionStatus::Completed {
            self.status = SessionStatus::Active;
            info!(session = %self.id, "ranking session reopened by undo");
        }

        debug!(session = %self.id, pair = %key, "battle undone");
        Ok(battle)
    }

    /// `active -> paused`
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.transition(SessionStatus::Active, SessionStatus::Paused)
    }

    /// `paused -> active`
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.transition(SessionStatus::Paused, SessionStatus::Active)
    }

    /// Overwrite ratings with values read from a shared pool.
    ///
    /// Only meaningful for global Elo scope, where other sessions may have
    /// moved an item's rating since this one was loaded. Unknown ids and
    /// non-finite ratings are ignored.
    pub fn refresh_ratings(&mut self, ratings: &[RatingChange]) {
        for change in ratings.iter().filter(|change| change.rating.is_finite()) {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == change.id) {
                item.rating = elo::round_rating(change.rating);
            }
        }
    }

    fn transition(&mut self, from: SessionStatus, to: SessionStatus) -> Result<(), TransitionError> {
        if self.status != from {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        info!(session = %self.id, %from, %to, "session status changed");
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), InvalidBattleError> {
        if self.status == SessionStatus::Active {
            Ok(())
        } else {
            Err(InvalidBattleError::NotActive {
                status: self.status,
            })
        }
    }

    fn battle_indices(
        &self,
        a: &ItemId,
        b: &ItemId,
    ) -> Result<(usize, usize), InvalidBattleError> {
        if a == b {
            return Err(InvalidBattleError::SameItem(a.clone()));
        }
        let position = |id: &ItemId| {
            self.items
                .iter()
                .position(|item| item.id == *id)
                .ok_or_else(|| InvalidBattleError::UnknownItem(id.clone()))
        };
        Ok((position(a)?, position(b)?))
    }

    /// Drop the judged pair from the queue and refill once it runs dry.
    fn advance_queue<R: Rng + ?Sized>(&mut self, key: &PairKey, rng: &mut R) {
        if let Some(index) = self.queue.iter().position(|pair| pair.key() == *key) {
            self.queue.remove(index);
        }
        if self.queue.is_empty() {
            self.refill_queue(rng);
        }
    }

    fn refill_queue<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let pairs = pairing::generate_pairs(
            &self.items,
            &self.completed_pairs,
            self.config.policy,
            self.config.limit,
            rng,
        );
        self.queue.extend(pairs);
    }

    /// Move to `completed` when the target is reached or, for finite
    /// policies, when no unjudged pair remains.
    fn evaluate_completion(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }

        let reached_target = self.progress().is_completed;
        let exhausted = self.config.policy.is_finite() && self.queue.is_empty();
        if !(reached_target || exhausted) {
            return false;
        }

        self.status = SessionStatus::Completed;
        info!(
            session = %self.id,
            battles = self.battles.len(),
            exhausted = exhausted && !reached_target,
            "ranking session completed"
        );
        true
    }
}

/// Normalize caller items: drop unresolvable and repeated ids, seed ratings.
fn seed_items(seeds: impl IntoIterator<Item = ItemSeed>) -> Vec<ComparableItem> {
    let mut seen: HashSet<ItemId> = HashSet::new();
    let mut items = Vec::new();

    for seed in seeds {
        if !seed.id.is_resolvable() {
            warn!("dropping item without a resolvable id");
            continue;
        }
        if !seen.insert(seed.id.clone()) {
            warn!(id = %seed.id, "dropping duplicate item");
            continue;
        }
        let rating = seed
            .rating
            .filter(|rating| rating.is_finite())
            .map(elo::round_rating)
            .unwrap_or(DEFAULT_RATING);
        items.push(ComparableItem::new(seed.id, rating));
    }

    items
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
