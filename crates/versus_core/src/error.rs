//! Error types for the ranking engine

use thiserror::Error;
use uuid::Uuid;

use crate::config::BattlePolicy;
use crate::types::{ItemId, SessionStatus};

/// A battle (or skip, or undo) the session cannot accept
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidBattleError {
    #[error("an item cannot battle itself: {0}")]
    SameItem(ItemId),
    #[error("item {0} is not part of this session")]
    UnknownItem(ItemId),
    #[error("session is {status}, battles require an active session")]
    NotActive { status: SessionStatus },
    #[error("no battle to undo")]
    NothingToUndo,
}

/// A session configuration rejected at start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfigError {
    #[error("battle policy {policy} requires a positive limit")]
    MissingLimit { policy: BattlePolicy },
    #[error("K-factor must be positive and finite, got {0}")]
    InvalidKFactor(f64),
}

/// A status change the session state machine does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move session from {from} to {to}")]
pub struct TransitionError {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

/// Failure reported by a store backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Anything that can go wrong in [`crate::RankingService`]
#[derive(Debug, Error)]
pub enum RankingError {
    #[error(transparent)]
    Battle(#[from] InvalidBattleError),
    #[error(transparent)]
    Config(#[from] InvalidConfigError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
