//! Pairwise comparison ranking engine
//!
//! This crate provides:
//! - Elo rating updates with fixed or dynamic K-factor
//! - Pair scheduling for head-to-head "versus" battles
//! - Session progress and the ranking session state machine
//! - Store traits and a service that persists sessions through them
//!
//! # Usage
//!
//! ```
//! use versus_core::{ItemSeed, RankingSession, SessionConfig};
//!
//! let items = ["alien", "brazil", "clue"].map(ItemSeed::new);
//! let mut session = RankingSession::start(items, SessionConfig::complete()).unwrap();
//!
//! while let Some(pair) = session.next_pair().cloned() {
//!     session.record_battle(&pair.first, &pair.second).unwrap();
//! }
//! assert!(session.progress().is_completed);
//! ```

mod config;
mod elo;
mod error;
mod pairing;
mod progress;
mod service;
mod session;
mod store;
mod types;

pub use config::*;
pub use elo::*;
pub use error::*;
pub use pairing::*;
pub use progress::*;
pub use service::*;
pub use session::*;
pub use store::*;
pub use types::*;
