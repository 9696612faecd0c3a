//! Matchmaking for Duelgrid: the waiting queue and its pairing policy.
//!
//! The queue is a plain, single-owner collection, deliberately NOT
//! internally synchronized. The engine wraps it in one mutex, which makes
//! enqueue, removal, and pairing a single mutual-exclusion domain: two
//! concurrent joins can never match the same player twice, and a player is
//! always in exactly one of {queue, session, removed}.
//!
//! # Key types
//!
//! - [`WaitingQueue`] — arrival-ordered waiting players
//! - [`MatchPolicy`] — the replaceable compatibility predicate
//! - [`SkillRegion`] — the default policy (skill window + same region)

mod error;
mod policy;
mod queue;

pub use error::QueueError;
pub use policy::{MatchPolicy, SkillRegion};
pub use queue::WaitingQueue;
