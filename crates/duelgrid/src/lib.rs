//! # Duelgrid
//!
//! In-memory matchmaking and session engine for two-player turn-based
//! games.
//!
//! Duelgrid pairs concurrently-connected clients into sessions and
//! arbitrates each session's shared state (board, turn order, move
//! legality, win detection, inactivity) until a terminal outcome. The
//! transport and the stats/history store stay outside: the engine reaches
//! them only through the [`Notifier`](duelgrid_protocol::Notifier) and
//! [`StatsStore`] seams, and a boundary layer maps its typed results onto
//! whatever wire protocol the server speaks.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use duelgrid::prelude::*;
//! # struct Hub; impl Notifier for Hub { fn notify(&self, _: ConnectionId, _: Event) {} }
//! # struct Db;
//! # impl StatsStore for Db {
//! #     async fn record_result(&self, _: Option<&str>, _: &str, _: &str, _: MatchResult)
//! #         -> Result<(), StatsError> { Ok(()) }
//! # }
//!
//! # async fn run() {
//! let engine = EngineBuilder::new()
//!     .skill_tolerance(2)
//!     .build::<TicTacToe, _>(Hub, Db);
//!
//! let outcome = engine
//!     .join_queue(Player {
//!         username: "alice".into(),
//!         skill_level: 5,
//!         region: "us".into(),
//!         connection: ConnectionId(1),
//!     })
//!     .await;
//! # let _ = outcome;
//! # }
//! ```

mod config;
mod engine;
mod error;
mod stats;
mod supervisor;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, JoinOutcome};
pub use error::EngineError;
pub use stats::{MatchResult, StatsError, StatsStore};

/// The common imports for embedding the engine.
pub mod prelude {
    pub use crate::{
        Engine, EngineBuilder, EngineConfig, EngineError, JoinOutcome,
        MatchResult, StatsError, StatsStore,
    };
    pub use duelgrid_protocol::{
        ConnectionId, Event, Notifier, Player, Seat, SessionId, Turn,
    };
    pub use duelgrid_queue::{MatchPolicy, QueueError, SkillRegion};
    pub use duelgrid_rules::{Place, RuleSet, TicTacToe};
    pub use duelgrid_session::{MoveOutcome, SessionError, SessionResult};
}
