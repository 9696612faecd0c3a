//! Session lifecycle for Duelgrid.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns the
//! board, the turn pointer, the move log, and the inactivity deadline.
//! Per-session mutual exclusion falls out of the actor: two concurrent
//! moves on the same session are applied one at a time, each seeing the
//! other's effect, while different sessions share nothing.
//!
//! # Key types
//!
//! - [`SessionRegistry`] — creates, looks up, and destroys sessions
//! - [`SessionHandle`] — send commands to a running session actor
//! - [`SessionPhase`] — lifecycle state machine
//! - [`MoveOutcome`] / [`SessionResult`] — what a move did
//! - [`SessionConfig`] — inactivity limit

mod config;
mod error;
mod registry;
mod session;

pub use config::{SessionConfig, SessionPhase};
pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{
    MoveOutcome, SessionEnded, SessionHandle, SessionInfo, SessionResult,
};
