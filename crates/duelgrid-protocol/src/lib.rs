//! Shared vocabulary for the Duelgrid matchmaking and session engine.
//!
//! This crate defines every type that crosses a component boundary:
//!
//! - [`ConnectionId`] / [`SessionId`] — identity newtypes
//! - [`Player`] — a joined player's profile plus their connection
//! - [`Seat`] / [`Turn`] — who sits where, whose turn it is
//! - [`Event`] — everything the engine tells a connected client
//! - [`Notifier`] — the seam the transport layer implements to receive
//!   those events
//!
//! The engine never owns a wire format; [`Event`] is serde-serializable so
//! a transport can encode it however it likes.

mod event;
mod types;

pub use event::{Event, Notifier};
pub use types::{ConnectionId, Player, Seat, SessionId, Turn};
