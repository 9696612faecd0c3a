//! Session registry: creates, tracks, and routes to live sessions.

use std::collections::HashMap;
use std::sync::Arc;

use duelgrid_protocol::{ConnectionId, Notifier, Player, SessionId};
use duelgrid_rules::RuleSet;
use rand::Rng;
use tokio::sync::mpsc;

use crate::session::{SessionEnded, SessionHandle, spawn_session};
use crate::SessionConfig;

/// Default command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every live session and which connection sits in which one.
///
/// Like the queue, this is a plain single-owner structure: the engine
/// guards it with one mutex, held only long enough to look up or update
/// the maps; the per-session work happens on the session's own actor
/// task, outside the registry lock.
///
/// Invariant: a connection is in at most one session at a time, and a
/// removed session id is never reinserted, so a torn-down session cannot
/// reappear.
pub struct SessionRegistry<R: RuleSet> {
    /// Live sessions, keyed by session id.
    sessions: HashMap<SessionId, SessionHandle<R>>,
    /// Maps each participant to their session.
    by_connection: HashMap<ConnectionId, SessionId>,
    config: SessionConfig,
    notifier: Arc<dyn Notifier>,
    lifecycle: mpsc::UnboundedSender<SessionEnded>,
}

impl<R: RuleSet> SessionRegistry<R> {
    /// Creates an empty registry. `lifecycle` receives a [`SessionEnded`]
    /// whenever a session actor tears itself down on inactivity.
    pub fn new(
        config: SessionConfig,
        notifier: Arc<dyn Notifier>,
        lifecycle: mpsc::UnboundedSender<SessionEnded>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            by_connection: HashMap::new(),
            config,
            notifier,
            lifecycle,
        }
    }

    /// Creates a session for a matched pair and spawns its actor.
    ///
    /// `first` moves first. The callers guarantee neither connection is
    /// already in a session (they hold the queue/registry locks across
    /// matching), so this only asserts the bookkeeping.
    pub fn create(
        &mut self,
        first: Player,
        second: Player,
    ) -> SessionHandle<R> {
        let session_id = generate_session_id();
        let connections = [first.connection, second.connection];

        let handle = spawn_session::<R>(
            session_id.clone(),
            [first, second],
            self.config.clone(),
            Arc::clone(&self.notifier),
            self.lifecycle.clone(),
            DEFAULT_CHANNEL_SIZE,
        );

        for connection in connections {
            self.by_connection.insert(connection, session_id.clone());
        }
        self.sessions.insert(session_id.clone(), handle.clone());
        tracing::info!(%session_id, "session registered");
        handle
    }

    /// Looks up a session by id.
    pub fn get(&self, session_id: &SessionId) -> Option<SessionHandle<R>> {
        self.sessions.get(session_id).cloned()
    }

    /// The session a connection currently participates in, if any.
    pub fn session_for(&self, connection: ConnectionId) -> Option<SessionId> {
        self.by_connection.get(&connection).cloned()
    }

    /// Removes a session and its connection index entries. Idempotent;
    /// the caller decides whether to abort or shut down the actor.
    pub fn remove(
        &mut self,
        session_id: &SessionId,
    ) -> Option<SessionHandle<R>> {
        let handle = self.sessions.remove(session_id)?;
        self.by_connection.retain(|_, sid| sid != session_id);
        tracing::info!(%session_id, "session removed from registry");
        Some(handle)
    }

    /// Removes the session containing `connection`, if any. Idempotent.
    pub fn remove_by_connection(
        &mut self,
        connection: ConnectionId,
    ) -> Option<SessionHandle<R>> {
        let session_id = self.by_connection.get(&connection)?.clone();
        self.remove(&session_id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// `true` if no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of all live sessions.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.keys().cloned().collect()
    }
}

/// Mints a random 32-character hex session id (128 bits of entropy):
/// collision-proof in practice and meaningless to guess, unlike ids
/// derived from connection ids, which transports recycle.
fn generate_session_id() -> SessionId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    SessionId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}
