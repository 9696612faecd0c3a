//! The engine facade: the four boundary commands over shared state.
//!
//! One mutual-exclusion domain per structure: a mutex around the queue,
//! a mutex around the registry, and the per-session actor tasks. Never a
//! single global lock: unrelated games proceed concurrently, and both
//! mutexes are held only for map-level bookkeeping, never across a
//! session's adjudication.

use std::sync::Arc;

use duelgrid_protocol::{
    ConnectionId, Event, Notifier, Player, Seat, SessionId,
};
use duelgrid_queue::{MatchPolicy, SkillRegion, WaitingQueue};
use duelgrid_rules::RuleSet;
use duelgrid_session::{
    MoveOutcome, SessionConfig, SessionError, SessionHandle, SessionRegistry,
    SessionResult,
};
use tokio::sync::{Mutex, mpsc};

use crate::supervisor;
use crate::{EngineConfig, EngineError, MatchResult, StatsStore};

/// What `join_queue` did with the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// No compatible partner yet; the player waits (with a queue-timeout
    /// timer armed).
    Queued,
    /// Paired immediately; both parties have been sent `match-found`.
    Matched { session_id: SessionId },
}

/// Shared engine state, behind an `Arc` so command handlers, timers, and
/// the supervisor can all reach it.
pub(crate) struct EngineInner<R: RuleSet, S: StatsStore> {
    pub(crate) config: EngineConfig,
    pub(crate) queue: Mutex<WaitingQueue>,
    pub(crate) registry: Mutex<SessionRegistry<R>>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) stats: S,
}

/// Builder for configuring an [`Engine`].
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new()
///     .queue_timeout(Duration::from_secs(30))
///     .build::<TicTacToe, _>(my_notifier, my_stats);
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    policy: Option<Box<dyn MatchPolicy>>,
}

impl EngineBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            policy: None,
        }
    }

    /// Sets the whole configuration at once.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the skill window of the default pairing policy.
    pub fn skill_tolerance(mut self, tolerance: i32) -> Self {
        self.config.skill_tolerance = tolerance;
        self
    }

    /// Sets the queue inactivity limit.
    pub fn queue_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.queue_timeout = timeout;
        self
    }

    /// Sets the session inactivity limit.
    pub fn session_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.session_timeout = timeout;
        self
    }

    /// Replaces the pairing policy entirely.
    pub fn match_policy(mut self, policy: impl MatchPolicy) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Builds the engine for ruleset `R`, wired to the given collaborators,
    /// and spawns its lifecycle supervisor.
    pub fn build<R: RuleSet, S: StatsStore>(
        self,
        notifier: impl Notifier,
        stats: S,
    ) -> Engine<R, S> {
        let notifier: Arc<dyn Notifier> = Arc::new(notifier);
        let policy = self.policy.unwrap_or_else(|| {
            Box::new(SkillRegion {
                skill_tolerance: self.config.skill_tolerance,
            })
        });
        let session_config = SessionConfig {
            inactivity_timeout: self.config.session_timeout,
        };

        let (lifecycle_tx, lifecycle_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(EngineInner {
            config: self.config,
            queue: Mutex::new(WaitingQueue::with_policy(policy)),
            registry: Mutex::new(SessionRegistry::new(
                session_config,
                Arc::clone(&notifier),
                lifecycle_tx,
            )),
            notifier,
            stats,
        });

        // The supervisor holds only a weak reference, so dropping the last
        // engine handle shuts it down along with everything else.
        supervisor::spawn_supervisor(Arc::downgrade(&inner), lifecycle_rx);

        tracing::info!("engine started");
        Engine { inner }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The matchmaking and session engine.
///
/// Cheap to clone; every clone shares the same queue, registry, and
/// collaborators. The boundary layer typically keeps one per connection
/// handler task.
pub struct Engine<R: RuleSet, S: StatsStore> {
    inner: Arc<EngineInner<R, S>>,
}

impl<R: RuleSet, S: StatsStore> Clone for Engine<R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RuleSet, S: StatsStore> Engine<R, S> {
    /// Creates a new builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Puts a player into the matchmaking queue and attempts to pair.
    ///
    /// Enqueue and pairing happen under one queue lock, so concurrent
    /// joins can neither double-match a player nor lose one. If a pair
    /// forms, the session is created and both parties are notified
    /// `match-found` before this returns; otherwise a queue-timeout timer
    /// is armed for the new entry.
    ///
    /// # Errors
    /// - [`EngineError::InvalidPlayer`] — blank username or region
    /// - [`QueueError::DuplicateConnection`](duelgrid_queue::QueueError) —
    ///   the connection is already waiting
    pub async fn join_queue(
        &self,
        player: Player,
    ) -> Result<JoinOutcome, EngineError> {
        if player.username.trim().is_empty() {
            return Err(EngineError::InvalidPlayer("username"));
        }
        if player.region.trim().is_empty() {
            return Err(EngineError::InvalidPlayer("region"));
        }

        let connection = player.connection;
        let mut queue = self.inner.queue.lock().await;
        queue.enqueue(player)?;

        let Some((first, second)) = queue.try_match() else {
            drop(queue);
            supervisor::arm_queue_timer(&self.inner, connection);
            return Ok(JoinOutcome::Queued);
        };

        // Take the registry lock before releasing the queue lock (queue →
        // registry order everywhere): a racing disconnect then always
        // observes the pair in the queue or in the registry, never in
        // neither.
        let mut registry = self.inner.registry.lock().await;
        drop(queue);
        let handle = registry.create(first.clone(), second.clone());
        drop(registry);

        let session_id = handle.session_id().clone();
        self.inner.notifier.notify(
            first.connection,
            Event::MatchFound {
                session_id: session_id.clone(),
                seat: Seat::First,
                opponent: second.clone(),
            },
        );
        self.inner.notifier.notify(
            second.connection,
            Event::MatchFound {
                session_id: session_id.clone(),
                seat: Seat::Second,
                opponent: first,
            },
        );

        Ok(JoinOutcome::Matched { session_id })
    }

    /// Removes a waiting player. Returns whether an entry was removed;
    /// calling again (or for an unknown connection) is a no-op.
    pub async fn leave_queue(&self, connection: ConnectionId) -> bool {
        self.inner.queue.lock().await.remove(connection).is_some()
    }

    /// Routes a move to its session for adjudication.
    ///
    /// The registry lock is held only to clone the session handle; the
    /// session's actor serializes the move itself. A terminal outcome
    /// records the result with the stats collaborator (exactly once,
    /// fire-and-forget) and destroys the session before returning.
    pub async fn submit_move(
        &self,
        session_id: &SessionId,
        connection: ConnectionId,
        mv: R::Move,
    ) -> Result<MoveOutcome, EngineError> {
        let handle = self
            .inner
            .registry
            .lock()
            .await
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;

        let outcome = handle.apply_move(connection, mv).await?;

        if let MoveOutcome::Finished { result } = outcome {
            self.finish_session(session_id, &handle, result).await;
        }
        Ok(outcome)
    }

    /// Handles a dropped connection: removes any queue entry, and tears
    /// down any session the connection participates in (the opponent is
    /// notified). Safe to call repeatedly: a connection is never in more
    /// than one place, and every step is a no-op when already gone.
    pub async fn disconnect(&self, connection: ConnectionId) {
        if self.inner.queue.lock().await.remove(connection).is_some() {
            tracing::info!(%connection, "disconnected player left the queue");
        }

        let handle = self
            .inner
            .registry
            .lock()
            .await
            .remove_by_connection(connection);
        if let Some(handle) = handle {
            tracing::info!(
                %connection,
                session_id = %handle.session_id(),
                "session torn down after disconnect"
            );
            handle.abort(connection).await;
        }
    }

    /// Number of players currently waiting in the queue.
    pub async fn queue_len(&self) -> usize {
        self.inner.queue.lock().await.len()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.inner.registry.lock().await.len()
    }

    /// The session a connection currently participates in, if any.
    pub async fn session_for(
        &self,
        connection: ConnectionId,
    ) -> Option<SessionId> {
        self.inner.registry.lock().await.session_for(connection)
    }

    /// Records the result with the stats collaborator and destroys the
    /// session.
    async fn finish_session(
        &self,
        session_id: &SessionId,
        handle: &SessionHandle<R>,
        result: SessionResult,
    ) {
        let [first, second] = handle.players().clone();
        let (winner, outcome) = match result {
            SessionResult::Winner(Seat::First) => {
                (Some(first.username.clone()), MatchResult::Win)
            }
            SessionResult::Winner(Seat::Second) => {
                (Some(second.username.clone()), MatchResult::Loss)
            }
            SessionResult::Draw => (None, MatchResult::Draw),
        };

        // Fire-and-forget: a store failure is logged and swallowed, and
        // teardown never waits on the write.
        let inner = Arc::clone(&self.inner);
        let (player1, player2) = (first.username, second.username);
        tokio::spawn(async move {
            if let Err(e) = inner
                .stats
                .record_result(winner.as_deref(), &player1, &player2, outcome)
                .await
            {
                tracing::warn!(error = %e, "failed to record match result");
            }
        });

        if let Some(handle) = self.inner.registry.lock().await.remove(session_id)
        {
            handle.shutdown().await;
        }
    }
}
