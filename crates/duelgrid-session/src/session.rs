//! Session actor: an isolated Tokio task that owns one match.
//!
//! The actor serializes everything that touches the session's mutable
//! state (board, turn, move log, inactivity deadline) by funneling it
//! through one command channel. The inactivity timer lives on the same
//! task, so refreshing the deadline and the timer firing are mutually
//! exclusive by construction.

use std::sync::Arc;

use duelgrid_protocol::{
    ConnectionId, Event, Notifier, Player, Seat, SessionId, Turn,
};
use duelgrid_rules::{RuleSet, Verdict};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::{SessionConfig, SessionError, SessionPhase};

/// What a successfully applied move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move stood; the game continues with `next_turn` to act.
    Applied { next_turn: Turn },
    /// The move ended the game. The actor reports this exactly once per
    /// session; the caller owes the stats collaborator a record.
    Finished { result: SessionResult },
}

/// The terminal result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResult {
    /// The given seat won.
    Winner(Seat),
    /// Board exhausted, nobody won.
    Draw,
}

/// A snapshot of session metadata (not the board itself).
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// The session's unique id.
    pub session_id: SessionId,
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// Whose turn it is (or `GameOver`).
    pub turn: Turn,
    /// How many moves have been applied.
    pub moves: usize,
}

/// Emitted on the lifecycle channel when a session tears itself down
/// (inactivity expiry). The supervisor prunes the registry in response.
#[derive(Debug, Clone)]
pub struct SessionEnded {
    pub session_id: SessionId,
}

/// One applied move in the append-only log. Only the count is read at
/// the moment; the records themselves exist for replay and debugging.
#[allow(dead_code)]
struct MoveRecord<M> {
    seat: Seat,
    mv: M,
}

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand<R: RuleSet> {
    /// Apply a move on behalf of a connection.
    Move {
        connection: ConnectionId,
        mv: R::Move,
        reply: oneshot::Sender<Result<MoveOutcome, SessionError>>,
    },

    /// Request the current session metadata.
    Info {
        reply: oneshot::Sender<SessionInfo>,
    },

    /// A participant's connection went away; notify the other side
    /// and stop.
    Abort { disconnected: ConnectionId },

    /// Stop without further notifications (the caller already reported
    /// the outcome).
    Shutdown,
}

/// Handle to a running session actor. Cheap to clone.
///
/// The registry holds one of these per session; callers clone it out
/// under a short registry lock and talk to the actor without holding
/// any lock at all.
pub struct SessionHandle<R: RuleSet> {
    session_id: SessionId,
    players: Arc<[Player; 2]>,
    sender: mpsc::Sender<SessionCommand<R>>,
}

impl<R: RuleSet> Clone for SessionHandle<R> {
    fn clone(&self) -> Self {
        Self {
            session_id: self.session_id.clone(),
            players: Arc::clone(&self.players),
            sender: self.sender.clone(),
        }
    }
}

impl<R: RuleSet> SessionHandle<R> {
    /// The session's unique id.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The two participants, seat order. Immutable for the session's
    /// lifetime, which is why the handle can carry them.
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// The participants' connection ids, seat order.
    pub fn connections(&self) -> [ConnectionId; 2] {
        [self.players[0].connection, self.players[1].connection]
    }

    /// Submits a move and waits for the adjudication.
    pub async fn apply_move(
        &self,
        connection: ConnectionId,
        mv: R::Move,
    ) -> Result<MoveOutcome, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Move {
                connection,
                mv,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::NotFound(self.session_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::NotFound(self.session_id.clone()))?
    }

    /// Requests the current session metadata.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| SessionError::NotFound(self.session_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::NotFound(self.session_id.clone()))
    }

    /// Tears the session down because `disconnected` went away. The other
    /// participant is notified. A no-op if the actor already stopped.
    pub async fn abort(&self, disconnected: ConnectionId) {
        let _ = self
            .sender
            .send(SessionCommand::Abort { disconnected })
            .await;
    }

    /// Stops the actor without notifications. A no-op if already stopped.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SessionCommand::Shutdown).await;
    }
}

/// The internal session actor state. Runs inside a Tokio task.
struct SessionActor<R: RuleSet> {
    session_id: SessionId,
    players: Arc<[Player; 2]>,
    board: R::Board,
    turn: Turn,
    phase: SessionPhase,
    move_log: Vec<MoveRecord<R::Move>>,
    /// When the inactivity timer fires; pushed forward by every
    /// successful move.
    deadline: Instant,
    config: SessionConfig,
    notifier: Arc<dyn Notifier>,
    lifecycle: mpsc::UnboundedSender<SessionEnded>,
    receiver: mpsc::Receiver<SessionCommand<R>>,
}

impl<R: RuleSet> SessionActor<R> {
    /// Runs the actor loop until shutdown, abort, or inactivity expiry.
    async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            first = %self.players[0].username,
            second = %self.players[1].username,
            "session started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(SessionCommand::Move { connection, mv, reply }) => {
                            let result = self.handle_move(connection, mv);
                            let _ = reply.send(result);
                        }
                        Some(SessionCommand::Info { reply }) => {
                            let _ = reply.send(self.info());
                        }
                        Some(SessionCommand::Abort { disconnected }) => {
                            self.handle_abort(disconnected);
                            break;
                        }
                        Some(SessionCommand::Shutdown) | None => break,
                    }
                }
                _ = time::sleep_until(self.deadline), if self.phase.is_active() => {
                    self.handle_expiry();
                    break;
                }
            }
        }

        tracing::info!(session_id = %self.session_id, "session stopped");
    }

    fn handle_move(
        &mut self,
        connection: ConnectionId,
        mv: R::Move,
    ) -> Result<MoveOutcome, SessionError> {
        let seat = self.seat_of(connection).ok_or_else(|| {
            SessionError::WrongSession(connection, self.session_id.clone())
        })?;

        if !self.phase.is_active() {
            return Err(SessionError::AlreadyTerminal(self.session_id.clone()));
        }
        if self.turn != seat.turn() {
            return Err(SessionError::NotYourTurn);
        }

        // Pure adjudication: on Err nothing below runs and the session
        // state is exactly what it was.
        let applied = R::apply(&self.board, seat, &mv)?;

        self.board = applied.board;
        self.move_log.push(MoveRecord { seat, mv });
        self.deadline = Instant::now() + self.config.inactivity_timeout;

        match applied.verdict {
            Verdict::Continue => {
                self.turn = seat.other().turn();
                self.broadcast_board();
                Ok(MoveOutcome::Applied {
                    next_turn: self.turn,
                })
            }
            Verdict::Win => self.finish(SessionResult::Winner(seat)),
            Verdict::Draw => self.finish(SessionResult::Draw),
        }
    }

    /// Records the terminal result and tells both participants.
    fn finish(
        &mut self,
        result: SessionResult,
    ) -> Result<MoveOutcome, SessionError> {
        self.turn = Turn::GameOver;
        self.phase = SessionPhase::Finished;
        self.broadcast_board();

        let winner = match result {
            SessionResult::Winner(seat) => {
                Some(self.player(seat).username.clone())
            }
            SessionResult::Draw => None,
        };
        tracing::info!(
            session_id = %self.session_id,
            winner = winner.as_deref().unwrap_or("(draw)"),
            moves = self.move_log.len(),
            "game finished"
        );
        self.broadcast(Event::GameOver {
            session_id: self.session_id.clone(),
            winner,
        });

        Ok(MoveOutcome::Finished { result })
    }

    fn handle_abort(&mut self, disconnected: ConnectionId) {
        if !self.phase.is_active() {
            // The game already ended and was reported; the disconnect has
            // nothing left to tear down.
            return;
        }
        let Some(seat) = self.seat_of(disconnected) else {
            tracing::warn!(
                session_id = %self.session_id,
                connection = %disconnected,
                "abort for a connection that is not a participant"
            );
            return;
        };

        self.phase = SessionPhase::Aborted;
        let other = self.player(seat.other()).connection;
        tracing::info!(
            session_id = %self.session_id,
            connection = %disconnected,
            "participant disconnected, session aborted"
        );
        self.notifier.notify(
            other,
            Event::OpponentDisconnected {
                session_id: self.session_id.clone(),
            },
        );
    }

    fn handle_expiry(&mut self) {
        self.phase = SessionPhase::Aborted;
        tracing::info!(
            session_id = %self.session_id,
            "session inactive past the limit, aborting"
        );
        self.broadcast(Event::SessionTimeout {
            session_id: self.session_id.clone(),
        });
        // The registry still points at us; the supervisor prunes it.
        let _ = self.lifecycle.send(SessionEnded {
            session_id: self.session_id.clone(),
        });
    }

    fn seat_of(&self, connection: ConnectionId) -> Option<Seat> {
        if self.players[0].connection == connection {
            Some(Seat::First)
        } else if self.players[1].connection == connection {
            Some(Seat::Second)
        } else {
            None
        }
    }

    fn player(&self, seat: Seat) -> &Player {
        match seat {
            Seat::First => &self.players[0],
            Seat::Second => &self.players[1],
        }
    }

    fn broadcast_board(&self) {
        let board = match serde_json::to_value(&self.board) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "failed to snapshot board for broadcast"
                );
                serde_json::Value::Null
            }
        };
        self.broadcast(Event::BoardUpdated {
            session_id: self.session_id.clone(),
            board,
            next_turn: self.turn,
        });
    }

    fn broadcast(&self, event: Event) {
        self.notifier.broadcast(
            &[self.players[0].connection, self.players[1].connection],
            event,
        );
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            phase: self.phase,
            turn: self.turn,
            moves: self.move_log.len(),
        }
    }
}

/// Spawns a new session actor task and returns a handle to it.
pub(crate) fn spawn_session<R: RuleSet>(
    session_id: SessionId,
    players: [Player; 2],
    config: SessionConfig,
    notifier: Arc<dyn Notifier>,
    lifecycle: mpsc::UnboundedSender<SessionEnded>,
    channel_size: usize,
) -> SessionHandle<R> {
    let (tx, rx) = mpsc::channel(channel_size);
    let players = Arc::new(players);

    let actor = SessionActor::<R> {
        session_id: session_id.clone(),
        players: Arc::clone(&players),
        board: R::initial(),
        turn: Turn::First,
        phase: SessionPhase::Active,
        move_log: Vec::new(),
        deadline: Instant::now() + config.inactivity_timeout,
        config,
        notifier,
        lifecycle,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        players,
        sender: tx,
    }
}
