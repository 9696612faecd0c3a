//! Integration tests for the engine facade: matchmaking, adjudication,
//! lifecycle timeouts, disconnects, and the stats collaborator contract.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use duelgrid::prelude::*;

// =========================================================================
// Test doubles
// =========================================================================

/// Records every delivered event. Clones share the same log.
#[derive(Clone, Default)]
struct RecordingNotifier {
    events: Arc<Mutex<Vec<(ConnectionId, Event)>>>,
}

impl RecordingNotifier {
    fn events_for(&self, connection: ConnectionId) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == connection)
            .map(|(_, e)| e.clone())
            .collect()
    }

    fn count_match_found(&self, connection: ConnectionId) -> usize {
        self.events_for(connection)
            .iter()
            .filter(|e| matches!(e, Event::MatchFound { .. }))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, connection: ConnectionId, event: Event) {
        self.events.lock().unwrap().push((connection, event));
    }
}

type RecordedResult = (Option<String>, String, String, MatchResult);

/// Records every stats write. Clones share the same log.
#[derive(Clone, Default)]
struct RecordingStats {
    calls: Arc<Mutex<Vec<RecordedResult>>>,
}

impl RecordingStats {
    fn calls(&self) -> Vec<RecordedResult> {
        self.calls.lock().unwrap().clone()
    }
}

impl StatsStore for RecordingStats {
    async fn record_result(
        &self,
        winner: Option<&str>,
        player1: &str,
        player2: &str,
        outcome: MatchResult,
    ) -> Result<(), StatsError> {
        self.calls.lock().unwrap().push((
            winner.map(str::to_owned),
            player1.to_owned(),
            player2.to_owned(),
            outcome,
        ));
        Ok(())
    }
}

/// A stats store that always fails, for the log-and-swallow contract.
struct FailingStats;

impl StatsStore for FailingStats {
    async fn record_result(
        &self,
        _winner: Option<&str>,
        _player1: &str,
        _player2: &str,
        _outcome: MatchResult,
    ) -> Result<(), StatsError> {
        Err(StatsError("database unreachable".into()))
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn trace_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn player(id: u64, name: &str, skill: i32, region: &str) -> Player {
    Player {
        username: name.into(),
        skill_level: skill,
        region: region.into(),
        connection: ConnectionId(id),
    }
}

struct Fixture {
    engine: Engine<TicTacToe, RecordingStats>,
    notifier: RecordingNotifier,
    stats: RecordingStats,
}

fn fixture(builder: EngineBuilder) -> Fixture {
    trace_init();
    let notifier = RecordingNotifier::default();
    let stats = RecordingStats::default();
    let engine =
        builder.build::<TicTacToe, _>(notifier.clone(), stats.clone());
    Fixture {
        engine,
        notifier,
        stats,
    }
}

/// Joins alice (skill 5) and bob (skill 6), both in `us`, and returns the
/// session id of the resulting match.
async fn matched_pair(fx: &Fixture) -> SessionId {
    let queued = fx
        .engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    assert_eq!(queued, JoinOutcome::Queued);

    match fx
        .engine
        .join_queue(player(2, "bob", 6, "us"))
        .await
        .unwrap()
    {
        JoinOutcome::Matched { session_id } => session_id,
        other => panic!("expected a match, got {other:?}"),
    }
}

async fn mv(
    fx: &Fixture,
    session_id: &SessionId,
    conn: u64,
    row: usize,
    col: usize,
) -> Result<MoveOutcome, EngineError> {
    fx.engine
        .submit_move(session_id, ConnectionId(conn), Place { row, col })
        .await
}

// =========================================================================
// Matchmaking
// =========================================================================

#[tokio::test]
async fn test_join_rejects_blank_username_and_region() {
    let fx = fixture(EngineBuilder::new());

    let result = fx.engine.join_queue(player(1, "  ", 5, "us")).await;
    assert_eq!(result, Err(EngineError::InvalidPlayer("username")));

    let result = fx.engine.join_queue(player(1, "alice", 5, "")).await;
    assert_eq!(result, Err(EngineError::InvalidPlayer("region")));

    assert_eq!(fx.engine.queue_len().await, 0);
}

#[tokio::test]
async fn test_join_rejects_duplicate_connection() {
    let fx = fixture(EngineBuilder::new());

    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    let result = fx.engine.join_queue(player(1, "alice2", 5, "us")).await;

    assert!(matches!(result, Err(EngineError::Queue(_))));
    assert_eq!(fx.engine.queue_len().await, 1);
}

#[tokio::test]
async fn test_players_in_different_regions_are_never_matched() {
    let fx = fixture(EngineBuilder::new());

    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    let outcome = fx
        .engine
        .join_queue(player(2, "bob", 5, "eu"))
        .await
        .unwrap();

    assert_eq!(outcome, JoinOutcome::Queued);
    assert_eq!(fx.engine.queue_len().await, 2);
    assert_eq!(fx.engine.session_count().await, 0);
}

#[tokio::test]
async fn test_closest_skills_pair_before_the_outlier() {
    let fx = fixture(EngineBuilder::new());

    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    fx.engine
        .join_queue(player(2, "bob", 9, "us"))
        .await
        .unwrap();
    let outcome = fx
        .engine
        .join_queue(player(3, "carol", 6, "us"))
        .await
        .unwrap();

    // alice (5) and carol (6) pair; bob (9) keeps waiting.
    assert!(matches!(outcome, JoinOutcome::Matched { .. }));
    assert!(fx.engine.session_for(ConnectionId(1)).await.is_some());
    assert!(fx.engine.session_for(ConnectionId(3)).await.is_some());
    assert!(fx.engine.session_for(ConnectionId(2)).await.is_none());
    assert_eq!(fx.engine.queue_len().await, 1);
}

#[tokio::test]
async fn test_match_found_carries_seat_and_opponent() {
    let fx = fixture(EngineBuilder::new());
    let session_id = matched_pair(&fx).await;

    let alice_events = fx.notifier.events_for(ConnectionId(1));
    assert!(alice_events.iter().any(|e| matches!(
        e,
        Event::MatchFound { session_id: sid, seat: Seat::First, opponent }
            if sid == &session_id && opponent.username == "bob"
    )));

    let bob_events = fx.notifier.events_for(ConnectionId(2));
    assert!(bob_events.iter().any(|e| matches!(
        e,
        Event::MatchFound { seat: Seat::Second, opponent, .. }
            if opponent.username == "alice"
    )));
}

#[tokio::test]
async fn test_leave_queue_is_idempotent() {
    let fx = fixture(EngineBuilder::new());

    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();

    assert!(fx.engine.leave_queue(ConnectionId(1)).await);
    assert!(!fx.engine.leave_queue(ConnectionId(1)).await);
    assert!(!fx.engine.leave_queue(ConnectionId(42)).await);
    assert_eq!(fx.engine.queue_len().await, 0);
}

#[tokio::test]
async fn test_concurrent_joins_never_lose_or_double_match_a_player() {
    let fx = fixture(EngineBuilder::new());

    // Eight compatible players join from eight concurrent tasks.
    let mut handles = Vec::new();
    for id in 1..=8 {
        let engine = fx.engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .join_queue(player(id, &format!("player-{id}"), 5, "us"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Every player ends up in exactly one place: four sessions, empty
    // queue, and exactly one match-found per connection.
    assert_eq!(fx.engine.session_count().await, 4);
    assert_eq!(fx.engine.queue_len().await, 0);
    for id in 1..=8 {
        assert_eq!(
            fx.notifier.count_match_found(ConnectionId(id)),
            1,
            "connection {id} must be matched exactly once"
        );
        assert!(fx.engine.session_for(ConnectionId(id)).await.is_some());
    }
}

// =========================================================================
// Move adjudication through the facade
// =========================================================================

#[tokio::test]
async fn test_end_to_end_win_records_stats_exactly_once() {
    let fx = fixture(EngineBuilder::new());
    let session_id = matched_pair(&fx).await;

    mv(&fx, &session_id, 1, 0, 0).await.unwrap();
    mv(&fx, &session_id, 2, 1, 1).await.unwrap();
    mv(&fx, &session_id, 1, 0, 1).await.unwrap();
    mv(&fx, &session_id, 2, 2, 2).await.unwrap();

    let outcome = mv(&fx, &session_id, 1, 0, 2).await.unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Finished {
            result: SessionResult::Winner(Seat::First)
        }
    );

    // The session is gone the moment the terminal move returns.
    assert_eq!(fx.engine.session_count().await, 0);
    assert!(fx.engine.session_for(ConnectionId(1)).await.is_none());

    // Both participants heard the result.
    for id in [1, 2] {
        assert!(fx.notifier.events_for(ConnectionId(id)).iter().any(
            |e| matches!(
                e,
                Event::GameOver { winner: Some(w), .. } if w == "alice"
            )
        ));
    }

    // The stats collaborator got exactly one record.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        fx.stats.calls(),
        vec![(
            Some("alice".to_owned()),
            "alice".to_owned(),
            "bob".to_owned(),
            MatchResult::Win
        )]
    );
}

#[tokio::test]
async fn test_draw_is_terminal_and_recorded_with_no_winner() {
    let fx = fixture(EngineBuilder::new());
    let session_id = matched_pair(&fx).await;

    let script = [
        (1, 0, 0),
        (2, 0, 1),
        (1, 0, 2),
        (2, 1, 1),
        (1, 1, 0),
        (2, 2, 0),
        (1, 1, 2),
        (2, 2, 2),
    ];
    for (conn, row, col) in script {
        mv(&fx, &session_id, conn, row, col).await.unwrap();
    }
    let outcome = mv(&fx, &session_id, 1, 2, 1).await.unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Finished {
            result: SessionResult::Draw
        }
    );
    assert_eq!(fx.engine.session_count().await, 0);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        fx.stats.calls(),
        vec![(None, "alice".to_owned(), "bob".to_owned(), MatchResult::Draw)]
    );
}

#[tokio::test]
async fn test_rejected_moves_surface_typed_errors_and_change_nothing() {
    let fx = fixture(EngineBuilder::new());
    let session_id = matched_pair(&fx).await;

    mv(&fx, &session_id, 1, 0, 0).await.unwrap();

    // Occupied cell and out-of-turn both rejected...
    assert!(matches!(
        mv(&fx, &session_id, 2, 0, 0).await,
        Err(EngineError::Session(SessionError::IllegalMove(_)))
    ));
    assert!(matches!(
        mv(&fx, &session_id, 1, 1, 1).await,
        Err(EngineError::Session(SessionError::NotYourTurn))
    ));

    // ...and the game continues as if they never happened.
    assert!(matches!(
        mv(&fx, &session_id, 2, 1, 1).await,
        Ok(MoveOutcome::Applied { next_turn: Turn::First })
    ));
}

#[tokio::test]
async fn test_moves_from_non_participants_and_unknown_sessions_rejected() {
    let fx = fixture(EngineBuilder::new());
    let session_id = matched_pair(&fx).await;

    // A third, unrelated matched pair.
    fx.engine
        .join_queue(player(3, "carol", 5, "us"))
        .await
        .unwrap();
    fx.engine
        .join_queue(player(4, "dave", 5, "us"))
        .await
        .unwrap();

    // carol pokes at alice and bob's session.
    let result = mv(&fx, &session_id, 3, 0, 0).await;
    assert!(matches!(
        result,
        Err(EngineError::Session(SessionError::WrongSession(c, _)))
            if c == ConnectionId(3)
    ));

    // Unknown session id.
    let result = fx
        .engine
        .submit_move(
            &SessionId::new("no-such-session"),
            ConnectionId(1),
            Place { row: 0, col: 0 },
        )
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Session(SessionError::NotFound(_)))
    ));

    // Neither session was disturbed.
    assert_eq!(fx.engine.session_count().await, 2);
}

#[tokio::test]
async fn test_stats_failure_is_swallowed_and_teardown_proceeds() {
    trace_init();
    let notifier = RecordingNotifier::default();
    let engine = EngineBuilder::new()
        .build::<TicTacToe, _>(notifier.clone(), FailingStats);

    engine.join_queue(player(1, "alice", 5, "us")).await.unwrap();
    let session_id = match engine
        .join_queue(player(2, "bob", 6, "us"))
        .await
        .unwrap()
    {
        JoinOutcome::Matched { session_id } => session_id,
        other => panic!("expected a match, got {other:?}"),
    };

    let moves = [(1, 0, 0), (2, 1, 1), (1, 0, 1), (2, 2, 2), (1, 0, 2)];
    for (conn, row, col) in moves {
        engine
            .submit_move(&session_id, ConnectionId(conn), Place { row, col })
            .await
            .unwrap();
    }

    // The store failed, but the session is gone and the engine works on.
    assert_eq!(engine.session_count().await, 0);
    engine.join_queue(player(3, "carol", 5, "us")).await.unwrap();
}

// =========================================================================
// Lifecycle: timeouts and disconnects
// =========================================================================

#[tokio::test]
async fn test_queue_timeout_removes_and_notifies_the_waiter() {
    let fx = fixture(
        EngineBuilder::new().queue_timeout(Duration::from_millis(50)),
    );

    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(fx.engine.queue_len().await, 0);
    assert!(fx
        .notifier
        .events_for(ConnectionId(1))
        .iter()
        .any(|e| matches!(e, Event::QueueTimeout)));

    // The connection may rejoin afterwards.
    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_match_just_before_queue_timer_fires_is_undisturbed() {
    let fx = fixture(
        EngineBuilder::new().queue_timeout(Duration::from_millis(300)),
    );

    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let outcome = fx
        .engine
        .join_queue(player(2, "bob", 6, "us"))
        .await
        .unwrap();
    assert!(matches!(outcome, JoinOutcome::Matched { .. }));

    // Let alice's stale timer fire: the entry is long gone, so it must
    // neither notify her nor touch the session.
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(!fx
        .notifier
        .events_for(ConnectionId(1))
        .iter()
        .any(|e| matches!(e, Event::QueueTimeout)));
    assert_eq!(fx.engine.session_count().await, 1);
}

#[tokio::test]
async fn test_session_inactivity_notifies_both_and_destroys_the_session() {
    let fx = fixture(
        EngineBuilder::new().session_timeout(Duration::from_millis(50)),
    );
    let session_id = matched_pair(&fx).await;

    tokio::time::sleep(Duration::from_millis(200)).await;

    for id in [1, 2] {
        assert!(
            fx.notifier
                .events_for(ConnectionId(id))
                .iter()
                .any(|e| matches!(e, Event::SessionTimeout { .. })),
            "connection {id} should be told about the timeout"
        );
    }
    assert_eq!(fx.engine.session_count().await, 0);

    // Moves against the expired session resolve as NotFound.
    let result = mv(&fx, &session_id, 1, 0, 0).await;
    assert!(matches!(
        result,
        Err(EngineError::Session(SessionError::NotFound(_)))
    ));

    // An aborted session records no stats.
    assert!(fx.stats.calls().is_empty());
}

#[tokio::test]
async fn test_disconnect_tears_down_the_session_and_notifies_the_opponent() {
    let fx = fixture(EngineBuilder::new());
    let session_id = matched_pair(&fx).await;

    fx.engine.disconnect(ConnectionId(1)).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(fx.engine.session_count().await, 0);
    assert!(fx
        .notifier
        .events_for(ConnectionId(2))
        .iter()
        .any(|e| matches!(e, Event::OpponentDisconnected { .. })));
    assert!(!fx
        .notifier
        .events_for(ConnectionId(1))
        .iter()
        .any(|e| matches!(e, Event::OpponentDisconnected { .. })));

    // The survivor's move resolves as NotFound; nothing is recorded.
    let result = mv(&fx, &session_id, 2, 0, 0).await;
    assert!(matches!(
        result,
        Err(EngineError::Session(SessionError::NotFound(_)))
    ));
    assert!(fx.stats.calls().is_empty());
}

#[tokio::test]
async fn test_disconnect_is_idempotent_everywhere() {
    let fx = fixture(EngineBuilder::new());

    // Never-seen connection: no-op.
    fx.engine.disconnect(ConnectionId(99)).await;

    // Queued player: removed once, second call a no-op.
    fx.engine
        .join_queue(player(1, "alice", 5, "us"))
        .await
        .unwrap();
    fx.engine.disconnect(ConnectionId(1)).await;
    fx.engine.disconnect(ConnectionId(1)).await;
    assert_eq!(fx.engine.queue_len().await, 0);

    // In-session player: torn down once, repeated calls are no-ops,
    // including after the session already ended.
    let session_id = matched_pair(&fx).await;
    fx.engine.disconnect(ConnectionId(1)).await;
    fx.engine.disconnect(ConnectionId(1)).await;
    fx.engine.disconnect(ConnectionId(2)).await;
    assert_eq!(fx.engine.session_count().await, 0);
    let _ = session_id;
}

#[tokio::test]
async fn test_independent_sessions_do_not_interfere() {
    let fx = fixture(EngineBuilder::new());
    let ab = matched_pair(&fx).await;

    fx.engine
        .join_queue(player(3, "carol", 5, "us"))
        .await
        .unwrap();
    let cd = match fx
        .engine
        .join_queue(player(4, "dave", 5, "us"))
        .await
        .unwrap()
    {
        JoinOutcome::Matched { session_id } => session_id,
        other => panic!("expected a match, got {other:?}"),
    };

    // Tearing down one session leaves the other fully playable.
    fx.engine.disconnect(ConnectionId(1)).await;
    assert_eq!(fx.engine.session_count().await, 1);

    mv(&fx, &cd, 3, 0, 0).await.unwrap();
    mv(&fx, &cd, 4, 1, 1).await.unwrap();
    let _ = ab;
}
