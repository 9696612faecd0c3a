//! A scripted two-player match against in-process collaborators.
//!
//! This is what a boundary layer looks like from the engine's point of
//! view: events arrive through a `Notifier`, results land in a
//! `StatsStore`, and everything else is four engine commands.
//!
//! Run with `RUST_LOG=info cargo run -p local-duel` to see the engine's
//! tracing output interleaved with the event stream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use duelgrid::prelude::*;
use tokio::sync::mpsc;

/// Forwards every event into an in-process channel, the way a real
/// transport would forward onto its per-connection send queues.
struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(ConnectionId, Event)>,
}

impl Notifier for ChannelNotifier {
    fn notify(&self, connection: ConnectionId, event: Event) {
        let _ = self.tx.send((connection, event));
    }
}

/// Win/loss/draw counters per username, plus the match history: the
/// in-memory stand-in for the persistent stats collaborator.
#[derive(Clone, Default)]
struct InMemoryStats {
    counters: Arc<Mutex<HashMap<String, (u32, u32, u32)>>>,
    history: Arc<Mutex<Vec<String>>>,
}

impl StatsStore for InMemoryStats {
    async fn record_result(
        &self,
        winner: Option<&str>,
        player1: &str,
        player2: &str,
        outcome: MatchResult,
    ) -> Result<(), StatsError> {
        let mut counters = self.counters.lock().unwrap();
        let mut bump = |name: &str, slot: usize| {
            let entry = counters.entry(name.to_owned()).or_default();
            match slot {
                0 => entry.0 += 1,
                1 => entry.1 += 1,
                _ => entry.2 += 1,
            }
        };
        match outcome {
            MatchResult::Win => {
                bump(player1, 0);
                bump(player2, 1);
            }
            MatchResult::Loss => {
                bump(player2, 0);
                bump(player1, 1);
            }
            MatchResult::Draw => {
                bump(player1, 2);
                bump(player2, 2);
            }
        }
        drop(counters);

        self.history.lock().unwrap().push(format!(
            "{player1} vs {player2}: {outcome} (winner: {})",
            winner.unwrap_or("none")
        ));
        Ok(())
    }
}

fn player(id: u64, name: &str, skill: i32) -> Player {
    Player {
        username: name.into(),
        skill_level: skill,
        region: "us".into(),
        connection: ConnectionId(id),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let stats = InMemoryStats::default();
    let engine = EngineBuilder::new()
        .skill_tolerance(2)
        .build::<TicTacToe, _>(ChannelNotifier { tx }, stats.clone());

    // Two compatible players join; the second join pairs them.
    engine.join_queue(player(1, "alice", 5)).await?;
    let JoinOutcome::Matched { session_id } =
        engine.join_queue(player(2, "bob", 6)).await?
    else {
        unreachable!("bob is compatible with alice");
    };
    println!("matched into session {session_id}");

    // Alice takes the top row while bob wanders the diagonal.
    let script = [(1, 0, 0), (2, 1, 1), (1, 0, 1), (2, 2, 2), (1, 0, 2)];
    for (conn, row, col) in script {
        let outcome = engine
            .submit_move(&session_id, ConnectionId(conn), Place { row, col })
            .await?;
        if let MoveOutcome::Finished { result } = outcome {
            println!("game finished: {result:?}");
        }
    }

    // Drain and print the event stream the "transport" saw.
    while let Ok((connection, event)) = rx.try_recv() {
        println!("-> {connection}: {}", serde_json::to_string(&event)?);
    }

    // The stats write is fire-and-forget; give it a beat to land.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    for line in stats.history.lock().unwrap().iter() {
        println!("history: {line}");
    }
    for (name, (wins, losses, draws)) in stats.counters.lock().unwrap().iter() {
        println!("stats: {name}: {wins}W {losses}L {draws}D");
    }

    Ok(())
}
