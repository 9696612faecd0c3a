//! The waiting queue and its pairing scan.

use duelgrid_protocol::{ConnectionId, Player};

use crate::{MatchPolicy, QueueError};

/// Arrival-ordered collection of players waiting to be matched.
///
/// Invariant: no `ConnectionId` appears twice. Entries leave only by being
/// matched or removed; a queued player is never silently lost.
///
/// Pairing is an O(n²) scan, earliest arrival outermost. That makes the
/// queue approximately FIFO *subject to compatibility*: a later, more
/// compatible player can be matched ahead of an earlier, incompatible one.
/// Quadratic cost is fine at the queue sizes a single process serves;
/// it is a scaling limit, not a correctness one.
pub struct WaitingQueue {
    entries: Vec<Player>,
    policy: Box<dyn MatchPolicy>,
}

impl WaitingQueue {
    /// Creates an empty queue with the given pairing policy.
    pub fn new(policy: impl MatchPolicy) -> Self {
        Self::with_policy(Box::new(policy))
    }

    /// Like [`new`](Self::new), for an already-boxed policy.
    pub fn with_policy(policy: Box<dyn MatchPolicy>) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    /// Appends a player in arrival order.
    ///
    /// # Errors
    /// Returns [`QueueError::DuplicateConnection`] if the connection
    /// already has an entry.
    pub fn enqueue(&mut self, player: Player) -> Result<(), QueueError> {
        if self.contains(player.connection) {
            return Err(QueueError::DuplicateConnection(player.connection));
        }
        tracing::info!(
            username = %player.username,
            connection = %player.connection,
            waiting = self.entries.len() + 1,
            "player added to the queue"
        );
        self.entries.push(player);
        Ok(())
    }

    /// Removes and returns the earliest compatible pair, earlier arrival
    /// first. Returns `None` when no two waiting players are compatible.
    pub fn try_match(&mut self) -> Option<(Player, Player)> {
        if self.entries.len() < 2 {
            return None;
        }
        for i in 0..self.entries.len() - 1 {
            for j in i + 1..self.entries.len() {
                if self
                    .policy
                    .compatible(&self.entries[i], &self.entries[j])
                {
                    // Remove j first so i's index stays valid.
                    let second = self.entries.remove(j);
                    let first = self.entries.remove(i);
                    tracing::info!(
                        first = %first.username,
                        second = %second.username,
                        "match found"
                    );
                    return Some((first, second));
                }
            }
        }
        None
    }

    /// Removes the entry for `connection` if present. Idempotent; used
    /// for leave, disconnect, and inactivity expiry, any of which may
    /// race a match that already claimed the entry.
    pub fn remove(&mut self, connection: ConnectionId) -> Option<Player> {
        let index = self
            .entries
            .iter()
            .position(|p| p.connection == connection)?;
        let player = self.entries.remove(index);
        tracing::info!(
            username = %player.username,
            %connection,
            "player removed from the queue"
        );
        Some(player)
    }

    /// Whether `connection` currently has an entry.
    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.entries.iter().any(|p| p.connection == connection)
    }

    /// Number of waiting players.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
