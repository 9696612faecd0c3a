//! Lifecycle supervision: queue-inactivity timers and session-expiry
//! pruning.
//!
//! Timers never own state. A queue timer sleeps and then tries the
//! removal under the queue lock: if a match already claimed the entry,
//! the removal is a no-op and no notification goes out, so "canceled" and
//! "fired" cannot both happen for one entry. Session expiry is decided on
//! the session's own actor task; the supervisor merely prunes the registry
//! afterwards.

use std::sync::{Arc, Weak};

use duelgrid_protocol::{ConnectionId, Event};
use duelgrid_rules::RuleSet;
use duelgrid_session::SessionEnded;
use tokio::sync::mpsc;

use crate::StatsStore;
use crate::engine::EngineInner;

/// Arms the queue-inactivity timer for a freshly enqueued player.
pub(crate) fn arm_queue_timer<R: RuleSet, S: StatsStore>(
    inner: &Arc<EngineInner<R, S>>,
    connection: ConnectionId,
) {
    let timeout = inner.config.queue_timeout;
    let weak = Arc::downgrade(inner);
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        // The queue lock is the arbiter: only a still-present entry is
        // removed and notified.
        if inner.queue.lock().await.remove(connection).is_some() {
            tracing::info!(%connection, "queue entry expired");
            inner.notifier.notify(connection, Event::QueueTimeout);
        }
    });
}

/// Spawns the background task that prunes sessions which tore themselves
/// down on inactivity.
///
/// Holds only a `Weak` reference to the engine state: once the last
/// engine handle drops, the channel closes and the task ends.
pub(crate) fn spawn_supervisor<R: RuleSet, S: StatsStore>(
    inner: Weak<EngineInner<R, S>>,
    mut lifecycle: mpsc::UnboundedReceiver<SessionEnded>,
) {
    tokio::spawn(async move {
        while let Some(ended) = lifecycle.recv().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            if inner
                .registry
                .lock()
                .await
                .remove(&ended.session_id)
                .is_some()
            {
                tracing::debug!(
                    session_id = %ended.session_id,
                    "expired session pruned from registry"
                );
            }
        }
        tracing::debug!("lifecycle supervisor stopped");
    });
}
