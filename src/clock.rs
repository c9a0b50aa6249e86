//! Generation-tagged turn clock.
//!
//! The clock never touches session state. Each arm cycle spawns a sleeper
//! that posts a [`SessionEvent::ClockFired`] carrying its generation into the
//! session's mailbox; the arbiter compares generations under the same
//! serialization discipline as moves, so a stale fire racing a fresh arm can
//! never be applied.

use crate::coordinator::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// Per-session turn clock.
///
/// At most one generation is live at a time: arming hands out a new
/// generation from the session, which implicitly supersedes the previous
/// sleeper. The old task is also aborted best-effort, but correctness rests
/// on the generation check, not on the abort.
#[derive(Debug)]
pub struct TurnClock {
    events: mpsc::Sender<SessionEvent>,
    limit: Duration,
    sleeper: Option<JoinHandle<()>>,
}

impl TurnClock {
    /// Creates a clock that posts fires into the given mailbox.
    pub fn new(events: mpsc::Sender<SessionEvent>, limit: Duration) -> Self {
        Self {
            events,
            limit,
            sleeper: None,
        }
    }

    /// Arms the clock for one turn under the given generation.
    #[instrument(skip(self))]
    pub fn arm(&mut self, generation: u64) {
        self.cancel();

        let events = self.events.clone();
        let limit = self.limit;
        debug!(generation, ?limit, "Arming turn clock");
        self.sleeper = Some(tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            // The arbiter may already be gone; a failed send is fine.
            let _ = events.send(SessionEvent::ClockFired { generation }).await;
        }));
    }

    /// Cancels the pending sleeper, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.sleeper.take() {
            handle.abort();
        }
    }
}

impl Drop for TurnClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
