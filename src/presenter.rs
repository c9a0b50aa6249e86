//! Presentation boundary.
//!
//! The core never references a concrete chat SDK. Everything it needs from
//! the platform is this capability set: render a session to an interactive
//! surface, update it, disable it, and deliver private rejection notices.
//! Render failures are logged by callers and never affect authoritative
//! session state.

use crate::games::tictactoe::{Cell, Mark, SIZE};
use crate::session::{GameSession, Outcome, SessionId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque token for a rendered control surface, usable for later updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// Failure reported by the presentation adapter.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Presentation error: {message}")]
pub struct PresentError {
    /// Adapter-specific description.
    pub message: String,
}

impl PresentError {
    /// Creates a new presentation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A participant as shown on the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    /// Platform user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Mark held by this participant.
    pub mark: Mark,
}

/// Serializable snapshot of a session, the only state the presenter sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// Session this snapshot belongs to.
    pub session_id: SessionId,
    /// Board cells in row-major order.
    pub cells: [Cell; SIZE * SIZE],
    /// The participant playing X.
    pub player_x: SeatView,
    /// The participant playing O.
    pub player_o: SeatView,
    /// Mark to move (meaningless once `outcome` is set).
    pub to_move: Mark,
    /// Terminal outcome, if the session finished.
    pub outcome: Option<Outcome>,
    /// Per-move time budget, for the remaining-time label.
    pub turn_limit_secs: u64,
}

impl SessionView {
    /// Builds a snapshot of the given session.
    pub fn snapshot(session: &GameSession, turn_limit_secs: u64) -> Self {
        let seat = |mark: Mark| {
            let p = session.participant(mark);
            SeatView {
                id: p.id.clone(),
                name: p.name.clone(),
                mark,
            }
        };
        Self {
            session_id: session.id(),
            cells: *session.game().board().cells(),
            player_x: seat(Mark::X),
            player_o: seat(Mark::O),
            to_move: session.game().to_move(),
            outcome: session.outcome(),
            turn_limit_secs,
        }
    }

    /// Returns the seat view for the given mark.
    pub fn seat(&self, mark: Mark) -> &SeatView {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// One-line status for the surface header.
    pub fn status_line(&self) -> String {
        match self.outcome {
            None => {
                let seat = self.seat(self.to_move);
                format!(
                    "It's {}'s turn ({}). {} seconds per move.",
                    seat.name, seat.mark, self.turn_limit_secs
                )
            }
            Some(Outcome::Won(mark)) => {
                let seat = self.seat(mark);
                format!("Game over! {} wins as {}!", seat.name, seat.mark)
            }
            Some(Outcome::Tie) => "Game over! It's a tie!".to_string(),
            Some(Outcome::TimedOut(mark)) => {
                format!(
                    "Game over! {} took too long to make a move.",
                    self.seat(mark).name
                )
            }
            Some(Outcome::Abandoned(mark)) => {
                format!("Game abandoned by {}!", self.seat(mark).name)
            }
        }
    }
}

/// Capability set the core consumes from the chat platform.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Produces an interactive surface for a new session.
    async fn render(&self, view: &SessionView) -> Result<RenderHandle, PresentError>;

    /// Updates an existing surface with a fresh snapshot.
    async fn update(&self, handle: RenderHandle, view: &SessionView) -> Result<(), PresentError>;

    /// Irreversibly deactivates all controls on a surface.
    async fn disable(&self, handle: RenderHandle) -> Result<(), PresentError>;

    /// Delivers a private, non-persistent notice to the acting user only.
    async fn notify_rejected(
        &self,
        actor: &str,
        reason: &crate::session::Rejection,
    ) -> Result<(), PresentError>;

    /// Posts a shared, all-participants-visible message.
    async fn announce(&self, text: &str) -> Result<(), PresentError>;
}
