//! Game session state: two participants, randomized seats, and the
//! move/timeout/abandon state machine.
//!
//! A session is `AwaitingMove` while [`GameSession::outcome`] is `None` and
//! `Finished` once it is `Some`. All mutation happens through the owning
//! arbiter task (see [`crate::coordinator`]); this module itself is purely
//! synchronous.

use crate::games::tictactoe::{Game, Mark, MoveError, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = u64;

/// Opaque chat-platform user identifier.
pub type UserId = String;

/// A user taking part in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Participant {
    /// Platform user id.
    pub id: UserId,
    /// Display name, used in announcements.
    pub name: String,
    /// Whether this account is automated. Bots cannot be challenged.
    pub is_bot: bool,
}

/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A mark completed three-in-a-row.
    Won(Mark),
    /// Board filled with no line.
    Tie,
    /// The player holding this mark let the turn clock run out.
    TimedOut(Mark),
    /// The player holding this mark walked away.
    Abandoned(Mark),
}

/// Reasons a user action is rejected without changing state.
///
/// These are surfaced to the acting user only; they are never errors in the
/// session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum Rejection {
    /// Actor is not one of the two participants.
    #[display("Only players in this game can do that")]
    NotAParticipant,
    /// Actor is a participant but does not hold the current mark.
    #[display("It's not your turn")]
    NotYourTurn,
    /// Target cell is outside the 3x3 grid.
    #[display("That cell is outside the board")]
    OutOfRange,
    /// Target cell already holds a mark.
    #[display("That space is already taken")]
    CellOccupied,
    /// The session already finished; late actions are no-ops.
    #[display("The game is already over")]
    GameOver,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveApplied {
    /// Game continues; the opposing mark is now on the clock.
    Continued,
    /// The move ended the game.
    Finished(Outcome),
}

/// One match between two participants.
///
/// Seat (mark) assignment is randomized once at creation with a uniform coin
/// flip, independent of who issued the challenge. X always moves first.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    player_x: Participant,
    player_o: Participant,
    game: Game,
    outcome: Option<Outcome>,
    /// Monotonic arm-cycle counter for the turn clock. A clock fire carrying
    /// an older generation is stale and must be ignored.
    generation: u64,
}

impl GameSession {
    /// Creates a new session, flipping a coin for seat assignment.
    #[instrument(skip(challenger, opponent), fields(session_id = id))]
    pub fn new(id: SessionId, challenger: Participant, opponent: Participant) -> Self {
        let (player_x, player_o) = if fastrand::bool() {
            (challenger, opponent)
        } else {
            (opponent, challenger)
        };
        info!(
            player_x = %player_x.name,
            player_o = %player_o.name,
            "Created session with randomized seats"
        );
        Self {
            id,
            player_x,
            player_o,
            game: Game::new(),
            outcome: None,
            generation: 0,
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the participant holding the given mark.
    pub fn participant(&self, mark: Mark) -> &Participant {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// Returns the mark held by the given user, if they play in this session.
    pub fn mark_of(&self, user: &str) -> Option<Mark> {
        if self.player_x.id == user {
            Some(Mark::X)
        } else if self.player_o.id == user {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Returns the participant whose turn it is.
    pub fn current_player(&self) -> &Participant {
        self.participant(self.game.to_move())
    }

    /// Returns the underlying game engine.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Returns the terminal outcome, or `None` while awaiting a move.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Checks whether the session reached a terminal outcome.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Bumps and returns the clock generation for a fresh arm cycle.
    ///
    /// Any previously armed clock is invalidated by this call: its eventual
    /// fire will carry a stale generation and be dropped.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Attempts a move by `actor` at (row, col).
    ///
    /// # Errors
    ///
    /// Rejects with a distinct [`Rejection`] per violated rule; the board and
    /// turn are untouched on rejection.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn apply_move(
        &mut self,
        actor: &str,
        row: usize,
        col: usize,
    ) -> Result<MoveApplied, Rejection> {
        if self.is_finished() {
            debug!(actor, "Move after finish dropped");
            return Err(Rejection::GameOver);
        }

        let mark = self.mark_of(actor).ok_or_else(|| {
            warn!(actor, "Move attempt by non-participant");
            Rejection::NotAParticipant
        })?;

        if mark != self.game.to_move() {
            debug!(actor, %mark, to_move = %self.game.to_move(), "Out-of-turn move rejected");
            return Err(Rejection::NotYourTurn);
        }

        let verdict = self.game.place(row, col).map_err(|e| match e {
            MoveError::OutOfRange => Rejection::OutOfRange,
            MoveError::CellOccupied => Rejection::CellOccupied,
            MoveError::GameOver => Rejection::GameOver,
        })?;

        match verdict {
            Verdict::InProgress => {
                debug!(actor, row, col, "Move accepted, turn passes");
                Ok(MoveApplied::Continued)
            }
            Verdict::Won(mark) => {
                let outcome = Outcome::Won(mark);
                self.outcome = Some(outcome);
                info!(winner = %self.participant(mark).name, "Session won");
                Ok(MoveApplied::Finished(outcome))
            }
            Verdict::Tie => {
                self.outcome = Some(Outcome::Tie);
                info!("Session tied");
                Ok(MoveApplied::Finished(Outcome::Tie))
            }
        }
    }

    /// Handles a turn-clock fire for the given arm generation.
    ///
    /// Returns the timeout outcome if the fire is current and the session is
    /// still awaiting a move; returns `None` for stale or late fires, which
    /// are normal races and not errors.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn clock_fired(&mut self, generation: u64) -> Option<Outcome> {
        if self.is_finished() {
            debug!(generation, "Clock fire after finish dropped");
            return None;
        }
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Stale clock fire dropped"
            );
            return None;
        }

        // Penalize whoever held the turn when the clock ran out. The
        // opponent is not promoted to winner.
        let penalized = self.game.to_move();
        let outcome = Outcome::TimedOut(penalized);
        self.outcome = Some(outcome);
        info!(penalized = %self.participant(penalized).name, "Session timed out");
        Some(outcome)
    }

    /// Marks the session abandoned by `actor`.
    ///
    /// Either participant may abandon at any point before the session
    /// finishes, regardless of whose turn it is.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn abandon(&mut self, actor: &str) -> Result<Outcome, Rejection> {
        if self.is_finished() {
            return Err(Rejection::GameOver);
        }
        let mark = self.mark_of(actor).ok_or(Rejection::NotAParticipant)?;
        let outcome = Outcome::Abandoned(mark);
        self.outcome = Some(outcome);
        info!(by = %self.participant(mark).name, "Session abandoned");
        Ok(outcome)
    }

    /// Finishes the session on overall-inactivity expiry.
    ///
    /// Same penalty rule as a per-turn timeout. No-op if already finished.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn expire(&mut self) -> Option<Outcome> {
        if self.is_finished() {
            return None;
        }
        let penalized = self.game.to_move();
        let outcome = Outcome::TimedOut(penalized);
        self.outcome = Some(outcome);
        warn!(penalized = %self.participant(penalized).name, "Session expired with no activity");
        Some(outcome)
    }
}
