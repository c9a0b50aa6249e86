//! Game engine wrapping the board with turn order and terminal status.

use super::types::{Board, Mark, PlaceError, Verdict};
use tracing::instrument;

/// Errors from attempting a move through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The game already reached a terminal verdict.
    #[display("The game is already over")]
    GameOver,
    /// Target cell is outside the 3x3 grid.
    #[display("Cell is outside the board")]
    OutOfRange,
    /// Target cell already holds a mark.
    #[display("That space is already taken")]
    CellOccupied,
}

impl From<PlaceError> for MoveError {
    fn from(err: PlaceError) -> Self {
        match err {
            PlaceError::OutOfRange => MoveError::OutOfRange,
            PlaceError::CellOccupied => MoveError::CellOccupied,
        }
    }
}

/// Tic-tac-toe engine: board plus whose mark moves next.
///
/// The engine knows nothing about player identities; mapping users to marks
/// is the session's job. A new game always starts with X to move.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    to_move: Mark,
    verdict: Verdict,
}

impl Game {
    /// Creates a new game with an empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Mark::X,
            verdict: Verdict::InProgress,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark that moves next.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Returns the current verdict.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Checks whether the game reached a terminal verdict.
    pub fn is_over(&self) -> bool {
        self.verdict != Verdict::InProgress
    }

    /// Places the current mark at (row, col) and re-evaluates the board.
    ///
    /// On a non-terminal move the turn passes to the opposing mark. The
    /// returned verdict reflects the board after this move.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] after a terminal verdict, otherwise
    /// the mapped board error. State is unchanged on error.
    #[instrument(skip(self), fields(mark = %self.to_move))]
    pub fn place(&mut self, row: usize, col: usize) -> Result<Verdict, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }

        self.board.place(row, col, self.to_move)?;
        self.verdict = self.board.evaluate();

        if self.verdict == Verdict::InProgress {
            self.to_move = self.to_move.opponent();
        }

        Ok(self.verdict)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
