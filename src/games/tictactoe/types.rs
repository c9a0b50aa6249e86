//! Core domain types for the tic-tac-toe board.

use serde::{Deserialize, Serialize};

/// Board dimension (3x3).
pub const SIZE: usize = 3;

/// A player's mark on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Mark {
    /// X always moves first.
    X,
    /// O moves second.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No mark placed yet.
    Empty,
    /// Cell claimed by a player.
    Taken(Mark),
}

/// Terminal evaluation of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No line and at least one empty cell remains.
    InProgress,
    /// Three-in-a-row for the given mark.
    Won(Mark),
    /// Board full with no line.
    Tie,
}

/// Errors from placing a mark directly on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlaceError {
    /// Row or column outside the 3x3 grid.
    #[display("Cell is outside the board")]
    OutOfRange,
    /// Target cell already holds a mark.
    #[display("That space is already taken")]
    CellOccupied,
}

/// 3x3 tic-tac-toe board, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; SIZE * SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; SIZE * SIZE],
        }
    }

    /// Returns the cell at (row, col), or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= SIZE || col >= SIZE {
            return None;
        }
        Some(self.cells[row * SIZE + col])
    }

    /// Checks whether the cell at (row, col) is empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Cell::Empty))
    }

    /// Places a mark at (row, col).
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::OutOfRange`] outside the grid and
    /// [`PlaceError::CellOccupied`] if the cell is already taken. The board
    /// is untouched on error.
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), PlaceError> {
        match self.get(row, col) {
            None => Err(PlaceError::OutOfRange),
            Some(Cell::Taken(_)) => Err(PlaceError::CellOccupied),
            Some(Cell::Empty) => {
                self.cells[row * SIZE + col] = Cell::Taken(mark);
                Ok(())
            }
        }
    }

    /// Evaluates the board for a terminal result.
    ///
    /// Scans rows, then columns, then diagonals in a fixed order; the first
    /// three-in-a-row found wins (mutually exclusive under legal play). Pure
    /// and safe to call any number of times.
    pub fn evaluate(&self) -> Verdict {
        // Indices in row-major order: rows, columns, diagonals.
        const LINES: [[usize; 3]; 8] = [
            [0, 1, 2],
            [3, 4, 5],
            [6, 7, 8],
            [0, 3, 6],
            [1, 4, 7],
            [2, 5, 8],
            [0, 4, 8],
            [2, 4, 6],
        ];

        for [a, b, c] in LINES {
            if let Cell::Taken(mark) = self.cells[a]
                && self.cells[a] == self.cells[b]
                && self.cells[b] == self.cells[c]
            {
                return Verdict::Won(mark);
            }
        }

        if self.is_full() {
            Verdict::Tie
        } else {
            Verdict::InProgress
        }
    }

    /// Checks if every cell holds a mark.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; SIZE * SIZE] {
        &self.cells
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for row in 0..SIZE {
            for col in 0..SIZE {
                let symbol = match self.cells[row * SIZE + col] {
                    Cell::Empty => '.',
                    Cell::Taken(Mark::X) => 'X',
                    Cell::Taken(Mark::O) => 'O',
                };
                out.push(symbol);
                if col < SIZE - 1 {
                    out.push('|');
                }
            }
            if row < SIZE - 1 {
                out.push_str("\n-+-+-\n");
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_is_in_progress() {
        assert_eq!(Board::new().evaluate(), Verdict::InProgress);
    }

    #[test]
    fn place_rejects_out_of_range() {
        let mut board = Board::new();
        assert_eq!(board.place(3, 0, Mark::X), Err(PlaceError::OutOfRange));
        assert_eq!(board.place(0, 3, Mark::X), Err(PlaceError::OutOfRange));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn place_rejects_occupied_cell() {
        let mut board = Board::new();
        board.place(1, 1, Mark::X).unwrap();
        assert_eq!(board.place(1, 1, Mark::O), Err(PlaceError::CellOccupied));
        assert_eq!(board.get(1, 1), Some(Cell::Taken(Mark::X)));
    }

    #[test]
    fn detects_row_column_and_diagonal_wins() {
        // Top row.
        let mut board = Board::new();
        for col in 0..3 {
            board.place(0, col, Mark::X).unwrap();
        }
        assert_eq!(board.evaluate(), Verdict::Won(Mark::X));

        // Left column.
        let mut board = Board::new();
        for row in 0..3 {
            board.place(row, 0, Mark::O).unwrap();
        }
        assert_eq!(board.evaluate(), Verdict::Won(Mark::O));

        // Anti-diagonal.
        let mut board = Board::new();
        board.place(0, 2, Mark::X).unwrap();
        board.place(1, 1, Mark::X).unwrap();
        board.place(2, 0, Mark::X).unwrap();
        assert_eq!(board.evaluate(), Verdict::Won(Mark::X));
    }

    #[test]
    fn full_board_without_line_is_tie() {
        // X O X / X O O / O X X
        let layout = [
            (0, 0, Mark::X),
            (0, 1, Mark::O),
            (0, 2, Mark::X),
            (1, 0, Mark::X),
            (1, 1, Mark::O),
            (1, 2, Mark::O),
            (2, 0, Mark::O),
            (2, 1, Mark::X),
            (2, 2, Mark::X),
        ];
        let mut board = Board::new();
        for (row, col, mark) in layout {
            board.place(row, col, mark).unwrap();
        }
        assert_eq!(board.evaluate(), Verdict::Tie);
    }
}
