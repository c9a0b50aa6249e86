mod rules;
mod types;

pub use rules::{Game, MoveError};
pub use types::{Board, Cell, Mark, PlaceError, SIZE, Verdict};
