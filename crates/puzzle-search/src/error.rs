//! Error types for adapters, the search engine and puzzle loading.

use thiserror::Error;

/// A move that does not fit the position it was applied to.
///
/// Adapters return this from `apply`/`undo` when the move could not have
/// come from `enumerate_moves` on the current position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid move: {reason}")]
pub struct InvalidMove {
    pub reason: String,
}

impl InvalidMove {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the search engine and the interactive session.
///
/// Exhausting the search space is not an error; it is reported as a
/// [`SolverResult`](crate::solver::SolverResult) without a solution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),

    /// A caller-supplied move that is not legal in the current position
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// Problems in the textual description of a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board has no playable cells")]
    Empty,

    #[error("unexpected character '{ch}' at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },

    #[error("grid has {0} cells, expected 16, 81 or 256")]
    WrongCellCount(usize),

    #[error("digit {digit} appears twice in the groups of cell {cell}")]
    DuplicateGiven { cell: usize, digit: u8 },

    #[error("target ({row}, {col}) is not a playable cell")]
    TargetOutsideBoard { row: usize, col: usize },

    #[error("board has {0} pegs, at most 255 can be numbered")]
    TooManyPegs(usize),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Errors while reading a puzzle file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
}
