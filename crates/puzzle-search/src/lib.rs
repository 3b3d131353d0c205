//! Generic backtracking search for single-player puzzles.
//!
//! A puzzle is described once through the [`Puzzle`] trait (legal moves,
//! apply, undo, goal test) and every search strategy in [`solver`] works
//! on it unchanged. Peg solitaire, sudoku and bridges adapters are
//! included, along with a JSON loader and a move-by-move [`Session`].

pub mod bridges;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod peg;
pub mod puzzle;
pub mod replay;
pub mod solver;
pub mod sudoku;

// Re-export main types
pub use bridges::{BridgeMove, BridgeState, Bridges};
pub use encoding::{BitKey, BitKeyBuilder, VisitedSet};
pub use error::{BoardError, InvalidMove, LoadError, SearchError};
pub use loader::{LoadedPuzzle, PuzzleFile};
pub use peg::{PegBoard, PegGoal, PegMove, PegSolitaire};
pub use puzzle::{CanonicalEncoding, Coord, Direction, MoveList, Puzzle};
pub use replay::{replay, ReplayOutcome, Session};
pub use solver::{
    breadth_first, depth_first, depth_first_dedup, level_census, solve, SearchMode,
    SearchStats, SolverConfig, SolverResult,
};
pub use sudoku::{Sudoku, SudokuGrid, SudokuMove};
