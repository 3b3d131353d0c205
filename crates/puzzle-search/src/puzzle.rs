//! The adapter contract between the search engine and a puzzle family.
//!
//! An adapter is the immutable description of a puzzle (board shape, goal,
//! adjacency) while the position is the mutable state the engine drives
//! through `apply`/`undo`. Positions are always passed explicitly; no
//! adapter keeps board state of its own.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::InvalidMove;

/// Moves legal in one position. Most positions have only a handful.
pub type MoveList<M> = SmallVec<[M; 16]>;

/// A puzzle family driven by the search engine.
pub trait Puzzle {
    type Position: Clone;
    type Move: Clone + Debug;

    /// All moves legal in `position`, in the order the search tries them.
    ///
    /// The order decides which solution a depth-first search returns, so it
    /// must be deterministic.
    fn enumerate_moves(&self, position: &Self::Position) -> MoveList<Self::Move>;

    /// Mutates `position` in place. Must be exactly reversed by [`Puzzle::undo`].
    fn apply(&self, position: &mut Self::Position, mv: &Self::Move) -> Result<(), InvalidMove>;

    /// Restores `position` to its state before the matching [`Puzzle::apply`].
    fn undo(&self, position: &mut Self::Position, mv: &Self::Move) -> Result<(), InvalidMove>;

    fn is_goal(&self, position: &Self::Position) -> bool;
}

/// Puzzles whose positions can be reduced to a key for duplicate detection.
///
/// Two positions are treated as identical iff their keys are equal.
pub trait CanonicalEncoding: Puzzle {
    type Key: Eq + Hash + Clone;

    fn encode(&self, position: &Self::Position) -> Self::Key;
}

/// Direction on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Starting at `Up`, turning right each time
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Row and column offset of one step
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Index into per-direction arrays, in `ALL` order
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Cell on a grid, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The cell `distance` steps away, or `None` above or left of the grid.
    ///
    /// The lower and right bounds depend on the board and are left to the caller.
    pub fn step(self, direction: Direction, distance: usize) -> Option<Coord> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr * distance as isize)?;
        let col = self.col.checked_add_signed(dc * distance as isize)?;
        Some(Coord { row, col })
    }
}
