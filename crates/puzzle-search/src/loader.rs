//! Puzzle files: JSON objects tagged with the puzzle `kind`.
//!
//! ```json
//! {"kind": "peg", "preset": "english", "finishInCentre": true}
//! {"kind": "peg", "preset": "european", "target": [3, 3]}
//! {"kind": "peg", "rows": ["oo.o"]}
//! {"kind": "sudoku", "grid": "...2...633....54.1..."}
//! {"kind": "bridges", "rows": ["2.2", "...", "2.2"], "requireConnected": true}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bridges::{BridgeState, Bridges, DEFAULT_MAX_WIRES};
use crate::error::{BoardError, LoadError};
use crate::peg::{PegBoard, PegSolitaire};
use crate::puzzle::Coord;
use crate::sudoku::{Sudoku, SudokuGrid};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PuzzleFile {
    Peg(PegFile),
    Sudoku(SudokuFile),
    Bridges(BridgesFile),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PegFile {
    /// Named board; takes precedence over `rows`
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub rows: Vec<String>,
    /// `[row, col]` the last peg must finish on
    #[serde(default)]
    pub target: Option<(usize, usize)>,
    /// Shorthand for a target on the board's centre; `target` wins
    #[serde(default)]
    pub finish_in_centre: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SudokuFile {
    pub grid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgesFile {
    pub rows: Vec<String>,
    #[serde(default = "default_max_wires")]
    pub max_wires: u8,
    #[serde(default)]
    pub require_connected: bool,
}

fn default_max_wires() -> u8 {
    DEFAULT_MAX_WIRES
}

/// A puzzle adapter together with its starting position
#[derive(Debug, Clone)]
pub enum LoadedPuzzle {
    Peg(PegSolitaire, PegBoard),
    Sudoku(Sudoku, SudokuGrid),
    Bridges(Bridges, BridgeState),
}

impl LoadedPuzzle {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadedPuzzle::Peg(..) => "peg",
            LoadedPuzzle::Sudoku(..) => "sudoku",
            LoadedPuzzle::Bridges(..) => "bridges",
        }
    }
}

impl PuzzleFile {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Parse the board and set up the adapter
    pub fn build(&self) -> Result<LoadedPuzzle, BoardError> {
        match self {
            PuzzleFile::Peg(file) => {
                let board = match &file.preset {
                    Some(name) => PegBoard::preset(name)?,
                    None => PegBoard::from_rows(file.rows.as_slice())?,
                };
                let game = match file.target {
                    Some((row, col)) => PegSolitaire::with_target(&board, Coord::new(row, col))?,
                    None if file.finish_in_centre => PegSolitaire::finish_in_centre(&board)?,
                    None => PegSolitaire::default(),
                };
                Ok(LoadedPuzzle::Peg(game, board))
            }
            PuzzleFile::Sudoku(file) => {
                Ok(LoadedPuzzle::Sudoku(Sudoku, SudokuGrid::from_line(&file.grid)?))
            }
            PuzzleFile::Bridges(file) => {
                let puzzle = Bridges::from_rows(file.rows.as_slice())?
                    .with_max_wires(file.max_wires)
                    .with_connectivity(file.require_connected);
                let state = puzzle.initial_state();
                Ok(LoadedPuzzle::Bridges(puzzle, state))
            }
        }
    }
}
