//! Peg solitaire: jump a peg over a neighbour into an empty hole and remove
//! the jumped peg, until one peg is left.
//!
//! Board text uses `o` for a peg, `.` for an empty hole and anything else
//! (space, `#`) for cells that are not part of the board.

use serde::{Deserialize, Serialize};

use crate::encoding::{BitKey, BitKeyBuilder};
use crate::error::{BoardError, InvalidMove};
use crate::puzzle::{CanonicalEncoding, Coord, Direction, MoveList, Puzzle};

/// Pegs are numbered row-major from 1 when a board is parsed
pub type PegId = u8;

/// Direction order tried for each peg
const JUMP_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

const ENGLISH: [&str; 7] = [
    "  ooo  ",
    "  ooo  ",
    "ooooooo",
    "ooo.ooo",
    "ooooooo",
    "  ooo  ",
    "  ooo  ",
];

const EUROPEAN: [&str; 7] = [
    "  ooo  ",
    " ooooo ",
    "ooooooo",
    "ooooooo",
    "ooooooo",
    " ooooo ",
    "  oo.  ",
];

/// A cell of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hole {
    /// Not part of the board
    Void,
    Empty,
    Peg(PegId),
}

impl Hole {
    pub fn is_peg(self) -> bool {
        matches!(self, Hole::Peg(_))
    }
}

/// A peg solitaire position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PegBoard {
    width: usize,
    height: usize,
    cells: Vec<Hole>,
    pegs: usize,
}

impl PegBoard {
    /// Parse a board from text rows. Short rows are padded with void cells.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);

        let mut cells = vec![Hole::Void; width * height];
        let mut pegs = 0;
        let mut playable = 0;

        for (row, text) in rows.iter().enumerate() {
            for (col, ch) in text.as_ref().chars().enumerate() {
                let hole = match ch {
                    'o' => {
                        pegs += 1;
                        let id = PegId::try_from(pegs).map_err(|_| BoardError::TooManyPegs(pegs))?;
                        Hole::Peg(id)
                    }
                    '.' => Hole::Empty,
                    ' ' | '#' => Hole::Void,
                    _ => return Err(BoardError::InvalidCell { row, col, ch }),
                };
                if hole != Hole::Void {
                    playable += 1;
                }
                cells[row * width + col] = hole;
            }
        }

        if playable == 0 {
            return Err(BoardError::Empty);
        }

        Ok(Self {
            width,
            height,
            cells,
            pegs,
        })
    }

    /// The 33-hole cross-shaped board with the centre empty
    pub fn english() -> Self {
        Self::from_rows(&ENGLISH).unwrap_or_else(|e| unreachable!("english preset: {}", e))
    }

    /// The 37-hole board with one hole empty on the bottom edge
    pub fn european() -> Self {
        Self::from_rows(&EUROPEAN).unwrap_or_else(|e| unreachable!("european preset: {}", e))
    }

    pub fn preset(name: &str) -> Result<Self, BoardError> {
        match name {
            "english" | "british" => Ok(Self::english()),
            "european" | "french" => Ok(Self::european()),
            _ => Err(BoardError::UnknownPreset(name.to_string())),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Middle cell of the bounding box, rounding down and to the right
    pub fn centre(&self) -> Coord {
        Coord::new(self.height / 2, self.width / 2)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn peg_count(&self) -> usize {
        self.pegs
    }

    /// The cell at `at`; anything outside the grid is void
    pub fn get(&self, at: Coord) -> Hole {
        if at.row >= self.height || at.col >= self.width {
            return Hole::Void;
        }
        self.cells[at.row * self.width + at.col]
    }

    fn set(&mut self, at: Coord, hole: Hole) {
        self.cells[at.row * self.width + at.col] = hole;
    }

    /// Coordinates of all pegs, row-major
    pub fn pegs(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, hole)| hole.is_peg())
            .map(|(i, _)| Coord::new(i / self.width, i % self.width))
    }

    /// Render back to the text format accepted by [`PegBoard::from_rows`]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|hole| match hole {
                        Hole::Void => ' ',
                        Hole::Empty => '.',
                        Hole::Peg(_) => 'o',
                    })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}

/// When a board with one peg left counts as solved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PegGoal {
    #[default]
    AnySingle,
    /// The last peg must stand on this cell
    At(Coord),
}

/// A jump of the peg on `from` over its neighbour in `direction`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PegMove {
    pub from: Coord,
    pub direction: Direction,
    /// The peg removed by the jump, restored by undo
    pub jumped: PegId,
}

impl PegMove {
    pub fn over(&self) -> Option<Coord> {
        self.from.step(self.direction, 1)
    }

    pub fn to(&self) -> Option<Coord> {
        self.from.step(self.direction, 2)
    }

    fn cells(&self) -> Result<(Coord, Coord), InvalidMove> {
        match (self.over(), self.to()) {
            (Some(over), Some(to)) => Ok((over, to)),
            _ => Err(InvalidMove::new(format!("{:?} jumps off the board", self))),
        }
    }
}

/// Peg solitaire rules with a configurable goal
#[derive(Debug, Clone, Default)]
pub struct PegSolitaire {
    goal: PegGoal,
}

impl PegSolitaire {
    pub fn new(goal: PegGoal) -> Self {
        Self { goal }
    }

    /// Require the last peg to finish on `target`, which must be a hole of `board`
    pub fn with_target(board: &PegBoard, target: Coord) -> Result<Self, BoardError> {
        if board.get(target) == Hole::Void {
            return Err(BoardError::TargetOutsideBoard {
                row: target.row,
                col: target.col,
            });
        }
        Ok(Self::new(PegGoal::At(target)))
    }

    /// Require the last peg to finish on the board's centre hole, the
    /// classic English and European challenge
    pub fn finish_in_centre(board: &PegBoard) -> Result<Self, BoardError> {
        Self::with_target(board, board.centre())
    }

    pub fn goal(&self) -> PegGoal {
        self.goal
    }
}

impl Puzzle for PegSolitaire {
    type Position = PegBoard;
    type Move = PegMove;

    fn enumerate_moves(&self, board: &PegBoard) -> MoveList<PegMove> {
        let mut moves = MoveList::new();
        for from in board.pegs() {
            for direction in JUMP_ORDER {
                let (Some(over), Some(to)) = (from.step(direction, 1), from.step(direction, 2))
                else {
                    continue;
                };
                if let (Hole::Peg(jumped), Hole::Empty) = (board.get(over), board.get(to)) {
                    moves.push(PegMove {
                        from,
                        direction,
                        jumped,
                    });
                }
            }
        }
        moves
    }

    fn apply(&self, board: &mut PegBoard, mv: &PegMove) -> Result<(), InvalidMove> {
        let (over, to) = mv.cells()?;
        let Hole::Peg(mover) = board.get(mv.from) else {
            return Err(InvalidMove::new(format!("no peg on {:?}", mv.from)));
        };
        if board.get(over) != Hole::Peg(mv.jumped) {
            return Err(InvalidMove::new(format!("peg {} is not on {:?}", mv.jumped, over)));
        }
        if board.get(to) != Hole::Empty {
            return Err(InvalidMove::new(format!("{:?} is not an empty hole", to)));
        }

        board.set(to, Hole::Peg(mover));
        board.set(over, Hole::Empty);
        board.set(mv.from, Hole::Empty);
        board.pegs -= 1;
        Ok(())
    }

    fn undo(&self, board: &mut PegBoard, mv: &PegMove) -> Result<(), InvalidMove> {
        let (over, to) = mv.cells()?;
        let Hole::Peg(mover) = board.get(to) else {
            return Err(InvalidMove::new(format!("no peg landed on {:?}", to)));
        };
        if board.get(over) != Hole::Empty || board.get(mv.from) != Hole::Empty {
            return Err(InvalidMove::new(format!("{:?} was not applied", mv)));
        }

        board.set(mv.from, Hole::Peg(mover));
        board.set(over, Hole::Peg(mv.jumped));
        board.set(to, Hole::Empty);
        board.pegs += 1;
        Ok(())
    }

    fn is_goal(&self, board: &PegBoard) -> bool {
        board.pegs == 1
            && match self.goal {
                PegGoal::AnySingle => true,
                PegGoal::At(target) => board.get(target).is_peg(),
            }
    }
}

impl CanonicalEncoding for PegSolitaire {
    type Key = BitKey;

    /// One bit per hole: occupied or empty
    fn encode(&self, board: &PegBoard) -> BitKey {
        let mut key = BitKeyBuilder::with_capacity(board.cells.len());
        for hole in &board.cells {
            if *hole != Hole::Void {
                key.bit(hole.is_peg());
            }
        }
        key.finish()
    }
}
