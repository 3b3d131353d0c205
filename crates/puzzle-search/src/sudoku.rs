//! Sudoku as a fill-one-cell-at-a-time puzzle.
//!
//! The digits already used by every row, column and box are kept as
//! bitmasks and updated on each apply/undo, so checking a candidate never
//! rescans the grid.

use serde::{Deserialize, Serialize};

use crate::encoding::{bits_for, BitKey, BitKeyBuilder};
use crate::error::{BoardError, InvalidMove};
use crate::puzzle::{CanonicalEncoding, MoveList, Puzzle};

/// A partially filled grid. Cells hold `1..=side`, 0 when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudokuGrid {
    box_size: usize,
    side: usize,
    cells: Vec<u8>,
    rows: Vec<u32>,
    cols: Vec<u32>,
    boxes: Vec<u32>,
    empty: usize,
}

impl SudokuGrid {
    /// An empty grid with `box_size`² rows. Box sizes 2 to 4 are supported.
    fn empty(box_size: usize) -> Self {
        let side = box_size * box_size;
        Self {
            box_size,
            side,
            cells: vec![0; side * side],
            rows: vec![0; side],
            cols: vec![0; side],
            boxes: vec![0; side],
            empty: side * side,
        }
    }

    /// Parse a grid written as one line of cells, row by row.
    ///
    /// `.`, `0` and `_` mark empty cells, whitespace is ignored. 16, 81 and
    /// 256 cells give 4×4, 9×9 and 16×16 grids; the latter use `A`-`G` for
    /// 10 to 16.
    pub fn from_line(text: &str) -> Result<Self, BoardError> {
        let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        let box_size = match chars.len() {
            16 => 2,
            81 => 3,
            256 => 4,
            n => return Err(BoardError::WrongCellCount(n)),
        };

        let mut grid = Self::empty(box_size);
        for (cell, &ch) in chars.iter().enumerate() {
            let (row, col) = (cell / grid.side, cell % grid.side);
            let digit = match ch {
                '.' | '0' | '_' => continue,
                '1'..='9' => ch as u8 - b'0',
                'A'..='G' => ch as u8 - b'A' + 10,
                _ => return Err(BoardError::InvalidCell { row, col, ch }),
            };
            if digit as usize > grid.side {
                return Err(BoardError::InvalidCell { row, col, ch });
            }
            if !grid.allows(cell, digit) {
                return Err(BoardError::DuplicateGiven { cell, digit });
            }
            grid.place(cell, digit);
        }
        Ok(grid)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn box_size(&self) -> usize {
        self.box_size
    }

    /// Number of cells still empty
    pub fn empty_cells(&self) -> usize {
        self.empty
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.side || col >= self.side {
            return None;
        }
        match self.cells.get(row * self.side + col) {
            Some(0) | None => None,
            Some(&digit) => Some(digit),
        }
    }

    fn box_of(&self, cell: usize) -> usize {
        let (row, col) = (cell / self.side, cell % self.side);
        (row / self.box_size) * self.box_size + col / self.box_size
    }

    /// Mask of digits already used by the row, column or box of `cell`
    fn used(&self, cell: usize) -> u32 {
        self.rows[cell / self.side] | self.cols[cell % self.side] | self.boxes[self.box_of(cell)]
    }

    fn allows(&self, cell: usize, digit: u8) -> bool {
        self.used(cell) & (1 << digit) == 0
    }

    /// Digits that can go into the empty cell `cell`, ascending
    pub fn candidates(&self, cell: usize) -> impl Iterator<Item = u8> + '_ {
        let used = self.used(cell);
        (1..=self.side as u8).filter(move |d| used & (1 << d) == 0)
    }

    fn first_empty(&self) -> Option<usize> {
        self.cells.iter().position(|&d| d == 0)
    }

    fn place(&mut self, cell: usize, digit: u8) {
        let bit = 1 << digit;
        let group = self.box_of(cell);
        self.cells[cell] = digit;
        self.rows[cell / self.side] |= bit;
        self.cols[cell % self.side] |= bit;
        self.boxes[group] |= bit;
        self.empty -= 1;
    }

    fn clear(&mut self, cell: usize, digit: u8) {
        let bit = !(1 << digit);
        let group = self.box_of(cell);
        self.cells[cell] = 0;
        self.rows[cell / self.side] &= bit;
        self.cols[cell % self.side] &= bit;
        self.boxes[group] &= bit;
        self.empty += 1;
    }

    /// Render in the one-line format accepted by [`SudokuGrid::from_line`]
    pub fn to_line(&self) -> String {
        self.cells
            .iter()
            .map(|&d| match d {
                0 => '.',
                1..=9 => (b'0' + d) as char,
                _ => (b'A' + d - 10) as char,
            })
            .collect()
    }
}

/// Write `digit` into `cell` (row-major index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SudokuMove {
    pub cell: usize,
    pub digit: u8,
}

/// Fills the first empty cell in row-major order with each candidate digit
#[derive(Debug, Clone, Copy, Default)]
pub struct Sudoku;

impl Puzzle for Sudoku {
    type Position = SudokuGrid;
    type Move = SudokuMove;

    fn enumerate_moves(&self, grid: &SudokuGrid) -> MoveList<SudokuMove> {
        match grid.first_empty() {
            Some(cell) => grid
                .candidates(cell)
                .map(|digit| SudokuMove { cell, digit })
                .collect(),
            None => MoveList::new(),
        }
    }

    fn apply(&self, grid: &mut SudokuGrid, mv: &SudokuMove) -> Result<(), InvalidMove> {
        match grid.cells.get(mv.cell) {
            Some(0) => {}
            Some(_) => return Err(InvalidMove::new(format!("cell {} is filled", mv.cell))),
            None => return Err(InvalidMove::new(format!("cell {} is off the grid", mv.cell))),
        }
        if mv.digit == 0 || mv.digit as usize > grid.side || !grid.allows(mv.cell, mv.digit) {
            return Err(InvalidMove::new(format!(
                "{} cannot go into cell {}",
                mv.digit, mv.cell
            )));
        }
        grid.place(mv.cell, mv.digit);
        Ok(())
    }

    fn undo(&self, grid: &mut SudokuGrid, mv: &SudokuMove) -> Result<(), InvalidMove> {
        if mv.digit == 0 || grid.cells.get(mv.cell) != Some(&mv.digit) {
            return Err(InvalidMove::new(format!(
                "cell {} does not hold {}",
                mv.cell, mv.digit
            )));
        }
        grid.clear(mv.cell, mv.digit);
        Ok(())
    }

    /// Every placement is checked on apply, so a full grid is a solved grid
    fn is_goal(&self, grid: &SudokuGrid) -> bool {
        grid.empty == 0
    }
}

impl CanonicalEncoding for Sudoku {
    type Key = BitKey;

    fn encode(&self, grid: &SudokuGrid) -> BitKey {
        let width = bits_for(grid.side as u64);
        let mut key = BitKeyBuilder::with_capacity(grid.cells.len() * width);
        for &digit in &grid.cells {
            key.push(digit as u64, width);
        }
        key.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{breadth_first, depth_first};

    const PUZZLE: &str =
        "...2...633....54.1..1..398........9....538....3........263..5..5.37....847...1...";

    const SOLVED: &str =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

    fn assert_valid_solution(grid: &SudokuGrid, givens: &SudokuGrid) {
        assert_eq!(grid.empty_cells(), 0);
        let full = (1u32 << (grid.side + 1)) - 2;
        for i in 0..grid.side {
            assert_eq!(grid.rows[i], full, "row {}", i);
            assert_eq!(grid.cols[i], full, "col {}", i);
            assert_eq!(grid.boxes[i], full, "box {}", i);
        }
        for row in 0..grid.side {
            for col in 0..grid.side {
                if let Some(given) = givens.get(row, col) {
                    assert_eq!(grid.get(row, col), Some(given));
                }
            }
        }
    }

    #[test]
    fn test_parse() {
        let grid = SudokuGrid::from_line(PUZZLE).unwrap();
        assert_eq!(grid.side(), 9);
        assert_eq!(grid.get(0, 3), Some(2));
        assert_eq!(grid.get(0, 0), None);
        assert_eq!(grid.to_line(), PUZZLE);

        // Columns past the edge must not wrap into the next row
        assert_eq!(grid.get(1, 0), Some(3));
        assert_eq!(grid.get(0, 9), None);
        assert_eq!(grid.get(9, 0), None);

        let small = SudokuGrid::from_line("1 2 . .\n. . 1 2\n2 1 . .\n. . 2 1").unwrap();
        assert_eq!(small.side(), 4);
        assert_eq!(small.box_size(), 2);
        assert_eq!(small.empty_cells(), 8);
    }

    #[test]
    fn test_key_width_fits_largest_digit() {
        let nine = SudokuGrid::from_line(PUZZLE).unwrap();
        assert_eq!(Sudoku.encode(&nine).len(), 81 * 4);

        let sixteen = SudokuGrid::from_line(&".".repeat(256)).unwrap();
        assert_eq!(sixteen.side(), 16);
        assert_eq!(Sudoku.encode(&sixteen).len(), 256 * 5);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            SudokuGrid::from_line("123"),
            Err(BoardError::WrongCellCount(3))
        );
        assert_eq!(
            SudokuGrid::from_line("5...............").unwrap_err(),
            BoardError::InvalidCell {
                row: 0,
                col: 0,
                ch: '5'
            }
        );
        assert_eq!(
            SudokuGrid::from_line("1..1............").unwrap_err(),
            BoardError::DuplicateGiven { cell: 3, digit: 1 }
        );
    }

    #[test]
    fn test_single_empty_cell() {
        let mut line = SOLVED.to_string();
        line.replace_range(40..41, ".");
        let mut grid = SudokuGrid::from_line(&line).unwrap();

        let moves = Sudoku.enumerate_moves(&grid);
        assert_eq!(moves.as_slice(), &[SudokuMove { cell: 40, digit: 5 }]);

        Sudoku.apply(&mut grid, &moves[0]).unwrap();
        assert!(Sudoku.is_goal(&grid));
        assert_eq!(grid.to_line(), SOLVED);
    }

    #[test]
    fn test_apply_and_undo_keep_masks_in_step() {
        let mut grid = SudokuGrid::from_line(PUZZLE).unwrap();
        let before = grid.clone();
        let key = Sudoku.encode(&grid);

        for mv in Sudoku.enumerate_moves(&before) {
            Sudoku.apply(&mut grid, &mv).unwrap();
            assert!(!grid.allows(mv.cell, mv.digit));
            Sudoku.undo(&mut grid, &mv).unwrap();
            assert_eq!(grid, before);
            assert_eq!(Sudoku.encode(&grid), key);
        }
    }

    #[test]
    fn test_contract_violations() {
        let mut grid = SudokuGrid::from_line(PUZZLE).unwrap();

        // cell 3 holds a given
        assert!(Sudoku.apply(&mut grid, &SudokuMove { cell: 3, digit: 1 }).is_err());
        // 2 already sits in row 0
        assert!(Sudoku.apply(&mut grid, &SudokuMove { cell: 0, digit: 2 }).is_err());
        assert!(Sudoku.apply(&mut grid, &SudokuMove { cell: 81, digit: 1 }).is_err());
        assert!(Sudoku.apply(&mut grid, &SudokuMove { cell: 0, digit: 10 }).is_err());
        assert!(Sudoku.undo(&mut grid, &SudokuMove { cell: 0, digit: 5 }).is_err());
        assert_eq!(grid, SudokuGrid::from_line(PUZZLE).unwrap());
    }

    #[test]
    fn test_solve() {
        let givens = SudokuGrid::from_line(PUZZLE).unwrap();
        let mut grid = givens.clone();

        let result = depth_first(&Sudoku, &mut grid).unwrap();

        assert_eq!(result.solution.map(|m| m.len()), Some(givens.empty_cells()));
        assert_valid_solution(&grid, &givens);
    }

    #[test]
    fn test_solve_small_grid_breadth_first() {
        let givens = SudokuGrid::from_line("1...\n..1.\n.1..\n...1").unwrap();

        let result = breadth_first(&Sudoku, &givens).unwrap();

        let moves = result.solution.unwrap();
        let mut grid = givens.clone();
        for mv in &moves {
            Sudoku.apply(&mut grid, mv).unwrap();
        }
        assert_valid_solution(&grid, &givens);
    }

    #[test]
    fn test_contradiction_fails_cleanly() {
        // Row 0 needs a 4 in cell 3, but column 3 already has one
        let givens = SudokuGrid::from_line("123.\n....\n...4\n....").unwrap();
        let mut grid = givens.clone();

        let result = depth_first(&Sudoku, &mut grid).unwrap();

        assert!(!result.solved());
        assert_eq!(grid, givens);
    }
}
