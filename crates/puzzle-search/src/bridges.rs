//! Hashiwokakero: connect islands with horizontal and vertical bridges so
//! that every island carries exactly its number of bridge ends.
//!
//! Islands are written as `1`-`9` or `a`-`c` (10 to 12); every other
//! character is water. Each island can reach the nearest island in line
//! of sight in each of the four directions. Each such pair is one bridge
//! slot that can carry up to `max_wires` parallel bridges.

use serde::{Deserialize, Serialize};

use crate::encoding::{bits_for, BitKey, BitKeyBuilder};
use crate::error::{BoardError, InvalidMove};
use crate::puzzle::{CanonicalEncoding, Coord, Direction, MoveList, Puzzle};

/// Parallel bridges allowed between two islands unless configured otherwise
pub const DEFAULT_MAX_WIRES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island {
    pub coord: Coord,
    /// Bridge ends this island must end up with
    pub required: u8,
}

/// A pair of islands that see each other across open water
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// The upper or left island
    pub a: usize,
    /// The lower or right island
    pub b: usize,
    pub horizontal: bool,
    /// Slots whose bridges would cross this one
    crossings: Vec<usize>,
}

impl Slot {
    fn crosses(&self, other: &Slot, islands: &[Island]) -> bool {
        if self.horizontal == other.horizontal {
            return false;
        }
        let (h, v) = if self.horizontal {
            (self, other)
        } else {
            (other, self)
        };
        let (row, left, right) = (
            islands[h.a].coord.row,
            islands[h.a].coord.col,
            islands[h.b].coord.col,
        );
        let (col, top, bottom) = (
            islands[v.a].coord.col,
            islands[v.a].coord.row,
            islands[v.b].coord.row,
        );
        top < row && row < bottom && left < col && col < right
    }
}

/// Bridges built so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeState {
    degree: Vec<u8>,
    wires: Vec<u8>,
}

impl BridgeState {
    /// Bridge ends currently attached to `island`
    pub fn degree(&self, island: usize) -> u8 {
        self.degree[island]
    }

    /// Parallel bridges currently in `slot`
    pub fn wires(&self, slot: usize) -> u8 {
        self.wires[slot]
    }
}

/// Build one more bridge in `slot`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeMove {
    pub slot: usize,
}

/// The island layout, its line-of-sight adjacency and the bridge rules
#[derive(Debug, Clone)]
pub struct Bridges {
    islands: Vec<Island>,
    /// Per island, the slot leading to the neighbour in each direction
    slot_at: Vec<[Option<usize>; 4]>,
    slots: Vec<Slot>,
    max_wires: u8,
    require_connected: bool,
}

fn required_bridges(ch: char) -> Option<u8> {
    match ch {
        '1'..='9' => Some(ch as u8 - b'0'),
        'a'..='c' => Some(ch as u8 - b'a' + 10),
        _ => None,
    }
}

impl Bridges {
    /// Parse islands from text rows; anything that is not an island is water
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let islands: Vec<Island> = rows
            .iter()
            .enumerate()
            .flat_map(|(row, text)| {
                text.as_ref()
                    .chars()
                    .enumerate()
                    .filter_map(move |(col, ch)| {
                        required_bridges(ch).map(|required| Island {
                            coord: Coord::new(row, col),
                            required,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self::new(islands)
    }

    /// Build adjacency and bridge slots for `islands`
    pub fn new(islands: Vec<Island>) -> Result<Self, BoardError> {
        if islands.is_empty() {
            return Err(BoardError::Empty);
        }

        let neighbours: Vec<[Option<usize>; 4]> = (0..islands.len())
            .map(|i| Direction::ALL.map(|dir| nearest_in_sight(&islands, i, dir)))
            .collect();

        let mut slot_at = vec![[None; 4]; islands.len()];
        let mut slots = Vec::new();
        for (a, seen) in neighbours.iter().enumerate() {
            for dir in [Direction::Right, Direction::Down] {
                if let Some(b) = seen[dir.index()] {
                    slot_at[a][dir.index()] = Some(slots.len());
                    slot_at[b][dir.opposite().index()] = Some(slots.len());
                    slots.push(Slot {
                        a,
                        b,
                        horizontal: dir.is_horizontal(),
                        crossings: Vec::new(),
                    });
                }
            }
        }

        for s in 0..slots.len() {
            let crossings = (0..slots.len())
                .filter(|&t| slots[s].crosses(&slots[t], &islands))
                .collect();
            slots[s].crossings = crossings;
        }

        Ok(Self {
            islands,
            slot_at,
            slots,
            max_wires: DEFAULT_MAX_WIRES,
            require_connected: false,
        })
    }

    pub fn with_max_wires(mut self, max_wires: u8) -> Self {
        self.max_wires = max_wires;
        self
    }

    /// Also demand that the finished bridges connect every island
    pub fn with_connectivity(mut self, require_connected: bool) -> Self {
        self.require_connected = require_connected;
        self
    }

    /// The position with no bridges built
    pub fn initial_state(&self) -> BridgeState {
        BridgeState {
            degree: vec![0; self.islands.len()],
            wires: vec![0; self.slots.len()],
        }
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The island seen from `island` in `direction`, if any
    pub fn neighbour(&self, island: usize, direction: Direction) -> Option<usize> {
        let slot = &self.slots[self.slot_at[island][direction.index()]?];
        Some(if slot.a == island { slot.b } else { slot.a })
    }

    /// The move that bridges `island` to its neighbour in `direction`.
    ///
    /// Both ends of a slot name the same move.
    pub fn bridge(&self, island: usize, direction: Direction) -> Option<BridgeMove> {
        let slot = self.slot_at.get(island)?[direction.index()]?;
        Some(BridgeMove { slot })
    }

    fn slot_for(&self, mv: &BridgeMove) -> Result<usize, InvalidMove> {
        if mv.slot < self.slots.len() {
            Ok(mv.slot)
        } else {
            Err(InvalidMove::new(format!("no such slot {:?}", mv)))
        }
    }

    fn can_build(&self, state: &BridgeState, slot: usize) -> bool {
        let Slot { a, b, crossings, .. } = &self.slots[slot];
        state.wires[slot] < self.max_wires
            && state.degree[*a] < self.islands[*a].required
            && state.degree[*b] < self.islands[*b].required
            && crossings.iter().all(|&c| state.wires[c] == 0)
    }

    fn is_connected(&self, state: &BridgeState) -> bool {
        let mut reached = vec![false; self.islands.len()];
        let mut stack = vec![0];
        reached[0] = true;
        while let Some(island) = stack.pop() {
            for slot in self.slot_at[island].iter().flatten() {
                if state.wires[*slot] == 0 {
                    continue;
                }
                let Slot { a, b, .. } = self.slots[*slot];
                let other = if a == island { b } else { a };
                if !reached[other] {
                    reached[other] = true;
                    stack.push(other);
                }
            }
        }
        reached.iter().all(|&r| r)
    }
}

/// Nearest island to `from` in `direction` on the same row or column
fn nearest_in_sight(islands: &[Island], from: usize, direction: Direction) -> Option<usize> {
    let origin = islands[from].coord;
    islands
        .iter()
        .enumerate()
        .filter_map(|(i, island)| {
            let c = island.coord;
            let distance = match direction {
                Direction::Up if c.col == origin.col && c.row < origin.row => origin.row - c.row,
                Direction::Down if c.col == origin.col && c.row > origin.row => c.row - origin.row,
                Direction::Left if c.row == origin.row && c.col < origin.col => origin.col - c.col,
                Direction::Right if c.row == origin.row && c.col > origin.col => c.col - origin.col,
                _ => return None,
            };
            Some((distance, i))
        })
        .min()
        .map(|(_, i)| i)
}

impl Puzzle for Bridges {
    type Position = BridgeState;
    type Move = BridgeMove;

    /// Every buildable slot, listed once from its upper or left island in
    /// island order, then clockwise.
    fn enumerate_moves(&self, state: &BridgeState) -> MoveList<BridgeMove> {
        let mut moves = MoveList::new();
        for (island, dirs) in self.slot_at.iter().enumerate() {
            for dir in Direction::CLOCKWISE {
                let Some(slot) = dirs[dir.index()] else {
                    continue;
                };
                if self.slots[slot].a == island && self.can_build(state, slot) {
                    moves.push(BridgeMove { slot });
                }
            }
        }
        moves
    }

    fn apply(&self, state: &mut BridgeState, mv: &BridgeMove) -> Result<(), InvalidMove> {
        let slot = self.slot_for(mv)?;
        if !self.can_build(state, slot) {
            return Err(InvalidMove::new(format!("cannot build {:?}", mv)));
        }
        let Slot { a, b, .. } = self.slots[slot];
        state.wires[slot] += 1;
        state.degree[a] += 1;
        state.degree[b] += 1;
        Ok(())
    }

    fn undo(&self, state: &mut BridgeState, mv: &BridgeMove) -> Result<(), InvalidMove> {
        let slot = self.slot_for(mv)?;
        if state.wires[slot] == 0 {
            return Err(InvalidMove::new(format!("no bridge to remove for {:?}", mv)));
        }
        let Slot { a, b, .. } = self.slots[slot];
        state.wires[slot] -= 1;
        state.degree[a] -= 1;
        state.degree[b] -= 1;
        Ok(())
    }

    fn is_goal(&self, state: &BridgeState) -> bool {
        self.islands
            .iter()
            .zip(&state.degree)
            .all(|(island, &degree)| degree == island.required)
            && (!self.require_connected || self.is_connected(state))
    }
}

impl CanonicalEncoding for Bridges {
    type Key = BitKey;

    /// Wire count per slot; island degrees follow from it
    fn encode(&self, state: &BridgeState) -> BitKey {
        let width = bits_for(self.max_wires as u64);
        let mut key = BitKeyBuilder::with_capacity(state.wires.len() * width);
        for &wires in &state.wires {
            key.push(wires as u64, width);
        }
        key.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{breadth_first, depth_first, depth_first_dedup, level_census};

    fn square() -> Bridges {
        Bridges::from_rows(&["2.2", "...", "2.2"]).unwrap()
    }

    fn mv(puzzle: &Bridges, island: usize, direction: Direction) -> BridgeMove {
        puzzle.bridge(island, direction).unwrap()
    }

    #[test]
    fn test_line_of_sight_adjacency() {
        let puzzle = Bridges::from_rows(&["3..2", ".1..", "2.1."]).unwrap();

        // 0 (0,0)  1 (0,3)  2 (1,1)  3 (2,0)  4 (2,2)
        assert_eq!(puzzle.islands().len(), 5);
        assert_eq!(puzzle.neighbour(0, Direction::Right), Some(1));
        assert_eq!(puzzle.neighbour(0, Direction::Down), Some(3));
        assert_eq!(puzzle.neighbour(1, Direction::Left), Some(0));
        assert_eq!(puzzle.neighbour(1, Direction::Down), None);
        assert_eq!(puzzle.neighbour(2, Direction::Up), None);
        assert_eq!(puzzle.neighbour(3, Direction::Right), Some(4));
        assert_eq!(puzzle.neighbour(4, Direction::Left), Some(3));
        assert_eq!(puzzle.slots().len(), 3);
    }

    #[test]
    fn test_nearest_island_wins() {
        let puzzle = Bridges::from_rows(&["1.2.1"]).unwrap();

        assert_eq!(puzzle.neighbour(0, Direction::Right), Some(1));
        assert_eq!(puzzle.neighbour(2, Direction::Left), Some(1));
        assert_eq!(puzzle.slots().len(), 2);
    }

    #[test]
    fn test_required_degrees() {
        let puzzle = Bridges::from_rows(&["9 a", "b c"]).unwrap();
        let required: Vec<u8> = puzzle.islands().iter().map(|i| i.required).collect();
        assert_eq!(required, vec![9, 10, 11, 12]);

        assert_eq!(Bridges::from_rows(&["...", "   "]).unwrap_err(), BoardError::Empty);
    }

    #[test]
    fn test_two_islands_one_bridge() {
        let puzzle = Bridges::from_rows(&["11"]).unwrap();
        let mut state = puzzle.initial_state();

        let moves = puzzle.enumerate_moves(&state);
        assert_eq!(moves.as_slice(), &[mv(&puzzle, 0, Direction::Right)]);
        assert_eq!(mv(&puzzle, 1, Direction::Left), moves[0]);

        puzzle.apply(&mut state, &moves[0]).unwrap();
        assert_eq!(state.degree(0), 1);
        assert_eq!(state.degree(1), 1);
        assert!(puzzle.is_goal(&state));
        assert!(puzzle.enumerate_moves(&state).is_empty());
    }

    #[test]
    fn test_degree_only_goal_accepts_double_bridges() {
        let puzzle = square();
        let mut state = puzzle.initial_state();

        let result = depth_first(&puzzle, &mut state).unwrap();

        assert_eq!(
            result.solution.unwrap(),
            vec![
                mv(&puzzle, 0, Direction::Right),
                mv(&puzzle, 0, Direction::Right),
                mv(&puzzle, 2, Direction::Right),
                mv(&puzzle, 2, Direction::Right),
            ]
        );
        assert!(puzzle.is_goal(&state));
        assert!(!puzzle.is_connected(&state));
    }

    #[test]
    fn test_connected_goal_builds_a_loop() {
        let puzzle = square().with_connectivity(true);
        let mut state = puzzle.initial_state();

        let result = depth_first_dedup(&puzzle, &mut state).unwrap();

        assert_eq!(
            result.solution.unwrap(),
            vec![
                mv(&puzzle, 0, Direction::Right),
                mv(&puzzle, 0, Direction::Down),
                mv(&puzzle, 1, Direction::Down),
                mv(&puzzle, 2, Direction::Right),
            ]
        );
        for slot in 0..puzzle.slots().len() {
            assert_eq!(state.wires(slot), 1);
        }
    }

    #[test]
    fn test_crossing_bridges_are_refused() {
        let puzzle = Bridges::from_rows(&[".1.", "2.2", ".1."]).unwrap();
        assert_eq!(puzzle.slots().len(), 2);

        let mut state = puzzle.initial_state();
        puzzle.apply(&mut state, &mv(&puzzle, 0, Direction::Down)).unwrap();
        assert!(!puzzle.can_build(&state, 1));
        assert!(puzzle.apply(&mut state, &mv(&puzzle, 1, Direction::Right)).is_err());
        assert!(puzzle.enumerate_moves(&state).is_empty());

        let mut state = puzzle.initial_state();
        let result = depth_first(&puzzle, &mut state).unwrap();
        assert!(!result.solved());
        assert_eq!(state, puzzle.initial_state());
    }

    #[test]
    fn test_max_wires() {
        let rows = ["3.3"];

        let puzzle = Bridges::from_rows(&rows).unwrap();
        let mut state = puzzle.initial_state();
        assert!(depth_first(&puzzle, &mut state).unwrap().solved());
        assert_eq!(state.wires(0), 3);

        let puzzle = Bridges::from_rows(&rows).unwrap().with_max_wires(2);
        let mut state = puzzle.initial_state();
        assert!(!depth_first(&puzzle, &mut state).unwrap().solved());
        assert_eq!(state.wires(0), 0);
    }

    #[test]
    fn test_undo_is_exact() {
        let puzzle = square();
        let mut state = puzzle.initial_state();
        puzzle.apply(&mut state, &mv(&puzzle, 0, Direction::Down)).unwrap();
        let before = state.clone();
        let key = puzzle.encode(&state);

        for m in puzzle.enumerate_moves(&before) {
            puzzle.apply(&mut state, &m).unwrap();
            puzzle.undo(&mut state, &m).unwrap();
            assert_eq!(state, before);
            assert_eq!(puzzle.encode(&state), key);
        }

        assert!(puzzle.undo(&mut state, &mv(&puzzle, 0, Direction::Right)).is_err());
        assert_eq!(puzzle.bridge(0, Direction::Up), None);
        assert_eq!(puzzle.bridge(7, Direction::Up), None);
        assert!(puzzle.apply(&mut state, &BridgeMove { slot: 7 }).is_err());
    }

    #[test]
    fn test_breadth_first_matches_move_count() {
        let puzzle = square().with_connectivity(true);

        let result = breadth_first(&puzzle, &puzzle.initial_state()).unwrap();

        assert_eq!(result.solution.map(|m| m.len()), Some(4));
    }

    #[test]
    fn test_every_buildable_slot_is_offered() {
        let puzzle = square();
        let mut state = puzzle.initial_state();

        let moves = puzzle.enumerate_moves(&state);
        assert_eq!(moves.len(), 4);
        for island in 0..puzzle.islands().len() {
            for dir in Direction::ALL {
                if let Some(m) = puzzle.bridge(island, dir) {
                    assert!(moves.contains(&m), "{:?} from island {} missing", dir, island);
                }
            }
        }

        // Island 3 is not the lowest unsatisfied island but can still build
        let up = mv(&puzzle, 3, Direction::Up);
        assert_eq!(up, mv(&puzzle, 1, Direction::Down));
        puzzle.apply(&mut state, &up).unwrap();
        assert_eq!(state.degree(3), 1);
    }

    #[test]
    fn test_census_merges_move_orders() {
        let puzzle = Bridges::from_rows(&["11"]).unwrap();
        assert_eq!(
            level_census(&puzzle, &puzzle.initial_state()).unwrap(),
            vec![1, 1]
        );

        // Wire counts on the four square slots with every island at most 2
        let puzzle = square();
        let layers = level_census(&puzzle, &puzzle.initial_state()).unwrap();
        assert_eq!(layers, vec![1, 4, 10, 8, 3]);
        assert_eq!(layers.iter().sum::<usize>(), 26);
    }
}
