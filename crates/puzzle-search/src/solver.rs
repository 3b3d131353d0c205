//! Backtracking search over a [`Puzzle`] adapter.
//!
//! Depth-first mode shares one mutable position across the whole call tree
//! and relies on `apply`/`undo` being exact inverses: every branch that
//! fails hands the position back to its caller unchanged. Breadth-first
//! mode gives every frontier entry its own clone instead and returns a
//! solution with the fewest moves.
//!
//! Both modes return the first solution found in adapter move order.

use std::collections::VecDeque;
use std::hash::Hash;
use std::time::Instant;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::encoding::VisitedSet;
use crate::error::SearchError;
use crate::puzzle::{CanonicalEncoding, Puzzle};

/// Search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Exhaustive backtracking with in-place move/undo
    #[default]
    DepthFirst,
    /// Level-order search over cloned positions, fewest moves first
    BreadthFirst,
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub mode: SearchMode,
    /// Skip positions already explored through another move order.
    /// Breadth-first search always deduplicates.
    pub dedup: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::DepthFirst,
            dedup: true,
        }
    }
}

/// Counters collected during one search call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions whose moves were enumerated
    pub nodes_expanded: usize,
    /// Positions skipped because their key had been seen
    pub duplicates_pruned: usize,
    pub max_depth: usize,
    /// Largest breadth-first queue length (0 for depth-first)
    pub peak_frontier: usize,
    pub time_elapsed_ms: u64,
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult<M> {
    /// Moves from the initial position to a goal, if one was reached
    pub solution: Option<Vec<M>>,
    pub stats: SearchStats,
}

impl<M> SolverResult<M> {
    pub fn solved(&self) -> bool {
        self.solution.is_some()
    }
}

/// Run the search selected by `config`.
///
/// In depth-first mode `position` is mutated during the search. On a
/// successful search it is left in the goal position; otherwise it is
/// restored to its initial state. Breadth-first mode never touches it.
pub fn solve<P>(
    puzzle: &P,
    position: &mut P::Position,
    config: &SolverConfig,
) -> Result<SolverResult<P::Move>, SearchError>
where
    P: CanonicalEncoding,
{
    match (config.mode, config.dedup) {
        (SearchMode::DepthFirst, false) => depth_first(puzzle, position),
        (SearchMode::DepthFirst, true) => depth_first_dedup(puzzle, position),
        (SearchMode::BreadthFirst, _) => breadth_first(puzzle, position),
    }
}

/// Exhaustive depth-first backtracking without duplicate detection.
///
/// Terminates as long as every move makes progress towards a bounded end,
/// which holds for all puzzles whose moves only fill or remove.
pub fn depth_first<P: Puzzle>(
    puzzle: &P,
    position: &mut P::Position,
) -> Result<SolverResult<P::Move>, SearchError> {
    let mut search = DepthFirst::<P, ()> {
        puzzle,
        dedup: None,
        path: Vec::new(),
        stats: SearchStats::default(),
    };
    search.run(position, "depth-first")
}

/// Depth-first backtracking that never explores the same position twice.
pub fn depth_first_dedup<P: CanonicalEncoding>(
    puzzle: &P,
    position: &mut P::Position,
) -> Result<SolverResult<P::Move>, SearchError> {
    let mut search = DepthFirst {
        puzzle,
        dedup: Some(Dedup {
            encode: P::encode,
            visited: VisitedSet::new(),
        }),
        path: Vec::new(),
        stats: SearchStats::default(),
    };
    search.run(position, "depth-first-dedup")
}

struct Dedup<P: Puzzle, K> {
    encode: fn(&P, &P::Position) -> K,
    visited: VisitedSet<K>,
}

struct DepthFirst<'a, P: Puzzle, K> {
    puzzle: &'a P,
    dedup: Option<Dedup<P, K>>,
    /// Moves applied on the current branch, in order
    path: Vec<P::Move>,
    stats: SearchStats,
}

impl<P: Puzzle, K: Eq + Hash> DepthFirst<'_, P, K> {
    fn run(
        &mut self,
        position: &mut P::Position,
        mode: &'static str,
    ) -> Result<SolverResult<P::Move>, SearchError> {
        let start_time = Instant::now();
        info!(event = "search_start", mode);

        let found = self.explore(position)?;

        self.stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            event = "search_end",
            mode,
            solved = found,
            nodes_expanded = self.stats.nodes_expanded,
            duplicates_pruned = self.stats.duplicates_pruned,
            max_depth = self.stats.max_depth,
            duration_ms = self.stats.time_elapsed_ms,
        );

        Ok(SolverResult {
            solution: found.then(|| std::mem::take(&mut self.path)),
            stats: self.stats.clone(),
        })
    }

    /// Returns `true` with the winning moves left on `self.path`. A `false`
    /// return leaves `position` exactly as it was on entry.
    fn explore(&mut self, position: &mut P::Position) -> Result<bool, SearchError> {
        if self.puzzle.is_goal(position) {
            return Ok(true);
        }

        if let Some(dedup) = self.dedup.as_mut() {
            // Marked before exploring so cycles back to this position stop here
            if !dedup.visited.insert((dedup.encode)(self.puzzle, position)) {
                self.stats.duplicates_pruned += 1;
                return Ok(false);
            }
        }

        self.stats.nodes_expanded += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.path.len());

        let moves = self.puzzle.enumerate_moves(position);
        trace!(depth = self.path.len(), moves = moves.len(), "expand");

        for mv in moves {
            self.puzzle.apply(position, &mv)?;
            self.path.push(mv);

            if self.explore(position)? {
                return Ok(true);
            }

            if let Some(mv) = self.path.pop() {
                self.puzzle.undo(position, &mv)?;
            }
        }

        Ok(false)
    }
}

/// One record in the breadth-first path arena
struct Step<M> {
    parent: Option<usize>,
    mv: Option<M>,
}

/// Walk parent links back to the root and return the moves in play order.
fn reconstruct<M: Clone>(arena: &[Step<M>], mut index: usize) -> Vec<M> {
    let mut moves = Vec::new();
    while let Some(step) = arena.get(index) {
        if let Some(mv) = &step.mv {
            moves.push(mv.clone());
        }
        match step.parent {
            Some(parent) => index = parent,
            None => break,
        }
    }
    moves.reverse();
    moves
}

/// Breadth-first search returning a solution with the minimum move count.
///
/// `position` is only read; each frontier entry owns its own clone.
pub fn breadth_first<P: CanonicalEncoding>(
    puzzle: &P,
    position: &P::Position,
) -> Result<SolverResult<P::Move>, SearchError> {
    let start_time = Instant::now();
    info!(event = "search_start", mode = "breadth-first");

    let mut stats = SearchStats::default();
    let mut arena: Vec<Step<P::Move>> = vec![Step {
        parent: None,
        mv: None,
    }];
    let mut visited = VisitedSet::new();
    visited.insert(puzzle.encode(position));

    // (position, arena index, depth)
    let mut queue: VecDeque<(P::Position, usize, usize)> = VecDeque::new();
    queue.push_back((position.clone(), 0, 0));
    stats.peak_frontier = 1;

    let mut solution = None;

    while let Some((current, index, depth)) = queue.pop_front() {
        if puzzle.is_goal(&current) {
            solution = Some(reconstruct(&arena, index));
            break;
        }

        stats.nodes_expanded += 1;
        stats.max_depth = stats.max_depth.max(depth);

        for mv in puzzle.enumerate_moves(&current) {
            let mut next = current.clone();
            puzzle.apply(&mut next, &mv)?;

            if !visited.insert(puzzle.encode(&next)) {
                stats.duplicates_pruned += 1;
                continue;
            }

            arena.push(Step {
                parent: Some(index),
                mv: Some(mv),
            });
            queue.push_back((next, arena.len() - 1, depth + 1));
        }

        stats.peak_frontier = stats.peak_frontier.max(queue.len());
    }

    stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!(
        event = "search_end",
        mode = "breadth-first",
        solved = solution.is_some(),
        nodes_expanded = stats.nodes_expanded,
        duplicates_pruned = stats.duplicates_pruned,
        peak_frontier = stats.peak_frontier,
        duration_ms = stats.time_elapsed_ms,
    );

    Ok(SolverResult { solution, stats })
}

/// Count the distinct positions first reached at each depth.
///
/// Entry 0 is the initial position itself. The sum is the number of
/// distinct positions reachable from `position`.
pub fn level_census<P: CanonicalEncoding>(
    puzzle: &P,
    position: &P::Position,
) -> Result<Vec<usize>, SearchError> {
    let mut visited = VisitedSet::new();
    visited.insert(puzzle.encode(position));

    let mut layer = vec![position.clone()];
    let mut counts = Vec::new();

    while !layer.is_empty() {
        debug!(depth = counts.len(), positions = layer.len(), "census layer");
        counts.push(layer.len());

        let mut next_layer = Vec::new();
        for mut current in layer {
            for mv in puzzle.enumerate_moves(&current) {
                puzzle.apply(&mut current, &mv)?;
                if visited.insert(puzzle.encode(&current)) {
                    next_layer.push(current.clone());
                }
                puzzle.undo(&mut current, &mv)?;
            }
        }
        layer = next_layer;
    }

    info!(
        event = "census_end",
        depths = counts.len(),
        positions = visited.len(),
    );

    Ok(counts)
}
