//! Driving a puzzle one move at a time outside of any search.
//!
//! [`Session`] is the surface for an interactive player: it only accepts
//! moves the adapter currently enumerates and undoes them strictly in
//! reverse order. [`replay`] checks a recorded move sequence the same way.

use serde::Serialize;
use tracing::debug;

use crate::error::SearchError;
use crate::puzzle::{MoveList, Puzzle};

/// A position being played by hand, with its move history
pub struct Session<'a, P: Puzzle> {
    puzzle: &'a P,
    position: P::Position,
    history: Vec<P::Move>,
}

impl<'a, P> Session<'a, P>
where
    P: Puzzle,
    P::Move: PartialEq,
{
    pub fn new(puzzle: &'a P, position: P::Position) -> Self {
        Self {
            puzzle,
            position,
            history: Vec::new(),
        }
    }

    pub fn legal_moves(&self) -> MoveList<P::Move> {
        self.puzzle.enumerate_moves(&self.position)
    }

    /// Play `mv` if it is legal in the current position
    pub fn play(&mut self, mv: P::Move) -> Result<(), SearchError> {
        if !self.legal_moves().contains(&mv) {
            return Err(SearchError::IllegalMove(format!("{:?}", mv)));
        }
        self.puzzle.apply(&mut self.position, &mv)?;
        self.history.push(mv);
        Ok(())
    }

    /// Take back the most recent move, returning it
    pub fn undo_last(&mut self) -> Result<Option<P::Move>, SearchError> {
        let Some(mv) = self.history.pop() else {
            return Ok(None);
        };
        self.puzzle.undo(&mut self.position, &mv)?;
        Ok(Some(mv))
    }

    pub fn is_solved(&self) -> bool {
        self.puzzle.is_goal(&self.position)
    }

    /// No legal moves left and not solved
    pub fn is_stuck(&self) -> bool {
        !self.is_solved() && self.legal_moves().is_empty()
    }

    pub fn position(&self) -> &P::Position {
        &self.position
    }

    pub fn history(&self) -> &[P::Move] {
        &self.history
    }

    /// End the session, handing back the position
    pub fn into_position(self) -> P::Position {
        self.position
    }
}

/// Result of replaying a move sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    pub moves_applied: usize,
    pub solved: bool,
}

/// Replay `moves` from `position`, checking each against the legal moves.
///
/// `position` itself is left untouched.
pub fn replay<P>(
    puzzle: &P,
    position: &P::Position,
    moves: &[P::Move],
) -> Result<ReplayOutcome, SearchError>
where
    P: Puzzle,
    P::Move: PartialEq,
{
    let mut session = Session::new(puzzle, position.clone());
    for (i, mv) in moves.iter().enumerate() {
        debug!(step = i, ?mv, "replay");
        session.play(mv.clone())?;
    }
    Ok(ReplayOutcome {
        moves_applied: moves.len(),
        solved: session.is_solved(),
    })
}
