//! Immutable game state: a board and the side to move.

use crate::board::Board;
use crate::candidate::AvailableCandidate;
use crate::disk::{GameResult, Turn};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{instrument, trace};

/// A board together with whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    turn: Turn,
}

impl GameState {
    /// Creates a state from its parts.
    pub fn new(board: Board, turn: Turn) -> Self {
        Self { board, turn }
    }

    /// The disks.
    pub fn board(&self) -> Board {
        self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// The opening position with the first side to move.
    pub fn initial() -> Self {
        Self::new(Board::initial(), Turn::First)
    }

    /// Returns to the opening position.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Self {
        Self::initial()
    }

    /// Legal moves for the side to move.
    pub fn candidates(&self) -> Vec<AvailableCandidate> {
        self.board.available_candidates(self.turn)
    }

    /// Hands the turn over without touching the board.
    ///
    /// Does not check that the side to move has no candidates.
    pub fn pass_unchecked(&self) -> Self {
        trace!(turn = %self.turn, "Passing");
        Self::new(self.board, self.turn.next())
    }

    /// Plays `candidate` and hands the turn over.
    ///
    /// `candidate` must come from [`GameState::candidates`] on this same
    /// state; its lines are applied without being re-validated.
    pub fn next_unchecked(&self, candidate: &AvailableCandidate) -> Self {
        let disk = self.turn.disk();
        let board = candidate
            .lines()
            .iter()
            .fold(self.board, |board, line| board.replaced_unchecked(disk, &line.line()));
        trace!(turn = %self.turn, coordinate = %candidate.coordinate(), "Placing");
        Self::new(board, self.turn.next())
    }

    /// The final result, once neither side can move.
    pub fn game_result(&self) -> Option<GameResult> {
        self.board.game_result()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}\n{} to move ({})", self.board, self.turn, self.board.count_disks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinate, Disk, DiskCount};

    fn at(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_move_f5_flips_e5() {
        let state = GameState::initial();
        let candidates = state.candidates();
        let f5 = candidates.iter().find(|c| c.coordinate() == at("f5")).unwrap();
        let next = state.next_unchecked(f5);

        assert_eq!(next.turn(), Turn::Second);
        assert_eq!(next.board().disk_at(at("f5")), Some(Disk::Dark));
        assert_eq!(next.board().disk_at(at("e5")), Some(Disk::Dark));
        assert_eq!(next.board().count_disks(), DiskCount { dark: 4, light: 1 });
    }

    #[test]
    fn test_pass_keeps_board() {
        let state = GameState::initial();
        let passed = state.pass_unchecked();
        assert_eq!(passed.board(), state.board());
        assert_eq!(passed.turn(), Turn::Second);
    }

    #[test]
    fn test_reset_returns_initial() {
        let state = GameState::new(Board::empty(), Turn::Second);
        assert_eq!(state.reset(), GameState::initial());
    }

    #[test]
    fn test_serde_round_trip_keeps_state() {
        let state = GameState::initial();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"turn\":\"first\""));
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
