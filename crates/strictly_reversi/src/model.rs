//! The authoritative game: a published state machine over [`GameState`].
//!
//! [`GameModel`] is the only writer of the current game. Every command is
//! checked against the cached legal moves; accepted commands move the
//! published [`GameModelState`] forward and are appended to the command
//! log, which is what animation replays.
//!
//! Two kinds of subscription are offered:
//!
//! - [`GameModel::subscribe_state`] replays the current state to a new
//!   subscriber and then follows every change.
//! - [`GameModel::subscribe_commands`] is signal-only: a subscriber sees
//!   only commands accepted after it subscribed.

use crate::board::Board;
use crate::candidate::AvailableCandidate;
use crate::coordinate::Coordinate;
use crate::disk::{GameResult, Turn};
use crate::state::GameState;
use derive_more::{Display, Error};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

/// Buffered commands per command subscriber before it starts lagging.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Published state of a [`GameModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameModelState {
    /// Play continues. `candidates` are the legal moves of the side to move
    /// and may be empty, in which case that side must pass.
    Ready {
        /// Current position.
        state: GameState,
        /// Legal moves of the side to move.
        candidates: Vec<AvailableCandidate>,
    },
    /// Neither side can move. Terminal until reset.
    Completed {
        /// Final position.
        state: GameState,
        /// Winner or draw.
        result: GameResult,
    },
}

impl GameModelState {
    /// Classifies `state`, computing its legal moves or its result.
    #[instrument]
    pub fn from_game_state(state: GameState) -> Self {
        match state.game_result() {
            Some(result) => GameModelState::Completed { state, result },
            None => GameModelState::Ready {
                state,
                candidates: state.candidates(),
            },
        }
    }

    /// The underlying position.
    pub fn game_state(&self) -> GameState {
        match self {
            GameModelState::Ready { state, .. } | GameModelState::Completed { state, .. } => *state,
        }
    }

    /// Legal moves; empty once completed.
    pub fn candidates(&self) -> &[AvailableCandidate] {
        match self {
            GameModelState::Ready { candidates, .. } => candidates,
            GameModelState::Completed { .. } => &[],
        }
    }

    /// The final result, if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        match self {
            GameModelState::Ready { .. } => None,
            GameModelState::Completed { result, .. } => Some(*result),
        }
    }

    /// True once neither side can move.
    pub fn is_completed(&self) -> bool {
        matches!(self, GameModelState::Completed { .. })
    }
}

/// A command accepted by the [`GameModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameCommand {
    /// `turn` placed a disk, flipping the candidate's lines.
    Placed {
        /// Side that moved.
        turn: Turn,
        /// The candidate that was played.
        selected: AvailableCandidate,
    },
    /// `turn` had no move and passed.
    Passed {
        /// Side that passed.
        turn: Turn,
    },
    /// The game returned to the opening position.
    Reset,
}

/// The boards immediately before and after one accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Board before the command.
    pub begin: Board,
    /// Board after the command.
    pub end: Board,
}

/// One entry of the accepted-command log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameCommandEntry {
    /// Position of this entry in the log, starting at 0.
    pub sequence: u64,
    /// What was accepted.
    pub command: GameCommand,
    /// State before the command.
    pub before: GameState,
    /// State after the command.
    pub after: GameState,
}

impl GameCommandEntry {
    /// The board pair spanned by this command.
    pub fn transaction(&self) -> Transaction {
        Transaction {
            begin: self.before.board(),
            end: self.after.board(),
        }
    }
}

/// A command that is not legal in the current state. The state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, Serialize)]
pub enum IllegalCommand {
    /// Passing is only legal without candidates.
    #[display("cannot pass while moves are available")]
    PassWhileMovesAvailable,
    /// The coordinate is not among the current candidates.
    #[display("{} is not an available move", _0)]
    UnavailableCoordinate(#[error(not(source))] Coordinate),
    /// The game has ended.
    #[display("the game is completed")]
    GameCompleted,
}

/// The single writer of the current game.
#[derive(Debug)]
pub struct GameModel {
    state: GameModelState,
    commands: Vec<GameCommandEntry>,
    state_tx: watch::Sender<GameModelState>,
    command_tx: broadcast::Sender<GameCommandEntry>,
}

impl GameModel {
    /// Creates a model starting from `initial`.
    #[instrument(skip(initial), fields(turn = %initial.turn()))]
    pub fn new(initial: GameState) -> Self {
        let state = GameModelState::from_game_state(initial);
        info!(completed = state.is_completed(), "Creating game model");
        let (state_tx, _) = watch::channel(state.clone());
        let (command_tx, _) = broadcast::channel(COMMAND_CHANNEL_CAPACITY);
        Self {
            state,
            commands: Vec::new(),
            state_tx,
            command_tx,
        }
    }

    /// Current published state.
    pub fn state(&self) -> &GameModelState {
        &self.state
    }

    /// Current position.
    pub fn game_state(&self) -> GameState {
        self.state.game_state()
    }

    /// Every command accepted so far, oldest first.
    pub fn commands(&self) -> &[GameCommandEntry] {
        &self.commands
    }

    /// Follows the published state, starting with the current value.
    pub fn subscribe_state(&self) -> watch::Receiver<GameModelState> {
        self.state_tx.subscribe()
    }

    /// Follows commands accepted from now on.
    pub fn subscribe_commands(&self) -> broadcast::Receiver<GameCommandEntry> {
        self.command_tx.subscribe()
    }

    /// Passes for the side to move.
    ///
    /// # Errors
    ///
    /// Rejected while the side to move has candidates, or once completed.
    #[instrument(skip(self), fields(turn = %self.game_state().turn()))]
    pub fn pass(&mut self) -> Result<GameCommandEntry, IllegalCommand> {
        let (state, candidates) = match &self.state {
            GameModelState::Completed { .. } => return Err(self.reject(IllegalCommand::GameCompleted)),
            GameModelState::Ready { state, candidates } => (*state, candidates),
        };
        if !candidates.is_empty() {
            return Err(self.reject(IllegalCommand::PassWhileMovesAvailable));
        }

        let turn = state.turn();
        Ok(self.accept(GameCommand::Passed { turn }, state.pass_unchecked()))
    }

    /// Places for the side to move at `coordinate`.
    ///
    /// # Errors
    ///
    /// Rejected when `coordinate` is not a current candidate, or once
    /// completed.
    #[instrument(skip(self), fields(turn = %self.game_state().turn(), %coordinate))]
    pub fn place(&mut self, coordinate: Coordinate) -> Result<GameCommandEntry, IllegalCommand> {
        let (state, candidates) = match &self.state {
            GameModelState::Completed { .. } => return Err(self.reject(IllegalCommand::GameCompleted)),
            GameModelState::Ready { state, candidates } => (*state, candidates),
        };
        let Some(selected) = candidates.iter().find(|c| c.coordinate() == coordinate).cloned()
        else {
            return Err(self.reject(IllegalCommand::UnavailableCoordinate(coordinate)));
        };

        let next = state.next_unchecked(&selected);
        let turn = state.turn();
        Ok(self.accept(GameCommand::Placed { turn, selected }, next))
    }

    /// Returns to the opening position. Always accepted.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> GameCommandEntry {
        let next = self.game_state().reset();
        self.accept(GameCommand::Reset, next)
    }

    fn reject(&self, error: IllegalCommand) -> IllegalCommand {
        warn!(%error, "Ignoring command");
        error
    }

    fn accept(&mut self, command: GameCommand, next: GameState) -> GameCommandEntry {
        let entry = GameCommandEntry {
            sequence: self.commands.len() as u64,
            command,
            before: self.game_state(),
            after: next,
        };

        self.state = GameModelState::from_game_state(next);
        info!(
            sequence = entry.sequence,
            command = ?CommandKind::from(&entry.command),
            turn = %next.turn(),
            completed = self.state.is_completed(),
            "Accepted command"
        );

        self.commands.push(entry.clone());
        self.state_tx.send_replace(self.state.clone());
        if self.command_tx.send(entry.clone()).is_err() {
            debug!("No command subscribers");
        }
        entry
    }
}

/// Short form of a command for logs.
#[derive(Debug)]
enum CommandKind {
    Placed(Coordinate),
    Passed,
    Reset,
}

impl From<&GameCommand> for CommandKind {
    fn from(command: &GameCommand) -> Self {
        match command {
            GameCommand::Placed { selected, .. } => CommandKind::Placed(selected.coordinate()),
            GameCommand::Passed { .. } => CommandKind::Passed,
            GameCommand::Reset => CommandKind::Reset,
        }
    }
}

impl Default for GameModel {
    fn default() -> Self {
        Self::new(GameState::initial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_model_is_ready_with_four_candidates() {
        let model = GameModel::default();
        assert!(!model.state().is_completed());
        assert_eq!(model.state().candidates().len(), 4);
        assert!(model.commands().is_empty());
    }

    #[test]
    fn test_place_unavailable_is_ignored() {
        let mut model = GameModel::default();
        let before = model.state().clone();
        assert_eq!(
            model.place(at("a1")),
            Err(IllegalCommand::UnavailableCoordinate(at("a1")))
        );
        assert_eq!(model.state(), &before);
        assert!(model.commands().is_empty());
    }

    #[test]
    fn test_pass_with_moves_is_ignored() {
        let mut model = GameModel::default();
        assert_eq!(model.pass(), Err(IllegalCommand::PassWhileMovesAvailable));
        assert_eq!(model.game_state(), GameState::initial());
    }

    #[test]
    fn test_double_submission_second_is_rejected() {
        let mut model = GameModel::default();
        model.place(at("f5")).unwrap();
        assert_eq!(
            model.place(at("f5")),
            Err(IllegalCommand::UnavailableCoordinate(at("f5")))
        );
        assert_eq!(model.commands().len(), 1);
    }

    #[test]
    fn test_place_logs_entry_with_transaction() {
        let mut model = GameModel::default();
        let entry = model.place(at("f5")).unwrap();
        assert_eq!(entry.sequence, 0);
        assert_eq!(entry.transaction().begin, Board::initial());
        assert_eq!(entry.transaction().end, model.game_state().board());
        let GameCommand::Placed { turn, selected } = &entry.command else {
            panic!("expected a placement");
        };
        assert_eq!(*turn, Turn::First);
        assert_eq!(selected.coordinate(), at("f5"));
        assert_eq!(model.commands(), &[entry.clone()]);
    }

    #[test]
    fn test_reset_is_always_accepted() {
        let mut model = GameModel::default();
        model.place(at("f5")).unwrap();
        let entry = model.reset();
        assert_eq!(entry.command, GameCommand::Reset);
        assert_eq!(model.game_state(), GameState::initial());
        assert_eq!(model.commands().len(), 2);
    }

    #[test]
    fn test_state_subscription_replays_current_value() {
        let mut model = GameModel::default();
        model.place(at("f5")).unwrap();
        let receiver = model.subscribe_state();
        assert_eq!(receiver.borrow().game_state(), model.game_state());
    }

    #[test]
    fn test_command_subscription_does_not_replay() {
        let mut model = GameModel::default();
        model.place(at("f5")).unwrap();
        let mut receiver = model.subscribe_commands();
        assert!(receiver.try_recv().is_err());

        model.reset();
        let entry = receiver.try_recv().unwrap();
        assert_eq!(entry.command, GameCommand::Reset);
        assert_eq!(entry.sequence, 1);
    }
}
