//! A game with optional automated sides.
//!
//! [`GameWithAutomatorsModel`] is the composition root. It owns the game,
//! its animation, the automator, the per-side automation toggles and the
//! store, and is the only writer of any of them. After every change it
//! decides whether the automator should be running:
//!
//! - the game is ready,
//! - the side to move is automated,
//! - and the automator is sleeping.
//!
//! An automated side without candidates passes immediately. A selection
//! that no longer fits the current game freezes the session in
//! [`SessionState::Failed`] until [`GameWithAutomatorsModel::reset`].

use crate::automator::{AutomatorModel, AutomatorProgressState, AutomatorSelection};
use crate::availability::AutomationAvailabilities;
use crate::persistence::GameStateStore;
use crate::selector::CoordinateSelector;
use derive_more::{Display, Error, From};
use serde::Serialize;
use std::sync::Arc;
use strictly_reversi::{
    AnimationError, BoardAnimationModel, BoardAnimationState, Candidates, Coordinate,
    GameCommandEntry, GameModel, GameModelState, GameState, IllegalCommand, Turn,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// An automator answer that no longer fits the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, Serialize)]
pub enum AutomatorDesync {
    /// The game moved on while the automator was choosing.
    #[display("automator chose {} for {} but the position has changed", coordinate, turn)]
    PositionChanged {
        /// Side the automator was playing.
        turn: Turn,
        /// The stale choice.
        coordinate: Coordinate,
    },
    /// The game refused the automator's move.
    #[display("automator move {} was rejected: {}", coordinate, reason)]
    Rejected {
        /// The rejected choice.
        coordinate: Coordinate,
        /// Why the game refused it.
        reason: IllegalCommand,
    },
}

/// Published state of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Play proceeds normally.
    Playing(GameModelState),
    /// The automator fell out of step with the game. Only reset recovers.
    Failed {
        /// The game as it stood when the failure was detected.
        state: GameState,
        /// What went wrong.
        reason: AutomatorDesync,
    },
}

impl SessionState {
    /// True once the session needs a reset.
    pub fn is_failed(&self) -> bool {
        matches!(self, SessionState::Failed { .. })
    }
}

/// A command refused by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// The game refused the command.
    #[display("{}", _0)]
    Illegal(IllegalCommand),
    /// The session is frozen by an automator failure.
    #[display("session failed ({}); reset to continue", _0)]
    Failed(#[error(not(source))] AutomatorDesync),
}

/// The composition root for one game.
#[derive(Debug)]
pub struct GameWithAutomatorsModel {
    game: GameModel,
    animation: BoardAnimationModel,
    automator: AutomatorModel,
    availabilities: AutomationAvailabilities,
    store: Box<dyn GameStateStore>,
    failure: Option<AutomatorDesync>,
    state_tx: watch::Sender<SessionState>,
}

impl GameWithAutomatorsModel {
    /// Builds a session seeded from `store`.
    ///
    /// A store that fails to load is logged and the game starts fresh. If
    /// the side to move is automated, the automator starts right away.
    #[instrument(skip(selector, store), fields(selector = selector.name()))]
    pub fn new(
        selector: Arc<dyn CoordinateSelector>,
        availabilities: AutomationAvailabilities,
        store: Box<dyn GameStateStore>,
    ) -> Self {
        let initial = match store.load() {
            Ok(Some(state)) => state,
            Ok(None) => GameState::initial(),
            Err(error) => {
                warn!(%error, "Failed to load saved game, starting fresh");
                GameState::initial()
            }
        };
        info!(turn = %initial.turn(), "Creating session");

        let game = GameModel::new(initial);
        let (state_tx, _) = watch::channel(SessionState::Playing(game.state().clone()));
        let mut session = Self {
            animation: BoardAnimationModel::new(initial.board()),
            automator: AutomatorModel::new(selector),
            game,
            availabilities,
            store,
            failure: None,
            state_tx,
        };
        session.reconcile();
        session
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        match self.failure {
            Some(reason) => SessionState::Failed {
                state: self.game.game_state(),
                reason,
            },
            None => SessionState::Playing(self.game.state().clone()),
        }
    }

    /// The game.
    pub fn game(&self) -> &GameModel {
        &self.game
    }

    /// The animation of the latest command.
    pub fn animation(&self) -> &BoardAnimationState {
        self.animation.state()
    }

    /// The automator's progress.
    pub fn automator(&self) -> &AutomatorProgressState {
        self.automator.state()
    }

    /// Current automation toggles.
    pub fn availabilities(&self) -> AutomationAvailabilities {
        self.availabilities
    }

    /// Follows the session state, starting with the current value.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Follows the animation, starting with the current value.
    pub fn subscribe_animation(&self) -> watch::Receiver<BoardAnimationState> {
        self.animation.subscribe()
    }

    /// Follows the automator, starting with the current value.
    pub fn subscribe_automator(&self) -> watch::Receiver<AutomatorProgressState> {
        self.automator.subscribe()
    }

    /// Places for the side to move, on behalf of a person.
    ///
    /// # Errors
    ///
    /// Rejected when illegal or while failed.
    #[instrument(skip(self))]
    pub fn place(&mut self, coordinate: Coordinate) -> Result<GameCommandEntry, SessionError> {
        self.ensure_playing()?;
        let entry = self.game.place(coordinate)?;
        self.accepted(&entry);
        Ok(entry)
    }

    /// Passes for the side to move, on behalf of a person.
    ///
    /// # Errors
    ///
    /// Rejected when illegal or while failed.
    #[instrument(skip(self))]
    pub fn pass(&mut self) -> Result<GameCommandEntry, SessionError> {
        self.ensure_playing()?;
        let entry = self.game.pass()?;
        self.accepted(&entry);
        Ok(entry)
    }

    /// Cancels any selection, clears a failure and restarts the game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> GameCommandEntry {
        match self.automator.cancel() {
            Ok(token) => debug!(%token, "Cancelled selection before reset"),
            Err(error) => debug!(%error, "No selection to cancel"),
        }
        if let Some(reason) = self.failure.take() {
            info!(%reason, "Clearing failure");
        }
        let entry = self.game.reset();
        self.accepted(&entry);
        entry
    }

    /// Switches automation for `turn` on or off.
    ///
    /// Switching off the side the automator is choosing for cancels it.
    #[instrument(skip(self))]
    pub fn set_automation(&mut self, turn: Turn, automated: bool) {
        self.availabilities = self.availabilities.with(turn, automated);
        info!(
            first = self.availabilities.first(),
            second = self.availabilities.second(),
            "Automation changed"
        );

        let choosing_for_turn = match self.automator.state() {
            AutomatorProgressState::Working { from, .. } => from.turn() == turn,
            AutomatorProgressState::Sleeping => false,
        };
        if !automated && choosing_for_turn {
            match self.automator.cancel() {
                Ok(token) => debug!(%token, %turn, "Cancelled selection for manual side"),
                Err(error) => warn!(%error, "Selection for manual side was not cancelled"),
            }
        }
        self.reconcile();
    }

    /// Advances the animation by one step.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::NotAnimating`] when idle.
    pub fn mark_animation_as_completed(&mut self) -> Result<&BoardAnimationState, AnimationError> {
        self.animation.mark_animation_as_completed()
    }

    /// Waits for the automator's next answer. Never resolves while it sleeps.
    ///
    /// Cancel safe, so it can sit in a `tokio::select!` next to user input.
    pub async fn next_automator_selection(&mut self) -> AutomatorSelection {
        self.automator.next_selection().await
    }

    /// Feeds an automator answer through the same path as a person's move.
    ///
    /// # Errors
    ///
    /// A stale or rejected answer fails the session and is returned.
    #[instrument(skip(self, selection), fields(token = %selection.token(), coordinate = %selection.candidate().coordinate()))]
    pub fn apply_automator_selection(
        &mut self,
        selection: AutomatorSelection,
    ) -> Result<GameCommandEntry, AutomatorDesync> {
        let coordinate = selection.candidate().coordinate();
        if *selection.from() != self.game.game_state() {
            return Err(self.fail(AutomatorDesync::PositionChanged {
                turn: selection.from().turn(),
                coordinate,
            }));
        }

        match self.game.place(coordinate) {
            Ok(entry) => {
                self.accepted(&entry);
                Ok(entry)
            }
            Err(reason) => Err(self.fail(AutomatorDesync::Rejected { coordinate, reason })),
        }
    }

    /// Waits for the automator and applies its answer.
    ///
    /// # Errors
    ///
    /// See [`GameWithAutomatorsModel::apply_automator_selection`].
    pub async fn run_automator_turn(&mut self) -> Result<GameCommandEntry, AutomatorDesync> {
        let selection = self.next_automator_selection().await;
        self.apply_automator_selection(selection)
    }

    fn ensure_playing(&self) -> Result<(), SessionError> {
        match self.failure {
            Some(reason) => {
                warn!(%reason, "Ignoring command while failed");
                Err(SessionError::Failed(reason))
            }
            None => Ok(()),
        }
    }

    fn fail(&mut self, reason: AutomatorDesync) -> AutomatorDesync {
        warn!(%reason, "Automator out of step with the game");
        self.failure = Some(reason);
        self.publish();
        reason
    }

    fn accepted(&mut self, entry: &GameCommandEntry) {
        self.animation.apply(entry);
        if let Err(error) = self.store.save(&entry.after) {
            warn!(%error, "Failed to save game");
        }
        self.publish();
        self.reconcile();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state());
    }

    /// Starts the automator or passes for an automated side when due.
    fn reconcile(&mut self) {
        if self.failure.is_some() || self.automator.state().is_working() {
            return;
        }

        let GameModelState::Ready { state, candidates } = self.game.state() else {
            return;
        };
        let state = *state;
        if !self.availabilities.is_automated(state.turn()) {
            return;
        }

        match Candidates::try_from(candidates.clone()) {
            Ok(candidates) => {
                debug!(turn = %state.turn(), "Starting automator");
                if let Err(error) = self.automator.run_in_this_turn(state, candidates) {
                    warn!(%error, "Automator did not start");
                }
            }
            Err(_) => {
                debug!(turn = %state.turn(), "Automated side has no move, passing");
                match self.game.pass() {
                    Ok(entry) => self.accepted(&entry),
                    Err(error) => warn!(%error, "Automated pass refused"),
                }
            }
        }
    }
}
