//! Cancellable background move selection.
//!
//! [`AutomatorModel`] runs a [`CoordinateSelector`] in a spawned task and
//! hands its answer back through [`AutomatorModel::next_selection`]. Each
//! run is tagged with a [`CancelToken`]. Cancelling aborts the task and
//! retires the token, so an answer that was already queued for that run is
//! dropped on receipt and never delivered.

use crate::selector::CoordinateSelector;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Serialize;
use std::sync::Arc;
use strictly_reversi::{AvailableCandidate, Candidates, GameState};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Identifies one selection run.
///
/// Only the [`AutomatorModel`] that started a run issues its token, and
/// only that model can cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[display("run#{}", _0)]
pub struct CancelToken(u64);

/// What the automator is doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AutomatorProgressState {
    /// Idle.
    Sleeping,
    /// A selection is in flight.
    Working {
        /// The set being chosen from.
        candidates: Candidates,
        /// Identifies this run.
        token: CancelToken,
        /// The position the candidates were computed on.
        from: GameState,
    },
}

impl AutomatorProgressState {
    /// True while a selection is in flight.
    pub fn is_working(&self) -> bool {
        matches!(self, AutomatorProgressState::Working { .. })
    }
}

/// A delivered choice, together with the position it was made for.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AutomatorSelection {
    /// The run that produced this choice.
    token: CancelToken,
    /// The position the run started from.
    from: GameState,
    /// The chosen move.
    candidate: AvailableCandidate,
}

/// Rejected automator requests. The automator state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum AutomatorError {
    /// A run is already in flight.
    #[display("automator is already working")]
    AlreadyWorking,
    /// Nothing to cancel.
    #[display("automator is sleeping")]
    NotWorking,
}

/// Owns the selector task and publishes [`AutomatorProgressState`].
pub struct AutomatorModel {
    selector: Arc<dyn CoordinateSelector>,
    state: AutomatorProgressState,
    next_run: u64,
    task: Option<JoinHandle<()>>,
    result_tx: mpsc::UnboundedSender<AutomatorSelection>,
    result_rx: mpsc::UnboundedReceiver<AutomatorSelection>,
    state_tx: watch::Sender<AutomatorProgressState>,
}

impl std::fmt::Debug for AutomatorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomatorModel")
            .field("selector", &self.selector.name())
            .field("state", &self.state)
            .field("next_run", &self.next_run)
            .finish_non_exhaustive()
    }
}

impl AutomatorModel {
    /// Creates a sleeping automator around `selector`.
    #[instrument(skip(selector), fields(selector = selector.name()))]
    pub fn new(selector: Arc<dyn CoordinateSelector>) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(AutomatorProgressState::Sleeping);
        Self {
            selector,
            state: AutomatorProgressState::Sleeping,
            next_run: 0,
            task: None,
            result_tx,
            result_rx,
            state_tx,
        }
    }

    /// Current state.
    pub fn state(&self) -> &AutomatorProgressState {
        &self.state
    }

    /// Follows the state, starting with the current value.
    pub fn subscribe(&self) -> watch::Receiver<AutomatorProgressState> {
        self.state_tx.subscribe()
    }

    /// Starts choosing among `candidates`, computed on `from`.
    ///
    /// # Errors
    ///
    /// Returns [`AutomatorError::AlreadyWorking`] while a run is in flight.
    #[instrument(skip(self, from, candidates), fields(turn = %from.turn(), count = candidates.len()))]
    pub fn run_in_this_turn(
        &mut self,
        from: GameState,
        candidates: Candidates,
    ) -> Result<CancelToken, AutomatorError> {
        if self.state.is_working() {
            warn!("Automator asked to run while working");
            return Err(AutomatorError::AlreadyWorking);
        }

        let token = CancelToken(self.next_run);
        self.next_run += 1;

        let selector = Arc::clone(&self.selector);
        let result_tx = self.result_tx.clone();
        let task_candidates = candidates.clone();
        self.task = Some(tokio::spawn(async move {
            let candidate = selector.select(task_candidates).await;
            let selection = AutomatorSelection {
                token,
                from,
                candidate,
            };
            if result_tx.send(selection).is_err() {
                debug!(%token, "Automator dropped before delivery");
            }
        }));

        info!(%token, "Automator started");
        self.publish(AutomatorProgressState::Working {
            candidates,
            token,
            from,
        });
        Ok(token)
    }

    /// Abandons the run in flight. Its answer will never be delivered.
    ///
    /// # Errors
    ///
    /// Returns [`AutomatorError::NotWorking`] when sleeping.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) -> Result<CancelToken, AutomatorError> {
        let &AutomatorProgressState::Working { token, .. } = &self.state else {
            debug!("Ignoring cancel while sleeping");
            return Err(AutomatorError::NotWorking);
        };

        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!(%token, "Automator cancelled");
        self.publish(AutomatorProgressState::Sleeping);
        Ok(token)
    }

    /// Waits for the current run to answer.
    ///
    /// Answers from cancelled runs are discarded. While sleeping this
    /// never resolves. Cancel safe: dropping the future loses nothing.
    pub async fn next_selection(&mut self) -> AutomatorSelection {
        loop {
            let Some(selection) = self.result_rx.recv().await else {
                // The model holds a sender, so the channel stays open.
                std::future::pending::<()>().await;
                continue;
            };

            match &self.state {
                AutomatorProgressState::Working { token, .. } if *token == selection.token => {
                    self.task = None;
                    info!(
                        token = %selection.token,
                        coordinate = %selection.candidate.coordinate(),
                        "Automator selected"
                    );
                    self.publish(AutomatorProgressState::Sleeping);
                    return selection;
                }
                _ => debug!(token = %selection.token, "Discarding stale selection"),
            }
        }
    }

    fn publish(&mut self, next: AutomatorProgressState) {
        debug!(working = next.is_working(), "Automator state");
        self.state = next;
        self.state_tx.send_replace(self.state.clone());
    }
}

impl Drop for AutomatorModel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::FirstCandidateSelector;
    use std::time::Duration;

    fn opening() -> (GameState, Candidates) {
        let state = GameState::initial();
        let candidates = Candidates::try_from(state.candidates()).unwrap();
        (state, candidates)
    }

    #[tokio::test]
    async fn test_run_delivers_and_sleeps() {
        let mut automator = AutomatorModel::new(Arc::new(FirstCandidateSelector::default()));
        let (state, candidates) = opening();
        let token = automator.run_in_this_turn(state, candidates).unwrap();
        assert!(automator.state().is_working());

        let selection = automator.next_selection().await;
        assert_eq!(*selection.token(), token);
        assert_eq!(*selection.from(), state);
        assert_eq!(selection.candidate().coordinate().to_string(), "d3");
        assert_eq!(automator.state(), &AutomatorProgressState::Sleeping);
    }

    #[tokio::test]
    async fn test_second_run_while_working_is_rejected() {
        let selector = FirstCandidateSelector::new(Duration::from_secs(60));
        let mut automator = AutomatorModel::new(Arc::new(selector));
        let (state, candidates) = opening();
        automator.run_in_this_turn(state, candidates.clone()).unwrap();
        assert_eq!(
            automator.run_in_this_turn(state, candidates),
            Err(AutomatorError::AlreadyWorking)
        );
    }

    #[tokio::test]
    async fn test_cancel_while_sleeping_is_ignored() {
        let mut automator = AutomatorModel::new(Arc::new(FirstCandidateSelector::default()));
        assert_eq!(automator.cancel(), Err(AutomatorError::NotWorking));
        assert_eq!(automator.state(), &AutomatorProgressState::Sleeping);
    }

    #[tokio::test]
    async fn test_subscriber_sees_working_then_sleeping() {
        let mut automator = AutomatorModel::new(Arc::new(FirstCandidateSelector::default()));
        let mut states = automator.subscribe();
        let (state, candidates) = opening();
        let token = automator.run_in_this_turn(state, candidates).unwrap();
        assert!(matches!(
            &*states.borrow_and_update(),
            AutomatorProgressState::Working { token: t, .. } if *t == token
        ));
        automator.cancel().unwrap();
        assert!(states.has_changed().unwrap());
        assert_eq!(
            *states.borrow_and_update(),
            AutomatorProgressState::Sleeping
        );
    }
}
