//! Flip animation sequencing.
//!
//! [`BoardAnimationModel`] turns one accepted [`GameCommandEntry`] into a
//! sequence of single-cell steps: first the placed disk, then every flipped
//! disk one at a time. It never advances by itself. The renderer calls
//! [`BoardAnimationModel::mark_animation_as_completed`] when the current
//! step has finished on screen.
//!
//! Flips are read from the accepted command's candidate. The animation
//! never diffs boards or re-runs the rules.

use crate::board::Board;
use crate::coordinate::Coordinate;
use crate::disk::Disk;
use crate::geometry::Direction;
use crate::line::FlippableLine;
use crate::model::{GameCommand, GameCommandEntry, Transaction};
use derive_more::{Display, Error};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Order in which the lines of one placement are flipped.
///
/// Each entry is the direction pointing from the placed disk toward the
/// disks it captures.
pub const FLIP_PRIORITY: [Direction; 8] = [
    Direction::Top,
    Direction::TopRight,
    Direction::Right,
    Direction::BottomRight,
    Direction::Bottom,
    Direction::BottomLeft,
    Direction::Left,
    Direction::TopLeft,
];

/// Where the animation of the current transaction stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BoardAnimationState {
    /// Idle, showing `board`.
    NotAnimating {
        /// The board to display.
        board: Board,
    },
    /// The new disk is being placed.
    Placing {
        /// Placement cell.
        at: Coordinate,
        /// Mover's colour.
        disk: Disk,
        /// Lines still to flip, in [`FLIP_PRIORITY`] order.
        rest_lines: Vec<FlippableLine>,
        /// Boards before and after the command.
        transaction: Transaction,
    },
    /// One captured disk is being flipped.
    Flipping {
        /// Cell being flipped.
        at: Coordinate,
        /// Colour it becomes.
        disk: Disk,
        /// Cells left on the current line, nearest to the placement first.
        rest_coordinates: Vec<Coordinate>,
        /// Lines after the current one.
        rest_lines: Vec<FlippableLine>,
        /// Boards before and after the command.
        transaction: Transaction,
    },
}

impl BoardAnimationState {
    /// What the renderer should show now.
    pub fn request(&self) -> AnimationRequest {
        match self {
            BoardAnimationState::NotAnimating { board } => AnimationRequest::Sync(*board),
            BoardAnimationState::Placing { at, disk, .. } => AnimationRequest::Place {
                at: *at,
                disk: *disk,
            },
            BoardAnimationState::Flipping { at, disk, .. } => AnimationRequest::Flip {
                at: *at,
                disk: *disk,
            },
        }
    }

    /// True unless idle.
    pub fn is_animating(&self) -> bool {
        !matches!(self, BoardAnimationState::NotAnimating { .. })
    }

    /// The board shown once the current animation finishes.
    pub fn settled_board(&self) -> Board {
        match self {
            BoardAnimationState::NotAnimating { board } => *board,
            BoardAnimationState::Placing { transaction, .. }
            | BoardAnimationState::Flipping { transaction, .. } => transaction.end,
        }
    }

    fn after_step(self) -> Self {
        match self {
            BoardAnimationState::NotAnimating { .. } => self,
            BoardAnimationState::Placing {
                disk,
                rest_lines,
                transaction,
                ..
            } => Self::next_line(disk, rest_lines, transaction),
            BoardAnimationState::Flipping {
                disk,
                mut rest_coordinates,
                rest_lines,
                transaction,
                ..
            } => {
                if rest_coordinates.is_empty() {
                    Self::next_line(disk, rest_lines, transaction)
                } else {
                    let at = rest_coordinates.remove(0);
                    BoardAnimationState::Flipping {
                        at,
                        disk,
                        rest_coordinates,
                        rest_lines,
                        transaction,
                    }
                }
            }
        }
    }

    fn next_line(disk: Disk, mut rest_lines: Vec<FlippableLine>, transaction: Transaction) -> Self {
        if rest_lines.is_empty() {
            return BoardAnimationState::NotAnimating {
                board: transaction.end,
            };
        }
        let line = rest_lines.remove(0);
        let mut coordinates = line.coordinates_to_flip();
        coordinates.reverse();
        // A flippable line always has at least one cell between its ends.
        let at = coordinates.remove(0);
        BoardAnimationState::Flipping {
            at,
            disk,
            rest_coordinates: coordinates,
            rest_lines,
            transaction,
        }
    }
}

/// A single instruction for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationRequest {
    /// Show this board immediately.
    Sync(Board),
    /// Animate a new disk appearing.
    Place {
        /// Cell.
        at: Coordinate,
        /// Colour.
        disk: Disk,
    },
    /// Animate an existing disk turning over.
    Flip {
        /// Cell.
        at: Coordinate,
        /// Colour after the flip.
        disk: Disk,
    },
}

/// Step completion arrived with nothing in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum AnimationError {
    /// The model is idle.
    #[display("no animation is in progress")]
    NotAnimating,
}

/// Position in [`FLIP_PRIORITY`] of the direction from the placement toward
/// the line's captured disks.
fn flip_priority(line: &FlippableLine) -> usize {
    let toward_flips = line.line().directed_distance().direction().reversed();
    FLIP_PRIORITY
        .iter()
        .position(|direction| *direction == toward_flips)
        .unwrap_or(FLIP_PRIORITY.len())
}

/// Drives [`BoardAnimationState`] and publishes every change.
#[derive(Debug)]
pub struct BoardAnimationModel {
    state: BoardAnimationState,
    state_tx: watch::Sender<BoardAnimationState>,
}

impl BoardAnimationModel {
    /// Starts idle on `board`.
    #[instrument(skip(board))]
    pub fn new(board: Board) -> Self {
        let state = BoardAnimationState::NotAnimating { board };
        let (state_tx, _) = watch::channel(state.clone());
        Self { state, state_tx }
    }

    /// Current state.
    pub fn state(&self) -> &BoardAnimationState {
        &self.state
    }

    /// Follows the state, starting with the current value.
    pub fn subscribe(&self) -> watch::Receiver<BoardAnimationState> {
        self.state_tx.subscribe()
    }

    /// Starts animating an accepted command.
    ///
    /// A placement received while idle begins with [`BoardAnimationState::Placing`].
    /// Passes, resets and any command arriving mid-animation snap straight
    /// to the command's resulting board.
    #[instrument(skip(self, entry), fields(sequence = entry.sequence))]
    pub fn apply(&mut self, entry: &GameCommandEntry) -> &BoardAnimationState {
        let transaction = entry.transaction();
        let next = match &entry.command {
            GameCommand::Placed { selected, .. } if !self.state.is_animating() => {
                let mut rest_lines = selected.lines().to_vec();
                rest_lines.sort_by_key(flip_priority);
                BoardAnimationState::Placing {
                    at: selected.coordinate(),
                    disk: selected.disk(),
                    rest_lines,
                    transaction,
                }
            }
            _ => {
                if self.state.is_animating() {
                    debug!("Interrupting animation in progress");
                }
                BoardAnimationState::NotAnimating {
                    board: transaction.end,
                }
            }
        };
        self.publish(next)
    }

    /// Advances past the step the renderer just finished.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::NotAnimating`] when idle.
    #[instrument(skip(self))]
    pub fn mark_animation_as_completed(&mut self) -> Result<&BoardAnimationState, AnimationError> {
        if !self.state.is_animating() {
            return Err(AnimationError::NotAnimating);
        }
        let next = self.state.clone().after_step();
        Ok(self.publish(next))
    }

    /// Completes every remaining step at once.
    #[instrument(skip(self))]
    pub fn finish(&mut self) -> &BoardAnimationState {
        let board = self.state.settled_board();
        self.publish(BoardAnimationState::NotAnimating { board })
    }

    fn publish(&mut self, next: BoardAnimationState) -> &BoardAnimationState {
        debug!(request = ?next.request(), "Animation step");
        self.state = next;
        self.state_tx.send_replace(self.state.clone());
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameModel;
    use crate::state::GameState;
    use crate::Turn;
    use strum::IntoEnumIterator;

    fn at(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_flip_priority_covers_each_direction_once() {
        for direction in Direction::iter() {
            assert_eq!(
                FLIP_PRIORITY.iter().filter(|d| **d == direction).count(),
                1,
                "{direction:?}"
            );
        }
        assert_eq!(FLIP_PRIORITY[0], Direction::Top);
        assert_eq!(FLIP_PRIORITY[7], Direction::TopLeft);
    }

    #[test]
    fn test_completion_while_idle_is_an_error() {
        let mut model = BoardAnimationModel::new(Board::initial());
        assert_eq!(
            model.mark_animation_as_completed(),
            Err(AnimationError::NotAnimating)
        );
    }

    #[test]
    fn test_single_flip_sequence() {
        let mut game = GameModel::default();
        let mut animation = BoardAnimationModel::new(Board::initial());
        let entry = game.place(at("f5")).unwrap();

        let state = animation.apply(&entry);
        assert_eq!(
            state.request(),
            AnimationRequest::Place {
                at: at("f5"),
                disk: Disk::Dark
            }
        );

        let state = animation.mark_animation_as_completed().unwrap();
        assert_eq!(
            state.request(),
            AnimationRequest::Flip {
                at: at("e5"),
                disk: Disk::Dark
            }
        );

        let state = animation.mark_animation_as_completed().unwrap();
        assert_eq!(state.request(), AnimationRequest::Sync(game.game_state().board()));
    }

    #[test]
    fn test_pass_syncs_without_animating() {
        let board = Board::empty()
            .with_disk(at("a1"), Some(Disk::Dark))
            .with_disk(at("b1"), Some(Disk::Light));
        let mut game = GameModel::new(GameState::new(board, Turn::Second));
        let mut animation = BoardAnimationModel::new(board);
        let entry = game.pass().unwrap();
        let state = animation.apply(&entry);
        assert_eq!(state, &BoardAnimationState::NotAnimating { board });
    }

    #[test]
    fn test_command_mid_animation_snaps_to_new_board() {
        let mut game = GameModel::default();
        let mut animation = BoardAnimationModel::new(Board::initial());
        animation.apply(&game.place(at("f5")).unwrap());
        assert!(animation.state().is_animating());

        let reset = game.reset();
        let state = animation.apply(&reset);
        assert_eq!(
            state,
            &BoardAnimationState::NotAnimating {
                board: Board::initial()
            }
        );
    }

    #[test]
    fn test_placement_mid_animation_is_not_animated() {
        let mut game = GameModel::default();
        let mut animation = BoardAnimationModel::new(Board::initial());
        animation.apply(&game.place(at("f5")).unwrap());
        let second = game.place(at("f4")).unwrap();
        let state = animation.apply(&second);
        assert_eq!(
            state,
            &BoardAnimationState::NotAnimating {
                board: second.after.board()
            }
        );
    }

    #[test]
    fn test_finish_skips_to_end() {
        let mut game = GameModel::default();
        let mut animation = BoardAnimationModel::new(Board::initial());
        animation.apply(&game.place(at("f5")).unwrap());
        let state = animation.finish();
        assert_eq!(state.request(), AnimationRequest::Sync(game.game_state().board()));
    }

    #[test]
    fn test_subscriber_sees_latest_step() {
        let mut game = GameModel::default();
        let mut animation = BoardAnimationModel::new(Board::initial());
        animation.apply(&game.place(at("f5")).unwrap());
        let receiver = animation.subscribe();
        assert!(matches!(
            &*receiver.borrow(),
            BoardAnimationState::Placing { .. }
        ));
    }
}
