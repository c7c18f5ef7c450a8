//! Strictly Reversi - type-safe reversi rules
//!
//! The rule engine, the authoritative game model and the flip animation
//! sequencer. Nothing here owns a runtime, a timer or a file.
//!
//! # Architecture
//!
//! - **Rules**: [`Board`] searches [`FlippableLine`]s and groups them into
//!   [`AvailableCandidate`]s; [`GameState`] applies them.
//! - **Model**: [`GameModel`] validates commands, publishes
//!   [`GameModelState`] and logs every accepted [`GameCommandEntry`].
//! - **Animation**: [`BoardAnimationModel`] replays one entry as
//!   single-cell steps advanced by the renderer.
//!
//! # Example
//!
//! ```
//! use strictly_reversi::{Coordinate, DiskCount, GameModel, Turn};
//!
//! let mut game = GameModel::default();
//! let f5: Coordinate = "f5".parse().unwrap();
//! game.place(f5).unwrap();
//!
//! assert_eq!(game.game_state().turn(), Turn::Second);
//! assert_eq!(
//!     game.game_state().board().count_disks(),
//!     DiskCount { dark: 4, light: 1 }
//! );
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod animation;
mod board;
mod candidate;
mod coordinate;
mod disk;
mod geometry;
mod line;
mod model;
mod state;

pub use animation::{
    AnimationError, AnimationRequest, BoardAnimationModel, BoardAnimationState, FLIP_PRIORITY,
};
pub use board::{Board, ParseBoardError};
pub use candidate::{AvailableCandidate, Candidates, EmptyCandidates};
pub use coordinate::{
    Coordinate, CoordinateX, CoordinateY, EDGE_LENGTH, NUM_CELLS, ParseCoordinateError,
};
pub use disk::{Disk, DiskCount, GameResult, Turn};
pub use geometry::{DirectedDistance, Direction, Distance, GeometryError, Line};
pub use line::{FlippableLine, LineAvailability, LineContents, UnavailableReason};
pub use model::{
    GameCommand, GameCommandEntry, GameModel, GameModelState, IllegalCommand, Transaction,
};
pub use state::GameState;
