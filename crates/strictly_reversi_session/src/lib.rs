//! Strictly Reversi sessions - automated players around the game model
//!
//! Composes the pure game from `strictly_reversi` with everything that
//! needs a runtime: background move selection, persistence and the
//! terminal driver's configuration.
//!
//! # Architecture
//!
//! - **Selectors**: [`CoordinateSelector`] strategies that pick a move.
//! - **Automator**: [`AutomatorModel`] runs a selector in a cancellable task.
//! - **Session**: [`GameWithAutomatorsModel`] owns the game, animation,
//!   automator and store, and starts or cancels the automator after every
//!   change.
//! - **Persistence**: [`GameStateStore`] implementations.
//!
//! # Example
//!
//! ```no_run
//! use strictly_reversi_session::{
//!     AutomationAvailabilities, GameWithAutomatorsModel, MemoryStore, SelectorKind,
//! };
//! use std::time::Duration;
//!
//! # async fn example() {
//! let mut session = GameWithAutomatorsModel::new(
//!     SelectorKind::Greedy.build(Duration::ZERO),
//!     AutomationAvailabilities::new(true, true),
//!     Box::new(MemoryStore::default()),
//! );
//! while !session.game().state().is_completed() {
//!     session.run_automator_turn().await.unwrap();
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod automator;
mod availability;
mod cli;
mod config;
mod persistence;
mod selector;
mod session;

pub use automator::{
    AutomatorError, AutomatorModel, AutomatorProgressState, AutomatorSelection, CancelToken,
};
pub use availability::AutomationAvailabilities;
pub use cli::{Cli, Command, HELP, Input, ParseInputError, PlayArgs};
pub use config::{ConfigError, SessionConfig};
pub use persistence::{GameStateStore, JsonFileStore, MemoryStore, PersistenceError};
pub use selector::{
    CoordinateSelector, FirstCandidateSelector, GreedySelector, RandomSelector, SelectorKind,
};
pub use session::{AutomatorDesync, GameWithAutomatorsModel, SessionError, SessionState};
