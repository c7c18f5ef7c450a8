//! Saved games.
//!
//! The session seeds itself from [`GameStateStore::load`] and mirrors every
//! accepted command with [`GameStateStore::save`]. Store failures are
//! logged by the session and never stop play.

use derive_more::{Display, Error};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use strictly_reversi::GameState;
use tracing::{debug, info, instrument};

/// Somewhere a [`GameState`] can be kept between sessions.
pub trait GameStateStore: Send + Debug {
    /// The saved state, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<GameState>, PersistenceError>;

    /// Replaces the saved state.
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError>;
}

/// Keeps the state in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<GameState>>>,
}

impl MemoryStore {
    /// A store already holding `state`.
    #[instrument]
    pub fn with_state(state: GameState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
        }
    }
}

impl GameStateStore for MemoryStore {
    fn load(&self) -> Result<Option<GameState>, PersistenceError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| PersistenceError::new(format!("Memory store poisoned: {}", e)))?;
        Ok(*slot)
    }

    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| PersistenceError::new(format!("Memory store poisoned: {}", e)))?;
        *slot = Some(*state);
        Ok(())
    }
}

/// Keeps the state as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store backed by `path`. The file is created on first save.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameStateStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<GameState>, PersistenceError> {
        if !self.path.exists() {
            debug!("No saved game");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| PersistenceError::new(format!("Failed to read save file: {}", e)))?;
        let state: GameState = serde_json::from_str(&content)
            .map_err(|e| PersistenceError::new(format!("Failed to parse save file: {}", e)))?;

        info!(turn = %state.turn(), "Loaded saved game");
        Ok(Some(state))
    }

    #[instrument(skip(self, state), fields(path = %self.path.display()))]
    fn save(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| PersistenceError::new(format!("Failed to encode game: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| PersistenceError::new(format!("Failed to write save file: {}", e)))?;
        debug!("Saved game");
        Ok(())
    }
}

/// Persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Persistence error: {} at {}:{}", message, file, line)]
pub struct PersistenceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PersistenceError {
    /// Creates a new persistence error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_slot() {
        let mut store = MemoryStore::default();
        let observer = store.clone();
        assert_eq!(observer.load().unwrap(), None);

        let state = GameState::initial().pass_unchecked();
        store.save(&state).unwrap();
        assert_eq!(observer.load().unwrap(), Some(state));
    }

    #[test]
    fn test_error_records_caller() {
        let error = PersistenceError::new("boom");
        assert_eq!(error.file, file!());
        assert!(error.to_string().starts_with("Persistence error: boom at "));
    }
}
