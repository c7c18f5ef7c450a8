//! Session configuration.

use crate::availability::AutomationAvailabilities;
use crate::selector::{CoordinateSelector, SelectorKind};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Settings for one terminal session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct SessionConfig {
    /// The first (dark) side is played by the automator.
    #[serde(default)]
    first_automated: bool,

    /// The second (light) side is played by the automator.
    #[serde(default = "default_second_automated")]
    second_automated: bool,

    /// Strategy used by automated sides.
    #[serde(default)]
    selector: SelectorKind,

    /// Artificial delay before each automated move, in milliseconds.
    #[serde(default = "default_think_millis")]
    think_millis: u64,

    /// JSON file mirroring the game. Kept in memory when absent.
    #[serde(default)]
    save_path: Option<PathBuf>,
}

#[instrument]
fn default_second_automated() -> bool {
    true
}

#[instrument]
fn default_think_millis() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            first_automated: false,
            second_automated: default_second_automated(),
            selector: SelectorKind::default(),
            think_millis: default_think_millis(),
            save_path: None,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(selector = %config.selector, "Config loaded successfully");
        Ok(config)
    }

    /// Automation toggles described by this config.
    pub fn availabilities(&self) -> AutomationAvailabilities {
        AutomationAvailabilities::new(self.first_automated, self.second_automated)
    }

    /// Builds the configured selector.
    #[instrument(skip(self), fields(selector = %self.selector, think_millis = self.think_millis))]
    pub fn build_selector(&self) -> Arc<dyn CoordinateSelector> {
        self.selector
            .build(Duration::from_millis(self.think_millis))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
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
    use std::io::Write;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: SessionConfig = toml::from_str("first_automated = true").unwrap();
        assert!(*config.first_automated());
        assert!(*config.second_automated());
        assert_eq!(*config.selector(), SelectorKind::Greedy);
        assert_eq!(*config.think_millis(), 300);
        assert_eq!(config.save_path(), &None);
    }

    #[test]
    fn test_empty_file_matches_default() {
        let config: SessionConfig = toml::from_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_from_file_reads_every_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
first_automated = true
second_automated = false
selector = "random"
think_millis = 0
save_path = "game.json"
"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config,
            SessionConfig::new(
                true,
                false,
                SelectorKind::Random,
                0,
                Some(PathBuf::from("game.json"))
            )
        );
        assert!(config.availabilities().is_automated(strictly_reversi::Turn::First));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "selector = \"minimax\"").unwrap();
        let error = SessionConfig::from_file(file.path()).unwrap_err();
        assert!(error.message.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let error = SessionConfig::from_file("/nonexistent/strictly_reversi.toml").unwrap_err();
        assert!(error.message.starts_with("Failed to read config file"));
    }
}
