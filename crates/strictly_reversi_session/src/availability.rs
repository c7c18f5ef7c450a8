//! Which sides are played by the automator.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_reversi::Turn;

/// Per-side automation toggles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Getters, Serialize, Deserialize, new,
)]
pub struct AutomationAvailabilities {
    /// The first (dark) side is automated.
    first: bool,
    /// The second (light) side is automated.
    second: bool,
}

impl AutomationAvailabilities {
    /// Whether `turn` is played by the automator.
    pub fn is_automated(&self, turn: Turn) -> bool {
        match turn {
            Turn::First => self.first,
            Turn::Second => self.second,
        }
    }

    /// A copy with `turn` switched on or off.
    pub fn with(self, turn: Turn, automated: bool) -> Self {
        match turn {
            Turn::First => Self {
                first: automated,
                ..self
            },
            Turn::Second => Self {
                second: automated,
                ..self
            },
        }
    }
}
