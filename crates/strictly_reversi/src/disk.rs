//! Disks, turns and final results.

use serde::{Deserialize, Serialize};
use strum::EnumIter;
use tracing::instrument;

/// A disk placed on the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Disk {
    /// Dark disk, played by the first side.
    #[display("dark")]
    Dark,
    /// Light disk, played by the second side.
    #[display("light")]
    Light,
}

impl Disk {
    /// Returns the other colour.
    pub fn flipped(self) -> Self {
        match self {
            Disk::Dark => Disk::Light,
            Disk::Light => Disk::Dark,
        }
    }

    /// Character used by the board text form.
    pub fn symbol(self) -> char {
        match self {
            Disk::Dark => 'x',
            Disk::Light => 'o',
        }
    }

    /// Parses a board text symbol. `.` is not a disk and yields `None`.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'x' | 'X' => Some(Disk::Dark),
            'o' | 'O' => Some(Disk::Light),
            _ => None,
        }
    }
}

/// Whose move it is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    /// The side playing dark. Moves first.
    #[default]
    #[display("first")]
    First,
    /// The side playing light.
    #[display("second")]
    Second,
}

impl Turn {
    /// The disk colour this side places.
    pub fn disk(self) -> Disk {
        match self {
            Turn::First => Disk::Dark,
            Turn::Second => Disk::Light,
        }
    }

    /// The side that moves after this one.
    pub fn next(self) -> Self {
        match self {
            Turn::First => Turn::Second,
            Turn::Second => Turn::First,
        }
    }
}

impl From<Disk> for Turn {
    fn from(disk: Disk) -> Self {
        match disk {
            Disk::Dark => Turn::First,
            Disk::Light => Turn::Second,
        }
    }
}

/// Number of disks of each colour on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(derive_more::Display)]
#[display("dark={} light={}", dark, light)]
pub struct DiskCount {
    /// Dark disks on the board.
    pub dark: u8,
    /// Light disks on the board.
    pub light: u8,
}

impl DiskCount {
    /// Count for one colour.
    pub fn of(&self, disk: Disk) -> u8 {
        match disk {
            Disk::Dark => self.dark,
            Disk::Light => self.light,
        }
    }

    /// Decides the winner by strict majority.
    #[instrument]
    pub fn result(&self) -> GameResult {
        if self.dark > self.light {
            GameResult::Win(Turn::First)
        } else if self.light > self.dark {
            GameResult::Win(Turn::Second)
        } else {
            GameResult::Draw
        }
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum GameResult {
    /// One side holds strictly more disks.
    #[display("{} wins", _0)]
    Win(Turn),
    /// Both sides hold the same number of disks.
    #[display("draw")]
    Draw,
}

impl GameResult {
    /// The winning side, if any.
    pub fn winner(&self) -> Option<Turn> {
        match self {
            GameResult::Win(turn) => Some(*turn),
            GameResult::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_flipped_is_involution() {
        assert_eq!(Disk::Dark.flipped(), Disk::Light);
        assert_eq!(Disk::Dark.flipped().flipped(), Disk::Dark);
    }

    #[test]
    fn test_turn_maps_to_disk() {
        assert_eq!(Turn::First.disk(), Disk::Dark);
        assert_eq!(Turn::Second.disk(), Disk::Light);
        assert_eq!(Turn::First.next(), Turn::Second);
        assert_eq!(Turn::from(Disk::Light), Turn::Second);
    }

    #[test]
    fn test_count_result_by_strict_majority() {
        let count = DiskCount { dark: 40, light: 24 };
        assert_eq!(count.result(), GameResult::Win(Turn::First));

        let count = DiskCount { dark: 10, light: 11 };
        assert_eq!(count.result().winner(), Some(Turn::Second));

        let count = DiskCount { dark: 32, light: 32 };
        assert_eq!(count.result(), GameResult::Draw);
    }
}
