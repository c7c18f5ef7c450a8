//! Reading lines off a board and proving them flippable.

use crate::board::Board;
use crate::coordinate::Coordinate;
use crate::disk::{Disk, Turn};
use crate::geometry::Line;
use serde::Serialize;

/// The cells of a [`Line`] paired with their contents on one board snapshot.
///
/// Entries run from the line's start to its end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineContents {
    line: Line,
    disks: Vec<Option<Disk>>,
}

impl LineContents {
    /// Reads `line` off `board`, start to end.
    pub fn read(board: &Board, line: Line) -> Self {
        let disks = line.coordinates().map(|c| board.disk_at(c)).collect();
        Self { line, disks }
    }

    /// The line these contents were read along.
    pub fn line(&self) -> Line {
        self.line
    }

    /// Disks from start to end.
    pub fn disks(&self) -> &[Option<Disk>] {
        &self.disks
    }

    /// `(coordinate, disk)` pairs from start to end.
    pub fn entries(&self) -> impl Iterator<Item = (Coordinate, Option<Disk>)> + '_ {
        self.line.coordinates().zip(self.disks.iter().copied())
    }

    fn between(&self) -> &[Option<Disk>] {
        match self.disks.len() {
            0..=2 => &[],
            n => &self.disks[1..n - 1],
        }
    }
}

/// Why a line cannot be flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum UnavailableReason {
    /// Fewer than three cells, so nothing could sit between the ends.
    #[display("line is too short")]
    LineIsTooShort,
    /// The start does not hold the mover's disk.
    #[display("start is not the mover's colour")]
    StartIsNotSameColor,
    /// Some cell between the ends is empty or holds the mover's disk.
    #[display("between cells include an empty cell or the mover's colour")]
    DisksOnLineIncludingEmptyOrSameColor,
    /// The far end is occupied.
    #[display("end is not empty")]
    EndIsNotEmpty,
}

/// Result of classifying a [`LineContents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAvailability {
    /// Placing at the end flips every cell between.
    Available(FlippableLine),
    /// The line cannot be played.
    Unavailable(UnavailableReason),
}

/// A line proven to capture: the mover's disk at the start, an empty end,
/// and one or more opponent disks strictly between.
///
/// Only [`FlippableLine::validate`] creates values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FlippableLine {
    contents: LineContents,
    disk: Disk,
}

impl FlippableLine {
    /// Classifies `contents` for the side to move.
    ///
    /// Checks run in a fixed order: length, start colour, the cells between,
    /// then the far end.
    pub fn validate(contents: LineContents, turn: Turn) -> LineAvailability {
        let disk = turn.disk();
        let opponent = disk.flipped();

        if contents.disks.len() < 3 {
            return LineAvailability::Unavailable(UnavailableReason::LineIsTooShort);
        }
        if contents.disks.first().copied().flatten() != Some(disk) {
            return LineAvailability::Unavailable(UnavailableReason::StartIsNotSameColor);
        }
        if contents.between().iter().any(|d| *d != Some(opponent)) {
            return LineAvailability::Unavailable(
                UnavailableReason::DisksOnLineIncludingEmptyOrSameColor,
            );
        }
        if contents.disks.last().copied().flatten().is_some() {
            return LineAvailability::Unavailable(UnavailableReason::EndIsNotEmpty);
        }

        LineAvailability::Available(Self { contents, disk })
    }

    /// The validated contents.
    pub fn contents(&self) -> &LineContents {
        &self.contents
    }

    /// The underlying line.
    pub fn line(&self) -> Line {
        self.contents.line
    }

    /// Colour of the mover.
    pub fn disk(&self) -> Disk {
        self.disk
    }

    /// Where the new disk goes: the line's end.
    pub fn coordinate_to_place(&self) -> Coordinate {
        self.contents.line.end()
    }

    /// Cells that change colour, start to end.
    pub fn coordinates_to_flip(&self) -> Vec<Coordinate> {
        let count = self.contents.disks.len() - 2;
        self.contents.line.coordinates().skip(1).take(count).collect()
    }
}
