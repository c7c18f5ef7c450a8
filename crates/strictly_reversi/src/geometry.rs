//! Directions, distances and straight lines on the board.

use crate::coordinate::{Coordinate, EDGE_LENGTH};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// One of the eight compass directions. Row numbers grow toward `Bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum Direction {
    /// Decreasing row.
    Top,
    /// Decreasing row, increasing column.
    TopRight,
    /// Increasing column.
    Right,
    /// Increasing row and column.
    BottomRight,
    /// Increasing row.
    Bottom,
    /// Increasing row, decreasing column.
    BottomLeft,
    /// Decreasing column.
    Left,
    /// Decreasing row and column.
    TopLeft,
}

impl Direction {
    /// Column and row step for one unit of distance.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
        }
    }

    /// The direction pointing the other way.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::TopRight => Direction::BottomLeft,
            Direction::Right => Direction::Left,
            Direction::BottomRight => Direction::TopLeft,
            Direction::Bottom => Direction::Top,
            Direction::BottomLeft => Direction::TopRight,
            Direction::Left => Direction::Right,
            Direction::TopLeft => Direction::BottomRight,
        }
    }
}

/// Deserialized geometry that the checked constructors refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GeometryError {
    /// The distance is outside `1..=7`.
    #[display("distance {_0} is outside 1..=7")]
    DistanceOutOfRange(#[error(not(source))] u8),
    /// Walking the distance from the start leaves the board.
    #[display("line from {start} leaves the board")]
    LineLeavesBoard {
        /// First cell of the rejected line.
        start: Coordinate,
    },
    /// The stored end is not where the walk from the start lands.
    #[display("line from {start} ends at {actual}, not {claimed}")]
    EndMismatch {
        /// First cell of the rejected line.
        start: Coordinate,
        /// End carried by the input.
        claimed: Coordinate,
        /// End the walk actually reaches.
        actual: Coordinate,
    },
}

/// A number of steps across the board, `1..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct Distance(u8);

impl Distance {
    /// Shortest distance.
    pub const MIN: Distance = Distance(1);
    /// Longest distance that still fits on the board.
    pub const MAX: Distance = Distance(EDGE_LENGTH - 1);
    /// Shortest distance leaving a cell between the two ends.
    pub const SHORTEST_FLIPPABLE: Distance = Distance(2);

    /// Creates a distance when `value` is within `1..=7`.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&value)
            .then_some(Self(value))
    }

    /// Number of steps.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Distance> for u8 {
    fn from(distance: Distance) -> Self {
        distance.0
    }
}

impl TryFrom<u8> for Distance {
    type Error = GeometryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(GeometryError::DistanceOutOfRange(value))
    }
}

/// A direction together with how far to travel in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedDistance {
    direction: Direction,
    distance: Distance,
}

impl DirectedDistance {
    /// Creates a directed distance.
    pub fn new(direction: Direction, distance: Distance) -> Self {
        Self {
            direction,
            distance,
        }
    }

    /// Direction of travel.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of steps.
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// One step shorter. `None` below the minimum distance.
    pub fn shortened(&self) -> Option<Self> {
        Distance::new(self.distance.0 - 1).map(|distance| Self::new(self.direction, distance))
    }

    /// One step longer. `None` beyond the maximum distance.
    pub fn extended(&self) -> Option<Self> {
        Distance::new(self.distance.0 + 1).map(|distance| Self::new(self.direction, distance))
    }
}

/// A straight run of cells from `start` to `end` inclusive.
///
/// Construction fails when the end would fall off the board, so every
/// `Line` value lies entirely on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "LineFields")]
pub struct Line {
    start: Coordinate,
    end: Coordinate,
    directed_distance: DirectedDistance,
}

/// Wire shape of a [`Line`] before its end is checked.
#[derive(Deserialize)]
struct LineFields {
    start: Coordinate,
    end: Coordinate,
    directed_distance: DirectedDistance,
}

impl TryFrom<LineFields> for Line {
    type Error = GeometryError;

    fn try_from(fields: LineFields) -> Result<Self, Self::Error> {
        let line = Self::new(fields.start, fields.directed_distance).ok_or(
            GeometryError::LineLeavesBoard {
                start: fields.start,
            },
        )?;
        if line.end != fields.end {
            return Err(GeometryError::EndMismatch {
                start: fields.start,
                claimed: fields.end,
                actual: line.end,
            });
        }
        Ok(line)
    }
}

impl Line {
    /// Creates the line walking `directed_distance` from `start`.
    pub fn new(start: Coordinate, directed_distance: DirectedDistance) -> Option<Self> {
        let (dx, dy) = directed_distance.direction.delta();
        let steps = directed_distance.distance.0 as i8;
        let end = start.offset(dx * steps, dy * steps)?;
        Some(Self {
            start,
            end,
            directed_distance,
        })
    }

    /// First cell.
    pub fn start(&self) -> Coordinate {
        self.start
    }

    /// Last cell.
    pub fn end(&self) -> Coordinate {
        self.end
    }

    /// Direction and length.
    pub fn directed_distance(&self) -> DirectedDistance {
        self.directed_distance
    }

    /// Number of cells including both ends.
    pub fn len(&self) -> usize {
        self.directed_distance.distance.0 as usize + 1
    }

    /// A line always holds at least two cells.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The line grown by one cell, if it still fits on the board.
    pub fn extended(&self) -> Option<Self> {
        Self::new(self.start, self.directed_distance.extended()?)
    }

    /// The line shrunk by one cell, if it keeps a positive length.
    pub fn shortened(&self) -> Option<Self> {
        Self::new(self.start, self.directed_distance.shortened()?)
    }

    /// Cells from start to end, in that order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let (dx, dy) = self.directed_distance.direction.delta();
        (0..self.len() as i8).filter_map(move |step| self.start.offset(dx * step, dy * step))
    }
}
