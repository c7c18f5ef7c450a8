//! Legal moves as produced by the rule engine.

use crate::coordinate::Coordinate;
use crate::disk::Disk;
use crate::line::FlippableLine;
use derive_more::{Display, Error};
use serde::Serialize;

/// A legal placement together with every line it flips.
///
/// Only the board search creates candidates, so a candidate always carries
/// at least one [`FlippableLine`] ending on its coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AvailableCandidate {
    coordinate: Coordinate,
    lines: Vec<FlippableLine>,
}

impl AvailableCandidate {
    pub(crate) fn new(coordinate: Coordinate, lines: Vec<FlippableLine>) -> Self {
        debug_assert!(!lines.is_empty());
        debug_assert!(lines.iter().all(|l| l.coordinate_to_place() == coordinate));
        Self { coordinate, lines }
    }

    /// Where the disk goes.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Lines flipped by this placement, in search order.
    pub fn lines(&self) -> &[FlippableLine] {
        &self.lines
    }

    /// Colour being placed.
    pub fn disk(&self) -> Disk {
        self.lines[0].disk()
    }

    /// Every cell that changes colour, line by line.
    pub fn coordinates_to_flip(&self) -> Vec<Coordinate> {
        self.lines
            .iter()
            .flat_map(FlippableLine::coordinates_to_flip)
            .collect()
    }

    /// Number of disks flipped.
    pub fn flip_count(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.coordinates_to_flip().len())
            .sum()
    }
}

/// Returned when building [`Candidates`] from an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("candidate set is empty")]
pub struct EmptyCandidates;

/// A non-empty set of candidates for one turn, in coordinate order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidates(Vec<AvailableCandidate>);

impl Candidates {
    /// The first candidate in coordinate order.
    pub fn first(&self) -> &AvailableCandidate {
        &self.0[0]
    }

    /// All candidates.
    pub fn as_slice(&self) -> &[AvailableCandidate] {
        &self.0
    }

    /// Number of candidates. Never zero.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Finds the candidate placing at `coordinate`.
    pub fn get(&self, coordinate: Coordinate) -> Option<&AvailableCandidate> {
        self.0.iter().find(|c| c.coordinate == coordinate)
    }

    /// Coordinates in order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.0.iter().map(AvailableCandidate::coordinate).collect()
    }

    /// Iterates over the candidates.
    pub fn iter(&self) -> std::slice::Iter<'_, AvailableCandidate> {
        self.0.iter()
    }
}

impl TryFrom<Vec<AvailableCandidate>> for Candidates {
    type Error = EmptyCandidates;

    fn try_from(candidates: Vec<AvailableCandidate>) -> Result<Self, Self::Error> {
        if candidates.is_empty() {
            Err(EmptyCandidates)
        } else {
            Ok(Self(candidates))
        }
    }
}

impl<'a> IntoIterator for &'a Candidates {
    type Item = &'a AvailableCandidate;
    type IntoIter = std::slice::Iter<'a, AvailableCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
