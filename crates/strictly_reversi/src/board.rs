//! The 8×8 board and the legal-move search.
//!
//! A [`Board`] is an immutable value. Every operation that changes disks
//! returns a new board.

use crate::candidate::AvailableCandidate;
use crate::coordinate::{Coordinate, CoordinateX, CoordinateY, EDGE_LENGTH, NUM_CELLS};
use crate::disk::{Disk, DiskCount, GameResult, Turn};
use crate::geometry::{DirectedDistance, Direction, Distance, Line};
use crate::line::{FlippableLine, LineAvailability, LineContents, UnavailableReason};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{instrument, trace};

/// An 8×8 grid of optional disks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board {
    cells: [Option<Disk>; NUM_CELLS],
}

impl Board {
    /// A board with no disks.
    pub const fn empty() -> Self {
        Self {
            cells: [None; NUM_CELLS],
        }
    }

    /// The standard opening: light on d4 and e5, dark on e4 and d5.
    pub fn initial() -> Self {
        const OPENING: [(Coordinate, Disk); 4] = [
            (Coordinate::new(CoordinateX::D, CoordinateY::Four), Disk::Light),
            (Coordinate::new(CoordinateX::E, CoordinateY::Five), Disk::Light),
            (Coordinate::new(CoordinateX::E, CoordinateY::Four), Disk::Dark),
            (Coordinate::new(CoordinateX::D, CoordinateY::Five), Disk::Dark),
        ];
        OPENING
            .iter()
            .fold(Self::empty(), |board, (coordinate, disk)| {
                board.with_disk(*coordinate, Some(*disk))
            })
    }

    /// The disk at `coordinate`, if any.
    pub fn disk_at(&self, coordinate: Coordinate) -> Option<Disk> {
        self.cells[coordinate.index()]
    }

    /// A copy with one cell replaced.
    pub fn with_disk(&self, coordinate: Coordinate, disk: Option<Disk>) -> Self {
        let mut cells = self.cells;
        cells[coordinate.index()] = disk;
        Self { cells }
    }

    /// Reads `line` off this board.
    pub fn contents_of(&self, line: Line) -> LineContents {
        LineContents::read(self, line)
    }

    /// Every flippable line for `turn`.
    ///
    /// Starts from each cell holding the mover's disk and grows a line in
    /// each direction from distance 2. A line whose far end is occupied may
    /// still become flippable further out, so growth continues; a line with
    /// a broken run between the ends never can, so that direction stops.
    ///
    /// # Panics
    ///
    /// Panics if a line built by this search classifies as too short or as
    /// starting on the wrong colour. Both are excluded by construction.
    #[instrument(skip(self))]
    pub fn available_lines(&self, turn: Turn) -> Vec<FlippableLine> {
        let mut lines = Vec::new();
        let starts = Coordinate::all().filter(|c| self.disk_at(*c) == Some(turn.disk()));

        for start in starts {
            for direction in Direction::iter() {
                let shortest = DirectedDistance::new(direction, Distance::SHORTEST_FLIPPABLE);
                let mut next = Line::new(start, shortest);

                while let Some(line) = next {
                    match FlippableLine::validate(self.contents_of(line), turn) {
                        LineAvailability::Available(flippable) => lines.push(flippable),
                        LineAvailability::Unavailable(UnavailableReason::EndIsNotEmpty) => {}
                        LineAvailability::Unavailable(
                            UnavailableReason::DisksOnLineIncludingEmptyOrSameColor,
                        ) => break,
                        LineAvailability::Unavailable(
                            reason @ (UnavailableReason::LineIsTooShort
                            | UnavailableReason::StartIsNotSameColor),
                        ) => {
                            panic!("line search reached an impossible classification ({reason}) on {line:?}")
                        }
                    }
                    next = line.extended();
                }
            }
        }

        trace!(count = lines.len(), %turn, "Found flippable lines");
        lines
    }

    /// Legal moves for `turn`, one per placeable cell, in coordinate order.
    #[instrument(skip(self))]
    pub fn available_candidates(&self, turn: Turn) -> Vec<AvailableCandidate> {
        let mut by_coordinate: BTreeMap<Coordinate, Vec<FlippableLine>> = BTreeMap::new();
        for line in self.available_lines(turn) {
            by_coordinate
                .entry(line.coordinate_to_place())
                .or_default()
                .push(line);
        }
        by_coordinate
            .into_iter()
            .map(|(coordinate, lines)| AvailableCandidate::new(coordinate, lines))
            .collect()
    }

    /// Distinct cells `turn` may place on, in coordinate order.
    pub fn available_coordinates(&self, turn: Turn) -> Vec<Coordinate> {
        self.available_candidates(turn)
            .iter()
            .map(|candidate| candidate.coordinate())
            .collect()
    }

    /// Sets every cell of `line` to `disk`: the placement, every cell
    /// between and the start.
    ///
    /// Does not check the line against this board. Callers pass lines that
    /// were validated on this same board.
    pub fn replaced_unchecked(&self, disk: Disk, line: &Line) -> Self {
        line.coordinates()
            .fold(*self, |board, coordinate| board.with_disk(coordinate, Some(disk)))
    }

    /// Disks of each colour.
    pub fn count_disks(&self) -> DiskCount {
        self.cells
            .iter()
            .flatten()
            .fold(DiskCount::default(), |mut count, disk| {
                match disk {
                    Disk::Dark => count.dark += 1,
                    Disk::Light => count.light += 1,
                }
                count
            })
    }

    /// The result once neither side can place; `None` while play continues.
    #[instrument(skip(self))]
    pub fn game_result(&self) -> Option<GameResult> {
        let blocked = Turn::iter().all(|turn| self.available_lines(turn).is_empty());
        blocked.then(|| self.count_disks().result())
    }

    fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.chunks(EDGE_LENGTH as usize).map(|row| {
            row.iter()
                .map(|cell| cell.map_or('.', Disk::symbol))
                .collect()
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", String::from(*self))
    }
}

/// Eight rows of `.`, `x` (dark) and `o` (light). The alternate form
/// (`{:#}`) adds column letters and row numbers.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "  a b c d e f g h")?;
            for (number, row) in self.rows().enumerate() {
                write!(f, "\n{} ", number + 1)?;
                let spaced: Vec<String> = row.chars().map(String::from).collect();
                write!(f, "{}", spaced.join(" "))?;
            }
            Ok(())
        } else {
            let rows: Vec<String> = self.rows().collect();
            write!(f, "{}", rows.join("\n"))
        }
    }
}

/// Error parsing a board from text.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ParseBoardError {
    /// A character other than `.`, `x`, `o`, whitespace or `/`.
    #[display("unexpected board character {:?}", _0)]
    UnexpectedCharacter(#[error(not(source))] char),
    /// The text did not hold exactly 64 cells.
    #[display("expected 64 cells, found {}", _0)]
    WrongCellCount(#[error(not(source))] usize),
}

/// Parses 64 cells of `.`, `x` and `o`, ignoring whitespace and `/`.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/')
            .map(|c| match c {
                '.' | '-' => Ok(None),
                other => Disk::from_symbol(other)
                    .map(Some)
                    .ok_or(ParseBoardError::UnexpectedCharacter(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cells: [Option<Disk>; NUM_CELLS] = cells
            .try_into()
            .map_err(|cells: Vec<_>| ParseBoardError::WrongCellCount(cells.len()))?;
        Ok(Self { cells })
    }
}

/// Compact form: rows joined by `/`.
impl From<Board> for String {
    fn from(board: Board) -> Self {
        board.rows().collect::<Vec<_>>().join("/")
    }
}

impl TryFrom<String> for Board {
    type Error = ParseBoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_initial_board_is_center_cross() {
        let board = Board::initial();
        assert_eq!(board.disk_at(at("d4")), Some(Disk::Light));
        assert_eq!(board.disk_at(at("e5")), Some(Disk::Light));
        assert_eq!(board.disk_at(at("e4")), Some(Disk::Dark));
        assert_eq!(board.disk_at(at("d5")), Some(Disk::Dark));
        assert_eq!(board.count_disks(), DiskCount { dark: 2, light: 2 });
    }

    #[test]
    fn test_initial_moves_for_first() {
        let board = Board::initial();
        let coordinates = board.available_coordinates(Turn::First);
        assert_eq!(
            coordinates,
            vec![at("d3"), at("c4"), at("f5"), at("e6")]
        );
    }

    #[test]
    fn test_initial_moves_for_second() {
        let board = Board::initial();
        let coordinates = board.available_coordinates(Turn::Second);
        assert_eq!(
            coordinates,
            vec![at("e3"), at("f4"), at("c5"), at("d6")]
        );
    }

    #[test]
    fn test_search_continues_past_occupied_end() {
        // x o o . : the distance-2 line ends on o, the distance-3 line is playable.
        let board: Board = "xoo...../......../......../......../......../......../......../........"
            .parse()
            .unwrap();
        let lines = board.available_lines(Turn::First);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].coordinate_to_place(), at("d1"));
        assert_eq!(lines[0].coordinates_to_flip(), vec![at("b1"), at("c1")]);
    }

    #[test]
    fn test_search_stops_on_broken_run() {
        let board: Board = "xo.o..../......../......../......../......../......../......../........"
            .parse()
            .unwrap();
        assert_eq!(board.available_coordinates(Turn::First), vec![at("c1")]);
    }

    #[test]
    fn test_candidate_groups_lines_by_coordinate() {
        // Placing dark on c3 captures along the row and along the column.
        let board: Board = "........
                            ........
                            xo......
                            ........
                            ..o.....
                            ..x.....
                            ........
                            ........"
            .parse()
            .unwrap();
        let board = board.with_disk(at("b3"), Some(Disk::Light));
        let board = board.with_disk(at("c4"), Some(Disk::Light));
        let candidates = board.available_candidates(Turn::First);
        let c3 = candidates
            .iter()
            .find(|c| c.coordinate() == at("c3"))
            .expect("c3 should be playable");
        assert_eq!(c3.lines().len(), 2);
        let mut flips = c3.coordinates_to_flip();
        flips.sort();
        assert_eq!(flips, vec![at("b3"), at("c4"), at("c5")]);
    }

    #[test]
    fn test_replaced_unchecked_covers_whole_line() {
        let board: Board = "xoo...../......../......../......../......../......../......../........"
            .parse()
            .unwrap();
        let lines = board.available_lines(Turn::First);
        let next = board.replaced_unchecked(Disk::Dark, &lines[0].line());
        assert_eq!(String::from(next).split('/').next(), Some("xxxx...."));
    }

    #[test]
    fn test_game_result_on_full_board() {
        let dark_row = "xxxxxxxx/";
        let light_row = "oooooooo/";
        let text = format!("{}{}", dark_row.repeat(5), light_row.repeat(3));
        let board: Board = text.trim_end_matches('/').parse().unwrap();
        assert_eq!(board.game_result(), Some(GameResult::Win(Turn::First)));
    }

    #[test]
    fn test_game_result_when_both_blocked_with_empties() {
        let board = Board::empty()
            .with_disk(at("a1"), Some(Disk::Dark))
            .with_disk(at("h8"), Some(Disk::Light));
        assert_eq!(board.game_result(), Some(GameResult::Draw));
    }

    #[test]
    fn test_game_result_none_while_moves_remain() {
        assert_eq!(Board::initial().game_result(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "xo".parse::<Board>(),
            Err(ParseBoardError::WrongCellCount(2))
        );
        assert_eq!(
            "z".repeat(64).parse::<Board>(),
            Err(ParseBoardError::UnexpectedCharacter('z'))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let board = Board::initial();
        assert_eq!(board.to_string().parse::<Board>(), Ok(board));
        let labelled = format!("{board:#}");
        assert!(labelled.starts_with("  a b c d e f g h"));
        assert!(labelled.contains("\n4 . . . o x . . ."));
    }
}
