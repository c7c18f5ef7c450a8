//! Board coordinates.
//!
//! Both axes are 1-based: `CoordinateX::A` is column 1 and `CoordinateY::One`
//! is row 1 (the top row). [`Coordinate::index`] is the only place the
//! offset to a 0-based flat array index is applied.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, FromRepr, IntoEnumIterator};

/// Number of cells along one edge of the board.
pub const EDGE_LENGTH: u8 = 8;

/// Number of cells on the board.
pub const NUM_CELLS: usize = 64;

/// Column of a coordinate, `A` (1) to `H` (8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr)]
#[repr(u8)]
pub enum CoordinateX {
    /// Column 1.
    A = 1,
    /// Column 2.
    B,
    /// Column 3.
    C,
    /// Column 4.
    D,
    /// Column 5.
    E,
    /// Column 6.
    F,
    /// Column 7.
    G,
    /// Column 8.
    H,
}

/// Row of a coordinate, `One` (1, top) to `Eight` (8, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr)]
#[repr(u8)]
pub enum CoordinateY {
    /// Row 1.
    One = 1,
    /// Row 2.
    Two,
    /// Row 3.
    Three,
    /// Row 4.
    Four,
    /// Row 5.
    Five,
    /// Row 6.
    Six,
    /// Row 7.
    Seven,
    /// Row 8.
    Eight,
}

impl CoordinateX {
    /// 1-based column number.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Column from its 1-based number.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    fn letter(self) -> char {
        char::from(b'a' + self.value() - 1)
    }
}

impl CoordinateY {
    /// 1-based row number.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Row from its 1-based number.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }
}

/// A cell on the board.
///
/// Ordered row-major: by row first, then by column. Selectors rely on this
/// order for deterministic tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Coordinate {
    x: CoordinateX,
    y: CoordinateY,
}

impl Coordinate {
    /// Creates a coordinate.
    pub const fn new(x: CoordinateX, y: CoordinateY) -> Self {
        Self { x, y }
    }

    /// Creates a coordinate from 1-based column and row numbers.
    pub fn from_values(x: u8, y: u8) -> Option<Self> {
        Some(Self::new(
            CoordinateX::from_value(x)?,
            CoordinateY::from_value(y)?,
        ))
    }

    /// Column.
    pub fn x(&self) -> CoordinateX {
        self.x
    }

    /// Row.
    pub fn y(&self) -> CoordinateY {
        self.y
    }

    /// Row-major 0-based index into a flat 64-cell array.
    pub fn index(&self) -> usize {
        (self.y.value() as usize - 1) * EDGE_LENGTH as usize + (self.x.value() as usize - 1)
    }

    /// Inverse of [`Coordinate::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= NUM_CELLS {
            return None;
        }
        let edge = EDGE_LENGTH as usize;
        Self::from_values((index % edge) as u8 + 1, (index / edge) as u8 + 1)
    }

    /// Moves by a signed column/row offset. `None` when leaving the board.
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Self> {
        let x = self.x.value() as i8 + dx;
        let y = self.y.value() as i8 + dy;
        if x < 1 || y < 1 {
            return None;
        }
        Self::from_values(x as u8, y as u8)
    }

    /// All 64 coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        CoordinateY::iter().flat_map(|y| CoordinateX::iter().map(move |x| Coordinate::new(x, y)))
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Formats as `"f5"`: column letter, then row number.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.x.letter(), self.y.value())
    }
}

/// Error parsing a coordinate from text.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("invalid coordinate: {:?}", input)]
pub struct ParseCoordinateError {
    /// The rejected input.
    pub input: String,
}

/// Parses `"f5"` / `"F5"` notation.
impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordinateError {
            input: s.to_string(),
        };
        let mut chars = s.trim().chars();
        let column = chars.next().ok_or_else(err)?.to_ascii_lowercase();
        let row = chars.next().ok_or_else(err)?.to_digit(10).ok_or_else(err)?;
        if chars.next().is_some() || !column.is_ascii_lowercase() {
            return Err(err());
        }
        let x = (column as u8) - b'a' + 1;
        Self::from_values(x, row as u8).ok_or_else(err)
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_string()
    }
}

impl TryFrom<String> for Coordinate {
    type Error = ParseCoordinateError;

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
    fn test_index_applies_one_based_offset() {
        let a1 = Coordinate::new(CoordinateX::A, CoordinateY::One);
        let h8 = Coordinate::new(CoordinateX::H, CoordinateY::Eight);
        let f5 = Coordinate::new(CoordinateX::F, CoordinateY::Five);
        assert_eq!(a1.index(), 0);
        assert_eq!(h8.index(), 63);
        assert_eq!(f5.index(), 4 * 8 + 5);
    }

    #[test]
    fn test_from_index_inverts_index() {
        for coordinate in Coordinate::all() {
            assert_eq!(Coordinate::from_index(coordinate.index()), Some(coordinate));
        }
        assert_eq!(Coordinate::from_index(64), None);
    }

    #[test]
    fn test_from_values_rejects_zero_and_nine() {
        assert!(Coordinate::from_values(0, 1).is_none());
        assert!(Coordinate::from_values(1, 9).is_none());
        assert!(Coordinate::from_values(8, 8).is_some());
    }

    #[test]
    fn test_row_major_order() {
        let b1 = at("b1");
        let a2 = at("a2");
        assert!(b1 < a2);
        let all: Vec<_> = Coordinate::all().collect();
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
        assert_eq!(all.len(), NUM_CELLS);
    }

    #[test]
    fn test_parse_and_display() {
        let f5 = at("F5");
        assert_eq!(f5, Coordinate::new(CoordinateX::F, CoordinateY::Five));
        assert_eq!(f5.to_string(), "f5");
    }

    #[test]
    fn test_parse_failures() {
        for input in ["", "f", "f0", "f9", "i4", "f55", "55", "#1"] {
            assert!(input.parse::<Coordinate>().is_err(), "{input} should fail");
        }
    }

    #[test]
    fn test_offset_stays_on_board() {
        let a1 = at("a1");
        assert_eq!(a1.offset(-1, 0), None);
        assert_eq!(a1.offset(1, 1), Some(at("b2")));
        let h8 = at("h8");
        assert_eq!(h8.offset(1, 0), None);
    }
}
