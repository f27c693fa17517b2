//! Chess board location representation and utilities.
//!
//! `BoardLocation` names one square of the 8x8 grid with zero-based file and
//! rank indices (file 0 is the a-file, rank 0 is rank 1). All construction
//! paths validate bounds, so a `BoardLocation` in hand is always on the board.

use std::fmt;
use std::str::FromStr;

use crate::chess_errors::ChessErrors;

/// A square on the chess board.
///
/// The coordinate system uses:
/// - Files: 0-7 representing a-h from left to right
/// - Ranks: 0-7 representing 1-8 from bottom to top
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardLocation {
    /// Zero-based file index (0-7 representing a-h).
    pub file: u8,
    /// Zero-based rank index (0-7 representing 1-8).
    pub rank: u8,
}

impl BoardLocation {
    /// Creates a new BoardLocation from file and rank indices.
    ///
    /// # Arguments
    /// * `file` - Zero-based file index (0-7 representing a-h)
    /// * `rank` - Zero-based rank index (0-7 representing 1-8)
    ///
    /// # Returns
    /// * `Ok(BoardLocation)` - Successfully created location
    /// * `Err(ChessErrors::InvalidSquare)` - If either index is out of bounds
    pub fn from_file_rank(file: u8, rank: u8) -> Result<Self, ChessErrors> {
        if file <= 7 && rank <= 7 {
            Ok(BoardLocation { file, rank })
        } else {
            Err(ChessErrors::InvalidSquare {
                square: format!("({file},{rank})"),
            })
        }
    }

    /// Creates a new BoardLocation from algebraic notation (e.g. "e4").
    pub fn from_algebraic(x: &str) -> Result<Self, ChessErrors> {
        let x = x.trim();
        let bytes = x.as_bytes();
        if bytes.len() != 2
            || !(b'a'..=b'h').contains(&bytes[0])
            || !(b'1'..=b'8').contains(&bytes[1])
        {
            return Err(ChessErrors::InvalidSquare { square: x.into() });
        }
        Ok(BoardLocation {
            file: bytes[0] - b'a',
            rank: bytes[1] - b'1',
        })
    }

    /// Converts the location to algebraic notation (e.g. "e4").
    pub fn to_algebraic(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    /// Generates a new location by applying a file and rank offset, with
    /// bounds checking.
    ///
    /// # Arguments
    /// * `d_file` - Change in file (-7 to 7)
    /// * `d_rank` - Change in rank (-7 to 7)
    ///
    /// # Returns
    /// * `Some(BoardLocation)` - The offset square, still on the board
    /// * `None` - If the offset would leave the board
    pub fn offset(&self, d_file: i8, d_rank: i8) -> Option<BoardLocation> {
        let f_next = self.file as i8 + d_file;
        let r_next = self.rank as i8 + d_rank;
        if !(0..8).contains(&f_next) || !(0..8).contains(&r_next) {
            return None;
        }
        Some(BoardLocation {
            file: f_next as u8,
            rank: r_next as u8,
        })
    }

    /// The file letter as it appears in algebraic notation.
    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    /// The rank digit as it appears in algebraic notation.
    pub fn rank_char(&self) -> char {
        (b'1' + self.rank) as char
    }
}

// Print squares as algebraic coords like "e2".
impl fmt::Debug for BoardLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoardLocation({})", self.to_algebraic())
    }
}

impl fmt::Display for BoardLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl FromStr for BoardLocation {
    type Err = ChessErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoardLocation::from_algebraic(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_algebraic_round_trip() {
        let dut = BoardLocation::from_algebraic("a1").unwrap();
        assert_eq!((dut.file, dut.rank), (0, 0));
        assert_eq!(dut.to_algebraic(), "a1");

        let dut = BoardLocation::from_algebraic("h8").unwrap();
        assert_eq!((dut.file, dut.rank), (7, 7));
        assert_eq!(dut.to_algebraic(), "h8");

        let dut = BoardLocation::from_algebraic("e4").unwrap();
        assert_eq!((dut.file, dut.rank), (4, 3));
        assert_eq!(dut.to_algebraic(), "e4");
    }

    #[test]
    fn test_rejects_malformed_squares() {
        assert!(matches!(
            BoardLocation::from_algebraic("i4"),
            Err(ChessErrors::InvalidSquare { .. })
        ));
        assert!(matches!(
            BoardLocation::from_algebraic("a9"),
            Err(ChessErrors::InvalidSquare { .. })
        ));
        assert!(matches!(
            BoardLocation::from_algebraic("e44"),
            Err(ChessErrors::InvalidSquare { .. })
        ));
        assert!(matches!(
            "zz".parse::<BoardLocation>(),
            Err(ChessErrors::InvalidSquare { .. })
        ));
    }

    #[test]
    fn test_offset_bounds() {
        let dut = BoardLocation::from_algebraic("a1").unwrap();
        assert!(dut.offset(-1, 0).is_none());
        assert!(dut.offset(0, -1).is_none());
        assert_eq!(dut.offset(1, 1).unwrap().to_algebraic(), "b2");

        let dut = BoardLocation::from_algebraic("h8").unwrap();
        assert!(dut.offset(1, 0).is_none());
        assert_eq!(dut.offset(-2, -1).unwrap().to_algebraic(), "f7");
    }
}
