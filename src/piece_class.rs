use std::fmt;
use std::str::FromStr;

use crate::chess_errors::ChessErrors;
use crate::piece_team::PieceTeam;

/// Represents the type (class) of a chess piece.
/// Used to distinguish between pawns, knights, bishops, rooks, queens, and kings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceClass {
    /// A pawn piece.
    Pawn,
    /// A knight piece.
    Knight,
    /// A bishop piece.
    Bishop,
    /// A rook piece.
    Rook,
    /// A queen piece.
    Queen,
    /// A king piece.
    King,
}

impl PieceClass {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceClass::Pawn => 0,
            PieceClass::Knight => 1,
            PieceClass::Bishop => 2,
            PieceClass::Rook => 3,
            PieceClass::Queen => 4,
            PieceClass::King => 5,
        }
    }

    /// How many pieces of this class a side starts the game with.
    pub const fn initial_complement(self) -> u8 {
        match self {
            PieceClass::Pawn => 8,
            PieceClass::Knight => 2,
            PieceClass::Bishop => 2,
            PieceClass::Rook => 2,
            PieceClass::Queen => 1,
            PieceClass::King => 1,
        }
    }

    /// The uppercase letter naming this class in SAN (`P` for pawns, which
    /// SAN normally omits).
    pub const fn san_letter(self) -> char {
        match self {
            PieceClass::Pawn => 'P',
            PieceClass::Knight => 'N',
            PieceClass::Bishop => 'B',
            PieceClass::Rook => 'R',
            PieceClass::Queen => 'Q',
            PieceClass::King => 'K',
        }
    }

    pub fn from_san_letter(c: char) -> Option<Self> {
        match c {
            'P' => Some(PieceClass::Pawn),
            'N' => Some(PieceClass::Knight),
            'B' => Some(PieceClass::Bishop),
            'R' => Some(PieceClass::Rook),
            'Q' => Some(PieceClass::Queen),
            'K' => Some(PieceClass::King),
            _ => None,
        }
    }

    /// The FEN letter for a piece of this class on the given team.
    pub fn fen_char(self, team: PieceTeam) -> char {
        let c = match self {
            PieceClass::Pawn => 'p',
            PieceClass::Knight => 'n',
            PieceClass::Bishop => 'b',
            PieceClass::Rook => 'r',
            PieceClass::Queen => 'q',
            PieceClass::King => 'k',
        };
        match team {
            PieceTeam::Light => c.to_ascii_uppercase(),
            PieceTeam::Dark => c,
        }
    }

    /// Resolves a FEN piece letter to its team and class.
    pub fn from_fen_char(c: char) -> Option<(PieceTeam, Self)> {
        let team = if c.is_ascii_uppercase() {
            PieceTeam::Light
        } else {
            PieceTeam::Dark
        };
        let class = match c.to_ascii_lowercase() {
            'p' => PieceClass::Pawn,
            'n' => PieceClass::Knight,
            'b' => PieceClass::Bishop,
            'r' => PieceClass::Rook,
            'q' => PieceClass::Queen,
            'k' => PieceClass::King,
            _ => return None,
        };
        Some((team, class))
    }
}

impl fmt::Display for PieceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceClass::Pawn => "pawn",
            PieceClass::Knight => "knight",
            PieceClass::Bishop => "bishop",
            PieceClass::Rook => "rook",
            PieceClass::Queen => "queen",
            PieceClass::King => "king",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PieceClass {
    type Err = ChessErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "pawn" => return Ok(PieceClass::Pawn),
            "knight" => return Ok(PieceClass::Knight),
            "bishop" => return Ok(PieceClass::Bishop),
            "rook" => return Ok(PieceClass::Rook),
            "queen" => return Ok(PieceClass::Queen),
            "king" => return Ok(PieceClass::King),
            _ => {}
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PieceClass::from_san_letter(c.to_ascii_uppercase()),
            _ => None,
        }
        .ok_or_else(|| ChessErrors::InvalidPiece {
            piece: trimmed.into(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_letters_round_trip() {
        for class in [
            PieceClass::Pawn,
            PieceClass::Knight,
            PieceClass::Bishop,
            PieceClass::Rook,
            PieceClass::Queen,
            PieceClass::King,
        ] {
            assert_eq!(PieceClass::from_san_letter(class.san_letter()), Some(class));
            assert_eq!(
                PieceClass::from_fen_char(class.fen_char(PieceTeam::Dark)),
                Some((PieceTeam::Dark, class))
            );
            assert_eq!(
                PieceClass::from_fen_char(class.fen_char(PieceTeam::Light)),
                Some((PieceTeam::Light, class))
            );
        }
        assert_eq!(PieceClass::from_fen_char('x'), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("queen".parse::<PieceClass>().unwrap(), PieceClass::Queen);
        assert_eq!("N".parse::<PieceClass>().unwrap(), PieceClass::Knight);
        assert!(matches!(
            "wizard".parse::<PieceClass>(),
            Err(ChessErrors::InvalidPiece { .. })
        ));
    }
}
