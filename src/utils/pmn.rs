//! The two-character piot move notation.
//!
//! Every half-move is a pair of characters from a 64-symbol alphabet that
//! walks the board a1..h1, a2..h2, up to h8: the 26 lowercase letters, then
//! the 26 uppercase letters, then the ten digits, then `!` and `?` for g8
//! and h8. The first character always names the source square. The second
//! is either a plain destination square or one of twelve promotion glyphs
//! that encode the promotion piece together with the pawn's lateral motion.

use crate::board_location::BoardLocation;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::piece_class::PieceClass;

/// A decoded piot pair: source, destination, and the promotion piece when
/// the second character was a promotion glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PmnMove {
    pub from: BoardLocation,
    pub to: BoardLocation,
    pub promotion: Option<PieceClass>,
}

/// Encodes a square as its alphabet symbol.
pub fn square_to_char(square: BoardLocation) -> char {
    let index = square.rank * 8 + square.file;
    match index {
        0..=25 => (b'a' + index) as char,
        26..=51 => (b'A' + index - 26) as char,
        52..=61 => (b'0' + index - 52) as char,
        62 => '!',
        _ => '?',
    }
}

/// Decodes an alphabet symbol back into its square.
pub fn char_to_square(c: char) -> ChessResult<BoardLocation> {
    let index = match c {
        'a'..='z' => c as u8 - b'a',
        'A'..='Z' => c as u8 - b'A' + 26,
        '0'..='9' => c as u8 - b'0' + 52,
        '!' => 62,
        '?' => 63,
        _ => {
            return Err(ChessErrors::InvalidSquare {
                square: c.to_string(),
            })
        }
    };
    BoardLocation::from_file_rank(index % 8, index / 8)
}

/// Resolves a promotion glyph to its piece and lateral file shift
/// (-1 toward the a-file, 0 straight, +1 toward the h-file).
fn promotion_glyph(c: char) -> Option<(PieceClass, i8)> {
    match c {
        '(' => Some((PieceClass::Knight, -1)),
        '^' => Some((PieceClass::Knight, 0)),
        ')' => Some((PieceClass::Knight, 1)),
        '[' => Some((PieceClass::Rook, -1)),
        '_' => Some((PieceClass::Rook, 0)),
        ']' => Some((PieceClass::Rook, 1)),
        '@' => Some((PieceClass::Bishop, -1)),
        '#' => Some((PieceClass::Bishop, 0)),
        '$' => Some((PieceClass::Bishop, 1)),
        '{' => Some((PieceClass::Queen, -1)),
        '~' => Some((PieceClass::Queen, 0)),
        '}' => Some((PieceClass::Queen, 1)),
        _ => None,
    }
}

fn glyph_for(class: PieceClass, shift: i8) -> Option<char> {
    let row = match class {
        PieceClass::Knight => ['(', '^', ')'],
        PieceClass::Rook => ['[', '_', ']'],
        PieceClass::Bishop => ['@', '#', '$'],
        PieceClass::Queen => ['{', '~', '}'],
        _ => return None,
    };
    match shift {
        -1 => Some(row[0]),
        0 => Some(row[1]),
        1 => Some(row[2]),
        _ => None,
    }
}

/// Decodes one two-character pair.
///
/// A promotion glyph derives its destination from the source square: the
/// rank becomes 1 when the source stands on rank 2 (black promoting) and 8
/// otherwise, and the file shifts by the glyph's direction.
pub fn decode(pair: &str) -> ChessResult<PmnMove> {
    let chars: Vec<char> = pair.chars().collect();
    if chars.len() != 2 {
        return Err(ChessErrors::InvalidSquare {
            square: pair.into(),
        });
    }
    let from = char_to_square(chars[0])?;

    if let Some((class, shift)) = promotion_glyph(chars[1]) {
        let to_rank = if from.rank == 1 { 0 } else { 7 };
        let to_file = from.file as i8 + shift;
        if !(0..8).contains(&to_file) {
            return Err(ChessErrors::InvalidSquare {
                square: pair.into(),
            });
        }
        let to = BoardLocation::from_file_rank(to_file as u8, to_rank)?;
        return Ok(PmnMove {
            from,
            to,
            promotion: Some(class),
        });
    }

    let to = char_to_square(chars[1])?;
    Ok(PmnMove {
        from,
        to,
        promotion: None,
    })
}

/// Encodes a half-move as its two-character pair, choosing the promotion
/// glyph that matches the piece and the pawn's lateral motion.
pub fn encode(
    from: BoardLocation,
    to: BoardLocation,
    promotion: Option<PieceClass>,
) -> ChessResult<String> {
    let second = match promotion {
        Some(class) => {
            let shift = to.file as i8 - from.file as i8;
            glyph_for(class, shift).ok_or(ChessErrors::InvalidPromote { piece: class })?
        }
        None => square_to_char(to),
    };
    Ok(format!("{}{}", square_to_char(from), second))
}
