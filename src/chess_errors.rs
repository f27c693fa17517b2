//! The engine-wide error taxonomy.
//!
//! Every fallible operation in the crate returns one of these kinds; no user
//! input can make the engine panic. Each variant carries its human-readable
//! message template, with pieces and colors rendered as their full English
//! names.

use thiserror::Error;

use crate::board_location::BoardLocation;
use crate::piece_class::PieceClass;
use crate::piece_team::PieceTeam;

/// Result alias used throughout the crate.
pub type ChessResult<T> = Result<T, ChessErrors>;

/// Represents all possible error types that can occur in the chess engine.
/// Used throughout the codebase for error handling and reporting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChessErrors {
    #[error("`{san}` is not a valid SAN move")]
    InvalidSAN { san: String },

    #[error("a FEN needs three to six fields, `{fen}` has {count}")]
    FenCount { fen: String, count: usize },

    #[error("the FEN string has an empty field")]
    EmptyFen,

    #[error("the FEN piece placement describes too many squares or pieces")]
    FenTooMuch,

    #[error("the FEN piece placement describes too few squares or pieces")]
    FenTooLittle,

    #[error("`{field}` is not a side to move, expected `w` or `b`")]
    FenTomoveWrong { field: String },

    #[error("the castling field `{field}` has more than four letters")]
    FenCastleTooLong { field: String },

    #[error("`{letter}` is not a castling right available in this position")]
    FenCastleWrong { letter: char },

    #[error("`{field}` is not a valid en passant target")]
    FenInvalidEnPassant { field: String },

    #[error("`{field}` is not a valid half-move clock")]
    FenInvalidPly { field: String },

    #[error("`{field}` is not a valid move number")]
    FenInvalidMoveNumber { field: String },

    #[error("`{piece}` is not a FEN piece letter")]
    FenInvalidPiece { piece: char },

    #[error("the FEN places more {color} {piece} pieces than one side can carry")]
    FenMultiPiece { color: PieceTeam, piece: PieceClass },

    #[error("{color} cannot castle while in check")]
    InCheck { color: PieceTeam },

    #[error("{color} has no kingside castling right")]
    CantCastleKingside { color: PieceTeam },

    #[error("{color} has no queenside castling right")]
    CantCastleQueenside { color: PieceTeam },

    #[error("{color} cannot castle, there are pieces in the way")]
    CastlePiecesInWay { color: PieceTeam },

    #[error("the {color} king would pass through check on {square}")]
    CastleWouldCheck {
        color: PieceTeam,
        square: BoardLocation,
    },

    #[error("moving to {square} would put the {color} king in check")]
    MoveWouldCheck {
        color: PieceTeam,
        square: BoardLocation,
    },

    #[error("{color} is in check and moving to {square} does not address it")]
    StillInCheck {
        color: PieceTeam,
        square: BoardLocation,
    },

    #[error("cannot capture the {color} {piece} on {square}, it is friendly")]
    CantCaptureOwn {
        color: PieceTeam,
        piece: PieceClass,
        square: BoardLocation,
    },

    #[error("there is no piece to take at {square}")]
    NoPiece { square: BoardLocation },

    #[error("the {piece} on {square} belongs to {color}, whose turn it is not")]
    WrongColor {
        color: PieceTeam,
        piece: PieceClass,
        square: BoardLocation,
    },

    #[error("the {piece} on {square} cannot move to {destination}")]
    CantMoveThatWay {
        piece: PieceClass,
        square: BoardLocation,
        destination: BoardLocation,
    },

    #[error("{color} already has a full complement of {piece} pieces")]
    TooManyPieces { color: PieceTeam, piece: PieceClass },

    #[error("{square} is already occupied")]
    DuplicateSquare { square: BoardLocation },

    #[error("`{color}` is not a color, expected `w` or `b`")]
    InvalidColor { color: String },

    #[error("`{square}` is not a square on the board")]
    InvalidSquare { square: String },

    #[error("`{piece}` is not a piece")]
    InvalidPiece { piece: String },

    #[error("a pawn cannot be promoted to a {piece} here")]
    InvalidPromote { piece: PieceClass },

    #[error("`{san}` is ambiguous, more than one piece can make that move")]
    Ambiguous { san: String },

    #[error("no {piece} can reach {square}")]
    NoPieceCanDoThat {
        piece: PieceClass,
        square: BoardLocation,
    },

    #[error("cannot place a pawn on {square}, pawns never stand on the back ranks")]
    CantPlaceOnBackRank { square: BoardLocation },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages_use_english_names() {
        let e = ChessErrors::TooManyPieces {
            color: PieceTeam::Light,
            piece: PieceClass::Queen,
        };
        assert_eq!(
            e.to_string(),
            "white already has a full complement of queen pieces"
        );

        let e = ChessErrors::CantCaptureOwn {
            color: PieceTeam::Dark,
            piece: PieceClass::Knight,
            square: BoardLocation::from_algebraic("f6").unwrap(),
        };
        assert_eq!(
            e.to_string(),
            "cannot capture the black knight on f6, it is friendly"
        );
    }
}
