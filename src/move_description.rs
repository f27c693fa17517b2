use crate::{
    board_location::BoardLocation, chess_errors::ChessErrors, piece_class::PieceClass,
    piece_team::PieceTeam,
};

/// The two castling wings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            CastleSide::King => 0,
            CastleSide::Queen => 1,
        }
    }

    /// The file the king lands on when castling this way.
    #[inline]
    pub const fn king_target_file(self) -> u8 {
        match self {
            CastleSide::King => 6,
            CastleSide::Queen => 2,
        }
    }

    /// The file the rook lands on when castling this way.
    #[inline]
    pub const fn rook_target_file(self) -> u8 {
        match self {
            CastleSide::King => 5,
            CastleSide::Queen => 3,
        }
    }

    pub const fn san(self) -> &'static str {
        match self {
            CastleSide::King => "O-O",
            CastleSide::Queen => "O-O-O",
        }
    }

    /// The error raised when this wing's castling right is gone.
    pub fn missing_right_error(self, color: PieceTeam) -> ChessErrors {
        match self {
            CastleSide::King => ChessErrors::CantCastleKingside { color },
            CastleSide::Queen => ChessErrors::CantCastleQueenside { color },
        }
    }
}

/// A standard (non-castling) SAN move, structurally parsed but not yet
/// validated against any position.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMove {
    /// The class named by the token (pawn when no letter was given).
    pub class: PieceClass,
    /// Origin file from the disambiguation, if present.
    pub from_file: Option<u8>,
    /// Origin rank from the disambiguation, if present.
    pub from_rank: Option<u8>,
    /// Whether the token marked a capture with `x`.
    pub capture: bool,
    pub destination: BoardLocation,
    pub promotion: Option<PieceClass>,
    /// A pre-resolved origin square, set by the square-pair interface.
    pub from: Option<BoardLocation>,
}

/// Represents one parsed move token: a castle, a standard move, or a
/// piece-placement move (`Q@e4`), which parses but is not playable in a
/// standard game.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveDescription {
    Castle(CastleSide),
    Standard(StandardMove),
    Placement {
        class: PieceClass,
        destination: BoardLocation,
    },
}
