use crate::{board_location::BoardLocation, piece_class::PieceClass, piece_team::PieceTeam};

/// Represents a chess piece with a stable identity independent of its square.
///
/// The identity is the `(team, class, slot)` triple. A promoted pawn keeps its
/// pawn identity (class stays `Pawn`, the slot stays the pawn's slot) and
/// exposes the piece it promoted to through `promoted_class`; every rules
/// question about how the piece moves goes through [`effective_class`].
///
/// [`effective_class`]: PieceRecord::effective_class
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PieceRecord {
    /// The class (type) the piece was placed as. Stays `Pawn` after promotion.
    pub class: PieceClass,
    /// Piece team
    pub team: PieceTeam,
    /// Ordinal within (team, class). Kings carry 0; every other class counts
    /// from 1.
    pub slot: u8,
    /// The class a promoted pawn now moves as.
    pub promoted_class: Option<PieceClass>,
    /// Piece location
    pub location: BoardLocation,
}

impl PieceRecord {
    /// The class this piece currently moves, captures, and renders as.
    #[inline]
    pub fn effective_class(&self) -> PieceClass {
        self.promoted_class.unwrap_or(self.class)
    }

    /// A short identity tag like `WR1`, `BK`, or `WP3`, stable across the
    /// piece's whole life including promotion.
    pub fn tag(&self) -> String {
        let team = match self.team {
            PieceTeam::Light => 'W',
            PieceTeam::Dark => 'B',
        };
        if self.class == PieceClass::King {
            format!("{team}K")
        } else {
            format!("{team}{}{}", self.class.san_letter(), self.slot)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_promoted_pawn_keeps_identity() {
        let mut dut = PieceRecord {
            class: PieceClass::Pawn,
            team: PieceTeam::Light,
            slot: 3,
            promoted_class: None,
            location: BoardLocation::from_algebraic("c7").unwrap(),
        };
        assert_eq!(dut.effective_class(), PieceClass::Pawn);
        assert_eq!(dut.tag(), "WP3");

        dut.promoted_class = Some(PieceClass::Queen);
        dut.location = BoardLocation::from_algebraic("c8").unwrap();
        assert_eq!(dut.effective_class(), PieceClass::Queen);
        assert_eq!(dut.tag(), "WP3");
    }
}
