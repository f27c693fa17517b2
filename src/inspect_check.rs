//! Threat and check inspection.
//!
//! Answers whether a square is attacked, enumerates the attackers of a
//! king, and derives the interposition path between a checking piece and
//! the king it checks. Everything here reads the piece register without
//! mutating it; speculative questions belong to the move applier and its
//! transactions.

use crate::board_location::BoardLocation;
use crate::geometry;
use crate::piece_class::PieceClass;
use crate::piece_record::PieceRecord;
use crate::piece_register::PieceRegister;
use crate::piece_team::PieceTeam;

/// The checking situation of one side's king.
#[derive(Clone, Debug)]
pub enum CheckStatus {
    /// Not in check.
    Clear,
    /// Exactly one checking piece.
    Single(PieceRecord),
    /// Double (or more) check; no interposition can help.
    Multiple(Vec<PieceRecord>),
}

impl CheckStatus {
    pub fn is_check(&self) -> bool {
        !matches!(self, CheckStatus::Clear)
    }
}

/// Enumerates every piece of `by` that attacks `square`. Pawns are matched
/// by their capture pattern, not their move pattern; rays stop at the first
/// blocker.
pub fn attackers_of(
    register: &PieceRegister,
    square: BoardLocation,
    by: PieceTeam,
) -> Vec<PieceRecord> {
    attackers_of_ignoring(register, square, by, None)
}

/// Like [`attackers_of`], but treating `ignore` as empty. The castling walk
/// uses this to ask about squares the king is about to cross while it still
/// stands on its origin.
fn occupant_skipping<'a>(
    register: &'a PieceRegister,
    ignore: Option<BoardLocation>,
    at: BoardLocation,
) -> Option<&'a PieceRecord> {
    if Some(at) == ignore {
        None
    } else {
        register.piece_at(at)
    }
}

pub(crate) fn attackers_of_ignoring(
    register: &PieceRegister,
    square: BoardLocation,
    by: PieceTeam,
    ignore: Option<BoardLocation>,
) -> Vec<PieceRecord> {
    let mut result = Vec::new();
    let occupant = |at: BoardLocation| occupant_skipping(register, ignore, at);

    // Knights.
    for jump in geometry::knight_jumps(square) {
        if let Some(piece) = occupant(jump) {
            if piece.team == by && piece.effective_class() == PieceClass::Knight {
                result.push(*piece);
            }
        }
    }

    // The enemy king.
    for step in geometry::king_steps(square) {
        if let Some(piece) = occupant(step) {
            if piece.team == by && piece.effective_class() == PieceClass::King {
                result.push(*piece);
            }
        }
    }

    // Pawns attack diagonally forward, so an attacker sits one rank behind
    // the target square relative to its own direction of travel.
    for d_file in [-1, 1] {
        if let Some(at) = square.offset(d_file, -by.forward()) {
            if let Some(piece) = occupant(at) {
                if piece.team == by && piece.effective_class() == PieceClass::Pawn {
                    result.push(*piece);
                }
            }
        }
    }

    // Sliders: the first occupied square on each ray decides.
    for direction in geometry::DIAGONAL_DIRECTIONS {
        for at in geometry::ray(square, direction) {
            if let Some(piece) = occupant(at) {
                if piece.team == by
                    && matches!(
                        piece.effective_class(),
                        PieceClass::Bishop | PieceClass::Queen
                    )
                {
                    result.push(*piece);
                }
                break;
            }
        }
    }
    for direction in geometry::ORTHOGONAL_DIRECTIONS {
        for at in geometry::ray(square, direction) {
            if let Some(piece) = occupant(at) {
                if piece.team == by
                    && matches!(piece.effective_class(), PieceClass::Rook | PieceClass::Queen)
                {
                    result.push(*piece);
                }
                break;
            }
        }
    }

    result
}

pub fn is_square_attacked(
    register: &PieceRegister,
    square: BoardLocation,
    by: PieceTeam,
) -> bool {
    !attackers_of(register, square, by).is_empty()
}

pub(crate) fn is_square_attacked_ignoring(
    register: &PieceRegister,
    square: BoardLocation,
    by: PieceTeam,
    ignore: Option<BoardLocation>,
) -> bool {
    !attackers_of_ignoring(register, square, by, ignore).is_empty()
}

/// Classifies the check against `team`'s king. A board without that king
/// (mid-edit positions) reports `Clear`.
pub fn check_status(register: &PieceRegister, team: PieceTeam) -> CheckStatus {
    let Some(king) = register.king(team) else {
        return CheckStatus::Clear;
    };
    let mut attackers = attackers_of(register, king.location, team.opposite());
    match attackers.len() {
        0 => CheckStatus::Clear,
        1 => CheckStatus::Single(attackers.remove(0)),
        _ => CheckStatus::Multiple(attackers),
    }
}

pub fn in_check(register: &PieceRegister, team: PieceTeam) -> bool {
    check_status(register, team).is_check()
}

/// The squares on which an interposing piece could block or capture the
/// checker: the checker's own square for a knight, otherwise the ray from
/// the king toward the checker, checker included, closer squares first.
pub fn path_to_king(attacker: &PieceRecord, king: BoardLocation) -> Vec<BoardLocation> {
    let at = attacker.location;
    if attacker.effective_class() == PieceClass::Knight {
        return vec![at];
    }
    let d_file = (at.file as i8 - king.file as i8).signum();
    let d_rank = (at.rank as i8 - king.rank as i8).signum();
    let file_span = (at.file as i8 - king.file as i8).abs();
    let rank_span = (at.rank as i8 - king.rank as i8).abs();
    let aligned = file_span == 0 || rank_span == 0 || file_span == rank_span;
    if !aligned {
        return vec![at];
    }

    let mut result = Vec::new();
    let mut current = king;
    while let Some(next) = current.offset(d_file, d_rank) {
        result.push(next);
        if next == at {
            break;
        }
        current = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::GameState;

    fn sq(s: &str) -> BoardLocation {
        BoardLocation::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_pawns_attack_diagonally_only() {
        let game = GameState::from_fen("4k3/8/8/8/3p4/8/8/4K3 w - - 0 1").unwrap();
        let register = &game.piece_register;
        assert!(is_square_attacked(register, sq("c3"), PieceTeam::Dark));
        assert!(is_square_attacked(register, sq("e3"), PieceTeam::Dark));
        // Straight ahead is a move, not an attack.
        assert!(!is_square_attacked(register, sq("d3"), PieceTeam::Dark));
    }

    #[test]
    fn test_rays_stop_at_blockers() {
        let game = GameState::from_fen("4k3/8/8/8/1q1P4/8/8/4K3 w - - 0 1").unwrap();
        let register = &game.piece_register;
        // The white pawn on d4 shadows everything past it on the rank.
        assert!(is_square_attacked(register, sq("d4"), PieceTeam::Dark));
        assert!(!is_square_attacked(register, sq("e4"), PieceTeam::Dark));
        // The diagonal toward e1 remains open.
        assert!(is_square_attacked(register, sq("e1"), PieceTeam::Dark));
    }

    #[test]
    fn test_check_status_classification() {
        let game = GameState::from_fen("4k3/8/8/8/8/8/3n4/4K3 w - - 0 1").unwrap();
        match check_status(&game.piece_register, PieceTeam::Light) {
            CheckStatus::Single(attacker) => {
                assert_eq!(attacker.effective_class(), PieceClass::Knight)
            }
            other => panic!("expected single check, got {other:?}"),
        }

        let game = GameState::from_fen("4k3/8/8/8/7b/8/3n4/4K3 w - - 0 1").unwrap();
        assert!(matches!(
            check_status(&game.piece_register, PieceTeam::Light),
            CheckStatus::Multiple(_)
        ));

        let game = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(!in_check(&game.piece_register, PieceTeam::Light));
    }

    #[test]
    fn test_path_to_king_for_sliders_and_knights() {
        let game = GameState::from_fen("4k3/8/8/8/7b/8/3n4/4K3 w - - 0 1").unwrap();
        let register = &game.piece_register;
        let king = register.king(PieceTeam::Light).unwrap().location;

        let bishop = register.piece_at(sq("h4")).unwrap();
        let path: Vec<String> = path_to_king(bishop, king)
            .iter()
            .map(|l| l.to_algebraic())
            .collect();
        assert_eq!(path, ["f2", "g3", "h4"]);

        let knight = register.piece_at(sq("d2")).unwrap();
        let path: Vec<String> = path_to_king(knight, king)
            .iter()
            .map(|l| l.to_algebraic())
            .collect();
        assert_eq!(path, ["d2"]);
    }
}
