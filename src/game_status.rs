//! Terminal and draw detection.
//!
//! Checkmate, stalemate, the 50-move rule, repetition, and the material
//! draws. The exploratory questions (can the king escape, can anything
//! interpose) are answered by attempting the candidate moves on a throwaway
//! copy of the engine inside transactions, so no query ever perturbs the
//! recorded game state or its move log.

use crate::game_state::GameState;
use crate::geometry::{self, SquareShade};
use crate::inspect_check::{self, CheckStatus};
use crate::move_generator;
use crate::move_logic;
use crate::piece_class::PieceClass;
use crate::piece_team::PieceTeam;

/// How a finished game ended: a winner, or a forced draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PieceTeam),
    Draw,
}

/// Whether the side to move is in check.
pub fn in_check(game: &GameState) -> bool {
    inspect_check::in_check(&game.piece_register, game.turn)
}

/// Whether the side to move is checkmated: in check, no king escape, and
/// for a single check no piece can block or capture along the checker's
/// path to the king.
pub fn in_checkmate(game: &GameState) -> bool {
    let mut probe = game.clone();
    let turn = probe.turn;
    let status = inspect_check::check_status(&probe.piece_register, turn);
    let attacker = match status {
        CheckStatus::Clear => return false,
        CheckStatus::Single(attacker) => Some(attacker),
        CheckStatus::Multiple(_) => None,
    };

    let king_location = match probe.piece_register.king(turn) {
        Some(king) => king.location,
        None => return false,
    };
    for step in geometry::king_steps(king_location) {
        if move_logic::probe_move_legal(&mut probe, king_location, step) {
            return false;
        }
    }

    // Double check with no escape is mate regardless of the other pieces.
    let Some(attacker) = attacker else {
        return true;
    };

    let path = inspect_check::path_to_king(&attacker, king_location);
    let defenders: Vec<_> = probe
        .piece_register
        .iter_team(turn)
        .filter(|(_, r)| r.effective_class() != PieceClass::King)
        .map(|(_, r)| r.location)
        .collect();
    for from in defenders {
        let Ok(stops) = move_generator::generate_destinations(&probe, from) else {
            continue;
        };
        for to in stops {
            if path.contains(&to) && move_logic::probe_move_legal(&mut probe, from, to) {
                return false;
            }
        }
    }

    // A checking pawn that just double-stepped can still be taken en
    // passant, a reply the path scan cannot see.
    if attacker.effective_class() == PieceClass::Pawn {
        if let Some(target) = probe.en_passant_location {
            if target.file == attacker.location.file {
                let capturers: Vec<_> = probe
                    .piece_register
                    .iter_team(turn)
                    .filter(|(_, r)| r.effective_class() == PieceClass::Pawn)
                    .map(|(_, r)| r.location)
                    .collect();
                for from in capturers {
                    let reaches = move_generator::generate_destinations(&probe, from)
                        .map(|stops| stops.contains(&target))
                        .unwrap_or(false);
                    if reaches && move_logic::probe_move_legal(&mut probe, from, target) {
                        return false;
                    }
                }
            }
        }
    }

    true
}

/// Whether the side to move is stalemated: not in check, and every move of
/// every piece fails.
pub fn in_stalemate(game: &GameState) -> bool {
    if in_check(game) {
        return false;
    }
    let mut probe = game.clone();
    !move_logic::has_any_legal_move(&mut probe)
}

/// The 50-move rule: one hundred plies without a capture or pawn move.
pub fn in_fifty_move_draw(game: &GameState) -> bool {
    game.half_move_clock >= 100
}

fn repetition_count(game: &GameState) -> u32 {
    game.repetition_ledger
        .get(&game.get_fingerprint())
        .copied()
        .unwrap_or(0)
}

/// Threefold (or more) repetition of the current position.
pub fn in_repetition_draw(game: &GameState) -> bool {
    repetition_count(game) >= 3
}

/// Fivefold repetition of the current position, which ends the game on its
/// own.
pub fn in_fivefold_draw(game: &GameState) -> bool {
    repetition_count(game) >= 5
}

/// Basic insufficient-material draw: at most two non-king pieces, analysed
/// case by case.
pub fn in_basic_draw(game: &GameState) -> bool {
    let mut minors: [Vec<(PieceClass, SquareShade)>; 2] = [Vec::new(), Vec::new()];
    let mut total_non_king = 0usize;
    for (_, record) in game.piece_register.iter() {
        let class = record.effective_class();
        match class {
            PieceClass::King => {}
            PieceClass::Bishop | PieceClass::Knight => {
                total_non_king += 1;
                minors[record.team.index()]
                    .push((class, geometry::square_shade(record.location)));
            }
            // Any queen, rook, or pawn is enough to play on.
            _ => return false,
        }
    }
    if total_non_king > 2 {
        return false;
    }

    match total_non_king {
        // K vs K, and K + minor vs K.
        0 | 1 => true,
        2 => {
            let light = &minors[PieceTeam::Light.index()];
            let dark = &minors[PieceTeam::Dark.index()];
            match (light.as_slice(), dark.as_slice()) {
                // One minor each: drawn, unless the bishops stand on
                // different diagonal colors.
                ([(PieceClass::Bishop, a)], [(PieceClass::Bishop, b)]) => a == b,
                ([_], [_]) => true,
                // Two minors on one side: only two knights cannot force.
                (both, []) | ([], both) => {
                    both.iter().all(|(class, _)| *class == PieceClass::Knight)
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Whether one side retains mating material: a queen, rook, or pawn; two
/// bishops; three knights; or bishop plus knight.
pub fn has_mating_material(game: &GameState, team: PieceTeam) -> bool {
    let register = &game.piece_register;
    if register.count_effective(team, PieceClass::Queen) > 0
        || register.count_effective(team, PieceClass::Rook) > 0
        || register.count_effective(team, PieceClass::Pawn) > 0
    {
        return true;
    }
    let bishops = register.count_effective(team, PieceClass::Bishop);
    let knights = register.count_effective(team, PieceClass::Knight);
    bishops >= 2 || knights >= 3 || (bishops >= 1 && knights >= 1)
}

/// The draws that end the game without a claim.
pub fn in_forced_draw(game: &GameState) -> bool {
    in_stalemate(game) || in_fivefold_draw(game) || in_basic_draw(game)
}

/// The winner on checkmate, a draw when one is forced, `None` while the
/// game is live. Claimable draws (threefold, 50-move) do not end the game
/// here.
pub fn game_over(game: &GameState) -> Option<GameOutcome> {
    if in_checkmate(game) {
        return Some(GameOutcome::Winner(game.turn.opposite()));
    }
    if in_forced_draw(game) {
        return Some(GameOutcome::Draw);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_errors::ChessResult;

    fn play(game: &mut GameState, moves: &str) -> ChessResult<()> {
        for token in moves.split_ascii_whitespace() {
            game.apply_san(token)?;
        }
        Ok(())
    }

    #[test]
    fn test_back_rank_mate_sequence() -> ChessResult<()> {
        let mut game =
            GameState::from_fen("rn3b1N/pp2k2p/4p2q/1NQ5/3P4/8/PPP3PP/5RK1 b - - 1 1")?;
        play(&mut game, "Kd8 Qc7+ Ke8 Qc8+ Ke7 Rf7#")?;
        assert!(game.in_checkmate());
        assert!(game.in_check());
        assert_eq!(game.game_over(), Some(GameOutcome::Winner(PieceTeam::Light)));
        assert_eq!(
            game.san_log_annotated(),
            &["Kd8", "Qc7+", "Ke8", "Qc8+", "Ke7", "Rf7#"]
        );
        Ok(())
    }

    #[test]
    fn test_simple_rook_mate() {
        let game = GameState::from_fen("3k2R1/8/3K4/8/8/8/8/8 b - -").unwrap();
        assert!(game.in_checkmate());
        assert_eq!(game.game_over(), Some(GameOutcome::Winner(PieceTeam::Light)));
    }

    #[test]
    fn test_interposition_and_capture_defeat_mate() {
        // Same back-rank check, but the e5 rook can interpose on e8.
        let game = GameState::from_fen("3k2R1/8/3K4/4r3/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.in_check());
        assert!(!game.in_checkmate());

        // And a rook on the g-file can capture the checker outright.
        let game = GameState::from_fen("3k2R1/8/3K4/8/8/8/6r1/8 b - - 0 1").unwrap();
        assert!(!game.in_checkmate());
    }

    #[test]
    fn test_stalemate_leaves_state_alone() {
        let game = GameState::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - -").unwrap();
        let fen_before = game.get_fen();
        assert!(game.in_stalemate());
        assert!(!game.in_check());
        assert!(game.in_forced_draw());
        assert_eq!(game.game_over(), Some(GameOutcome::Draw));
        // The queries run on a throwaway copy; nothing moved.
        assert_eq!(game.get_fen(), fen_before);
        assert!(game.san_log().is_empty());
    }

    #[test]
    fn test_checkmate_implies_check_and_no_moves() {
        let game = GameState::from_fen("3k2R1/8/3K4/8/8/8/8/8 b - -").unwrap();
        assert!(game.in_check());
        assert!(!game.in_stalemate());
        let mut probe = game.clone();
        assert!(!move_logic::has_any_legal_move(&mut probe));
    }

    #[test]
    fn test_en_passant_capture_refutes_mate() -> ChessResult<()> {
        // After f5+ every king step is covered and nothing reaches the
        // checker's square; only gxf6 en passant saves white.
        let mut game = GameState::from_fen("8/5p2/8/4k1P1/6K1/r7/8/7r b - - 0 1")?;
        game.apply_san("f5")?;
        assert!(game.in_check());
        assert!(!game.in_checkmate());
        game.apply_san("gxf6")?;
        assert!(!game.in_check());
        Ok(())
    }

    #[test]
    fn test_fifty_move_rule_is_claimable_not_forced() {
        let game = GameState::from_fen("r3k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        assert!(game.in_fifty_move_draw());
        assert!(!game.in_forced_draw());
        assert_eq!(game.game_over(), None);

        let game = GameState::from_fen("r3k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        assert!(!game.in_fifty_move_draw());
    }

    #[test]
    fn test_fivefold_repetition_forces_the_draw() -> ChessResult<()> {
        let mut game = GameState::new_game();
        for _ in 0..5 {
            play(&mut game, "Nc3 Nc6 Nb1 Nb8")?;
        }
        play(&mut game, "Nc3 Nc6")?;
        assert!(game.in_repetition_draw());
        assert!(game.in_fivefold_draw());
        assert!(game.in_forced_draw());
        assert_eq!(game.game_over(), Some(GameOutcome::Draw));
        Ok(())
    }

    #[test]
    fn test_threefold_is_claimable_only() -> ChessResult<()> {
        let mut game = GameState::new_game();
        play(&mut game, "Nc3 Nc6 Nb1 Nb8 Nc3 Nc6 Nb1 Nb8 Nc3 Nc6")?;
        assert!(game.in_repetition_draw());
        assert!(!game.in_fivefold_draw());
        assert!(!game.in_forced_draw());
        assert_eq!(game.game_over(), None);
        Ok(())
    }

    #[test]
    fn test_basic_draw_cases() {
        // K vs K.
        assert!(GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - -")
            .unwrap()
            .in_basic_draw());
        // K + minor vs K.
        assert!(GameState::from_fen("4k3/8/8/8/8/5N2/8/4K3 w - -")
            .unwrap()
            .in_basic_draw());
        // Same-shade bishops.
        assert!(GameState::from_fen("7B/8/8/8/8/6k1/1b6/5K2 w - -")
            .unwrap()
            .in_basic_draw());
        // Different-shade bishops fight on.
        assert!(!GameState::from_fen("6B1/8/8/8/8/6k1/1b6/5K2 w - -")
            .unwrap()
            .in_basic_draw());
        // Bishop against knight.
        assert!(GameState::from_fen("4k3/8/2b5/8/8/5N2/8/4K3 w - -")
            .unwrap()
            .in_basic_draw());
        // Two knights against a bare king.
        assert!(GameState::from_fen("4k3/8/8/8/8/2NN4/8/4K3 w - -")
            .unwrap()
            .in_basic_draw());
        // Bishop pair is mating material, not a basic draw.
        assert!(!GameState::from_fen("4k3/8/8/8/8/2BB4/8/4K3 w - -")
            .unwrap()
            .in_basic_draw());
        // A rook is never a basic draw.
        assert!(!GameState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - -")
            .unwrap()
            .in_basic_draw());
    }

    #[test]
    fn test_mating_material_table() {
        let game = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - -").unwrap();
        assert!(game.has_mating_material(PieceTeam::Light));
        assert!(!game.has_mating_material(PieceTeam::Dark));

        // Two bishops, bishop+knight, three knights: yes.
        assert!(GameState::from_fen("4k3/8/8/8/8/2BB4/8/4K3 w - -")
            .unwrap()
            .has_mating_material(PieceTeam::Light));
        assert!(GameState::from_fen("4k3/8/8/8/8/2BN4/8/4K3 w - -")
            .unwrap()
            .has_mating_material(PieceTeam::Light));
        assert!(GameState::from_fen("4k3/8/8/8/8/1NNN4/8/4K3 w - -")
            .unwrap()
            .has_mating_material(PieceTeam::Light));

        // A lone minor, or two knights, cannot mate.
        assert!(!GameState::from_fen("4k3/8/8/8/8/2B5/8/4K3 w - -")
            .unwrap()
            .has_mating_material(PieceTeam::Light));
        assert!(!GameState::from_fen("4k3/8/8/8/8/2NN4/8/4K3 w - -")
            .unwrap()
            .has_mating_material(PieceTeam::Light));
    }
}
