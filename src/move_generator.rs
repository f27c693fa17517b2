//! Per-piece pseudo-legal destination sets.
//!
//! For each piece class this module produces the destinations from a square
//! that respect geometry and occupancy, including en passant and the castle
//! target squares, but ignore whether the own king is left in check. That
//! last filter belongs to the move applier, which tries the move inside a
//! transaction and asks the threat detector.

use crate::board_location::BoardLocation;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::GameState;
use crate::geometry;
use crate::move_description::CastleSide;
use crate::piece_class::PieceClass;
use crate::piece_record::PieceRecord;
use crate::piece_team::PieceTeam;

/// Generates every pseudo-legal destination for the piece standing on
/// `start`.
///
/// # Returns
/// * `Ok(Vec<BoardLocation>)` - The destinations, without the own-king
///   safety filter applied.
/// * `Err(ChessErrors::NoPiece)` - If `start` is empty.
pub fn generate_destinations(
    game: &GameState,
    start: BoardLocation,
) -> ChessResult<Vec<BoardLocation>> {
    let record = game
        .piece_register
        .piece_at(start)
        .ok_or(ChessErrors::NoPiece { square: start })?;
    let result = match record.effective_class() {
        PieceClass::Pawn => pawn_destinations(game, record),
        PieceClass::Knight => knight_destinations(game, record),
        PieceClass::Bishop => {
            slider_destinations(game, record, &geometry::DIAGONAL_DIRECTIONS)
        }
        PieceClass::Rook => slider_destinations(game, record, &geometry::ORTHOGONAL_DIRECTIONS),
        PieceClass::Queen => {
            let mut moves =
                slider_destinations(game, record, &geometry::ORTHOGONAL_DIRECTIONS);
            moves.extend(slider_destinations(
                game,
                record,
                &geometry::DIAGONAL_DIRECTIONS,
            ));
            moves
        }
        PieceClass::King => king_destinations(game, record),
    };
    Ok(result)
}

fn is_own(game: &GameState, team: PieceTeam, square: BoardLocation) -> bool {
    game.piece_register
        .piece_at(square)
        .map(|r| r.team == team)
        .unwrap_or(false)
}

fn is_enemy(game: &GameState, team: PieceTeam, square: BoardLocation) -> bool {
    game.piece_register
        .piece_at(square)
        .map(|r| r.team != team)
        .unwrap_or(false)
}

fn pawn_destinations(game: &GameState, record: &PieceRecord) -> Vec<BoardLocation> {
    let mut result = Vec::new();
    let start = record.location;
    let forward = record.team.forward();

    // Forward march, and the double step off the pawn rank.
    if let Some(step) = start.offset(0, forward) {
        if game.piece_register.piece_at(step).is_none() {
            result.push(step);
            if start.rank == record.team.pawn_rank() {
                if let Some(double) = start.offset(0, 2 * forward) {
                    if game.piece_register.piece_at(double).is_none() {
                        result.push(double);
                    }
                }
            }
        }
    }

    // Diagonal captures, including onto the en-passant target.
    for d_file in [-1, 1] {
        if let Some(stop) = start.offset(d_file, forward) {
            if is_enemy(game, record.team, stop) {
                result.push(stop);
            } else if game.en_passant_location == Some(stop) && record.team == game.turn {
                result.push(stop);
            }
        }
    }

    result
}

fn knight_destinations(game: &GameState, record: &PieceRecord) -> Vec<BoardLocation> {
    geometry::knight_jumps(record.location)
        .into_iter()
        .filter(|stop| !is_own(game, record.team, *stop))
        .collect()
}

/// Walks each ray closer-first, taking squares up to the first blocker and
/// including it when it is an enemy.
fn slider_destinations(
    game: &GameState,
    record: &PieceRecord,
    directions: &[(i8, i8)],
) -> Vec<BoardLocation> {
    let mut result = Vec::new();
    for &direction in directions {
        for stop in geometry::ray(record.location, direction) {
            match game.piece_register.piece_at(stop) {
                None => result.push(stop),
                Some(blocker) => {
                    if blocker.team != record.team {
                        result.push(stop);
                    }
                    break;
                }
            }
        }
    }
    result
}

fn king_destinations(game: &GameState, record: &PieceRecord) -> Vec<BoardLocation> {
    let mut result: Vec<BoardLocation> = geometry::king_steps(record.location)
        .into_iter()
        .filter(|stop| !is_own(game, record.team, *stop))
        .collect();

    // Castle targets, offered whenever the rights bit is still up; the
    // applier walks the king across and enforces the rest of the rules.
    let home_rank = record.team.home_rank();
    if record.location.rank == home_rank && record.location.file == game.chess960.king_file {
        for side in [CastleSide::King, CastleSide::Queen] {
            if !game.can_castle(record.team, side) {
                continue;
            }
            for file in castle_target_files(game, side) {
                if let Ok(target) = BoardLocation::from_file_rank(file, home_rank) {
                    if target != record.location && !result.contains(&target) {
                        result.push(target);
                    }
                }
            }
        }
    }

    result
}

/// The files a castling king may be told to land on: the conventional g/c
/// file, and under Chess960 also the implicated rook's home file.
fn castle_target_files(game: &GameState, side: CastleSide) -> Vec<u8> {
    let mut files = vec![side.king_target_file()];
    if game.chess960.enabled {
        let rook_file = game.chess960.rook_file(side);
        if rook_file != side.king_target_file() {
            files.push(rook_file);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> BoardLocation {
        BoardLocation::from_algebraic(s).unwrap()
    }

    fn destinations(fen: &str, from: &str) -> Vec<String> {
        let game = GameState::from_fen(fen).unwrap();
        let mut names: Vec<String> = generate_destinations(&game, sq(from))
            .unwrap()
            .iter()
            .map(|l| l.to_algebraic())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_pawn_moves() {
        // Free pawn on its home rank: single and double step.
        assert_eq!(
            destinations("3k4/8/8/8/8/8/4P3/3K4 w - - 0 1", "e2"),
            ["e3", "e4"]
        );
        // A capture adds the diagonal.
        assert_eq!(
            destinations("3k4/8/8/8/8/3p4/4P3/3K4 w - - 0 1", "e2"),
            ["d3", "e3", "e4"]
        );
        // Blocked ahead, capture only.
        assert_eq!(
            destinations("3k4/8/8/8/8/3pP3/4P3/3K4 w - - 0 1", "e2"),
            ["d3"]
        );
        // A pawn may not jump over a piece on its double step.
        assert_eq!(
            destinations("3k4/8/8/8/8/4p3/4P3/3K4 w - - 0 1", "e2"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_pawn_en_passant_target() {
        let game =
            GameState::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2")
                .unwrap();
        let stops = generate_destinations(&game, sq("d4")).unwrap();
        assert!(stops.contains(&sq("e3")));
        assert!(stops.contains(&sq("d3")));
    }

    #[test]
    fn test_knight_moves() {
        assert_eq!(
            destinations("6k1/7p/3p2p1/p2P4/P1PpprP1/1r5P/1P1N1PK1/8 w - - 0 34", "d2").len(),
            5
        );
        assert_eq!(destinations("N6k/8/8/8/8/8/8/7K w - - 0 1", "a8"), ["b6", "c7"]);
    }

    #[test]
    fn test_slider_moves() {
        // Bishop pair of diagonals cut by friends and enemies.
        assert_eq!(
            destinations(
                "r2qk2r/1p1b1ppp/p1n1pn2/2b5/3P1B2/5N2/PPP1BPPP/R2QK2R w KQkq - 0 10",
                "e2"
            )
            .len(),
            5
        );
        // Rook stopped by the first blocker each way, capturing the enemy.
        assert_eq!(
            destinations("4k2r/5ppp/p1nrp3/8/2R5/1P6/P4PPP/5R1K w k - 0 25", "c4").len(),
            12
        );
        // Queen sweeps both families of rays.
        assert_eq!(
            destinations(
                "r3k2r/1p1b1ppp/p1nBpn2/3q4/8/5N2/PPPQBPPP/R3K2R w KQkq - 2 13",
                "d2"
            )
            .len(),
            12
        );
    }

    #[test]
    fn test_king_moves_and_castle_targets() {
        // Boxed-in king.
        assert_eq!(
            destinations(
                "r3qrk1/pp3pb1/2pn1R1p/4P2Q/3p4/2NB3P/PPP3P1/R5K1 w - - 0 21",
                "g1"
            )
            .len(),
            4
        );
        // Both castle targets appear while the rights are up.
        let stops = destinations(
            "r3k2r/ppp1qppp/2np1n2/1Bb1p3/4P1b1/2NP1N2/PPPBQPPP/R3K2R w KQkq - 4 8",
            "e1",
        );
        assert!(stops.contains(&"g1".to_string()));
        assert!(stops.contains(&"c1".to_string()));
        // No rights, no castle targets.
        let stops = destinations(
            "r3k2r/ppp1qppp/2np1n2/1Bb1p3/4P1b1/2NP1N2/PPPBQPPP/R3K2R w - - 4 8",
            "e1",
        );
        assert!(!stops.contains(&"g1".to_string()));
        assert!(!stops.contains(&"c1".to_string()));
    }

    #[test]
    fn test_empty_square_is_an_error() {
        let game = GameState::new_game();
        assert!(matches!(
            generate_destinations(&game, sq("e4")),
            Err(ChessErrors::NoPiece { .. })
        ));
    }
}
