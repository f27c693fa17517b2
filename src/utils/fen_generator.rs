//! GameState-to-FEN renderer.
//!
//! Produces the six-field position string, and the truncated canonical
//! fingerprints the repetition ledger is keyed by. Under Chess960 the
//! castling letters come from the detected home files whenever they differ
//! from the standard a/h rooks.

use crate::board_location::BoardLocation;
use crate::game_state::GameState;
use crate::move_description::CastleSide;
use crate::piece_team::PieceTeam;

pub fn generate_fen(game: &GameState) -> String {
    format!(
        "{} {} {}",
        generate_fingerprint(game, true),
        game.half_move_clock,
        game.full_move_count
    )
}

/// The FEN truncated to its first four fields (the canonical repetition
/// fingerprint), or to three when `include_en_passant` is false (the
/// move-count-free form).
pub fn generate_fingerprint(game: &GameState, include_en_passant: bool) -> String {
    let mut result = String::new();
    placement_field(game, &mut result);
    result.push(' ');
    result.push(game.turn.fen_char());
    result.push(' ');
    castling_field(game, &mut result);
    if include_en_passant {
        result.push(' ');
        match game.en_passant_location {
            Some(target) => result.push_str(&target.to_algebraic()),
            None => result.push('-'),
        }
    }
    result
}

fn placement_field(game: &GameState, out: &mut String) {
    for rank in (0..8).rev() {
        let mut space_count: u8 = 0;
        for file in 0..8 {
            let location = BoardLocation { file, rank };
            if let Some(record) = game.piece_register.piece_at(location) {
                if space_count > 0 {
                    out.push((b'0' + space_count) as char);
                    space_count = 0;
                }
                out.push(record.effective_class().fen_char(record.team));
            } else {
                space_count += 1;
            }
        }
        if space_count > 0 {
            out.push((b'0' + space_count) as char);
        }
        if rank > 0 {
            out.push('/');
        }
    }
}

fn castling_field(game: &GameState, out: &mut String) {
    let mut any = false;
    for (team, side) in [
        (PieceTeam::Light, CastleSide::King),
        (PieceTeam::Light, CastleSide::Queen),
        (PieceTeam::Dark, CastleSide::King),
        (PieceTeam::Dark, CastleSide::Queen),
    ] {
        if !game.can_castle(team, side) {
            continue;
        }
        any = true;
        out.push(castle_letter(game, team, side));
    }
    if !any {
        out.push('-');
    }
}

/// The letter naming one castling right: the classic K/Q/k/q, or under
/// Chess960 the rook's home-file letter when that file is not the standard
/// a/h one.
fn castle_letter(game: &GameState, team: PieceTeam, side: CastleSide) -> char {
    let standard_file = match side {
        CastleSide::King => 7,
        CastleSide::Queen => 0,
    };
    let rook_file = game.chess960.rook_file(side);
    let letter = if game.chess960.enabled && rook_file != standard_file {
        (b'a' + rook_file) as char
    } else {
        match side {
            CastleSide::King => 'k',
            CastleSide::Queen => 'q',
        }
    };
    match team {
        PieceTeam::Light => letter.to_ascii_uppercase(),
        PieceTeam::Dark => letter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::STARTING_POSITION_FEN;

    #[test]
    fn renders_the_starting_position() {
        let game = GameState::new_game();
        assert_eq!(generate_fen(&game), STARTING_POSITION_FEN);
    }

    #[test]
    fn compresses_empty_runs_per_rank() {
        let fen = "8/bpp1k2p/p2pP1p1/P5q1/1P5N/8/6PP/5Q1K b - - 0 35";
        let game = GameState::from_fen(fen).unwrap();
        assert_eq!(generate_fen(&game), fen);
    }

    #[test]
    fn fingerprint_forms() {
        let game =
            GameState::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2")
                .unwrap();
        assert_eq!(
            generate_fingerprint(&game, true),
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3"
        );
        assert_eq!(
            generate_fingerprint(&game, false),
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq"
        );
    }
}
