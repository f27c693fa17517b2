//! SAN tokenizer and renderer.
//!
//! The parser turns one SAN token into a [`MoveDescription`] without looking
//! at any position; origin resolution and legality belong to the move
//! applier. The renderer does the reverse for an already-resolved move,
//! emitting the minimal disambiguation among the origins that could also
//! reach the destination. Check and mate suffixes are appended by the
//! applier when it writes the annotated log, never here.

use crate::board_location::BoardLocation;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::GameState;
use crate::move_description::{CastleSide, MoveDescription, StandardMove};
use crate::move_generator;
use crate::piece_class::PieceClass;
use crate::piece_record::PieceRecord;

/// Strips trailing check, mate, and commentary marks from a SAN token.
pub fn trim_annotation_suffix(token: &str) -> &str {
    token.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

fn parse_square(s: &str) -> Option<BoardLocation> {
    let bytes = s.as_bytes();
    if bytes.len() != 2
        || !(b'a'..=b'h').contains(&bytes[0])
        || !(b'1'..=b'8').contains(&bytes[1])
    {
        return None;
    }
    Some(BoardLocation {
        file: bytes[0] - b'a',
        rank: bytes[1] - b'1',
    })
}

/// Splits `rest` into everything before the destination and the destination
/// square itself.
fn split_destination(rest: &str) -> Option<(&str, BoardLocation)> {
    if rest.len() < 2 {
        return None;
    }
    let (head, tail) = rest.split_at(rest.len() - 2);
    Some((head, parse_square(tail)?))
}

fn strip_capture(mid: &str) -> (&str, bool) {
    match mid.strip_suffix('x') {
        Some(stripped) => (stripped, true),
        None => (mid, false),
    }
}

/// Parses an optional disambiguation: a file, a rank (pieces only), or a
/// full square.
fn parse_disambiguation(mid: &str, allow_rank_only: bool) -> Option<(Option<u8>, Option<u8>)> {
    let bytes = mid.as_bytes();
    match bytes {
        [] => Some((None, None)),
        [f] if (b'a'..=b'h').contains(f) => Some((Some(f - b'a'), None)),
        [r] if (b'1'..=b'8').contains(r) && allow_rank_only => Some((None, Some(r - b'1'))),
        [f, r] if (b'a'..=b'h').contains(f) && (b'1'..=b'8').contains(r) => {
            Some((Some(f - b'a'), Some(r - b'1')))
        }
        _ => None,
    }
}

/// Parses one SAN token into a structured move description.
pub fn parse_san(input: &str) -> ChessResult<MoveDescription> {
    let token = input.trim();
    let invalid = || ChessErrors::InvalidSAN { san: token.into() };
    if !token.is_ascii() {
        return Err(invalid());
    }
    let base = trim_annotation_suffix(token);
    if base.is_empty() {
        return Err(invalid());
    }

    match base {
        "O-O" => return Ok(MoveDescription::Castle(CastleSide::King)),
        "O-O-O" => return Ok(MoveDescription::Castle(CastleSide::Queen)),
        _ => {}
    }

    // Piece placement, e.g. `Q@e4` or `P@e4`.
    if let Some(at) = base.find('@') {
        let mut head = base[..at].chars();
        let class = match (head.next(), head.next()) {
            (Some(c), None) => {
                PieceClass::from_san_letter(c).filter(|k| *k != PieceClass::King)
            }
            _ => None,
        }
        .ok_or_else(invalid)?;
        let destination = parse_square(&base[at + 1..]).ok_or_else(invalid)?;
        return Ok(MoveDescription::Placement { class, destination });
    }

    // Promotion suffix: `=Q`, or a bare trailing letter right after the
    // destination square.
    let (core, promotion) = if let Some(eq) = base.rfind('=') {
        let tail = &base[eq + 1..];
        let class = match tail.as_bytes() {
            [c @ (b'Q' | b'R' | b'N' | b'B')] => PieceClass::from_san_letter(*c as char),
            _ => None,
        }
        .ok_or_else(invalid)?;
        (&base[..eq], Some(class))
    } else {
        let bytes = base.as_bytes();
        let n = bytes.len();
        if n >= 3
            && matches!(bytes[n - 1], b'Q' | b'R' | b'N' | b'B')
            && parse_square(&base[n - 3..n - 1]).is_some()
        {
            (
                &base[..n - 1],
                PieceClass::from_san_letter(bytes[n - 1] as char),
            )
        } else {
            (base, None)
        }
    };
    if core.is_empty() {
        return Err(invalid());
    }

    let first = core.chars().next().ok_or_else(invalid)?;
    match first {
        'K' => {
            // A king token is K, an optional x, and the square.
            if promotion.is_some() {
                return Err(invalid());
            }
            let (head, destination) = split_destination(&core[1..]).ok_or_else(invalid)?;
            let (head, capture) = strip_capture(head);
            if !head.is_empty() {
                return Err(invalid());
            }
            Ok(MoveDescription::Standard(StandardMove {
                class: PieceClass::King,
                from_file: None,
                from_rank: None,
                capture,
                destination,
                promotion: None,
                from: None,
            }))
        }
        'Q' | 'R' | 'B' | 'N' => {
            if promotion.is_some() {
                return Err(invalid());
            }
            let class = PieceClass::from_san_letter(first).ok_or_else(invalid)?;
            let (head, destination) = split_destination(&core[1..]).ok_or_else(invalid)?;
            let (head, capture) = strip_capture(head);
            let (from_file, from_rank) =
                parse_disambiguation(head, true).ok_or_else(invalid)?;
            Ok(MoveDescription::Standard(StandardMove {
                class,
                from_file,
                from_rank,
                capture,
                destination,
                promotion: None,
                from: None,
            }))
        }
        _ => {
            // Pawn move; the P prefix is tolerated but not required.
            let rest = if first == 'P' { &core[1..] } else { core };
            let (head, destination) = split_destination(rest).ok_or_else(invalid)?;
            let (head, capture) = strip_capture(head);
            let (from_file, from_rank) =
                parse_disambiguation(head, false).ok_or_else(invalid)?;
            Ok(MoveDescription::Standard(StandardMove {
                class: PieceClass::Pawn,
                from_file,
                from_rank,
                capture,
                destination,
                promotion,
                from: None,
            }))
        }
    }
}

/// Renders the minimal SAN for a validated standard move against the
/// position it is about to be played in.
pub fn render_san(
    game: &GameState,
    from: BoardLocation,
    to: BoardLocation,
    promotion: Option<PieceClass>,
) -> ChessResult<String> {
    let record = game
        .piece_register
        .piece_at(from)
        .ok_or(ChessErrors::NoPiece { square: from })?;
    let class = record.effective_class();
    let is_pawn = class == PieceClass::Pawn;

    let direct_capture = game
        .piece_register
        .piece_at(to)
        .map(|t| t.team != record.team)
        .unwrap_or(false);
    let en_passant =
        is_pawn && !direct_capture && game.en_passant_location == Some(to) && from.file != to.file;
    let capture = direct_capture || en_passant;

    let mut out = String::new();
    if !is_pawn {
        out.push(class.san_letter());
        out.push_str(&disambiguation(game, record, to));
    } else if capture {
        // Pawn captures always carry the origin file.
        out.push(from.file_char());
    }
    if capture {
        out.push('x');
    }
    out.push_str(&to.to_algebraic());
    if let Some(promo) = promotion {
        out.push('=');
        out.push(promo.san_letter());
    }
    Ok(out)
}

/// The smallest marker distinguishing this origin among the other same-kind
/// pieces whose destination sets also contain `to`: nothing, then the file,
/// then the rank, then the full square.
fn disambiguation(game: &GameState, record: &PieceRecord, to: BoardLocation) -> String {
    let from = record.location;
    let alternatives: Vec<BoardLocation> = game
        .piece_register
        .iter_team(record.team)
        .filter(|(_, r)| {
            r.location != from && r.effective_class() == record.effective_class()
        })
        .filter(|(_, r)| {
            move_generator::generate_destinations(game, r.location)
                .map(|stops| stops.contains(&to))
                .unwrap_or(false)
        })
        .map(|(_, r)| r.location)
        .collect();

    if alternatives.is_empty() {
        String::new()
    } else if !alternatives.iter().any(|a| a.file == from.file) {
        from.file_char().to_string()
    } else if !alternatives.iter().any(|a| a.rank == from.rank) {
        from.rank_char().to_string()
    } else {
        from.to_algebraic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> BoardLocation {
        BoardLocation::from_algebraic(s).unwrap()
    }

    fn standard(desc: MoveDescription) -> StandardMove {
        match desc {
            MoveDescription::Standard(sm) => sm,
            other => panic!("expected a standard move, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_castles() {
        assert_eq!(
            parse_san("O-O").unwrap(),
            MoveDescription::Castle(CastleSide::King)
        );
        assert_eq!(
            parse_san("O-O-O+").unwrap(),
            MoveDescription::Castle(CastleSide::Queen)
        );
    }

    #[test]
    fn test_parse_pawn_forms() {
        let sm = standard(parse_san("e4").unwrap());
        assert_eq!(sm.class, PieceClass::Pawn);
        assert_eq!(sm.destination, sq("e4"));
        assert!(!sm.capture);
        assert_eq!(sm.from_file, None);

        let sm = standard(parse_san("Pe4").unwrap());
        assert_eq!(sm.destination, sq("e4"));

        let sm = standard(parse_san("exd5").unwrap());
        assert!(sm.capture);
        assert_eq!(sm.from_file, Some(4));
        assert_eq!(sm.destination, sq("d5"));

        let sm = standard(parse_san("e8=Q").unwrap());
        assert_eq!(sm.promotion, Some(PieceClass::Queen));
        let sm = standard(parse_san("e8Q").unwrap());
        assert_eq!(sm.promotion, Some(PieceClass::Queen));
        let sm = standard(parse_san("exd8=N+").unwrap());
        assert!(sm.capture);
        assert_eq!(sm.promotion, Some(PieceClass::Knight));
        assert_eq!(sm.from_file, Some(4));
    }

    #[test]
    fn test_parse_piece_forms() {
        let sm = standard(parse_san("Nf3").unwrap());
        assert_eq!(sm.class, PieceClass::Knight);
        assert_eq!(sm.destination, sq("f3"));

        let sm = standard(parse_san("Nbd7").unwrap());
        assert_eq!(sm.from_file, Some(1));
        assert_eq!(sm.from_rank, None);

        let sm = standard(parse_san("R1a3").unwrap());
        assert_eq!(sm.from_file, None);
        assert_eq!(sm.from_rank, Some(0));

        let sm = standard(parse_san("Qh4xe1#").unwrap());
        assert_eq!(sm.from_file, Some(7));
        assert_eq!(sm.from_rank, Some(3));
        assert!(sm.capture);

        let sm = standard(parse_san("Kxe2").unwrap());
        assert_eq!(sm.class, PieceClass::King);
        assert!(sm.capture);
    }

    #[test]
    fn test_parse_placement_forms() {
        assert_eq!(
            parse_san("Q@e4").unwrap(),
            MoveDescription::Placement {
                class: PieceClass::Queen,
                destination: sq("e4"),
            }
        );
        assert_eq!(
            parse_san("P@h6").unwrap(),
            MoveDescription::Placement {
                class: PieceClass::Pawn,
                destination: sq("h6"),
            }
        );
        assert!(matches!(
            parse_san("K@e4"),
            Err(ChessErrors::InvalidSAN { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_junk() {
        for bad in [
            "", "e9", "i4", "Ne", "O-O-O-O", "e8=K", "Nf3=Q", "xe4x", "9xe4", "Pe", "=Q",
        ] {
            assert!(
                matches!(parse_san(bad), Err(ChessErrors::InvalidSAN { .. })),
                "`{bad}` should not parse"
            );
        }
    }

    #[test]
    fn test_render_minimal_disambiguation() {
        // Two knights a file apart: the file disambiguates.
        let game =
            GameState::from_fen("rnbqkbnr/pppppppp/8/8/8/3P1N2/PPP1PPPP/RNBQKB1R w KQkq - 0 1")
                .unwrap();
        assert_eq!(render_san(&game, sq("b1"), sq("d2"), None).unwrap(), "Nbd2");

        // Lone piece: no disambiguation at all.
        assert_eq!(render_san(&game, sq("d1"), sq("d2"), None).unwrap(), "Qd2");

        // Two rooks on one file: the rank disambiguates.
        let game = GameState::from_fen("4k3/8/8/8/7R/8/8/4K2R w K - 0 1").unwrap();
        assert_eq!(render_san(&game, sq("h4"), sq("h2"), None).unwrap(), "R4h2");

        // Three queens in an L: only the full square pins one down.
        let game = GameState::from_fen("4k3/8/8/8/Q6Q/8/8/Q3K3 w - - 0 1").unwrap();
        assert_eq!(render_san(&game, sq("a4"), sq("d4"), None).unwrap(), "Qa4d4");
    }

    #[test]
    fn test_render_captures_and_promotions() {
        let game = GameState::from_fen("4k3/8/8/3p4/4B3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(render_san(&game, sq("e4"), sq("d5"), None).unwrap(), "Bxd5");

        // Pawn captures carry the origin file.
        let game = GameState::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(render_san(&game, sq("e4"), sq("d5"), None).unwrap(), "exd5");

        // En passant renders as a capture though the square is empty.
        let game =
            GameState::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2")
                .unwrap();
        assert_eq!(render_san(&game, sq("d4"), sq("e3"), None).unwrap(), "dxe3");

        let game = GameState::from_fen("4k3/2P5/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            render_san(&game, sq("c7"), sq("c8"), Some(PieceClass::Queen)).unwrap(),
            "c8=Q"
        );
    }
}
