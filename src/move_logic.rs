//! The move applier state machine.
//!
//! Every entry point funnels into the same pipeline: parse or convert the
//! input into a [`MoveDescription`], resolve the origin square, render the
//! minimal SAN for the log, execute the mutation, then annotate and update
//! the repetition ledger. The whole attempt runs inside a transactional
//! snapshot, so any failure along the way restores the state observed on
//! entry, move log included.

use crate::board_location::BoardLocation;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::GameState;
use crate::game_status;
use crate::inspect_check;
use crate::move_description::{CastleSide, MoveDescription};
use crate::move_generator;
use crate::piece_class::PieceClass;
use crate::piece_team::PieceTeam;
use crate::utils::san;

/// A move description whose origin square has been pinned down and whose
/// promotion has been defaulted; the only thing left is to play it.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedMove {
    Castle(CastleSide),
    Standard {
        from: BoardLocation,
        to: BoardLocation,
        promotion: Option<PieceClass>,
        capture_marked: bool,
    },
}

/// Validates and applies one SAN move for the side to move.
pub fn apply_san(game: &mut GameState, input: &str) -> ChessResult<()> {
    let desc = san::parse_san(input)?;
    apply_parsed(game, desc, input.trim())
}

/// Applies a `(from, to, promotion?)` square pair by converting it to SAN
/// and re-parsing, so validation and logging are uniform with SAN input.
pub fn apply_move_pair(
    game: &mut GameState,
    from: BoardLocation,
    to: BoardLocation,
    promotion: Option<PieceClass>,
) -> ChessResult<()> {
    let record = *game
        .piece_register
        .piece_at(from)
        .ok_or(ChessErrors::NoPiece { square: from })?;
    if record.team != game.turn {
        return Err(ChessErrors::WrongColor {
            color: record.team,
            piece: record.effective_class(),
            square: from,
        });
    }

    // A king jumping two files along its home rank, or landing on the
    // castling rook's home square, is the pair spelling of a castle.
    if record.effective_class() == PieceClass::King {
        if let Some(side) = detect_castle_from_king_move(game, to) {
            return apply_parsed(game, MoveDescription::Castle(side), side.san());
        }
    }

    if let Some(target) = game.piece_register.piece_at(to) {
        if target.team == game.turn {
            return Err(ChessErrors::CantCaptureOwn {
                color: target.team,
                piece: target.effective_class(),
                square: to,
            });
        }
    }

    let promoting =
        record.effective_class() == PieceClass::Pawn && (to.rank == 0 || to.rank == 7);
    if let Some(piece) = promotion {
        if !promoting || matches!(piece, PieceClass::King | PieceClass::Pawn) {
            return Err(ChessErrors::InvalidPromote { piece });
        }
    }
    let promotion = if promoting {
        Some(promotion.unwrap_or(PieceClass::Queen))
    } else {
        promotion
    };

    let san_text = san::render_san(game, from, to, promotion)?;
    let mut desc = san::parse_san(&san_text)?;
    if let MoveDescription::Standard(sm) = &mut desc {
        sm.from = Some(from);
    }
    apply_parsed(game, desc, &san_text)
}

fn apply_parsed(game: &mut GameState, desc: MoveDescription, text: &str) -> ChessResult<()> {
    game.begin();
    match apply_inner(game, &desc, text) {
        Ok(()) => {
            game.commit();
            Ok(())
        }
        Err(e) => {
            game.rollback();
            Err(e)
        }
    }
}

fn apply_inner(game: &mut GameState, desc: &MoveDescription, text: &str) -> ChessResult<()> {
    let resolved = resolve(game, desc, text)?;

    // The log entry is rendered against the position the move is played in.
    let base_san = match &resolved {
        ResolvedMove::Castle(side) => side.san().to_string(),
        ResolvedMove::Standard {
            from, to, promotion, ..
        } => san::render_san(game, *from, *to, *promotion)?,
    };

    // A hand-built position has an empty ledger until its first move; count
    // the position being left so repetition sees the whole game.
    if game.repetition_ledger.is_empty() {
        let key = game.get_fingerprint();
        game.repetition_ledger.insert(key, 1);
    }

    execute(game, &resolved)?;

    game.san_log.push(base_san.clone());
    let suffix = if inspect_check::in_check(&game.piece_register, game.turn) {
        if game_status::in_checkmate(game) {
            "#"
        } else {
            "+"
        }
    } else {
        ""
    };
    game.san_log_annotated.push(format!("{base_san}{suffix}"));

    let key = game.get_fingerprint();
    *game.repetition_ledger.entry(key).or_insert(0) += 1;
    Ok(())
}

/// Decides whether a king move written as a destination square is really a
/// castle: two or more files of travel along the home rank with the rights
/// still up, or the implicated rook's own home square.
pub(crate) fn detect_castle_from_king_move(
    game: &GameState,
    to: BoardLocation,
) -> Option<CastleSide> {
    let king = game.piece_register.king(game.turn)?;
    let from = king.location;
    if to.rank != game.turn.home_rank() || from.rank != game.turn.home_rank() {
        return None;
    }
    let side = if to.file > from.file {
        CastleSide::King
    } else if to.file < from.file {
        CastleSide::Queen
    } else {
        return None;
    };
    if !game.can_castle(game.turn, side) {
        return None;
    }
    let span = (to.file as i8 - from.file as i8).abs();
    if span >= 2 || to.file == game.chess960.rook_file(side) {
        Some(side)
    } else {
        None
    }
}

fn promotion_default(
    game: &GameState,
    from: BoardLocation,
    to: BoardLocation,
    requested: Option<PieceClass>,
) -> Option<PieceClass> {
    let is_pawn = game
        .piece_register
        .piece_at(from)
        .map(|r| r.effective_class() == PieceClass::Pawn)
        .unwrap_or(false);
    if is_pawn && (to.rank == 0 || to.rank == 7) {
        Some(requested.unwrap_or(PieceClass::Queen))
    } else {
        requested
    }
}

/// Pins down the origin square of a parsed move: collect every piece of the
/// named kind that reaches the destination, narrow by the disambiguation,
/// and if more than one candidate remains keep only those whose move leaves
/// the own king safe.
fn resolve(
    game: &mut GameState,
    desc: &MoveDescription,
    text: &str,
) -> ChessResult<ResolvedMove> {
    let sm = match desc {
        MoveDescription::Castle(side) => return Ok(ResolvedMove::Castle(*side)),
        MoveDescription::Placement { class, destination } => {
            // Placement moves parse, but a standard game does not play them.
            if *class == PieceClass::Pawn && (destination.rank == 0 || destination.rank == 7) {
                return Err(ChessErrors::CantPlaceOnBackRank {
                    square: *destination,
                });
            }
            return Err(ChessErrors::NoPieceCanDoThat {
                piece: *class,
                square: *destination,
            });
        }
        MoveDescription::Standard(sm) => sm,
    };

    if let Some(piece) = sm.promotion {
        if matches!(piece, PieceClass::King | PieceClass::Pawn) {
            return Err(ChessErrors::InvalidPromote { piece });
        }
    }
    let to = sm.destination;

    if let Some(from) = sm.from {
        let promotion = promotion_default(game, from, to, sm.promotion);
        return Ok(ResolvedMove::Standard {
            from,
            to,
            promotion,
            capture_marked: sm.capture,
        });
    }

    if sm.class == PieceClass::King {
        if let Some(side) = detect_castle_from_king_move(game, to) {
            return Ok(ResolvedMove::Castle(side));
        }
    }

    let candidates: Vec<BoardLocation> = game
        .piece_register
        .iter_team(game.turn)
        .filter(|(_, r)| r.effective_class() == sm.class)
        .map(|(_, r)| r.location)
        .collect();
    let mut reachable = Vec::new();
    for location in candidates {
        if move_generator::generate_destinations(game, location)?.contains(&to) {
            reachable.push(location);
        }
    }
    if reachable.is_empty() {
        return Err(ChessErrors::NoPieceCanDoThat {
            piece: sm.class,
            square: to,
        });
    }

    let filtered: Vec<BoardLocation> = reachable
        .into_iter()
        .filter(|l| sm.from_file.map(|f| l.file == f).unwrap_or(true))
        .filter(|l| sm.from_rank.map(|r| l.rank == r).unwrap_or(true))
        .collect();
    if filtered.is_empty() {
        return Err(ChessErrors::NoPieceCanDoThat {
            piece: sm.class,
            square: to,
        });
    }

    let from = if filtered.len() == 1 {
        filtered[0]
    } else {
        let mut survivors = Vec::new();
        for candidate in &filtered {
            let attempt = ResolvedMove::Standard {
                from: *candidate,
                to,
                promotion: promotion_default(game, *candidate, to, sm.promotion),
                capture_marked: sm.capture,
            };
            game.begin();
            let ok = execute(game, &attempt).is_ok();
            game.rollback();
            if ok {
                survivors.push(*candidate);
            }
        }
        match survivors.as_slice() {
            [only] => *only,
            // Nothing survives: fall through with one candidate so execute
            // can report why the move is impossible.
            [] => filtered[0],
            _ => return Err(ChessErrors::Ambiguous { san: text.into() }),
        }
    };

    Ok(ResolvedMove::Standard {
        from,
        to,
        promotion: promotion_default(game, from, to, sm.promotion),
        capture_marked: sm.capture,
    })
}

pub(crate) fn execute(game: &mut GameState, resolved: &ResolvedMove) -> ChessResult<()> {
    match resolved {
        ResolvedMove::Castle(side) => execute_castle(game, *side),
        ResolvedMove::Standard {
            from,
            to,
            promotion,
            capture_marked,
        } => execute_standard(game, *from, *to, *promotion, *capture_marked),
    }
}

fn execute_standard(
    game: &mut GameState,
    from: BoardLocation,
    to: BoardLocation,
    promotion: Option<PieceClass>,
    capture_marked: bool,
) -> ChessResult<()> {
    let turn = game.turn;
    let record = *game
        .piece_register
        .piece_at(from)
        .ok_or(ChessErrors::NoPiece { square: from })?;
    if record.team != turn {
        return Err(ChessErrors::WrongColor {
            color: record.team,
            piece: record.effective_class(),
            square: from,
        });
    }
    if let Some(target) = game.piece_register.piece_at(to) {
        if target.team == turn {
            return Err(ChessErrors::CantCaptureOwn {
                color: target.team,
                piece: target.effective_class(),
                square: to,
            });
        }
    }

    let is_pawn = record.effective_class() == PieceClass::Pawn;
    let promoting = is_pawn && (to.rank == 0 || to.rank == 7);
    if let Some(piece) = promotion {
        if !promoting {
            return Err(ChessErrors::InvalidPromote { piece });
        }
    }

    if !move_generator::generate_destinations(game, from)?.contains(&to) {
        return Err(ChessErrors::CantMoveThatWay {
            piece: record.effective_class(),
            square: from,
            destination: to,
        });
    }

    let was_in_check = inspect_check::in_check(&game.piece_register, turn);
    let en_passant_capture = is_pawn
        && from.file != to.file
        && game.piece_register.piece_at(to).is_none()
        && game.en_passant_location == Some(to);
    if capture_marked && game.piece_register.piece_at(to).is_none() && !en_passant_capture {
        return Err(ChessErrors::NoPiece { square: to });
    }

    // The capture, then the move itself.
    let mut captured = None;
    if en_passant_capture {
        let victim_square = BoardLocation {
            file: to.file,
            rank: from.rank,
        };
        captured = Some(game.piece_register.remove(victim_square)?);
    }
    if let Some(direct) = game.piece_register.relocate(from, to)? {
        captured = Some(direct);
    }
    if promoting {
        game.piece_register
            .promote(to, promotion.unwrap_or(PieceClass::Queen))?;
    }

    if inspect_check::in_check(&game.piece_register, turn) {
        return Err(if was_in_check {
            ChessErrors::StillInCheck {
                color: turn,
                square: to,
            }
        } else {
            ChessErrors::MoveWouldCheck {
                color: turn,
                square: to,
            }
        });
    }

    if let Some(victim) = captured {
        game.captured[victim.team.index()].push(victim.effective_class());
        // Capturing the rook on its home square takes the right with it.
        if victim.effective_class() == PieceClass::Rook {
            clear_right_on_rook_square(game, victim.team, victim.location);
        }
    }

    if captured.is_some() || is_pawn {
        game.half_move_clock = 0;
    } else {
        game.half_move_clock += 1;
    }

    game.en_passant_location = if is_pawn && (to.rank as i8 - from.rank as i8).abs() == 2 {
        Some(BoardLocation {
            file: from.file,
            rank: (to.rank + from.rank) / 2,
        })
    } else {
        None
    };

    if record.effective_class() == PieceClass::King {
        game.castling_rights[turn.index()] = [false, false];
    }
    if record.effective_class() == PieceClass::Rook {
        clear_right_on_rook_square(game, turn, from);
    }

    game.turn = turn.opposite();
    if game.turn == PieceTeam::Light {
        game.full_move_count += 1;
    }
    Ok(())
}

/// Drops a side's castling right when its rook leaves or is taken from the
/// named home square.
fn clear_right_on_rook_square(game: &mut GameState, team: PieceTeam, square: BoardLocation) {
    if square.rank != team.home_rank() {
        return;
    }
    for side in [CastleSide::King, CastleSide::Queen] {
        if square.file == game.chess960.rook_file(side) {
            game.castling_rights[team.index()][side.index()] = false;
        }
    }
}

fn execute_castle(game: &mut GameState, side: CastleSide) -> ChessResult<()> {
    let turn = game.turn;
    let color = turn;
    if inspect_check::in_check(&game.piece_register, turn) {
        return Err(ChessErrors::InCheck { color });
    }
    if !game.can_castle(turn, side) {
        return Err(side.missing_right_error(color));
    }

    let home = turn.home_rank();
    let king_from = game
        .piece_register
        .king(turn)
        .ok_or_else(|| side.missing_right_error(color))?
        .location;
    let rook_from = BoardLocation {
        file: game.chess960.rook_file(side),
        rank: home,
    };
    let rook_ok = game
        .piece_register
        .piece_at(rook_from)
        .map(|r| r.team == turn && r.effective_class() == PieceClass::Rook)
        .unwrap_or(false);
    if !rook_ok {
        return Err(side.missing_right_error(color));
    }

    let king_to = BoardLocation {
        file: side.king_target_file(),
        rank: home,
    };
    let rook_to = BoardLocation {
        file: side.rook_target_file(),
        rank: home,
    };

    // Every square the king-rook span or either walk touches must be empty,
    // the two castling pieces aside.
    let spans = [
        (king_from.file, rook_from.file),
        (king_from.file, king_to.file),
        (rook_from.file, rook_to.file),
    ];
    for file in 0..8u8 {
        let touched = spans
            .iter()
            .any(|(a, b)| (*a.min(b)..=*a.max(b)).contains(&file));
        if !touched {
            continue;
        }
        let square = BoardLocation { file, rank: home };
        if square == king_from || square == rook_from {
            continue;
        }
        if game.piece_register.piece_at(square).is_some() {
            return Err(ChessErrors::CastlePiecesInWay { color });
        }
    }

    // Walk the king one square at a time toward its target, failing on the
    // first attacked square.
    let mut file = king_from.file as i8;
    let target = king_to.file as i8;
    let step = (target - file).signum();
    while file != target {
        file += step;
        let square = BoardLocation {
            file: file as u8,
            rank: home,
        };
        if inspect_check::is_square_attacked_ignoring(
            &game.piece_register,
            square,
            turn.opposite(),
            Some(king_from),
        ) {
            return Err(ChessErrors::CastleWouldCheck { color, square });
        }
    }

    // Lift both pieces and reseat them; this covers the Chess960 cases
    // where the destinations collide with the origins.
    let (king_id, mut king_record) = game.piece_register.take(king_from)?;
    let (rook_id, mut rook_record) = game.piece_register.take(rook_from)?;
    king_record.location = king_to;
    rook_record.location = rook_to;
    game.piece_register.restore(king_id, king_record)?;
    game.piece_register.restore(rook_id, rook_record)?;

    game.castling_rights[turn.index()] = [false, false];
    game.en_passant_location = None;
    game.half_move_clock += 1;
    game.turn = turn.opposite();
    if game.turn == PieceTeam::Light {
        game.full_move_count += 1;
    }
    Ok(())
}

/// Whether the given origin/destination is playable for the side to move,
/// tried inside a throwaway snapshot. Falls back to the castle
/// interpretation for king destinations that spell one.
pub(crate) fn probe_move_legal(
    game: &mut GameState,
    from: BoardLocation,
    to: BoardLocation,
) -> bool {
    let Some(record) = game.piece_register.piece_at(from).copied() else {
        return false;
    };
    let attempt = ResolvedMove::Standard {
        from,
        to,
        promotion: promotion_default(game, from, to, None),
        capture_marked: false,
    };
    game.begin();
    let ok = execute(game, &attempt).is_ok();
    game.rollback();
    if ok {
        return true;
    }
    if record.effective_class() == PieceClass::King {
        if let Some(side) = detect_castle_from_king_move(game, to) {
            game.begin();
            let ok = execute(game, &ResolvedMove::Castle(side)).is_ok();
            game.rollback();
            return ok;
        }
    }
    false
}

/// Whether the side to move has any legal move at all, determined by
/// exhaustively attempting every generated move inside transactions.
pub(crate) fn has_any_legal_move(game: &mut GameState) -> bool {
    let origins: Vec<BoardLocation> = game
        .piece_register
        .iter_team(game.turn)
        .map(|(_, r)| r.location)
        .collect();
    for from in origins {
        let Ok(stops) = move_generator::generate_destinations(game, from) else {
            continue;
        };
        for to in stops {
            if probe_move_legal(game, from, to) {
                return true;
            }
        }
    }
    false
}
