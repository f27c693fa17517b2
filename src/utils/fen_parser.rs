//! FEN-to-GameState parser.
//!
//! Reads the six space-separated fields, defaulting a missing tail (a
//! three-field FEN gains `- 0 1`, four fields gain `0 1`, five gain `1`),
//! and reports a distinct error kind for each way a field can be wrong.
//! With Chess960 enabled the black back rank defines the king and rook home
//! files, and a white back rank that disagrees fails rather than guessing.

use crate::board_location::BoardLocation;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::GameState;
use crate::move_description::CastleSide;
use crate::piece_class::PieceClass;
use crate::piece_team::PieceTeam;

/// Home files read off the black back rank during the placement walk.
#[derive(Default)]
struct DetectedHomes {
    king_file: Option<u8>,
    rook_files: Vec<u8>,
}

pub fn parse_fen(fen: &str, chess960: bool) -> ChessResult<GameState> {
    let trimmed = fen.trim();
    if trimmed.is_empty() {
        return Err(ChessErrors::EmptyFen);
    }

    let mut fields: Vec<&str> = trimmed.split(' ').collect();
    if fields.iter().any(|f| f.is_empty()) {
        return Err(ChessErrors::EmptyFen);
    }
    match fields.len() {
        6 => {}
        5 => fields.push("1"),
        4 => fields.extend(["0", "1"]),
        3 => fields.extend(["-", "0", "1"]),
        count => {
            return Err(ChessErrors::FenCount {
                fen: trimmed.into(),
                count,
            })
        }
    }

    let mut game = GameState::new_blank();
    game.chess960.enabled = chess960;

    let homes = parse_placement(fields[0], &mut game)?;
    if chess960 {
        if let (Some(king_file), [queenside, kingside, ..]) =
            (homes.king_file, homes.rook_files.as_slice())
        {
            game.chess960.king_file = king_file;
            game.chess960.queenside_rook_file = *queenside;
            game.chess960.kingside_rook_file = *kingside;
        }
    }

    game.turn = match fields[1] {
        "w" => PieceTeam::Light,
        "b" => PieceTeam::Dark,
        other => {
            return Err(ChessErrors::FenTomoveWrong {
                field: other.into(),
            })
        }
    };

    parse_castling(fields[2], &mut game)?;
    game.en_passant_location = parse_en_passant(fields[3], &game)?;

    game.half_move_clock = fields[4]
        .parse::<u16>()
        .map_err(|_| ChessErrors::FenInvalidPly {
            field: fields[4].into(),
        })?;
    game.full_move_count =
        fields[5]
            .parse::<u16>()
            .map_err(|_| ChessErrors::FenInvalidMoveNumber {
                field: fields[5].into(),
            })?;

    // A playable position has both kings.
    if game.piece_register.king(PieceTeam::Light).is_none()
        || game.piece_register.king(PieceTeam::Dark).is_none()
    {
        return Err(ChessErrors::FenTooLittle);
    }

    game.log_starts_with_dark = game.turn == PieceTeam::Dark;
    game.log_base_move = game.full_move_count;
    let fingerprint = game.get_fingerprint();
    game.repetition_ledger.insert(fingerprint, 1);
    Ok(game)
}

fn parse_placement(field: &str, game: &mut GameState) -> ChessResult<DetectedHomes> {
    let mut homes = DetectedHomes::default();
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() > 8 {
        return Err(ChessErrors::FenTooMuch);
    }
    if ranks.len() < 8 {
        return Err(ChessErrors::FenTooLittle);
    }

    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file: u8 = 0;
        for ch in rank_str.chars() {
            if let Some(step) = ch.to_digit(10) {
                if !(1..=8).contains(&step) {
                    return Err(ChessErrors::FenInvalidPiece { piece: ch });
                }
                file += step as u8;
                if file > 8 {
                    return Err(ChessErrors::FenTooMuch);
                }
                continue;
            }

            let (team, class) =
                PieceClass::from_fen_char(ch).ok_or(ChessErrors::FenInvalidPiece { piece: ch })?;
            if file >= 8 {
                return Err(ChessErrors::FenTooMuch);
            }
            let location = BoardLocation { file, rank };
            game.piece_register
                .place(team, class, location)
                .map_err(|e| match e {
                    ChessErrors::TooManyPieces { color, piece } => {
                        ChessErrors::FenMultiPiece { color, piece }
                    }
                    other => other,
                })?;

            // Walking rank 8 left to right: the first black rook names the
            // queenside file, the second the kingside file, the king its own.
            if rank == 7 && team == PieceTeam::Dark {
                match class {
                    PieceClass::Rook if homes.rook_files.len() < 2 => {
                        homes.rook_files.push(file)
                    }
                    PieceClass::King => homes.king_file = Some(file),
                    _ => {}
                }
            }
            file += 1;
        }
        if file < 8 {
            return Err(ChessErrors::FenTooLittle);
        }
    }

    Ok(homes)
}

fn parse_castling(field: &str, game: &mut GameState) -> ChessResult<()> {
    if field == "-" {
        return Ok(());
    }
    if field.len() > 4 {
        return Err(ChessErrors::FenCastleTooLong {
            field: field.into(),
        });
    }

    for letter in field.chars() {
        let (team, side) = castle_letter_meaning(game, letter)
            .ok_or(ChessErrors::FenCastleWrong { letter })?;
        verify_castle_homes(game, team, side, letter)?;
        game.castling_rights[team.index()][side.index()] = true;
    }
    Ok(())
}

fn castle_letter_meaning(game: &GameState, letter: char) -> Option<(PieceTeam, CastleSide)> {
    match letter {
        'K' => return Some((PieceTeam::Light, CastleSide::King)),
        'Q' => return Some((PieceTeam::Light, CastleSide::Queen)),
        'k' => return Some((PieceTeam::Dark, CastleSide::King)),
        'q' => return Some((PieceTeam::Dark, CastleSide::Queen)),
        _ => {}
    }
    // Chess960 FENs may name the rook's home file directly.
    if game.chess960.enabled && letter.is_ascii_alphabetic() {
        let team = if letter.is_ascii_uppercase() {
            PieceTeam::Light
        } else {
            PieceTeam::Dark
        };
        let file = letter.to_ascii_lowercase() as u8 - b'a';
        if file > 7 {
            return None;
        }
        if file == game.chess960.queenside_rook_file {
            return Some((team, CastleSide::Queen));
        }
        if file == game.chess960.kingside_rook_file {
            return Some((team, CastleSide::King));
        }
    }
    None
}

/// A granted right implies the king and the implicated rook still stand on
/// their home squares; anything else fails loudly instead of round-tripping
/// a right that could never be exercised.
fn verify_castle_homes(
    game: &GameState,
    team: PieceTeam,
    side: CastleSide,
    letter: char,
) -> ChessResult<()> {
    let home_rank = team.home_rank();
    let king_home = BoardLocation {
        file: game.chess960.king_file,
        rank: home_rank,
    };
    let king_ok = game
        .piece_register
        .piece_at(king_home)
        .map(|r| r.team == team && r.effective_class() == PieceClass::King)
        .unwrap_or(false);

    let rook_home = BoardLocation {
        file: game.chess960.rook_file(side),
        rank: home_rank,
    };
    let rook_ok = game
        .piece_register
        .piece_at(rook_home)
        .map(|r| r.team == team && r.effective_class() == PieceClass::Rook)
        .unwrap_or(false);

    if king_ok && rook_ok {
        Ok(())
    } else {
        Err(ChessErrors::FenCastleWrong { letter })
    }
}

fn parse_en_passant(field: &str, game: &GameState) -> ChessResult<Option<BoardLocation>> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || ChessErrors::FenInvalidEnPassant {
        field: field.into(),
    };
    let target = BoardLocation::from_algebraic(field).map_err(|_| invalid())?;

    // The target sits behind a pawn that just double-stepped, so its rank is
    // fixed by the side to move and the mover's pawn must stand beyond it.
    let mover = game.turn.opposite();
    let expected_rank = match mover {
        PieceTeam::Light => 2,
        PieceTeam::Dark => 5,
    };
    if target.rank != expected_rank {
        return Err(invalid());
    }
    if game.piece_register.piece_at(target).is_some() {
        return Err(invalid());
    }
    let pawn_square = target
        .offset(0, mover.forward())
        .ok_or_else(invalid)?;
    let pawn_ok = game
        .piece_register
        .piece_at(pawn_square)
        .map(|r| r.team == mover && r.effective_class() == PieceClass::Pawn)
        .unwrap_or(false);
    if !pawn_ok {
        return Err(invalid());
    }
    Ok(Some(target))
}
