//! Core engine state.
//!
//! `GameState` is the central model: the piece register, side to move,
//! castling rights, en-passant target, clocks, the SAN move log, the
//! repetition ledger, and the transactional snapshot stack used to try moves
//! speculatively. The engine is a plain value; it owns no global state and
//! every operation runs to completion on the caller's thread.

use rustc_hash::FxHashMap;

use crate::board_location::BoardLocation;
use crate::chess_errors::ChessResult;
use crate::game_status::{self, GameOutcome};
use crate::move_description::CastleSide;
use crate::move_logic;
use crate::piece_class::PieceClass;
use crate::piece_record::PieceRecord;
use crate::piece_register::PieceRegister;
use crate::piece_team::PieceTeam;
use crate::utils::{fen_generator, fen_parser, pmn};

pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Home files for castling. Standard chess pins these to e/a/h; a Chess960
/// load rewrites them from the detected back-rank layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Chess960Homes {
    pub enabled: bool,
    pub king_file: u8,
    pub queenside_rook_file: u8,
    pub kingside_rook_file: u8,
}

impl Default for Chess960Homes {
    fn default() -> Self {
        Chess960Homes {
            enabled: false,
            king_file: 4,
            queenside_rook_file: 0,
            kingside_rook_file: 7,
        }
    }
}

impl Chess960Homes {
    /// The home file of the rook implicated in castling on `side`.
    pub fn rook_file(&self, side: CastleSide) -> u8 {
        match side {
            CastleSide::King => self.kingside_rook_file,
            CastleSide::Queen => self.queenside_rook_file,
        }
    }
}

/// One stacked copy of the engine's whole mutable state, minus the stack
/// itself.
#[derive(Clone, Debug)]
struct Snapshot {
    piece_register: PieceRegister,
    turn: PieceTeam,
    castling_rights: [[bool; 2]; 2],
    en_passant_location: Option<BoardLocation>,
    half_move_clock: u16,
    full_move_count: u16,
    chess960: Chess960Homes,
    san_log: Vec<String>,
    san_log_annotated: Vec<String>,
    log_starts_with_dark: bool,
    log_base_move: u16,
    repetition_ledger: FxHashMap<String, u32>,
    captured: [Vec<PieceClass>; 2],
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub piece_register: PieceRegister,
    pub turn: PieceTeam,
    /// Castling availability, indexed by `[team.index()][castle_side.index()]`.
    pub castling_rights: [[bool; 2]; 2],
    /// The square a pawn skipped over when double-stepping, if the last move
    /// was a double step.
    pub en_passant_location: Option<BoardLocation>,
    /// Plies since the last capture or pawn move.
    pub half_move_clock: u16,
    pub full_move_count: u16,
    pub chess960: Chess960Homes,
    pub(crate) san_log: Vec<String>,
    pub(crate) san_log_annotated: Vec<String>,
    pub(crate) log_starts_with_dark: bool,
    pub(crate) log_base_move: u16,
    pub(crate) repetition_ledger: FxHashMap<String, u32>,
    /// Captured pieces per victim team, each recorded as its effective class
    /// at the moment of capture.
    pub(crate) captured: [Vec<PieceClass>; 2],
    snapshots: Vec<Snapshot>,
}

impl GameState {
    /// An empty board with white to move, no castling rights, and the clocks
    /// at their fresh-game values. Build a position from here with
    /// [`place_piece`](Self::place_piece).
    pub fn new_blank() -> Self {
        GameState {
            piece_register: PieceRegister::new(),
            turn: PieceTeam::Light,
            castling_rights: [[false; 2]; 2],
            en_passant_location: None,
            half_move_clock: 0,
            full_move_count: 1,
            chess960: Chess960Homes::default(),
            san_log: Vec::new(),
            san_log_annotated: Vec::new(),
            log_starts_with_dark: false,
            log_base_move: 1,
            repetition_ledger: FxHashMap::default(),
            captured: [Vec::new(), Vec::new()],
            snapshots: Vec::new(),
        }
    }

    pub fn new_game() -> Self {
        GameState::from_fen(STARTING_POSITION_FEN)
            .expect("the starting position FEN must always parse")
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        fen_parser::parse_fen(fen, false)
    }

    /// Parses a FEN with Chess960 castling semantics: the back rank defines
    /// the king and rook home files and the castling field may use home-file
    /// letters.
    pub fn from_fen_chess960(fen: &str) -> ChessResult<Self> {
        fen_parser::parse_fen(fen, true)
    }

    pub fn get_fen(&self) -> String {
        fen_generator::generate_fen(self)
    }

    /// The canonical repetition fingerprint: the FEN without its clock
    /// fields.
    pub fn get_fingerprint(&self) -> String {
        fen_generator::generate_fingerprint(self, true)
    }

    /// The move-count-free fingerprint, which also drops the en-passant
    /// field.
    pub fn get_fingerprint_ignoring_en_passant(&self) -> String {
        fen_generator::generate_fingerprint(self, false)
    }

    // --- Board editing ---

    pub fn place_piece(
        &mut self,
        team: PieceTeam,
        class: PieceClass,
        location: BoardLocation,
    ) -> ChessResult<()> {
        self.piece_register.place(team, class, location)?;
        Ok(())
    }

    pub fn remove_piece(&mut self, location: BoardLocation) -> ChessResult<PieceRecord> {
        self.piece_register.remove(location)
    }

    pub fn piece_at(&self, location: BoardLocation) -> Option<&PieceRecord> {
        self.piece_register.piece_at(location)
    }

    pub fn can_castle(&self, team: PieceTeam, side: CastleSide) -> bool {
        self.castling_rights[team.index()][side.index()]
    }

    // --- Transactional snapshots ---

    /// Pushes a full copy of the current state onto the snapshot stack.
    pub fn begin(&mut self) {
        let snapshot = Snapshot {
            piece_register: self.piece_register.clone(),
            turn: self.turn,
            castling_rights: self.castling_rights,
            en_passant_location: self.en_passant_location,
            half_move_clock: self.half_move_clock,
            full_move_count: self.full_move_count,
            chess960: self.chess960,
            san_log: self.san_log.clone(),
            san_log_annotated: self.san_log_annotated.clone(),
            log_starts_with_dark: self.log_starts_with_dark,
            log_base_move: self.log_base_move,
            repetition_ledger: self.repetition_ledger.clone(),
            captured: self.captured.clone(),
        };
        self.snapshots.push(snapshot);
    }

    /// Pops the newest snapshot and restores it, move log included. Returns
    /// false when no snapshot was pending.
    pub fn rollback(&mut self) -> bool {
        let Some(snapshot) = self.snapshots.pop() else {
            return false;
        };
        self.piece_register = snapshot.piece_register;
        self.turn = snapshot.turn;
        self.castling_rights = snapshot.castling_rights;
        self.en_passant_location = snapshot.en_passant_location;
        self.half_move_clock = snapshot.half_move_clock;
        self.full_move_count = snapshot.full_move_count;
        self.chess960 = snapshot.chess960;
        self.san_log = snapshot.san_log;
        self.san_log_annotated = snapshot.san_log_annotated;
        self.log_starts_with_dark = snapshot.log_starts_with_dark;
        self.log_base_move = snapshot.log_base_move;
        self.repetition_ledger = snapshot.repetition_ledger;
        self.captured = snapshot.captured;
        true
    }

    /// Pops and discards the newest snapshot, keeping the state as it stands.
    /// Returns false when no snapshot was pending.
    pub fn commit(&mut self) -> bool {
        self.snapshots.pop().is_some()
    }

    // --- Move application ---

    /// Validates and applies one SAN move for the side to move. On any
    /// failure the state is left exactly as it was.
    pub fn apply_san(&mut self, san: &str) -> ChessResult<()> {
        move_logic::apply_san(self, san)
    }

    /// Applies a move given as a square pair plus an optional promotion
    /// piece. The pair is converted to SAN and re-parsed so that validation
    /// and logging are uniform with [`apply_san`](Self::apply_san).
    pub fn apply_move(
        &mut self,
        from: BoardLocation,
        to: BoardLocation,
        promotion: Option<PieceClass>,
    ) -> ChessResult<()> {
        move_logic::apply_move_pair(self, from, to, promotion)
    }

    /// Applies one half-move written in the two-character piot move notation.
    pub fn apply_pmn(&mut self, pair: &str) -> ChessResult<()> {
        let decoded = pmn::decode(pair)?;
        move_logic::apply_move_pair(self, decoded.from, decoded.to, decoded.promotion)
    }

    // --- Status queries ---

    pub fn in_check(&self) -> bool {
        game_status::in_check(self)
    }

    pub fn in_checkmate(&self) -> bool {
        game_status::in_checkmate(self)
    }

    pub fn in_stalemate(&self) -> bool {
        game_status::in_stalemate(self)
    }

    pub fn in_fifty_move_draw(&self) -> bool {
        game_status::in_fifty_move_draw(self)
    }

    pub fn in_repetition_draw(&self) -> bool {
        game_status::in_repetition_draw(self)
    }

    pub fn in_fivefold_draw(&self) -> bool {
        game_status::in_fivefold_draw(self)
    }

    pub fn in_basic_draw(&self) -> bool {
        game_status::in_basic_draw(self)
    }

    pub fn in_forced_draw(&self) -> bool {
        game_status::in_forced_draw(self)
    }

    pub fn has_mating_material(&self, team: PieceTeam) -> bool {
        game_status::has_mating_material(self, team)
    }

    pub fn game_over(&self) -> Option<GameOutcome> {
        game_status::game_over(self)
    }

    // --- Move log ---

    /// The raw SAN log, one entry per applied half-move.
    pub fn san_log(&self) -> &[String] {
        &self.san_log
    }

    /// The SAN log with `+`/`#` suffixes, one entry per applied half-move.
    pub fn san_log_annotated(&self) -> &[String] {
        &self.san_log_annotated
    }

    /// The annotated move log grouped into pairs per full-move number. A
    /// position loaded from a black-to-move FEN gets `..` standing in for
    /// the absent white half.
    pub fn move_list(&self) -> Vec<(u16, String, Option<String>)> {
        let mut result = Vec::new();
        let mut number = self.log_base_move;
        let mut moves = self.san_log_annotated.iter();
        if self.log_starts_with_dark {
            if let Some(dark) = moves.next() {
                result.push((number, "..".to_string(), Some(dark.clone())));
                number += 1;
            }
        }
        while let Some(light) = moves.next() {
            result.push((number, light.clone(), moves.next().cloned()));
            number += 1;
        }
        result
    }

    /// The space-joined movetext, e.g. `1.e4 c5 2.Nf3`.
    pub fn move_string(&self) -> String {
        let mut parts = Vec::new();
        for (number, light, dark) in self.move_list() {
            parts.push(format!("{number}.{light}"));
            if let Some(dark) = dark {
                parts.push(dark);
            }
        }
        parts.join(" ")
    }

    /// The pieces of `team` captured so far, each as its effective class at
    /// the moment it was taken.
    pub fn captured_pieces(&self, team: PieceTeam) -> &[PieceClass] {
        &self.captured[team.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_new_game() {
        let dut = GameState::new_game();
        assert_eq!(dut.get_fen(), STARTING_POSITION_FEN);
        assert_eq!(dut.turn, PieceTeam::Light);
        // A fresh starting position carries a zeroed half-move clock.
        assert_eq!(dut.half_move_clock, 0);
        assert_eq!(dut.full_move_count, 1);
    }

    #[test]
    fn blank_board_has_fresh_clocks() {
        let dut = GameState::new_blank();
        assert_eq!(dut.half_move_clock, 0);
        assert_eq!(dut.full_move_count, 1);
        assert!(dut.san_log().is_empty());
    }

    #[test]
    fn fingerprint_strips_clock_fields() {
        let dut =
            GameState::from_fen("rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2")
                .unwrap();
        assert_eq!(
            dut.get_fingerprint(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq -"
        );
        assert_eq!(
            dut.get_fingerprint_ignoring_en_passant(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq"
        );
    }

    #[test]
    fn snapshots_restore_everything() -> ChessResult<()> {
        let mut dut = GameState::new_game();
        dut.apply_san("e4")?;
        let fen_before = dut.get_fen();
        let log_before = dut.san_log().to_vec();

        dut.begin();
        dut.apply_san("c5")?;
        dut.apply_san("Nf3")?;
        assert_ne!(dut.get_fen(), fen_before);
        assert!(dut.rollback());
        assert_eq!(dut.get_fen(), fen_before);
        assert_eq!(dut.san_log(), log_before.as_slice());

        // Nesting: inner rollback, outer commit.
        dut.begin();
        dut.apply_san("c5")?;
        dut.begin();
        dut.apply_san("Nf3")?;
        assert!(dut.rollback());
        assert!(dut.commit());
        assert_eq!(dut.san_log().last().map(String::as_str), Some("c5"));

        assert!(!dut.rollback());
        Ok(())
    }

    #[test]
    fn move_list_pairs_and_string() -> ChessResult<()> {
        let mut dut = GameState::new_game();
        for m in ["e4", "c5", "Nf3"] {
            dut.apply_san(m)?;
        }
        assert_eq!(dut.move_string(), "1.e4 c5 2.Nf3");
        let list = dut.move_list();
        assert_eq!(list[0], (1, "e4".to_string(), Some("c5".to_string())));
        assert_eq!(list[1], (2, "Nf3".to_string(), None));
        Ok(())
    }

    #[test]
    fn move_string_from_dark_to_move_fen() -> ChessResult<()> {
        let mut dut =
            GameState::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3")?;
        dut.apply_san("e5")?;
        dut.apply_san("Nf3")?;
        assert_eq!(dut.move_string(), "3... e5 4.Nf3");
        Ok(())
    }

    #[test]
    fn captured_pieces_track_effective_class() -> ChessResult<()> {
        let mut dut = GameState::from_fen("4k3/8/8/3p4/4B3/8/8/4K3 w - - 0 1")?;
        dut.apply_san("Bxd5")?;
        assert_eq!(dut.captured_pieces(PieceTeam::Dark), &[PieceClass::Pawn]);
        assert!(dut.captured_pieces(PieceTeam::Light).is_empty());
        Ok(())
    }
}
