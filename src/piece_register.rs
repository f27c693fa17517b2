//! The board/piece dual view.
//!
//! Each side owns a fixed table of sixteen piece slots (king, queen, two
//! rooks, two bishops, two knights, eight pawns); the 8x8 board stores
//! indices into those tables. Surplus queens, rooks, bishops, or knights
//! beyond the initial complement are seated in a free pawn slot as
//! promoted-pawn entries, which bounds a side at sixteen live pieces and
//! makes every missing slot a captured piece.
//!
//! The two views stay mutually consistent through every mutation: a live
//! piece's recorded location always names the board square that points back
//! at it, and an empty square points at nothing.

use std::ops::Range;

use crate::board_location::BoardLocation;
use crate::chess_errors::{ChessErrors, ChessResult};
use crate::piece_class::PieceClass;
use crate::piece_record::PieceRecord;
use crate::piece_team::PieceTeam;

/// Number of piece slots per side.
pub const TABLE_SLOTS: usize = 16;

/// Index of a live piece: the owning team plus its slot in that team's table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PieceId {
    pub team: PieceTeam,
    pub index: u8,
}

#[derive(Clone, Debug)]
pub struct PieceRegister {
    tables: [[Option<PieceRecord>; TABLE_SLOTS]; 2],
    board: [[Option<PieceId>; 8]; 8],
}

/// Table slots reserved for each class in its side's table.
fn slot_range(class: PieceClass) -> Range<usize> {
    match class {
        PieceClass::King => 0..1,
        PieceClass::Queen => 1..2,
        PieceClass::Rook => 2..4,
        PieceClass::Bishop => 4..6,
        PieceClass::Knight => 6..8,
        PieceClass::Pawn => 8..16,
    }
}

const PAWN_SLOTS: Range<usize> = 8..16;

impl Default for PieceRegister {
    fn default() -> Self {
        PieceRegister {
            tables: [[None; TABLE_SLOTS]; 2],
            board: [[None; 8]; 8],
        }
    }
}

impl PieceRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new piece on the board, allocating its identity slot.
    ///
    /// Surplus non-pawn pieces past the initial complement are seated in a
    /// free pawn slot as promoted pawns. Fails with `DuplicateSquare` if the
    /// square is occupied, `CantPlaceOnBackRank` for a pawn on rank 1 or 8,
    /// and `TooManyPieces` when no slot is left for the class.
    pub fn place(
        &mut self,
        team: PieceTeam,
        class: PieceClass,
        location: BoardLocation,
    ) -> ChessResult<PieceId> {
        if self.id_at(location).is_some() {
            return Err(ChessErrors::DuplicateSquare { square: location });
        }
        if class == PieceClass::Pawn && (location.rank == 0 || location.rank == 7) {
            return Err(ChessErrors::CantPlaceOnBackRank { square: location });
        }

        let table = &mut self.tables[team.index()];
        let natural = slot_range(class).find(|i| table[*i].is_none());
        let (index, record) = match natural {
            Some(i) => {
                let slot = if class == PieceClass::King {
                    0
                } else {
                    (i - slot_range(class).start) as u8 + 1
                };
                (
                    i,
                    PieceRecord {
                        class,
                        team,
                        slot,
                        promoted_class: None,
                        location,
                    },
                )
            }
            None => {
                // Surplus piece. Kings and pawns have nowhere else to go.
                if class == PieceClass::King || class == PieceClass::Pawn {
                    return Err(ChessErrors::TooManyPieces { color: team, piece: class });
                }
                let i = PAWN_SLOTS
                    .clone()
                    .find(|i| table[*i].is_none())
                    .ok_or(ChessErrors::TooManyPieces { color: team, piece: class })?;
                (
                    i,
                    PieceRecord {
                        class: PieceClass::Pawn,
                        team,
                        slot: (i - PAWN_SLOTS.start) as u8 + 1,
                        promoted_class: Some(class),
                        location,
                    },
                )
            }
        };

        table[index] = Some(record);
        let id = PieceId {
            team,
            index: index as u8,
        };
        self.board[location.file as usize][location.rank as usize] = Some(id);
        Ok(id)
    }

    /// Removes the piece at `location` from the board, freeing its slot.
    pub fn remove(&mut self, location: BoardLocation) -> ChessResult<PieceRecord> {
        let (_, record) = self.take(location)?;
        Ok(record)
    }

    /// Removes the piece at `location`, returning both its id and record so
    /// the caller can reseat it with [`restore`](Self::restore).
    pub fn take(&mut self, location: BoardLocation) -> ChessResult<(PieceId, PieceRecord)> {
        let id = self
            .id_at(location)
            .ok_or(ChessErrors::NoPiece { square: location })?;
        let record = self.tables[id.team.index()][id.index as usize]
            .take()
            .ok_or(ChessErrors::NoPiece { square: location })?;
        self.board[location.file as usize][location.rank as usize] = None;
        Ok((id, record))
    }

    /// Reseats a previously taken piece, preserving its identity slot.
    pub fn restore(&mut self, id: PieceId, record: PieceRecord) -> ChessResult<()> {
        let location = record.location;
        if self.id_at(location).is_some() {
            return Err(ChessErrors::DuplicateSquare { square: location });
        }
        self.tables[id.team.index()][id.index as usize] = Some(record);
        self.board[location.file as usize][location.rank as usize] = Some(id);
        Ok(())
    }

    pub fn id_at(&self, location: BoardLocation) -> Option<PieceId> {
        self.board[location.file as usize][location.rank as usize]
    }

    pub fn piece_at(&self, location: BoardLocation) -> Option<&PieceRecord> {
        let id = self.id_at(location)?;
        self.tables[id.team.index()][id.index as usize].as_ref()
    }

    pub fn record(&self, id: PieceId) -> Option<&PieceRecord> {
        self.tables[id.team.index()][id.index as usize].as_ref()
    }

    /// Finds the square a piece identity currently stands on.
    pub fn locate(&self, team: PieceTeam, class: PieceClass, slot: u8) -> Option<BoardLocation> {
        self.iter_team(team)
            .find(|(_, r)| r.class == class && r.slot == slot)
            .map(|(_, r)| r.location)
    }

    pub fn king(&self, team: PieceTeam) -> Option<&PieceRecord> {
        self.tables[team.index()][0].as_ref()
    }

    /// Moves a piece from `start` to `destination`, erasing whatever stood
    /// there. The returned record is the captured piece if there was one.
    pub fn relocate(
        &mut self,
        start: BoardLocation,
        destination: BoardLocation,
    ) -> ChessResult<Option<PieceRecord>> {
        let captured = if self.id_at(destination).is_some() {
            Some(self.remove(destination)?)
        } else {
            None
        };
        let (id, mut record) = self.take(start)?;
        record.location = destination;
        self.restore(id, record)?;
        Ok(captured)
    }

    /// Rewrites a pawn's effective class after it reaches the back rank.
    pub fn promote(&mut self, location: BoardLocation, class: PieceClass) -> ChessResult<()> {
        if !matches!(
            class,
            PieceClass::Queen | PieceClass::Rook | PieceClass::Bishop | PieceClass::Knight
        ) {
            return Err(ChessErrors::InvalidPromote { piece: class });
        }
        let id = self
            .id_at(location)
            .ok_or(ChessErrors::NoPiece { square: location })?;
        let record = self.tables[id.team.index()][id.index as usize]
            .as_mut()
            .ok_or(ChessErrors::NoPiece { square: location })?;
        if record.class != PieceClass::Pawn {
            return Err(ChessErrors::InvalidPromote { piece: class });
        }
        record.promoted_class = Some(class);
        Ok(())
    }

    /// Iterates the live pieces of one side.
    pub fn iter_team(&self, team: PieceTeam) -> impl Iterator<Item = (PieceId, &PieceRecord)> {
        self.tables[team.index()]
            .iter()
            .enumerate()
            .filter_map(move |(i, slot)| {
                slot.as_ref().map(|record| {
                    (
                        PieceId {
                            team,
                            index: i as u8,
                        },
                        record,
                    )
                })
            })
    }

    /// Iterates all live pieces, light side first.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &PieceRecord)> {
        self.iter_team(PieceTeam::Light)
            .chain(self.iter_team(PieceTeam::Dark))
    }

    /// Counts one side's live pieces by their effective class.
    pub fn count_effective(&self, team: PieceTeam, class: PieceClass) -> u8 {
        self.iter_team(team)
            .filter(|(_, r)| r.effective_class() == class)
            .count() as u8
    }
}
