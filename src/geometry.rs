//! Pure square geometry.
//!
//! Rays, knight jumps, king steps, and diagonal shade, with no reference to
//! any position. Every ray is produced closer-first so occupancy scans can
//! stop at the first blocker.

use crate::board_location::BoardLocation;

/// The four diagonal directions as (file, rank) steps.
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The four orthogonal directions as (file, rank) steps.
pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// The eight knight jump offsets.
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// The color of a square's diagonal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SquareShade {
    Light,
    Dark,
}

/// All squares along one direction from `start`, closer squares first, not
/// including `start` itself.
pub fn ray(start: BoardLocation, direction: (i8, i8)) -> Vec<BoardLocation> {
    let mut result = Vec::with_capacity(7);
    let mut current = start;
    while let Some(next) = current.offset(direction.0, direction.1) {
        result.push(next);
        current = next;
    }
    result
}

/// The four diagonal rays from `start`, each closer-first.
pub fn diagonal_rays(start: BoardLocation) -> [Vec<BoardLocation>; 4] {
    DIAGONAL_DIRECTIONS.map(|d| ray(start, d))
}

/// The four orthogonal rays from `start`, each closer-first.
pub fn orthogonal_rays(start: BoardLocation) -> [Vec<BoardLocation>; 4] {
    ORTHOGONAL_DIRECTIONS.map(|d| ray(start, d))
}

/// The up-to-eight squares a knight can jump to from `start`.
pub fn knight_jumps(start: BoardLocation) -> Vec<BoardLocation> {
    KNIGHT_JUMPS
        .iter()
        .filter_map(|&(df, dr)| start.offset(df, dr))
        .collect()
}

/// The up-to-eight squares one king step away from `start`.
pub fn king_steps(start: BoardLocation) -> Vec<BoardLocation> {
    let mut result = Vec::with_capacity(8);
    for df in -1..2 {
        for dr in -1..2 {
            if df == 0 && dr == 0 {
                continue;
            }
            if let Some(next) = start.offset(df, dr) {
                result.push(next);
            }
        }
    }
    result
}

/// The shade of a square's diagonal. A square is light when its one-based
/// file index plus its rank is odd, so a1 is dark and h1 is light.
pub fn square_shade(square: BoardLocation) -> SquareShade {
    if (square.file + square.rank) % 2 == 1 {
        SquareShade::Light
    } else {
        SquareShade::Dark
    }
}
