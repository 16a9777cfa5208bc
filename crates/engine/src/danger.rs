//! Danger zones: cells the stationary pieces currently threaten.

use crate::attacks::can_attack;
use crate::bitboard::SquareSet;
use crate::board::Board;
use crate::position::Position;

/// Checks if `target` is attacked by any stationary piece on `board`.
pub fn is_square_attacked(board: &Board, target: Position) -> bool {
    board.stationary().any(|piece| can_attack(piece, target, board))
}

/// Every cell not held by a stationary piece that some stationary piece can attack.
///
/// The Car counts as a blocker and as a cannon screen where it stands, and its own cell
/// is included when attacked. Cannons mark empty cells behind exactly one screen.
pub fn danger_zones(board: &Board) -> SquareSet {
    let mut zones = SquareSet::EMPTY;
    for target in Position::all() {
        if board.piece_at(target).is_some_and(|p| !p.kind.is_car()) {
            continue;
        }
        if is_square_attacked(board, target) {
            zones.insert(target);
        }
    }
    zones
}

/// Is the Car standing on a threatened cell?
pub fn is_car_in_danger(board: &Board) -> bool {
    is_square_attacked(board, board.car_position())
}
