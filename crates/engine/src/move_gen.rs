//! Car move generation: legal destinations, the safety filter and line threats.

use crate::attacks::{first_blocker, get_car_moves_bb, line_occupancy};
use crate::bitboard::{FILE_MASKS, RANK_MASKS, squares};
use crate::board::Board;
use crate::danger::is_square_attacked;
use crate::error::IllegalMoveReason;
use crate::movelist::MoveList;
use crate::position::{Direction, Position};
use crate::r#move::{Capture, Move, ThreatCounts};

/// Every cell the Car can reach in one straight move.
///
/// Moves come out in generation order: the Car's row by ascending x, then its column by
/// ascending y. Ranking ties are broken by this order.
pub fn generate_legal_moves(board: &Board) -> MoveList {
    let from = board.car_position();
    let targets = get_car_moves_bb(from.sq(), board.occupied_bitboard());
    let row = targets & RANK_MASKS[(from.y() - 1) as usize];
    let column = targets & FILE_MASKS[(from.x() - 1) as usize];

    let mut moves = MoveList::new();
    for to in squares(row).chain(squares(column)) {
        moves.add(build_move(board, from, to));
    }
    moves
}

/// Legal moves whose destination is not attacked once the Car stands on it.
pub fn generate_safe_moves(board: &Board) -> MoveList {
    let mut moves = generate_legal_moves(board);
    moves.retain(|mv| is_safe_destination(board, mv.to()));
    moves
}

/// Simulates the Car on `to` (capturing any occupant) and checks no stationary piece
/// can attack it there.
pub fn is_safe_destination(board: &Board, to: Position) -> bool {
    let sim = board.with_car_at(to);
    !is_square_attacked(&sim, to)
}

/// Checks a Car move to `to` against the movement rule.
pub fn validate_move(board: &Board, to: Position) -> Result<Move, IllegalMoveReason> {
    let from = board.car_position();
    if from == to {
        return Err(IllegalMoveReason::NullMove);
    }
    match line_occupancy(from, to, board) {
        None => Err(IllegalMoveReason::NotColinear),
        Some(0) => Ok(build_move(board, from, to)),
        Some(_) => Err(IllegalMoveReason::PathBlocked),
    }
}

/// For each direction from `from`, 1 if the nearest occupied cell holds a stationary piece.
pub fn threat_counts(board: &Board, from: Position) -> ThreatCounts {
    let occupied = board.occupied_bitboard();
    let mut counts = ThreatCounts::default();
    for dir in Direction::ALL {
        let hit = first_blocker(from.sq(), dir, occupied)
            .and_then(|sq| board.piece_at(Position::from_sq(sq)))
            .is_some_and(|p| !p.kind.is_car());
        counts.set(dir, u32::from(hit));
    }
    counts
}

fn build_move(board: &Board, from: Position, to: Position) -> Move {
    let captured = board
        .piece_at(to)
        .filter(|p| !p.kind.is_car())
        .map(|p| Capture { id: p.id, kind: p.kind });
    Move::new(from, to, captured)
}
