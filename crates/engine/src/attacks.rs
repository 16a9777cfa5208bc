//! Attack rules for the stationary pieces, backed by pre-computed tables.

use crate::bitboard::{Bitboard, SQUARE_MASKS, popcount};
use crate::board::{Board, Piece};
use crate::constants::{NUM_SQUARES, PieceKind};
use crate::position::{Direction, Position};
use once_cell::sync::Lazy;

/// A struct to hold all the pre-computed attack tables.
/// The tables are initialized once and then accessed globally.
pub struct AttackTables {
    pub step: [Bitboard; NUM_SQUARES],
    pub diagonal: [Bitboard; NUM_SQUARES],
    pub bishop: [Bitboard; NUM_SQUARES],
    pub bishop_eyes: [[u8; NUM_SQUARES]; NUM_SQUARES],
    pub knight: [Bitboard; NUM_SQUARES],
    pub knight_legs: [[u8; NUM_SQUARES]; NUM_SQUARES],
    pub rays: [[Bitboard; NUM_SQUARES]; 4], // [direction][square]
    pub between: [[Bitboard; NUM_SQUARES]; NUM_SQUARES],
}

impl AttackTables {
    fn new() -> Self {
        let mut tables = AttackTables {
            step: [0; NUM_SQUARES],
            diagonal: [0; NUM_SQUARES],
            bishop: [0; NUM_SQUARES],
            bishop_eyes: [[0; NUM_SQUARES]; NUM_SQUARES],
            knight: [0; NUM_SQUARES],
            knight_legs: [[0; NUM_SQUARES]; NUM_SQUARES],
            rays: [[0; NUM_SQUARES]; 4],
            between: [[0; NUM_SQUARES]; NUM_SQUARES],
        };

        for from_sq in 0..NUM_SQUARES {
            let from = Position::from_sq(from_sq);

            // Pawn and King
            for dir in Direction::ALL {
                if let Some(to) = from.step(dir) {
                    tables.step[from_sq] |= SQUARE_MASKS[to.sq()];
                }
            }
            // Advisor
            for (dx, dy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
                if let Some(to) = from.offset(dx, dy) {
                    tables.diagonal[from_sq] |= SQUARE_MASKS[to.sq()];
                }
            }
            // Bishop: the eye is the midpoint of the jump.
            for (dx, dy) in [(2, 2), (2, -2), (-2, 2), (-2, -2)] {
                if let (Some(to), Some(eye)) = (from.offset(dx, dy), from.offset(dx / 2, dy / 2)) {
                    tables.bishop[from_sq] |= SQUARE_MASKS[to.sq()];
                    tables.bishop_eyes[from_sq][to.sq()] = eye.sq() as u8;
                }
            }
            // Knight: the leg is one step along the long axis of the jump.
            for (dx, dy) in [(1, 2), (-1, 2), (1, -2), (-1, -2), (2, 1), (2, -1), (-2, 1), (-2, -1)] {
                if let Some(to) = from.offset(dx, dy) {
                    let leg = if dy.abs() == 2 {
                        from.offset(0, dy / 2)
                    } else {
                        from.offset(dx / 2, 0)
                    };
                    if let Some(leg) = leg {
                        tables.knight[from_sq] |= SQUARE_MASKS[to.sq()];
                        tables.knight_legs[from_sq][to.sq()] = leg.sq() as u8;
                    }
                }
            }
            // Rays for sliding pieces
            for dir in Direction::ALL {
                let mut cur = from.step(dir);
                while let Some(p) = cur {
                    tables.rays[dir.index()][from_sq] |= SQUARE_MASKS[p.sq()];
                    cur = p.step(dir);
                }
            }
        }

        // Cells strictly between two colinear squares.
        for from_sq in 0..NUM_SQUARES {
            for dir in Direction::ALL {
                let mut between = 0;
                let mut cur = Position::from_sq(from_sq).step(dir);
                while let Some(p) = cur {
                    tables.between[from_sq][p.sq()] = between;
                    between |= SQUARE_MASKS[p.sq()];
                    cur = p.step(dir);
                }
            }
        }

        tables
    }
}

// The global static instance of the attack tables, initialized lazily and only once.
pub static ATTACK_TABLES: Lazy<AttackTables> = Lazy::new(AttackTables::new);

/// Index of the first occupied square along `dir` from `sq`, if any.
pub fn first_blocker(sq: usize, dir: Direction, occupied: Bitboard) -> Option<usize> {
    let blockers = occupied & ATTACK_TABLES.rays[dir.index()][sq];
    if blockers == 0 {
        return None;
    }
    let idx = match dir {
        // Left and Up walk towards lower square indices.
        Direction::Left | Direction::Up => 127 - blockers.leading_zeros() as usize,
        Direction::Right | Direction::Down => blockers.trailing_zeros() as usize,
    };
    Some(idx)
}

/// Cells reachable along one ray: everything up to and including the first blocker.
pub fn ray_moves_bb(sq: usize, dir: Direction, occupied: Bitboard) -> Bitboard {
    let ray = ATTACK_TABLES.rays[dir.index()][sq];
    match first_blocker(sq, dir, occupied) {
        Some(blocker) => (ray ^ ATTACK_TABLES.rays[dir.index()][blocker]) | SQUARE_MASKS[blocker],
        None => ray,
    }
}

/// Generates the destination bitboard for the Car (or a Chariot) on a given square.
pub fn get_car_moves_bb(sq: usize, occupied: Bitboard) -> Bitboard {
    Direction::ALL
        .into_iter()
        .fold(0, |acc, dir| acc | ray_moves_bb(sq, dir, occupied))
}

/// Number of occupied cells strictly between `a` and `b`.
/// Returns `None` when the two cells do not share a row or column.
pub fn line_occupancy(a: Position, b: Position, board: &Board) -> Option<u32> {
    if !a.is_colinear(b) {
        return None;
    }
    Some(popcount(board.occupied_bitboard() & ATTACK_TABLES.between[a.sq()][b.sq()]))
}

/// Signature shared by every per-kind attack rule.
pub type AttackRule = fn(from: Position, target: Position, board: &Board) -> bool;

/// The capability table: which rule decides whether a piece of `kind` attacks a cell.
pub fn attack_rule(kind: PieceKind) -> AttackRule {
    match kind {
        PieceKind::Pawn | PieceKind::King => orthogonal_step,
        PieceKind::Car | PieceKind::Chariot => line_strike,
        PieceKind::Knight => knight_jump,
        PieceKind::Cannon => cannon_strike,
        PieceKind::Bishop => bishop_jump,
        PieceKind::Advisor => diagonal_step,
    }
}

/// Can `piece` attack `target` on `board`? A piece never attacks its own cell.
pub fn can_attack(piece: &Piece, target: Position, board: &Board) -> bool {
    piece.position != target && attack_rule(piece.kind)(piece.position, target, board)
}

fn orthogonal_step(from: Position, target: Position, _board: &Board) -> bool {
    ATTACK_TABLES.step[from.sq()] & SQUARE_MASKS[target.sq()] != 0
}

fn diagonal_step(from: Position, target: Position, _board: &Board) -> bool {
    ATTACK_TABLES.diagonal[from.sq()] & SQUARE_MASKS[target.sq()] != 0
}

fn line_strike(from: Position, target: Position, board: &Board) -> bool {
    line_occupancy(from, target, board) == Some(0)
}

// A cannon threatens any cell behind exactly one screen, occupied or not.
fn cannon_strike(from: Position, target: Position, board: &Board) -> bool {
    line_occupancy(from, target, board) == Some(1)
}

fn knight_jump(from: Position, target: Position, board: &Board) -> bool {
    if ATTACK_TABLES.knight[from.sq()] & SQUARE_MASKS[target.sq()] == 0 {
        return false;
    }
    let leg = ATTACK_TABLES.knight_legs[from.sq()][target.sq()] as usize;
    board.occupied_bitboard() & SQUARE_MASKS[leg] == 0
}

fn bishop_jump(from: Position, target: Position, board: &Board) -> bool {
    if ATTACK_TABLES.bishop[from.sq()] & SQUARE_MASKS[target.sq()] == 0 {
        return false;
    }
    let eye = ATTACK_TABLES.bishop_eyes[from.sq()][target.sq()] as usize;
    board.occupied_bitboard() & SQUARE_MASKS[eye] == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    fn piece_on(board: &Board, x: i32, y: i32) -> Piece {
        *board.piece_at(pos(x, y)).expect("piece on cell")
    }

    #[test]
    fn line_occupancy_counts_strictly_between() {
        let board = Board::from_layout("C7/8/P7/8/8/X7/8/8/8").unwrap();
        assert_eq!(line_occupancy(pos(1, 1), pos(1, 6), &board), Some(1));
        assert_eq!(line_occupancy(pos(1, 1), pos(1, 9), &board), Some(2));
        assert_eq!(line_occupancy(pos(1, 1), pos(1, 3), &board), Some(0));
        assert_eq!(line_occupancy(pos(1, 1), pos(2, 2), &board), None);
        assert_eq!(line_occupancy(pos(1, 6), pos(1, 1), &board), Some(1));
    }

    #[test]
    fn pawn_and_king_step_orthogonally() {
        let mut board = Board::with_car(pos(8, 9));
        board.add_piece(PieceKind::Pawn, pos(4, 4)).unwrap();
        board.add_piece(PieceKind::King, pos(6, 6)).unwrap();
        let pawn = piece_on(&board, 4, 4);
        let king = piece_on(&board, 6, 6);
        for (x, y) in [(3, 4), (5, 4), (4, 3), (4, 5)] {
            assert!(can_attack(&pawn, pos(x, y), &board));
        }
        assert!(!can_attack(&pawn, pos(5, 5), &board));
        assert!(!can_attack(&pawn, pos(4, 6), &board));
        assert!(can_attack(&king, pos(6, 5), &board));
        assert!(!can_attack(&king, pos(7, 7), &board));
    }

    #[test]
    fn chariot_is_blocked_by_any_piece() {
        let board = Board::from_layout("R2P4/8/8/8/8/8/8/8/X7").unwrap();
        let chariot = piece_on(&board, 1, 1);
        assert!(can_attack(&chariot, pos(3, 1), &board));
        assert!(can_attack(&chariot, pos(4, 1), &board));
        assert!(!can_attack(&chariot, pos(5, 1), &board));
        assert!(can_attack(&chariot, pos(1, 9), &board));
        assert!(!can_attack(&chariot, pos(2, 2), &board));
    }

    #[test]
    fn cannon_needs_exactly_one_screen() {
        let board = Board::from_layout("3C4/8/3P4/8/8/8/3X4/8/3P4").unwrap();
        let cannon = piece_on(&board, 4, 1);
        assert!(!can_attack(&cannon, pos(4, 2), &board));
        assert!(!can_attack(&cannon, pos(4, 3), &board));
        assert!(can_attack(&cannon, pos(4, 4), &board));
        assert!(can_attack(&cannon, pos(4, 6), &board));
        assert!(can_attack(&cannon, pos(4, 7), &board));
        assert!(!can_attack(&cannon, pos(4, 8), &board));
        assert!(!can_attack(&cannon, pos(1, 1), &board));
    }

    #[test]
    fn knight_leg_block() {
        let mut board = Board::with_car(pos(8, 9));
        board.add_piece(PieceKind::Knight, pos(3, 3)).unwrap();
        let knight = piece_on(&board, 3, 3);
        assert!(can_attack(&knight, pos(4, 5), &board));
        assert!(can_attack(&knight, pos(5, 4), &board));

        board.add_piece(PieceKind::Pawn, pos(3, 4)).unwrap();
        assert!(!can_attack(&knight, pos(4, 5), &board));
        assert!(!can_attack(&knight, pos(2, 5), &board));
        assert!(can_attack(&knight, pos(5, 4), &board));

        board.add_piece(PieceKind::Pawn, pos(4, 3)).unwrap();
        assert!(!can_attack(&knight, pos(5, 4), &board));
        assert!(can_attack(&knight, pos(4, 1), &board));
    }

    #[test]
    fn bishop_eye_block() {
        let mut board = Board::with_car(pos(8, 9));
        board.add_piece(PieceKind::Bishop, pos(3, 3)).unwrap();
        let bishop = piece_on(&board, 3, 3);
        assert!(can_attack(&bishop, pos(5, 5), &board));
        assert!(can_attack(&bishop, pos(1, 1), &board));
        assert!(!can_attack(&bishop, pos(4, 4), &board));
        board.add_piece(PieceKind::Pawn, pos(4, 4)).unwrap();
        assert!(!can_attack(&bishop, pos(5, 5), &board));
        assert!(can_attack(&bishop, pos(5, 1), &board));
    }

    #[test]
    fn advisor_steps_diagonally_anywhere() {
        let mut board = Board::with_car(pos(8, 9));
        board.add_piece(PieceKind::Advisor, pos(1, 1)).unwrap();
        let advisor = piece_on(&board, 1, 1);
        assert!(can_attack(&advisor, pos(2, 2), &board));
        assert!(!can_attack(&advisor, pos(1, 2), &board));
        assert!(!can_attack(&advisor, pos(3, 3), &board));
    }

    #[test]
    fn no_piece_attacks_its_own_cell() {
        let board = Board::from_layout("RC6/8/8/8/8/8/8/8/X7").unwrap();
        for piece in board.pieces() {
            assert!(!can_attack(piece, piece.position, &board));
        }
    }

    #[test]
    fn car_moves_stop_at_first_blocker() {
        let board = Board::from_layout("8/8/3P4/8/8/8/1P1X4/8/8").unwrap();
        let car = board.car_position();
        let moves = get_car_moves_bb(car.sq(), board.occupied_bitboard());
        assert_ne!(moves & SQUARE_MASKS[pos(4, 3).sq()], 0);
        assert_eq!(moves & SQUARE_MASKS[pos(4, 2).sq()], 0);
        assert_ne!(moves & SQUARE_MASKS[pos(2, 7).sq()], 0);
        assert_eq!(moves & SQUARE_MASKS[pos(1, 7).sq()], 0);
        assert_ne!(moves & SQUARE_MASKS[pos(8, 7).sq()], 0);
        assert_ne!(moves & SQUARE_MASKS[pos(4, 9).sq()], 0);
        assert_eq!(popcount(moves), 4 + 2 + 4 + 2);
    }
}
