//! The "environment evolves" event: new pieces appear and one piece may shuffle.

use crate::attacks::{ATTACK_TABLES, line_occupancy};
use crate::bitboard::SQUARE_MASKS;
use crate::board::{Board, Piece, PieceId};
use crate::config::Config;
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, PieceKind};
use crate::error::GameResult;
use crate::position::{Direction, Position};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use tracing::debug;

// Candidate steps are tried in this order; equal scores keep the first.
const SHIFT_DIRECTIONS: [Direction; 4] = [Direction::Down, Direction::Up, Direction::Right, Direction::Left];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub id: PieceId,
    pub kind: PieceKind,
    pub from: Position,
    pub to: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolveReport {
    pub spawned: Vec<Piece>,
    pub shifted: Option<Shift>,
}

impl fmt::Display for EvolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spawned.is_empty() {
            f.write_str("spawned nothing")?;
        } else {
            f.write_str("spawned")?;
            for p in &self.spawned {
                write!(f, " {}@{}", p.kind, p.position)?;
            }
        }
        if let Some(s) = self.shifted {
            write!(f, "; {} {} -> {}", s.kind, s.from, s.to)?;
        }
        Ok(())
    }
}

/// Runs one evolve event on `board`.
pub fn evolve<R: Rng + ?Sized>(board: &mut Board, config: &Config, rng: &mut R) -> GameResult<EvolveReport> {
    let spawned = spawn_pieces(board, config.spawn_count, rng)?;
    let shifted = if rng.gen_bool(config.shift_chance.clamp(0.0, 1.0)) {
        shift_random_piece(board, rng)?
    } else {
        None
    };
    Ok(EvolveReport { spawned, shifted })
}

/// Empty cells outside the 3x3 block around the Car.
pub fn spawn_cells(board: &Board) -> Vec<Position> {
    let car = board.car_position();
    Position::all()
        .filter(|p| (p.x() - car.x()).abs() > 1 || (p.y() - car.y()).abs() > 1)
        .filter(|p| !board.is_occupied(*p))
        .collect()
}

fn spawn_pieces<R: Rng + ?Sized>(board: &mut Board, count: usize, rng: &mut R) -> GameResult<Vec<Piece>> {
    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let cells = spawn_cells(board);
        let (Some(&cell), Some(&kind)) = (cells.choose(rng), PieceKind::SPAWNABLE.choose(rng)) else {
            break;
        };
        let id = board.add_piece(kind, cell)?;
        debug!(%id, %kind, %cell, "spawned piece");
        spawned.push(Piece { id, kind, position: cell });
    }
    Ok(spawned)
}

fn shift_random_piece<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> GameResult<Option<Shift>> {
    let stationary: Vec<Piece> = board.stationary().copied().collect();
    let Some(&piece) = stationary.choose(rng) else {
        return Ok(None);
    };
    let Some(to) = best_shift(board, &piece)? else {
        return Ok(None);
    };
    board.shift_piece(piece.id, to)?;
    debug!(id = %piece.id, from = %piece.position, %to, "shifted piece");
    Ok(Some(Shift {
        id: piece.id,
        kind: piece.kind,
        from: piece.position,
        to,
    }))
}

/// The best one-step destination for `piece`, if any qualifies.
///
/// A step qualifies when it lands on an empty cell between the Car and something the Car
/// could capture once `piece` is lifted off the board. With nothing capturable every
/// empty neighbour qualifies.
pub fn best_shift(board: &Board, piece: &Piece) -> GameResult<Option<Position>> {
    let mut lifted = board.clone();
    lifted.remove_piece(piece.id)?;
    let car = lifted.car_position();
    let capturable: Vec<Position> = lifted
        .stationary()
        .map(|p| p.position)
        .filter(|&p| line_occupancy(car, p, &lifted) == Some(0))
        .collect();

    let mut best: Option<(Position, f64)> = None;
    for dir in SHIFT_DIRECTIONS {
        let Some(cell) = piece.position.step(dir) else {
            continue;
        };
        if board.is_occupied(cell) {
            continue;
        }
        let blocks = capturable.is_empty()
            || capturable
                .iter()
                .any(|&p| ATTACK_TABLES.between[car.sq()][p.sq()] & SQUARE_MASKS[cell.sq()] != 0);
        if !blocks {
            continue;
        }
        let score = position_score(cell, car);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((cell, score));
        }
    }
    Ok(best.map(|(cell, _)| cell))
}

/// Prefers cells away from the edges, near the centre and near the Car.
pub fn position_score(cell: Position, car: Position) -> f64 {
    let (x, y) = (f64::from(cell.x()), f64::from(cell.y()));
    let w = f64::from(BOARD_WIDTH);
    let h = f64::from(BOARD_HEIGHT);
    0.5 * (x - 1.0).min(w - x)
        + 0.5 * (y - 1.0).min(h - y)
        + 0.8 * (4.5 - (x - 4.5).abs())
        + 0.8 * (5.0 - (y - 5.0).abs())
        + 0.3 * (10.0 - f64::from(cell.manhattan(car)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn spawn_cells_skip_the_car_neighbourhood() {
        let board = Board::with_car(pos(4, 5));
        let cells = spawn_cells(&board);
        assert_eq!(cells.len(), 72 - 9);
        assert!(!cells.contains(&pos(5, 6)));
        assert!(cells.contains(&pos(6, 5)));
    }

    #[test]
    fn evolve_spawns_configured_count() {
        let mut board = Board::start();
        let mut rng = StdRng::seed_from_u64(7);
        let config = Config { shift_chance: 0.0, ..Config::default() };
        let report = evolve(&mut board, &config, &mut rng).unwrap();
        assert_eq!(report.spawned.len(), 3);
        assert_eq!(report.shifted, None);
        assert_eq!(board.len(), 4 + 3);
        let car = board.car_position();
        for p in &report.spawned {
            assert!(PieceKind::SPAWNABLE.contains(&p.kind));
            assert!((p.position.x() - car.x()).abs() > 1 || (p.position.y() - car.y()).abs() > 1);
        }
    }

    #[test]
    fn shift_interposes_on_a_capture_line() {
        // Car (4,7) can capture the pawn at (4,3); the knight at (3,5) may step to (4,5).
        let mut board = Board::start();
        let knight = board.add_piece(PieceKind::Knight, pos(3, 5)).unwrap();
        let piece = *board.piece(knight).unwrap();
        assert_eq!(best_shift(&board, &piece).unwrap(), Some(pos(4, 5)));
    }

    #[test]
    fn shift_without_captures_prefers_the_centre() {
        let mut board = Board::with_car(pos(1, 9));
        let pawn = board.add_piece(PieceKind::Pawn, pos(8, 1)).unwrap();
        let piece = *board.piece(pawn).unwrap();
        // The Car sees the pawn on neither line, so any empty step qualifies.
        let to = best_shift(&board, &piece).unwrap().unwrap();
        assert!(to == pos(7, 1) || to == pos(8, 2));
    }

    #[test]
    fn certain_shift_moves_one_piece_one_step() {
        // A lone pawn off the Car's lines always has a qualifying step.
        let mut board = Board::with_car(pos(1, 9));
        let pawn = board.add_piece(PieceKind::Pawn, pos(8, 1)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let config = Config { spawn_count: 0, shift_chance: 1.0, ..Config::default() };
        let before = board.clone();
        let report = evolve(&mut board, &config, &mut rng).unwrap();

        let shift = report.shifted.expect("a certain shift with a free pawn must move it");
        assert_eq!(shift.id, pawn);
        assert_eq!(shift.from, pos(8, 1));
        assert_eq!(shift.from.manhattan(shift.to), 1);
        assert_eq!(board.piece(shift.id).map(|p| p.position), Some(shift.to));
        assert!(before.piece_at(shift.to).is_none());
        assert!(board.piece_at(pos(8, 1)).is_none());
        assert_eq!(board.len(), before.len());
    }

    #[test]
    fn position_score_favours_the_middle() {
        let car = pos(4, 7);
        assert!(position_score(pos(4, 5), car) > position_score(pos(1, 1), car));
    }
}
