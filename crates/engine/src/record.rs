//! Flat, serialisable form of a board: every piece as (kind, x, y) plus the Car position.

use crate::board::Board;
use crate::constants::PieceKind;
use crate::error::{GameError, GameResult};
use crate::position::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    /// Every piece in id order, the Car included.
    pub pieces: Vec<PieceRecord>,
    pub car_position: Position,
}

impl BoardRecord {
    pub fn capture(board: &Board) -> Self {
        BoardRecord {
            pieces: board
                .pieces()
                .map(|p| PieceRecord {
                    kind: p.kind,
                    x: p.position.x(),
                    y: p.position.y(),
                })
                .collect(),
            car_position: board.car_position(),
        }
    }

    /// Rebuilds the board, checking coordinates, overlaps and the Car position.
    pub fn restore(&self) -> GameResult<Board> {
        let placements = self
            .pieces
            .iter()
            .map(|r| Position::new(r.x, r.y).map(|pos| (r.kind, pos)))
            .collect::<GameResult<Vec<_>>>()?;
        let board = Board::from_placements(placements)?;
        if board.car_position() != self.car_position {
            return Err(GameError::MalformedRecord(format!(
                "car listed at {} but carPosition is {}",
                board.car_position(),
                self.car_position
            )));
        }
        Ok(board)
    }

    /// (kind, position) pairs sorted by cell, independent of piece ids.
    pub fn placements(&self) -> Vec<(PieceKind, i32, i32)> {
        let mut out: Vec<_> = self.pieces.iter().map(|r| (r.kind, r.x, r.y)).collect();
        out.sort_by_key(|&(kind, x, y)| (x, y, kind));
        out
    }
}

impl From<&Board> for BoardRecord {
    fn from(board: &Board) -> Self {
        BoardRecord::capture(board)
    }
}
