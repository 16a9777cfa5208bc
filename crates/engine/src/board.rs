//! The board state: an id-keyed arena of pieces with a mailbox and occupancy cache.

use crate::bitboard::{Bitboard, SQUARE_MASKS};
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, NUM_SQUARES, PieceKind, START_LAYOUT};
use crate::error::{GameError, GameResult};
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of a piece. Ids are never reused on the same board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub position: Position,
}

/// Represents the pieces on the board at any point in time.
///
/// `pieces` is the source of truth; `mailbox` and `occupied` are kept in sync by every
/// mutating method so lookups by cell stay O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: BTreeMap<PieceId, Piece>,
    mailbox: [Option<PieceId>; NUM_SQUARES],
    occupied: Bitboard,
    car: PieceId,
    next_id: u32,
}

impl Board {
    /// A board holding only the Car.
    pub fn with_car(car_position: Position) -> Self {
        let mut board = Board {
            pieces: BTreeMap::new(),
            mailbox: [None; NUM_SQUARES],
            occupied: 0,
            car: PieceId(0),
            next_id: 0,
        };
        board.car = board.insert(PieceKind::Car, car_position);
        board
    }

    /// The opening position of a fresh session.
    pub fn start() -> Self {
        let mut board = Board::with_car(Position::from_sq(6 * BOARD_WIDTH as usize + 3));
        for x in [4, 6, 8] {
            board.insert(PieceKind::Pawn, Position::from_sq(2 * BOARD_WIDTH as usize + x - 1));
        }
        debug_assert_eq!(board.to_layout(), START_LAYOUT);
        board
    }

    /// Parses a layout string: nine ranks (y = 1..9) separated by `/`.
    pub fn from_layout(layout: &str) -> GameResult<Self> {
        let ranks: Vec<&str> = layout.trim().split('/').collect();
        if ranks.len() != BOARD_HEIGHT as usize {
            return Err(GameError::MalformedLayout(format!(
                "expected {} ranks, found {}",
                BOARD_HEIGHT,
                ranks.len()
            )));
        }

        let mut placed = Vec::new();
        for (r, rank) in ranks.iter().enumerate() {
            let mut file = 0usize;
            for ch in rank.chars() {
                if let Some(digit) = ch.to_digit(10) {
                    if digit == 0 {
                        return Err(GameError::MalformedLayout(format!("zero run in rank {}", r + 1)));
                    }
                    file += digit as usize;
                } else {
                    let kind = PieceKind::from_layout_char(ch).ok_or_else(|| {
                        GameError::MalformedLayout(format!("unknown piece `{}` in rank {}", ch, r + 1))
                    })?;
                    if file >= BOARD_WIDTH as usize {
                        return Err(GameError::MalformedLayout(format!("rank {} is too long", r + 1)));
                    }
                    placed.push((kind, Position::from_sq(r * BOARD_WIDTH as usize + file)));
                    file += 1;
                }
            }
            if file != BOARD_WIDTH as usize {
                return Err(GameError::MalformedLayout(format!(
                    "rank {} covers {} cells, expected {}",
                    r + 1,
                    file,
                    BOARD_WIDTH
                )));
            }
        }

        Board::from_placements(placed).map_err(|e| match e {
            GameError::MalformedRecord(msg) => GameError::MalformedLayout(msg),
            other => other,
        })
    }

    /// Builds a board from a flat list of placements containing exactly one Car.
    /// Stationary pieces receive ids in list order.
    pub fn from_placements<I>(placements: I) -> GameResult<Self>
    where
        I: IntoIterator<Item = (PieceKind, Position)>,
    {
        let placements: Vec<(PieceKind, Position)> = placements.into_iter().collect();
        let mut cars = placements.iter().filter(|(kind, _)| kind.is_car());
        let car_position = match (cars.next(), cars.next()) {
            (Some(&(_, pos)), None) => pos,
            (None, _) => return Err(GameError::MalformedRecord("no car on the board".into())),
            (Some(_), Some(_)) => {
                return Err(GameError::MalformedRecord("more than one car on the board".into()));
            }
        };

        let mut board = Board::with_car(car_position);
        for (kind, pos) in placements.into_iter().filter(|(kind, _)| !kind.is_car()) {
            if board.is_occupied(pos) {
                return Err(GameError::MalformedRecord(format!("two pieces on {}", pos)));
            }
            board.insert(kind, pos);
        }
        Ok(board)
    }

    pub fn to_layout(&self) -> String {
        let mut layout = String::with_capacity(NUM_SQUARES + BOARD_HEIGHT as usize);
        for r in 0..BOARD_HEIGHT as usize {
            let mut empty_count = 0;
            for c in 0..BOARD_WIDTH as usize {
                match self.mailbox[r * BOARD_WIDTH as usize + c].and_then(|id| self.pieces.get(&id)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            layout.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        layout.push(piece.kind.to_layout_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                layout.push_str(&empty_count.to_string());
            }
            if r + 1 < BOARD_HEIGHT as usize {
                layout.push('/');
            }
        }
        layout
    }

    fn insert(&mut self, kind: PieceKind, pos: Position) -> PieceId {
        debug_assert!(!self.is_occupied(pos));
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(id, Piece { id, kind, position: pos });
        self.mailbox[pos.sq()] = Some(id);
        self.occupied |= SQUARE_MASKS[pos.sq()];
        id
    }

    fn take(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(&id)?;
        let sq = piece.position.sq();
        self.mailbox[sq] = None;
        self.occupied &= !SQUARE_MASKS[sq];
        Some(piece)
    }

    fn relocate_unchecked(&mut self, id: PieceId, to: Position) {
        if let Some(piece) = self.pieces.get_mut(&id) {
            let from = piece.position.sq();
            piece.position = to;
            self.mailbox[from] = None;
            self.mailbox[to.sq()] = Some(id);
            self.occupied ^= SQUARE_MASKS[from] | SQUARE_MASKS[to.sq()];
        }
    }

    /// Places a stationary piece on an empty cell.
    pub fn add_piece(&mut self, kind: PieceKind, pos: Position) -> GameResult<PieceId> {
        if kind.is_car() {
            return Err(GameError::DuplicateCar);
        }
        if self.is_occupied(pos) {
            return Err(GameError::OccupiedCell(pos));
        }
        Ok(self.insert(kind, pos))
    }

    pub fn remove_piece(&mut self, id: PieceId) -> GameResult<Piece> {
        if id == self.car {
            return Err(GameError::ProtectedPieceDeletion);
        }
        self.take(id).ok_or(GameError::UnknownPiece(id))
    }

    pub fn remove_at(&mut self, pos: Position) -> GameResult<Piece> {
        let id = self.mailbox[pos.sq()].ok_or(GameError::EmptyCell(pos))?;
        self.remove_piece(id)
    }

    /// Puts the Car on `to`, removing whatever stood there. No legality check.
    pub(crate) fn move_car(&mut self, to: Position) -> Option<Piece> {
        let captured = match self.mailbox[to.sq()] {
            Some(id) if id != self.car => self.take(id),
            _ => None,
        };
        self.relocate_unchecked(self.car, to);
        captured
    }

    /// A copy of this board with the Car moved to `to`.
    pub fn with_car_at(&self, to: Position) -> Board {
        let mut sim = self.clone();
        sim.move_car(to);
        sim
    }

    /// Moves a stationary piece to an empty cell.
    pub(crate) fn shift_piece(&mut self, id: PieceId, to: Position) -> GameResult<()> {
        if id == self.car {
            return Err(crate::error::IllegalMoveReason::NotTheCar.into());
        }
        if !self.pieces.contains_key(&id) {
            return Err(GameError::UnknownPiece(id));
        }
        if self.is_occupied(to) {
            return Err(GameError::OccupiedCell(to));
        }
        self.relocate_unchecked(id, to);
        Ok(())
    }

    /// Removes every stationary piece sharing `pos`'s row or column.
    pub(crate) fn clear_lines(&mut self, pos: Position) -> Vec<Piece> {
        let doomed: Vec<PieceId> = self
            .stationary()
            .filter(|p| p.position.x() == pos.x() || p.position.y() == pos.y())
            .map(|p| p.id)
            .collect();
        doomed.into_iter().filter_map(|id| self.take(id)).collect()
    }

    pub fn car(&self) -> &Piece {
        // The car is inserted at construction and `take` is never called with its id.
        &self.pieces[&self.car]
    }

    pub fn car_id(&self) -> PieceId {
        self.car
    }

    pub fn car_position(&self) -> Position {
        self.car().position
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.mailbox[pos.sq()].and_then(|id| self.pieces.get(&id))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupied & SQUARE_MASKS[pos.sq()] != 0
    }

    pub fn occupied_bitboard(&self) -> Bitboard {
        self.occupied
    }

    /// All pieces in id order, the Car included.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// Every piece except the Car.
    pub fn stationary(&self) -> impl Iterator<Item = &Piece> {
        let car = self.car;
        self.pieces.values().filter(move |p| p.id != car)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::start()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "    1 2 3 4 5 6 7 8")?;
        writeln!(f, "  +-----------------+")?;
        for r in 0..BOARD_HEIGHT as usize {
            write!(f, "{} | ", r + 1)?;
            for c in 0..BOARD_WIDTH as usize {
                let ch = self
                    .piece_at(Position::from_sq(r * BOARD_WIDTH as usize + c))
                    .map_or('.', |p| p.kind.to_layout_char());
                write!(f, "{} ", ch)?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "  +-----------------+")
    }
}
