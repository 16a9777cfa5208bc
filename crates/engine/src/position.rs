//! Board coordinates and the four axis directions.

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, NUM_SQUARES};
use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell on the 8x9 board. `x` runs 1..=8 left to right, `y` runs 1..=9 top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    x: u8,
    y: u8,
}

#[derive(Serialize, Deserialize)]
struct RawPosition {
    x: i32,
    y: i32,
}

impl TryFrom<RawPosition> for Position {
    type Error = GameError;

    fn try_from(raw: RawPosition) -> GameResult<Self> {
        Position::new(raw.x, raw.y)
    }
}

impl From<Position> for RawPosition {
    fn from(pos: Position) -> Self {
        RawPosition { x: pos.x as i32, y: pos.y as i32 }
    }
}

impl Position {
    /// Validates and builds a position.
    pub fn new(x: i32, y: i32) -> GameResult<Self> {
        if Self::in_bounds(x, y) {
            Ok(Position { x: x as u8, y: y as u8 })
        } else {
            Err(GameError::InvalidCoordinate { x, y })
        }
    }

    pub const fn in_bounds(x: i32, y: i32) -> bool {
        x >= 1 && x <= BOARD_WIDTH as i32 && y >= 1 && y <= BOARD_HEIGHT as i32
    }

    /// Builds the position for a square index; `sq` must be below `NUM_SQUARES`.
    pub const fn from_sq(sq: usize) -> Self {
        debug_assert!(sq < NUM_SQUARES);
        Position {
            x: (sq % BOARD_WIDTH as usize) as u8 + 1,
            y: (sq / BOARD_WIDTH as usize) as u8 + 1,
        }
    }

    pub const fn sq(self) -> usize {
        (self.y as usize - 1) * BOARD_WIDTH as usize + (self.x as usize - 1)
    }

    pub const fn x(self) -> i32 {
        self.x as i32
    }

    pub const fn y(self) -> i32 {
        self.y as i32
    }

    /// The neighbouring cell in `dir`, if it is on the board.
    pub fn step(self, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        Position::new(self.x() + dx, self.y() + dy).ok()
    }

    pub fn is_colinear(self, other: Position) -> bool {
        self.x == other.x || self.y == other.y
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x() - other.x()).abs() + (self.y() - other.y()).abs()
    }

    /// Iterates every board cell, column by column.
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=BOARD_WIDTH as i32)
            .flat_map(|x| (1..=BOARD_HEIGHT as i32).map(move |y| Position { x: x as u8, y: y as u8 }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }
}
