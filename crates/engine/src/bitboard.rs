//! Square sets over the 72-cell board.

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, NUM_SQUARES};
use crate::position::Position;
use std::fmt;

// 72 cells fit comfortably in a u128.
pub type Bitboard = u128;

// --- Pre-computed Masks ---
pub const SQUARE_MASKS: [Bitboard; NUM_SQUARES] = {
    let mut masks = [0; NUM_SQUARES];
    let mut i = 0;
    while i < NUM_SQUARES {
        masks[i] = 1 << i;
        i += 1;
    }
    masks
};

/// Rows, indexed by `y - 1`.
pub const RANK_MASKS: [Bitboard; BOARD_HEIGHT as usize] = {
    let mut masks = [0; BOARD_HEIGHT as usize];
    let mut i = 0;
    while i < BOARD_HEIGHT as usize {
        masks[i] = 0xFF << (i * BOARD_WIDTH as usize);
        i += 1;
    }
    masks
};

/// Columns, indexed by `x - 1`.
pub const FILE_MASKS: [Bitboard; BOARD_WIDTH as usize] = {
    let mut masks = [0; BOARD_WIDTH as usize];
    let mut file = 0;
    while file < BOARD_WIDTH as usize {
        let mut rank = 0;
        while rank < BOARD_HEIGHT as usize {
            masks[file] |= 1 << (rank * BOARD_WIDTH as usize + file);
            rank += 1;
        }
        file += 1;
    }
    masks
};

pub const FULL_BOARD: Bitboard = (1 << NUM_SQUARES) - 1;

#[inline]
pub fn popcount(bb: Bitboard) -> u32 {
    bb.count_ones()
}

#[inline]
pub fn mask(pos: Position) -> Bitboard {
    SQUARE_MASKS[pos.sq()]
}

/// Yields the squares of a bitboard in ascending index order.
pub struct SquareIter(Bitboard);

impl Iterator for SquareIter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.0 == 0 {
            return None;
        }
        let sq = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Position::from_sq(sq))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = popcount(self.0) as usize;
        (n, Some(n))
    }
}

pub fn squares(bb: Bitboard) -> SquareIter {
    SquareIter(bb)
}

/// An immutable set of cells, e.g. the danger zone of a board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(Bitboard);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    pub fn bitboard(&self) -> Bitboard {
        self.0
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.0 & mask(pos) != 0
    }

    pub fn insert(&mut self, pos: Position) {
        self.0 |= mask(pos);
    }

    pub fn len(&self) -> usize {
        popcount(self.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> SquareIter {
        squares(self.0)
    }
}

impl fmt::Display for SquareSet {
    /// Cells separated by spaces, in square order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pos) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", pos)?;
        }
        Ok(())
    }
}

impl FromIterator<Position> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut set = SquareSet::EMPTY;
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl IntoIterator for &SquareSet {
    type Item = Position;
    type IntoIter = SquareIter;

    fn into_iter(self) -> SquareIter {
        self.iter()
    }
}
