//! A move list implementation that avoids heap allocations.

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::r#move::Move;
use std::ops::Index;

// The Car reaches at most the rest of its row plus the rest of its column.
const MAX_MOVES: usize = (BOARD_WIDTH as usize - 1) + (BOARD_HEIGHT as usize - 1);

#[derive(Debug, Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    count: usize,
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            moves: [Move::NULL; MAX_MOVES],
            count: 0,
        }
    }

    pub fn add(&mut self, mv: Move) {
        if self.count < MAX_MOVES {
            self.moves[self.count] = mv;
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves[0..self.count]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Keeps only the moves for which `keep` returns true, preserving order.
    pub fn retain<F: FnMut(&Move) -> bool>(&mut self, mut keep: F) {
        let mut kept = 0;
        for i in 0..self.count {
            let mv = self.moves[i];
            if keep(&mv) {
                self.moves[kept] = mv;
                kept += 1;
            }
        }
        self.count = kept;
    }

    pub fn find_to(&self, to: crate::position::Position) -> Option<Move> {
        self.iter().copied().find(|mv| mv.to() == to)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
