//! Car moves and the scored candidates built from them.

use crate::board::PieceId;
use crate::constants::PieceKind;
use crate::position::{Direction, Position};
use std::fmt;

/// The piece a move would take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub id: PieceId,
    pub kind: PieceKind,
}

/// Represents a single Car move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    from: Position,
    to: Position,
    captured: Option<Capture>,
}

impl Move {
    /// Placeholder used to fill unused move-list slots.
    pub const NULL: Move = Move {
        from: Position::from_sq(0),
        to: Position::from_sq(0),
        captured: None,
    };

    pub fn new(from: Position, to: Position, captured: Option<Capture>) -> Self {
        Move { from, to, captured }
    }

    pub fn from(&self) -> Position {
        self.from
    }

    pub fn to(&self) -> Position {
        self.to
    }

    pub fn captured(&self) -> Option<Capture> {
        self.captured
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn captures_king(&self) -> bool {
        matches!(self.captured, Some(Capture { kind: PieceKind::King, .. }))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(c) = self.captured {
            write!(f, "x{}", c.kind)?;
        }
        Ok(())
    }
}

/// For each direction, 1 if the nearest piece along that ray is a stationary piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreatCounts {
    pub left: u32,
    pub right: u32,
    pub up: u32,
    pub down: u32,
}

impl ThreatCounts {
    pub fn get(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn set(&mut self, dir: Direction, count: u32) {
        match dir {
            Direction::Left => self.left = count,
            Direction::Right => self.right = count,
            Direction::Up => self.up = count,
            Direction::Down => self.down = count,
        }
    }

    pub fn total(&self) -> u32 {
        self.left + self.right + self.up + self.down
    }
}

impl fmt::Display for ThreatCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left {} right {} up {} down {}",
            self.left, self.right, self.up, self.down
        )
    }
}

/// The terms that add up to a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub capture: f64,
    pub threat: f64,
    pub center: f64,
    pub follow_up: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.capture + self.threat + self.center + self.follow_up
    }
}

/// A scored Car move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCandidate {
    pub mv: Move,
    pub breakdown: ScoreBreakdown,
    pub score: f64,
    pub threats: ThreatCounts,
    pub safe: bool,
}

impl MoveCandidate {
    pub fn destination(&self) -> Position {
        self.mv.to()
    }

    pub fn is_capture(&self) -> bool {
        self.mv.is_capture()
    }
}

impl fmt::Display for MoveCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} score {:.1} threats {}", self.mv, self.score, self.threats.total())?;
        if !self.safe {
            f.write_str(" unsafe")?;
        }
        Ok(())
    }
}
