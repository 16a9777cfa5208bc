//! Constants used by the puzzle engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BOARD_WIDTH: u8 = 8;
pub const BOARD_HEIGHT: u8 = 9;
pub const NUM_SQUARES: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Layout of a fresh session: three pawns on rank 3, the Car at (4,7).
pub const START_LAYOUT: &str = "8/8/3P1P1P/8/8/8/3X4/8/8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PieceKind {
    Car = 0,
    Pawn = 1,
    #[serde(alias = "rook")]
    Chariot = 2,
    Knight = 3,
    Cannon = 4,
    Bishop = 5,
    Advisor = 6,
    King = 7,
}

// --- Capture Values ---
// Indexed by `PieceKind as usize`. The Car is never captured.
pub const CAPTURE_VALUES: [f64; 8] = [
    0.0,    // CAR
    20.0,   // PAWN
    70.0,   // CHARIOT
    50.0,   // KNIGHT
    60.0,   // CANNON
    40.0,   // BISHOP
    30.0,   // ADVISOR
    1000.0, // KING
];

impl PieceKind {
    pub const ALL: [PieceKind; 8] = [
        PieceKind::Car,
        PieceKind::Pawn,
        PieceKind::Chariot,
        PieceKind::Knight,
        PieceKind::Cannon,
        PieceKind::Bishop,
        PieceKind::Advisor,
        PieceKind::King,
    ];

    /// Kinds the random environment event may spawn. Chariot and King are editor-only.
    pub const SPAWNABLE: [PieceKind; 5] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Cannon,
        PieceKind::Bishop,
        PieceKind::Advisor,
    ];

    /// Value awarded for capturing a piece of this kind.
    pub fn capture_value(self) -> f64 {
        CAPTURE_VALUES[self as usize]
    }

    pub fn is_car(self) -> bool {
        self == PieceKind::Car
    }

    pub fn to_layout_char(self) -> char {
        match self {
            PieceKind::Car => 'X',
            PieceKind::Pawn => 'P',
            PieceKind::Chariot => 'R',
            PieceKind::Knight => 'N',
            PieceKind::Cannon => 'C',
            PieceKind::Bishop => 'B',
            PieceKind::Advisor => 'A',
            PieceKind::King => 'K',
        }
    }

    pub fn from_layout_char(c: char) -> Option<PieceKind> {
        match c {
            'X' => Some(PieceKind::Car),
            'P' => Some(PieceKind::Pawn),
            'R' => Some(PieceKind::Chariot),
            'N' => Some(PieceKind::Knight),
            'C' => Some(PieceKind::Cannon),
            'B' => Some(PieceKind::Bishop),
            'A' => Some(PieceKind::Advisor),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Car => "car",
            PieceKind::Pawn => "pawn",
            PieceKind::Chariot => "chariot",
            PieceKind::Knight => "knight",
            PieceKind::Cannon => "cannon",
            PieceKind::Bishop => "bishop",
            PieceKind::Advisor => "advisor",
            PieceKind::King => "king",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a piece name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown piece kind `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for PieceKind {
    type Err = UnknownKind;

    /// Accepts the canonical names, the usual xiangqi aliases and single layout characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "car" | "x" => PieceKind::Car,
            "pawn" | "soldier" | "p" => PieceKind::Pawn,
            "chariot" | "rook" | "r" => PieceKind::Chariot,
            "knight" | "horse" | "n" => PieceKind::Knight,
            "cannon" | "c" => PieceKind::Cannon,
            "bishop" | "elephant" | "b" => PieceKind::Bishop,
            "advisor" | "guard" | "a" => PieceKind::Advisor,
            "king" | "general" | "k" => PieceKind::King,
            _ => return Err(UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}
