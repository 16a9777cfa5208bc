//! Error types for the puzzle engine.
//!
//! Every variant is recoverable: the caller reports it and the board is left untouched.
//! "No safe move" is deliberately absent; the evaluator reports it as advice.

use crate::board::PieceId;
use crate::position::Position;

/// Why a requested Car move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMoveReason {
    #[error("the car moves only along its row or column")]
    NotColinear,

    #[error("a piece blocks the path")]
    PathBlocked,

    #[error("the car is already on that cell")]
    NullMove,

    #[error("only the car can be moved")]
    NotTheCar,

    #[error("no piece is selected for moving")]
    NothingSelected,
}

/// Errors that can occur in game logic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("coordinate ({x}, {y}) is outside the 8x9 board")]
    InvalidCoordinate { x: i32, y: i32 },

    #[error("cell {0} already holds a piece")]
    OccupiedCell(Position),

    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMoveReason),

    #[error("the car cannot be removed")]
    ProtectedPieceDeletion,

    #[error("the board already has a car")]
    DuplicateCar,

    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),

    #[error("no piece at {0}")]
    EmptyCell(Position),

    #[error("the car was captured; reset to play again")]
    GameOver,

    #[error("malformed layout: {0}")]
    MalformedLayout(String),

    #[error("malformed board record: {0}")]
    MalformedRecord(String),
}

/// Result type alias for game operations.
pub type GameResult<T> = Result<T, GameError>;
