pub mod archive;
pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod config;
pub mod constants;
pub mod danger;
pub mod error;
pub mod evaluate;
pub mod evolve;
pub mod game;
pub mod move_gen;
pub mod movelist;
pub mod r#move;
pub mod position;
pub mod record;

pub use board::{Board, Piece, PieceId};
pub use config::Config;
pub use constants::PieceKind;
pub use error::{GameError, GameResult, IllegalMoveReason};
pub use evaluate::Advice;
pub use game::{Game, MoveOutcome, Phase};
pub use position::Position;
