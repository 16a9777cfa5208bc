//! The game session: owns the board, applies intents and keeps the derived view current.

use crate::bitboard::SquareSet;
use crate::board::{Board, Piece, PieceId};
use crate::config::Config;
use crate::constants::PieceKind;
use crate::danger::danger_zones;
use crate::error::{GameError, GameResult, IllegalMoveReason};
use crate::evaluate::{Advice, PositionAnalysis, analyze_position, evaluate_moves};
use crate::evolve::{self, EvolveReport};
use crate::move_gen;
use crate::position::Position;
use crate::r#move::Move;
use crate::record::BoardRecord;
use rand::Rng;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    /// A King was taken at this cell; the Car's next move clears its row and column.
    PendingClear(Position),
    /// The Car ended a move on a threatened cell. Only a reset leaves this phase.
    Lost,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Normal => f.write_str("normal"),
            Phase::PendingClear(at) => write!(f, "pending clear (king taken at {})", at),
            Phase::Lost => f.write_str("lost"),
        }
    }
}

/// Everything a renderer needs besides the board itself.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub danger: SquareSet,
    pub advice: Advice,
}

impl View {
    fn compute(board: &Board, config: &Config) -> Self {
        View {
            danger: danger_zones(board),
            advice: evaluate_moves(board, config),
        }
    }
}

/// Result of a completed Car move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub mv: Move,
    pub captured: Option<Piece>,
    /// Pieces removed by a pending row and column clear.
    pub cleared: Vec<Piece>,
    pub phase: Phase,
}

impl MoveOutcome {
    pub fn is_lost(&self) -> bool {
        self.phase == Phase::Lost
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car {} -> {}", self.mv.from(), self.mv.to())?;
        if let Some(p) = self.captured {
            write!(f, ", captured {}", p.kind)?;
        }
        if !self.cleared.is_empty() {
            write!(f, ", cleared {} piece(s)", self.cleared.len())?;
        }
        write!(f, ", phase {}", self.phase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub phase: Phase,
    pub move_count: u32,
    pub car: Position,
    pub pieces: usize,
    pub danger: SquareSet,
    pub car_in_danger: bool,
    pub selected: Option<PieceId>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "phase {} | lost {} | moves {} | car {} | pieces {}",
            self.phase,
            self.phase == Phase::Lost,
            self.move_count,
            self.car,
            self.pieces
        )?;
        if self.car_in_danger {
            f.write_str(" | car threatened")?;
        }
        if let Some(id) = self.selected {
            write!(f, " | selected {}", id)?;
        }
        if self.danger.is_empty() {
            f.write_str("\nno threatened cells")
        } else {
            write!(f, "\n{} threatened: {}", self.danger.len(), self.danger)
        }
    }
}

pub struct Game {
    board: Board,
    phase: Phase,
    move_count: u32,
    history: Vec<BoardRecord>,
    selected: Option<PieceId>,
    config: Config,
    view: View,
}

impl Game {
    pub fn new(config: Config) -> Self {
        Game::from_board(Board::start(), config)
    }

    pub fn from_board(board: Board, config: Config) -> Self {
        let view = View::compute(&board, &config);
        let history = vec![BoardRecord::capture(&board)];
        Game {
            board,
            phase: Phase::Normal,
            move_count: 0,
            history,
            selected: None,
            config,
            view,
        }
    }

    /// Back to the opening position.
    pub fn reset(&mut self) {
        self.load_board(Board::start());
        info!("game reset");
    }

    /// Starts a fresh session on `board`. Leaves any phase, including `Lost`.
    pub fn load_board(&mut self, board: Board) {
        self.board = board;
        self.phase = Phase::Normal;
        self.move_count = 0;
        self.history = vec![BoardRecord::capture(&self.board)];
        self.selected = None;
        self.refresh();
    }

    pub fn add_piece(&mut self, kind: PieceKind, pos: Position) -> GameResult<PieceId> {
        self.ensure_active()?;
        let id = self.board.add_piece(kind, pos)?;
        info!(%id, %kind, %pos, "piece added");
        self.refresh();
        Ok(id)
    }

    pub fn delete_piece(&mut self, id: PieceId) -> GameResult<Piece> {
        self.ensure_active()?;
        let piece = self.board.remove_piece(id)?;
        info!(%id, kind = %piece.kind, "piece deleted");
        self.refresh();
        Ok(piece)
    }

    pub fn delete_at(&mut self, pos: Position) -> GameResult<Piece> {
        self.ensure_active()?;
        let piece = self.board.remove_at(pos)?;
        info!(id = %piece.id, kind = %piece.kind, %pos, "piece deleted");
        self.refresh();
        Ok(piece)
    }

    /// Marks a piece for a following `move_selected`. Only the Car can be selected.
    pub fn select_for_move(&mut self, id: PieceId) -> GameResult<()> {
        self.ensure_active()?;
        let piece = self.board.piece(id).ok_or(GameError::UnknownPiece(id))?;
        if !piece.kind.is_car() {
            return Err(IllegalMoveReason::NotTheCar.into());
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn select_at(&mut self, pos: Position) -> GameResult<()> {
        let id = self.board.piece_at(pos).ok_or(GameError::EmptyCell(pos))?.id;
        self.select_for_move(id)
    }

    pub fn move_selected(&mut self, to: Position) -> GameResult<MoveOutcome> {
        self.ensure_active()?;
        if self.selected.is_none() {
            return Err(IllegalMoveReason::NothingSelected.into());
        }
        self.move_car(to)
    }

    /// Moves the Car to `to`, resolving captures, the delayed clear and loss.
    pub fn move_car(&mut self, to: Position) -> GameResult<MoveOutcome> {
        self.ensure_active()?;
        let mv = move_gen::validate_move(&self.board, to)?;

        let captured = self.board.move_car(to);
        if let Some(p) = captured {
            info!(kind = %p.kind, at = %to, "captured");
        }

        let cleared = match self.phase {
            Phase::PendingClear(_) => {
                let cleared = self.board.clear_lines(to);
                info!(count = cleared.len(), at = %to, "row and column cleared");
                cleared
            }
            _ => Vec::new(),
        };

        self.phase = if mv.captures_king() {
            info!(at = %to, "king captured, clear armed");
            Phase::PendingClear(to)
        } else {
            Phase::Normal
        };
        self.move_count += 1;
        self.history.push(BoardRecord::capture(&self.board));
        self.selected = None;
        self.refresh();

        if self.view.danger.contains(self.board.car_position()) {
            info!(at = %to, moves = self.move_count, "car captured, game over");
            self.phase = Phase::Lost;
        }

        Ok(MoveOutcome {
            mv,
            captured,
            cleared,
            phase: self.phase,
        })
    }

    /// Spawns and shifts pieces. Never moves the Car and never ends the game by itself.
    pub fn evolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameResult<EvolveReport> {
        self.ensure_active()?;
        let report = evolve::evolve(&mut self.board, &self.config, rng)?;
        info!(spawned = report.spawned.len(), shifted = report.shifted.is_some(), "environment evolved");
        self.refresh();
        Ok(report)
    }

    pub fn analyze(&self, pos: Position) -> GameResult<PositionAnalysis> {
        analyze_position(&self.board, pos, &self.config)
    }

    pub fn suggest(&self) -> &Advice {
        &self.view.advice
    }

    pub fn danger_zones(&self) -> &SquareSet {
        &self.view.danger
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn status(&self) -> Status {
        let car = self.board.car_position();
        Status {
            phase: self.phase,
            move_count: self.move_count,
            car,
            pieces: self.board.len(),
            danger: self.view.danger,
            car_in_danger: self.view.danger.contains(car),
            selected: self.selected,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Lost
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Board snapshots: the starting position, then one per completed move.
    pub fn history(&self) -> &[BoardRecord] {
        &self.history
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn ensure_active(&self) -> GameResult<()> {
        if self.phase == Phase::Lost {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn refresh(&mut self) {
        self.view = View::compute(&self.board, &self.config);
        debug!(danger = self.view.danger.len(), no_safe_move = self.view.advice.is_no_safe_move(), "view recomputed");
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(Config::default())
    }
}
