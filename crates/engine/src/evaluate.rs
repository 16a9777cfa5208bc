//! Scores the Car's candidate moves and picks a suggestion.

use crate::attacks::get_car_moves_bb;
use crate::bitboard::SQUARE_MASKS;
use crate::board::Board;
use crate::config::Config;
use crate::error::{GameResult, IllegalMoveReason};
use crate::move_gen::{self, is_safe_destination, threat_counts};
use crate::position::Position;
use crate::r#move::{Capture, Move, MoveCandidate, ScoreBreakdown, ThreatCounts};
use std::fmt;

/// The cell the Car would head for right after taking a King, and how many pieces the
/// resulting row and column clear would remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    pub cell: Position,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Safe moves by descending score; equal scores keep generation order.
    pub ranked: Vec<MoveCandidate>,
    pub best: MoveCandidate,
    /// Highest-ranked capturing move, when it is not `best`.
    pub direct_capture: Option<MoveCandidate>,
    /// Move with the most threatened directions, when it is not `best`.
    pub max_threat: Option<MoveCandidate>,
}

/// What the evaluator recommends for the current board.
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    Moves(Suggestion),
    /// Every legal move walks into an attack. `fallback` is the best of them, marked
    /// unsafe, or `None` when the Car cannot move at all.
    NoSafeMove { fallback: Option<MoveCandidate> },
}

impl Advice {
    pub fn best(&self) -> Option<&MoveCandidate> {
        match self {
            Advice::Moves(s) => Some(&s.best),
            Advice::NoSafeMove { fallback } => fallback.as_ref(),
        }
    }

    pub fn is_no_safe_move(&self) -> bool {
        matches!(self, Advice::NoSafeMove { .. })
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        match self {
            Advice::Moves(s) => Some(s),
            Advice::NoSafeMove { .. } => None,
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::Moves(s) => {
                write!(f, "best {}", s.best)?;
                if let Some(c) = &s.direct_capture {
                    write!(f, "\ncapture {}", c)?;
                }
                if let Some(t) = &s.max_threat {
                    write!(f, "\nthreat {}", t)?;
                }
                Ok(())
            }
            Advice::NoSafeMove { fallback: Some(m) } => write!(f, "no safe move; fallback {}", m),
            Advice::NoSafeMove { fallback: None } => f.write_str("no safe move; car cannot move"),
        }
    }
}

/// Full breakdown for the Car standing on one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionAnalysis {
    pub target: Position,
    pub legal: bool,
    pub safe: bool,
    pub captured: Option<Capture>,
    pub threats: ThreatCounts,
    pub breakdown: ScoreBreakdown,
    pub score: f64,
    pub follow_up: Option<FollowUp>,
}

impl fmt::Display for PositionAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} legal {} safe {} score {:.1}",
            self.target, self.legal, self.safe, self.score
        )?;
        match self.captured {
            Some(c) => writeln!(f, "  capture {} +{:.1}", c.kind, self.breakdown.capture)?,
            None => writeln!(f, "  capture none")?,
        }
        writeln!(f, "  threats {} +{:.1}", self.threats, self.breakdown.threat)?;
        writeln!(f, "  center +{:.1}", self.breakdown.center)?;
        match self.follow_up {
            Some(fu) => write!(
                f,
                "  follow-up {} clears {} +{:.1}",
                fu.cell, fu.count, self.breakdown.follow_up
            ),
            None => write!(f, "  follow-up none"),
        }
    }
}

/// Ranks every safe Car move on `board`.
pub fn evaluate_moves(board: &Board, config: &Config) -> Advice {
    let mut ranked = Vec::new();
    let mut unsafe_moves = Vec::new();
    for mv in move_gen::generate_legal_moves(board).iter() {
        let safe = is_safe_destination(board, mv.to());
        let (candidate, _) = score_move(board, *mv, safe, config);
        if safe {
            ranked.push(candidate);
        } else {
            unsafe_moves.push(candidate);
        }
    }

    if ranked.is_empty() {
        sort_by_score(&mut unsafe_moves);
        return Advice::NoSafeMove {
            fallback: unsafe_moves.first().copied(),
        };
    }

    sort_by_score(&mut ranked);
    let best = ranked[0];
    let direct_capture = ranked
        .iter()
        .find(|c| c.is_capture())
        .filter(|c| c.destination() != best.destination())
        .copied();
    let max_threat = ranked
        .iter()
        .map(|c| c.threats.total())
        .max()
        .and_then(|most| ranked.iter().find(|c| c.threats.total() == most))
        .filter(|c| c.destination() != best.destination())
        .copied();

    Advice::Moves(Suggestion {
        ranked,
        best,
        direct_capture,
        max_threat,
    })
}

/// Scores the Car standing on `target`, legal or not.
pub fn analyze_position(board: &Board, target: Position, config: &Config) -> GameResult<PositionAnalysis> {
    let from = board.car_position();
    if from == target {
        return Err(IllegalMoveReason::NullMove.into());
    }
    let legal = move_gen::validate_move(board, target).is_ok();
    let safe = is_safe_destination(board, target);
    let captured = board
        .piece_at(target)
        .map(|p| Capture { id: p.id, kind: p.kind });
    let (candidate, follow_up) = score_move(board, Move::new(from, target, captured), safe, config);
    Ok(PositionAnalysis {
        target,
        legal,
        safe,
        captured,
        threats: candidate.threats,
        breakdown: candidate.breakdown,
        score: candidate.score,
        follow_up,
    })
}

fn score_move(board: &Board, mv: Move, safe: bool, config: &Config) -> (MoveCandidate, Option<FollowUp>) {
    let to = mv.to();
    let after = board.with_car_at(to);
    let threats = threat_counts(&after, to);
    let follow_up = if mv.captures_king() {
        best_follow_up(&after, to)
    } else {
        None
    };

    let breakdown = ScoreBreakdown {
        capture: mv.captured().map_or(0.0, |c| c.kind.capture_value()),
        threat: config.threat_bonus * f64::from(threats.total()),
        center: center_score(to, config),
        follow_up: follow_up.map_or(0.0, |fu| config.follow_up_bonus(fu.count)),
    };
    let candidate = MoveCandidate {
        mv,
        breakdown,
        score: breakdown.total(),
        threats,
        safe,
    };
    (candidate, follow_up)
}

pub fn center_score(pos: Position, config: &Config) -> f64 {
    (config.center_base - (f64::from(pos.x()) - config.center_x).abs())
        + (config.center_base - (f64::from(pos.y()) - config.center_y).abs())
}

/// Best cell for the move after a King capture, on the board with the King already gone.
///
/// Cells are scanned column by column; only a strictly larger count replaces the
/// current pick, and a count of zero is never reported.
pub fn best_follow_up(after: &Board, from: Position) -> Option<FollowUp> {
    let reachable = get_car_moves_bb(from.sq(), after.occupied_bitboard());
    let mut best: Option<FollowUp> = None;
    for cell in Position::all().filter(|c| reachable & SQUARE_MASKS[c.sq()] != 0) {
        let count = after
            .stationary()
            .filter(|p| p.position.is_colinear(cell))
            .count() as u32;
        if count > best.map_or(0, |b| b.count) {
            best = Some(FollowUp { cell, count });
        }
    }
    best
}

fn sort_by_score(moves: &mut [MoveCandidate]) {
    // Stable, so equal scores stay in generation order.
    moves.sort_by(|a, b| b.score.total_cmp(&a.score));
}
