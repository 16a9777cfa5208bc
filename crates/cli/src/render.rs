//! Terminal rendering of the board and its danger zones.

use crossterm::style::Stylize;
use puzzle_engine::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use puzzle_engine::{Game, PieceKind, Position};
use std::fmt::Write;

/// Draws the board with columns 1..8 across and rows 1..9 down.
///
/// Threatened empty cells show as `*`, the suggested destination as `o`. With `color`
/// set, danger is red, the Car green and the suggestion yellow.
pub fn render_board(game: &Game, color: bool) -> String {
    let board = game.board();
    let danger = game.danger_zones();
    let target = game.suggest().best().map(|c| c.destination());

    let mut out = String::new();
    out.push_str("    1 2 3 4 5 6 7 8\n");
    out.push_str("  +-----------------+\n");
    for y in 1..=BOARD_HEIGHT as i32 {
        let _ = write!(out, "{} | ", y);
        for x in 1..=BOARD_WIDTH as i32 {
            let Ok(pos) = Position::new(x, y) else {
                continue;
            };
            let cell = match board.piece_at(pos) {
                Some(p) if p.kind == PieceKind::Car && danger.contains(pos) => paint('X', color, Paint::Danger),
                Some(p) if p.kind == PieceKind::Car => paint('X', color, Paint::Car),
                Some(p) if Some(pos) == target => paint(p.kind.to_layout_char(), color, Paint::Target),
                Some(p) => p.kind.to_layout_char().to_string(),
                None if Some(pos) == target => paint('o', color, Paint::Target),
                None if danger.contains(pos) => paint('*', color, Paint::Danger),
                None => ".".to_string(),
            };
            let _ = write!(out, "{} ", cell);
        }
        out.push_str("|\n");
    }
    out.push_str("  +-----------------+");
    out
}

#[derive(Clone, Copy)]
enum Paint {
    Car,
    Danger,
    Target,
}

fn paint(ch: char, color: bool, paint: Paint) -> String {
    if !color {
        return ch.to_string();
    }
    match paint {
        Paint::Car => ch.green().bold().to_string(),
        Paint::Danger => ch.red().to_string(),
        Paint::Target => ch.yellow().to_string(),
    }
}
