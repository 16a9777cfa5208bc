//! Line commands understood by the interactive loop.

use crate::render::render_board;
use anyhow::{Context, Result, anyhow, bail};
use puzzle_engine::archive::Archive;
use puzzle_engine::evaluate::Advice;
use puzzle_engine::{Board, Game, PieceKind, Position};
use rand::rngs::StdRng;
use std::fmt::Write;

pub const HELP: &str = "\
commands:
  reset                   restore the opening position
  add <kind> <x> <y>      place a piece (pawn, chariot, knight, cannon, bishop, advisor, king)
  delete <x> <y>          remove the piece on a cell
  move <x> <y>            move the car
  select <x> <y>          select the car for a following `to`
  to <x> <y>              move the selected car
  suggest                 ranked safe moves
  analyze <x> <y>         score breakdown for the car on a cell
  status                  phase, lost flag, move count and threatened cells
  danger                  list threatened cells
  board                   draw the board
  layout                  print the board as a layout string
  load-layout <layout>    start over from a layout string
  evolve                  spawn and shift pieces
  history                 layouts after each move
  save <name>             store the board in the archive
  load <name>             start over from a save
  saves                   list saves
  remove <name>           delete a save
  export <name>           print a save as JSON
  help                    this text
  quit                    leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Reset,
    Add(PieceKind, Position),
    Delete(Position),
    Move(Position),
    Select(Position),
    MoveSelected(Position),
    Suggest,
    Analyze(Position),
    Status,
    Danger,
    Board,
    Layout,
    LoadLayout(String),
    Evolve,
    History,
    Save(String),
    Load(String),
    Saves,
    Remove(String),
    Export(String),
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let args = &parts[1..];
        let command = match parts[0].to_ascii_lowercase().as_str() {
            "reset" => Command::Reset,
            "add" => {
                let [kind, x, y] = expect_args::<3>(args, "add <kind> <x> <y>")?;
                let kind: PieceKind = kind.parse()?;
                Command::Add(kind, parse_position(x, y)?)
            }
            "delete" | "del" => Command::Delete(position_arg(args, "delete <x> <y>")?),
            "move" | "mv" => Command::Move(position_arg(args, "move <x> <y>")?),
            "select" => Command::Select(position_arg(args, "select <x> <y>")?),
            "to" => Command::MoveSelected(position_arg(args, "to <x> <y>")?),
            "suggest" => Command::Suggest,
            "analyze" => Command::Analyze(position_arg(args, "analyze <x> <y>")?),
            "status" => Command::Status,
            "danger" => Command::Danger,
            "board" => Command::Board,
            "layout" => Command::Layout,
            "load-layout" => {
                let [layout] = expect_args::<1>(args, "load-layout <layout>")?;
                Command::LoadLayout(layout.to_string())
            }
            "evolve" => Command::Evolve,
            "history" => Command::History,
            "save" => Command::Save(name_arg(line, parts[0])?),
            "load" => Command::Load(name_arg(line, parts[0])?),
            "saves" => Command::Saves,
            "remove" => Command::Remove(name_arg(line, parts[0])?),
            "export" => Command::Export(name_arg(line, parts[0])?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command `{}` (try `help`)", other),
        };
        Ok(Some(command))
    }
}

fn expect_args<'a, const N: usize>(args: &[&'a str], usage: &str) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| anyhow!("usage: {}", usage))
}

fn parse_position(x: &str, y: &str) -> Result<Position> {
    let x: i32 = x.parse().with_context(|| format!("bad x coordinate `{}`", x))?;
    let y: i32 = y.parse().with_context(|| format!("bad y coordinate `{}`", y))?;
    Ok(Position::new(x, y)?)
}

fn position_arg(args: &[&str], usage: &str) -> Result<Position> {
    let [x, y] = expect_args::<2>(args, usage)?;
    parse_position(x, y)
}

// Save names may contain spaces: everything after the command word.
fn name_arg(line: &str, word: &str) -> Result<String> {
    let name = line[word.len()..].trim();
    if name.is_empty() {
        bail!("usage: {} <name>", word);
    }
    Ok(name.to_string())
}

pub enum Reply {
    Text(String),
    Quit,
}

/// One interactive session: the game, its archive and the event RNG.
pub struct Session {
    game: Game,
    archive: Archive,
    rng: StdRng,
    color: bool,
}

impl Session {
    pub fn new(game: Game, archive: Archive, rng: StdRng, color: bool) -> Self {
        Session {
            game,
            archive,
            rng,
            color,
        }
    }

    #[cfg(test)]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Parses and runs one line.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Reply>> {
        match Command::parse(line)? {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::Reset => {
                self.game.reset();
                format!("board reset\n{}", self.board_text())
            }
            Command::Add(kind, pos) => {
                let id = self.game.add_piece(kind, pos)?;
                format!("added {} {} at {}", kind, id, pos)
            }
            Command::Delete(pos) => {
                let piece = self.game.delete_at(pos)?;
                format!("deleted {} at {}", piece.kind, pos)
            }
            Command::Move(to) => {
                let outcome = self.game.move_car(to)?;
                self.after_move(outcome.to_string(), outcome.is_lost())
            }
            Command::Select(pos) => {
                self.game.select_at(pos)?;
                format!("selected car at {}", pos)
            }
            Command::MoveSelected(to) => {
                let outcome = self.game.move_selected(to)?;
                self.after_move(outcome.to_string(), outcome.is_lost())
            }
            Command::Suggest => suggestion_text(self.game.suggest()),
            Command::Analyze(pos) => self.game.analyze(pos)?.to_string(),
            Command::Status => self.game.status().to_string(),
            Command::Danger => {
                let danger = self.game.danger_zones();
                if danger.is_empty() {
                    "no threatened cells".to_string()
                } else {
                    format!("{} threatened: {}", danger.len(), danger)
                }
            }
            Command::Board => self.board_text(),
            Command::Layout => self.game.board().to_layout(),
            Command::LoadLayout(layout) => {
                let board = Board::from_layout(&layout)?;
                self.game.load_board(board);
                format!("layout loaded\n{}", self.board_text())
            }
            Command::Evolve => {
                let report = self.game.evolve(&mut self.rng)?;
                format!("{}\n{}", report, self.board_text())
            }
            Command::History => {
                let mut out = String::new();
                for (i, record) in self.game.history().iter().enumerate() {
                    let board = record.restore()?;
                    let _ = writeln!(out, "{:>3}: {}", i, board.to_layout());
                }
                out.trim_end().to_string()
            }
            Command::Save(name) => {
                let save = self.archive.save(&name, self.game.board())?;
                format!("saved '{}' at {}", save.name, save.timestamp.to_rfc3339())
            }
            Command::Load(name) => {
                let board = self.archive.load(&name)?;
                self.game.load_board(board);
                format!("loaded '{}'\n{}", name, self.board_text())
            }
            Command::Saves => {
                let saves = self.archive.list();
                if saves.is_empty() {
                    "no saves".to_string()
                } else {
                    saves
                        .iter()
                        .map(|s| format!("{}  {}  {} pieces", s.name, s.timestamp.to_rfc3339(), s.board.pieces.len()))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Remove(name) => {
                self.archive.delete(&name)?;
                format!("removed '{}'", name)
            }
            Command::Export(name) => self.archive.export(&name)?,
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn after_move(&self, summary: String, lost: bool) -> String {
        let mut out = summary;
        if lost {
            out.push_str("\ngame over: the car was captured (use `reset`)");
        }
        let _ = write!(out, "\n{}", self.board_text());
        if !lost {
            let _ = write!(out, "\n{}", self.game.suggest());
        }
        out
    }

    pub fn board_text(&self) -> String {
        render_board(&self.game, self.color)
    }
}

fn suggestion_text(advice: &Advice) -> String {
    let mut out = advice.to_string();
    if let Some(s) = advice.suggestion() {
        out.push_str("\nranked:");
        for (i, c) in s.ranked.iter().enumerate() {
            let _ = write!(out, "\n{:>3}. {}", i + 1, c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_engine::{Config, Phase};
    use rand::SeedableRng;

    fn session() -> Session {
        Session::new(
            Game::new(Config::default()),
            Archive::in_memory(),
            StdRng::seed_from_u64(1),
            false,
        )
    }

    fn run(session: &mut Session, line: &str) -> Result<String> {
        match session.handle_line(line)? {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Quit) => Ok("quit".to_string()),
            None => Ok(String::new()),
        }
    }

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("move 4 3").unwrap(), Some(Command::Move(pos(4, 3))));
        assert_eq!(
            Command::parse("add Horse 2 2").unwrap(),
            Some(Command::Add(PieceKind::Knight, pos(2, 2)))
        );
        assert_eq!(Command::parse("save my puzzle").unwrap(), Some(Command::Save("my puzzle".into())));
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert!(Command::parse("move 4").is_err());
        assert!(Command::parse("move 9 1").is_err());
        assert!(Command::parse("add dragon 1 1").is_err());
        assert!(Command::parse("fly").is_err());
    }

    #[test]
    fn capture_then_status() {
        let mut s = session();
        let text = run(&mut s, "move 4 3").unwrap();
        assert!(text.starts_with("car (4,7) -> (4,3), captured pawn"));
        let status = run(&mut s, "status").unwrap();
        assert!(status.contains("moves 1"));
        assert!(status.contains("lost false"));
        assert_eq!(s.game().phase(), Phase::Normal);
    }

    #[test]
    fn status_lists_threatened_cells() {
        let mut s = session();
        let status = run(&mut s, "status").unwrap();
        assert!(status.starts_with("phase normal | lost false | moves 0"));
        // The pawn at (4,3) guards the cell beside it.
        let danger_line = status.lines().nth(1).unwrap();
        assert!(danger_line.contains("(3,3)"));
        assert_eq!(danger_line, run(&mut s, "danger").unwrap());
    }

    #[test]
    fn errors_do_not_change_the_board() {
        let mut s = session();
        let before = s.game().board().clone();
        assert!(run(&mut s, "move 5 5").is_err());
        assert!(run(&mut s, "delete 4 7").is_err());
        assert!(run(&mut s, "add pawn 4 3").is_err());
        assert!(run(&mut s, "load nothing").is_err());
        assert_eq!(s.game().board(), &before);
    }

    #[test]
    fn save_load_and_layouts() {
        let mut s = session();
        run(&mut s, "add cannon 1 1").unwrap();
        run(&mut s, "save one").unwrap();
        run(&mut s, "reset").unwrap();
        assert!(run(&mut s, "saves").unwrap().starts_with("one  "));
        run(&mut s, "load one").unwrap();
        assert_eq!(run(&mut s, "layout").unwrap(), "C7/8/3P1P1P/8/8/8/3X4/8/8");
        run(&mut s, "load-layout 8/8/8/8/4X3/8/8/8/8").unwrap();
        assert_eq!(run(&mut s, "danger").unwrap(), "no threatened cells");
        assert!(run(&mut s, "export one").unwrap().contains("\"carPosition\""));
        run(&mut s, "remove one").unwrap();
        assert_eq!(run(&mut s, "saves").unwrap(), "no saves");
    }

    #[test]
    fn select_then_move_and_quit() {
        let mut s = session();
        assert!(run(&mut s, "select 4 3").is_err());
        run(&mut s, "select 4 7").unwrap();
        run(&mut s, "to 1 7").unwrap();
        assert_eq!(s.game().board().car_position(), pos(1, 7));
        assert_eq!(run(&mut s, "history").unwrap().lines().count(), 2);
        assert_eq!(run(&mut s, "quit").unwrap(), "quit");
    }
}
