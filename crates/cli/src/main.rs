mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Reply, Session};
use puzzle_engine::archive::{Archive, DEFAULT_ARCHIVE};
use puzzle_engine::{Board, Config, Game};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Headless line-command front end for the car puzzle.
#[derive(Debug, Parser)]
#[command(name = "car_puzzle", version)]
struct Args {
    /// Starting layout, e.g. "8/8/3P1P1P/8/8/8/3X4/8/8".
    #[arg(long)]
    layout: Option<String>,

    /// JSON file holding named saves.
    #[arg(long, default_value = DEFAULT_ARCHIVE)]
    archive: PathBuf,

    /// JSON file overriding evaluator weights and event settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the environment event RNG.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable colored board output.
    #[arg(long)]
    no_color: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
    let config: Config = serde_json::from_str(&contents).with_context(|| format!("parsing config {:?}", path))?;
    info!("[CONFIG] Loaded {:?}", path);
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let board = match &args.layout {
        Some(layout) => Board::from_layout(layout).context("invalid --layout")?,
        None => Board::start(),
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let archive = Archive::open(&args.archive);
    let mut session = Session::new(Game::from_board(board, config), archive, rng, !args.no_color);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "car puzzle; type `help` for commands")?;
    writeln!(out, "{}", session.board_text())?;
    out.flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match session.handle_line(&line) {
            Ok(Some(Reply::Text(text))) => writeln!(out, "{}", text)?,
            Ok(Some(Reply::Quit)) => break,
            Ok(None) => {}
            Err(e) => {
                debug!("command `{}` failed: {:#}", line.trim(), e);
                writeln!(out, "error: {:#}", e)?;
            }
        }
        out.flush()?;
    }
    Ok(())
}
