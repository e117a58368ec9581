use std::fs::File;
use std::io::{stdout, IsTerminal};
use std::path::{Path, PathBuf};

use clap::Parser;
use env_logger::{Env, Target};
use log::info;

use term_2048::config::Config;
use term_2048::scores::ScoreStore;
use term_2048::ui::GameUI;

#[derive(Debug, Parser)]
#[command(name = "term-2048", about = "Play 2048 in the terminal")]
struct Args {
    /// High score file (defaults to ~/.2048_high_scores.json)
    #[arg(long, env = "TERM_2048_SCORES", value_name = "FILE")]
    scores: Option<PathBuf>,

    /// Do not read or write high scores
    #[arg(long)]
    no_scores: bool,

    /// Seed the tile spawner for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Write log output to this file (the game owns the terminal)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("off")).init(),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    if !stdout().is_terminal() {
        eprintln!("Not running in an interactive terminal.");
        eprintln!("This game requires an interactive terminal to run.");
        return Ok(());
    }

    let config = Config::resolve(args.scores, args.no_scores, args.seed);
    info!("starting with {config:?}");
    let store = config.scores_path().map(ScoreStore::new);
    let mut ui = GameUI::new(store, config.rng());
    ui.run()?;
    Ok(())
}
