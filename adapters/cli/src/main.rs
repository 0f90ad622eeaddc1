#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Dragon Tiles session in the terminal.

mod config;
mod input;
mod render;
mod session;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use dragon_tiles_core::Event;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Overrides, SessionConfig},
    input::{parse_line, Prompt, HELP},
    render::render,
    session::Session,
};

/// Plays Dragon Tiles against a random opponent.
#[derive(Parser, Debug)]
#[command(name = "dragon-tiles", version, about)]
struct Args {
    /// TOML file with `[session]`, `[ai]` and `[board]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for tile faces and both AI controllers.
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds the opponent waits between commands.
    #[arg(long)]
    ai_cooldown_ms: Option<u64>,

    /// Simulated milliseconds per session tick.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Let an AI controller take the player's turns too.
    #[arg(long)]
    autoplay: bool,

    /// Stop after this many ticks.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Restrict the AI controllers to tile actions.
    #[arg(long)]
    reduced_repertoire: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed: self.seed,
            tick_ms: self.tick_ms,
            ai_cooldown_ms: self.ai_cooldown_ms,
            reduced_repertoire: self.reduced_repertoire,
        }
    }
}

/// Entry point for the Dragon Tiles command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = SessionConfig::load(args.config.as_deref())?;
    config.apply(args.overrides());
    info!(
        seed = config.session.seed,
        tick_ms = config.session.tick_ms,
        cooldown_ms = config.ai.cooldown_ms,
        repertoire = ?config.ai.repertoire,
        "session configured"
    );

    let mut session = Session::new(&config, args.autoplay)?;
    println!("Dragon Tiles");

    if args.autoplay {
        run_autoplay(&mut session, args.max_ticks);
    } else {
        run_interactive(&mut session, args.max_ticks)?;
    }

    info!(ticks = session.ticks(), "session finished");
    Ok(())
}

fn run_autoplay(session: &mut Session, max_ticks: u64) {
    print!("{}", render(session.board(), session.game_state()));
    while !session.is_over() && session.ticks() < max_ticks {
        let events = session.tick(Default::default());
        if report(&events) {
            print!("{}", render(session.board(), session.game_state()));
        }
    }
}

fn run_interactive(session: &mut Session, max_ticks: u64) -> Result<()> {
    println!("{HELP}");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_over() && session.ticks() < max_ticks {
        if !session.awaits_player() {
            let events = session.tick(Default::default());
            if report(&events) {
                print!("{}", render(session.board(), session.game_state()));
            }
            continue;
        }

        print!("{}> ", render(session.board(), session.game_state()));
        io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;

        match parse_line(&line) {
            Ok(Prompt::Quit) => break,
            Ok(Prompt::Input(input)) => {
                let _ = report(&session.tick(input));
            }
            Err(error) => {
                warn!("{error:#}");
                println!("{HELP}");
            }
        }
    }
    Ok(())
}

/// Prints the notable events of a tick and reports whether the board changed.
fn report(events: &[Event]) -> bool {
    let mut changed = false;
    for event in events {
        match event {
            Event::TurnPassed { is_player_turn } => {
                changed = true;
                let next = if *is_player_turn { "player" } else { "ai" };
                println!("turn passes to {next}");
            }
            Event::WizardCaptured {
                cell, team_index, ..
            } => {
                changed = true;
                println!("wizard of team {team_index} captured at {cell}");
            }
            Event::GameOver { winner } => {
                changed = true;
                match winner {
                    Some(team) => println!("game over: team {team:?} wins"),
                    None => println!("game over: no wizards left"),
                }
            }
            _ => {}
        }
    }
    changed
}
