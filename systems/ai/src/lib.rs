#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded random opponent that emits at most one command per cooldown.

use std::time::Duration;

use dragon_tiles_core::{Cell, Command, GameState, InteractionState, PieceId};
use dragon_tiles_world::Board;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::trace;

/// Cooldown used when no other value is configured.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

const REDUCED_BEGINS: [Command; 3] = [
    Command::BeginRotateTile,
    Command::BeginMoveTile,
    Command::BeginPlaceTile,
];

const FULL_BEGINS: [Command; 5] = [
    Command::BeginRotateTile,
    Command::BeginMoveTile,
    Command::BeginPlaceTile,
    Command::BeginMoveWizard,
    Command::BeginMoveDragon,
];

/// Mode-entry commands the opponent draws from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repertoire {
    /// Tile actions only: rotate, move and place.
    Reduced,
    /// Tile actions plus wizard and dragon moves.
    #[default]
    Full,
}

impl Repertoire {
    /// Begin commands available to the opponent.
    #[must_use]
    pub const fn begins(self) -> &'static [Command] {
        match self {
            Self::Reduced => &REDUCED_BEGINS,
            Self::Full => &FULL_BEGINS,
        }
    }
}

/// Configuration parameters required to construct the AI controller.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    cooldown: Duration,
    rng_seed: u64,
    repertoire: Repertoire,
}

impl Config {
    /// Creates a new configuration using the provided cadence, seed and repertoire.
    #[must_use]
    pub const fn new(cooldown: Duration, rng_seed: u64, repertoire: Repertoire) -> Self {
        Self {
            cooldown,
            rng_seed,
            repertoire,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, 0, Repertoire::Full)
    }
}

/// Pure system that plays the opponent's turns at random.
#[derive(Debug)]
pub struct AiController {
    cooldown: Duration,
    remaining: Duration,
    repertoire: Repertoire,
    rng: ChaCha8Rng,
}

impl AiController {
    /// Creates a new AI controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cooldown: config.cooldown,
            remaining: Duration::ZERO,
            repertoire: config.repertoire,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Time left before the controller acts again.
    #[must_use]
    pub fn remaining_cooldown(&self) -> Duration {
        self.remaining
    }

    /// Advances the cooldown by `dt` and, once it has elapsed, emits one command.
    ///
    /// Every emitted command is either legal in the current state or a mode
    /// entry, so repeated calls always make progress.
    pub fn handle(&mut self, dt: Duration, board: &Board, game: &GameState, out: &mut Vec<Command>) {
        if game.state == InteractionState::GameOver {
            return;
        }

        self.remaining = self.remaining.saturating_sub(dt);
        if !self.remaining.is_zero() {
            return;
        }
        self.remaining = self.cooldown;

        let command = self
            .pick(board, game)
            .unwrap_or_else(|| self.random_begin());
        trace!(operation = %command.operation(), state = ?game.state, "ai chose command");
        out.push(command);
    }

    fn pick(&mut self, board: &Board, game: &GameState) -> Option<Command> {
        match game.state {
            InteractionState::Base | InteractionState::GameOver => None,
            InteractionState::RotateTile => {
                let tiles: Vec<_> = board.tiles().keys().collect();
                tiles
                    .choose(&mut self.rng)
                    .map(|tile| Command::RotateTile { tile: *tile })
            }
            InteractionState::PlaceTile => {
                let positions = board.playable_positions();
                self.first_shuffled(positions.keys(), |position| {
                    positions
                        .cell_of(*position)
                        .is_some_and(|cell| !board.tiles().has_cell(cell))
                })
                .map(|position| Command::PlaceTile { position })
            }
            InteractionState::MoveTile => self
                .first_shuffled(board.tiles().keys(), |tile| board.tile_has_legal_move(*tile))
                .map(|tile| Command::SelectTile { tile }),
            InteractionState::MoveDragon => self
                .first_shuffled(board.dragons().keys(), |dragon| {
                    board.dragon_has_legal_move(*dragon)
                })
                .map(|dragon| Command::SelectDragon { dragon }),
            InteractionState::MoveWizard => self
                .first_shuffled(board.wizards().keys(), |wizard| {
                    board.wizard_has_legal_move(*wizard)
                })
                .map(|wizard| Command::SelectWizard { wizard }),
            InteractionState::TileToMoveSelected => {
                let tile = game.selected_tile?;
                self.random_cell(board.tile_destinations(tile))
                    .map(|cell| Command::MoveTile { cell })
            }
            InteractionState::DragonToMoveSelected => match game.selected_piece? {
                PieceId::Dragon(dragon) => self
                    .random_cell(board.dragon_destinations(dragon))
                    .map(|cell| Command::MoveDragon { cell }),
                PieceId::Wizard(_) => None,
            },
            InteractionState::WizardToMoveSelected => match game.selected_piece? {
                PieceId::Wizard(wizard) => self
                    .random_cell(board.wizard_destinations(wizard))
                    .map(|cell| Command::MoveWizard { cell }),
                PieceId::Dragon(_) => None,
            },
        }
    }

    /// Shuffles the candidates and returns the first one accepted by `keep`.
    fn first_shuffled<T, I, F>(&mut self, candidates: I, keep: F) -> Option<T>
    where
        I: Iterator<Item = T>,
        F: Fn(&T) -> bool,
    {
        let mut candidates: Vec<T> = candidates.collect();
        candidates.shuffle(&mut self.rng);
        candidates.into_iter().find(|candidate| keep(candidate))
    }

    fn random_cell(&mut self, cells: Vec<Cell>) -> Option<Cell> {
        cells.choose(&mut self.rng).copied()
    }

    fn random_begin(&mut self) -> Command {
        let begins = self.repertoire.begins();
        begins[self.rng.gen_range(0..begins.len())]
    }
}
