#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dragon Tiles.
//!
//! The world owns the [`Board`] and the turn state machine. Every mutation
//! flows through [`apply`], one command at a time, followed by a single
//! [`settle`] pass once the tick's commands are exhausted.

pub mod board;
pub mod layer;

use std::time::Duration;

use dragon_tiles_core::{
    BoardLayout, Command, Event, GameState, InteractionState, PieceId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

pub use board::{Board, SetupError, TeamCensus};
pub use layer::{Layer, LayerEntry};

/// Represents the authoritative Dragon Tiles world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    starting_census: TeamCensus,
    game: GameState,
    rng: ChaCha8Rng,
    elapsed: Duration,
}

impl World {
    /// Creates a world from authored setup data.
    ///
    /// `seed` drives every random tile face, both for authored tiles without
    /// faces and for tiles placed during play.
    pub fn new(layout: &BoardLayout, seed: u64) -> Result<Self, SetupError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Board::from_layout(layout, &mut rng)?;
        info!(
            playable_positions = board.playable_positions().len(),
            tiles = board.tiles().len(),
            dragons = board.dragons().len(),
            wizards = board.wizards().len(),
            "board ready"
        );
        Ok(Self {
            starting_census: board.team_census(),
            board,
            game: GameState::new(),
            rng,
            elapsed: Duration::ZERO,
        })
    }

    fn enter(&mut self, to: InteractionState, out_events: &mut Vec<Event>) {
        let from = self.game.state;
        if from != to {
            self.game.state = to;
            out_events.push(Event::StateChanged { from, to });
        }
    }

    fn clear_selection(&mut self) {
        self.game.selected_tile = None;
        self.game.selected_piece = None;
    }

    fn finish_turn(&mut self, out_events: &mut Vec<Event>) {
        self.clear_selection();
        self.enter(InteractionState::Base, out_events);
        self.game.is_player_turn = !self.game.is_player_turn;
        out_events.push(Event::TurnPassed {
            is_player_turn: self.game.is_player_turn,
        });
    }

    fn begin(&mut self, command: Command, out_events: &mut Vec<Event>) -> bool {
        let Some(mode) = command.mode() else {
            return false;
        };
        let state = self.game.state;
        if state != InteractionState::Base && !state.is_picking() {
            return false;
        }
        if mode == InteractionState::PlaceTile && !self.board.has_empty_playable_position() {
            return false;
        }

        self.clear_selection();
        self.enter(mode, out_events);
        true
    }

    fn resolve(&mut self, command: Command, out_events: &mut Vec<Event>) -> bool {
        let state = self.game.state;
        if state == InteractionState::GameOver {
            return matches!(command, Command::PassTime { .. });
        }

        match command {
            Command::PassTime { .. } => true,
            Command::BeginRotateTile
            | Command::BeginMoveTile
            | Command::BeginPlaceTile
            | Command::BeginMoveWizard
            | Command::BeginMoveDragon => self.begin(command, out_events),
            Command::SelectTile { tile } => {
                if state != InteractionState::MoveTile || !self.board.tile_has_legal_move(tile) {
                    return false;
                }
                self.game.selected_tile = Some(tile);
                self.enter(InteractionState::TileToMoveSelected, out_events);
                true
            }
            Command::SelectDragon { dragon } => {
                if state != InteractionState::MoveDragon
                    || !self.board.dragon_has_legal_move(dragon)
                {
                    return false;
                }
                self.game.selected_piece = Some(PieceId::Dragon(dragon));
                self.enter(InteractionState::DragonToMoveSelected, out_events);
                true
            }
            Command::SelectWizard { wizard } => {
                if state != InteractionState::MoveWizard
                    || !self.board.wizard_has_legal_move(wizard)
                {
                    return false;
                }
                self.game.selected_piece = Some(PieceId::Wizard(wizard));
                self.enter(InteractionState::WizardToMoveSelected, out_events);
                true
            }
            Command::RotateTile { tile } => {
                if state != InteractionState::RotateTile {
                    return false;
                }
                let Some(rotation) = self.board.rotate_tile(tile) else {
                    return false;
                };
                out_events.push(Event::TileRotated { tile, rotation });
                self.finish_turn(out_events);
                true
            }
            Command::PlaceTile { position } => {
                if state != InteractionState::PlaceTile {
                    return false;
                }
                let Some(cell) = self.board.playable_positions().cell_of(position) else {
                    return false;
                };
                if !self.board.is_empty_playable_position(cell) {
                    return false;
                }
                let faces = board::random_faces(&mut self.rng);
                let tile = self.board.place_tile(cell, faces);
                out_events.push(Event::TilePlaced { tile, cell, faces });
                self.finish_turn(out_events);
                true
            }
            Command::MoveTile { cell } => {
                let Some(tile) = self.game.selected_tile else {
                    return false;
                };
                if state != InteractionState::TileToMoveSelected
                    || !self.board.tile_destination_is_legal(tile, cell)
                {
                    return false;
                }
                let Some(from) = self.board.tiles().cell_of(tile) else {
                    return false;
                };
                let riders = self.board.move_tile(tile, cell);
                out_events.push(Event::TileMoved {
                    tile,
                    from,
                    to: cell,
                });
                if let Some(dragon) = riders.dragon {
                    out_events.push(Event::DragonMoved {
                        dragon,
                        from,
                        to: cell,
                    });
                }
                if let Some(wizard) = riders.wizard {
                    out_events.push(Event::WizardMoved {
                        wizard,
                        from,
                        to: cell,
                    });
                }
                self.finish_turn(out_events);
                true
            }
            Command::MoveDragon { cell } => {
                let Some(PieceId::Dragon(dragon)) = self.game.selected_piece else {
                    return false;
                };
                if state != InteractionState::DragonToMoveSelected
                    || !self.board.dragon_destination_is_legal(dragon, cell)
                {
                    return false;
                }
                let Some(from) = self.board.dragons().cell_of(dragon) else {
                    return false;
                };
                self.board.move_dragon(dragon, cell);
                out_events.push(Event::DragonMoved {
                    dragon,
                    from,
                    to: cell,
                });
                self.finish_turn(out_events);
                true
            }
            Command::MoveWizard { cell } => {
                let Some(PieceId::Wizard(wizard)) = self.game.selected_piece else {
                    return false;
                };
                if state != InteractionState::WizardToMoveSelected
                    || !self.board.wizard_destination_is_legal(wizard, cell)
                {
                    return false;
                }
                let Some(from) = self.board.wizards().cell_of(wizard) else {
                    return false;
                };
                self.board.move_wizard(wizard, cell);
                out_events.push(Event::WizardMoved {
                    wizard,
                    from,
                    to: cell,
                });
                self.finish_turn(out_events);
                true
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands whose guard fails leave the world untouched and are reported with
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::PassTime { dt } = command {
        world.elapsed = world.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });
    }

    let operation = command.operation();
    if world.resolve(command, out_events) {
        debug!(%operation, state = ?world.game.state, "resolved command");
    } else {
        trace!(%operation, state = ?world.game.state, "dropped illegal command");
        out_events.push(Event::CommandRejected {
            operation,
            state: world.game.state,
        });
    }
}

/// Resolves collisions and checks for a winner.
///
/// Must run after every command of the tick has been applied. Wizards that
/// share a cell with a dragon are removed; when a team that started with
/// wizards has none left the world enters [`InteractionState::GameOver`].
pub fn settle(world: &mut World, out_events: &mut Vec<Event>) {
    if world.game.state == InteractionState::GameOver {
        return;
    }

    for (wizard, entry) in world.board.capture_wizards() {
        info!(cell = %entry.cell, team_index = entry.payload.team_index, "wizard captured");
        out_events.push(Event::WizardCaptured {
            wizard,
            cell: entry.cell,
            team_index: entry.payload.team_index,
        });
    }

    let census = world.board.team_census();
    if census.has_eliminated_side(&world.starting_census) {
        let winner = census.sole_survivor();
        world.clear_selection();
        world.enter(InteractionState::GameOver, out_events);
        info!(?winner, "game over");
        out_events.push(Event::GameOver { winner });
    }
}

/// Applies a tick's commands in order and settles the board afterwards.
pub fn resolve_tick<I>(world: &mut World, commands: I, out_events: &mut Vec<Event>)
where
    I: IntoIterator<Item = Command>,
{
    for command in commands {
        apply(world, command, out_events);
    }
    settle(world, out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dragon_tiles_core::GameState;

    use super::{Board, World};

    /// Provides read-only access to the board layers.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Provides the turn and selection bookkeeping.
    #[must_use]
    pub fn game_state(world: &World) -> &GameState {
        &world.game
    }

    /// Total simulated time accumulated from `PassTime` commands.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}
