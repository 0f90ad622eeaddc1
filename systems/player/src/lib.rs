#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure player system that turns captured input into turn commands.

use std::time::Duration;

use dragon_tiles_core::{Cell, Command, GameState, InteractionState, PieceId};
use dragon_tiles_world::Board;
use glam::Vec3;

const PARALLEL_EPSILON: f32 = 1e-6;

/// Pointer ray expressed in world space, already unprojected by the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerRay {
    /// Point the ray starts from.
    pub origin: Vec3,
    /// Direction the ray travels in. Does not need to be normalised.
    pub direction: Vec3,
}

impl PointerRay {
    /// Creates a new pointer ray.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray looking straight down onto the board point `(x, z)`.
    #[must_use]
    pub fn looking_down_at(x: f32, z: f32) -> Self {
        Self {
            origin: Vec3::new(x, 10.0, z),
            direction: Vec3::NEG_Y,
        }
    }

    /// Point where the ray meets the board plane `y = 0`, if it does.
    #[must_use]
    pub fn board_hit(&self) -> Option<Vec3> {
        if self.direction.y.abs() < PARALLEL_EPSILON {
            return None;
        }

        let distance = -self.origin.y / self.direction.y;
        if distance < 0.0 {
            return None;
        }
        Some(self.origin + self.direction * distance)
    }

    /// Board cell under the pointer, if the ray meets the board plane.
    #[must_use]
    pub fn picked_cell(&self) -> Option<Cell> {
        self.board_hit()
            .map(|hit| Cell::from_world_position(hit.x, hit.z))
    }
}

/// Key-down flags for the five mode-entry commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandKeys {
    /// Enter tile rotation.
    pub rotate_tile: bool,
    /// Enter tile movement.
    pub move_tile: bool,
    /// Enter tile placement.
    pub place_tile: bool,
    /// Enter wizard movement.
    pub move_wizard: bool,
    /// Enter dragon movement.
    pub move_dragon: bool,
}

impl CommandKeys {
    /// Mode-entry command of the highest-priority pressed key.
    ///
    /// Priority: rotate, move tile, place tile, move wizard, move dragon.
    #[must_use]
    pub const fn first_pressed(&self) -> Option<Command> {
        if self.rotate_tile {
            Some(Command::BeginRotateTile)
        } else if self.move_tile {
            Some(Command::BeginMoveTile)
        } else if self.place_tile {
            Some(Command::BeginPlaceTile)
        } else if self.move_wizard {
            Some(Command::BeginMoveWizard)
        } else if self.move_dragon {
            Some(Command::BeginMoveDragon)
        } else {
            None
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Pointer ray for this frame, when the pointer is over the view.
    pub pointer: Option<PointerRay>,
    /// Whether the primary pointer button went down on this frame.
    pub pointer_down: bool,
    /// Key-down flags for this frame.
    pub keys: CommandKeys,
    /// Time elapsed since the previous frame.
    pub dt: Duration,
    /// Absolute time of the frame.
    pub time: Duration,
}

impl InputSnapshot {
    /// Snapshot with a single click on the board point `(x, z)`.
    #[must_use]
    pub fn click_at(x: f32, z: f32) -> Self {
        Self {
            pointer: Some(PointerRay::looking_down_at(x, z)),
            pointer_down: true,
            ..Self::default()
        }
    }

    /// Snapshot with the given keys pressed.
    #[must_use]
    pub fn with_keys(keys: CommandKeys) -> Self {
        Self {
            keys,
            ..Self::default()
        }
    }

    fn clicked_cell(&self) -> Option<Cell> {
        if !self.pointer_down {
            return None;
        }
        self.pointer.and_then(|pointer| pointer.picked_cell())
    }
}

/// Player system that translates input snapshots into at most one command.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerController;

impl PlayerController {
    /// Creates a new player controller.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Interprets `input` against the current state and pushes zero or one command.
    ///
    /// Picks are checked against the same legality rules the world applies,
    /// so an accepted click always resolves.
    pub fn handle(
        &self,
        input: &InputSnapshot,
        board: &Board,
        game: &GameState,
        out: &mut Vec<Command>,
    ) {
        match game.state {
            InteractionState::GameOver => {}
            InteractionState::Base => {
                if let Some(command) = input.keys.first_pressed() {
                    out.push(command);
                }
            }
            _ => {
                let picked = input
                    .clicked_cell()
                    .and_then(|cell| pick(cell, board, game));
                if let Some(command) = picked.or_else(|| input.keys.first_pressed()) {
                    out.push(command);
                }
            }
        }
    }
}

fn pick(cell: Cell, board: &Board, game: &GameState) -> Option<Command> {
    match game.state {
        InteractionState::RotateTile => board
            .tiles()
            .index_of_cell(cell)
            .map(|tile| Command::RotateTile { tile }),
        InteractionState::PlaceTile => {
            if !board.is_empty_playable_position(cell) {
                return None;
            }
            board
                .playable_positions()
                .index_of_cell(cell)
                .map(|position| Command::PlaceTile { position })
        }
        InteractionState::MoveTile => board
            .tiles()
            .index_of_cell(cell)
            .filter(|tile| board.tile_has_legal_move(*tile))
            .map(|tile| Command::SelectTile { tile }),
        InteractionState::MoveDragon => board
            .dragons()
            .index_of_cell(cell)
            .filter(|dragon| board.dragon_has_legal_move(*dragon))
            .map(|dragon| Command::SelectDragon { dragon }),
        InteractionState::MoveWizard => board
            .wizards()
            .index_of_cell(cell)
            .filter(|wizard| board.wizard_has_legal_move(*wizard))
            .map(|wizard| Command::SelectWizard { wizard }),
        InteractionState::TileToMoveSelected => game
            .selected_tile
            .filter(|tile| board.tile_destination_is_legal(*tile, cell))
            .map(|_| Command::MoveTile { cell }),
        InteractionState::DragonToMoveSelected => match game.selected_piece {
            Some(PieceId::Dragon(dragon)) if board.dragon_destination_is_legal(dragon, cell) => {
                Some(Command::MoveDragon { cell })
            }
            _ => None,
        },
        InteractionState::WizardToMoveSelected => match game.selected_piece {
            Some(PieceId::Wizard(wizard)) if board.wizard_destination_is_legal(wizard, cell) => {
                Some(Command::MoveWizard { cell })
            }
            _ => None,
        },
        InteractionState::Base | InteractionState::GameOver => None,
    }
}
