#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dragon Tiles engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure controller systems. Controllers submit
//! [`Command`] values describing desired moves, the world resolves those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what actually changed. Controllers read immutable board views
//! and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Integer board coordinate on the x/z plane.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    x: i32,
    z: i32,
}

impl Cell {
    /// Creates a new board cell.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Column of the cell along the world x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell along the world z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Snaps a point on the board plane to the nearest cell.
    ///
    /// Each axis is rounded independently, halves rounding to the even integer.
    #[must_use]
    pub fn from_world_position(x: f32, z: f32) -> Self {
        Self {
            x: x.round_ties_even() as i32,
            z: z.round_ties_even() as i32,
        }
    }

    /// Centre of the cell expressed as world `(x, z)` coordinates.
    #[must_use]
    pub fn to_world_position(self) -> (f32, f32) {
        (self.x as f32, self.z as f32)
    }

    /// Computes the Manhattan distance between two cells.
    ///
    /// Widened to `u64` so that cells at opposite ends of the `i32` range
    /// cannot overflow.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u64 {
        u64::from(self.x.abs_diff(other.x)) + u64::from(self.z.abs_diff(other.z))
    }

    /// Reports whether `other` is one of the four cardinal neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the neighbouring cell one step toward `direction`.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Cell {
        let (dx, dz) = direction.offset();
        Cell::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Cardinal directions; doubles as the discrete rotation of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing z.
    #[default]
    North,
    /// Toward increasing x.
    East,
    /// Toward decreasing z.
    South,
    /// Toward decreasing x.
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Number of clockwise quarter turns separating north from this direction.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Direction reached after `turns` clockwise quarter turns from north.
    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Direction after a single clockwise quarter turn.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        self.rotated_clockwise(1)
    }

    /// Direction after `steps` clockwise quarter turns.
    #[must_use]
    pub const fn rotated_clockwise(self, steps: u8) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + steps % 4)
    }

    /// Direction after `steps` counter-clockwise quarter turns.
    #[must_use]
    pub const fn rotated_counter_clockwise(self, steps: u8) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + 4 - steps % 4)
    }

    const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }
}

/// Elemental affinity painted on one side of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Earth wedge.
    Earth,
    /// Fire wedge.
    Fire,
    /// Air wedge.
    Air,
    /// Water wedge.
    Water,
}

impl Element {
    /// Every element, in declaration order.
    pub const ALL: [Element; 4] = [Element::Earth, Element::Fire, Element::Air, Element::Water];
}

/// Elements painted on each side of an unrotated tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFaces {
    /// Element on the side facing north at rotation [`Direction::North`].
    pub north: Element,
    /// Element on the side facing east at rotation [`Direction::North`].
    pub east: Element,
    /// Element on the side facing south at rotation [`Direction::North`].
    pub south: Element,
    /// Element on the side facing west at rotation [`Direction::North`].
    pub west: Element,
}

impl TileFaces {
    /// Creates faces from explicit north, east, south and west elements.
    #[must_use]
    pub const fn new(north: Element, east: Element, south: Element, west: Element) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    /// Element painted on the given side of the unrotated tile.
    #[must_use]
    pub const fn side(&self, side: Direction) -> Element {
        match side {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }
}

/// Payload stored for each tile on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileState {
    /// Current rotation; every rotation step turns the tile a quarter clockwise.
    pub rotation: Direction,
    /// Elements assigned at creation. Never change afterwards.
    pub faces: TileFaces,
}

impl TileState {
    /// Creates an unrotated tile with the provided faces.
    #[must_use]
    pub const fn new(faces: TileFaces) -> Self {
        Self {
            rotation: Direction::North,
            faces,
        }
    }

    /// Element currently facing `direction` once rotation is taken into account.
    #[must_use]
    pub const fn facing(&self, direction: Direction) -> Element {
        let side = direction.rotated_counter_clockwise(self.rotation.quarter_turns());
        self.faces.side(side)
    }
}

/// Payload stored for each wizard on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WizardState {
    /// Team index authored for the wizard. Only its parity decides allegiance.
    pub team_index: u32,
}

impl WizardState {
    /// Side the wizard fights for.
    #[must_use]
    pub const fn team(&self) -> Team {
        Team::of(self.team_index)
    }
}

/// Allegiance derived from the parity of a wizard's team index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Wizards with an even team index.
    Even,
    /// Wizards with an odd team index.
    Odd,
}

impl Team {
    /// Resolves the team for a raw team index.
    #[must_use]
    pub const fn of(team_index: u32) -> Self {
        if team_index % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }
}

/// Position inside a layer arena paired with its reuse generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    index: u32,
    generation: u32,
}

impl Slot {
    /// Creates a slot reference.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena index of the slot.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Number of times the slot was vacated before this reference was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Typed handle that can be stored in and resolved against a layer arena.
pub trait LayerKey: Copy + Eq + fmt::Debug {
    /// Wraps a raw slot into the typed handle.
    fn from_slot(slot: Slot) -> Self;

    /// Unwraps the raw slot behind the handle.
    fn slot(self) -> Slot;
}

macro_rules! layer_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Slot);

        impl $name {
            /// Creates a handle from a raw slot.
            #[must_use]
            pub const fn new(slot: Slot) -> Self {
                Self(slot)
            }

            /// Retrieves the raw slot behind the handle.
            #[must_use]
            pub const fn get(&self) -> Slot {
                self.0
            }
        }

        impl LayerKey for $name {
            fn from_slot(slot: Slot) -> Self {
                Self(slot)
            }

            fn slot(self) -> Slot {
                self.0
            }
        }
    };
}

layer_key!(
    /// Stable identifier of a playable position.
    PositionId
);
layer_key!(
    /// Stable identifier of a tile.
    TileId
);
layer_key!(
    /// Stable identifier of a dragon.
    DragonId
);
layer_key!(
    /// Stable identifier of a wizard. Becomes stale once the wizard is captured.
    WizardId
);

/// Piece remembered while waiting for a movement destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceId {
    /// A selected dragon.
    Dragon(DragonId),
    /// A selected wizard.
    Wizard(WizardId),
}

/// Interaction phases of the turn state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InteractionState {
    /// Waiting for the active side to choose what to do.
    #[default]
    Base,
    /// Waiting for a tile to rotate.
    RotateTile,
    /// Waiting for a tile to pick up.
    MoveTile,
    /// Waiting for an empty playable position to receive a new tile.
    PlaceTile,
    /// Waiting for a wizard to pick up.
    MoveWizard,
    /// Waiting for a dragon to pick up.
    MoveDragon,
    /// A tile is selected and waits for its destination.
    TileToMoveSelected,
    /// A dragon is selected and waits for its destination.
    DragonToMoveSelected,
    /// A wizard is selected and waits for its destination.
    WizardToMoveSelected,
    /// One side lost every wizard; nothing else resolves.
    GameOver,
}

impl InteractionState {
    /// Reports whether the state waits for a board pick.
    #[must_use]
    pub const fn is_picking(self) -> bool {
        !matches!(self, Self::Base | Self::GameOver)
    }
}

/// Turn and selection bookkeeping owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    /// Active interaction phase.
    pub state: InteractionState,
    /// Tile chosen in [`InteractionState::MoveTile`].
    pub selected_tile: Option<TileId>,
    /// Piece chosen in [`InteractionState::MoveDragon`] or [`InteractionState::MoveWizard`].
    pub selected_piece: Option<PieceId>,
    /// Whether the human player owns the current turn.
    pub is_player_turn: bool,
}

impl GameState {
    /// Initial state: base phase with the player to move.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: InteractionState::Base,
            selected_tile: None,
            selected_piece: None,
            is_player_turn: true,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload-free tag naming every command in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// See [`Command::BeginRotateTile`].
    BeginRotateTile,
    /// See [`Command::BeginMoveTile`].
    BeginMoveTile,
    /// See [`Command::BeginPlaceTile`].
    BeginPlaceTile,
    /// See [`Command::BeginMoveWizard`].
    BeginMoveWizard,
    /// See [`Command::BeginMoveDragon`].
    BeginMoveDragon,
    /// See [`Command::SelectTile`].
    SelectTile,
    /// See [`Command::SelectDragon`].
    SelectDragon,
    /// See [`Command::SelectWizard`].
    SelectWizard,
    /// See [`Command::RotateTile`].
    RotateTile,
    /// See [`Command::PlaceTile`].
    PlaceTile,
    /// See [`Command::MoveTile`].
    MoveTile,
    /// See [`Command::MoveDragon`].
    MoveDragon,
    /// See [`Command::MoveWizard`].
    MoveWizard,
    /// See [`Command::PassTime`].
    PassTime,
}

impl Operation {
    /// Stable name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeginRotateTile => "BeginRotateTile",
            Self::BeginMoveTile => "BeginMoveTile",
            Self::BeginPlaceTile => "BeginPlaceTile",
            Self::BeginMoveWizard => "BeginMoveWizard",
            Self::BeginMoveDragon => "BeginMoveDragon",
            Self::SelectTile => "SelectTile",
            Self::SelectDragon => "SelectDragon",
            Self::SelectWizard => "SelectWizard",
            Self::RotateTile => "RotateTile",
            Self::PlaceTile => "PlaceTile",
            Self::MoveTile => "MoveTile",
            Self::MoveDragon => "MoveDragon",
            Self::MoveWizard => "MoveWizard",
            Self::PassTime => "PassTime",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Enters [`InteractionState::RotateTile`].
    BeginRotateTile,
    /// Enters [`InteractionState::MoveTile`].
    BeginMoveTile,
    /// Enters [`InteractionState::PlaceTile`] when an empty playable position exists.
    BeginPlaceTile,
    /// Enters [`InteractionState::MoveWizard`].
    BeginMoveWizard,
    /// Enters [`InteractionState::MoveDragon`].
    BeginMoveDragon,
    /// Picks up a tile that has at least one legal destination.
    SelectTile {
        /// Tile to pick up.
        tile: TileId,
    },
    /// Picks up a dragon that has at least one legal destination.
    SelectDragon {
        /// Dragon to pick up.
        dragon: DragonId,
    },
    /// Picks up a wizard that has at least one legal destination.
    SelectWizard {
        /// Wizard to pick up.
        wizard: WizardId,
    },
    /// Turns a tile a quarter clockwise.
    RotateTile {
        /// Tile to rotate.
        tile: TileId,
    },
    /// Creates a tile with random faces on an empty playable position.
    PlaceTile {
        /// Playable position receiving the tile.
        position: PositionId,
    },
    /// Slides the selected tile, and everything standing on it, to `cell`.
    MoveTile {
        /// Destination cell.
        cell: Cell,
    },
    /// Moves the selected dragon to `cell`.
    MoveDragon {
        /// Destination cell.
        cell: Cell,
    },
    /// Moves the selected wizard to `cell`.
    MoveWizard {
        /// Destination cell.
        cell: Cell,
    },
    /// Advances the world clock without touching the board.
    PassTime {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
}

impl Command {
    /// Payload-free tag of the command.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::BeginRotateTile => Operation::BeginRotateTile,
            Self::BeginMoveTile => Operation::BeginMoveTile,
            Self::BeginPlaceTile => Operation::BeginPlaceTile,
            Self::BeginMoveWizard => Operation::BeginMoveWizard,
            Self::BeginMoveDragon => Operation::BeginMoveDragon,
            Self::SelectTile { .. } => Operation::SelectTile,
            Self::SelectDragon { .. } => Operation::SelectDragon,
            Self::SelectWizard { .. } => Operation::SelectWizard,
            Self::RotateTile { .. } => Operation::RotateTile,
            Self::PlaceTile { .. } => Operation::PlaceTile,
            Self::MoveTile { .. } => Operation::MoveTile,
            Self::MoveDragon { .. } => Operation::MoveDragon,
            Self::MoveWizard { .. } => Operation::MoveWizard,
            Self::PassTime { .. } => Operation::PassTime,
        }
    }

    /// Interaction state entered by a mode-entry command.
    #[must_use]
    pub const fn mode(&self) -> Option<InteractionState> {
        match self {
            Self::BeginRotateTile => Some(InteractionState::RotateTile),
            Self::BeginMoveTile => Some(InteractionState::MoveTile),
            Self::BeginPlaceTile => Some(InteractionState::PlaceTile),
            Self::BeginMoveWizard => Some(InteractionState::MoveWizard),
            Self::BeginMoveDragon => Some(InteractionState::MoveDragon),
            _ => None,
        }
    }
}

/// Events reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the world clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces a transition of the interaction state machine.
    StateChanged {
        /// State before the transition.
        from: InteractionState,
        /// State after the transition.
        to: InteractionState,
    },
    /// Confirms that a tile turned a quarter clockwise.
    TileRotated {
        /// Rotated tile.
        tile: TileId,
        /// Rotation after the turn.
        rotation: Direction,
    },
    /// Confirms that a new tile was placed.
    TilePlaced {
        /// Identifier assigned to the new tile.
        tile: TileId,
        /// Cell the tile occupies.
        cell: Cell,
        /// Randomly assigned faces.
        faces: TileFaces,
    },
    /// Confirms that a tile slid to a neighbouring position.
    TileMoved {
        /// Moved tile.
        tile: TileId,
        /// Cell the tile occupied before moving.
        from: Cell,
        /// Cell the tile occupies after moving.
        to: Cell,
    },
    /// Confirms that a dragon moved, on its own or riding a tile.
    DragonMoved {
        /// Moved dragon.
        dragon: DragonId,
        /// Cell the dragon occupied before moving.
        from: Cell,
        /// Cell the dragon occupies after moving.
        to: Cell,
    },
    /// Confirms that a wizard moved, on its own or riding a tile.
    WizardMoved {
        /// Moved wizard.
        wizard: WizardId,
        /// Cell the wizard occupied before moving.
        from: Cell,
        /// Cell the wizard occupies after moving.
        to: Cell,
    },
    /// Reports that a wizard shared a cell with a dragon and was removed.
    WizardCaptured {
        /// Identifier of the removed wizard; stale from now on.
        wizard: WizardId,
        /// Cell of the capture.
        cell: Cell,
        /// Team index of the removed wizard.
        team_index: u32,
    },
    /// Reports that turn ownership flipped.
    TurnPassed {
        /// Whether the player owns the new turn.
        is_player_turn: bool,
    },
    /// Reports that one side ran out of wizards.
    GameOver {
        /// Side with surviving wizards, `None` when both sides were wiped out.
        winner: Option<Team>,
    },
    /// Reports that a command failed its guard and was dropped.
    CommandRejected {
        /// Operation of the dropped command.
        operation: Operation,
        /// State in which the command was rejected.
        state: InteractionState,
    },
}

/// Static setup data used to populate a board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Cells that may receive tiles.
    #[serde(default)]
    pub playable_positions: Vec<Cell>,
    /// Tiles present before the first turn.
    #[serde(default)]
    pub tiles: Vec<TileLayout>,
    /// Dragon start cells.
    #[serde(default)]
    pub dragons: Vec<Cell>,
    /// Wizard start cells with their teams.
    #[serde(default)]
    pub wizards: Vec<WizardLayout>,
}

/// Authored tile in a [`BoardLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    /// Cell the tile occupies.
    pub cell: Cell,
    /// Authored faces; random faces are drawn when absent.
    #[serde(default)]
    pub faces: Option<TileFaces>,
    /// Starting rotation.
    #[serde(default)]
    pub rotation: Direction,
}

/// Authored wizard in a [`BoardLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardLayout {
    /// Cell the wizard starts on.
    pub cell: Cell,
    /// Team index of the wizard.
    pub team_index: u32,
}
