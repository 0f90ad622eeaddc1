use std::time::Duration;

use dragon_tiles_core::{
    BoardLayout, Cell, Command, Direction, Event, InteractionState, Team, TileLayout,
    WizardLayout,
};
use dragon_tiles_world::{self as world, query, World};

fn tile_at(x: i32, z: i32) -> TileLayout {
    TileLayout {
        cell: Cell::new(x, z),
        faces: None,
        rotation: Direction::North,
    }
}

fn wizard_at(x: i32, z: i32, team_index: u32) -> WizardLayout {
    WizardLayout {
        cell: Cell::new(x, z),
        team_index,
    }
}

/// Two rows of three positions; the top row is partly empty.
fn arena() -> World {
    let layout = BoardLayout {
        playable_positions: (0..2)
            .flat_map(|z| (0..3).map(move |x| Cell::new(x, z)))
            .collect(),
        tiles: vec![tile_at(0, 0), tile_at(1, 0), tile_at(2, 0), tile_at(0, 1)],
        dragons: vec![Cell::new(2, 0)],
        wizards: vec![wizard_at(0, 0, 0), wizard_at(1, 0, 1), wizard_at(0, 1, 3)],
    };
    World::new(&layout, 0x5eed).expect("arena layout is valid")
}

fn run(world: &mut World, commands: &[Command]) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, *command, &mut events);
    }
    events
}

fn tick(world: &mut World, commands: &[Command]) -> Vec<Event> {
    let mut events = Vec::new();
    world::resolve_tick(world, commands.iter().copied(), &mut events);
    events
}

fn rejected(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::CommandRejected { .. }))
        .count()
}

#[test]
fn placing_on_the_only_position_plays_through_full_ticks() {
    let layout = BoardLayout {
        playable_positions: vec![Cell::new(0, 0)],
        ..BoardLayout::default()
    };
    let mut world = World::new(&layout, 42).expect("layout");
    let position = query::board(&world)
        .playable_positions()
        .index_of_cell(Cell::new(0, 0))
        .expect("position");

    let _ = tick(&mut world, &[Command::BeginPlaceTile]);
    assert_eq!(query::game_state(&world).state, InteractionState::PlaceTile);

    let events = tick(&mut world, &[Command::PlaceTile { position }]);

    let board = query::board(&world);
    assert_eq!(board.tiles().len(), 1);
    let (tile, entry) = board.tiles().iter().next().expect("placed tile");
    assert_eq!(entry.cell, Cell::new(0, 0));
    assert_eq!(entry.payload.rotation, Direction::North);
    assert!(events.contains(&Event::TilePlaced {
        tile,
        cell: Cell::new(0, 0),
        faces: entry.payload.faces,
    }));

    let game = query::game_state(&world);
    assert_eq!(game.state, InteractionState::Base);
    assert!(!game.is_player_turn, "placing a tile hands the turn over");

    let mut twin = World::new(&layout, 42).expect("layout");
    let _ = tick(
        &mut twin,
        &[Command::BeginPlaceTile, Command::PlaceTile { position }],
    );
    let twin_faces = query::board(&twin)
        .tiles()
        .iter()
        .next()
        .map(|(_, entry)| entry.payload.faces);
    assert_eq!(twin_faces, Some(entry.payload.faces), "faces follow the seed");
}

#[test]
fn four_rotations_restore_the_original_rotation() {
    let mut world = arena();
    let tile = query::board(&world)
        .tiles()
        .index_of_cell(Cell::new(1, 0))
        .expect("tile");

    let mut seen = Vec::new();
    for _ in 0..4 {
        let _ = run(
            &mut world,
            &[Command::BeginRotateTile, Command::RotateTile { tile }],
        );
        let rotation = query::board(&world)
            .tiles()
            .get(tile)
            .map(|entry| entry.payload.rotation);
        seen.push(rotation.expect("tile survives rotation"));
    }

    assert_eq!(
        seen,
        vec![
            Direction::East,
            Direction::South,
            Direction::West,
            Direction::North
        ]
    );
    assert!(query::game_state(&world).is_player_turn, "four flips");
}

#[test]
fn placing_then_moving_relocates_exactly_one_tile() {
    let layout = BoardLayout {
        playable_positions: vec![Cell::new(0, 0), Cell::new(1, 0)],
        ..BoardLayout::default()
    };
    let mut world = World::new(&layout, 3).expect("layout");
    let position = query::board(&world)
        .playable_positions()
        .index_of_cell(Cell::new(0, 0))
        .expect("position");

    let _ = run(
        &mut world,
        &[Command::BeginPlaceTile, Command::PlaceTile { position }],
    );
    let tile = query::board(&world)
        .tiles()
        .index_of_cell(Cell::new(0, 0))
        .expect("placed tile");

    let events = run(
        &mut world,
        &[
            Command::BeginMoveTile,
            Command::SelectTile { tile },
            Command::MoveTile {
                cell: Cell::new(1, 0),
            },
        ],
    );

    assert_eq!(rejected(&events), 0);
    let board = query::board(&world);
    assert_eq!(board.tiles().len(), 1);
    assert_eq!(board.tiles().cell_of(tile), Some(Cell::new(1, 0)));
    let moves = events
        .iter()
        .filter(|event| matches!(event, Event::TileMoved { .. }))
        .count();
    assert_eq!(moves, 1);
}

#[test]
fn moving_a_tile_carries_the_wizard_standing_on_it() {
    let mut world = arena();
    let board = query::board(&world);
    let tile = board.tiles().index_of_cell(Cell::new(0, 1)).expect("tile");
    let wizard = board.wizards().index_of_cell(Cell::new(0, 1)).expect("wizard");

    let events = tick(
        &mut world,
        &[
            Command::BeginMoveTile,
            Command::SelectTile { tile },
            Command::MoveTile {
                cell: Cell::new(1, 1),
            },
        ],
    );

    let board = query::board(&world);
    assert_eq!(board.wizards().cell_of(wizard), Some(Cell::new(1, 1)));
    assert!(!board.wizards().has_cell(Cell::new(0, 1)));
    assert!(events.contains(&Event::WizardMoved {
        wizard,
        from: Cell::new(0, 1),
        to: Cell::new(1, 1),
    }));
}

#[test]
fn dragon_landing_on_a_wizard_captures_it() {
    let mut world = arena();
    let board = query::board(&world);
    let dragon = board.dragons().index_of_cell(Cell::new(2, 0)).expect("dragon");
    let victim = board.wizards().index_of_cell(Cell::new(1, 0)).expect("wizard");
    let before = board.wizards().len();

    let events = tick(
        &mut world,
        &[
            Command::BeginMoveDragon,
            Command::SelectDragon { dragon },
            Command::MoveDragon {
                cell: Cell::new(1, 0),
            },
        ],
    );

    let board = query::board(&world);
    assert_eq!(board.wizards().len(), before - 1);
    assert!(!board.wizards().contains(victim));
    assert_eq!(board.dragons().cell_of(dragon), Some(Cell::new(1, 0)));
    assert!(events.contains(&Event::WizardCaptured {
        wizard: victim,
        cell: Cell::new(1, 0),
        team_index: 1,
    }));
    assert_eq!(
        query::game_state(&world).state,
        InteractionState::Base,
        "team 3 still has a wizard"
    );
}

#[test]
fn wiping_out_the_even_team_ends_the_game() {
    let layout = BoardLayout {
        playable_positions: (0..3).map(|x| Cell::new(x, 0)).collect(),
        tiles: vec![tile_at(0, 0), tile_at(1, 0), tile_at(2, 0)],
        dragons: vec![Cell::new(1, 0)],
        wizards: vec![wizard_at(0, 0, 0), wizard_at(2, 0, 1)],
    };
    let mut world = World::new(&layout, 9).expect("layout");
    let dragon = query::board(&world)
        .dragons()
        .index_of_cell(Cell::new(1, 0))
        .expect("dragon");

    let events = tick(
        &mut world,
        &[
            Command::BeginMoveDragon,
            Command::SelectDragon { dragon },
            Command::MoveDragon {
                cell: Cell::new(0, 0),
            },
        ],
    );

    assert_eq!(query::game_state(&world).state, InteractionState::GameOver);
    assert!(events.contains(&Event::GameOver {
        winner: Some(Team::Odd)
    }));

    let events = tick(
        &mut world,
        &[
            Command::PassTime {
                dt: Duration::from_millis(16),
            },
            Command::BeginRotateTile,
        ],
    );
    assert_eq!(rejected(&events), 1, "only PassTime survives game over");
    assert_eq!(query::game_state(&world).state, InteractionState::GameOver);
}

#[test]
fn illegal_commands_leave_the_world_untouched() {
    let mut world = arena();
    let board = query::board(&world);
    let middle_tile = board.tiles().index_of_cell(Cell::new(1, 0)).expect("tile");
    let wizard = board.wizards().index_of_cell(Cell::new(0, 0)).expect("wizard");
    let before = *query::game_state(&world);

    let events = run(
        &mut world,
        &[
            Command::MoveTile {
                cell: Cell::new(1, 1),
            },
            Command::SelectWizard { wizard },
        ],
    );
    assert_eq!(rejected(&events), 2);
    assert_eq!(*query::game_state(&world), before);

    let events = run(
        &mut world,
        &[
            Command::BeginMoveTile,
            Command::SelectTile { tile: middle_tile },
        ],
    );
    assert_eq!(rejected(&events), 0, "(1,1) is free above the tile");

    let events = run(
        &mut world,
        &[Command::MoveTile {
            cell: Cell::new(2, 1),
        }],
    );
    assert_eq!(rejected(&events), 1, "diagonal destination");
    assert_eq!(
        query::game_state(&world).state,
        InteractionState::TileToMoveSelected
    );
}

#[test]
fn wizards_cannot_step_onto_dragons() {
    let layout = BoardLayout {
        playable_positions: (0..2).map(|x| Cell::new(x, 0)).collect(),
        tiles: vec![tile_at(0, 0), tile_at(1, 0)],
        dragons: vec![Cell::new(1, 0)],
        wizards: vec![wizard_at(0, 0, 0), wizard_at(0, 0, 1)],
    };
    assert!(World::new(&layout, 1).is_err(), "two wizards on one cell");

    let layout = BoardLayout {
        wizards: vec![wizard_at(0, 0, 0)],
        ..layout
    };
    let mut world = World::new(&layout, 1).expect("layout");
    let wizard = query::board(&world)
        .wizards()
        .index_of_cell(Cell::new(0, 0))
        .expect("wizard");

    let events = run(
        &mut world,
        &[Command::BeginMoveWizard, Command::SelectWizard { wizard }],
    );
    assert_eq!(rejected(&events), 1);
    assert_eq!(query::game_state(&world).state, InteractionState::MoveWizard);
}

#[test]
fn begin_commands_switch_modes_and_clear_selection() {
    let mut world = arena();
    let dragon = query::board(&world)
        .dragons()
        .index_of_cell(Cell::new(2, 0))
        .expect("dragon");

    let _ = run(
        &mut world,
        &[Command::BeginMoveDragon, Command::SelectDragon { dragon }],
    );
    assert!(query::game_state(&world).selected_piece.is_some());

    let events = run(&mut world, &[Command::BeginPlaceTile]);
    let game = query::game_state(&world);
    assert_eq!(game.state, InteractionState::PlaceTile);
    assert_eq!(game.selected_piece, None);
    assert!(game.is_player_turn, "mode changes never pass the turn");
    assert_eq!(
        events,
        vec![Event::StateChanged {
            from: InteractionState::DragonToMoveSelected,
            to: InteractionState::PlaceTile,
        }]
    );
}

#[test]
fn settle_runs_after_every_command_of_the_tick() {
    let mut world = arena();
    let board = query::board(&world);
    let dragon = board.dragons().index_of_cell(Cell::new(2, 0)).expect("dragon");
    let tile = board.tiles().index_of_cell(Cell::new(1, 0)).expect("tile");

    let events = tick(
        &mut world,
        &[
            Command::BeginMoveDragon,
            Command::SelectDragon { dragon },
            Command::MoveDragon {
                cell: Cell::new(1, 0),
            },
            Command::BeginRotateTile,
            Command::RotateTile { tile },
        ],
    );

    let capture = events
        .iter()
        .position(|event| matches!(event, Event::WizardCaptured { .. }))
        .expect("capture reported");
    let rotation = events
        .iter()
        .position(|event| matches!(event, Event::TileRotated { .. }))
        .expect("rotation reported");
    assert!(rotation < capture);
}
