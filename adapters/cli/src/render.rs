//! Plain-text board presentation.
//!
//! North (+z) is drawn at the top. Tiles are bracketed, a dragon is `D`, a
//! wizard shows the last digit of its team index, and the selected tile or
//! piece uses angle brackets.

use dragon_tiles_core::{Cell, Direction, GameState, PieceId};
use dragon_tiles_world::Board;

/// Renders the board and the interaction state as a block of text.
pub(crate) fn render(board: &Board, game: &GameState) -> String {
    let turn = if game.is_player_turn { "player" } else { "ai" };
    let mut out = format!("state: {:?} | turn: {turn}\n", game.state);

    let Some((min, max)) = bounds(board) else {
        out.push_str("(no playable positions)\n");
        return out;
    };

    out.push_str("   ");
    for x in min.x()..=max.x() {
        out.push_str(&format!("{x:^3}"));
    }
    out.push('\n');

    let selected = selected_cell(board, game);
    for z in (min.z()..=max.z()).rev() {
        out.push_str(&format!("{z:>2} "));
        for x in min.x()..=max.x() {
            out.push_str(&glyph(board, Cell::new(x, z), selected));
        }
        out.push('\n');
    }

    if let Some(tile) = game.selected_tile {
        if let Some(elements) = board.elements_facing(tile) {
            let faces: Vec<String> = Direction::ALL
                .iter()
                .zip(elements)
                .map(|(direction, element)| format!("{direction:?}: {element:?}"))
                .collect();
            out.push_str(&format!("selected tile faces {}\n", faces.join(", ")));
        }
    }
    out
}

fn bounds(board: &Board) -> Option<(Cell, Cell)> {
    let mut cells = board.playable_positions().cells();
    let first = cells.next()?;
    let (min, max) = cells.fold((first, first), |(min, max), cell| {
        (
            Cell::new(min.x().min(cell.x()), min.z().min(cell.z())),
            Cell::new(max.x().max(cell.x()), max.z().max(cell.z())),
        )
    });
    Some((min, max))
}

fn selected_cell(board: &Board, game: &GameState) -> Option<Cell> {
    if let Some(tile) = game.selected_tile {
        return board.tiles().cell_of(tile);
    }
    match game.selected_piece? {
        PieceId::Dragon(dragon) => board.dragons().cell_of(dragon),
        PieceId::Wizard(wizard) => board.wizards().cell_of(wizard),
    }
}

fn glyph(board: &Board, cell: Cell, selected: Option<Cell>) -> String {
    if !board.tiles().has_cell(cell) {
        return if board.playable_positions().has_cell(cell) {
            " . ".to_owned()
        } else {
            "   ".to_owned()
        };
    }

    let dragon = board.dragons().has_cell(cell);
    let wizard = board
        .wizards()
        .index_of_cell(cell)
        .and_then(|wizard| board.wizards().get(wizard))
        .map(|entry| entry.payload.team_index);
    let occupant = match (dragon, wizard) {
        (true, Some(_)) => 'X',
        (true, None) => 'D',
        (false, Some(team_index)) => char::from_digit(team_index % 10, 10).unwrap_or('?'),
        (false, None) => ' ',
    };

    if selected == Some(cell) {
        format!("<{occupant}>")
    } else {
        format!("[{occupant}]")
    }
}
