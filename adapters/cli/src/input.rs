use anyhow::{bail, Context, Result};
use dragon_tiles_system_player::{CommandKeys, InputSnapshot, PointerRay};
use glam::Vec3;

/// Height of the virtual top-down camera the terminal clicks are cast from.
const CAMERA_HEIGHT: f32 = 12.0;

/// One line of terminal input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Prompt {
    /// Frame input forwarded to the player controller.
    Input(InputSnapshot),
    /// End the session.
    Quit,
}

pub(crate) const HELP: &str = "keys: r rotate, m move tile, p place tile, w move wizard, \
d move dragon | c <x> <z> click a cell | empty line waits | q quits";

/// Parses a terminal line into frame input.
pub(crate) fn parse_line(line: &str) -> Result<Prompt> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Prompt::Input(InputSnapshot::default()));
    };

    let mut keys = CommandKeys::default();
    match head {
        "q" | "quit" => return Ok(Prompt::Quit),
        "r" => keys.rotate_tile = true,
        "m" => keys.move_tile = true,
        "p" => keys.place_tile = true,
        "w" => keys.move_wizard = true,
        "d" => keys.move_dragon = true,
        "c" | "click" => {
            let x = coordinate(words.next(), "x")?;
            let z = coordinate(words.next(), "z")?;
            return Ok(Prompt::Input(InputSnapshot {
                pointer: Some(PointerRay::new(
                    Vec3::new(x, CAMERA_HEIGHT, z),
                    Vec3::NEG_Y,
                )),
                pointer_down: true,
                ..InputSnapshot::default()
            }));
        }
        other => bail!("unknown input `{other}`"),
    }
    Ok(Prompt::Input(InputSnapshot::with_keys(keys)))
}

fn coordinate(word: Option<&str>, axis: &str) -> Result<f32> {
    let word = word.with_context(|| format!("click is missing the {axis} coordinate"))?;
    word.parse()
        .with_context(|| format!("`{word}` is not a valid {axis} coordinate"))
}
