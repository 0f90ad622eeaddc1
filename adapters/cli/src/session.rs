use std::time::Duration;

use anyhow::{Context, Result};
use dragon_tiles_core::{Command, Event, GameState, InteractionState};
use dragon_tiles_system_ai::AiController;
use dragon_tiles_system_player::{InputSnapshot, PlayerController};
use dragon_tiles_world::{self as world, query, Board, World};
use tracing::debug;

use crate::config::SessionConfig;

/// Seed salts keeping the opponent and the autopilot on separate streams.
const OPPONENT_SALT: u64 = 0x0a11_ce00;
const AUTOPILOT_SALT: u64 = 0x0b0b_0000;

/// Owns the world and both controllers, and drives one tick at a time.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    player: PlayerController,
    opponent: AiController,
    autopilot: Option<AiController>,
    tick: Duration,
    time: Duration,
    ticks: u64,
}

impl Session {
    /// Builds the world described by `config`.
    ///
    /// With `autoplay` the player's turns are taken by a second AI controller.
    pub(crate) fn new(config: &SessionConfig, autoplay: bool) -> Result<Self> {
        let world = World::new(&config.board, config.session.seed)
            .context("board layout is not playable")?;
        Ok(Self {
            world,
            player: PlayerController::new(),
            opponent: AiController::new(config.ai_config(OPPONENT_SALT)),
            autopilot: autoplay.then(|| AiController::new(config.ai_config(AUTOPILOT_SALT))),
            tick: config.tick(),
            time: Duration::ZERO,
            ticks: 0,
        })
    }

    pub(crate) fn board(&self) -> &Board {
        query::board(&self.world)
    }

    pub(crate) fn game_state(&self) -> &GameState {
        query::game_state(&self.world)
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn is_over(&self) -> bool {
        self.game_state().state == InteractionState::GameOver
    }

    pub(crate) fn awaits_player(&self) -> bool {
        self.autopilot.is_none() && self.game_state().is_player_turn && !self.is_over()
    }

    /// Advances the session by one tick.
    ///
    /// Only the controller whose turn it is gets asked for commands. The
    /// input's timing fields are filled in from the session clock.
    pub(crate) fn tick(&mut self, mut input: InputSnapshot) -> Vec<Event> {
        self.time = self.time.saturating_add(self.tick);
        input.dt = self.tick;
        input.time = self.time;

        let board = query::board(&self.world);
        let game = query::game_state(&self.world);
        let mut commands = vec![Command::PassTime { dt: self.tick }];
        match (&mut self.autopilot, game.is_player_turn) {
            (None, true) => self.player.handle(&input, board, game, &mut commands),
            (Some(autopilot), true) => autopilot.handle(self.tick, board, game, &mut commands),
            (_, false) => self.opponent.handle(self.tick, board, game, &mut commands),
        }
        debug!(tick = self.ticks, commands = commands.len() - 1, "session tick");

        let mut events = Vec::new();
        world::resolve_tick(&mut self.world, commands, &mut events);
        self.ticks += 1;
        events
    }
}
