use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use dragon_tiles_core::BoardLayout;
use dragon_tiles_system_ai::{Config as AiConfig, Repertoire, DEFAULT_COOLDOWN};
use serde::Deserialize;

/// Board and session settings used when no `--config` file is given.
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

const DEFAULT_TICK_MS: u64 = 100;

/// Complete session configuration loaded from TOML.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionConfig {
    #[serde(default)]
    pub(crate) session: SessionSection,
    #[serde(default)]
    pub(crate) ai: AiSection,
    #[serde(default)]
    pub(crate) board: BoardLayout,
}

/// `[session]` table.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSection {
    pub(crate) seed: u64,
    pub(crate) tick_ms: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

/// `[ai]` table.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AiSection {
    pub(crate) cooldown_ms: u64,
    pub(crate) repertoire: Repertoire,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN.as_millis() as u64,
            repertoire: Repertoire::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) tick_ms: Option<u64>,
    pub(crate) ai_cooldown_ms: Option<u64>,
    pub(crate) reduced_repertoire: bool,
}

impl SessionConfig {
    /// Loads the configuration at `path`, or the embedded default when absent.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config at {}", path.display()))?;
                Self::parse(&contents)
                    .with_context(|| format!("invalid config at {}", path.display()))
            }
            None => Self::parse(DEFAULT_CONFIG).context("invalid embedded default config"),
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        if config.session.tick_ms == 0 {
            bail!("session.tick_ms must be greater than zero");
        }
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub(crate) fn apply(&mut self, overrides: Overrides) {
        if let Some(seed) = overrides.seed {
            self.session.seed = seed;
        }
        if let Some(tick_ms) = overrides.tick_ms.filter(|ms| *ms > 0) {
            self.session.tick_ms = tick_ms;
        }
        if let Some(cooldown_ms) = overrides.ai_cooldown_ms {
            self.ai.cooldown_ms = cooldown_ms;
        }
        if overrides.reduced_repertoire {
            self.ai.repertoire = Repertoire::Reduced;
        }
    }

    /// Simulated time covered by one session tick.
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.session.tick_ms)
    }

    /// Opponent configuration seeded from the session seed.
    pub(crate) fn ai_config(&self, salt: u64) -> AiConfig {
        AiConfig::new(
            Duration::from_millis(self.ai.cooldown_ms),
            self.session.seed ^ salt,
            self.ai.repertoire,
        )
    }
}
