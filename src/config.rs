//! Race configuration files.
//!
//! ```json
//! {
//!   "width": 8,
//!   "height": 3,
//!   "numPlayers": 2,
//!   "direction": "cw",
//!   "track": ["********", "++    --", "********"],
//!   "players": [
//!     { "name": "Ana", "controller": { "kind": "human" } },
//!     { "name": "Bot", "controller": { "kind": "cpu", "strategy": "weighted" } }
//!   ]
//! }
//! ```
//!
//! `players` is optional. Without it every car is a CPU, alternating the heuristic and weighted
//! strategies.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::controller::{CpuDriver, HumanInput, MoveProvider};
use crate::engine::{RaceEngine, RaceError, RaceSettings};
use crate::strategy::{ScriptedStrategy, StrategyError, StrategyKind};
use crate::track::{Track, TrackError};

pub const MAX_WIDTH: usize = 100;
pub const MAX_HEIGHT: usize = 100;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

const DEFAULT_STRATEGIES: [StrategyKind; 2] = [StrategyKind::Heuristic, StrategyKind::Weighted];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Cw,
    Ccw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ControllerConfig {
    Cpu { strategy: StrategyKind },
    /// Lua script, relative to the configuration file.
    Script { path: PathBuf },
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub controller: ControllerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    pub width: usize,
    pub height: usize,
    pub num_players: usize,
    pub direction: Direction,
    pub track: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<PlayerConfig>>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not a .json file")]
    NotJson(PathBuf),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration")]
    Json(#[from] serde_json::Error),
    #[error("width must be between 1 and {max}, got {0}", max = MAX_WIDTH - 1)]
    Width(usize),
    #[error("height must be between 1 and {max}, got {0}", max = MAX_HEIGHT - 1)]
    Height(usize),
    #[error("numPlayers must be between {min} and {max}, got {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    PlayerCount(usize),
    #[error("track has {found} rows, height says {expected}")]
    RowCount { found: usize, expected: usize },
    #[error("track row {row} has {found} cells, width says {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("invalid track")]
    Track(#[from] TrackError),
    #[error("{players} players need as many start cells, the track has {available}")]
    NotEnoughStarts { players: usize, available: usize },
    #[error("players lists {found} entries, numPlayers says {expected}")]
    PlayerList { found: usize, expected: usize },
    #[error("failed to set up a player")]
    Strategy(#[from] StrategyError),
    #[error("failed to set up the race")]
    Race(#[from] RaceError),
}

impl RaceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().map_or(true, |ext| ext != "json") {
            return Err(ConfigError::NotJson(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "configuration read");
        Self::from_json(&text)
    }

    /// Parses and validates a configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RaceConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::Width(self.width));
        }
        if !(1..MAX_HEIGHT).contains(&self.height) {
            return Err(ConfigError::Height(self.height));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(ConfigError::PlayerCount(self.num_players));
        }
        if let Some(players) = &self.players {
            if players.len() != self.num_players {
                return Err(ConfigError::PlayerList {
                    found: players.len(),
                    expected: self.num_players,
                });
            }
        }

        let track = self.track()?;
        let available = track.start_positions().len();
        if available < self.num_players {
            return Err(ConfigError::NotEnoughStarts {
                players: self.num_players,
                available,
            });
        }
        Ok(())
    }

    /// The grid described by `track`, checked against `width` and `height`.
    pub fn track(&self) -> Result<Track, ConfigError> {
        if self.track.len() != self.height {
            return Err(ConfigError::RowCount {
                found: self.track.len(),
                expected: self.height,
            });
        }
        if let Some((row, found)) = self
            .track
            .iter()
            .map(|line| line.chars().count())
            .enumerate()
            .find(|&(_, found)| found != self.width)
        {
            return Err(ConfigError::RowWidth {
                row,
                found,
                expected: self.width,
            });
        }
        Ok(Track::from_rows(&self.track)?)
    }

    /// The configured players, or `numPlayers` CPU cars alternating the default strategies.
    pub fn players(&self) -> Vec<PlayerConfig> {
        match &self.players {
            Some(players) => players.clone(),
            None => (0..self.num_players)
                .map(|i| PlayerConfig {
                    name: format!("CPU {}", i + 1),
                    controller: ControllerConfig::Cpu {
                        strategy: DEFAULT_STRATEGIES[i % DEFAULT_STRATEGIES.len()],
                    },
                })
                .collect(),
        }
    }

    /// A race in setup with every player registered. Script paths are resolved against
    /// `base_dir`; random strategies get `settings.seed` plus their car index.
    pub fn build_engine(
        &self,
        settings: RaceSettings,
        base_dir: impl AsRef<Path>,
    ) -> Result<RaceEngine, ConfigError> {
        let mut engine = RaceEngine::new(self.track()?, settings);
        for (index, player) in self.players().into_iter().enumerate() {
            let provider: Box<dyn MoveProvider> = match player.controller {
                ControllerConfig::Cpu { strategy } => Box::new(CpuDriver::new(
                    strategy.build(settings.seed.map(|seed| seed.wrapping_add(index as u64))),
                )),
                ControllerConfig::Script { path } => Box::new(CpuDriver::new(Box::new(
                    ScriptedStrategy::from_file(base_dir.as_ref().join(path))?,
                ))),
                ControllerConfig::Human => Box::new(HumanInput::stdio()),
            };
            engine.register(player.name, provider)?;
        }
        Ok(engine)
    }
}
