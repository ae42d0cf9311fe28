//! Connector configuration

use std::path::{Path, PathBuf};

use seer_protocol::GameType;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SHOWDOWN_URI: &str = "ws://localhost:8000/showdown/websocket";
pub const DEFAULT_LOGIN_URI: &str = "https://play.pokemonshowdown.com/api/login";

/// How the connector finds battles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Wait for inbound challenges and accept them
    #[default]
    Accept,
    /// Challenge whitelisted users one at a time
    Challenge,
    /// Search the ladder for the target format
    Ladder,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("objective is challenge but no users are whitelisted")]
    EmptyWhitelist,

    #[error("game type {0:?} is not supported")]
    UnsupportedGameType(GameType),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub username: String,
    pub password: String,
    pub target_format: String,
    pub gametype: GameType,
    pub objective: Objective,
    pub whitelist_users: Vec<String>,
    pub max_concurrent_battles: usize,
    pub total_battles: usize,
    pub showdown_uri: String,
    pub login_uri: String,
    pub save_logs: bool,
    pub save_json: bool,
    /// Consecutive rejected actions tolerated per battle before it is forfeited
    pub max_invalid_choices: u32,
    pub log_dir: PathBuf,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            target_format: String::new(),
            gametype: GameType::Singles,
            objective: Objective::Accept,
            whitelist_users: Vec::new(),
            max_concurrent_battles: 1,
            total_battles: 1,
            showdown_uri: DEFAULT_SHOWDOWN_URI.to_string(),
            login_uri: DEFAULT_LOGIN_URI.to_string(),
            save_logs: false,
            save_json: false,
            max_invalid_choices: 3,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ConnectorConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        target_format: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            target_format: target_format.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::Empty("username"));
        }
        if self.target_format.trim().is_empty() {
            return Err(ConfigError::Empty("target_format"));
        }
        if self.objective == Objective::Challenge && self.whitelist_users.is_empty() {
            return Err(ConfigError::EmptyWhitelist);
        }
        if matches!(self.gametype, GameType::Multi | GameType::FreeForAll) {
            return Err(ConfigError::UnsupportedGameType(self.gametype));
        }
        if self.max_concurrent_battles == 0 {
            return Err(ConfigError::Zero("max_concurrent_battles"));
        }
        if self.total_battles == 0 {
            return Err(ConfigError::Zero("total_battles"));
        }
        if self.max_invalid_choices == 0 {
            return Err(ConfigError::Zero("max_invalid_choices"));
        }
        Ok(())
    }

    /// Entries each submitted per-slot action must carry
    pub fn slot_count(&self) -> usize {
        self.gametype.slot_count()
    }
}
