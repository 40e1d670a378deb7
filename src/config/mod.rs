//! # Configuration
//!
//! TOML configuration for a session host. Every section has defaults, so a
//! file only needs the values that differ.
//!
//! - [`GameConfig`] - who is playing on this device
//! - [`StorageConfig`] - where the local snapshot lives
//! - [`RemoteConfig`] - the authoritative backend
//! - [`TimersConfig`] - tick, simulation and poll periods, lesson length
//! - [`TreasureConfig`] - redistribution interval and weight table
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [game]
//! player_id = "3f0c..."
//! player_name = "Pat"
//!
//! [remote]
//! enabled = true
//! base_url = "https://deskwars.example/api"
//! timeout_seconds = 5
//!
//! [[treasure.weights]]
//! kind = "coins"
//! weight = 60
//! min_amount = 10
//! max_amount = 50
//! ```
//!
//! ```rust,no_run
//! use deskwars::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("snapshot: {}", config.storage.snapshot_path().display());
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::game::{GameSettings, TreasureSettings, TreasureWeight};
use crate::validation::validate_player_name;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub timers: TimersConfig,
    #[serde(default)]
    pub treasure: TreasureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Stable id of the local player; also the backend key.
    pub player_id: String,
    pub player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_id: "local-player".to_string(),
            player_name: "Player".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

fn default_snapshot_file() -> String {
    "game_state.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

impl StorageConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.snapshot_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Off by default so a fresh install plays offline.
    pub enabled: bool,
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:8080/api".to_string(),
            timeout_seconds: 5,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_npc_interval")]
    pub npc_interval_seconds: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_lesson_minutes")]
    pub lesson_minutes: u64,
}

fn default_tick_ms() -> u64 {
    1000
}
fn default_npc_interval() -> u64 {
    60
}
fn default_poll_interval() -> u64 {
    5
}
fn default_lesson_minutes() -> u64 {
    10
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            npc_interval_seconds: default_npc_interval(),
            poll_interval_seconds: default_poll_interval(),
            lesson_minutes: default_lesson_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasureConfig {
    pub interval_minutes: u64,
    pub per_classroom: usize,
    pub max_attempts: usize,
    pub weights: Vec<TreasureWeight>,
}

impl Default for TreasureConfig {
    fn default() -> Self {
        let defaults = TreasureSettings::default();
        Self {
            interval_minutes: (defaults.interval_ms / 60_000) as u64,
            per_classroom: defaults.per_classroom,
            max_attempts: defaults.max_attempts,
            weights: defaults.weights,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Append log lines here; console only when unset.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("deskwars.log".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file with a freshly generated player id
    pub async fn create_default(path: &str) -> Result<()> {
        let mut config = Config::default();
        config.game.player_id = uuid::Uuid::new_v4().to_string();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.player_id.trim().is_empty() {
            return Err(anyhow!("game.player_id must not be empty"));
        }
        validate_player_name(&self.game.player_name)
            .map_err(|e| anyhow!("game.player_name: {}", e))?;
        if self.timers.tick_ms == 0
            || self.timers.npc_interval_seconds == 0
            || self.timers.poll_interval_seconds == 0
            || self.timers.lesson_minutes == 0
        {
            return Err(anyhow!("timer periods must be positive"));
        }
        if self.treasure.interval_minutes == 0 {
            return Err(anyhow!("treasure.interval_minutes must be positive"));
        }
        self.game_settings()
            .treasure
            .validate()
            .map_err(|e| anyhow!("treasure: {}", e))?;
        Ok(())
    }

    /// Initial in-memory settings for the store.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            treasure: TreasureSettings {
                weights: self.treasure.weights.clone(),
                interval_ms: (self.treasure.interval_minutes * 60_000) as i64,
                per_classroom: self.treasure.per_classroom,
                max_attempts: self.treasure.max_attempts,
            },
            lesson_duration_ms: (self.timers.lesson_minutes * 60_000) as i64,
        }
    }
}
