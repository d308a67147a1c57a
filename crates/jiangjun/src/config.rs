//! Play configuration for the orchestrator.

use derive_getters::Getters;
use derive_more::{Display, Error};
use jiangjun_board::Side;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Operating mode of the acquisition pipeline, derived from the thinking
/// budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkMode {
    /// Short budget: one shot per oracle, resolve or fall through fast.
    Fast,
    /// Long budget: trace principal variations and consult the repetition
    /// detector before falling back.
    Deep,
}

/// Configuration for a game session.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct PlayConfig {
    /// Thinking budget per opponent move, in milliseconds. Budgets at or
    /// under one second select [`ThinkMode::Fast`].
    #[serde(default = "default_think_time_ms")]
    think_time_ms: u64,

    /// Deadline for a single oracle request, in milliseconds.
    #[serde(default = "default_oracle_timeout_ms")]
    oracle_timeout_ms: u64,

    /// Artificial pause before the local-search fallback runs, so an
    /// instant local answer does not land jarringly fast.
    #[serde(default = "default_fallback_delay_ms")]
    fallback_delay_ms: u64,

    /// Presentational pause after a ply is applied; 0 skips it entirely.
    #[serde(default)]
    animation_ms: u64,

    /// Depth cap handed to the local search.
    #[serde(default = "default_depth_limit")]
    depth_limit: u32,

    /// Side played by the machine opponent; `None` means two humans.
    #[serde(default)]
    opponent: Option<Side>,

    /// Base URL of the book-database oracle (Source A).
    #[serde(default = "default_book_db_url")]
    book_db_url: String,

    /// Base URL of the cloud-engine oracle (Source B).
    #[serde(default = "default_cloud_engine_url")]
    cloud_engine_url: String,

    /// Quality-tier flag sent to the cloud-engine oracle.
    #[serde(default = "default_cloud_tier")]
    cloud_tier: String,
}

fn default_think_time_ms() -> u64 {
    1000
}

fn default_oracle_timeout_ms() -> u64 {
    10_000
}

fn default_fallback_delay_ms() -> u64 {
    250
}

fn default_depth_limit() -> u32 {
    64
}

fn default_book_db_url() -> String {
    "https://www.chessdb.cn/chessdb.php".to_string()
}

fn default_cloud_engine_url() -> String {
    "https://engine.xqipu.com/api/engine/getMoves".to_string()
}

fn default_cloud_tier() -> String {
    "vip".to_string()
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            think_time_ms: default_think_time_ms(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            fallback_delay_ms: default_fallback_delay_ms(),
            animation_ms: 0,
            depth_limit: default_depth_limit(),
            opponent: None,
            book_db_url: default_book_db_url(),
            cloud_engine_url: default_cloud_engine_url(),
            cloud_tier: default_cloud_tier(),
        }
    }
}

impl PlayConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading play config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            think_time_ms = config.think_time_ms,
            opponent = ?config.opponent,
            "Play config loaded"
        );
        Ok(config)
    }

    /// Operating mode implied by the thinking budget.
    pub fn mode(&self) -> ThinkMode {
        if self.think_time_ms <= 1000 {
            ThinkMode::Fast
        } else {
            ThinkMode::Deep
        }
    }

    /// Oracle request deadline as a [`Duration`].
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    /// Fallback pause as a [`Duration`].
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    /// Animation pause, or `None` when animation is disabled.
    pub fn animation_pause(&self) -> Option<Duration> {
        (self.animation_ms > 0).then(|| Duration::from_millis(self.animation_ms))
    }

    /// Sets the machine opponent's side.
    pub fn with_opponent(mut self, opponent: Option<Side>) -> Self {
        self.opponent = opponent;
        self
    }

    /// Sets the thinking budget in milliseconds.
    pub fn with_think_time_ms(mut self, millis: u64) -> Self {
        self.think_time_ms = millis;
        self
    }

    /// Sets the per-oracle request deadline in milliseconds.
    pub fn with_oracle_timeout_ms(mut self, millis: u64) -> Self {
        self.oracle_timeout_ms = millis;
        self
    }

    /// Sets the local-search fallback pause in milliseconds.
    pub fn with_fallback_delay_ms(mut self, millis: u64) -> Self {
        self.fallback_delay_ms = millis;
        self
    }
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
