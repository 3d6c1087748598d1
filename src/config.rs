use crate::{
    domain::BoardId,
    error::{KanboardError, Result},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};
use tokio::fs;

/// Settings for one board view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Board opened when the view starts
    pub board_id: BoardId,
    /// Delay between background refetches of the board
    pub poll_interval_ms: u64,
    /// Project root handed to file-backed storage
    pub data_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            board_id: BoardId::from("default-board"),
            poll_interval_ms: 5_000,
            data_dir: PathBuf::from("."),
        }
    }
}

impl SyncConfig {
    pub const ENV_BOARD_ID: &'static str = "KANBOARD_BOARD_ID";
    pub const ENV_POLL_INTERVAL_MS: &'static str = "KANBOARD_POLL_INTERVAL_MS";
    pub const ENV_DATA_DIR: &'static str = "KANBOARD_DATA_DIR";

    /// Reads a JSON config file. Missing keys take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await.map_err(|e| {
            KanboardError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `KANBOARD_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup, keyed by the `ENV_*` names
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(board_id) = lookup(Self::ENV_BOARD_ID) {
            self.board_id = board_id.parse()?;
        }
        if let Some(interval) = lookup(Self::ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = interval.trim().parse().map_err(|_| {
                KanboardError::ConfigError(format!(
                    "{} must be a whole number of milliseconds, got {:?}",
                    Self::ENV_POLL_INTERVAL_MS,
                    interval
                ))
            })?;
        }
        if let Some(dir) = lookup(Self::ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(KanboardError::ConfigError(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
