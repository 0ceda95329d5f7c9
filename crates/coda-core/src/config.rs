use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::queue::QueueConfig;

/// Top-level broker configuration, deserializable from TOML. Every field has
/// a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Directory where queue WAL files live. None disables persistence for
    /// queues created from these defaults.
    pub log_directory: Option<PathBuf>,
    pub queue: QueueDefaults,
}

/// Defaults applied to queues created without an explicit [`QueueConfig`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueDefaults {
    pub visibility_timeout_ms: u64,
    pub max_retries: u32,
    pub scan_interval_ms: u64,
}

impl Default for QueueDefaults {
    fn default() -> Self {
        Self {
            visibility_timeout_ms: QueueConfig::DEFAULT_VISIBILITY_TIMEOUT_MS,
            max_retries: QueueConfig::DEFAULT_MAX_RETRIES,
            scan_interval_ms: QueueConfig::DEFAULT_SCAN_INTERVAL_MS,
        }
    }
}

impl BrokerConfig {
    /// Load a TOML config from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Materialize a per-queue config seeded from these broker defaults.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            visibility_timeout_ms: self.queue.visibility_timeout_ms,
            max_retries: self.queue.max_retries,
            dead_letter_queue: None,
            log_directory: self.log_directory.clone(),
            scan_interval_ms: self.queue.scan_interval_ms,
        }
    }
}
