use std::path::PathBuf;

use serde::Deserialize;

/// Per-queue configuration. Immutable once the queue is constructed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// How long a delivery stays invisible after `consume` before the
    /// scanner requeues it.
    pub visibility_timeout_ms: u64,
    /// Maximum number of deliveries per message before dead-letter routing
    /// (or a drop, when no dead-letter queue is wired).
    pub max_retries: u32,
    /// Name of the dead-letter queue. None means drop on retry exhaustion.
    pub dead_letter_queue: Option<String>,
    /// Directory for the write-ahead log. None disables persistence.
    pub log_directory: Option<PathBuf>,
    /// Visibility scanner tick interval. Tests use short intervals so they
    /// are not stuck waiting on the production default.
    pub scan_interval_ms: u64,
}

impl QueueConfig {
    /// Default visibility timeout: 30 seconds.
    pub const DEFAULT_VISIBILITY_TIMEOUT_MS: u64 = 30_000;
    /// Default retry bound: 3 deliveries.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Default scanner interval: 1 second.
    pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 1_000;
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_ms: Self::DEFAULT_VISIBILITY_TIMEOUT_MS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            dead_letter_queue: None,
            log_directory: None,
            scan_interval_ms: Self::DEFAULT_SCAN_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = QueueConfig::default();
        assert_eq!(config.visibility_timeout_ms, 30_000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.dead_letter_queue, None);
        assert_eq!(config.log_directory, None);
        assert_eq!(config.scan_interval_ms, 1_000);
    }

    #[test]
    fn toml_parsing_with_overrides() {
        let toml_str = r#"
            visibility_timeout_ms = 100
            max_retries = 2
            dead_letter_queue = "orders-dlq"
            log_directory = "/var/lib/coda"
            scan_interval_ms = 50
        "#;
        let config: QueueConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.visibility_timeout_ms, 100);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.dead_letter_queue.as_deref(), Some("orders-dlq"));
        assert_eq!(config.log_directory, Some(PathBuf::from("/var/lib/coda")));
        assert_eq!(config.scan_interval_ms, 50);
    }

    #[test]
    fn toml_parsing_partial_uses_defaults() {
        let config: QueueConfig = toml::from_str("max_retries = 5").unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(
            config.visibility_timeout_ms,
            QueueConfig::DEFAULT_VISIBILITY_TIMEOUT_MS
        );
    }
}
