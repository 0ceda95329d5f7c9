use uuid::Uuid;

/// Write-ahead log errors (I/O, record codec). These never reach callers of
/// the queue API directly: the engine logs them and keeps the in-memory
/// operation alive.
#[derive(Debug, thiserror::Error)]
pub enum WalError {
    #[error("wal io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wal codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    /// The queue was closed while this consumer was blocked, or before the
    /// call. Queue state is unchanged.
    #[error("consume cancelled: queue is closed")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum AckError {
    /// The handle names no in-flight delivery: already finalized, requeued
    /// by the scanner, or never issued.
    #[error("invalid receipt handle: {0}")]
    InvalidReceipt(Uuid),
}

#[derive(Debug, thiserror::Error)]
pub enum NackError {
    #[error("invalid receipt handle: {0}")]
    InvalidReceipt(Uuid),
}

#[derive(Debug, thiserror::Error)]
pub enum CreateQueueError {
    #[error("failed to spawn scanner thread: {0}")]
    ScannerSpawn(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GetQueueError {
    #[error("queue not found: {0}")]
    QueueNotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
