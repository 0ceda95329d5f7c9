pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod queue;
pub mod receipt;
pub mod registry;
pub mod telemetry;
pub mod wal;

pub use config::BrokerConfig;
pub use engine::Queue;
pub use error::{
    AckError, ConfigError, ConsumeError, CreateQueueError, GetQueueError, NackError, WalError,
};
pub use message::Message;
pub use queue::QueueConfig;
pub use receipt::Receipt;
pub use registry::QueueRegistry;
