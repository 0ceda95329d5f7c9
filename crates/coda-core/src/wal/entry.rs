use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;

/// The four state transitions a queue records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogOp {
    Publish,
    Consume,
    Ack,
    Nack,
}

/// One durable record, encoded as a single JSON object per line.
///
/// Records are self-describing with named fields; fields an op does not use
/// are the empty string or zero. JSON string escaping plus the byte-array
/// payload representation make the encoding reversible for arbitrary payload
/// contents, including embedded quotes, separators, and newlines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub op: LogOp,
    #[serde(default)]
    pub msg_id: String,
    #[serde(default)]
    pub payload: Vec<u8>,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub retry_count: u32,
    /// Informational only; replay never interprets it.
    #[serde(default)]
    pub ts_ms: u64,
}

impl LogEntry {
    pub fn publish(message: &Message) -> Self {
        Self {
            op: LogOp::Publish,
            msg_id: message.id.to_string(),
            payload: message.payload.clone(),
            handle: String::new(),
            retry_count: 0,
            ts_ms: now_ms(),
        }
    }

    pub fn consume(message: &Message, handle: Uuid, retry_count: u32) -> Self {
        Self {
            op: LogOp::Consume,
            msg_id: message.id.to_string(),
            payload: Vec::new(),
            handle: handle.to_string(),
            retry_count,
            ts_ms: now_ms(),
        }
    }

    pub fn ack(handle: Uuid) -> Self {
        Self {
            op: LogOp::Ack,
            msg_id: String::new(),
            payload: Vec::new(),
            handle: handle.to_string(),
            retry_count: 0,
            ts_ms: now_ms(),
        }
    }

    pub fn nack(handle: Uuid) -> Self {
        Self {
            op: LogOp::Nack,
            msg_id: String::new(),
            payload: Vec::new(),
            handle: handle.to_string(),
            retry_count: 0,
            ts_ms: now_ms(),
        }
    }

    /// The message id, if present and well-formed.
    pub fn msg_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.msg_id).ok()
    }

    /// The receipt handle, if present and well-formed.
    pub fn handle_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.handle).ok()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
