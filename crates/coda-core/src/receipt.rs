use uuid::Uuid;

use crate::message::Message;

/// Proof of one particular delivery of one particular message.
///
/// Every delivery gets a fresh handle, including redeliveries of the same
/// message. The handle is what `acknowledge` and `nack` consume; it is
/// invalidated by either call and by a visibility-timeout requeue.
#[derive(Debug, Clone)]
pub struct Receipt {
    handle: Uuid,
    message: Message,
    retry_count: u32,
}

impl Receipt {
    pub(crate) fn new(message: Message, retry_count: u32) -> Self {
        Self {
            handle: Uuid::new_v4(),
            message,
            retry_count,
        }
    }

    pub fn handle(&self) -> Uuid {
        self.handle
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn payload(&self) -> &[u8] {
        &self.message.payload
    }

    /// How many prior deliveries of this message failed (nack or visibility
    /// timeout). Zero on first delivery.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }
}
