use uuid::Uuid;

/// Core message domain type. The id is assigned once and never changes;
/// the payload is an opaque byte string the broker never inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message with a fresh UUIDv7 id. Time-ordered ids keep log
    /// files roughly chronological and are unique across every queue in the
    /// process.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Uuid::now_v7(),
            payload: payload.into(),
        }
    }

    /// Restore a message under its original id. Used by WAL replay only;
    /// everything else goes through [`Message::new`].
    pub(crate) fn restored(id: Uuid, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }
}
