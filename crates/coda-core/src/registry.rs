use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::engine::Queue;
use crate::error::{CreateQueueError, GetQueueError};
use crate::queue::QueueConfig;

/// Process-wide name to queue map.
///
/// Creation is atomic create-if-absent: concurrent `create_queue` calls with
/// the same name all observe the same instance. When the config names a
/// dead-letter queue, that queue is created first (with default config, if it
/// does not exist yet) and wired onto the new queue before it becomes
/// visible.
#[derive(Debug, Default)]
pub struct QueueRegistry {
    queues: Mutex<HashMap<String, Arc<Queue>>>,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue, or return the existing instance registered under
    /// `name`. Repeated calls ignore the new config.
    pub fn create_queue(
        &self,
        name: &str,
        config: QueueConfig,
    ) -> Result<Arc<Queue>, CreateQueueError> {
        let mut queues = self.queues.lock();
        if let Some(existing) = queues.get(name) {
            return Ok(Arc::clone(existing));
        }

        let dlq = match config.dead_letter_queue.as_deref() {
            Some(dlq_name) => Some(Self::ensure_queue(&mut queues, dlq_name)?),
            None => None,
        };
        // A self-referential dead-letter name has just created the queue
        // itself; return that instance instead of shadowing it.
        if let Some(existing) = queues.get(name) {
            return Ok(Arc::clone(existing));
        }

        let queue = Queue::new(name, config, dlq)?;
        queues.insert(name.to_string(), Arc::clone(&queue));
        info!(queue = %name, "queue created");
        Ok(queue)
    }

    fn ensure_queue(
        queues: &mut HashMap<String, Arc<Queue>>,
        name: &str,
    ) -> Result<Arc<Queue>, CreateQueueError> {
        if let Some(existing) = queues.get(name) {
            return Ok(Arc::clone(existing));
        }
        let queue = Queue::new(name, QueueConfig::default(), None)?;
        queues.insert(name.to_string(), Arc::clone(&queue));
        info!(queue = %name, "dead-letter queue created");
        Ok(queue)
    }

    /// Look up an existing queue.
    pub fn get_queue(&self, name: &str) -> Result<Arc<Queue>, GetQueueError> {
        self.queues
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| GetQueueError::QueueNotFound(name.to_string()))
    }

    /// Close and remove a queue. Unknown names are a silent no-op. A wired
    /// dead-letter queue is a separate registry entry and keeps running.
    pub fn delete_queue(&self, name: &str) {
        let removed = self.queues.lock().remove(name);
        if let Some(queue) = removed {
            queue.close();
            info!(queue = %name, "queue deleted");
        }
    }

    /// Names of all registered queues, in no particular order.
    pub fn list_queues(&self) -> Vec<String> {
        self.queues.lock().keys().cloned().collect()
    }
}
