#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use coda_core::{Queue, QueueConfig, Receipt};

/// Config tuned for tests: short visibility timeout, fast scanner ticks.
pub fn fast_config() -> QueueConfig {
    QueueConfig {
        visibility_timeout_ms: 100,
        max_retries: 3,
        dead_letter_queue: None,
        log_directory: None,
        scan_interval_ms: 50,
    }
}

pub fn persistent_config(dir: &Path) -> QueueConfig {
    QueueConfig {
        log_directory: Some(dir.to_path_buf()),
        ..fast_config()
    }
}

/// Consume with a bound so a broken queue fails the test instead of hanging.
pub fn consume_within(queue: &Queue, ms: u64) -> Receipt {
    queue
        .consume_timeout(Duration::from_millis(ms))
        .expect("queue unexpectedly closed")
        .expect("expected a message before the deadline")
}

pub fn assert_empty(queue: &Queue) {
    assert!(
        queue
            .consume_timeout(Duration::from_millis(50))
            .unwrap()
            .is_none(),
        "queue should be empty"
    );
}

/// Drain a queue with a short timeout, acknowledging everything received.
pub fn drain(queue: &Arc<Queue>) -> Vec<Vec<u8>> {
    let mut payloads = Vec::new();
    while let Some(receipt) = queue.consume_timeout(Duration::from_millis(200)).unwrap() {
        payloads.push(receipt.payload().to_vec());
        queue.acknowledge(receipt.handle()).unwrap();
    }
    payloads
}
