use super::*;

use std::path::Path;

/// Config tuned for tests: short visibility timeout, fast scanner ticks.
pub(super) fn test_config() -> QueueConfig {
    QueueConfig {
        visibility_timeout_ms: 100,
        max_retries: 3,
        dead_letter_queue: None,
        log_directory: None,
        scan_interval_ms: 50,
    }
}

pub(super) fn test_queue(name: &str) -> Arc<Queue> {
    Queue::new(name, test_config(), None).unwrap()
}

pub(super) fn persistent_config(dir: &Path) -> QueueConfig {
    QueueConfig {
        log_directory: Some(dir.to_path_buf()),
        ..test_config()
    }
}

/// Simulate a restart: a fresh queue over the same log directory.
pub(super) fn reopen(dir: &Path, name: &str) -> Arc<Queue> {
    Queue::new(name, persistent_config(dir), None).unwrap()
}

/// Consume with a bound so a broken queue fails the test instead of hanging.
pub(super) fn consume_within(queue: &Queue, ms: u64) -> Receipt {
    queue
        .consume_timeout(Duration::from_millis(ms))
        .expect("queue unexpectedly closed")
        .expect("expected a message before the deadline")
}

pub(super) fn assert_empty(queue: &Queue) {
    assert!(
        queue
            .consume_timeout(Duration::from_millis(50))
            .unwrap()
            .is_none(),
        "queue should be empty"
    );
}

/// Non-blank record lines currently on disk for a queue.
pub(super) fn log_lines(dir: &Path, name: &str) -> Vec<String> {
    let raw = std::fs::read_to_string(dir.join(format!("{name}.log"))).unwrap_or_default();
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}
