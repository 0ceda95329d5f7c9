use std::sync::Weak;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::debug;

use super::Queue;

/// Visibility scanner loop: one per queue, parked on a cancellable sleep.
///
/// `recv_timeout` doubles as the tick timer and the shutdown signal. The
/// queue drops the sender on close, which unparks the loop immediately, so
/// exit is bounded by one interval plus the cost of one scan.
pub(super) fn run(queue: Weak<Queue>, interval: Duration, shutdown_rx: Receiver<()>) {
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                // All strong refs gone means nobody can consume anymore;
                // stop ticking.
                let Some(queue) = queue.upgrade() else { break };
                queue.scan_and_requeue();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("visibility scanner stopped");
}
