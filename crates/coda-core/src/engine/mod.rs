use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AckError, ConsumeError, CreateQueueError, NackError};
use crate::message::Message;
use crate::queue::QueueConfig;
use crate::receipt::Receipt;
use crate::wal::{LogEntry, WalWriter};

mod replay;
mod scanner;

#[cfg(test)]
mod tests;

/// A message delivered to a consumer but not yet finalized.
///
/// Destroyed on every transition: a redelivery creates a fresh entry with a
/// new timestamp and the carried-over retry count.
#[derive(Debug)]
pub(crate) struct InFlightEntry {
    pub(crate) message: Message,
    pub(crate) consumed_at: Instant,
    pub(crate) retry_count: u32,
}

impl InFlightEntry {
    fn new(message: Message, retry_count: u32) -> Self {
        Self {
            message,
            consumed_at: Instant::now(),
            retry_count,
        }
    }

    fn is_timed_out(&self, timeout: Duration) -> bool {
        self.consumed_at.elapsed() > timeout
    }
}

/// All mutable queue state, protected by the queue's single mutex.
///
/// Consistency: for every in-flight handle `h`,
/// `retry_counts[in_flight[h].message.id] == in_flight[h].retry_count`, and a
/// message id lives in at most one of `ready` / `in_flight` at any moment.
pub(crate) struct QueueState {
    /// Ready FIFO: messages awaiting their next delivery, in insertion order.
    pub(crate) ready: VecDeque<Message>,
    /// Receipt handle to unfinalized delivery.
    pub(crate) in_flight: HashMap<Uuid, InFlightEntry>,
    /// Failed-delivery counts per message id; survives redeliveries.
    pub(crate) retry_counts: HashMap<Uuid, u32>,
    pub(crate) wal: Option<WalWriter>,
    pub(crate) closed: bool,
}

struct ScannerHandle {
    /// Dropping the sender unparks the scanner loop immediately.
    shutdown_tx: crossbeam_channel::Sender<()>,
    handle: thread::JoinHandle<()>,
}

/// A named queue with at-least-once delivery: explicit acknowledgment,
/// visibility-timeout redelivery, bounded retries, dead-letter routing, and
/// optional crash recovery through a write-ahead log.
///
/// All operations are safe under arbitrary interleaving of concurrent
/// producers, consumers, and the background scanner; one monitor (mutex plus
/// condition variable) serializes every state transition.
pub struct Queue {
    name: String,
    config: QueueConfig,
    /// Outward edge only: the dead-letter queue never references its source,
    /// and dropping this queue leaves the dead-letter queue running.
    dead_letter_queue: Option<Arc<Queue>>,
    state: Mutex<QueueState>,
    /// Signalled on publish and on requeue; consumers wait here while the
    /// FIFO is empty.
    available: Condvar,
    scanner: Mutex<Option<ScannerHandle>>,
}

impl Queue {
    /// Construct a queue, replaying and compacting its log if
    /// `config.log_directory` is set, and start its visibility scanner.
    ///
    /// `dead_letter_queue` must be wired here, before construction returns:
    /// replay can dead-letter messages whose retry budget was already spent.
    pub fn new(
        name: impl Into<String>,
        config: QueueConfig,
        dead_letter_queue: Option<Arc<Queue>>,
    ) -> Result<Arc<Self>, CreateQueueError> {
        let name = name.into();
        let queue = Arc::new(Self {
            state: Mutex::new(QueueState {
                ready: VecDeque::new(),
                in_flight: HashMap::new(),
                retry_counts: HashMap::new(),
                wal: None,
                closed: false,
            }),
            available: Condvar::new(),
            scanner: Mutex::new(None),
            dead_letter_queue,
            config,
            name,
        });

        if queue.config.log_directory.is_some() {
            queue.init_wal();
        }

        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let weak = Arc::downgrade(&queue);
        let interval = Duration::from_millis(queue.config.scan_interval_ms);
        let handle = thread::Builder::new()
            .name(format!("scanner-{}", queue.name))
            .spawn(move || scanner::run(weak, interval, shutdown_rx))
            .map_err(|e| CreateQueueError::ScannerSpawn(e.to_string()))?;
        *queue.scanner.lock() = Some(ScannerHandle {
            shutdown_tx,
            handle,
        });

        debug!(queue = %queue.name, "queue started");
        Ok(queue)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Enqueue a message at the tail of the FIFO and wake every blocked
    /// consumer. Returns the message id.
    pub fn publish(&self, message: Message) -> Uuid {
        let msg_id = message.id;
        let mut state = self.state.lock();
        let entry = LogEntry::publish(&message);
        state.ready.push_back(message);
        // Broadcast, not wake-one: with several blocked consumers, a single
        // wake can land on one that loses the race and strand the rest. The
        // loop in consume() re-checks emptiness after every wake.
        self.available.notify_all();
        self.log(&mut state, entry);
        debug!(queue = %self.name, %msg_id, "message published");
        msg_id
    }

    /// Block until a message is available, then deliver it under a fresh
    /// receipt handle.
    ///
    /// Returns `Cancelled` if the queue is closed, whether before the call or
    /// while this consumer is blocked; state is untouched in that case.
    pub fn consume(&self) -> Result<Receipt, ConsumeError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(ConsumeError::Cancelled);
            }
            if let Some(message) = state.ready.pop_front() {
                return Ok(self.deliver(&mut state, message));
            }
            self.available.wait(&mut state);
        }
    }

    /// Like [`Queue::consume`], but give up after `timeout` and return
    /// `Ok(None)` if no message arrived.
    pub fn consume_timeout(&self, timeout: Duration) -> Result<Option<Receipt>, ConsumeError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(ConsumeError::Cancelled);
            }
            if let Some(message) = state.ready.pop_front() {
                return Ok(Some(self.deliver(&mut state, message)));
            }
            if self.available.wait_until(&mut state, deadline).timed_out() {
                return Ok(None);
            }
        }
    }

    fn deliver(&self, state: &mut QueueState, message: Message) -> Receipt {
        let retry_count = state.retry_counts.get(&message.id).copied().unwrap_or(0);
        let receipt = Receipt::new(message.clone(), retry_count);
        state
            .in_flight
            .insert(receipt.handle(), InFlightEntry::new(message, retry_count));
        self.log(
            state,
            LogEntry::consume(receipt.message(), receipt.handle(), retry_count),
        );
        debug!(
            queue = %self.name,
            msg_id = %receipt.message().id,
            handle = %receipt.handle(),
            retry_count,
            "message delivered"
        );
        receipt
    }

    /// Finalize a delivery. The handle is consumed and cannot be reused.
    pub fn acknowledge(&self, handle: Uuid) -> Result<(), AckError> {
        let mut state = self.state.lock();
        let entry = state
            .in_flight
            .remove(&handle)
            .ok_or(AckError::InvalidReceipt(handle))?;
        state.retry_counts.remove(&entry.message.id);
        self.log(&mut state, LogEntry::ack(handle));
        debug!(queue = %self.name, msg_id = %entry.message.id, %handle, "message acknowledged");
        Ok(())
    }

    /// Reject a delivery, requesting immediate redelivery subject to the
    /// retry bound.
    ///
    /// A nack that races with a scanner timeout on the same handle loses
    /// cleanly: whichever removes the in-flight entry first performs the
    /// requeue, and the loser observes `InvalidReceipt`.
    pub fn nack(&self, handle: Uuid) -> Result<(), NackError> {
        let mut state = self.state.lock();
        let entry = state
            .in_flight
            .remove(&handle)
            .ok_or(NackError::InvalidReceipt(handle))?;
        self.log(&mut state, LogEntry::nack(handle));
        debug!(queue = %self.name, msg_id = %entry.message.id, %handle, "message nacked");
        self.requeue_or_dead_letter(&mut state, entry.message, entry.retry_count + 1);
        Ok(())
    }

    /// One scanner tick: requeue every delivery whose visibility timeout has
    /// elapsed. Runs entirely under the monitor.
    pub(crate) fn scan_and_requeue(&self) {
        let timeout = Duration::from_millis(self.config.visibility_timeout_ms);
        let mut state = self.state.lock();

        // Snapshot the expired handles before touching the map; removing
        // while iterating would invalidate the iterator.
        let expired: Vec<Uuid> = state
            .in_flight
            .iter()
            .filter(|(_, entry)| entry.is_timed_out(timeout))
            .map(|(handle, _)| *handle)
            .collect();

        for handle in expired {
            if let Some(entry) = state.in_flight.remove(&handle) {
                debug!(
                    queue = %self.name,
                    msg_id = %entry.message.id,
                    %handle,
                    "visibility timeout elapsed, requeueing"
                );
                self.requeue_or_dead_letter(&mut state, entry.message, entry.retry_count + 1);
            }
        }
    }

    /// Route a failed delivery: back to the tail of the FIFO while the retry
    /// bound holds, otherwise to the dead-letter queue, or dropped when none
    /// is wired.
    ///
    /// Called with the monitor held. The dead-letter publish takes that
    /// queue's own monitor; the nesting is safe because the edge only points
    /// outward, so the dead-letter queue never locks back into its source.
    fn requeue_or_dead_letter(
        &self,
        state: &mut QueueState,
        message: Message,
        new_retry_count: u32,
    ) {
        if new_retry_count >= self.config.max_retries {
            state.retry_counts.remove(&message.id);
            match &self.dead_letter_queue {
                Some(dlq) => {
                    debug!(
                        queue = %self.name,
                        msg_id = %message.id,
                        dlq = %dlq.name(),
                        "retry limit reached, routing to dead-letter queue"
                    );
                    dlq.publish(message);
                }
                None => {
                    warn!(
                        queue = %self.name,
                        msg_id = %message.id,
                        retries = new_retry_count,
                        "retry limit reached with no dead-letter queue, dropping message"
                    );
                }
            }
        } else {
            state.retry_counts.insert(message.id, new_retry_count);
            state.ready.push_back(message);
            self.available.notify_all();
        }
    }

    /// Append to the WAL if one is open. Failures are logged and swallowed:
    /// the in-memory transition has already happened and callers keep making
    /// progress; a crash before the next successful append may lose this one
    /// transition.
    fn log(&self, state: &mut QueueState, entry: LogEntry) {
        if let Some(wal) = state.wal.as_mut() {
            if let Err(e) = wal.append(&entry) {
                warn!(queue = %self.name, error = %e, "failed to append WAL record");
            }
        }
    }

    /// Close the queue: wake every blocked consumer, stop and join the
    /// scanner, and release the WAL. Idempotent and safe to call while other
    /// operations are in flight; consume calls made after close fail fast
    /// with `Cancelled`.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
        }
        self.available.notify_all();
        self.shutdown_scanner();

        let mut state = self.state.lock();
        if let Some(mut wal) = state.wal.take() {
            if let Err(e) = wal.close() {
                warn!(queue = %self.name, error = %e, "failed to close WAL");
            }
        }
        drop(state);
        debug!(queue = %self.name, "queue closed");
    }

    fn shutdown_scanner(&self) {
        let Some(scanner) = self.scanner.lock().take() else {
            return;
        };
        drop(scanner.shutdown_tx);
        // Never join from the scanner's own thread: the scanner can hold the
        // last Arc and end up here through Drop.
        if scanner.handle.thread().id() != thread::current().id() {
            let _ = scanner.handle.join();
        }
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        // Close if the owner didn't; close() is idempotent.
        self.close();
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
