use tracing::{debug, warn};
use uuid::Uuid;

use super::{InFlightEntry, Queue, QueueState};
use crate::message::Message;
use crate::wal::{self, LogEntry, LogOp, WalWriter};

impl Queue {
    /// Restore state from the on-disk log, open a fresh writer, and compact
    /// the file down to the live snapshot.
    ///
    /// Any failure here downgrades the queue to in-memory operation with a
    /// warning: a broker that cannot persist still delivers.
    pub(super) fn init_wal(&self) {
        let Some(dir) = self.config.log_directory.as_deref() else {
            return;
        };
        let path = dir.join(format!("{}.log", self.name));

        let entries = match wal::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    queue = %self.name,
                    error = %e,
                    "could not read WAL, starting without persistence"
                );
                return;
            }
        };

        let mut state = self.state.lock();
        let replayed = !entries.is_empty();
        if replayed {
            self.replay(&mut state, entries);
        }

        match WalWriter::open(&path) {
            Ok(writer) => {
                state.wal = Some(writer);
                if replayed {
                    self.compact_log(&mut state);
                }
            }
            Err(e) => {
                warn!(
                    queue = %self.name,
                    error = %e,
                    "could not open WAL writer, starting without persistence"
                );
            }
        }
    }

    /// Apply logged transitions in order, without writing new records.
    ///
    /// Reaches, under the public API, the state the crashed process would
    /// have reached had every message in flight at crash time been nacked
    /// once; that final implicit-nack pass is what makes delivery
    /// at-least-once across restarts.
    fn replay(&self, state: &mut QueueState, entries: Vec<LogEntry>) {
        let records = entries.len();
        for entry in entries {
            match entry.op {
                LogOp::Publish => {
                    let Some(msg_id) = entry.msg_uuid() else {
                        warn!(queue = %self.name, "skipping PUBLISH record without a message id");
                        continue;
                    };
                    if entry.retry_count > 0 {
                        state.retry_counts.insert(msg_id, entry.retry_count);
                    }
                    state.ready.push_back(Message::restored(msg_id, entry.payload));
                }
                LogOp::Consume => {
                    let (Some(msg_id), Some(handle)) = (entry.msg_uuid(), entry.handle_uuid())
                    else {
                        warn!(queue = %self.name, "skipping CONSUME record with missing fields");
                        continue;
                    };
                    // Absent means the PUBLISH record was lost or the message
                    // already left the queue; there is no payload here to
                    // reconstruct it from, so skip.
                    let Some(pos) = state.ready.iter().position(|m| m.id == msg_id) else {
                        continue;
                    };
                    let Some(message) = state.ready.remove(pos) else {
                        continue;
                    };
                    state
                        .in_flight
                        .insert(handle, InFlightEntry::new(message, entry.retry_count));
                }
                LogOp::Ack => {
                    let Some(handle) = entry.handle_uuid() else {
                        warn!(queue = %self.name, "skipping ACK record without a handle");
                        continue;
                    };
                    if let Some(removed) = state.in_flight.remove(&handle) {
                        state.retry_counts.remove(&removed.message.id);
                    }
                }
                LogOp::Nack => {
                    let Some(handle) = entry.handle_uuid() else {
                        warn!(queue = %self.name, "skipping NACK record without a handle");
                        continue;
                    };
                    if let Some(removed) = state.in_flight.remove(&handle) {
                        self.requeue_or_dead_letter(
                            state,
                            removed.message,
                            removed.retry_count + 1,
                        );
                    }
                }
            }
        }

        // Whatever is still in flight was in flight at crash time. Treat each
        // entry as an implicit nack so the message gets delivered again.
        let crashed: Vec<Uuid> = state.in_flight.keys().copied().collect();
        for handle in crashed {
            if let Some(entry) = state.in_flight.remove(&handle) {
                self.requeue_or_dead_letter(state, entry.message, entry.retry_count + 1);
            }
        }

        debug!(
            queue = %self.name,
            records,
            queued = state.ready.len(),
            "replayed WAL"
        );
    }

    /// Rewrite the log as one PUBLISH per currently queued message, in queue
    /// order, bounding the file by live state. Each record carries the
    /// message's accumulated retry count so the count survives a second
    /// restart; replay seeds the retry map from it.
    fn compact_log(&self, state: &mut QueueState) {
        let survivors: Vec<LogEntry> = state
            .ready
            .iter()
            .map(|message| {
                let mut entry = LogEntry::publish(message);
                entry.retry_count = state.retry_counts.get(&message.id).copied().unwrap_or(0);
                entry
            })
            .collect();

        if let Some(wal) = state.wal.as_mut() {
            match wal.compact(&survivors) {
                Ok(()) => {
                    debug!(queue = %self.name, survivors = survivors.len(), "compacted WAL")
                }
                Err(e) => warn!(queue = %self.name, error = %e, "could not compact WAL"),
            }
        }
    }
}
