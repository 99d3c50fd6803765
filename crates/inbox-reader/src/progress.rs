use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;

/// Snapshot of what the reader loop last durably applied.
///
/// Readers across suspension points (e.g. a handle method called from another task) must
/// never observe a torn combination of `last_read_block`/`last_read_batch_count`, so both
/// fields are updated together under one lock rather than as two independent atomics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSnapshot {
    pub last_read_block: u64,
    pub last_read_batch_count: u64,
}

/// Shared, lock-cheap progress state published by the reader loop and consumed by
/// [`ReaderHandle`](crate::ReaderHandle).
///
/// `last_seen_batch_count` is split out into its own atomic: it's written far more often
/// (every divergence probe) than the snapshot, and callers that only care about "is there
/// new work" shouldn't contend with snapshot writers.
#[derive(Debug)]
pub(crate) struct ProgressState {
    snapshot: RwLock<ProgressSnapshot>,
    last_seen_batch_count: AtomicU64,
    caught_up_tx: watch::Sender<bool>,
}

impl ProgressState {
    pub(crate) fn new() -> Self {
        let (caught_up_tx, _rx) = watch::channel(false);
        Self {
            snapshot: RwLock::new(ProgressSnapshot::default()),
            last_seen_batch_count: AtomicU64::new(0),
            caught_up_tx,
        }
    }

    pub(crate) fn publish_read(&self, last_read_block: u64, last_read_batch_count: u64) {
        let mut snapshot = self.snapshot.write();
        snapshot.last_read_block = last_read_block;
        snapshot.last_read_batch_count = last_read_batch_count;
    }

    pub(crate) fn publish_seen_batch_count(&self, count: u64) {
        self.last_seen_batch_count.store(count, Ordering::Release);
    }

    pub(crate) fn mark_caught_up(&self) {
        let _ = self.caught_up_tx.send_if_modified(|caught_up| {
            if *caught_up {
                false
            } else {
                *caught_up = true;
                true
            }
        });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.snapshot.read()
    }

    pub fn last_seen_batch_count(&self) -> u64 {
        self.last_seen_batch_count.load(Ordering::Acquire)
    }

    pub fn subscribe_caught_up(&self) -> watch::Receiver<bool> {
        self.caught_up_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_consistent_pair() {
        let state = ProgressState::new();
        state.publish_read(42, 7);
        let snap = state.snapshot();
        assert_eq!(snap.last_read_block, 42);
        assert_eq!(snap.last_read_batch_count, 7);
    }

    #[test]
    fn caught_up_fires_once() {
        let state = ProgressState::new();
        let mut rx = state.subscribe_caught_up();
        assert!(!*rx.borrow());
        state.mark_caught_up();
        rx.has_changed().unwrap();
        assert!(*rx.borrow_and_update());
        state.mark_caught_up();
        assert!(!rx.has_changed().unwrap());
    }
}
