use async_trait::async_trait;
use thiserror::Error;

use crate::{BatchMetadata, DelayedInboxMessage, Hash, SequencerInboxBatch};

/// Result of applying a batch of sequencer batches to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBatchesOutcome {
    /// The batches were persisted.
    Applied,
    /// At least one batch referenced a delayed message not yet present in the tracker.
    /// The caller should widen its delayed-message scan and retry.
    DelayedMessagesMismatch,
}

/// Persistent, append-only store of record for both inbox streams.
///
/// This is the node's source of truth: the reader loop never holds state the tracker
/// doesn't also have durably, and every accumulator comparison the loop makes is against
/// a value read back from here.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait InboxTracker: Send + Sync {
    /// Number of sequencer batches currently stored.
    async fn get_batch_count(&self) -> Result<u64, InboxTrackerError>;

    /// Accumulator after the batch at `seq_num`, if stored.
    async fn get_batch_acc(&self, seq_num: u64) -> Result<Option<Hash>, InboxTrackerError>;

    /// Stored metadata for the batch at `seq_num`, if stored.
    async fn get_batch_metadata(
        &self,
        seq_num: u64,
    ) -> Result<Option<BatchMetadata>, InboxTrackerError>;

    /// Truncates stored batches down to `count` entries.
    async fn reorg_batches_to(&self, count: u64) -> Result<(), InboxTrackerError>;

    /// Appends sequencer batches. The batches must already have been verified by the
    /// caller to chain onto the current tip; this only additionally checks that every
    /// delayed message a batch depends on is already stored.
    async fn add_sequencer_batches(
        &self,
        batches: &[SequencerInboxBatch],
    ) -> Result<AddBatchesOutcome, InboxTrackerError>;

    /// Number of delayed messages currently stored.
    async fn get_delayed_count(&self) -> Result<u64, InboxTrackerError>;

    /// Accumulator after the delayed message at `seq_num`, if stored.
    async fn get_delayed_acc(&self, seq_num: u64) -> Result<Option<Hash>, InboxTrackerError>;

    /// The delayed message at `seq_num`, if stored.
    async fn get_delayed_message(
        &self,
        seq_num: u64,
    ) -> Result<Option<DelayedInboxMessage>, InboxTrackerError>;

    /// Truncates stored delayed messages down to `count` entries.
    async fn reorg_delayed_to(&self, count: u64) -> Result<(), InboxTrackerError>;

    /// Appends delayed messages. The caller has already verified they chain onto the
    /// current tip.
    async fn add_delayed_messages(
        &self,
        messages: &[DelayedInboxMessage],
    ) -> Result<(), InboxTrackerError>;
}

/// Errors surfaced by an [`InboxTracker`] implementation.
#[derive(Debug, Error)]
pub enum InboxTrackerError {
    /// Underlying storage I/O failed; the caller should log and retry.
    #[error("tracker storage error: {0}")]
    Storage(String),

    /// Stored data failed to (de)serialize.
    #[error("tracker serialization error: {0}")]
    Serialization(String),

    /// A tracker-level invariant was violated (e.g. an append would leave a gap).
    #[error("tracker invariant violated: {0}")]
    InvariantViolated(String),

    /// Other unspecified error.
    #[error(transparent)]
    Other(#[from] eyre::Error),
}

impl InboxTrackerError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invariant_violated(msg: impl Into<String>) -> Self {
        Self::InvariantViolated(msg.into())
    }
}
