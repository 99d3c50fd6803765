use async_trait::async_trait;
use thiserror::Error;

use crate::{Hash, SequencerInboxBatch};

/// Read-only view of the parent-chain sequencer inbox contract, as of a given
/// parent-chain block height.
///
/// Also serves batch-serialization reads (the `Client` collaborator in the design this
/// crate is modeled on): [`lookup_batches_in_range`](Self::lookup_batches_in_range) at an
/// exact block returns the batch's raw bytes, so no separate RPC client trait is needed.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait SequencerInbox: Send + Sync {
    /// Number of batches posted as of `at_block`.
    async fn get_batch_count(&self, at_block: u64) -> Result<u64, SequencerInboxError>;

    /// Accumulator after the batch at `seq_num`, as of `at_block`.
    async fn get_accumulator(
        &self,
        seq_num: u64,
        at_block: u64,
    ) -> Result<Option<Hash>, SequencerInboxError>;

    /// Batches posted in the inclusive parent-chain block range `[from, to]`.
    async fn lookup_batches_in_range(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<SequencerInboxBatch>, SequencerInboxError>;
}

/// Errors surfaced by a [`SequencerInbox`] implementation.
#[derive(Debug, Error)]
pub enum SequencerInboxError {
    /// The requested block range was invalid (`to < from`).
    #[error("invalid range: to ({to}) must be >= from ({from})")]
    InvalidRange { from: u64, to: u64 },

    /// Network-related error occurred while querying the parent chain.
    #[error("network error: {0}")]
    Network(String),

    /// RPC call failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The queried block could not be found (e.g. pruned or not-yet-reorged-to).
    #[error("header not found: {0}")]
    HeaderNotFound(u64),

    /// Other unspecified error.
    #[error(transparent)]
    Other(#[from] eyre::Error),
}

impl SequencerInboxError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }
}
