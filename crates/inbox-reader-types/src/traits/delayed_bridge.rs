use async_trait::async_trait;
use thiserror::Error;

use crate::{DelayedInboxMessage, Hash};

/// Read-only view of the parent-chain delayed inbox contract, as of a given parent-chain
/// block height.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait DelayedBridge: Send + Sync {
    /// Number of delayed messages posted as of `at_block`.
    async fn get_message_count(&self, at_block: u64) -> Result<u64, DelayedBridgeError>;

    /// Accumulator after the message at `seq_num`, as of `at_block`.
    async fn get_accumulator(
        &self,
        seq_num: u64,
        at_block: u64,
    ) -> Result<Option<Hash>, DelayedBridgeError>;

    /// Delayed messages posted in the inclusive parent-chain block range `[from, to]`.
    async fn lookup_messages_in_range(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<DelayedInboxMessage>, DelayedBridgeError>;
}

/// Errors surfaced by a [`DelayedBridge`] implementation.
#[derive(Debug, Error)]
pub enum DelayedBridgeError {
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

impl DelayedBridgeError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }
}
