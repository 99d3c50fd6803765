use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::L1Header;

/// A scoped subscription to new parent-chain headers.
///
/// Dropping the subscription releases it from the underlying broadcast channel, matching
/// the "acquired per-pass-group, released on loop exit" lifetime the reader loop needs.
#[derive(Debug)]
pub struct HeaderSubscription {
    rx: broadcast::Receiver<L1Header>,
}

impl HeaderSubscription {
    pub fn new(rx: broadcast::Receiver<L1Header>) -> Self {
        Self { rx }
    }

    /// Waits for the next notification. Returns `None` only when the channel has closed
    /// (shutdown); a lagged subscriber is reported as `Lagged` rather than folded into
    /// shutdown, since the caller should just re-fetch `last_header` and keep going.
    pub async fn recv(&mut self) -> Option<HeaderEvent> {
        match self.rx.recv().await {
            Ok(header) => Some(HeaderEvent::Header(header)),
            Err(broadcast::error::RecvError::Closed) => None,
            Err(broadcast::error::RecvError::Lagged(_)) => Some(HeaderEvent::Lagged),
        }
    }
}

/// Outcome of [`HeaderSubscription::recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEvent {
    /// A new header arrived.
    Header(L1Header),
    /// This subscriber missed one or more headers because it fell behind the broadcast
    /// channel's buffer. The caller should re-fetch `last_header` directly.
    Lagged,
}

/// Parent-chain block-head notifications.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait HeaderReader: Send + Sync {
    /// Returns the current latest parent-chain header.
    async fn last_header(&self) -> Result<L1Header, HeaderReaderError>;

    /// Subscribes to new parent-chain headers from this point forward.
    fn subscribe(&self) -> HeaderSubscription;
}

/// Errors surfaced by a [`HeaderReader`] implementation.
#[derive(Debug, Error)]
pub enum HeaderReaderError {
    /// Network-related error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// RPC call failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Other unspecified error.
    #[error(transparent)]
    Other(#[from] eyre::Error),
}

impl HeaderReaderError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }
}
