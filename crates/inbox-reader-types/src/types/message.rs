use bytes::Bytes;

use crate::Hash;

/// Fields identifying a delayed inbox message's position in the parent-chain history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedMessageHeader {
    /// Position of this message in the delayed inbox (0-indexed).
    pub seq_num: u64,
    /// Parent-chain block the message was posted in.
    pub block_number: u64,
    /// Parent-chain block hash the message was posted in.
    pub block_hash: Hash,
    /// Parent-chain block timestamp the message was posted in.
    pub timestamp: u64,
}

/// A message posted to the delayed inbox (deposits, force-inclusions, …).
///
/// `before_inbox_acc` is the delayed-inbox accumulator immediately before this message
/// was appended; chaining it with the message's own contents yields the accumulator
/// after this message, which is what the next message's `before_inbox_acc` must equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedInboxMessage {
    pub header: DelayedMessageHeader,
    pub before_inbox_acc: Hash,
    pub body: Bytes,
}

impl DelayedInboxMessage {
    pub fn seq_num(&self) -> u64 {
        self.header.seq_num
    }
}
