use bytes::Bytes;

use crate::Hash;

/// A batch posted by the sequencer to the parent chain.
///
/// `before_inbox_acc` must chain onto the previous batch's `after_inbox_acc`; `serialized`
/// is the batch payload as it appeared in the parent-chain transaction, returned verbatim
/// by [`InboxReader::get_sequencer_message_bytes`](crate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerInboxBatch {
    pub sequence_number: u64,
    pub before_inbox_acc: Hash,
    pub after_inbox_acc: Hash,
    pub parent_block_number: u64,
    pub serialized: Bytes,
}

/// Stored metadata the tracker keeps per batch, sufficient to re-fetch the batch's raw
/// bytes from the Sequencer Inbox on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchMetadata {
    pub l1_block: u64,
}
