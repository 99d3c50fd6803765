use inbox_reader_types::traits::{InboxTracker, SequencerInbox};

use crate::error::{ReaderError, Result};

/// The parent-chain block a pass should resume scanning from.
///
/// If the tracker holds no delayed messages yet, there is nothing to anchor on but the
/// configured starting point. Otherwise resume from the block the last stored delayed
/// message was posted in — never earlier than `first_message_block`, in case a prior
/// reorg truncation left the tracker pointing at something stale.
pub(crate) async fn next_start_block(
    tracker: &impl InboxTracker,
    first_message_block: u64,
) -> Result<u64> {
    let delayed_count = tracker.get_delayed_count().await?;
    if delayed_count == 0 {
        return Ok(first_message_block);
    }

    let last = tracker
        .get_delayed_message(delayed_count - 1)
        .await?
        .ok_or_else(|| {
            ReaderError::Tracker(inbox_reader_types::traits::InboxTrackerError::invariant_violated(
                format!("delayed count {delayed_count} but last message missing"),
            ))
        })?;

    Ok(last.header.block_number.max(first_message_block))
}

/// Fetches the serialized bytes of a specific sequencer batch, for callers outside the
/// reader loop that need to re-derive a batch's payload (e.g. an L2 execution client
/// replaying the sequencer's posted data).
pub(crate) async fn sequencer_message_bytes(
    tracker: &impl InboxTracker,
    sequencer_inbox: &impl SequencerInbox,
    seq_num: u64,
) -> Result<bytes::Bytes> {
    let metadata = tracker
        .get_batch_metadata(seq_num)
        .await?
        .ok_or(ReaderError::LookupNotFound(seq_num))?;

    let batches = sequencer_inbox
        .lookup_batches_in_range(metadata.l1_block, metadata.l1_block)
        .await?;

    batches
        .into_iter()
        .find(|batch| batch.sequence_number == seq_num)
        .map(|batch| batch.serialized)
        .ok_or(ReaderError::LookupNotFound(seq_num))
}

#[cfg(test)]
mod tests {
    use inbox_reader_types::fixtures::InMemoryInboxTracker;
    use inbox_reader_types::traits::MockSequencerInbox;

    use super::*;

    #[tokio::test]
    async fn next_start_block_defaults_to_first_message_block_when_empty() {
        let tracker = InMemoryInboxTracker::new();
        let start = next_start_block(&tracker, 42).await.unwrap();
        assert_eq!(start, 42);
    }

    #[tokio::test]
    async fn next_start_block_uses_last_delayed_message_block() {
        let messages = inbox_reader_types::fixtures::make_delayed_chain(
            Default::default(),
            100,
            &[b"a".as_slice(), b"b".as_slice()],
        );
        let tracker = InMemoryInboxTracker::new().with_delayed(messages);
        let start = next_start_block(&tracker, 10).await.unwrap();
        assert_eq!(start, 101);
    }

    #[tokio::test]
    async fn sequencer_message_bytes_not_found_when_no_metadata() {
        let tracker = InMemoryInboxTracker::new();
        let sequencer_inbox = MockSequencerInbox::new();
        let err = sequencer_message_bytes(&tracker, &sequencer_inbox, 7)
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::LookupNotFound(7)));
    }
}
