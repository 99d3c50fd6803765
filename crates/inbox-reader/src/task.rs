use std::future::Future;
use std::time::Duration;

use inbox_reader_types::traits::{
    AddBatchesOutcome, DelayedBridge, HeaderEvent, HeaderReader, InboxTracker, SequencerInbox,
};
use inbox_reader_types::{DelayedInboxMessage, SequencerInboxBatch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    ctx::ReaderCtx,
    error::Result,
    query,
    reorg::step_back,
    state::{PassState, StreamState},
};

/// Fixed width of each range-scan window, in parent-chain blocks.
const SCAN_WINDOW_BLOCKS: u64 = 100;

/// Delay before retrying after a recoverable pass-level error.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Races `fut` against cancellation. `None` means `cancel` fired first; the caller must
/// stop immediately without acting on any partial result.
async fn cancellable<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        value = fut => Some(value),
    }
}

/// Drives the reader loop until the context is cancelled or the header subscription
/// closes. Spawned as a single long-running task by [`ReaderBuilder::start`](crate::ReaderBuilder::start).
pub(crate) async fn run_reader_loop<TTracker, TDelayed, TSequencer, THeader>(
    ctx: ReaderCtx<TTracker, TDelayed, TSequencer, THeader>,
) where
    TTracker: InboxTracker,
    TDelayed: DelayedBridge,
    TSequencer: SequencerInbox,
    THeader: HeaderReader,
{
    let mut from = match query::next_start_block(ctx.tracker.as_ref(), ctx.first_message_block).await
    {
        Ok(block) => block,
        Err(error) => {
            error!(%error, "reader loop: failed to compute starting block");
            return;
        }
    };

    loop {
        if ctx.cancel.is_cancelled() {
            debug!("reader loop: cancelled");
            return;
        }

        match run_pass(&ctx, from).await {
            Ok(PassOutcome::Shutdown) => {
                debug!("reader loop: header subscription closed");
                return;
            }
            Ok(PassOutcome::Continue { next_from }) => {
                from = next_from;
            }
            Err(error) if error.is_recoverable() => {
                warn!(%error, "reader loop: recoverable error, retrying");
                tokio::select! {
                    _ = ctx.cancel.cancelled() => return,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
            Err(error) => {
                error!(%error, "reader loop: fatal error, exiting");
                return;
            }
        }
    }
}

pub(crate) enum PassOutcome {
    Shutdown,
    Continue { next_from: u64 },
}

/// Runs one pass: pace against parent height, probe both streams for divergence, and if
/// dirty, range-scan and apply until both streams are clean or cancellation occurs.
async fn run_pass<TTracker, TDelayed, TSequencer, THeader>(
    ctx: &ReaderCtx<TTracker, TDelayed, TSequencer, THeader>,
    from: u64,
) -> Result<PassOutcome>
where
    TTracker: InboxTracker,
    TDelayed: DelayedBridge,
    TSequencer: SequencerInbox,
    THeader: HeaderReader,
{
    let min_blocks_to_read = ctx.config.min_blocks_to_read.max(1);
    let needed_height = from + ctx.config.delay_blocks + min_blocks_to_read - 1;

    let Some(height) = wait_for_pacing_height(ctx, needed_height).await? else {
        return Ok(PassOutcome::Shutdown);
    };

    let current_height = if ctx.config.delay_blocks > 0 {
        height
            .saturating_sub(ctx.config.delay_blocks)
            .max(ctx.first_message_block)
    } else {
        height
    };

    let (delayed_state, _chain_delayed_count) = probe_delayed_stream(
        ctx.tracker.as_ref(),
        ctx.delayed_bridge.as_ref(),
        current_height,
        ctx.config.hard_reorg,
    )
    .await?;
    let (sequencer_state, checking_batch_count) = probe_sequencer_stream(
        ctx.tracker.as_ref(),
        ctx.sequencer_inbox.as_ref(),
        current_height,
        ctx.config.hard_reorg,
    )
    .await?;

    let mut pass = PassState {
        delayed: delayed_state,
        sequencer: sequencer_state,
    };

    debug!(delayed = ?pass.delayed, sequencer = ?pass.sequencer, %current_height, %from, "probe complete");

    if !pass.any_dirty() {
        publish_progress(ctx, current_height, checking_batch_count, checking_batch_count);
        return Ok(PassOutcome::Continue {
            next_from: current_height + 1,
        });
    }

    let mut from = from;
    let mut applied_any_batches = false;

    loop {
        if ctx.cancel.is_cancelled() {
            debug!("reader loop: cancelled mid-scan");
            return Ok(PassOutcome::Shutdown);
        }

        if from > current_height {
            pass = pass.promote_missing_to_reorging();
            if pass.any_dirty() {
                from = current_height;
                continue;
            }
            break;
        }

        let to = (from + SCAN_WINDOW_BLOCKS).min(current_height);
        let scanned_to_current_height = to == current_height;

        let Some(delayed_msgs) =
            cancellable(&ctx.cancel, ctx.delayed_bridge.lookup_messages_in_range(from, to)).await
        else {
            return Ok(PassOutcome::Shutdown);
        };
        let delayed_msgs = delayed_msgs?;

        let Some(batches) =
            cancellable(&ctx.cancel, ctx.sequencer_inbox.lookup_batches_in_range(from, to)).await
        else {
            return Ok(PassOutcome::Shutdown);
        };
        let batches = batches?;

        if scanned_to_current_height {
            ctx.progress.mark_caught_up();
        }

        let (new_sequencer_state, batches_to_apply) = analyze_sequencer_batches(
            ctx.tracker.as_ref(),
            batches,
            pass.sequencer,
            scanned_to_current_height,
        )
        .await?;
        pass.sequencer = new_sequencer_state;

        let (new_delayed_state, messages_to_apply) = analyze_delayed_messages(
            ctx.tracker.as_ref(),
            delayed_msgs,
            pass.delayed,
            scanned_to_current_height,
        )
        .await?;
        pass.delayed = new_delayed_state;

        if !pass.any_dirty() && (!messages_to_apply.is_empty() || !batches_to_apply.is_empty()) {
            if !messages_to_apply.is_empty() {
                let Some(result) =
                    cancellable(&ctx.cancel, ctx.tracker.add_delayed_messages(&messages_to_apply))
                        .await
                else {
                    return Ok(PassOutcome::Shutdown);
                };
                result?;
            }

            if !batches_to_apply.is_empty() {
                let Some(outcome) = cancellable(
                    &ctx.cancel,
                    ctx.tracker.add_sequencer_batches(&batches_to_apply),
                )
                .await
                else {
                    return Ok(PassOutcome::Shutdown);
                };
                match outcome? {
                    AddBatchesOutcome::Applied => {
                        applied_any_batches = true;
                        let last_batch = batches_to_apply
                            .last()
                            .expect("batches_to_apply checked non-empty above");
                        let last_read_batch_count = last_batch.sequence_number + 1;
                        info!(%to, %last_read_batch_count, "applied sequencer batches");
                        publish_progress(ctx, to, last_read_batch_count, checking_batch_count);
                    }
                    AddBatchesOutcome::DelayedMessagesMismatch => {
                        warn!("sequencer batch apply reported delayed-messages shortfall");
                        pass.delayed = StreamState::Reorging;
                    }
                }
            }
        }

        if pass.any_dirty() {
            from = step_back(from, ctx.config.reorg_step_blocks, ctx.first_message_block)?;
        } else {
            from = to + 1;
            if from > current_height {
                break;
            }
        }
    }

    if !applied_any_batches {
        publish_progress(ctx, current_height, checking_batch_count, checking_batch_count);
    }

    Ok(PassOutcome::Continue { next_from: from })
}

/// Waits until the parent chain has advanced to `needed_height`, or the `check_delay`
/// timer fires (in which case the current height is used as-is), or cancellation /
/// subscription closure signals shutdown (`Ok(None)`).
async fn wait_for_pacing_height<TTracker, TDelayed, TSequencer, THeader>(
    ctx: &ReaderCtx<TTracker, TDelayed, TSequencer, THeader>,
    needed_height: u64,
) -> Result<Option<u64>>
where
    THeader: HeaderReader,
{
    let mut subscription = ctx.header_reader.subscribe();

    loop {
        let latest = ctx.header_reader.last_header().await?;
        if latest.number >= needed_height {
            return Ok(Some(latest.number));
        }

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Ok(None),
            event = subscription.recv() => {
                match event {
                    None => return Ok(None),
                    Some(HeaderEvent::Lagged) => continue,
                    Some(HeaderEvent::Header(_)) => {}
                }
            }
            _ = tokio::time::sleep(ctx.config.check_delay) => {
                return Ok(Some(latest.number));
            }
        }
    }
}

fn publish_progress<TTracker, TDelayed, TSequencer, THeader>(
    ctx: &ReaderCtx<TTracker, TDelayed, TSequencer, THeader>,
    last_read_block: u64,
    last_read_batch_count: u64,
    seen_batch_count: u64,
) {
    ctx.progress.publish_read(last_read_block, last_read_batch_count);
    ctx.progress.publish_seen_batch_count(seen_batch_count);
}

async fn probe_delayed_stream(
    tracker: &impl InboxTracker,
    delayed_bridge: &impl DelayedBridge,
    current_height: u64,
    hard_reorg: bool,
) -> Result<(StreamState, u64)> {
    let chain_count = delayed_bridge.get_message_count(current_height).await?;
    let tracker_count = tracker.get_delayed_count().await?;

    if chain_count > tracker_count {
        return Ok((StreamState::Missing, chain_count));
    }
    if chain_count < tracker_count {
        warn!(%chain_count, %tracker_count, "tracker ahead of parent chain view (delayed)");
        if hard_reorg {
            tracker.reorg_delayed_to(chain_count).await?;
        }
        return Ok((StreamState::Clean, chain_count));
    }
    if tracker_count == 0 {
        return Ok((StreamState::Clean, chain_count));
    }

    let last = tracker_count - 1;
    let chain_acc = delayed_bridge.get_accumulator(last, current_height).await?;
    let tracker_acc = tracker.get_delayed_acc(last).await?;
    if chain_acc != tracker_acc {
        warn!(seq_num = %last, "delayed accumulator mismatch; reorg detected");
        return Ok((StreamState::Reorging, chain_count));
    }
    Ok((StreamState::Clean, chain_count))
}

async fn probe_sequencer_stream(
    tracker: &impl InboxTracker,
    sequencer_inbox: &impl SequencerInbox,
    current_height: u64,
    hard_reorg: bool,
) -> Result<(StreamState, u64)> {
    let chain_count = sequencer_inbox.get_batch_count(current_height).await?;
    let tracker_count = tracker.get_batch_count().await?;

    if chain_count > tracker_count {
        return Ok((StreamState::Missing, chain_count));
    }
    if chain_count < tracker_count {
        warn!(%chain_count, %tracker_count, "tracker ahead of parent chain view (sequencer)");
        if hard_reorg {
            tracker.reorg_batches_to(chain_count).await?;
        }
        return Ok((StreamState::Clean, chain_count));
    }
    if tracker_count == 0 {
        return Ok((StreamState::Clean, chain_count));
    }

    let last = tracker_count - 1;
    let chain_acc = sequencer_inbox.get_accumulator(last, current_height).await?;
    let tracker_acc = tracker.get_batch_acc(last).await?;
    if chain_acc != tracker_acc {
        warn!(seq_num = %last, "sequencer accumulator mismatch; reorg detected");
        return Ok((StreamState::Reorging, chain_count));
    }
    Ok((StreamState::Clean, chain_count))
}

/// Verifies the returned batches chain onto the tracker and skips any already-applied
/// entries from the front, returning the remaining suffix to apply.
async fn analyze_sequencer_batches(
    tracker: &impl InboxTracker,
    batches: Vec<SequencerInboxBatch>,
    state: StreamState,
    scanned_to_current_height: bool,
) -> Result<(StreamState, Vec<SequencerInboxBatch>)> {
    let Some(first) = batches.first() else {
        let new_state = if state == StreamState::Missing && scanned_to_current_height {
            StreamState::Reorging
        } else {
            state
        };
        return Ok((new_state, Vec::new()));
    };

    if first.sequence_number > 0 {
        let tip_acc = tracker.get_batch_acc(first.sequence_number - 1).await?;
        if tip_acc != Some(first.before_inbox_acc) {
            return Ok((StreamState::Reorging, Vec::new()));
        }
    }

    let mut skip = 0;
    for batch in &batches {
        match tracker.get_batch_acc(batch.sequence_number).await? {
            Some(acc) if acc == batch.after_inbox_acc => skip += 1,
            _ => break,
        }
    }

    Ok((StreamState::Clean, batches[skip..].to_vec()))
}

/// Symmetric to [`analyze_sequencer_batches`] for the delayed-message stream.
async fn analyze_delayed_messages(
    tracker: &impl InboxTracker,
    messages: Vec<DelayedInboxMessage>,
    state: StreamState,
    scanned_to_current_height: bool,
) -> Result<(StreamState, Vec<DelayedInboxMessage>)> {
    let Some(first) = messages.first() else {
        let new_state = if state == StreamState::Missing && scanned_to_current_height {
            StreamState::Reorging
        } else {
            state
        };
        return Ok((new_state, Vec::new()));
    };

    if first.header.seq_num > 0 {
        let tip_acc = tracker.get_delayed_acc(first.header.seq_num - 1).await?;
        if tip_acc != Some(first.before_inbox_acc) {
            return Ok((StreamState::Reorging, Vec::new()));
        }
    }

    let mut skip = 0;
    for message in &messages {
        let expected_acc = tracker.get_delayed_acc(message.header.seq_num).await?;
        match expected_acc {
            Some(_) => skip += 1,
            None => break,
        }
    }

    Ok((StreamState::Clean, messages[skip..].to_vec()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use inbox_reader_types::fixtures::{
        delayed_chain_tip_acc, make_batch_chain, make_delayed_chain, InMemoryInboxTracker,
    };
    use inbox_reader_types::traits::{HeaderSubscription, MockDelayedBridge, MockHeaderReader, MockSequencerInbox};
    use inbox_reader_types::{Hash, L1Header, ReaderConfig, SequencerInboxBatch};
    use bytes::Bytes;
    use tokio::sync::broadcast;

    use super::*;
    use crate::progress::ProgressState;

    fn header_reader_at(height: u64) -> MockHeaderReader {
        let mut header_reader = MockHeaderReader::new();
        header_reader
            .expect_last_header()
            .returning(move || Ok(L1Header::new(height, Hash::ZERO)));
        header_reader.expect_subscribe().returning(|| {
            let (_tx, rx) = broadcast::channel(1);
            HeaderSubscription::new(rx)
        });
        header_reader
    }

    fn test_ctx<TTracker, TDelayed, TSequencer, THeader>(
        tracker: TTracker,
        delayed_bridge: TDelayed,
        sequencer_inbox: TSequencer,
        header_reader: THeader,
        config: ReaderConfig,
        first_message_block: u64,
    ) -> ReaderCtx<TTracker, TDelayed, TSequencer, THeader> {
        ReaderCtx {
            tracker: Arc::new(tracker),
            delayed_bridge: Arc::new(delayed_bridge),
            sequencer_inbox: Arc::new(sequencer_inbox),
            header_reader: Arc::new(header_reader),
            config,
            first_message_block,
            progress: Arc::new(ProgressState::new()),
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn probe_delayed_reports_missing_when_chain_ahead() {
        let tracker = InMemoryInboxTracker::new();
        let mut bridge = MockDelayedBridge::new();
        bridge.expect_get_message_count().returning(|_| Ok(3));

        let (state, count) = probe_delayed_stream(&tracker, &bridge, 100, false).await.unwrap();
        assert_eq!(state, StreamState::Missing);
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn probe_delayed_reports_clean_when_matching() {
        let bodies: &[&[u8]] = &[b"a", b"b"];
        let messages = make_delayed_chain(Hash::ZERO, 10, bodies);
        let tip_acc = delayed_chain_tip_acc(Hash::ZERO, bodies);
        let tracker = InMemoryInboxTracker::new().with_delayed(messages);

        let mut bridge = MockDelayedBridge::new();
        bridge.expect_get_message_count().returning(|_| Ok(2));
        bridge
            .expect_get_accumulator()
            .returning(move |_, _| Ok(Some(tip_acc)));

        let (state, _) = probe_delayed_stream(&tracker, &bridge, 100, false).await.unwrap();
        assert_eq!(state, StreamState::Clean);
    }

    #[tokio::test]
    async fn probe_delayed_reports_reorging_on_accumulator_mismatch() {
        let bodies: &[&[u8]] = &[b"a", b"b"];
        let messages = make_delayed_chain(Hash::ZERO, 10, bodies);
        let tracker = InMemoryInboxTracker::new().with_delayed(messages);

        let mut bridge = MockDelayedBridge::new();
        bridge.expect_get_message_count().returning(|_| Ok(2));
        bridge
            .expect_get_accumulator()
            .returning(|_, _| Ok(Some(Hash::repeat_byte(0xff))));

        let (state, _) = probe_delayed_stream(&tracker, &bridge, 100, false).await.unwrap();
        assert_eq!(state, StreamState::Reorging);
    }

    #[tokio::test]
    async fn analyze_sequencer_batches_skips_already_applied_entries() {
        let bodies: &[&[u8]] = &[b"batch0", b"batch1", b"batch2"];
        let batches = make_batch_chain(Hash::ZERO, 0, 10, bodies);
        let tracker = InMemoryInboxTracker::new().with_batches(batches[..2].to_vec());

        let (state, to_apply) =
            analyze_sequencer_batches(&tracker, batches.clone(), StreamState::Missing, true)
                .await
                .unwrap();

        assert_eq!(state, StreamState::Clean);
        assert_eq!(to_apply.len(), 1);
        assert_eq!(to_apply[0].sequence_number, 2);
    }

    #[tokio::test]
    async fn analyze_sequencer_batches_reorg_when_first_does_not_chain() {
        let bodies: &[&[u8]] = &[b"batch0"];
        let mut batches = make_batch_chain(Hash::ZERO, 5, 10, bodies);
        batches[0].before_inbox_acc = Hash::repeat_byte(0xaa);
        let tracker = InMemoryInboxTracker::new();

        let (state, to_apply) =
            analyze_sequencer_batches(&tracker, batches, StreamState::Missing, true)
                .await
                .unwrap();

        assert_eq!(state, StreamState::Reorging);
        assert!(to_apply.is_empty());
    }

    #[tokio::test]
    async fn analyze_sequencer_batches_promotes_missing_to_reorging_when_empty_at_tip() {
        let tracker = InMemoryInboxTracker::new();
        let (state, to_apply) =
            analyze_sequencer_batches(&tracker, Vec::new(), StreamState::Missing, true)
                .await
                .unwrap();
        assert_eq!(state, StreamState::Reorging);
        assert!(to_apply.is_empty());
    }

    #[tokio::test]
    async fn run_pass_cold_start_applies_all_batches_and_signals_caught_up() {
        let delayed_bodies: &[&[u8]] = &[b"d0", b"d1", b"d2"];
        let delayed_chain = make_delayed_chain(Hash::ZERO, 0, delayed_bodies);
        let delayed_tip = delayed_chain_tip_acc(Hash::ZERO, delayed_bodies);

        let batch_bodies: &[&[u8]] = &[b"batch0", b"batch1", b"batch2"];
        let batches = make_batch_chain(Hash::ZERO, 0, 12, batch_bodies);

        let tracker = InMemoryInboxTracker::new().with_delayed(delayed_chain);

        let mut delayed_bridge = MockDelayedBridge::new();
        delayed_bridge.expect_get_message_count().returning(|_| Ok(3));
        delayed_bridge
            .expect_get_accumulator()
            .returning(move |_, _| Ok(Some(delayed_tip)));
        delayed_bridge
            .expect_lookup_messages_in_range()
            .returning(|_, _| Ok(Vec::new()));

        let mut sequencer_inbox = MockSequencerInbox::new();
        sequencer_inbox.expect_get_batch_count().returning(|_| Ok(3));
        sequencer_inbox
            .expect_lookup_batches_in_range()
            .returning(move |_, _| Ok(batches.clone()));

        let header_reader = header_reader_at(20);
        let ctx = test_ctx(
            tracker,
            delayed_bridge,
            sequencer_inbox,
            header_reader,
            ReaderConfig::for_test(),
            10,
        );
        let mut caught_up = ctx.progress.subscribe_caught_up();

        let outcome = run_pass(&ctx, 10).await.unwrap();
        assert!(matches!(outcome, PassOutcome::Continue { next_from } if next_from == 21));

        assert_eq!(ctx.tracker.get_batch_count().await.unwrap(), 3);
        let snapshot = ctx.progress.snapshot();
        assert_eq!(snapshot.last_read_block, 20);
        assert_eq!(snapshot.last_read_batch_count, 3);
        assert!(*caught_up.borrow_and_update());
    }

    #[tokio::test]
    async fn run_pass_reorg_converges_after_stepping_back() {
        let delayed_bodies: &[&[u8]] = &[b"d0", b"d1", b"d2", b"d3", b"d4"];
        let delayed_chain = make_delayed_chain(Hash::ZERO, 0, delayed_bodies);
        let delayed_tip = delayed_chain_tip_acc(Hash::ZERO, delayed_bodies);

        let batch_bodies: &[&[u8]] = &[b"b0", b"b1", b"b2", b"b3", b"b4"];
        let batches = make_batch_chain(Hash::ZERO, 0, 0, batch_bodies);
        let tracker = InMemoryInboxTracker::new()
            .with_delayed(delayed_chain)
            .with_batches(batches.clone());

        let wrong_acc = Hash::repeat_byte(0xff);
        let corrected_batch4 = SequencerInboxBatch {
            sequence_number: 4,
            before_inbox_acc: batches[3].after_inbox_acc,
            after_inbox_acc: wrong_acc,
            parent_block_number: batches[4].parent_block_number,
            serialized: Bytes::from_static(b"corrected-batch4"),
        };

        let mut delayed_bridge = MockDelayedBridge::new();
        delayed_bridge.expect_get_message_count().returning(|_| Ok(5));
        delayed_bridge
            .expect_get_accumulator()
            .returning(move |_, _| Ok(Some(delayed_tip)));
        delayed_bridge
            .expect_lookup_messages_in_range()
            .returning(|_, _| Ok(Vec::new()));

        let mut sequencer_inbox = MockSequencerInbox::new();
        sequencer_inbox.expect_get_batch_count().returning(|_| Ok(5));
        sequencer_inbox
            .expect_get_accumulator()
            .returning(move |_, _| Ok(Some(wrong_acc)));
        sequencer_inbox
            .expect_lookup_batches_in_range()
            .withf(|from, _to| *from == 90)
            .returning(|_, _| Ok(Vec::new()));
        let corrected = corrected_batch4.clone();
        sequencer_inbox
            .expect_lookup_batches_in_range()
            .withf(|from, _to| *from == 80)
            .returning(move |_, _| Ok(vec![corrected.clone()]));

        let header_reader = header_reader_at(100);
        let ctx = test_ctx(
            tracker,
            delayed_bridge,
            sequencer_inbox,
            header_reader,
            ReaderConfig::for_test(),
            0,
        );

        let outcome = run_pass(&ctx, 90).await.unwrap();
        assert!(matches!(outcome, PassOutcome::Continue { next_from } if next_from == 101));

        assert_eq!(ctx.tracker.get_batch_count().await.unwrap(), 5);
        assert_eq!(ctx.tracker.get_batch_acc(4).await.unwrap(), Some(wrong_acc));
        let snapshot = ctx.progress.snapshot();
        assert_eq!(snapshot.last_read_block, 100);
        assert_eq!(snapshot.last_read_batch_count, 5);
    }

    #[tokio::test]
    async fn run_pass_hard_reorg_truncates_tracker_to_chain_view() {
        let batch_bodies: &[&[u8]] = &[b"b0", b"b1", b"b2", b"b3", b"b4", b"b5", b"b6", b"b7", b"b8", b"b9"];
        let batches = make_batch_chain(Hash::ZERO, 0, 0, batch_bodies);
        let tracker = InMemoryInboxTracker::new().with_batches(batches);

        let mut delayed_bridge = MockDelayedBridge::new();
        delayed_bridge.expect_get_message_count().returning(|_| Ok(0));

        let mut sequencer_inbox = MockSequencerInbox::new();
        sequencer_inbox.expect_get_batch_count().returning(|_| Ok(7));

        let header_reader = header_reader_at(50);
        let mut config = ReaderConfig::for_test();
        config.hard_reorg = true;
        let ctx = test_ctx(tracker, delayed_bridge, sequencer_inbox, header_reader, config, 0);

        let outcome = run_pass(&ctx, 10).await.unwrap();
        assert!(matches!(outcome, PassOutcome::Continue { next_from } if next_from == 51));

        assert_eq!(ctx.tracker.get_batch_count().await.unwrap(), 7);
        let snapshot = ctx.progress.snapshot();
        assert_eq!(snapshot.last_read_block, 50);
        assert_eq!(snapshot.last_read_batch_count, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn run_pass_stalled_parent_chain_proceeds_via_check_delay_timer() {
        let tracker = InMemoryInboxTracker::new();

        let mut delayed_bridge = MockDelayedBridge::new();
        delayed_bridge.expect_get_message_count().returning(|_| Ok(0));

        let mut sequencer_inbox = MockSequencerInbox::new();
        sequencer_inbox.expect_get_batch_count().returning(|_| Ok(0));

        let (_tx, rx) = broadcast::channel(1);
        let mut header_reader = MockHeaderReader::new();
        header_reader
            .expect_last_header()
            .returning(|| Ok(L1Header::new(5, Hash::ZERO)));
        header_reader
            .expect_subscribe()
            .return_once(move || HeaderSubscription::new(rx));

        let ctx = test_ctx(
            tracker,
            delayed_bridge,
            sequencer_inbox,
            header_reader,
            ReaderConfig::for_test(),
            0,
        );

        let outcome = run_pass(&ctx, 10).await.unwrap();
        assert!(matches!(outcome, PassOutcome::Continue { next_from } if next_from == 6));

        let snapshot = ctx.progress.snapshot();
        assert_eq!(snapshot.last_read_block, 5);
        assert_eq!(snapshot.last_read_batch_count, 0);
    }

    #[tokio::test]
    async fn run_pass_returns_shutdown_when_cancelled_mid_scan() {
        let tracker = InMemoryInboxTracker::new();

        let mut delayed_bridge = MockDelayedBridge::new();
        delayed_bridge.expect_get_message_count().returning(|_| Ok(0));
        delayed_bridge
            .expect_lookup_messages_in_range()
            .returning(|_, _| Ok(Vec::new()));

        let mut sequencer_inbox = MockSequencerInbox::new();
        sequencer_inbox.expect_get_batch_count().returning(|_| Ok(1));
        sequencer_inbox
            .expect_lookup_batches_in_range()
            .returning(|_, _| Ok(Vec::new()));

        let header_reader = header_reader_at(20);
        let ctx = test_ctx(
            tracker,
            delayed_bridge,
            sequencer_inbox,
            header_reader,
            ReaderConfig::for_test(),
            0,
        );
        ctx.cancel.cancel();

        let outcome = run_pass(&ctx, 10).await.unwrap();
        assert!(matches!(outcome, PassOutcome::Shutdown));
    }
}
