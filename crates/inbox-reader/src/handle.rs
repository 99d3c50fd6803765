use std::sync::Arc;

use inbox_reader_types::{
    traits::{DelayedBridge, HeaderReader, InboxTracker, SequencerInbox},
    ChainId, ReaderConfig,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    bootstrap::wait_for_init_message,
    ctx::ReaderCtx,
    error::Result,
    progress::ProgressState,
    query,
    task::run_reader_loop,
};

/// Handle to a running reader, exposed to the rest of the node.
#[derive(Debug)]
pub struct ReaderHandle<TTracker, TDelayed> {
    tracker: Arc<TTracker>,
    delayed_bridge: Arc<TDelayed>,
    progress: Arc<ProgressState>,
    delay_blocks: u64,
}

impl<TTracker, TDelayed> ReaderHandle<TTracker, TDelayed>
where
    TTracker: InboxTracker,
{
    /// Access to the inbox tracker, for other node subsystems that read inbox state
    /// directly rather than through the progress counters below.
    pub fn tracker(&self) -> &Arc<TTracker> {
        &self.tracker
    }

    /// Access to the delayed bridge, for callers that need to query it directly.
    pub fn delayed_bridge(&self) -> &Arc<TDelayed> {
        &self.delayed_bridge
    }

    /// Fetches the serialized bytes of a specific sequencer batch.
    pub async fn get_sequencer_message_bytes<TSequencer>(
        &self,
        sequencer_inbox: &TSequencer,
        seq_num: u64,
    ) -> Result<bytes::Bytes>
    where
        TSequencer: SequencerInbox,
    {
        query::sequencer_message_bytes(self.tracker.as_ref(), sequencer_inbox, seq_num).await
    }

    /// Returns `(last_read_block, last_read_batch_count)`.
    pub fn get_last_read_block_and_batch_count(&self) -> (u64, u64) {
        let snapshot = self.progress.snapshot();
        (snapshot.last_read_block, snapshot.last_read_batch_count)
    }

    /// Returns the most recently observed parent-chain batch count, which may be ahead
    /// of `last_read_batch_count` while a reorg is being resolved.
    pub fn get_last_seen_batch_count(&self) -> u64 {
        self.progress.last_seen_batch_count()
    }

    /// Returns the configured `delay_blocks`.
    pub fn get_delay_blocks(&self) -> u64 {
        self.delay_blocks
    }

    /// Subscribes to the one-shot "caught up" signal: fires exactly once, after the first
    /// pass whose scan reaches the parent chain's current height.
    pub fn caught_up_channel(&self) -> watch::Receiver<bool> {
        self.progress.subscribe_caught_up()
    }
}

/// Builder for an [`InboxReader`](crate) reader instance.
#[derive(Debug)]
pub struct ReaderBuilder<TTracker, TDelayed, TSequencer, THeader> {
    tracker: Arc<TTracker>,
    delayed_bridge: Arc<TDelayed>,
    sequencer_inbox: Arc<TSequencer>,
    header_reader: Arc<THeader>,
    chain_id: ChainId,
    first_message_block: u64,
    config: ReaderConfig,
}

impl<TTracker, TDelayed, TSequencer, THeader> ReaderBuilder<TTracker, TDelayed, TSequencer, THeader>
where
    TTracker: InboxTracker + 'static,
    TDelayed: DelayedBridge + 'static,
    TSequencer: SequencerInbox + 'static,
    THeader: HeaderReader + 'static,
{
    /// Creates a new builder with all required collaborators and the node's chain-id.
    pub fn new(
        tracker: Arc<TTracker>,
        delayed_bridge: Arc<TDelayed>,
        sequencer_inbox: Arc<TSequencer>,
        header_reader: Arc<THeader>,
        chain_id: ChainId,
        first_message_block: u64,
    ) -> Self {
        Self {
            tracker,
            delayed_bridge,
            sequencer_inbox,
            header_reader,
            chain_id,
            first_message_block,
            config: ReaderConfig::default(),
        }
    }

    /// Overrides the full configuration at once.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets `delay_blocks`.
    pub fn with_delay_blocks(mut self, v: u64) -> Self {
        self.config.delay_blocks = v;
        self
    }

    /// Sets `check_delay`.
    pub fn with_check_delay(mut self, v: std::time::Duration) -> Self {
        self.config.check_delay = v;
        self
    }

    /// Sets `hard_reorg`.
    pub fn with_hard_reorg(mut self, v: bool) -> Self {
        self.config.hard_reorg = v;
        self
    }

    /// Sets `min_blocks_to_read`.
    pub fn with_min_blocks_to_read(mut self, v: u64) -> Self {
        self.config.min_blocks_to_read = v.max(1);
        self
    }

    /// Sets `reorg_step_blocks`.
    pub fn with_reorg_step_blocks(mut self, v: u64) -> Self {
        self.config.reorg_step_blocks = v;
        self
    }

    /// Spawns the reader loop task and runs the bootstrap gate synchronously, returning
    /// only once the tracker's init message has been validated (or a fatal startup error
    /// occurs).
    pub async fn start(
        self,
        cancel: CancellationToken,
    ) -> Result<ReaderHandle<TTracker, TDelayed>> {
        let progress = Arc::new(ProgressState::new());

        let ctx = ReaderCtx {
            tracker: self.tracker.clone(),
            delayed_bridge: self.delayed_bridge.clone(),
            sequencer_inbox: self.sequencer_inbox,
            header_reader: self.header_reader,
            config: self.config,
            first_message_block: self.first_message_block,
            progress: progress.clone(),
            cancel: cancel.clone(),
        };

        tokio::spawn(run_reader_loop(ctx));

        wait_for_init_message(self.tracker.as_ref(), &self.config, self.chain_id, &cancel).await?;

        Ok(ReaderHandle {
            tracker: self.tracker,
            delayed_bridge: self.delayed_bridge,
            progress,
            delay_blocks: self.config.delay_blocks,
        })
    }
}
