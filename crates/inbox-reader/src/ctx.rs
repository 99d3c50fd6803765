use std::sync::Arc;

use inbox_reader_types::ReaderConfig;
use tokio_util::sync::CancellationToken;

use crate::progress::ProgressState;

/// Everything the reader loop needs for the lifetime of a single `start` call: the four
/// external collaborators, static config, and the shared progress-publishing state.
///
/// The chain-id check runs once on the builder's own task, concurrently with the loop
/// this context drives, so it carries no chain-id of its own.
pub(crate) struct ReaderCtx<TTracker, TDelayed, TSequencer, THeader> {
    pub tracker: Arc<TTracker>,
    pub delayed_bridge: Arc<TDelayed>,
    pub sequencer_inbox: Arc<TSequencer>,
    pub header_reader: Arc<THeader>,
    pub config: ReaderConfig,
    pub first_message_block: u64,
    pub progress: Arc<ProgressState>,
    pub cancel: CancellationToken,
}
