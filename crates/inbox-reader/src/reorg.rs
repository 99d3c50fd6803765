use tracing::{debug, warn};

use crate::error::{ReaderError, Result};

/// Computes the next, earlier block to retry from after divergence was detected at `from`.
///
/// Retreats by `step_blocks` (default 10, see [`ReaderConfig`](inbox_reader_types::ReaderConfig))
/// and floors at `first_message_block`: the reader never has reason to look earlier than the
/// block the chain's first tracked message was posted in. If `from` is already at or below
/// that floor there is nowhere left to retreat to, which means the divergence is not a
/// reorg the reader can resolve on its own.
pub(crate) fn step_back(from: u64, step_blocks: u64, first_message_block: u64) -> Result<u64> {
    if from <= first_message_block {
        warn!(%from, %first_message_block, "reorg walker hit floor");
        return Err(ReaderError::ReorgFloor { first_message_block });
    }

    let retreated = from.saturating_sub(step_blocks).max(first_message_block);
    debug!(%from, %retreated, %step_blocks, "reorg walker stepping back");
    Ok(retreated)
}
