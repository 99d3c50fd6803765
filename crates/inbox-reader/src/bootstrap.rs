use inbox_reader_types::{parse_init_message, traits::InboxTracker, ChainId, ReaderConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{ReaderError, Result};

/// Blocks until the tracker has recorded the init message and its chain-id matches
/// `configured_chain_id`, or fails fatally on timeout / mismatch.
///
/// Runs on the caller's task (not the reader loop's), per the design: other node
/// subsystems must not observe a partially-initialized chain, so `start` doesn't return
/// until this gate passes.
pub(crate) async fn wait_for_init_message(
    tracker: &impl InboxTracker,
    config: &ReaderConfig,
    configured_chain_id: ChainId,
    cancel: &CancellationToken,
) -> Result<()> {
    for attempt in 0..config.bootstrap_poll_attempts {
        if tracker.get_batch_count().await? > 0 {
            let init_message = tracker
                .get_delayed_message(0)
                .await?
                .ok_or(ReaderError::BootstrapTimeout)?;
            let init = parse_init_message(&init_message)?;

            if init.chain_id != configured_chain_id {
                return Err(ReaderError::ChainIdMismatch {
                    configured: configured_chain_id,
                    found: init.chain_id,
                });
            }

            info!(chain_id = %init.chain_id, %attempt, "bootstrap gate passed");
            return Ok(());
        }

        debug!(%attempt, "bootstrap gate: batch count still zero, waiting");

        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(config.bootstrap_poll_interval) => {}
        }
    }

    Err(ReaderError::BootstrapTimeout)
}

#[cfg(test)]
mod tests {
    use inbox_reader_types::fixtures::{make_delayed_chain, InMemoryInboxTracker};

    use super::*;

    fn chain_id_message(chain_id: ChainId) -> inbox_reader_types::DelayedInboxMessage {
        let mut body = chain_id.to_be_bytes().to_vec();
        body.extend_from_slice(b"rest-of-init-payload");
        let mut messages = make_delayed_chain(Default::default(), 0, &[body.as_slice()]);
        messages.remove(0)
    }

    #[tokio::test]
    async fn passes_once_batch_count_positive_and_chain_id_matches() {
        let tracker = InMemoryInboxTracker::new()
            .with_delayed(vec![chain_id_message(7)])
            .with_batches(inbox_reader_types::fixtures::make_batch_chain(
                Default::default(),
                0,
                0,
                &[b"batch0".as_slice()],
            ));

        let config = ReaderConfig::for_test();
        let cancel = CancellationToken::new();
        wait_for_init_message(&tracker, &config, 7, &cancel)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fails_fatally_on_chain_id_mismatch() {
        let tracker = InMemoryInboxTracker::new()
            .with_delayed(vec![chain_id_message(42)])
            .with_batches(inbox_reader_types::fixtures::make_batch_chain(
                Default::default(),
                0,
                0,
                &[b"batch0".as_slice()],
            ));

        let config = ReaderConfig::for_test();
        let cancel = CancellationToken::new();
        let err = wait_for_init_message(&tracker, &config, 1, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReaderError::ChainIdMismatch {
                configured: 1,
                found: 42
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_never_populated() {
        let tracker = InMemoryInboxTracker::new();
        let mut config = ReaderConfig::for_test();
        config.bootstrap_poll_attempts = 3;

        let cancel = CancellationToken::new();
        let err = wait_for_init_message(&tracker, &config, 1, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::BootstrapTimeout));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_returns_cleanly() {
        let tracker = InMemoryInboxTracker::new();
        let config = ReaderConfig::for_test();
        let cancel = CancellationToken::new();
        cancel.cancel();
        wait_for_init_message(&tracker, &config, 1, &cancel)
            .await
            .unwrap();
    }
}
