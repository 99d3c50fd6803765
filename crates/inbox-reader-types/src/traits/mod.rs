mod delayed_bridge;
mod header_reader;
mod sequencer_inbox;
mod tracker;

pub use delayed_bridge::{DelayedBridge, DelayedBridgeError};
pub use header_reader::{HeaderEvent, HeaderReader, HeaderReaderError, HeaderSubscription};
pub use sequencer_inbox::{SequencerInbox, SequencerInboxError};
pub use tracker::{AddBatchesOutcome, InboxTracker, InboxTrackerError};

#[cfg(feature = "test-utils")]
pub use delayed_bridge::MockDelayedBridge;
#[cfg(feature = "test-utils")]
pub use header_reader::MockHeaderReader;
#[cfg(feature = "test-utils")]
pub use sequencer_inbox::MockSequencerInbox;
#[cfg(feature = "test-utils")]
pub use tracker::MockInboxTracker;
