use inbox_reader_types::{
    traits::{DelayedBridgeError, HeaderReaderError, InboxTrackerError, SequencerInboxError},
    InitMessageError,
};
use thiserror::Error;

/// Error type for reader loop operations.
///
/// Errors are categorized into:
/// - **Recoverable**: transient failures the loop retries after a short sleep (parent-chain
///   RPC errors, tracker storage I/O).
/// - **Fatal**: surfaced to the caller of [`start`](crate::ReaderBuilder::start) or
///   [`get_sequencer_message_bytes`](crate::ReaderHandle::get_sequencer_message_bytes); the
///   loop itself does not retry these.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The inbox tracker returned an error (recoverable - may be transient storage I/O).
    #[error("inbox tracker error: {0}")]
    Tracker(#[from] InboxTrackerError),

    /// The delayed bridge returned an error (recoverable - network/RPC issues).
    #[error("delayed bridge error: {0}")]
    DelayedBridge(#[from] DelayedBridgeError),

    /// The sequencer inbox returned an error (recoverable - network/RPC issues).
    #[error("sequencer inbox error: {0}")]
    SequencerInbox(#[from] SequencerInboxError),

    /// The header reader returned an error (recoverable - network/RPC issues).
    #[error("header reader error: {0}")]
    HeaderReader(#[from] HeaderReaderError),

    /// The init message's chain-id did not match the configured chain-id. Fatal.
    #[error("init message chain-id mismatch: configured {configured}, found {found}")]
    ChainIdMismatch { configured: u64, found: u64 },

    /// The tracker never reached a positive batch count within the bootstrap poll budget.
    /// Fatal.
    #[error("failed to read init message: tracker batch count never became positive")]
    BootstrapTimeout,

    /// Delayed message #0 failed to parse as the init message. Fatal.
    #[error("failed to parse init message: {0}")]
    InvalidInitMessage(#[from] InitMessageError),

    /// The reorg walker retreated past `first_message_block` without finding agreement
    /// with the parent chain. Fatal: the node cannot proceed from an inconsistent past
    /// beyond available history.
    #[error("cannot look further back than first message block {first_message_block}")]
    ReorgFloor { first_message_block: u64 },

    /// `get_sequencer_message_bytes` was called for a seq_num the tracker / sequencer
    /// inbox has no record of.
    #[error("sequencer batch {0} not found")]
    LookupNotFound(u64),
}

impl ReaderError {
    /// Returns true if the reader loop should log this and retry after a short sleep,
    /// leaving published progress counters untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Tracker(_)
                | Self::DelayedBridge(_)
                | Self::SequencerInbox(_)
                | Self::HeaderReader(_)
        )
    }

    /// Returns true if this error must be surfaced rather than retried.
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

pub(crate) type Result<T> = std::result::Result<T, ReaderError>;
