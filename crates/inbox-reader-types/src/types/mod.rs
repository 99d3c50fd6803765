mod batch;
mod config;
mod header;
mod init;
mod message;

pub use batch::{BatchMetadata, SequencerInboxBatch};
pub use config::ReaderConfig;
pub use header::L1Header;
pub use init::{parse_init_message, ChainId, InitMessage, InitMessageError};
pub use message::{DelayedInboxMessage, DelayedMessageHeader};
