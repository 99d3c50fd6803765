//! Data model and external-collaborator interfaces for the inbox reader.
//!
//! This crate carries no logic of its own beyond simple accessors: it exists so the
//! reader loop and its collaborators (delayed bridge, sequencer inbox, inbox tracker,
//! header reader) can be defined, mocked, and tested independently of one another.

mod types;

pub mod traits;

#[cfg(feature = "test-utils")]
pub mod fixtures;

pub use types::{
    parse_init_message, BatchMetadata, ChainId, DelayedInboxMessage, DelayedMessageHeader,
    InitMessage, InitMessageError, L1Header, ReaderConfig, SequencerInboxBatch,
};

/// Hash type used for inbox accumulators and block hashes.
pub type Hash = alloy_primitives::B256;
