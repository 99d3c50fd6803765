use thiserror::Error;

use crate::DelayedInboxMessage;

/// Chain identifier carried by the init message (delayed message #0).
pub type ChainId = u64;

/// The decoded contents of the init message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitMessage {
    pub chain_id: ChainId,
}

/// Errors parsing a delayed message as the init message.
#[derive(Debug, Error)]
pub enum InitMessageError {
    /// The message body was too short to contain a chain-id.
    #[error("init message body too short: got {0} bytes, need at least 8")]
    BodyTooShort(usize),
}

/// Parses a delayed message's body as the init message.
///
/// The init message format used here is the minimal one this crate needs to recognize:
/// the first 8 bytes of the body are the big-endian chain-id. A real parent-chain
/// deployment encodes a richer genesis payload (serialized chain config); only the
/// chain-id matters for bootstrap validation, so that's all this decodes.
pub fn parse_init_message(message: &DelayedInboxMessage) -> Result<InitMessage, InitMessageError> {
    let body = &message.body;
    if body.len() < 8 {
        return Err(InitMessageError::BodyTooShort(body.len()));
    }
    let mut chain_id_bytes = [0u8; 8];
    chain_id_bytes.copy_from_slice(&body[..8]);
    Ok(InitMessage {
        chain_id: u64::from_be_bytes(chain_id_bytes),
    })
}
