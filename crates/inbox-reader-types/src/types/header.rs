use crate::Hash;

/// A snapshot of a parent-chain block header, as seen by the [`HeaderReader`](crate::traits::HeaderReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1Header {
    /// Parent-chain block number.
    pub number: u64,
    /// Parent-chain block hash.
    pub hash: Hash,
}

impl L1Header {
    pub fn new(number: u64, hash: Hash) -> Self {
        Self { number, hash }
    }
}
