//! Block level references.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A reference to a block that has been fetched from the chain.
///
/// Block contents are assumed final once fetched, so a [`BlockRef`] is never refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRef {
    /// The block number.
    #[serde(with = "crate::serde_str::u64_dec")]
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The block timestamp in unix seconds.
    pub timestamp: u64,
    /// The number of transactions included in the block.
    #[serde(rename = "txCount")]
    pub transaction_count: usize,
}

impl BlockRef {
    /// Creates a new [`BlockRef`].
    pub const fn new(number: u64, hash: B256, timestamp: u64, transaction_count: usize) -> Self {
        Self { number, hash, timestamp, transaction_count }
    }
}

/// The per-transaction data a block carries when fetched with bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSummary {
    /// The transaction hash.
    pub hash: B256,
    /// The sender.
    pub from: Address,
    /// The recipient, absent for contract creations.
    pub to: Option<Address>,
    /// The transferred value in wei.
    pub value: U256,
}

/// A block as returned by the chain client.
///
/// `transactions` is empty when the block was requested without bodies; the count is still
/// available on the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    /// The block header reference.
    pub header: BlockRef,
    /// The parent block hash.
    pub parent_hash: B256,
    /// The transaction hashes in block order.
    pub transaction_hashes: Vec<B256>,
    /// Transaction bodies in block order, if requested.
    pub transactions: Vec<TransactionSummary>,
}

impl ChainBlock {
    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.header.number
    }
}
