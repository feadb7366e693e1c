//! Transaction and receipt details returned by the [`crate::ChainClient`].

use alloy_primitives::{Address, B256, Bytes, U256};

/// A transaction as known to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    /// The transaction hash.
    pub hash: B256,
    /// The sender.
    pub from: Address,
    /// The recipient, `None` for contract creations.
    pub to: Option<Address>,
    /// The transferred value in wei.
    pub value: U256,
    /// The sender nonce.
    pub nonce: u64,
    /// The EIP-2718 transaction type.
    pub tx_type: u8,
    /// The gas limit.
    pub gas_limit: u64,
    /// The legacy gas price, if the transaction carries one.
    pub gas_price: Option<u128>,
    /// The calldata.
    pub input: Bytes,
    /// The including block, `None` while pending.
    pub block_number: Option<u64>,
}

/// A log emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Index of the log in the block.
    pub log_index: Option<u64>,
    /// The emitting contract.
    pub address: Address,
    /// The indexed topics.
    pub topics: Vec<B256>,
    /// The non-indexed data.
    pub data: Bytes,
}

/// The receipt of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptDetails {
    /// The including block.
    pub block_number: Option<u64>,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// The price per gas actually paid.
    pub effective_gas_price: u128,
    /// Whether execution succeeded.
    pub status: bool,
    /// The emitted logs.
    pub logs: Vec<LogEntry>,
}
