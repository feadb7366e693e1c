//! The [`ChainClient`] trait.

use crate::{ChainClientResult, ReceiptDetails, TransactionDetails};
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use chainscope_primitives::ChainBlock;
use std::fmt::Debug;

/// Read-only access to a remote chain node.
///
/// Every method is a suspension point: chain state may advance between two calls, but a block
/// that has been returned never changes. Implementations hold no mutable state and can be
/// shared freely between concurrent requests.
#[async_trait]
pub trait ChainClient: Debug + Send + Sync {
    /// Returns the number of the most recent block.
    async fn latest_block_number(&self) -> ChainClientResult<u64>;

    /// Fetches the block with the given number.
    ///
    /// When `include_transactions` is false the returned [`ChainBlock`] carries transaction
    /// hashes only. Returns `None` if the node does not know the block.
    async fn block(
        &self,
        number: u64,
        include_transactions: bool,
    ) -> ChainClientResult<Option<ChainBlock>>;

    /// Fetches a transaction by hash.
    async fn transaction(&self, hash: B256) -> ChainClientResult<Option<TransactionDetails>>;

    /// Fetches the receipt of a transaction by hash.
    async fn transaction_receipt(&self, hash: B256) -> ChainClientResult<Option<ReceiptDetails>>;

    /// Returns the current gas price in wei.
    async fn gas_price(&self) -> ChainClientResult<u128>;

    /// Returns the balance of `address` at the latest block, in wei.
    async fn balance(&self, address: Address) -> ChainClientResult<U256>;

    /// Executes a read-only contract call and returns the raw return data.
    async fn read_contract_view(&self, address: Address, calldata: Bytes)
    -> ChainClientResult<Bytes>;
}
