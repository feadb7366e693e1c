//! An in-memory [`ChainClient`] for testing chain consumers.

use crate::{ChainClient, ChainClientError, ChainClientResult, ReceiptDetails, TransactionDetails};
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use chainscope_primitives::{BlockRef, ChainBlock, TransactionSummary};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::RwLock;

/// Timestamp of block zero in the fixture chain.
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// Seconds between two fixture blocks.
pub const BLOCK_TIME: u64 = 2;

/// How an injected failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// An HTML gateway page.
    Gateway,
    /// A transport failure.
    Transport,
    /// A JSON-RPC error response.
    Rpc,
}

impl FailureMode {
    fn to_error(self, what: &str) -> ChainClientError {
        match self {
            Self::Gateway => ChainClientError::Gateway(format!(
                "<!DOCTYPE html><html><body>502 Bad Gateway ({what})</body></html>"
            )),
            Self::Transport => ChainClientError::Transport(format!("connection reset ({what})")),
            Self::Rpc => ChainClientError::Rpc { code: -32000, message: format!("boom ({what})") },
        }
    }
}

/// Storage backing the [`MockChainClient`].
#[derive(Debug, Clone, Default)]
pub struct MockChainStorage {
    /// The chain head.
    pub head: u64,
    /// Blocks by number, always stored with transaction bodies.
    pub blocks: HashMap<u64, ChainBlock>,
    /// Transactions by hash.
    pub transactions: HashMap<B256, TransactionDetails>,
    /// Receipts by transaction hash.
    pub receipts: HashMap<B256, ReceiptDetails>,
    /// Balances by address.
    pub balances: HashMap<Address, U256>,
    /// Contract call return data by target and calldata.
    pub contract_responses: HashMap<(Address, Bytes), Bytes>,
    /// The gas price, `None` makes the call fail.
    pub gas_price: Option<u128>,
    /// Blocks whose fetch fails.
    pub failing_blocks: HashMap<u64, FailureMode>,
    /// Artificial latency per block fetch.
    pub block_latency: HashMap<u64, Duration>,
}

impl MockChainStorage {
    /// Creates a chain of empty blocks `0..=head`.
    pub fn with_empty_chain(head: u64) -> Self {
        let blocks = (0..=head).map(|n| (n, fixture_block(n, &[]))).collect();
        Self { head, blocks, gas_price: Some(1_000_000_000), ..Default::default() }
    }

    /// Inserts a block, replacing any block with the same number.
    pub fn with_block(mut self, block: ChainBlock) -> Self {
        self.head = self.head.max(block.number());
        self.blocks.insert(block.number(), block);
        self
    }

    /// Removes a block so that the node reports it absent.
    pub fn without_block(mut self, number: u64) -> Self {
        self.blocks.remove(&number);
        self
    }

    /// Inserts a transaction and optionally its receipt.
    pub fn with_transaction(
        mut self,
        transaction: TransactionDetails,
        receipt: Option<ReceiptDetails>,
    ) -> Self {
        if let Some(receipt) = receipt {
            self.receipts.insert(transaction.hash, receipt);
        }
        self.transactions.insert(transaction.hash, transaction);
        self
    }

    /// Sets the balance of an address.
    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.balances.insert(address, balance);
        self
    }

    /// Sets the return data of a contract call.
    pub fn with_contract_response(
        mut self,
        address: Address,
        calldata: impl Into<Bytes>,
        output: impl Into<Bytes>,
    ) -> Self {
        self.contract_responses.insert((address, calldata.into()), output.into());
        self
    }

    /// Sets the gas price.
    pub const fn with_gas_price(mut self, gas_price: Option<u128>) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Makes every fetch of `number` fail.
    pub fn with_failing_block(mut self, number: u64, mode: FailureMode) -> Self {
        self.failing_blocks.insert(number, mode);
        self
    }

    /// Delays every fetch of `number`.
    pub fn with_block_latency(mut self, number: u64, latency: Duration) -> Self {
        self.block_latency.insert(number, latency);
        self
    }
}

/// An in-memory [`ChainClient`] that records every block it serves.
#[derive(Debug, Clone, Default)]
pub struct MockChainClient {
    /// The backing storage.
    pub storage: Arc<RwLock<MockChainStorage>>,
    fetch_log: Arc<Mutex<Vec<u64>>>,
}

impl MockChainClient {
    /// Creates a client over the given storage.
    pub fn new(storage: MockChainStorage) -> Self {
        Self { storage: Arc::new(RwLock::new(storage)), fetch_log: Default::default() }
    }

    /// Returns the block numbers fetched so far, in request order.
    pub fn fetched_blocks(&self) -> Vec<u64> {
        self.fetch_log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Advances the head by appending an empty block.
    pub async fn push_empty_block(&self) -> u64 {
        let mut storage = self.storage.write().await;
        let next = storage.head + 1;
        storage.blocks.insert(next, fixture_block(next, &[]));
        storage.head = next;
        next
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn latest_block_number(&self) -> ChainClientResult<u64> {
        Ok(self.storage.read().await.head)
    }

    async fn block(
        &self,
        number: u64,
        include_transactions: bool,
    ) -> ChainClientResult<Option<ChainBlock>> {
        let (latency, failure, block) = {
            let storage = self.storage.read().await;
            (
                storage.block_latency.get(&number).copied(),
                storage.failing_blocks.get(&number).copied(),
                storage.blocks.get(&number).cloned(),
            )
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.fetch_log.lock().unwrap_or_else(|e| e.into_inner()).push(number);
        if let Some(mode) = failure {
            return Err(mode.to_error(&format!("block {number}")));
        }
        Ok(block.map(|mut block| {
            if !include_transactions {
                block.transactions.clear();
            }
            block
        }))
    }

    async fn transaction(&self, hash: B256) -> ChainClientResult<Option<TransactionDetails>> {
        Ok(self.storage.read().await.transactions.get(&hash).cloned())
    }

    async fn transaction_receipt(&self, hash: B256) -> ChainClientResult<Option<ReceiptDetails>> {
        Ok(self.storage.read().await.receipts.get(&hash).cloned())
    }

    async fn gas_price(&self) -> ChainClientResult<u128> {
        self.storage
            .read()
            .await
            .gas_price
            .ok_or_else(|| FailureMode::Rpc.to_error("eth_gasPrice"))
    }

    async fn balance(&self, address: Address) -> ChainClientResult<U256> {
        Ok(self.storage.read().await.balances.get(&address).copied().unwrap_or_default())
    }

    async fn read_contract_view(
        &self,
        address: Address,
        calldata: Bytes,
    ) -> ChainClientResult<Bytes> {
        self.storage
            .read()
            .await
            .contract_responses
            .get(&(address, calldata))
            .cloned()
            .ok_or_else(|| ChainClientError::Rpc {
                code: 3,
                message: "execution reverted".to_string(),
            })
    }
}

/// Returns a deterministic address for a fixture index.
pub fn fixture_address(n: u64) -> Address {
    Address::from_word(B256::from(U256::from(n)))
}

/// Returns a deterministic block hash.
pub fn fixture_block_hash(number: u64) -> B256 {
    B256::from(U256::from(number) | (U256::from(0xb10c_u64) << 200usize))
}

/// Returns a deterministic transaction hash.
pub fn fixture_tx_hash(block: u64, index: usize) -> B256 {
    B256::from((U256::from(block) << 32usize) | U256::from(index) | (U256::from(0x7a_u64) << 200usize))
}

/// Builds a fixture block whose transactions are `(from, to)` pairs, each transferring one wei.
pub fn fixture_block(number: u64, transfers: &[(Address, Option<Address>)]) -> ChainBlock {
    let transactions: Vec<_> = transfers
        .iter()
        .enumerate()
        .map(|(index, (from, to))| TransactionSummary {
            hash: fixture_tx_hash(number, index),
            from: *from,
            to: *to,
            value: U256::from(1),
        })
        .collect();
    ChainBlock {
        header: BlockRef::new(
            number,
            fixture_block_hash(number),
            GENESIS_TIMESTAMP + number * BLOCK_TIME,
            transactions.len(),
        ),
        parent_hash: fixture_block_hash(number.saturating_sub(1)),
        transaction_hashes: transactions.iter().map(|tx| tx.hash).collect(),
        transactions,
    }
}
