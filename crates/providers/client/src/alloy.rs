//! An alloy provider backed [`ChainClient`].

use crate::{
    ChainClient, ChainClientError, ChainClientResult, LogEntry, ReceiptDetails,
    TransactionDetails,
};
use alloy_eips::{BlockNumberOrTag, Typed2718};
use alloy_network_primitives::{ReceiptResponse, TransactionResponse};
use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{Block, Transaction, TransactionInput, TransactionReceipt, TransactionRequest};
use alloy_transport_http::Http;
use async_trait::async_trait;
use chainscope_primitives::{BlockRef, ChainBlock, TransactionSummary};
use std::time::Duration;
use url::Url;

/// Default transport-level timeout for a single HTTP round trip.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);

/// Builder for an [`AlloyChainClient`].
#[derive(Debug, Clone)]
pub struct AlloyChainClientBuilder {
    /// The node JSON-RPC endpoint.
    pub url: Url,
    /// The transport-level timeout of one HTTP round trip.
    pub timeout: Duration,
}

impl AlloyChainClientBuilder {
    /// Creates a new [`AlloyChainClientBuilder`] for the given endpoint.
    pub const fn new(url: Url) -> Self {
        Self { url, timeout: DEFAULT_RPC_TIMEOUT }
    }

    /// Sets the transport-level timeout.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the [`AlloyChainClient`].
    pub fn build(self) -> ChainClientResult<AlloyChainClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ChainClientError::Transport(e.to_string()))?;
        let transport = Http::with_client(http, self.url);
        let client = RpcClient::new(transport, false);
        Ok(AlloyChainClient { provider: RootProvider::new(client) })
    }
}

/// A [`ChainClient`] talking to the node through an alloy [`RootProvider`].
#[derive(Debug, Clone)]
pub struct AlloyChainClient {
    provider: RootProvider,
}

impl AlloyChainClient {
    /// Creates a client over an existing provider.
    pub const fn new(provider: RootProvider) -> Self {
        Self { provider }
    }

    /// Returns the inner provider.
    pub const fn provider(&self) -> &RootProvider {
        &self.provider
    }
}

fn chain_block(block: Block) -> ChainBlock {
    let header = BlockRef::new(
        block.header.number,
        block.header.hash,
        block.header.timestamp,
        block.transactions.len(),
    );
    let transaction_hashes = block.transactions.hashes().collect();
    let transactions = block
        .transactions
        .txns()
        .map(|tx| TransactionSummary {
            hash: TransactionResponse::tx_hash(tx),
            from: TransactionResponse::from(tx),
            to: alloy_consensus::Transaction::to(tx),
            value: alloy_consensus::Transaction::value(tx),
        })
        .collect();
    ChainBlock { header, parent_hash: block.header.parent_hash, transaction_hashes, transactions }
}

fn transaction_details(tx: Transaction) -> TransactionDetails {
    TransactionDetails {
        hash: TransactionResponse::tx_hash(&tx),
        from: TransactionResponse::from(&tx),
        to: alloy_consensus::Transaction::to(&tx),
        value: alloy_consensus::Transaction::value(&tx),
        nonce: alloy_consensus::Transaction::nonce(&tx),
        tx_type: Typed2718::ty(&tx),
        gas_limit: alloy_consensus::Transaction::gas_limit(&tx),
        gas_price: alloy_consensus::Transaction::gas_price(&tx),
        input: alloy_consensus::Transaction::input(&tx).clone(),
        block_number: tx.block_number,
    }
}

fn receipt_details(receipt: TransactionReceipt) -> ReceiptDetails {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| LogEntry {
            log_index: log.log_index,
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
        })
        .collect();
    ReceiptDetails {
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
        status: ReceiptResponse::status(&receipt),
        logs,
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn latest_block_number(&self) -> ChainClientResult<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn block(
        &self,
        number: u64,
        include_transactions: bool,
    ) -> ChainClientResult<Option<ChainBlock>> {
        trace!(target: "chain_client", number, include_transactions, "Fetching block");
        let request = self.provider.get_block_by_number(BlockNumberOrTag::Number(number));
        let block = if include_transactions { request.full().await? } else { request.await? };
        Ok(block.map(chain_block))
    }

    async fn transaction(&self, hash: B256) -> ChainClientResult<Option<TransactionDetails>> {
        Ok(self.provider.get_transaction_by_hash(hash).await?.map(transaction_details))
    }

    async fn transaction_receipt(&self, hash: B256) -> ChainClientResult<Option<ReceiptDetails>> {
        Ok(self.provider.get_transaction_receipt(hash).await?.map(receipt_details))
    }

    async fn gas_price(&self) -> ChainClientResult<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn balance(&self, address: Address) -> ChainClientResult<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn read_contract_view(
        &self,
        address: Address,
        calldata: Bytes,
    ) -> ChainClientResult<Bytes> {
        let request =
            TransactionRequest::default().to(address).input(TransactionInput::new(calldata));
        Ok(self.provider.call(request).await?)
    }
}
