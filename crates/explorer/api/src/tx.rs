//! Transaction detail and batch lookups.

use crate::{ApiError, ApiResult};
use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::{SolEvent, sol};
use chainscope_client::{ChainClient, LogEntry, ReceiptDetails, TransactionDetails};
use chainscope_primitives::{format_native, parse_tx_hash, serde_str, wei_to_gwei};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

sol! {
    /// The ERC-20 transfer event. ERC-721 shares the signature with an indexed token id.
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Maximum number of hashes served by one batch request.
pub const MAX_BATCH_HASHES: usize = 50;

/// Fraction digits of the gwei gas price.
const GAS_PRICE_GWEI_DIGITS: usize = 6;

/// Fraction digits of the fee in native units.
const FEE_DIGITS: usize = 12;

/// A log of the transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    /// Index of the log in the block.
    #[serde(with = "serde_str::opt_u64_dec")]
    pub log_index: Option<u64>,
    /// The emitting contract.
    pub address: Address,
    /// The indexed topics.
    pub topics: Vec<B256>,
    /// The non-indexed data.
    pub data: Bytes,
}

impl From<&LogEntry> for LogView {
    fn from(log: &LogEntry) -> Self {
        Self {
            log_index: log.log_index,
            address: log.address,
            topics: log.topics.clone(),
            data: log.data.clone(),
        }
    }
}

/// A token transfer decoded from a `Transfer` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    /// The token contract.
    pub token: Address,
    /// The sender.
    pub from: Address,
    /// The recipient.
    pub to: Address,
    /// The transferred amount in raw token units.
    #[serde(with = "serde_str::u256_dec")]
    pub amount_wei: U256,
}

impl TokenTransfer {
    /// Decodes a transfer from `log`, if it carries the `Transfer` signature and both
    /// indexed addresses.
    ///
    /// Data that does not fit a word decodes to a zero amount.
    pub fn from_log(log: &LogEntry) -> Option<Self> {
        let [signature, from, to, ..] = log.topics.as_slice() else { return None };
        if *signature != Transfer::SIGNATURE_HASH {
            return None;
        }
        Some(Self {
            token: log.address,
            from: Address::from_word(*from),
            to: Address::from_word(*to),
            amount_wei: U256::try_from_be_slice(&log.data).unwrap_or_default(),
        })
    }
}

/// The execution outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Executed successfully.
    Success,
    /// Executed and reverted.
    Reverted,
    /// Not yet included.
    Pending,
}

/// The detail view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    /// The transaction hash.
    pub hash: B256,
    /// The sender.
    pub from: Address,
    /// The recipient, `None` for contract creations.
    pub to: Option<Address>,
    /// The transferred value in wei.
    #[serde(with = "serde_str::u256_dec")]
    pub value_wei: U256,
    /// The sender nonce.
    pub nonce: u64,
    /// The EIP-2718 type.
    #[serde(rename = "type")]
    pub tx_type: u8,
    /// The including block.
    #[serde(with = "serde_str::opt_u64_dec")]
    pub block_number: Option<u64>,
    /// Timestamp of the including block, `None` if it could not be fetched.
    pub timestamp: Option<u64>,
    /// Blocks mined on top of the including block.
    pub confirmations: Option<u64>,
    /// Gas consumed.
    #[serde(with = "serde_str::opt_u64_dec")]
    pub gas_used: Option<u64>,
    /// The gas limit.
    #[serde(with = "serde_str::u64_dec")]
    pub gas_limit: u64,
    /// The gas price declared by the transaction.
    #[serde(with = "serde_str::opt_u256_dec")]
    pub gas_price_wei: Option<U256>,
    /// The gas price actually paid.
    #[serde(with = "serde_str::opt_u256_dec")]
    pub effective_gas_price_wei: Option<U256>,
    /// The effective gas price in gwei.
    pub gas_price_gwei: Option<String>,
    /// The effective gas price in native units.
    pub gas_price_gen: Option<String>,
    /// The fee paid in wei.
    #[serde(with = "serde_str::opt_u256_dec")]
    pub fee_wei: Option<U256>,
    /// The fee paid in native units.
    pub fee_gen: Option<String>,
    /// Length of the calldata in bytes.
    pub input_bytes: usize,
    /// The execution outcome.
    pub status: ExecutionStatus,
    /// Number of emitted logs.
    pub logs_count: usize,
    /// The emitted logs.
    pub logs: Vec<LogView>,
    /// Token transfers decoded from the logs.
    pub token_transfers: Vec<TokenTransfer>,
}

impl TransactionView {
    /// Joins a transaction, its receipt and the chain head.
    ///
    /// The effective gas price falls back to the declared one while the transaction is
    /// pending.
    pub fn new(
        tx: TransactionDetails,
        receipt: Option<&ReceiptDetails>,
        latest: u64,
        timestamp: Option<u64>,
    ) -> Self {
        let block_number = receipt.and_then(|r| r.block_number).or(tx.block_number);
        let gas_used = receipt.map(|r| r.gas_used);
        let gas_price_wei = tx.gas_price.map(U256::from);
        let effective_gas_price_wei =
            receipt.map(|r| U256::from(r.effective_gas_price)).or(gas_price_wei);
        let fee_wei =
            gas_used.zip(effective_gas_price_wei).map(|(gas, price)| price * U256::from(gas));
        let logs = receipt.map(|r| r.logs.as_slice()).unwrap_or_default();
        let status = match receipt {
            Some(r) if r.status => ExecutionStatus::Success,
            Some(_) => ExecutionStatus::Reverted,
            None => ExecutionStatus::Pending,
        };

        Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            value_wei: tx.value,
            nonce: tx.nonce,
            tx_type: tx.tx_type,
            block_number,
            timestamp,
            confirmations: block_number.map(|n| latest.saturating_sub(n)),
            gas_used,
            gas_limit: tx.gas_limit,
            gas_price_wei,
            effective_gas_price_wei,
            gas_price_gwei: effective_gas_price_wei.map(|p| wei_to_gwei(p, GAS_PRICE_GWEI_DIGITS)),
            gas_price_gen: effective_gas_price_wei.map(|p| format_native(p, 18)),
            fee_wei,
            fee_gen: fee_wei.map(|fee| format_native(fee, FEE_DIGITS)),
            input_bytes: tx.input.len(),
            status,
            logs_count: logs.len(),
            logs: logs.iter().map(LogView::from).collect(),
            token_transfers: logs.iter().filter_map(TokenTransfer::from_log).collect(),
        }
    }
}

/// Looks up the detail view of the transaction `hash`.
pub async fn transaction_detail<C: ChainClient>(
    client: &C,
    hash: &str,
) -> ApiResult<TransactionView> {
    let hash = parse_tx_hash(hash)?;
    let (tx, receipt, latest) = futures::try_join!(
        client.transaction(hash),
        client.transaction_receipt(hash),
        client.latest_block_number(),
    )?;
    let tx = tx.ok_or(ApiError::NotFound("Transaction"))?;

    let block_number = receipt.as_ref().and_then(|r| r.block_number).or(tx.block_number);
    let timestamp = match block_number {
        Some(number) => match client.block(number, false).await {
            Ok(block) => block.map(|b| b.header.timestamp),
            Err(err) => {
                debug!(target: "api", %hash, number, %err, "Block timestamp unavailable");
                None
            }
        },
        None => None,
    };

    Ok(TransactionView::new(tx, receipt.as_ref(), latest, timestamp))
}

/// The body of a batch lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequest {
    /// The requested hashes. Entries that are not well formed hashes are ignored.
    #[serde(default)]
    pub hashes: Vec<Value>,
}

impl BatchRequest {
    /// Returns the well formed hashes, trimmed, in request order and capped at
    /// [`MAX_BATCH_HASHES`].
    pub fn valid_hashes(&self) -> Vec<B256> {
        self.hashes
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|h| parse_tx_hash(h).ok())
            .take(MAX_BATCH_HASHES)
            .collect()
    }
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    /// The transaction was found.
    Found {
        /// The transaction hash.
        hash: B256,
        /// The sender.
        from: Address,
        /// The recipient.
        to: Option<Address>,
        /// The transferred value in wei.
        #[serde(with = "serde_str::u256_dec")]
        value: U256,
    },
    /// The lookup failed.
    Failed {
        /// The transaction hash.
        hash: B256,
        /// Why the lookup failed.
        error: String,
    },
}

/// The response of a batch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResponse {
    /// One entry per valid requested hash, in request order.
    pub items: Vec<BatchItem>,
}

/// Looks up the summary of every valid hash in `request` concurrently.
///
/// A failed lookup only fails its own entry.
pub async fn transaction_batch<C: ChainClient>(client: &C, request: &BatchRequest) -> BatchResponse {
    let lookups = request.valid_hashes().into_iter().map(|hash| async move {
        match client.transaction(hash).await {
            Ok(Some(tx)) => BatchItem::Found { hash, from: tx.from, to: tx.to, value: tx.value },
            Ok(None) => BatchItem::Failed { hash, error: "Transaction not found".to_string() },
            Err(err) => BatchItem::Failed { hash, error: err.to_string() },
        }
    });
    BatchResponse { items: join_all(lookups).await }
}
