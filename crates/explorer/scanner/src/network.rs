//! Network throughput and gas price estimate.

use crate::{ScanError, ScanResult};
use alloy_primitives::U256;
use chainscope_client::ChainClient;
use chainscope_primitives::{BlockRef, wei_to_gwei};
use futures::future::try_join_all;
use serde::Serialize;

/// Fraction digits of gwei figures.
pub const GWEI_DIGITS: usize = 6;

/// The blocks an estimate was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSample {
    /// The sampled block numbers, newest first.
    pub blocks: Vec<String>,
    /// Transaction count per sampled block.
    pub txs: Vec<usize>,
    /// Seconds between the newest and oldest sampled block, at least one.
    pub time_window_sec: u64,
}

/// A snapshot of network activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    /// The chain head.
    #[serde(with = "chainscope_primitives::serde_str::u64_dec")]
    pub latest_block: u64,
    /// Timestamp of the chain head.
    pub latest_block_timestamp: u64,
    /// Average seconds between the sampled blocks.
    pub avg_block_time_sec: f64,
    /// Transactions in the chain head.
    pub latest_block_txs: usize,
    /// Transactions per second over the sample.
    pub tps_estimate: f64,
    /// The gas price in wei, `None` when the node could not report it.
    #[serde(with = "chainscope_primitives::serde_str::opt_u256_dec")]
    pub gas_price_wei: Option<U256>,
    /// The gas price in gwei.
    pub gas_price_gwei: Option<String>,
    /// The sampled blocks.
    pub sample: NetworkSample,
}

/// Estimates block time and throughput from the three latest blocks.
///
/// A failing gas price call only blanks the gas fields.
pub async fn network_stats<C: ChainClient>(client: &C) -> ScanResult<NetworkStats> {
    let latest = client.latest_block_number().await?;
    let numbers = [latest, latest.saturating_sub(1), latest.saturating_sub(2)];
    let blocks: Vec<BlockRef> = try_join_all(numbers.iter().map(|&number| async move {
        match client.block(number, false).await {
            Ok(Some(block)) => Ok(block.header),
            Ok(None) => Err(ScanError::BlockNotFound(number)),
            Err(err) => Err(err.into()),
        }
    }))
    .await?;

    let (t0, t1, t2) = (blocks[0].timestamp, blocks[1].timestamp, blocks[2].timestamp);
    let dt01 = t0.saturating_sub(t1).max(1);
    let dt12 = t1.saturating_sub(t2).max(1);
    let time_window_sec = t0.saturating_sub(t2).max(1);
    let txs: Vec<usize> = blocks.iter().map(|b| b.transaction_count).collect();
    let total_txs: usize = txs.iter().sum();

    let gas_price_wei = match client.gas_price().await {
        Ok(price) => Some(U256::from(price)),
        Err(err) => {
            warn!(target: "scanner", %err, "Gas price unavailable");
            None
        }
    };

    Ok(NetworkStats {
        latest_block: latest,
        latest_block_timestamp: t0,
        avg_block_time_sec: (dt01 + dt12) as f64 / 2.0,
        latest_block_txs: txs[0],
        tps_estimate: total_txs as f64 / time_window_sec as f64,
        gas_price_gwei: gas_price_wei.map(|wei| wei_to_gwei(wei, GWEI_DIGITS)),
        gas_price_wei,
        sample: NetworkSample {
            blocks: numbers.iter().map(u64::to_string).collect(),
            txs,
            time_window_sec,
        },
    })
}
