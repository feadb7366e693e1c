//! The latest blocks overview.

use crate::{BackwardScanner, ScanBudget, ScanResult, StartBlock};
use chainscope_client::ChainClient;
use chainscope_primitives::{BlockRef, TransactionRef};
use serde::Serialize;
use std::num::{NonZeroU64, NonZeroUsize};

/// Number of blocks listed by the overview.
pub const OVERVIEW_BLOCKS: NonZeroUsize = NonZeroUsize::new(20).unwrap();

/// Number of transactions listed by the overview.
pub const OVERVIEW_TXS: NonZeroUsize = NonZeroUsize::new(20).unwrap();

/// Upper bound of blocks scanned for the overview transactions.
pub const OVERVIEW_MAX_SCAN_BLOCKS: NonZeroU64 = NonZeroU64::new(500).unwrap();

/// Throughput figures over the listed blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStats {
    /// Number of blocks in the window.
    pub blocks_count: usize,
    /// Seconds between the oldest and newest block, at least one.
    pub time_window_sec: u64,
    /// Transactions across the window.
    pub txs_total: u64,
    /// Average seconds per block, zero for a single block.
    pub avg_block_time_sec: f64,
    /// Transactions per second over the window.
    pub tps: f64,
}

impl BlockStats {
    /// Computes the stats of `blocks`, given newest first.
    pub fn from_blocks(blocks: &[BlockRef]) -> Self {
        let (newest, oldest) = match (blocks.first(), blocks.last()) {
            (Some(newest), Some(oldest)) => (newest.timestamp, oldest.timestamp),
            _ => (0, 0),
        };
        let time_window_sec = newest.saturating_sub(oldest).max(1);
        let txs_total = blocks.iter().map(|b| b.transaction_count as u64).sum::<u64>();
        let avg_block_time_sec = if blocks.len() > 1 {
            time_window_sec as f64 / (blocks.len() - 1) as f64
        } else {
            0.0
        };
        Self {
            blocks_count: blocks.len(),
            time_window_sec,
            txs_total,
            avg_block_time_sec,
            tps: txs_total as f64 / time_window_sec as f64,
        }
    }
}

/// The latest blocks and transactions of the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestOverview {
    /// The chain head.
    #[serde(with = "chainscope_primitives::serde_str::u64_dec")]
    pub latest: u64,
    /// Throughput over `blocks`.
    pub stats: BlockStats,
    /// The latest blocks, newest first.
    pub blocks: Vec<BlockRef>,
    /// The latest transactions, newest first.
    pub latest_txs: Vec<TransactionRef>,
}

/// Builds the [`LatestOverview`] anchored at a single chain head.
pub async fn latest_overview<C: ChainClient>(
    scanner: &BackwardScanner<C>,
) -> ScanResult<LatestOverview> {
    let latest = scanner.resolve(StartBlock::Head).await?;
    let blocks = scanner.list_blocks(StartBlock::At(latest), OVERVIEW_BLOCKS).await?.items;
    let txs = scanner
        .scan(
            StartBlock::At(latest),
            |_, _| true,
            ScanBudget::new(OVERVIEW_MAX_SCAN_BLOCKS, OVERVIEW_TXS),
        )
        .await?;

    Ok(LatestOverview {
        latest,
        stats: BlockStats::from_blocks(&blocks),
        blocks,
        latest_txs: txs.items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use chainscope_client::test_utils::{
        BLOCK_TIME, MockChainClient, MockChainStorage, fixture_address, fixture_block,
    };
    use std::sync::Arc;

    #[test]
    fn test_stats_single_block() {
        let stats = BlockStats::from_blocks(&[BlockRef::new(5, B256::ZERO, 100, 4)]);
        assert_eq!(stats.time_window_sec, 1);
        assert_eq!(stats.avg_block_time_sec, 0.0);
        assert_eq!(stats.tps, 4.0);
    }

    #[tokio::test]
    async fn test_latest_overview() {
        let a = fixture_address(1);
        let storage = MockChainStorage::with_empty_chain(30)
            .with_block(fixture_block(30, &[(a, None), (a, None)]))
            .with_block(fixture_block(2, &[(a, None)]));
        let scanner = BackwardScanner::batched(Arc::new(MockChainClient::new(storage)));

        let overview = latest_overview(&scanner).await.unwrap();
        assert_eq!(overview.latest, 30);
        assert_eq!(overview.blocks.len(), 20);
        assert_eq!(overview.blocks[0].number, 30);
        assert_eq!(overview.blocks[19].number, 11);
        assert_eq!(overview.stats.txs_total, 2);
        assert_eq!(overview.stats.time_window_sec, 19 * BLOCK_TIME);
        assert_eq!(overview.stats.avg_block_time_sec, BLOCK_TIME as f64);
        assert_eq!(overview.latest_txs.len(), 3);
        assert_eq!(overview.latest_txs[2].block_number, 2);

        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["latest"], "30");
        assert_eq!(json["blocks"][0]["txCount"], 2);
        assert_eq!(json["stats"]["blocksCount"], 20);
    }
}
