//! The chain-wide recent transactions feed.

use crate::{BackwardScanner, ScanBudget, ScanResult, StartBlock};
use chainscope_client::ChainClient;
use chainscope_primitives::TransactionRef;
use serde::Serialize;

/// One page of the recent transactions feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPage {
    /// Transactions, newest first, without a direction.
    pub items: Vec<TransactionRef>,
    /// The block to resume from.
    #[serde(rename = "nextCursorBlock", with = "chainscope_primitives::serde_str::opt_u64_dec")]
    pub next_cursor: Option<u64>,
}

/// Returns one page of the most recent transactions of the chain, starting at `cursor` or at
/// the chain head.
pub async fn recent_transactions<C: ChainClient>(
    scanner: &BackwardScanner<C>,
    limit: usize,
    scan_blocks: u64,
    cursor: Option<u64>,
) -> ScanResult<RecentPage> {
    let budget = ScanBudget::clamped(scan_blocks, limit);
    let page = scanner.scan(StartBlock::from(cursor), |_, _| true, budget).await?;
    Ok(RecentPage { items: page.items, next_cursor: page.next_cursor })
}
