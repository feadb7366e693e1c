//! The backward block scanning engine.

use crate::{DEFAULT_BATCH_SIZE, Metrics, ScanBudget, ScanError, ScanResult, StartBlock};
use chainscope_client::ChainClient;
use chainscope_primitives::{BlockRef, ChainBlock, TransactionRef};
use futures::future::try_join_all;
use serde::Serialize;
use std::{
    num::{NonZeroU64, NonZeroUsize},
    ops::ControlFlow,
    sync::Arc,
};

/// One page of scan results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage<T> {
    /// The matches, newest first.
    pub items: Vec<T>,
    /// The block to resume from, `None` once block 0 has been processed.
    pub next_cursor: Option<u64>,
    /// The number of blocks processed.
    pub blocks_visited: u64,
    /// The block the scan started from.
    pub start_block: u64,
}

/// One page of block headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPage {
    /// The headers, newest first.
    pub items: Vec<BlockRef>,
    /// The block to resume from, `None` once block 0 has been listed.
    #[serde(with = "chainscope_primitives::serde_str::opt_u64_dec")]
    pub next_cursor: Option<u64>,
}

/// Where a walk stopped.
#[derive(Debug, Clone, Copy)]
struct WalkOutcome {
    start_block: u64,
    next_cursor: Option<u64>,
    blocks_visited: u64,
}

/// Walks the chain from a start block towards genesis.
///
/// Blocks are processed in strictly decreasing order and each block at most once. With a batch
/// size above one, contiguous blocks are fetched concurrently and processed newest first; blocks
/// of a batch after the one that ended the walk are dropped without being counted.
#[derive(Debug)]
pub struct BackwardScanner<C> {
    client: Arc<C>,
    batch_size: NonZeroUsize,
}

impl<C> Clone for BackwardScanner<C> {
    fn clone(&self) -> Self {
        Self { client: Arc::clone(&self.client), batch_size: self.batch_size }
    }
}

impl<C: ChainClient> BackwardScanner<C> {
    /// Creates a sequential scanner.
    pub const fn new(client: Arc<C>) -> Self {
        Self { client, batch_size: NonZeroUsize::MIN }
    }

    /// Creates a scanner fetching [`DEFAULT_BATCH_SIZE`] blocks at a time.
    pub fn batched(client: Arc<C>) -> Self {
        Self::new(client).with_batch_size(DEFAULT_BATCH_SIZE)
    }

    /// Sets the number of blocks fetched concurrently. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = NonZeroUsize::new(batch_size).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Resolves a [`StartBlock`] to a block number.
    pub async fn resolve(&self, start: StartBlock) -> ScanResult<u64> {
        match start {
            StartBlock::Head => Ok(self.client.latest_block_number().await?),
            StartBlock::At(number) => Ok(number),
        }
    }

    /// Scans backwards for transactions accepted by `predicate`.
    ///
    /// Transactions of a block are visited from the last index to the first. The scan stops
    /// inside a block as soon as the target is reached, and the remaining transactions of that
    /// block are not revisited by a resumed scan.
    pub async fn scan<P>(
        &self,
        start: StartBlock,
        predicate: P,
        budget: ScanBudget,
    ) -> ScanResult<ScanPage<TransactionRef>>
    where
        P: Fn(&BlockRef, &TransactionRef) -> bool + Send + Sync,
    {
        let target = budget.target_match_count.get();
        let mut items = Vec::with_capacity(target);
        let outcome = self
            .walk(start, true, budget.max_blocks_to_scan, |block| {
                for summary in block.transactions.iter().rev() {
                    let tx = TransactionRef::from_summary(&block.header, summary);
                    if predicate(&block.header, &tx) {
                        items.push(tx);
                        if items.len() == target {
                            return ControlFlow::Break(());
                        }
                    }
                }
                ControlFlow::Continue(())
            })
            .await?;

        metrics::counter!(Metrics::MATCHES).increment(items.len() as u64);
        debug!(
            target: "scanner",
            start = outcome.start_block,
            visited = outcome.blocks_visited,
            matches = items.len(),
            next = ?outcome.next_cursor,
            "Scan finished"
        );
        Ok(ScanPage {
            items,
            next_cursor: outcome.next_cursor,
            blocks_visited: outcome.blocks_visited,
            start_block: outcome.start_block,
        })
    }

    /// Lists up to `count` block headers, newest first.
    pub async fn list_blocks(&self, start: StartBlock, count: NonZeroUsize) -> ScanResult<BlockPage> {
        let max_blocks = NonZeroU64::new(count.get() as u64).unwrap_or(NonZeroU64::MIN);
        let mut items = Vec::with_capacity(count.get());
        let outcome = self
            .walk(start, false, max_blocks, |block| {
                items.push(block.header);
                ControlFlow::Continue(())
            })
            .await?;
        Ok(BlockPage { items, next_cursor: outcome.next_cursor })
    }

    async fn walk<F>(
        &self,
        start: StartBlock,
        include_transactions: bool,
        max_blocks: NonZeroU64,
        mut visit: F,
    ) -> ScanResult<WalkOutcome>
    where
        F: FnMut(&ChainBlock) -> ControlFlow<()> + Send,
    {
        let start_block = self.resolve(start).await?;
        let max_blocks = max_blocks.get();
        let mut cursor = Some(start_block);
        let mut blocks_visited = 0u64;

        'walk: while let Some(top) = cursor {
            if blocks_visited >= max_blocks {
                break;
            }
            let count = (self.batch_size.get() as u64)
                .min(max_blocks - blocks_visited)
                .min(top.saturating_add(1));
            let blocks = self.fetch_range(top, count, include_transactions).await?;

            for block in &blocks {
                blocks_visited += 1;
                cursor = block.number().checked_sub(1);
                metrics::counter!(Metrics::BLOCKS_VISITED).increment(1);
                if visit(block).is_break() {
                    break 'walk;
                }
            }
        }

        Ok(WalkOutcome { start_block, next_cursor: cursor, blocks_visited })
    }

    /// Fetches `count` blocks from `top` downwards, concurrently, preserving order.
    async fn fetch_range(
        &self,
        top: u64,
        count: u64,
        include_transactions: bool,
    ) -> ScanResult<Vec<ChainBlock>> {
        trace!(target: "scanner", top, count, "Fetching block range");
        let fetches = (0..count).map(|offset| {
            let number = top - offset;
            async move {
                match self.client.block(number, include_transactions).await {
                    Ok(Some(block)) => Ok(block),
                    Ok(None) => Err(ScanError::BlockNotFound(number)),
                    Err(err) => Err(err.into()),
                }
            }
        });
        try_join_all(fetches).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use chainscope_client::test_utils::{
        FailureMode, MockChainClient, MockChainStorage, fixture_address, fixture_block,
        fixture_tx_hash,
    };
    use chainscope_primitives::{Classify, ErrorKind};
    use rstest::rstest;
    use std::time::Duration;

    fn budget(blocks: u64, target: usize) -> ScanBudget {
        ScanBudget::new(NonZeroU64::new(blocks).unwrap(), NonZeroUsize::new(target).unwrap())
    }

    /// A chain of `head + 1` blocks where block `n` carries `n % 4` transactions.
    fn busy_chain(head: u64) -> MockChainStorage {
        let sender = fixture_address(1);
        (0..=head).fold(MockChainStorage::with_empty_chain(head), |storage, n| {
            let transfers: Vec<(Address, Option<Address>)> = (0..(n % 4))
                .map(|i| (sender, Some(fixture_address(100 + i))))
                .collect();
            storage.with_block(fixture_block(n, &transfers))
        })
    }

    fn any(_: &BlockRef, _: &TransactionRef) -> bool {
        true
    }

    #[tokio::test]
    async fn test_scan_order_is_strictly_decreasing() {
        let client = Arc::new(MockChainClient::new(busy_chain(40)));
        let scanner = BackwardScanner::new(Arc::clone(&client));

        let page = scanner.scan(StartBlock::Head, any, budget(30, 50)).await.unwrap();

        let fetched = client.fetched_blocks();
        assert!(fetched.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(fetched.first(), Some(&40));

        for pair in page.items.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.block_number >= b.block_number);
        }
        let block_39: Vec<_> = page.items.iter().filter(|tx| tx.block_number == 39).collect();
        assert_eq!(
            block_39.iter().map(|tx| tx.hash).collect::<Vec<_>>(),
            vec![fixture_tx_hash(39, 2), fixture_tx_hash(39, 1), fixture_tx_hash(39, 0)]
        );
    }

    #[tokio::test]
    async fn test_budget_bounds_blocks() {
        let client = Arc::new(MockChainClient::new(MockChainStorage::with_empty_chain(100)));
        let scanner = BackwardScanner::new(client);

        let page = scanner.scan(StartBlock::At(100), any, budget(10, 5)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.blocks_visited, 10);
        assert_eq!(page.start_block, 100);
        assert_eq!(page.next_cursor, Some(90));
    }

    #[tokio::test]
    async fn test_target_stops_inside_block() {
        let client = Arc::new(MockChainClient::new(busy_chain(20)));
        let scanner = BackwardScanner::new(client);

        // Block 19 carries three transactions, the target is two.
        let page = scanner.scan(StartBlock::At(19), any, budget(100, 2)).await.unwrap();
        assert_eq!(
            page.items.iter().map(|tx| tx.hash).collect::<Vec<_>>(),
            vec![fixture_tx_hash(19, 2), fixture_tx_hash(19, 1)]
        );
        assert_eq!(page.blocks_visited, 1);
        assert_eq!(page.next_cursor, Some(18));
    }

    #[tokio::test]
    async fn test_genesis_exhausts_cursor() {
        let client = Arc::new(MockChainClient::new(MockChainStorage::with_empty_chain(3)));
        let scanner = BackwardScanner::new(client);

        let page = scanner.scan(StartBlock::At(3), any, budget(50, 5)).await.unwrap();
        assert_eq!(page.blocks_visited, 4);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_resume_never_repeats_items() {
        let client = Arc::new(MockChainClient::new(busy_chain(60)));
        let scanner = BackwardScanner::new(client);

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = scanner.scan(cursor.into(), any, budget(7, 4)).await.unwrap();
            if let (Some(prev), Some(next)) = (cursor, page.next_cursor) {
                assert!(next < prev);
            }
            seen.extend(page.items.into_iter().map(|tx| tx.hash));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        let mut deduped = seen.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), seen.len());
    }

    #[rstest]
    #[tokio::test]
    async fn test_batched_equals_sequential(
        #[values(2, 3, 7, 20, 64)] batch_size: usize,
        #[values(1, 4, 9)] target: usize,
    ) {
        let client = Arc::new(MockChainClient::new(busy_chain(80)));
        let sequential = BackwardScanner::new(Arc::clone(&client));
        let batched = BackwardScanner::new(client).with_batch_size(batch_size);

        let mut cursor = Some(80);
        while let Some(start) = cursor {
            let expected =
                sequential.scan(StartBlock::At(start), any, budget(13, target)).await.unwrap();
            let actual =
                batched.scan(StartBlock::At(start), any, budget(13, target)).await.unwrap();
            assert_eq!(actual, expected);
            cursor = expected.next_cursor;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_output_ignores_fetch_latency() {
        let storage = (0..=20u64).fold(busy_chain(20), |storage, n| {
            storage.with_block_latency(n, Duration::from_millis((n * 37) % 11 * 10))
        });
        let client = Arc::new(MockChainClient::new(storage));
        let expected = BackwardScanner::new(Arc::clone(&client))
            .scan(StartBlock::At(20), any, budget(21, 50))
            .await
            .unwrap();
        let actual = BackwardScanner::new(client)
            .with_batch_size(8)
            .scan(StartBlock::At(20), any, budget(21, 50))
            .await
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_batch_respects_remaining_budget() {
        let client = Arc::new(MockChainClient::new(MockChainStorage::with_empty_chain(100)));
        let scanner = BackwardScanner::new(Arc::clone(&client)).with_batch_size(20);

        let page = scanner.scan(StartBlock::At(100), any, budget(5, 1)).await.unwrap();
        assert_eq!(page.blocks_visited, 5);
        assert_eq!(client.fetched_blocks().len(), 5);
    }

    #[tokio::test]
    async fn test_failed_block_aborts_scan() {
        let client = Arc::new(MockChainClient::new(
            busy_chain(10).with_failing_block(7, FailureMode::Gateway),
        ));
        let scanner = BackwardScanner::new(client);

        let err = scanner.scan(StartBlock::At(10), any, budget(10, 50)).await.unwrap_err();
        assert!(matches!(err, ScanError::Client(ref e) if e.is_gateway()));
        assert_eq!(err.kind(), ErrorKind::UpstreamTransient);
    }

    #[tokio::test]
    async fn test_missing_block_is_not_found() {
        let client = Arc::new(MockChainClient::new(busy_chain(10).without_block(8)));
        let scanner = BackwardScanner::new(client).with_batch_size(4);

        let err = scanner.scan(StartBlock::At(10), any, budget(10, 50)).await.unwrap_err();
        assert!(matches!(err, ScanError::BlockNotFound(8)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_blocks() {
        let client = Arc::new(MockChainClient::new(busy_chain(10)));
        let scanner = BackwardScanner::batched(client);

        let page = scanner.list_blocks(StartBlock::Head, NonZeroUsize::new(4).unwrap()).await.unwrap();
        assert_eq!(page.items.iter().map(|b| b.number).collect::<Vec<_>>(), vec![10, 9, 8, 7]);
        assert_eq!(page.items[1].transaction_count, 1);
        assert_eq!(page.next_cursor, Some(6));

        let page = scanner.list_blocks(StartBlock::At(2), NonZeroUsize::new(10).unwrap()).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.next_cursor, None);
    }
}
