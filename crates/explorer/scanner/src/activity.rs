//! The per-address activity feed.

use crate::{BackwardScanner, ScanBudget, ScanResult, StartBlock};
use alloy_primitives::Address;
use chainscope_client::ChainClient;
use chainscope_primitives::{Direction, InputError, TransactionRef, parse_address};
use serde::Serialize;
use std::{str::FromStr, sync::Arc};

/// Which transactions of an address the feed returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionFilter {
    /// Both directions.
    #[default]
    Any,
    /// Only transactions received by the address.
    In,
    /// Only transactions sent by the address.
    Out,
}

impl DirectionFilter {
    /// Whether a transaction in `direction` passes the filter.
    pub const fn accepts(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Self::Any, _) | (Self::In, Direction::In) | (Self::Out, Direction::Out)
        )
    }
}

impl FromStr for DirectionFilter {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "all" => Ok(Self::Any),
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(InputError::Parameter { name: "filter", value: s.to_string() }),
        }
    }
}

/// Classifies a transaction relative to `address`.
///
/// A transaction sent by the address is [`Direction::Out`], even when the address is also the
/// recipient. Transactions not touching the address return `None`.
pub fn classify(address: Address, from: Address, to: Option<Address>) -> Option<Direction> {
    if from == address {
        Some(Direction::Out)
    } else if to == Some(address) {
        Some(Direction::In)
    } else {
        None
    }
}

/// One page of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPage {
    /// Matching transactions, newest first, each carrying a direction.
    pub items: Vec<TransactionRef>,
    /// The block to resume from.
    #[serde(rename = "nextCursorBlock", with = "chainscope_primitives::serde_str::opt_u64_dec")]
    pub next_cursor: Option<u64>,
    /// The number of blocks processed.
    pub scanned_blocks: u64,
    /// The next cursor as a string, `"0"` once the chain is exhausted.
    pub from_block: String,
}

/// A request for one page of an address' activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRequest {
    /// The queried address, unparsed.
    pub address: String,
    /// The direction filter.
    pub filter: DirectionFilter,
    /// The block budget, clamped on use.
    pub scan_blocks: u64,
    /// The page size, clamped on use.
    pub limit: usize,
    /// The block to start from, the chain head if absent.
    pub cursor: Option<u64>,
}

/// Pages backwards through the transactions sent or received by an address.
///
/// Blocks are scanned one at a time so that no block past the end of a page is fetched.
#[derive(Debug)]
pub struct ActivityFeedQuery<C> {
    scanner: BackwardScanner<C>,
}

impl<C> Clone for ActivityFeedQuery<C> {
    fn clone(&self) -> Self {
        Self { scanner: self.scanner.clone() }
    }
}

impl<C: ChainClient> ActivityFeedQuery<C> {
    /// Creates a new [`ActivityFeedQuery`].
    pub const fn new(client: Arc<C>) -> Self {
        Self { scanner: BackwardScanner::new(client) }
    }

    /// Returns one page of the activity of `request.address`.
    ///
    /// The address is validated before any chain access.
    pub async fn query_address_activity(
        &self,
        request: &ActivityRequest,
    ) -> ScanResult<ActivityPage> {
        let address = parse_address(&request.address)?;
        let filter = request.filter;
        let budget = ScanBudget::clamped(request.scan_blocks, request.limit);

        let page = self
            .scanner
            .scan(
                StartBlock::from(request.cursor),
                |_, tx| classify(address, tx.from, tx.to).is_some_and(|d| filter.accepts(d)),
                budget,
            )
            .await?;

        let items: Vec<_> = page
            .items
            .into_iter()
            .filter_map(|tx| classify(address, tx.from, tx.to).map(|d| tx.with_direction(d)))
            .collect();

        debug!(
            target: "activity",
            %address,
            ?filter,
            matches = items.len(),
            scanned = page.blocks_visited,
            "Address activity page assembled"
        );
        Ok(ActivityPage {
            items,
            next_cursor: page.next_cursor,
            scanned_blocks: page.blocks_visited,
            from_block: page.next_cursor.unwrap_or_default().to_string(),
        })
    }
}
