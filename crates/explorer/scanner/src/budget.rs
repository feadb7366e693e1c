//! Scan start points and work bounds.

use std::num::{NonZeroU64, NonZeroUsize};

/// Default number of items per page.
pub const DEFAULT_LIMIT: usize = 25;

/// Upper bound of the page size.
pub const MAX_LIMIT: usize = 50;

/// Upper bound of the per-request block budget.
pub const MAX_SCAN_BLOCKS: u64 = 2000;

/// Default block budget of the address activity feed.
pub const DEFAULT_ACTIVITY_SCAN_BLOCKS: u64 = 50;

/// Default block budget of the recent transactions feed.
pub const DEFAULT_RECENT_SCAN_BLOCKS: u64 = 500;

/// Default number of blocks fetched concurrently by a batched scan.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Where a scan begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartBlock {
    /// The chain head at the time of the scan.
    #[default]
    Head,
    /// An explicit block, inclusive.
    At(u64),
}

impl From<Option<u64>> for StartBlock {
    fn from(cursor: Option<u64>) -> Self {
        cursor.map_or(Self::Head, Self::At)
    }
}

/// The bounds of one scan. A scan stops at whichever bound it reaches first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBudget {
    /// Maximum number of blocks processed.
    pub max_blocks_to_scan: NonZeroU64,
    /// Number of matches after which the scan stops.
    pub target_match_count: NonZeroUsize,
}

impl ScanBudget {
    /// Creates a new [`ScanBudget`].
    pub const fn new(max_blocks_to_scan: NonZeroU64, target_match_count: NonZeroUsize) -> Self {
        Self { max_blocks_to_scan, target_match_count }
    }

    /// Builds a budget from raw request values, clamping the block budget to
    /// `[1, MAX_SCAN_BLOCKS]` and the target to `[1, MAX_LIMIT]`.
    pub fn clamped(scan_blocks: u64, limit: usize) -> Self {
        Self {
            max_blocks_to_scan: NonZeroU64::new(scan_blocks.clamp(1, MAX_SCAN_BLOCKS))
                .unwrap_or(NonZeroU64::MIN),
            target_match_count: NonZeroUsize::new(limit.clamp(1, MAX_LIMIT))
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Clamps a page size to `[1, MAX_LIMIT]`.
pub fn clamp_limit(limit: usize) -> NonZeroUsize {
    NonZeroUsize::new(limit.clamp(1, MAX_LIMIT)).unwrap_or(NonZeroUsize::MIN)
}
