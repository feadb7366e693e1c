#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod error;
pub use error::{ScanError, ScanResult};

mod budget;
pub use budget::{
    DEFAULT_ACTIVITY_SCAN_BLOCKS, DEFAULT_BATCH_SIZE, DEFAULT_LIMIT, DEFAULT_RECENT_SCAN_BLOCKS,
    MAX_LIMIT, MAX_SCAN_BLOCKS, ScanBudget, StartBlock, clamp_limit,
};

mod metrics;
pub use metrics::Metrics;

mod scanner;
pub use scanner::{BackwardScanner, BlockPage, ScanPage};

mod activity;
pub use activity::{ActivityFeedQuery, ActivityPage, ActivityRequest, DirectionFilter, classify};

mod recent;
pub use recent::{RecentPage, recent_transactions};

mod overview;
pub use overview::{
    BlockStats, LatestOverview, OVERVIEW_BLOCKS, OVERVIEW_MAX_SCAN_BLOCKS, OVERVIEW_TXS,
    latest_overview,
};

mod network;
pub use network::{GWEI_DIGITS, NetworkSample, NetworkStats, network_stats};
