//! Metrics for the scanner.

/// Container for scanner metric names.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Blocks processed by a scan.
    pub const BLOCKS_VISITED: &'static str = "chainscope_scanner_blocks_visited_total";
    /// Transactions accepted by a scan predicate.
    pub const MATCHES: &'static str = "chainscope_scanner_matches_total";

    /// Describes and zeroes the scanner metrics.
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::BLOCKS_VISITED,
            metrics::Unit::Count,
            "Total number of blocks processed by backward scans",
        );
        metrics::describe_counter!(
            Self::MATCHES,
            metrics::Unit::Count,
            "Total number of transactions matched by backward scans",
        );
    }

    fn zero() {
        metrics::counter!(Self::BLOCKS_VISITED).increment(0);
        metrics::counter!(Self::MATCHES).increment(0);
    }
}
