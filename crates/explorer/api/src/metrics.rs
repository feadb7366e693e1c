//! Metrics for the API.

/// Container for API metric names.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Requests served, labeled by matched route and status code.
    pub const REQUESTS: &'static str = "chainscope_api_requests_total";
    /// Requests whose deadline expired.
    pub const TIMEOUTS: &'static str = "chainscope_api_timeouts_total";

    /// Describes and zeroes the API metrics.
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::REQUESTS,
            metrics::Unit::Count,
            "Total number of HTTP requests served",
        );
        metrics::describe_counter!(
            Self::TIMEOUTS,
            metrics::Unit::Count,
            "Total number of HTTP requests aborted by their deadline",
        );
    }

    fn zero() {
        metrics::counter!(Self::TIMEOUTS).increment(0);
    }
}
