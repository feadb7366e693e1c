//! Metrics for validator lookups.

/// Container for validator metric names.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Validator detail lookups, labelled by `outcome`.
    pub const LOOKUPS: &'static str = "chainscope_validator_lookups_total";

    /// Describes and zeroes the validator metrics.
    pub fn init() {
        metrics::describe_counter!(
            Self::LOOKUPS,
            metrics::Unit::Count,
            "Total number of validator detail lookups",
        );
        metrics::counter!(Self::LOOKUPS, "outcome" => "ok").increment(0);
        metrics::counter!(Self::LOOKUPS, "outcome" => "failed").increment(0);
    }
}
