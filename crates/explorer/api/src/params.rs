//! Query string parameters.
//!
//! Every parameter arrives as an optional string and is validated here, so that a malformed
//! value maps to a `400` carrying the offending parameter name.

use chainscope_primitives::{InputError, parse_block_number};
use chainscope_scanner::{DEFAULT_LIMIT, DirectionFilter};
use serde::Deserialize;

/// The raw query of the feed and listing routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    /// The queried address.
    pub address: Option<String>,
    /// The page size.
    pub limit: Option<String>,
    /// The direction filter.
    pub filter: Option<String>,
    /// The block budget.
    pub scan_blocks: Option<String>,
    /// The block to resume a transaction feed from.
    pub cursor_block: Option<String>,
    /// The block to resume the block listing from.
    pub cursor: Option<String>,
}

impl FeedParams {
    /// Returns the page size, [`DEFAULT_LIMIT`] if absent.
    ///
    /// Negative values are accepted and clamped like any other out of range value.
    pub fn limit(&self) -> Result<usize, InputError> {
        parse_count("limit", self.limit.as_deref(), DEFAULT_LIMIT as u64)
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
    }

    /// Returns the block budget, `default` if absent.
    pub fn scan_blocks(&self, default: u64) -> Result<u64, InputError> {
        parse_count("scanBlocks", self.scan_blocks.as_deref(), default)
    }

    /// Returns the direction filter, [`DirectionFilter::Any`] if absent.
    pub fn filter(&self) -> Result<DirectionFilter, InputError> {
        self.filter.as_deref().map_or(Ok(DirectionFilter::Any), str::parse)
    }

    /// Returns the `cursorBlock` parameter.
    pub fn cursor_block(&self) -> Result<Option<u64>, InputError> {
        parse_cursor(self.cursor_block.as_deref())
    }

    /// Returns the `cursor` parameter.
    pub fn cursor(&self) -> Result<Option<u64>, InputError> {
        parse_cursor(self.cursor.as_deref())
    }
}

/// Parses a signed decimal count, mapping negatives to zero and saturating values beyond
/// `u64::MAX`. Clamping to the route's range is left to the caller.
fn parse_count(name: &'static str, raw: Option<&str>, default: u64) -> Result<u64, InputError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::Parameter { name, value: raw.to_string() });
    }
    if negative {
        return Ok(0);
    }
    Ok(digits.parse::<u64>().unwrap_or(u64::MAX))
}

fn parse_cursor(raw: Option<&str>) -> Result<Option<u64>, InputError> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(parse_block_number).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainscope_scanner::{DEFAULT_RECENT_SCAN_BLOCKS, clamp_limit};
    use rstest::rstest;

    fn with_limit(limit: &str) -> FeedParams {
        FeedParams { limit: Some(limit.to_string()), ..Default::default() }
    }

    #[rstest]
    #[case("", 25)]
    #[case("10", 10)]
    #[case("500", 50)]
    #[case("0", 1)]
    #[case("-7", 1)]
    #[case("+3", 3)]
    #[case("10000000000000000000", 50)]
    #[case("99999999999999999999999", 50)]
    #[case("-99999999999999999999999", 1)]
    fn test_limit_is_clamped(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(clamp_limit(with_limit(raw).limit().unwrap()).get(), expected);
    }

    #[rstest]
    #[case("lots")]
    #[case("1.5")]
    #[case("-")]
    #[case("1e3")]
    fn test_non_numeric_limit_is_rejected(#[case] raw: &str) {
        let err = with_limit(raw).limit().unwrap_err();
        assert_eq!(err, InputError::Parameter { name: "limit", value: raw.to_string() });
    }

    #[test]
    fn test_oversized_scan_blocks_saturates() {
        let params =
            FeedParams { scan_blocks: Some("99999999999999999999".to_string()), ..Default::default() };
        assert_eq!(params.scan_blocks(DEFAULT_RECENT_SCAN_BLOCKS).unwrap(), u64::MAX);
    }

    #[test]
    fn test_defaults() {
        let params = FeedParams::default();
        assert_eq!(params.limit().unwrap(), DEFAULT_LIMIT);
        assert_eq!(params.scan_blocks(DEFAULT_RECENT_SCAN_BLOCKS).unwrap(), 500);
        assert_eq!(params.filter().unwrap(), DirectionFilter::Any);
        assert_eq!(params.cursor_block().unwrap(), None);
    }

    #[rstest]
    #[case("997", Some(997))]
    #[case("0x10", Some(16))]
    #[case(" ", None)]
    fn test_cursor(#[case] raw: &str, #[case] expected: Option<u64>) {
        let params = FeedParams { cursor_block: Some(raw.to_string()), ..Default::default() };
        assert_eq!(params.cursor_block().unwrap(), expected);
    }

    #[test]
    fn test_malformed_cursor() {
        let params = FeedParams { cursor: Some("abc".to_string()), ..Default::default() };
        assert!(matches!(params.cursor(), Err(InputError::BlockNumber(_))));
    }
}
