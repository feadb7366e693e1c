//! Transaction references returned by the feeds.

use crate::{BlockRef, TransactionSummary};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// The direction of a transaction relative to a queried address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The queried address is the recipient.
    #[serde(rename = "IN")]
    In,
    /// The queried address is the sender.
    #[serde(rename = "OUT")]
    Out,
}

/// A transaction located in a specific block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRef {
    /// The transaction hash.
    pub hash: B256,
    /// The number of the including block.
    #[serde(with = "crate::serde_str::u64_dec")]
    pub block_number: u64,
    /// The timestamp of the including block.
    pub timestamp: u64,
    /// The sender.
    pub from: Address,
    /// The recipient, `None` for contract creations.
    pub to: Option<Address>,
    /// Direction relative to a query address, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl TransactionRef {
    /// Builds a [`TransactionRef`] for a transaction of the given block.
    pub const fn from_summary(block: &BlockRef, tx: &TransactionSummary) -> Self {
        Self {
            hash: tx.hash,
            block_number: block.number,
            timestamp: block.timestamp,
            from: tx.from,
            to: tx.to,
            direction: None,
        }
    }

    /// Returns the reference annotated with the given direction.
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address, b256};

    #[test]
    fn test_serializes_block_number_as_string() {
        let block = BlockRef::new(
            1000,
            b256!("0x00000000000000000000000000000000000000000000000000000000000003e8"),
            1_700_000_000,
            1,
        );
        let tx = TransactionSummary {
            hash: b256!("0x1111111111111111111111111111111111111111111111111111111111111111"),
            from: address!("0x00000000000000000000000000000000000000aa"),
            to: None,
            value: U256::ZERO,
        };
        let json = serde_json::to_value(TransactionRef::from_summary(&block, &tx)).unwrap();
        assert_eq!(json["blockNumber"], "1000");
        assert_eq!(json["timestamp"], 1_700_000_000u64);
        assert!(json["to"].is_null());
        assert!(json.get("direction").is_none());
    }

    #[test]
    fn test_direction_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Direction::In).unwrap(), "IN");
        assert_eq!(serde_json::to_value(Direction::Out).unwrap(), "OUT");
    }
}
