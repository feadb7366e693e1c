//! Shape validation for user supplied identifiers.

use crate::InputError;
use alloy_primitives::{Address, B256};
use core::str::FromStr;

fn is_prefixed_hex(value: &str, bytes: usize) -> bool {
    value.len() == 2 + bytes * 2 &&
        value.starts_with("0x") &&
        value.as_bytes()[2..].iter().all(u8::is_ascii_hexdigit)
}

/// Returns true if `value` is `0x` followed by exactly 40 hex characters.
pub fn is_address(value: &str) -> bool {
    is_prefixed_hex(value, 20)
}

/// Returns true if `value` is `0x` followed by exactly 64 hex characters.
pub fn is_tx_hash(value: &str) -> bool {
    is_prefixed_hex(value, 32)
}

/// Parses an address of the form `0x` + 40 hex characters, in any letter case.
///
/// Surrounding whitespace is ignored. Checksums are not enforced: two spellings of the same
/// address that differ only in case parse to the same [`Address`].
pub fn parse_address(value: &str) -> Result<Address, InputError> {
    let trimmed = value.trim();
    if !is_address(trimmed) {
        return Err(InputError::Address(value.to_string()));
    }
    Address::from_str(trimmed).map_err(|_| InputError::Address(value.to_string()))
}

/// Parses a transaction hash of the form `0x` + 64 hex characters.
pub fn parse_tx_hash(value: &str) -> Result<B256, InputError> {
    let trimmed = value.trim();
    if !is_tx_hash(trimmed) {
        return Err(InputError::TxHash(value.to_string()));
    }
    B256::from_str(trimmed).map_err(|_| InputError::TxHash(value.to_string()))
}

/// Parses a block number written in decimal or as `0x` prefixed hex.
pub fn parse_block_number(value: &str) -> Result<u64, InputError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if trimmed.bytes().all(|b| b.is_ascii_digit()) => trimmed.parse().ok(),
        None => None,
    };
    parsed.ok_or_else(|| InputError::BlockNumber(value.to_string()))
}
