//! Serde helpers that encode integers as decimal strings.
//!
//! Block numbers and wei amounts exceed the safe integer range of a JSON number in the browser,
//! so every such field crosses the HTTP boundary as a string. Deserialization also accepts
//! native JSON numbers and `0x` hex strings.

use alloy_primitives::U256;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(u64),
}

fn u64_from_str(s: &str) -> Option<u64> {
    s.strip_prefix("0x").map_or_else(|| s.parse().ok(), |hex| u64::from_str_radix(hex, 16).ok())
}

/// `u64` as a decimal string.
pub mod u64_dec {
    use super::*;

    /// Serializes a `u64` as a decimal string.
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Deserializes a `u64` from a decimal string, hex string or number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StrOrNum::deserialize(deserializer)? {
            StrOrNum::Num(n) => Ok(n),
            StrOrNum::Str(s) => {
                u64_from_str(&s).ok_or_else(|| D::Error::custom(format!("invalid integer {s:?}")))
            }
        }
    }
}

/// `Option<u64>` as a decimal string or `null`.
pub mod opt_u64_dec {
    use super::*;

    /// Serializes an `Option<u64>` as a decimal string or `null`.
    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an `Option<u64>`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        match Option::<StrOrNum>::deserialize(deserializer)? {
            None => Ok(None),
            Some(StrOrNum::Num(n)) => Ok(Some(n)),
            Some(StrOrNum::Str(s)) => u64_from_str(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid integer {s:?}"))),
        }
    }
}

/// [`U256`] as a decimal string.
pub mod u256_dec {
    use super::*;

    /// Serializes a [`U256`] as a decimal string.
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Deserializes a [`U256`] from a decimal string, hex string or number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match StrOrNum::deserialize(deserializer)? {
            StrOrNum::Num(n) => Ok(U256::from(n)),
            StrOrNum::Str(s) => U256::from_str(&s).map_err(D::Error::custom),
        }
    }
}

/// `Option<U256>` as a decimal string or `null`.
pub mod opt_u256_dec {
    use super::*;

    /// Serializes an `Option<U256>` as a decimal string or `null`.
    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an `Option<U256>`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<U256>, D::Error> {
        match Option::<StrOrNum>::deserialize(deserializer)? {
            None => Ok(None),
            Some(StrOrNum::Num(n)) => Ok(Some(U256::from(n))),
            Some(StrOrNum::Str(s)) => U256::from_str(&s).map(Some).map_err(D::Error::custom),
        }
    }
}
