//! Validator records and their normalization from raw node responses.

use alloy_primitives::{Address, U256};
use chainscope_primitives::parse_address;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashSet, str::FromStr};

/// Keys that may carry the address of a raw list entry, in lookup order.
const ADDRESS_KEYS: [&str; 3] = ["address", "validator", "addr"];

/// Keys that may carry the stake of a detail record, in lookup order.
const STAKE_KEYS: [&str; 4] = ["stake", "vStake", "totalStake", "selfStake"];

/// The state of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorStatus {
    /// Active in the current epoch.
    Live,
    /// Registered but not active.
    Offline,
    /// Temporarily excluded.
    Quarantined,
    /// Permanently excluded.
    Banned,
    /// The detail lookup for this validator failed.
    LookupFailed,
}

impl ValidatorStatus {
    /// Derives the status from a raw detail record.
    ///
    /// An explicit `status` string wins. Otherwise the `banned`, `quarantined` and `live` flags
    /// are checked in that order, and a validator with none of them set is offline.
    pub fn from_detail(detail: &Value) -> Self {
        if let Some(status) = detail.get("status").and_then(Value::as_str) {
            match status.trim().to_ascii_lowercase().as_str() {
                "live" | "active" => return Self::Live,
                "offline" | "inactive" => return Self::Offline,
                "quarantined" | "quarantine" => return Self::Quarantined,
                "banned" | "jailed" => return Self::Banned,
                _ => {}
            }
        }
        if flag(detail, "banned") {
            Self::Banned
        } else if flag(detail, "quarantined") {
            Self::Quarantined
        } else if flag(detail, "live") || flag(detail, "isActive") || flag(detail, "active") {
            Self::Live
        } else {
            Self::Offline
        }
    }
}

/// A truthy flag: `true`, a non-zero number or a non-empty value.
fn flag(detail: &Value, key: &str) -> bool {
    match detail.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
        Some(Value::Object(o)) => !o.is_empty(),
        _ => false,
    }
}

/// The self-declared identity of a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorIdentity {
    /// The display name.
    pub moniker: Option<String>,
    /// A free-form description.
    pub description: Option<String>,
}

impl ValidatorIdentity {
    fn from_detail(detail: &Value) -> Option<Self> {
        let source = detail.get("identity").filter(|v| v.is_object()).unwrap_or(detail);
        let text = |key: &str| source.get(key).and_then(Value::as_str).map(str::to_string);
        let identity = Self { moniker: text("moniker"), description: text("description") };
        (identity.moniker.is_some() || identity.description.is_some()).then_some(identity)
    }
}

/// A validator with its enriched detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorRecord {
    /// The validator address.
    pub address: Address,
    /// The stake in wei.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "chainscope_primitives::serde_str::opt_u256_dec"
    )]
    pub stake: Option<U256>,
    /// The validator status.
    pub status: ValidatorStatus,
    /// The owner address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    /// The operator address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Address>,
    /// The declared identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ValidatorIdentity>,
    /// Why the lookup failed, for [`ValidatorStatus::LookupFailed`] records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidatorRecord {
    /// Builds a record from a raw detail response.
    pub fn from_detail(address: Address, detail: &Value) -> Self {
        let stake = STAKE_KEYS.iter().find_map(|key| detail.get(*key).and_then(parse_amount));
        let address_field =
            |key: &str| detail.get(key).and_then(Value::as_str).and_then(|s| parse_address(s).ok());
        Self {
            address,
            stake,
            status: ValidatorStatus::from_detail(detail),
            owner: address_field("owner"),
            operator: address_field("operator"),
            identity: ValidatorIdentity::from_detail(detail),
            error: None,
        }
    }

    /// Builds the record of a validator whose lookup failed.
    pub fn lookup_failed(address: Address, error: impl Into<String>) -> Self {
        Self {
            address,
            stake: None,
            status: ValidatorStatus::LookupFailed,
            owner: None,
            operator: None,
            identity: None,
            error: Some(error.into()),
        }
    }
}

/// Parses an amount given as a decimal or `0x` string, or as a JSON number.
fn parse_amount(value: &Value) -> Option<U256> {
    match value {
        Value::String(s) => U256::from_str(s.trim()).ok(),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    }
}

/// Normalizes raw list entries into unique addresses, keeping the first occurrence.
///
/// An entry is either an address string or an object carrying one under `address`,
/// `validator` or `addr`. Entries without a well-formed address are dropped.
pub fn normalize_entries(entries: &[Value]) -> Vec<Address> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => {
                ADDRESS_KEYS.iter().find_map(|key| entry.get(*key).and_then(Value::as_str))
            }
            _ => None,
        })
        .filter_map(|raw| parse_address(raw).ok())
        .filter(|address| seen.insert(*address))
        .collect()
}

/// Epoch level figures of the validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    /// Number of validators in the normalized list.
    pub active_validators_count: usize,
    /// The minimum stake, `None` when the node could not report it.
    #[serde(with = "chainscope_primitives::serde_str::opt_u256_dec")]
    pub validator_min_stake: Option<U256>,
}

/// The enriched validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorSet {
    /// Epoch level figures.
    pub epoch: EpochInfo,
    /// The validators, in list order.
    pub validators: Vec<ValidatorRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use rstest::rstest;
    use serde_json::json;

    const V1: Address = address!("0x1000000000000000000000000000000000000001");
    const V2: Address = address!("0x2000000000000000000000000000000000000002");

    #[test]
    fn test_normalize_entries() {
        let entries = vec![
            json!("0x1000000000000000000000000000000000000001"),
            json!({ "validator": "0x2000000000000000000000000000000000000002" }),
            json!({ "address": "0x1000000000000000000000000000000000000001" }),
            json!({ "addr": "0x12" }),
            json!("not an address"),
            json!(42),
            json!({ "name": "no address" }),
        ];
        assert_eq!(normalize_entries(&entries), vec![V1, V2]);
    }

    #[rstest]
    #[case(json!({ "status": "Active" }), ValidatorStatus::Live)]
    #[case(json!({ "status": "jailed", "live": true }), ValidatorStatus::Banned)]
    #[case(json!({ "banned": true, "live": true }), ValidatorStatus::Banned)]
    #[case(json!({ "quarantined": 1, "live": true }), ValidatorStatus::Quarantined)]
    #[case(json!({ "live": true }), ValidatorStatus::Live)]
    #[case(json!({ "banned": false, "live": false }), ValidatorStatus::Offline)]
    #[case(json!({}), ValidatorStatus::Offline)]
    fn test_status(#[case] detail: Value, #[case] expected: ValidatorStatus) {
        assert_eq!(ValidatorStatus::from_detail(&detail), expected);
    }

    #[test]
    fn test_record_from_detail() {
        let detail = json!({
            "vStake": "42000000000000000000000",
            "owner": "0x2000000000000000000000000000000000000002",
            "operator": "garbage",
            "live": true,
            "identity": { "moniker": "node-one", "website": "https://example.org" },
        });
        let record = ValidatorRecord::from_detail(V1, &detail);
        assert_eq!(record.stake, Some(U256::from(42_000u64) * U256::from(10u64).pow(U256::from(18))));
        assert_eq!(record.owner, Some(V2));
        assert_eq!(record.operator, None);
        assert_eq!(record.status, ValidatorStatus::Live);
        assert_eq!(record.identity.as_ref().and_then(|i| i.moniker.as_deref()), Some("node-one"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["stake"], "42000000000000000000000");
        assert_eq!(json["status"], "live");
        assert!(json.get("operator").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_lookup_failed_record() {
        let json = serde_json::to_value(ValidatorRecord::lookup_failed(V1, "boom")).unwrap();
        assert_eq!(json["status"], "lookup-failed");
        assert_eq!(json["error"], "boom");
        assert!(json.get("stake").is_none());
    }

    #[test]
    fn test_unknown_min_stake_is_null() {
        let set = ValidatorSet {
            epoch: EpochInfo { active_validators_count: 0, validator_min_stake: None },
            validators: vec![],
        };
        let json = serde_json::to_value(&set).unwrap();
        assert!(json["epoch"]["validatorMinStake"].is_null());
        assert_eq!(json["epoch"]["activeValidatorsCount"], 0);
    }
}
