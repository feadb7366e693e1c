//! An in-memory [`ValidatorSource`] for testing.

use crate::{ValidatorResult, ValidatorSource};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chainscope_client::ChainClientError;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// A [`ValidatorSource`] serving canned responses.
#[derive(Debug, Clone, Default)]
pub struct MockValidatorSource {
    /// The raw list entries.
    pub entries: Vec<Value>,
    /// Detail records by address. Addresses without one fail the lookup.
    pub details: HashMap<Address, Value>,
    /// Artificial latency per detail lookup.
    pub latency: HashMap<Address, Duration>,
    /// The minimum stake, `None` makes the call fail.
    pub min_stake: Option<U256>,
    gateway_failures: Arc<Mutex<HashMap<Address, usize>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    detail_calls: Arc<AtomicUsize>,
}

impl MockValidatorSource {
    /// Creates a source listing `addresses`, each with a live detail record.
    pub fn with_validators(addresses: &[Address]) -> Self {
        Self {
            entries: addresses.iter().map(|a| json!(a.to_string())).collect(),
            details: addresses
                .iter()
                .map(|a| (*a, json!({ "live": true, "stake": "1000" })))
                .collect(),
            min_stake: Some(U256::from(100)),
            ..Default::default()
        }
    }

    /// Makes the lookup of `address` fail.
    pub fn without_detail(mut self, address: Address) -> Self {
        self.details.remove(&address);
        self
    }

    /// Delays the lookup of `address`.
    pub fn with_latency(mut self, address: Address, latency: Duration) -> Self {
        self.latency.insert(address, latency);
        self
    }

    /// Serves `count` gateway pages before the detail of `address`.
    pub fn with_gateway_failures(self, address: Address, count: usize) -> Self {
        self.gateway_failures.lock().unwrap_or_else(|e| e.into_inner()).insert(address, count);
        self
    }

    /// Returns the highest number of concurrent detail lookups observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Returns the number of detail lookups served.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValidatorSource for MockValidatorSource {
    async fn list_validators(&self) -> ValidatorResult<Vec<Value>> {
        Ok(self.entries.clone())
    }

    async fn validator_detail(&self, address: Address) -> ValidatorResult<Value> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency.get(&address) {
            tokio::time::sleep(*latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let gateway = {
            let mut failures = self.gateway_failures.lock().unwrap_or_else(|e| e.into_inner());
            match failures.get_mut(&address) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if gateway {
            return Err(ChainClientError::Gateway(
                "<!DOCTYPE html><html><body>429 Too Many Requests</body></html>".to_string(),
            )
            .into());
        }
        self.details.get(&address).cloned().ok_or_else(|| {
            ChainClientError::Rpc { code: -32000, message: format!("unknown validator {address}") }
                .into()
        })
    }

    async fn validator_min_stake(&self) -> ValidatorResult<Option<U256>> {
        self.min_stake.map(Some).ok_or_else(|| {
            ChainClientError::MethodNotFound("gen_getValidatorMinStake".to_string()).into()
        })
    }
}
