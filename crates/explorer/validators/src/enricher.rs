//! Bounded-concurrency enrichment of the validator set.

use crate::{
    EpochInfo, Metrics, ValidatorRecord, ValidatorResult, ValidatorSet, ValidatorSource,
    checked_detail, normalize_entries, retry_on_gateway,
};
use alloy_primitives::{Address, U256};
use chainscope_primitives::parse_address;
use futures::future::join_all;
use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Default number of concurrent detail lookups.
pub const DEFAULT_VALIDATOR_CONCURRENCY: usize = 6;

/// Looks up the validator set and enriches every entry with its detail record.
#[derive(Debug)]
pub struct ValidatorEnricher<S> {
    source: Arc<S>,
    concurrency: NonZeroUsize,
}

impl<S> Clone for ValidatorEnricher<S> {
    fn clone(&self) -> Self {
        Self { source: Arc::clone(&self.source), concurrency: self.concurrency }
    }
}

impl<S: ValidatorSource> ValidatorEnricher<S> {
    /// Creates an enricher with [`DEFAULT_VALIDATOR_CONCURRENCY`] workers.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_concurrency(source, DEFAULT_VALIDATOR_CONCURRENCY)
    }

    /// Creates an enricher with `concurrency` workers. Zero is treated as one.
    pub fn with_concurrency(source: Arc<S>, concurrency: usize) -> Self {
        Self { source, concurrency: NonZeroUsize::new(concurrency).unwrap_or(NonZeroUsize::MIN) }
    }

    /// Returns the validator set in list order.
    ///
    /// A failed detail lookup yields a `lookup-failed` record for that validator only. The
    /// minimum stake is fetched alongside the lookups and left empty if it fails.
    pub async fn list_validators(&self) -> ValidatorResult<ValidatorSet> {
        let raw = self.source.list_validators().await?;
        let addresses = normalize_entries(&raw);
        debug!(
            target: "validators",
            raw = raw.len(),
            unique = addresses.len(),
            concurrency = self.concurrency.get(),
            "Enriching validator set"
        );

        let (validators, validator_min_stake) =
            futures::join!(self.enrich_all(&addresses), self.min_stake());

        Ok(ValidatorSet {
            epoch: EpochInfo { active_validators_count: addresses.len(), validator_min_stake },
            validators,
        })
    }

    /// Looks up a single validator, retrying while the node answers with a gateway page.
    ///
    /// An address the node does not know yields [`ValidatorError::NotFound`].
    ///
    /// [`ValidatorError::NotFound`]: crate::ValidatorError::NotFound
    pub async fn validator_detail(&self, address: &str) -> ValidatorResult<ValidatorRecord> {
        let address = parse_address(address)?;
        let detail =
            checked_detail(address, retry_on_gateway(|| self.source.validator_detail(address)).await)?;
        Ok(ValidatorRecord::from_detail(address, &detail))
    }

    /// Enriches `addresses` with a pool of workers claiming indices from a shared counter.
    async fn enrich_all(&self, addresses: &[Address]) -> Vec<ValidatorRecord> {
        let next = &AtomicUsize::new(0);
        let workers = (0..self.concurrency.get().min(addresses.len())).map(|_| async move {
            let mut done = Vec::new();
            loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(&address) = addresses.get(index) else { break };
                done.push((index, self.lookup(address).await));
            }
            done
        });

        let mut slots: Vec<Option<ValidatorRecord>> = vec![None; addresses.len()];
        for (index, record) in join_all(workers).await.into_iter().flatten() {
            slots[index] = Some(record);
        }
        slots.into_iter().flatten().collect()
    }

    async fn lookup(&self, address: Address) -> ValidatorRecord {
        match checked_detail(address, self.source.validator_detail(address).await) {
            Ok(detail) => {
                metrics::counter!(Metrics::LOOKUPS, "outcome" => "ok").increment(1);
                ValidatorRecord::from_detail(address, &detail)
            }
            Err(err) => {
                metrics::counter!(Metrics::LOOKUPS, "outcome" => "failed").increment(1);
                warn!(target: "validators", %address, %err, "Validator lookup failed");
                ValidatorRecord::lookup_failed(address, err.to_string())
            }
        }
    }

    async fn min_stake(&self) -> Option<U256> {
        match self.source.validator_min_stake().await {
            Ok(stake) => stake,
            Err(err) => {
                debug!(target: "validators", %err, "Minimum stake unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ValidatorError, ValidatorStatus, test_utils::MockValidatorSource};
    use chainscope_primitives::{Classify, ErrorKind};
    use rand::seq::SliceRandom;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn validators(count: u8) -> Vec<Address> {
        (1..=count).map(Address::with_last_byte).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_survives_shuffled_latency() {
        let addresses = validators(10);
        let mut latencies: Vec<u64> = (1..=10).map(|i| i * 25).collect();
        latencies.shuffle(&mut rand::rng());

        let source = addresses
            .iter()
            .zip(&latencies)
            .fold(MockValidatorSource::with_validators(&addresses), |source, (a, ms)| {
                source.with_latency(*a, Duration::from_millis(*ms))
            });
        let enricher = ValidatorEnricher::with_concurrency(Arc::new(source.clone()), 6);

        let set = enricher.list_validators().await.unwrap();
        assert_eq!(set.validators.iter().map(|v| v.address).collect::<Vec<_>>(), addresses);
        assert!(set.validators.iter().all(|v| v.status == ValidatorStatus::Live));
        assert_eq!(set.epoch.active_validators_count, 10);
        assert_eq!(set.epoch.validator_min_stake, Some(U256::from(100)));
        assert_eq!(source.detail_calls(), 10);
        assert!(source.max_in_flight() <= 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_is_isolated() {
        let addresses = validators(4);
        let source = MockValidatorSource::with_validators(&addresses).without_detail(addresses[1]);
        let enricher = ValidatorEnricher::new(Arc::new(source));

        let set = enricher.list_validators().await.unwrap();
        assert_eq!(set.validators.len(), 4);
        assert_eq!(set.validators[1].status, ValidatorStatus::LookupFailed);
        assert_eq!(
            set.validators[1].error.as_deref(),
            Some(format!("Validator {} not found", addresses[1]).as_str())
        );
        assert!(set.validators.iter().enumerate().all(|(i, v)| i == 1 || v.error.is_none()));
    }

    #[tokio::test]
    async fn test_normalizes_and_dedups_before_lookup() {
        let addresses = validators(2);
        let mut source = MockValidatorSource::with_validators(&addresses);
        source.entries = vec![
            json!({ "validator": addresses[1].to_string() }),
            json!("garbage"),
            json!(addresses[0].to_string()),
            json!({ "addr": addresses[1].to_string() }),
        ];
        source.min_stake = None;
        let source = Arc::new(source);
        let enricher = ValidatorEnricher::new(Arc::clone(&source));

        let set = enricher.list_validators().await.unwrap();
        assert_eq!(
            set.validators.iter().map(|v| v.address).collect::<Vec<_>>(),
            vec![addresses[1], addresses[0]]
        );
        assert_eq!(set.epoch.active_validators_count, 2);
        assert_eq!(set.epoch.validator_min_stake, None);
        assert_eq!(source.detail_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_set() {
        let enricher = ValidatorEnricher::new(Arc::new(MockValidatorSource::default()));
        let set = enricher.list_validators().await.unwrap();
        assert!(set.validators.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_retries_gateway_pages() {
        let addresses = validators(1);
        let source = Arc::new(
            MockValidatorSource::with_validators(&addresses).with_gateway_failures(addresses[0], 2),
        );
        let enricher = ValidatorEnricher::new(Arc::clone(&source));

        let record = enricher.validator_detail(&addresses[0].to_string()).await.unwrap();
        assert_eq!(record.status, ValidatorStatus::Live);
        assert_eq!(record.stake, Some(U256::from(1000)));
        assert_eq!(source.detail_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_surfaces_persistent_gateway_pages() {
        let addresses = validators(1);
        let source = Arc::new(
            MockValidatorSource::with_validators(&addresses).with_gateway_failures(addresses[0], 5),
        );
        let enricher = ValidatorEnricher::new(Arc::clone(&source));

        let err = enricher.validator_detail(&addresses[0].to_string()).await.unwrap_err();
        assert!(err.is_gateway());
        assert_eq!(err.kind(), ErrorKind::UpstreamTransient);
        assert_eq!(source.detail_calls(), 3);
    }

    #[tokio::test]
    async fn test_detail_of_unknown_validator() {
        let addresses = validators(2);
        let mut source = MockValidatorSource::with_validators(&addresses).without_detail(addresses[1]);
        source.details.insert(addresses[0], Value::Null);
        let enricher = ValidatorEnricher::new(Arc::new(source));

        for address in &addresses {
            let err = enricher.validator_detail(&address.to_string()).await.unwrap_err();
            assert!(matches!(err, ValidatorError::NotFound(a) if a == *address));
        }

        let set = enricher.list_validators().await.unwrap();
        assert!(set.validators.iter().all(|v| v.status == ValidatorStatus::LookupFailed));
    }

    #[tokio::test]
    async fn test_detail_rejects_malformed_address() {
        let source = Arc::new(MockValidatorSource::default());
        let enricher = ValidatorEnricher::new(Arc::clone(&source));

        let err = enricher.validator_detail("0xnothex").await.unwrap_err();
        assert!(matches!(err, ValidatorError::Input(_)));
        assert_eq!(source.detail_calls(), 0);
    }
}
