//! Shared handler state.

use chainscope_client::{ChainClient, DEFAULT_REQUEST_TIMEOUT};
use chainscope_scanner::{ActivityFeedQuery, BackwardScanner, DEFAULT_BATCH_SIZE};
use chainscope_validators::{DEFAULT_VALIDATOR_CONCURRENCY, ValidatorEnricher, ValidatorSource};
use std::{sync::Arc, time::Duration};

/// Tunables of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    /// Deadline of every request.
    pub request_timeout: Duration,
    /// Blocks fetched concurrently by the chain-wide feeds.
    pub scan_batch_size: usize,
    /// Concurrent validator detail lookups.
    pub validator_concurrency: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            scan_batch_size: DEFAULT_BATCH_SIZE,
            validator_concurrency: DEFAULT_VALIDATOR_CONCURRENCY,
        }
    }
}

/// State shared by every handler.
#[derive(Debug)]
pub struct ApiState<C, S> {
    /// The chain client.
    pub client: Arc<C>,
    /// Batched scanner for the chain-wide feeds.
    pub scanner: BackwardScanner<C>,
    /// The address activity feed.
    pub activity: ActivityFeedQuery<C>,
    /// The validator enricher.
    pub validators: ValidatorEnricher<S>,
    /// Deadline of every request.
    pub request_timeout: Duration,
}

impl<C, S> Clone for ApiState<C, S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            scanner: self.scanner.clone(),
            activity: self.activity.clone(),
            validators: self.validators.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<C: ChainClient, S: ValidatorSource> ApiState<C, S> {
    /// Creates the state over a chain client and a validator source.
    pub fn new(client: Arc<C>, source: Arc<S>, config: ApiConfig) -> Self {
        Self {
            scanner: BackwardScanner::new(Arc::clone(&client))
                .with_batch_size(config.scan_batch_size),
            activity: ActivityFeedQuery::new(Arc::clone(&client)),
            validators: ValidatorEnricher::with_concurrency(source, config.validator_concurrency),
            client,
            request_timeout: config.request_timeout,
        }
    }
}
