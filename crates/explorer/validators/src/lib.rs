#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod error;
pub use error::{ValidatorError, ValidatorResult};
use error::checked_detail;

mod record;
pub use record::{
    EpochInfo, ValidatorIdentity, ValidatorRecord, ValidatorSet, ValidatorStatus,
    normalize_entries,
};

mod source;
pub use source::{RpcValidatorSource, ValidatorMethods, ValidatorSource};

mod retry;
pub use retry::{RETRY_DELAYS, retry_on_gateway};

mod metrics;
pub use metrics::Metrics;

mod enricher;
pub use enricher::{DEFAULT_VALIDATOR_CONCURRENCY, ValidatorEnricher};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
