#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod traits;
pub use traits::ChainClient;

mod types;
pub use types::{LogEntry, ReceiptDetails, TransactionDetails};

mod error;
pub use error::{ChainClientError, ChainClientResult, looks_like_html, truncate_chars};

mod alloy;
pub use alloy::{AlloyChainClient, AlloyChainClientBuilder, DEFAULT_RPC_TIMEOUT};

mod timeout;
pub use timeout::{DEFAULT_REQUEST_TIMEOUT, with_deadline};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
