#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod error;
pub use error::{ApiError, ApiResult, MAX_DETAILS_LEN};

mod params;
pub use params::FeedParams;

mod state;
pub use state::{ApiConfig, ApiState};

mod metrics;
pub use metrics::Metrics;

pub mod token;
pub mod tx;

mod handlers;
pub use handlers::{BalanceView, BlockView};

mod server;
pub use server::{router, serve};
