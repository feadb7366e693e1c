#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod block;
pub use block::{BlockRef, ChainBlock, TransactionSummary};

mod transaction;
pub use transaction::{Direction, TransactionRef};

mod error;
pub use error::{Classify, ErrorKind, InputError};

mod parse;
pub use parse::{is_address, is_tx_hash, parse_address, parse_block_number, parse_tx_hash};

pub mod serde_str;

pub mod units;
pub use units::{NATIVE_DECIMALS, format_native, format_units, wei_to_gwei};
