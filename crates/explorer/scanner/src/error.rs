//! Error type for the scanner.

use chainscope_client::ChainClientError;
use chainscope_primitives::{Classify, ErrorKind, InputError};
use thiserror::Error;

/// An error raised while scanning the chain.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Malformed caller input.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The chain client failed.
    #[error(transparent)]
    Client(#[from] ChainClientError),
    /// The node reported a block inside the scanned range as absent.
    #[error("Block {0} not found")]
    BlockNotFound(u64),
}

/// Result alias for [`ScanError`].
pub type ScanResult<T> = Result<T, ScanError>;

impl Classify for ScanError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(e) => e.kind(),
            Self::Client(e) => e.kind(),
            Self::BlockNotFound(_) => ErrorKind::NotFound,
        }
    }
}
