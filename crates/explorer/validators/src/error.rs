//! Error type for validator lookups.

use alloy_primitives::Address;
use chainscope_client::ChainClientError;
use chainscope_primitives::{Classify, ErrorKind, InputError};
use thiserror::Error;

/// An error raised while looking up validators.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Malformed caller input.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The node call failed.
    #[error(transparent)]
    Client(#[from] ChainClientError),
    /// None of the configured list methods is served by the node.
    #[error("No validator list method available, tried: {0}")]
    NoListMethod(String),
    /// The node knows no validator at the address.
    #[error("Validator {0} not found")]
    NotFound(Address),
}

/// Result alias for [`ValidatorError`].
pub type ValidatorResult<T> = Result<T, ValidatorError>;

impl ValidatorError {
    /// Whether the node answered with a gateway HTML page.
    pub const fn is_gateway(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_gateway())
    }
}

/// Node error messages meaning the validator does not exist.
const UNKNOWN_VALIDATOR_MESSAGES: &[&str] = &["unknown validator", "validator not found"];

/// Checks the detail answered for `address`, mapping an empty answer or an unknown-validator
/// RPC error to [`ValidatorError::NotFound`].
pub(crate) fn checked_detail(
    address: Address,
    detail: ValidatorResult<serde_json::Value>,
) -> ValidatorResult<serde_json::Value> {
    match detail {
        Ok(detail) if detail.is_object() => Ok(detail),
        Ok(_) => Err(ValidatorError::NotFound(address)),
        Err(ValidatorError::Client(ChainClientError::Rpc { message, .. }))
            if UNKNOWN_VALIDATOR_MESSAGES
                .iter()
                .any(|m| message.to_ascii_lowercase().contains(m)) =>
        {
            Err(ValidatorError::NotFound(address))
        }
        Err(err) => Err(err),
    }
}

impl Classify for ValidatorError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(e) => e.kind(),
            Self::Client(e) => e.kind(),
            Self::NoListMethod(_) => ErrorKind::UpstreamFatal,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
