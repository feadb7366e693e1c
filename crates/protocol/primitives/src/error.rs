//! Error taxonomy shared by every chainscope crate.

use core::fmt;
use thiserror::Error;

/// The class of a failure, independent of the component that produced it.
///
/// The HTTP layer maps each class onto a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input, detected before any I/O.
    InvalidInput,
    /// The requested entity does not exist on chain.
    NotFound,
    /// A gateway or timeout class failure that may succeed on retry.
    UpstreamTransient,
    /// Any other failure reported by the chain node.
    UpstreamFatal,
    /// A broken invariant inside chainscope.
    Internal,
}

impl ErrorKind {
    /// Returns the snake case label of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::UpstreamTransient => "upstream_transient",
            Self::UpstreamFatal => "upstream_fatal",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every error type that crosses a crate boundary.
pub trait Classify {
    /// Returns the [`ErrorKind`] of the error.
    fn kind(&self) -> ErrorKind;
}

/// Malformed caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Not a `0x`-prefixed 20-byte hex address.
    #[error("Invalid address: {0:?}")]
    Address(String),
    /// Not a `0x`-prefixed 32-byte hex hash.
    #[error("Invalid transaction hash: {0:?}")]
    TxHash(String),
    /// Not a decimal or `0x` hex block number.
    #[error("Invalid block number: {0:?}")]
    BlockNumber(String),
    /// Any other malformed parameter.
    #[error("Invalid {name}: {value:?}")]
    Parameter {
        /// The parameter name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl Classify for InputError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}
