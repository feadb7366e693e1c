//! Error type for the [`crate::ChainClient`].

use alloy_transport::{RpcError, TransportErrorKind};
use chainscope_primitives::{Classify, ErrorKind};
use std::time::Duration;
use thiserror::Error;

/// JSON-RPC error code for an unknown method.
const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// Maximum length of an upstream body kept in an error.
const MAX_DIAGNOSTIC_LEN: usize = 300;

/// An error returned by a [`crate::ChainClient`].
#[derive(Debug, Error)]
pub enum ChainClientError {
    /// The node (or a gateway in front of it) answered with an HTML page instead of JSON.
    #[error("RPC gateway returned a non-JSON response: {0}")]
    Gateway(String),
    /// The request never produced a response.
    #[error("RPC transport error: {0}")]
    Transport(String),
    /// A caller-side deadline expired before the call finished.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The node does not implement the called method.
    #[error("RPC method not found: {0}")]
    MethodNotFound(String),
    /// The node reported that the entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other JSON-RPC error response.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// The JSON-RPC error code.
        code: i64,
        /// The error message.
        message: String,
    },
    /// The response could not be decoded.
    #[error("failed to decode RPC response: {0}")]
    Decode(String),
}

/// Result alias for [`ChainClientError`].
pub type ChainClientResult<T> = Result<T, ChainClientError>;

impl ChainClientError {
    /// Whether the error came from an HTML gateway page.
    pub const fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway(_))
    }

    /// Whether the error is a caller-side timeout.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl Classify for ChainClientError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Gateway(_) | Self::Transport(_) | Self::Timeout(_) => ErrorKind::UpstreamTransient,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MethodNotFound(_) | Self::Rpc { .. } | Self::Decode(_) => ErrorKind::UpstreamFatal,
        }
    }
}

/// Returns true if `text` looks like an HTML error page, or a decoder complaining about one.
pub fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("<!doctype") || lower.contains("<html") || lower.contains("not valid json")
}

fn looks_like_not_found(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("not found") || lower.contains("unknown transaction") || lower.contains("unknown block")
}

/// Truncates `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl From<RpcError<TransportErrorKind>> for ChainClientError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err {
            RpcError::ErrorResp(payload) if payload.code == METHOD_NOT_FOUND_CODE => {
                Self::MethodNotFound(payload.message.to_string())
            }
            RpcError::ErrorResp(payload) if looks_like_not_found(&payload.message) => {
                Self::NotFound(payload.message.to_string())
            }
            RpcError::ErrorResp(payload) => {
                Self::Rpc { code: payload.code, message: payload.message.to_string() }
            }
            RpcError::DeserError { err, text } => {
                if looks_like_html(&text) {
                    Self::Gateway(truncate_chars(&text, MAX_DIAGNOSTIC_LEN))
                } else {
                    Self::Decode(err.to_string())
                }
            }
            RpcError::Transport(TransportErrorKind::HttpError(http)) => {
                let body = truncate_chars(&http.body, MAX_DIAGNOSTIC_LEN);
                if looks_like_html(&http.body) || matches!(http.status, 429 | 502 | 503 | 504) {
                    Self::Gateway(format!("HTTP {}: {body}", http.status))
                } else {
                    Self::Transport(format!("HTTP {}: {body}", http.status))
                }
            }
            RpcError::Transport(kind) => Self::Transport(kind.to_string()),
            other => {
                let message = other.to_string();
                if looks_like_html(&message) {
                    Self::Gateway(truncate_chars(&message, MAX_DIAGNOSTIC_LEN))
                } else {
                    Self::Decode(message)
                }
            }
        }
    }
}
