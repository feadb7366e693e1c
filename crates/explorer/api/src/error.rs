//! API errors and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chainscope_client::{ChainClientError, truncate_chars};
use chainscope_primitives::{Classify, ErrorKind, InputError};
use chainscope_scanner::ScanError;
use chainscope_validators::ValidatorError;
use serde::Serialize;
use thiserror::Error;

/// Maximum length of an upstream diagnostic in an error body.
pub const MAX_DETAILS_LEN: usize = 300;

const GATEWAY_MESSAGE: &str =
    "RPC returned HTML (likely rate-limited / gateway). Try again in a few seconds.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request input.
    #[error(transparent)]
    Input(#[from] InputError),
    /// A chain client call failed.
    #[error(transparent)]
    Client(#[from] ChainClientError),
    /// A scan failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// A validator lookup failed.
    #[error(transparent)]
    Validator(#[from] ValidatorError),
    /// The requested entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The request body could not be parsed.
    #[error("Invalid request body: {0}")]
    Body(String),
    /// The query string could not be parsed.
    #[error("Invalid query: {0}")]
    Query(String),
}

/// The JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    /// Returns the innermost chain client error, if any.
    const fn client_error(&self) -> Option<&ChainClientError> {
        match self {
            Self::Client(e) |
            Self::Scan(ScanError::Client(e)) |
            Self::Validator(ValidatorError::Client(e)) => Some(e),
            _ => None,
        }
    }

    /// Whether the deadline of the request expired.
    pub fn is_timeout(&self) -> bool {
        self.client_error().is_some_and(ChainClientError::is_timeout)
    }

    /// Whether the node answered with a gateway page.
    pub fn is_gateway(&self) -> bool {
        self.client_error().is_some_and(ChainClientError::is_gateway)
    }

    /// Returns the HTTP status of the error.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UpstreamTransient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UpstreamFatal | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let message = self.to_string();
        if self.is_timeout() {
            return ErrorBody { error: message, kind: "timeout", details: None };
        }
        let kind = self.kind();
        if self.is_gateway() {
            return ErrorBody {
                error: GATEWAY_MESSAGE.to_string(),
                kind: kind.as_str(),
                details: Some(truncate_chars(&message, MAX_DETAILS_LEN)),
            };
        }
        match kind {
            ErrorKind::UpstreamTransient => ErrorBody {
                error: "Upstream node unavailable".to_string(),
                kind: kind.as_str(),
                details: Some(truncate_chars(&message, MAX_DETAILS_LEN)),
            },
            _ => ErrorBody { error: message, kind: kind.as_str(), details: None },
        }
    }
}

impl Classify for ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(e) => e.kind(),
            Self::Client(e) => e.kind(),
            Self::Scan(e) => e.kind(),
            Self::Validator(e) => e.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Body(_) | Self::Query(_) => ErrorKind::InvalidInput,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(target: "api", %status, err = %self, "Request failed");
        } else {
            debug!(target: "api", %status, err = %self, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

/// Result alias for [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case(InputError::Address("0x1".into()).into(), StatusCode::BAD_REQUEST)]
    #[case(ApiError::NotFound("Transaction"), StatusCode::NOT_FOUND)]
    #[case(ScanError::BlockNotFound(7).into(), StatusCode::NOT_FOUND)]
    #[case(ChainClientError::Gateway("<html>".into()).into(), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(ChainClientError::Transport("reset".into()).into(), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(ChainClientError::Timeout(Duration::from_secs(12)).into(), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(ChainClientError::Decode("bad".into()).into(), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ValidatorError::NoListMethod("a, b".into()).into(), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ValidatorError::NotFound(alloy_primitives::Address::ZERO).into(), StatusCode::NOT_FOUND)]
    #[case(ApiError::Query("duplicate field `limit`".into()), StatusCode::BAD_REQUEST)]
    fn test_status(#[case] err: ApiError, #[case] expected: StatusCode) {
        assert_eq!(err.status(), expected);
    }

    #[test]
    fn test_gateway_body_is_truncated() {
        let page = format!("<!DOCTYPE html>{}", "x".repeat(1000));
        let err: ApiError = ValidatorError::from(ChainClientError::Gateway(page)).into();
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["error"], GATEWAY_MESSAGE);
        assert_eq!(body["kind"], "upstream_transient");
        assert_eq!(body["details"].as_str().unwrap().chars().count(), MAX_DETAILS_LEN);
    }

    #[test]
    fn test_timeout_kind_is_distinct() {
        let err: ApiError = ScanError::from(ChainClientError::Timeout(Duration::from_secs(1))).into();
        assert!(err.is_timeout());
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["kind"], "timeout");
    }
}
