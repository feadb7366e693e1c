//! Caller-side deadlines.

use crate::ChainClientError;
use std::{future::Future, time::Duration};

/// Deadline applied to every externally facing request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Runs `fut` to completion or until `timeout` elapses.
///
/// On expiry the future is dropped, which cancels every chain call still in flight, and
/// [`ChainClientError::Timeout`] is returned. A timeout is never reported as an empty result.
pub async fn with_deadline<T, E, F>(timeout: Duration, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<ChainClientError>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(target: "chain_client", timeout_ms = timeout.as_millis() as u64, "Request deadline expired");
            Err(ChainClientError::Timeout(timeout).into())
        }
    }
}
