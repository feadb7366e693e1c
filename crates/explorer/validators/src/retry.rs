//! Retry of single lookups against gateway pages.

use crate::ValidatorResult;
use std::{future::Future, time::Duration};

/// Delay before each attempt.
pub const RETRY_DELAYS: [Duration; 3] =
    [Duration::ZERO, Duration::from_millis(350), Duration::from_millis(900)];

/// Runs `op` up to [`RETRY_DELAYS`]`.len()` times, retrying only while it fails with a gateway
/// error. Any other error is returned at once.
pub async fn retry_on_gateway<T, F, Fut>(mut op: F) -> ValidatorResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ValidatorResult<T>>,
{
    let mut attempt = 0;
    loop {
        let delay = RETRY_DELAYS[attempt];
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match op().await {
            Err(err) if err.is_gateway() && attempt + 1 < RETRY_DELAYS.len() => {
                warn!(target: "validators", attempt, %err, "Gateway error, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
