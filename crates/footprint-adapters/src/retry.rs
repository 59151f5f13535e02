//! Bounded retry for adapter upstream calls.
//!
//! Adapters are allowed at most ONE immediate retry on a transient network
//! failure (connection error or 5xx). Rate limits and timeouts are surfaced
//! without retrying so the caller's budget and backoff decisions stay intact.

use std::future::Future;
use std::time::Duration;

use crate::error::AdapterError;

/// Runs `operation`, retrying once after a short jittered delay when the
/// first attempt fails with a transient error (see
/// [`AdapterError::is_transient`]).
///
/// `jitter_base_ms` bounds the delay: the actual sleep is uniform in
/// `[jitter_base_ms / 2, jitter_base_ms]`.
pub(crate) async fn with_single_retry<T, F, Fut>(
    jitter_base_ms: u64,
    mut operation: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_transient() => {
            let delay_ms = jitter_base_ms / 2 + rand::random_range(0..=jitter_base_ms.div_ceil(2));
            tracing::warn!(
                delay_ms,
                error = %err,
                "transient adapter error — retrying once"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            operation().await
        }
        Err(err) => Err(err),
    }
}
