//! Retry with exponential backoff for catalog reads.
//!
//! Only catalog reads retry. Delivery to Bubblehouse never does: a failed
//! delivery waits for the next scheduled cycle.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Returns `true` for transient failures worth retrying: HTTP 429 and
/// network-level errors. Everything else propagates immediately.
fn is_retriable(err: &CatalogError) -> bool {
    matches!(err, CatalogError::RateLimited { .. } | CatalogError::Http(_))
}

/// Seconds to wait before retry `attempt + 1`: the exponential backoff, or
/// the server's `Retry-After` when that is longer.
fn retry_delay_secs(err: &CatalogError, attempt: u32, backoff_base_secs: u64) -> u64 {
    let backoff = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
    match err {
        CatalogError::RateLimited {
            retry_after_secs, ..
        } => backoff.max(*retry_after_secs),
        _ => backoff,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times. The wait before retry `n` (1-based) is
/// `backoff_base_secs * 2^(n-1)` seconds, raised to the `Retry-After` of a
/// 429 when that asks for longer.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = retry_delay_secs(&err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "woocommerce: transient catalog read error; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
