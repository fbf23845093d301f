//! Bounded retry loop around a single fetch attempt.

use std::future::Future;

use crate::error::NetworkError;

use super::backoff::BackoffPolicy;
use super::delay::Delay;

/// Runs `operation` up to `max_attempts` times in total.
///
/// Errors for which [`NetworkError::is_retriable`] is `false` are returned
/// immediately. Between attempts the call waits `policy.delay_for(n, jitter)`
/// through `delay`, with a fresh jitter factor each time.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    policy: BackoffPolicy,
    delay: &dyn Delay,
    mut operation: F,
) -> Result<T, NetworkError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, NetworkError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retriable() || attempt >= max_attempts {
            return Err(err);
        }

        let wait = policy.delay_for(attempt - 1, BackoffPolicy::sample_jitter());
        #[allow(clippy::cast_possible_truncation)]
        let delay_ms = wait.as_millis() as u64;
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms,
            url = %err.url,
            error = %err,
            "fetch: transient error, retrying after backoff"
        );
        delay.sleep(wait).await;
        attempt += 1;
    }
}
