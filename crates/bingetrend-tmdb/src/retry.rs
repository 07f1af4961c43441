//! Retry with exponential back-off and jitter for the TMDB client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors. Everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::TmdbError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retried: timeouts, connection failures, HTTP 429 and HTTP 5xx.
/// A rejected key, a missing record or a malformed body is final.
pub(crate) fn is_retriable(err: &TmdbError) -> bool {
    match err {
        TmdbError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        TmdbError::RateLimited { .. } => true,
        TmdbError::UnexpectedStatus { status, .. } => *status >= 500,
        TmdbError::Unauthorized
        | TmdbError::NotFound { .. }
        | TmdbError::Deserialize { .. }
        | TmdbError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
///
/// A `Retry-After` hint from a 429 takes precedence over the schedule.
fn base_delay_ms(err: &TmdbError, attempt: u32, backoff_base_ms: u64) -> u64 {
    if let TmdbError::RateLimited {
        retry_after_secs: Some(secs),
    } = err
    {
        if backoff_base_ms > 0 {
            return secs.saturating_mul(1_000).min(MAX_DELAY_MS);
        }
    }
    backoff_base_ms
        .saturating_mul(1u64 << (attempt - 1).min(10))
        .min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// With `backoff_base_ms = 500` the sleeps are 500 ms, 1 s, 2 s, ... each
/// with ±25 % jitter, capped at 30 s. A base of `0` retries immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, TmdbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TmdbError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(&err, attempt, backoff_base_ms);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "TMDB transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
