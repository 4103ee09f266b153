pub mod coingecko;
pub mod fear_greed;

pub use coingecko::{CoinGeckoClient, COINGECKO_API_BASE};
pub use fear_greed::{FearGreedClient, FEAR_GREED_API};

use anyhow::{Context, Result};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const MAX_RETRIES: u32 = 3;

/// Attempts per request and the base of the exponential backoff
///
/// The wait after failed attempt `n` is `base_delay * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// The API answered, but not with a success status
#[derive(Debug, thiserror::Error)]
#[error("{source_name} API error ({status}): {body}")]
pub struct ApiStatusError {
    pub source_name: String,
    pub status: StatusCode,
    pub body: String,
}

// Type alias for the rate limiter to simplify signatures
pub(crate) type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn per_minute_limiter(requests_per_minute: u32) -> Arc<DirectRateLimiter> {
    let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(rpm)))
}

/// Rate-limited GET with retry on 429 and 5xx
///
/// Other 4xx responses fail immediately with the response body attached.
/// Any unsuccessful status surfaces as an [`ApiStatusError`].
pub(crate) async fn get_with_retry(
    client: &Client,
    rate_limiter: &DirectRateLimiter,
    retry: &RetryPolicy,
    url: &str,
    source: &str,
) -> Result<reqwest::Response> {
    let max_attempts = retry.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        rate_limiter.until_ready().await;

        let backoff = retry.backoff(attempt);
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response);
                }

                let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
                if retryable && attempt < max_attempts {
                    tracing::warn!(
                        "{} responded {}, backing off for {:?} (attempt {}/{})",
                        source,
                        status,
                        backoff,
                        attempt,
                        max_attempts
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }

                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ApiStatusError {
                    source_name: source.to_string(),
                    status,
                    body,
                }
                .into());
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    "Network error from {}: {}, retrying in {:?} (attempt {}/{})",
                    source,
                    e,
                    backoff,
                    attempt,
                    max_attempts
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Network error from {} after {} attempts", source, max_attempts)
                })
            }
        }
    }

    anyhow::bail!("{}: failed after {} attempts", source, max_attempts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_doubles_from_two_seconds() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.backoff(1), Duration::from_secs(2));
        assert_eq!(retry.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_status_error_message() {
        let err = ApiStatusError {
            source_name: "CoinGecko".to_string(),
            status: StatusCode::NOT_FOUND,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "CoinGecko API error (404 Not Found): not found");
    }
}
