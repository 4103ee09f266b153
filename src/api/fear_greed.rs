use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{
    build_http_client, get_with_retry, per_minute_limiter, DirectRateLimiter, RetryPolicy,
};
use crate::models::FearGreedReading;

pub const FEAR_GREED_API: &str = "https://api.alternative.me/fng/";
const RATE_LIMIT_RPM: u32 = 10;

/// Client for the alternative.me Crypto Fear & Greed Index
#[derive(Clone)]
pub struct FearGreedClient {
    client: Client,
    url: String,
    rate_limiter: Arc<DirectRateLimiter>,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    #[serde(default)]
    data: Vec<FearGreedEntry>,
}

/// The API reports every field as a string
#[derive(Debug, Deserialize)]
struct FearGreedEntry {
    value: String,
    value_classification: String,
}

impl FearGreedClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            url: url.to_string(),
            rate_limiter: per_minute_limiter(RATE_LIMIT_RPM),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Latest index reading
    pub async fn get_index(&self) -> Result<FearGreedReading> {
        tracing::debug!("Fetching Fear & Greed Index");

        let response = get_with_retry(
            &self.client,
            &self.rate_limiter,
            &self.retry,
            &self.url,
            "Fear & Greed",
        )
        .await?;
        let body: FearGreedResponse = response
            .json()
            .await
            .context("Failed to parse Fear & Greed response")?;

        parse_reading(body)
    }
}

fn parse_reading(body: FearGreedResponse) -> Result<FearGreedReading> {
    let current = body
        .data
        .into_iter()
        .next()
        .context("Invalid Fear & Greed data format: empty data")?;

    let value: u32 = current
        .value
        .trim()
        .parse()
        .with_context(|| format!("Invalid Fear & Greed value: {:?}", current.value))?;
    if value > 100 {
        anyhow::bail!("Fear & Greed value {} outside 0..=100", value);
    }

    Ok(FearGreedReading {
        value,
        classification: current.value_classification,
    })
}
