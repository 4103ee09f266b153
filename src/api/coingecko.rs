use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{
    build_http_client, get_with_retry, per_minute_limiter, DirectRateLimiter, RetryPolicy,
};
use crate::models::{OhlcCandle, PriceQuote};

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
const RATE_LIMIT_RPM: u32 = 50;
const COIN_ID: &str = "bitcoin";

/// CoinGecko API client for Bitcoin market data
///
/// Cloneable; all clones share the same rate limiter.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<DirectRateLimiter>,
    retry: RetryPolicy,
}

/// Response from /market_chart endpoint
#[derive(Debug, Deserialize)]
struct MarketChartData {
    #[serde(default)]
    total_volumes: Vec<[f64; 2]>, // [timestamp_ms, volume]
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            rate_limiter: per_minute_limiter(RATE_LIMIT_RPM),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Append the demo API key, when configured, to a query string
    fn url(&self, path_and_query: &str) -> String {
        match &self.api_key {
            Some(key) => format!(
                "{}{}&x_cg_demo_api_key={}",
                self.base_url, path_and_query, key
            ),
            None => format!("{}{}", self.base_url, path_and_query),
        }
    }

    /// Current BTC price with 24h volume and change
    pub async fn get_price(&self) -> Result<PriceQuote> {
        let url = self.url(&format!(
            "/simple/price?ids={}&vs_currencies=usd&include_24hr_vol=true&include_24hr_change=true",
            COIN_ID
        ));

        tracing::debug!("Fetching {} spot price", COIN_ID);

        let response = get_with_retry(
            &self.client,
            &self.rate_limiter,
            &self.retry,
            &url,
            "CoinGecko",
        )
        .await?;
        let mut data: HashMap<String, PriceQuote> = response
            .json()
            .await
            .context("Failed to parse simple price")?;

        data.remove(COIN_ID)
            .context("Invalid response format from CoinGecko: missing bitcoin entry")
    }

    /// Daily traded volumes, oldest first
    pub async fn get_daily_volumes(&self, days: u32) -> Result<Vec<f64>> {
        let url = self.url(&format!(
            "/coins/{}/market_chart?vs_currency=usd&days={}&interval=daily",
            COIN_ID, days
        ));

        tracing::debug!("Fetching {} volume chart ({}d)", COIN_ID, days);

        let response = get_with_retry(
            &self.client,
            &self.rate_limiter,
            &self.retry,
            &url,
            "CoinGecko",
        )
        .await?;
        let data: MarketChartData = response
            .json()
            .await
            .context("Failed to parse market chart")?;

        Ok(data.total_volumes.iter().map(|point| point[1]).collect())
    }

    /// OHLC candles, oldest first
    pub async fn get_ohlc(&self, days: u32) -> Result<Vec<OhlcCandle>> {
        let url = self.url(&format!(
            "/coins/{}/ohlc?vs_currency=usd&days={}",
            COIN_ID, days
        ));

        tracing::debug!("Fetching {} OHLC ({}d)", COIN_ID, days);

        let response = get_with_retry(
            &self.client,
            &self.rate_limiter,
            &self.retry,
            &url,
            "CoinGecko",
        )
        .await?;
        let raw: Vec<[f64; 5]> = response
            .json()
            .await
            .context("Invalid OHLC data format from CoinGecko")?;

        tracing::debug!("Fetched {} candles", raw.len());

        Ok(raw
            .into_iter()
            .map(|[timestamp, open, high, low, close]| OhlcCandle {
                timestamp: timestamp as i64,
                open,
                high,
                low,
                close,
            })
            .collect())
    }
}
