//! Market data feed
//!
//! Gathers one `RawSnapshot` per cycle from CoinGecko and the Fear & Greed
//! API. The three acquisitions run concurrently and the cycle fails if any of
//! them fails. Snapshots are cached for a configurable window; the signal
//! engine still recomputes on every cached read.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::api::{ApiStatusError, CoinGeckoClient, FearGreedClient};
use crate::config::AppConfig;
use crate::models::{PriceQuote, RawSnapshot};

struct CachedSnapshot {
    snapshot: RawSnapshot,
    fetched_at: Instant,
}

/// Cloneable; all clones share the same cache
#[derive(Clone)]
pub struct MarketDataFeed {
    coingecko: CoinGeckoClient,
    fear_greed: FearGreedClient,
    history_days: u32,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CachedSnapshot>>>,
}

impl MarketDataFeed {
    pub fn new(
        coingecko: CoinGeckoClient,
        fear_greed: FearGreedClient,
        history_days: u32,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            coingecko,
            fear_greed,
            history_days,
            cache_ttl,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let coingecko = CoinGeckoClient::new(
            &config.coingecko_base_url,
            config.coingecko_api_key.clone(),
            config.request_timeout(),
        )?;
        let fear_greed = FearGreedClient::new(&config.fear_greed_url, config.request_timeout())?;

        Ok(Self::new(
            coingecko,
            fear_greed,
            config.history_days,
            config.cache_ttl(),
        ))
    }

    /// Cached snapshot if still fresh, otherwise a new fetch
    pub async fn snapshot(&self) -> Result<RawSnapshot> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.cache_ttl {
                tracing::debug!(
                    age_secs = cached.fetched_at.elapsed().as_secs(),
                    "Using cached market snapshot"
                );
                return Ok(cached.snapshot.clone());
            }
        }

        self.fetch_and_cache().await
    }

    /// Drop the cache and fetch again
    pub async fn refresh(&self) -> Result<RawSnapshot> {
        *self.cache.write().await = None;
        self.fetch_and_cache().await
    }

    async fn fetch_and_cache(&self) -> Result<RawSnapshot> {
        let snapshot = self.fetch_snapshot().await?;

        *self.cache.write().await = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });

        Ok(snapshot)
    }

    /// Fetch price, candles and sentiment concurrently, all or nothing
    pub async fn fetch_snapshot(&self) -> Result<RawSnapshot> {
        let ((price, volumes), candles, fear_greed) = tokio::try_join!(
            self.fetch_price_and_volumes(),
            self.coingecko.get_ohlc(self.history_days),
            self.fear_greed.get_index(),
        )?;

        tracing::info!(
            price = price.usd,
            candles = candles.len(),
            volumes = volumes.len(),
            fear_greed = fear_greed.value,
            "Fetched market snapshot"
        );

        Ok(RawSnapshot::from_candles(price, volumes, &candles, fear_greed))
    }

    /// An error status on the volume chart leaves the volume indicator at
    /// "no spike". Network and decoding failures still fail the cycle.
    async fn fetch_price_and_volumes(&self) -> Result<(PriceQuote, Vec<f64>)> {
        let price = self.coingecko.get_price().await?;

        let volumes = match self.coingecko.get_daily_volumes(self.history_days).await {
            Ok(volumes) => volumes,
            Err(e) if e.is::<ApiStatusError>() => {
                tracing::warn!("Volume history unavailable, continuing without it: {:#}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok((price, volumes))
    }
}
