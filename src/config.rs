use anyhow::{Context, Result};
use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::api::{COINGECKO_API_BASE, FEAR_GREED_API};

const CONFIG_FILE: &str = "btc-signal";
const ENV_PREFIX: &str = "BTC_SIGNAL";

/// Runtime configuration
///
/// Sources, lowest to highest precedence: built-in defaults, an optional
/// `btc-signal.toml` in the working directory, `BTC_SIGNAL_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub coingecko_base_url: String,
    #[serde(default)]
    pub coingecko_api_key: Option<String>,
    pub fear_greed_url: String,
    /// Days of price/volume history requested per cycle
    pub history_days: u32,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::with_defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = ::config::Config::builder()
            .set_default("coingecko_base_url", COINGECKO_API_BASE)?
            .set_default("fear_greed_url", FEAR_GREED_API)?
            .set_default("history_days", 30_i64)?
            .set_default("cache_ttl_secs", 300_i64)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("log_filter", "btc_signal=info")?;
        Ok(builder)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
