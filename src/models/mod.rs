use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Inputs (from the data-acquisition side)
// ============================================================================

/// Spot price quote as reported by CoinGecko's simple price endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd: f64,
    pub usd_24h_vol: f64,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

/// OHLC candle; `timestamp` is unix milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcCandle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Fear & Greed index reading (0 = extreme fear, 100 = extreme greed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreedReading {
    pub value: u32,
    pub classification: String,
}

/// Everything one computation cycle needs from upstream
///
/// `closes` and `volumes` are chronological ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    pub price: PriceQuote,
    pub volumes: Vec<f64>,
    pub closes: Vec<f64>,
    pub fear_greed: FearGreedReading,
}

impl RawSnapshot {
    /// Build a snapshot from OHLC candles, keeping only the closes
    pub fn from_candles(
        price: PriceQuote,
        volumes: Vec<f64>,
        candles: &[OhlcCandle],
        fear_greed: FearGreedReading,
    ) -> Self {
        Self {
            price,
            volumes,
            closes: candles.iter().map(|c| c.close).collect(),
            fear_greed,
        }
    }
}

/// Qualitative flags set by the user, passed by value into each computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualFlags {
    pub sentiment_positive: bool,
    pub macro_positive: bool,
}

// ============================================================================
// Outputs (to the presentation side)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    Positive,
    Negative,
    Neutral,
}

/// Display value of an indicator: either a number or preformatted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorValue::Number(n) => write!(f, "{}", n),
            IndicatorValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for IndicatorValue {
    fn from(value: f64) -> Self {
        IndicatorValue::Number(value)
    }
}

impl From<u32> for IndicatorValue {
    fn from(value: u32) -> Self {
        IndicatorValue::Number(value as f64)
    }
}

impl From<String> for IndicatorValue {
    fn from(value: String) -> Self {
        IndicatorValue::Text(value)
    }
}

impl From<&str> for IndicatorValue {
    fn from(value: &str) -> Self {
        IndicatorValue::Text(value.to_string())
    }
}

/// One scored indicator, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorResult {
    pub name: String,
    pub value: IndicatorValue,
    pub status: IndicatorStatus,
    pub points: u32,
    pub max_points: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
}

impl IndicatorResult {
    /// Create a record; `points` is capped at `max_points`
    pub fn new(
        name: &str,
        value: impl Into<IndicatorValue>,
        status: IndicatorStatus,
        points: u32,
        max_points: u32,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            status,
            points: points.min(max_points),
            max_points,
            description: description.to_string(),
            signal: None,
        }
    }

    pub fn with_signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = Some(signal.into());
        self
    }
}

/// The eight indicators that feed the composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndicators {
    pub rsi: IndicatorResult,
    pub macd: IndicatorResult,
    pub volatility: IndicatorResult,
    pub support: IndicatorResult,
    pub fear_greed: IndicatorResult,
    pub volume: IndicatorResult,
    pub sentiment: IndicatorResult,
    #[serde(rename = "macro")]
    pub macro_factors: IndicatorResult,
}

impl MarketIndicators {
    /// Indicators in display order, keyed the way they serialize
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &IndicatorResult)> {
        [
            ("rsi", &self.rsi),
            ("macd", &self.macd),
            ("volatility", &self.volatility),
            ("support", &self.support),
            ("fearGreed", &self.fear_greed),
            ("volume", &self.volume),
            ("sentiment", &self.sentiment),
            ("macro", &self.macro_factors),
        ]
        .into_iter()
    }

    pub fn total_points(&self) -> u32 {
        self.iter().map(|(_, indicator)| indicator.points).sum()
    }
}

/// Headline market numbers for the current cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitcoinData {
    pub price: f64,
    pub volume_24h: f64,
    pub change_24h: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        };
        f.write_str(label)
    }
}

/// Final buy/wait decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScore {
    pub score: u32,
    pub max_score: u32,
    pub confidence: Confidence,
    pub should_buy: bool,
    pub confidence_percentage: u32,
    pub computed_at: DateTime<Utc>,
}

/// Complete output of one computation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationResult {
    pub bitcoin_data: BitcoinData,
    pub indicators: MarketIndicators,
    pub buy_signal: CompositeScore,
}
