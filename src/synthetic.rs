use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{FearGreedReading, PriceQuote, RawSnapshot};

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+1% daily average)
    Uptrend,
    /// Steady downtrend with noise (-1.5% daily average)
    Downtrend,
    /// Sideways/choppy market (±1.5% around mean)
    Sideways,
    /// High volatility (±6% large swings)
    Volatile,
    /// Calm range, then a week of -5% days on surging volume
    Capitulation,
}

impl MarketScenario {
    /// Typical Fear & Greed reading for the scenario
    fn base_fear_greed(&self) -> u32 {
        match self {
            MarketScenario::Uptrend => 72,
            MarketScenario::Downtrend => 30,
            MarketScenario::Sideways => 50,
            MarketScenario::Volatile => 45,
            MarketScenario::Capitulation => 12,
        }
    }
}

/// Fear & Greed classification buckets
pub fn classify_fear_greed(value: u32) -> &'static str {
    match value {
        0..=24 => "Extreme Fear",
        25..=44 => "Fear",
        45..=55 => "Neutral",
        56..=75 => "Greed",
        _ => "Extreme Greed",
    }
}

const CAPITULATION_DAYS: usize = 8;

/// Generates daily synthetic BTC market snapshots
pub struct SyntheticMarket {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticMarket {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 60_000.0,
            base_volume: 30_000_000_000.0,
        }
    }

    /// Generate `days` aligned daily closes and volumes plus a sentiment reading
    pub fn generate(&mut self, scenario: MarketScenario, days: usize) -> RawSnapshot {
        let days = days.max(2);
        let mut closes = Vec::with_capacity(days);
        let mut volumes = Vec::with_capacity(days);
        let mut price = self.base_price;

        for day in 0..days {
            let days_left = days - day;
            let change = match scenario {
                MarketScenario::Uptrend => 0.01 + self.rng.gen_range(-0.01..0.01),
                MarketScenario::Downtrend => -0.015 + self.rng.gen_range(-0.01..0.01),
                MarketScenario::Sideways => self.mean_reversion(price),
                MarketScenario::Volatile => self.rng.gen_range(-0.06..0.06),
                MarketScenario::Capitulation if days_left <= CAPITULATION_DAYS => -0.05,
                MarketScenario::Capitulation => self.mean_reversion(price),
            };
            if day > 0 {
                price *= 1.0 + change;
            }
            // Prevent price from going too low
            price = price.max(self.base_price * 0.2);

            let mut volume = self.base_volume * self.rng.gen_range(0.8..1.2);
            if scenario == MarketScenario::Capitulation && days_left == 1 {
                volume *= 3.0;
            }

            closes.push(price);
            volumes.push(volume);
        }

        let first = closes[0];
        let last = closes[days - 1];
        let prev = closes[days - 2];
        let fear_greed = self.fear_greed(scenario);

        tracing::debug!(?scenario, days, first, last, fear_greed, "Generated synthetic market");

        RawSnapshot {
            price: PriceQuote {
                usd: last,
                usd_24h_vol: volumes[days - 1],
                usd_24h_change: Some((last / prev - 1.0) * 100.0),
            },
            volumes,
            closes,
            fear_greed: FearGreedReading {
                value: fear_greed,
                classification: classify_fear_greed(fear_greed).to_string(),
            },
        }
    }

    /// 10% pull back to the mean plus ±1.5% noise
    fn mean_reversion(&mut self, price: f64) -> f64 {
        let reversion = (self.base_price - price) / price * 0.1;
        reversion + self.rng.gen_range(-0.015..0.015)
    }

    fn fear_greed(&mut self, scenario: MarketScenario) -> u32 {
        let jitter: i64 = self.rng.gen_range(-5..=5);
        (scenario.base_fear_greed() as i64 + jitter).clamp(0, 100) as u32
    }
}
