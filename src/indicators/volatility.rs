use serde::{Deserialize, Serialize};

use super::round_to;

/// Annualized volatility (percent) below which the market counts as calm
pub const LOW_VOLATILITY_PERCENT: f64 = 60.0;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityResult {
    /// Daily volatility (sample std dev of log returns), 6 decimals
    pub value: f64,
    /// Annualized volatility in percent, 2 decimals
    pub annualized_percent: f64,
    pub is_low: bool,
}

/// Strictly below 60%: exactly 60.00 is not low
pub fn is_low_volatility(annualized_percent: f64) -> bool {
    annualized_percent < LOW_VOLATILITY_PERCENT
}

/// Calculate trailing annualized volatility from daily closes
///
/// Uses the last `period` log returns of the series with a sample variance
/// (n - 1 denominator) and annualizes with sqrt(365).
pub fn calculate_volatility(closes: &[f64], period: usize) -> VolatilityResult {
    if closes.len() < period {
        return VolatilityResult::default();
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    let start = returns.len().saturating_sub(period);
    let recent = &returns[start..];
    if recent.len() < 2 {
        return VolatilityResult::default();
    }

    let n = recent.len() as f64;
    let mean = recent.iter().sum::<f64>() / n;
    let variance = recent.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    let daily_volatility = variance.sqrt();
    let annualized_percent = daily_volatility * DAYS_PER_YEAR.sqrt() * 100.0;

    VolatilityResult {
        value: round_to(daily_volatility, 6),
        annualized_percent: round_to(annualized_percent, 2),
        is_low: is_low_volatility(annualized_percent),
    }
}
