use serde::{Deserialize, Serialize};
use std::fmt;

use super::round_to;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Value reported when there is not enough history, or the series is flat
const RSI_NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSignal {
    Oversold,
    Overbought,
    Neutral,
}

impl fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RsiSignal::Oversold => "oversold",
            RsiSignal::Overbought => "overbought",
            RsiSignal::Neutral => "neutral",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiResult {
    /// RSI rounded to 2 decimals, always within [0, 100]
    pub value: f64,
    pub signal: RsiSignal,
}

impl RsiResult {
    fn neutral() -> Self {
        Self {
            value: RSI_NEUTRAL,
            signal: RsiSignal::Neutral,
        }
    }
}

/// Classify an RSI reading
///
/// - RSI < 30: Oversold
/// - RSI > 70: Overbought
pub fn classify_rsi(rsi: f64) -> RsiSignal {
    if rsi < RSI_OVERSOLD {
        RsiSignal::Oversold
    } else if rsi > RSI_OVERBOUGHT {
        RsiSignal::Overbought
    } else {
        RsiSignal::Neutral
    }
}

/// Calculate Relative Strength Index (RSI) with Wilder smoothing
///
/// The first `period` deltas seed the average gain/loss; every later delta is
/// folded in with `avg = (avg * (period - 1) + x) / period`.
///
/// Fallbacks:
/// - fewer than `period + 1` closes: 50 / neutral
/// - no losses but some gains: 100 (unbounded RS)
/// - no gains and no losses (flat series): 50 / neutral
pub fn calculate_rsi(closes: &[f64], period: usize) -> RsiResult {
    if period == 0 || closes.len() < period + 1 {
        return RsiResult::neutral();
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for window in closes[..=period].windows(2) {
        let change = window[1] - window[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let period_f = period as f64;
    let mut avg_gain = gains / period_f;
    let mut avg_loss = losses / period_f;

    for window in closes[period..].windows(2) {
        let change = window[1] - window[0];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
    }

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return RsiResult::neutral();
        }
        return RsiResult {
            value: 100.0,
            signal: RsiSignal::Overbought,
        };
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));

    RsiResult {
        value: round_to(rsi, 2),
        signal: classify_rsi(rsi),
    }
}
