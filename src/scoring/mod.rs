// Composite scoring
// Aggregates indicator outcomes and manual flags into one buy/wait decision

use chrono::{DateTime, Utc};

use crate::indicators::{MacdResult, RsiResult, RsiSignal, VolatilityResult};
use crate::models::{CompositeScore, Confidence};

pub const RSI_OVERSOLD_POINTS: u32 = 2;
pub const MACD_BUY_POINTS: u32 = 1;
pub const NEAR_SUPPORT_POINTS: u32 = 1;
pub const FEAR_POINTS: u32 = 2;
pub const VOLUME_SPIKE_POINTS: u32 = 1;
pub const LOW_VOLATILITY_POINTS: u32 = 1;
pub const SENTIMENT_POINTS: u32 = 1;
pub const MACRO_POINTS: u32 = 1;

pub const MAX_SCORE: u32 = RSI_OVERSOLD_POINTS
    + MACD_BUY_POINTS
    + NEAR_SUPPORT_POINTS
    + FEAR_POINTS
    + VOLUME_SPIKE_POINTS
    + LOW_VOLATILITY_POINTS
    + SENTIMENT_POINTS
    + MACRO_POINTS;

/// Fear & Greed readings strictly below this count as fear (a buying opportunity)
pub const FEAR_THRESHOLD: u32 = 40;

pub const BUY_THRESHOLD: u32 = 4;
pub const HIGH_CONFIDENCE_THRESHOLD: u32 = 6;

/// Everything the scorer reads; nothing else influences the decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub rsi: RsiResult,
    pub macd: MacdResult,
    pub volatility: VolatilityResult,
    pub near_support: bool,
    pub fear_greed: u32,
    pub volume_spike: bool,
    pub sentiment_positive: bool,
    pub macro_positive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub score: u32,
    pub confidence: Confidence,
    pub should_buy: bool,
}

pub fn is_fearful(fear_greed: u32) -> bool {
    fear_greed < FEAR_THRESHOLD
}

pub fn confidence_for(score: u32) -> Confidence {
    if score >= HIGH_CONFIDENCE_THRESHOLD {
        Confidence::High
    } else if score >= BUY_THRESHOLD {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Sum the fixed weight of every satisfied condition
pub fn calculate_score(inputs: &ScoreInputs) -> ScoreOutcome {
    let weighted = [
        (inputs.rsi.signal == RsiSignal::Oversold, RSI_OVERSOLD_POINTS),
        (inputs.macd.buy, MACD_BUY_POINTS),
        (inputs.near_support, NEAR_SUPPORT_POINTS),
        (is_fearful(inputs.fear_greed), FEAR_POINTS),
        (inputs.volume_spike, VOLUME_SPIKE_POINTS),
        (inputs.volatility.is_low, LOW_VOLATILITY_POINTS),
        (inputs.sentiment_positive, SENTIMENT_POINTS),
        (inputs.macro_positive, MACRO_POINTS),
    ];

    let score: u32 = weighted
        .iter()
        .filter(|(met, _)| *met)
        .map(|(_, points)| points)
        .sum();

    ScoreOutcome {
        score,
        confidence: confidence_for(score),
        should_buy: score >= BUY_THRESHOLD,
    }
}

impl CompositeScore {
    pub fn from_outcome(outcome: ScoreOutcome, computed_at: DateTime<Utc>) -> Self {
        Self {
            score: outcome.score,
            max_score: MAX_SCORE,
            confidence: outcome.confidence,
            should_buy: outcome.should_buy,
            confidence_percentage: confidence_percentage(outcome.score),
            computed_at,
        }
    }
}

/// round(score / 10 * 100)
pub fn confidence_percentage(score: u32) -> u32 {
    (score as f64 / MAX_SCORE as f64 * 100.0).round() as u32
}
