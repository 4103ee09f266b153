//! Signal engine
//!
//! Runs every calculator on one `RawSnapshot`, shapes the results into the
//! eight indicator records and hands them to the composite scorer. Pure: the
//! same snapshot, flags and timestamp always give the same result.

use chrono::{DateTime, Utc};

use crate::error::SignalError;
use crate::indicators::{
    calculate_macd, calculate_rsi, calculate_volatility, calculate_volume_spike,
    find_support_level, MacdResult, RsiResult, RsiSignal, SupportResult, VolatilityResult,
    VolumeSpikeResult,
};
use crate::models::{
    BitcoinData, CompositeScore, ComputationResult, FearGreedReading, IndicatorResult,
    IndicatorStatus, ManualFlags, MarketIndicators, RawSnapshot,
};
use crate::scoring::{self, ScoreInputs};

/// Calculator windows
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volatility_period: usize,
    pub support_lookback: usize,
    pub volume_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volatility_period: 30,
            support_lookback: 20,
            volume_period: 10,
        }
    }
}

/// Compute indicators and the buy signal with default settings, stamped now
pub fn compute(
    snapshot: &RawSnapshot,
    flags: ManualFlags,
) -> Result<ComputationResult, SignalError> {
    compute_with(snapshot, flags, &IndicatorSettings::default(), Utc::now())
}

pub fn compute_with(
    snapshot: &RawSnapshot,
    flags: ManualFlags,
    settings: &IndicatorSettings,
    now: DateTime<Utc>,
) -> Result<ComputationResult, SignalError> {
    validate(snapshot)?;

    let closes = &snapshot.closes;
    let rsi = calculate_rsi(closes, settings.rsi_period);
    let macd = calculate_macd(
        closes,
        settings.macd_fast,
        settings.macd_slow,
        settings.macd_signal,
    );
    let volatility = calculate_volatility(closes, settings.volatility_period);
    let support = find_support_level(closes, settings.support_lookback)?;
    let volume = calculate_volume_spike(&snapshot.volumes, settings.volume_period);

    tracing::debug!(
        rsi = rsi.value,
        macd = macd.macd,
        macd_signal = macd.signal,
        volatility_pct = volatility.annualized_percent,
        support = support.level,
        avg_volume = volume.avg_volume,
        fear_greed = snapshot.fear_greed.value,
        "Calculated indicators"
    );

    let outcome = scoring::calculate_score(&ScoreInputs {
        rsi,
        macd,
        volatility,
        near_support: support.near_support,
        fear_greed: snapshot.fear_greed.value,
        volume_spike: volume.is_spike,
        sentiment_positive: flags.sentiment_positive,
        macro_positive: flags.macro_positive,
    });

    let indicators = MarketIndicators {
        rsi: rsi_indicator(&rsi, settings.rsi_period),
        macd: macd_indicator(&macd),
        volatility: volatility_indicator(&volatility),
        support: support_indicator(&support),
        fear_greed: fear_greed_indicator(&snapshot.fear_greed),
        volume: volume_indicator(&volume),
        sentiment: manual_indicator(
            "Sentiment",
            flags.sentiment_positive,
            scoring::SENTIMENT_POINTS,
            "General market sentiment (manual setting)",
        ),
        macro_factors: manual_indicator(
            "Macro Factors",
            flags.macro_positive,
            scoring::MACRO_POINTS,
            "Macroeconomic conditions (manual setting)",
        ),
    };
    debug_assert_eq!(indicators.total_points(), outcome.score);

    let buy_signal = CompositeScore::from_outcome(outcome, now);

    tracing::info!(
        score = buy_signal.score,
        confidence = %buy_signal.confidence,
        should_buy = buy_signal.should_buy,
        "Computed buy signal"
    );

    Ok(ComputationResult {
        bitcoin_data: BitcoinData {
            price: snapshot.price.usd,
            volume_24h: snapshot.price.usd_24h_vol,
            change_24h: snapshot.price.usd_24h_change.unwrap_or(0.0),
            timestamp: now,
        },
        indicators,
        buy_signal,
    })
}

fn validate(snapshot: &RawSnapshot) -> Result<(), SignalError> {
    if snapshot.closes.is_empty() {
        return Err(SignalError::EmptyCloses);
    }

    if let Some((index, &value)) = snapshot
        .closes
        .iter()
        .enumerate()
        .find(|(_, c)| !c.is_finite() || **c <= 0.0)
    {
        return Err(SignalError::InvalidClose { index, value });
    }

    if snapshot.fear_greed.value > 100 {
        return Err(SignalError::FearGreedOutOfRange(snapshot.fear_greed.value));
    }

    Ok(())
}

// ============================================================================
// Record shaping
// ============================================================================

fn flag_status(positive: bool) -> IndicatorStatus {
    if positive {
        IndicatorStatus::Positive
    } else {
        IndicatorStatus::Neutral
    }
}

fn points_if(met: bool, points: u32) -> u32 {
    if met {
        points
    } else {
        0
    }
}

fn rsi_indicator(rsi: &RsiResult, period: usize) -> IndicatorResult {
    let status = match rsi.signal {
        RsiSignal::Oversold => IndicatorStatus::Positive,
        RsiSignal::Overbought => IndicatorStatus::Negative,
        RsiSignal::Neutral => IndicatorStatus::Neutral,
    };
    let max = scoring::RSI_OVERSOLD_POINTS;

    IndicatorResult::new(
        &format!("RSI ({})", period),
        rsi.value,
        status,
        points_if(rsi.signal == RsiSignal::Oversold, max),
        max,
        "Relative Strength Index - measures momentum",
    )
    .with_signal(rsi.signal.to_string())
}

fn macd_indicator(macd: &MacdResult) -> IndicatorResult {
    let max = scoring::MACD_BUY_POINTS;

    IndicatorResult::new(
        "MACD",
        format!("{:.2}", macd.macd),
        flag_status(macd.buy),
        points_if(macd.buy, max),
        max,
        "Moving Average Convergence Divergence - trend indicator",
    )
    .with_signal(if macd.buy {
        "bullish crossover"
    } else {
        "no signal"
    })
}

fn volatility_indicator(volatility: &VolatilityResult) -> IndicatorResult {
    let max = scoring::LOW_VOLATILITY_POINTS;

    IndicatorResult::new(
        "Volatility",
        format!("{}%", volatility.annualized_percent),
        flag_status(volatility.is_low),
        points_if(volatility.is_low, max),
        max,
        "Price volatility - lower is better for buying",
    )
    .with_signal(if volatility.is_low {
        "low volatility"
    } else {
        "high volatility"
    })
}

fn support_indicator(support: &SupportResult) -> IndicatorResult {
    let max = scoring::NEAR_SUPPORT_POINTS;

    IndicatorResult::new(
        "Support Level",
        format!("${}", format_usd(support.level)),
        flag_status(support.near_support),
        points_if(support.near_support, max),
        max,
        "Price near support levels",
    )
    .with_signal(if support.near_support {
        "near support"
    } else {
        "above support"
    })
}

fn fear_greed_indicator(reading: &FearGreedReading) -> IndicatorResult {
    let fearful = scoring::is_fearful(reading.value);
    let max = scoring::FEAR_POINTS;

    IndicatorResult::new(
        "Fear & Greed",
        reading.value,
        flag_status(fearful),
        points_if(fearful, max),
        max,
        "Market sentiment indicator",
    )
    .with_signal(reading.classification.clone())
}

fn volume_indicator(volume: &VolumeSpikeResult) -> IndicatorResult {
    let max = scoring::VOLUME_SPIKE_POINTS;

    IndicatorResult::new(
        "Volume Spike",
        if volume.is_spike { "Yes" } else { "No" },
        flag_status(volume.is_spike),
        points_if(volume.is_spike, max),
        max,
        "Unusual trading volume activity",
    )
    .with_signal(if volume.is_spike {
        "volume spike detected"
    } else {
        "normal volume"
    })
}

fn manual_indicator(name: &str, positive: bool, max: u32, description: &str) -> IndicatorResult {
    IndicatorResult::new(
        name,
        if positive { "Positive" } else { "Neutral" },
        flag_status(positive),
        points_if(positive, max),
        max,
        description,
    )
    .with_signal("manual override")
}

/// Thousands-separated amount with up to 3 fraction digits, e.g. `61,234.5`
fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
