use btc_signal::indicators::{
    calculate_macd, calculate_rsi, calculate_volatility, MacdResult, RsiResult, RsiSignal,
    VolatilityResult,
};
use btc_signal::scoring::{calculate_score, ScoreInputs};
use btc_signal::synthetic::{MarketScenario, SyntheticMarket};
use btc_signal::*;
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct Triggers {
    rsi_oversold: bool,
    macd_buy: bool,
    near_support: bool,
    fearful: bool,
    volume_spike: bool,
    low_volatility: bool,
    sentiment: bool,
    macro_positive: bool,
}

impl Triggers {
    fn from_bits(bits: u32) -> Self {
        let bit = |i: u32| bits & (1 << i) != 0;
        Self {
            rsi_oversold: bit(0),
            macd_buy: bit(1),
            near_support: bit(2),
            fearful: bit(3),
            volume_spike: bit(4),
            low_volatility: bit(5),
            sentiment: bit(6),
            macro_positive: bit(7),
        }
    }

    fn inputs(&self) -> ScoreInputs {
        ScoreInputs {
            rsi: RsiResult {
                value: if self.rsi_oversold { 22.0 } else { 55.0 },
                signal: if self.rsi_oversold {
                    RsiSignal::Oversold
                } else {
                    RsiSignal::Neutral
                },
            },
            macd: MacdResult {
                buy: self.macd_buy,
                ..MacdResult::default()
            },
            volatility: VolatilityResult {
                is_low: self.low_volatility,
                ..VolatilityResult::default()
            },
            near_support: self.near_support,
            fear_greed: if self.fearful { 35 } else { 60 },
            volume_spike: self.volume_spike,
            sentiment_positive: self.sentiment,
            macro_positive: self.macro_positive,
        }
    }

    /// Weight table summed by hand
    fn expected_score(&self) -> u32 {
        let mut score = 0;
        if self.rsi_oversold {
            score += 2;
        }
        if self.macd_buy {
            score += 1;
        }
        if self.near_support {
            score += 1;
        }
        if self.fearful {
            score += 2;
        }
        if self.volume_spike {
            score += 1;
        }
        if self.low_volatility {
            score += 1;
        }
        if self.sentiment {
            score += 1;
        }
        if self.macro_positive {
            score += 1;
        }
        score
    }
}

fn snapshot(closes: Vec<f64>, volumes: Vec<f64>, fear_greed: u32) -> RawSnapshot {
    RawSnapshot {
        price: PriceQuote {
            usd: *closes.last().unwrap(),
            usd_24h_vol: 28_500_000_000.0,
            usd_24h_change: Some(-1.25),
        },
        volumes,
        closes,
        fear_greed: FearGreedReading {
            value: fear_greed,
            classification: "Fear".to_string(),
        },
    }
}

fn random_walk(rng: &mut StdRng, len: usize) -> Vec<f64> {
    let mut price = 50_000.0;
    (0..len)
        .map(|_| {
            price *= 1.0 + rng.gen_range(-0.05..0.05);
            price
        })
        .collect()
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_score_exhaustive_over_all_trigger_combinations() {
    for bits in 0..256 {
        let triggers = Triggers::from_bits(bits);
        let outcome = calculate_score(&triggers.inputs());
        let expected = triggers.expected_score();

        assert_eq!(outcome.score, expected, "triggers: {:?}", triggers);
        assert_eq!(outcome.should_buy, expected >= 4, "triggers: {:?}", triggers);

        let expected_confidence = if expected >= 6 {
            Confidence::High
        } else if expected >= 4 {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        assert_eq!(outcome.confidence, expected_confidence, "triggers: {:?}", triggers);
    }
}

#[test]
fn test_scenario_strong_buy() {
    let triggers = Triggers {
        rsi_oversold: true,
        macd_buy: true,
        near_support: true,
        fearful: true,
        low_volatility: true,
        ..Triggers::default()
    };
    let composite =
        CompositeScore::from_outcome(calculate_score(&triggers.inputs()), Utc::now());

    assert_eq!(composite.score, 7);
    assert!(composite.should_buy);
    assert_eq!(composite.confidence, Confidence::High);
    assert_eq!(composite.confidence_percentage, 70);
    assert_eq!(composite.max_score, 10);
}

#[test]
fn test_scenario_nothing_favorable() {
    let composite =
        CompositeScore::from_outcome(calculate_score(&Triggers::default().inputs()), Utc::now());

    assert_eq!(composite.score, 0);
    assert!(!composite.should_buy);
    assert_eq!(composite.confidence, Confidence::Low);
    assert_eq!(composite.confidence_percentage, 0);
}

#[test]
fn test_scenario_exactly_at_buy_threshold() {
    let triggers = Triggers {
        fearful: true,
        macd_buy: true,
        near_support: true,
        ..Triggers::default()
    };
    let outcome = calculate_score(&triggers.inputs());

    assert_eq!(outcome.score, 4);
    assert!(outcome.should_buy);
    assert_eq!(outcome.confidence, Confidence::Medium);
}

// ============================================================================
// Indicator properties
// ============================================================================

#[test]
fn test_rsi_always_within_bounds() {
    let mut rng = StdRng::seed_from_u64(2024);
    for len in [1, 10, 15, 16, 30, 100, 365] {
        let closes = random_walk(&mut rng, len);
        let rsi = calculate_rsi(&closes, 14);
        assert!((0.0..=100.0).contains(&rsi.value), "len {}: {}", len, rsi.value);
    }
}

#[test]
fn test_rsi_monotonic_increase_is_exactly_100() {
    for len in [15, 16, 40, 200] {
        let closes: Vec<f64> = (0..len).map(|i| 30_000.0 + i as f64 * 17.5).collect();
        assert_eq!(calculate_rsi(&closes, 14).value, 100.0, "len {}", len);
    }
}

#[test]
fn test_rsi_short_and_flat_defaults_are_neutral() {
    let short: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
    let rsi = calculate_rsi(&short, 14);
    assert_eq!(rsi.value, 50.0);
    assert_eq!(rsi.signal, RsiSignal::Neutral);

    let flat = vec![42_000.0; 50];
    let rsi = calculate_rsi(&flat, 14);
    assert_eq!(rsi.value, 50.0);
    assert_eq!(rsi.signal, RsiSignal::Neutral);
}

#[test]
fn test_volatility_never_negative_on_random_walks() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..20 {
        let closes = random_walk(&mut rng, 60);
        let volatility = calculate_volatility(&closes, 30);
        assert!(volatility.value >= 0.0);
        assert!(volatility.annualized_percent >= 0.0);
    }
}

#[test]
fn test_macd_crossover_through_engine() {
    let mut closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
    closes.push(200.0);
    assert!(calculate_macd(&closes, 12, 26, 9).buy);

    let result = compute(&snapshot(closes, vec![], 50), ManualFlags::default()).unwrap();
    assert_eq!(result.indicators.macd.status, IndicatorStatus::Positive);
    assert_eq!(result.indicators.macd.points, 1);
    assert_eq!(
        result.indicators.macd.signal.as_deref(),
        Some("bullish crossover")
    );
}

// ============================================================================
// Engine end-to-end
// ============================================================================

#[test]
fn test_capitulation_market_triggers_buy() {
    let _ = tracing_subscriber::fmt::try_init();

    let snapshot = SyntheticMarket::new(11).generate(MarketScenario::Capitulation, 90);
    let result = compute(&snapshot, ManualFlags::default()).unwrap();
    let indicators = &result.indicators;

    assert_eq!(indicators.support.points, 1);
    assert_eq!(indicators.volume.points, 1);
    assert_eq!(indicators.fear_greed.points, 2);
    assert!(result.buy_signal.should_buy);
    assert!(result.buy_signal.score >= 4);
    assert_eq!(indicators.total_points(), result.buy_signal.score);
}

#[test]
fn test_manual_flags_are_read_per_call() {
    let snapshot = SyntheticMarket::new(5).generate(MarketScenario::Sideways, 60);
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let settings = IndicatorSettings::default();

    let without = compute_with(&snapshot, ManualFlags::default(), &settings, now).unwrap();
    let with = compute_with(
        &snapshot,
        ManualFlags {
            sentiment_positive: true,
            macro_positive: true,
        },
        &settings,
        now,
    )
    .unwrap();

    assert_eq!(with.buy_signal.score, without.buy_signal.score + 2);
    assert_eq!(with.indicators.sentiment.value, IndicatorValue::from("Positive"));
    assert_eq!(without.indicators.macro_factors.value, IndicatorValue::from("Neutral"));
}

#[test]
fn test_compute_is_pure() {
    let snapshot = SyntheticMarket::new(8).generate(MarketScenario::Volatile, 120);
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
    let settings = IndicatorSettings::default();
    let flags = ManualFlags {
        sentiment_positive: true,
        macro_positive: false,
    };

    let first = compute_with(&snapshot, flags, &settings, now).unwrap();
    let second = compute_with(&snapshot, flags, &settings, now).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_result_json_shape() {
    let snapshot = SyntheticMarket::new(21).generate(MarketScenario::Uptrend, 60);
    let result = compute(&snapshot, ManualFlags::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["bitcoinData"]["volume24h"].is_number());
    assert!(json["bitcoinData"]["change24h"].is_number());
    for key in [
        "rsi",
        "macd",
        "volatility",
        "support",
        "fearGreed",
        "volume",
        "sentiment",
        "macro",
    ] {
        assert!(json["indicators"][key]["maxPoints"].is_number(), "missing {}", key);
    }
    assert_eq!(json["buySignal"]["maxScore"], 10);
    assert!(json["buySignal"]["confidencePercentage"].is_number());
    assert!(json["buySignal"]["confidence"].is_string());
}

#[test]
fn test_empty_closes_fail_fast() {
    let snapshot = RawSnapshot {
        price: PriceQuote {
            usd: 60_000.0,
            usd_24h_vol: 1.0,
            usd_24h_change: None,
        },
        volumes: vec![1.0, 2.0],
        closes: vec![],
        fear_greed: FearGreedReading {
            value: 50,
            classification: "Neutral".to_string(),
        },
    };

    assert_eq!(
        compute(&snapshot, ManualFlags::default()).unwrap_err(),
        SignalError::EmptyCloses
    );
}
