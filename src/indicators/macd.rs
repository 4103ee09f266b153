/// Moving Average Convergence Divergence (MACD)
///
/// MACD line = EMA(fast) - EMA(slow) over the whole close series, both seeded
/// from the first close. The signal line is an EMA of the MACD line starting at
/// index `slow - 1`, the first bar where the slow EMA counts as settled.
use serde::{Deserialize, Serialize};

use super::moving_average::calculate_ema_series;
use super::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Bullish crossover on the most recent bar
    pub buy: bool,
}

/// True when the MACD line crosses above the signal line on the latest bar
pub fn is_bullish_crossover(prev_macd: f64, prev_signal: f64, macd: f64, signal: f64) -> bool {
    prev_macd <= prev_signal && macd > signal
}

/// Calculate MACD with a one-bar-lookback crossover flag
///
/// Returns all zeros (and no buy) when there are fewer closes than `slow`.
/// Numeric fields are rounded to 4 decimals; the crossover is decided on the
/// unrounded values.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdResult {
    if slow == 0 || closes.len() < slow {
        return MacdResult::default();
    }

    let fast_ema = calculate_ema_series(closes, fast);
    let slow_ema = calculate_ema_series(closes, slow);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = calculate_ema_series(&macd_line[slow - 1..], signal);

    let current_macd = last_or_zero(&macd_line, 1);
    let current_signal = last_or_zero(&signal_line, 1);
    let prev_macd = last_or_zero(&macd_line, 2);
    let prev_signal = last_or_zero(&signal_line, 2);

    let histogram = current_macd - current_signal;
    let buy = is_bullish_crossover(prev_macd, prev_signal, current_macd, current_signal);

    MacdResult {
        macd: round_to(current_macd, 4),
        signal: round_to(current_signal, 4),
        histogram: round_to(histogram, 4),
        buy,
    }
}

/// Element `back` positions from the end (1 = last), or 0.0 when missing
fn last_or_zero(series: &[f64], back: usize) -> f64 {
    series
        .len()
        .checked_sub(back)
        .and_then(|idx| series.get(idx))
        .copied()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Long decline followed by a sharp rebound on the final bar
    fn crossover_series() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        closes.push(200.0);
        closes
    }

    #[test]
    fn test_macd_insufficient_data() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let result = calculate_macd(&closes, 12, 26, 9);

        assert_eq!(result, MacdResult::default());
        assert!(!result.buy);
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let closes = vec![100.0; 60];
        let result = calculate_macd(&closes, 12, 26, 9);

        assert_eq!(result.macd, 0.0);
        assert_eq!(result.signal, 0.0);
        assert_eq!(result.histogram, 0.0);
        assert!(!result.buy);
    }

    #[test]
    fn test_macd_uptrend_is_positive() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let result = calculate_macd(&closes, 12, 26, 9);

        assert!(result.macd > 0.0);
        assert!(result.signal > 0.0);
        // Steady trend: signal already caught up, no fresh crossover
        assert!(!result.buy);
    }

    #[test]
    fn test_macd_detects_bullish_crossover() {
        let closes = crossover_series();
        let result = calculate_macd(&closes, 12, 26, 9);

        assert!(result.buy, "expected crossover, got {:?}", result);
        assert!(result.histogram > 0.0);
    }

    #[test]
    fn test_macd_no_crossover_in_steady_decline() {
        let closes: Vec<f64> = (0..41).map(|i| 200.0 - i as f64).collect();
        let result = calculate_macd(&closes, 12, 26, 9);

        assert!(result.macd < 0.0);
        assert!(result.histogram < 0.0);
        assert!(!result.buy);
    }

    #[test]
    fn test_macd_rounds_to_four_decimals() {
        let closes = crossover_series();
        let result = calculate_macd(&closes, 12, 26, 9);

        for value in [result.macd, result.signal, result.histogram] {
            assert_eq!(value, (value * 10_000.0).round() / 10_000.0);
        }
    }

    #[test]
    fn test_macd_exactly_slow_length_has_single_signal_point() {
        // One signal point: the previous signal defaults to 0
        let closes: Vec<f64> = (0..26).map(|i| 100.0 + i as f64).collect();
        let result = calculate_macd(&closes, 12, 26, 9);

        // signal[0] == macd[25], so the current bar is not above it
        assert_eq!(result.macd, result.signal);
        assert!(!result.buy);
    }

    #[test]
    fn test_crossover_rule() {
        assert!(is_bullish_crossover(-1.0, 0.0, 1.0, 0.5));
        assert!(is_bullish_crossover(0.5, 0.5, 0.6, 0.5));
        assert!(!is_bullish_crossover(0.6, 0.5, 0.7, 0.5));
        assert!(!is_bullish_crossover(-1.0, 0.0, 0.5, 0.5));
    }
}
