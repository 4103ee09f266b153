/// Calculate Simple Moving Average (SMA) over the trailing `period` values
pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let sum: f64 = values.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Calculate an Exponential Moving Average (EMA) series
///
/// The output has the same length as the input. The first element seeds the
/// average directly (no SMA warm-up), so early values carry a warm-up bias:
///
/// `ema[i] = (value[i] - ema[i-1]) * (2 / (period + 1)) + ema[i-1]`
///
/// An empty input yields an empty series.
pub fn calculate_ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut ema = Vec::with_capacity(values.len());
    let Some(&seed) = values.first() else {
        return ema;
    };
    ema.push(seed);

    let mut prev = seed;
    for value in &values[1..] {
        prev = (value - prev) * multiplier + prev;
        ema.push(prev);
    }

    ema
}
