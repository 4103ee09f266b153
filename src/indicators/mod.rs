// Technical indicators module
// Implements EMA, RSI, MACD, volatility, support and volume-spike calculators

pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod support;
pub mod volatility;
pub mod volume;

pub use macd::{calculate_macd, is_bullish_crossover, MacdResult};
pub use moving_average::{calculate_ema_series, calculate_sma};
pub use rsi::{calculate_rsi, classify_rsi, RsiResult, RsiSignal};
pub use support::{find_support_level, is_near_support, SupportResult};
pub use volatility::{calculate_volatility, is_low_volatility, VolatilityResult};
pub use volume::{calculate_volume_spike, is_volume_spike, VolumeSpikeResult};

/// Round half away from zero to a fixed number of decimals
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
