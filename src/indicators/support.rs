use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Relative distance above support that still counts as "near"
pub const NEAR_SUPPORT_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResult {
    pub level: f64,
    pub near_support: bool,
}

/// Price is strictly less than 5% above the support level
pub fn is_near_support(current_price: f64, level: f64) -> bool {
    (current_price - level) / level < NEAR_SUPPORT_THRESHOLD
}

/// Find the support level as the minimum close of the trailing `lookback` window
///
/// With less history than `lookback`, the level is the minimum of the whole
/// series and the price is never considered near it. An empty series has no
/// support level and is rejected.
pub fn find_support_level(closes: &[f64], lookback: usize) -> Result<SupportResult, SignalError> {
    let Some(&current_price) = closes.last() else {
        return Err(SignalError::EmptyCloses);
    };

    if closes.len() < lookback {
        return Ok(SupportResult {
            level: min_of(closes),
            near_support: false,
        });
    }

    let recent = &closes[closes.len() - lookback..];
    // lookback == 0 leaves an empty window; fall back to the current price
    let level = if recent.is_empty() {
        current_price
    } else {
        min_of(recent)
    };

    Ok(SupportResult {
        level,
        near_support: is_near_support(current_price, level),
    })
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
