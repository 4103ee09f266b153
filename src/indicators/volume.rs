use serde::{Deserialize, Serialize};

use super::moving_average::calculate_sma;

/// Multiple of the trailing average that marks a volume spike
pub const VOLUME_SPIKE_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSpikeResult {
    pub avg_volume: f64,
    pub is_spike: bool,
}

/// Current volume strictly above 1.5x the trailing average
pub fn is_volume_spike(current_volume: f64, avg_volume: f64) -> bool {
    current_volume > avg_volume * VOLUME_SPIKE_MULTIPLIER
}

/// Detect a volume spike on the most recent bar
///
/// The average covers the `period` volumes immediately before the current one.
/// Without `period + 1` values the average is just the latest volume (0 when
/// empty) and no spike is reported.
pub fn calculate_volume_spike(volumes: &[f64], period: usize) -> VolumeSpikeResult {
    let Some((&current_volume, previous)) = volumes.split_last() else {
        return VolumeSpikeResult::default();
    };

    match calculate_sma(previous, period) {
        Some(avg_volume) => VolumeSpikeResult {
            avg_volume,
            is_spike: is_volume_spike(current_volume, avg_volume),
        },
        None => VolumeSpikeResult {
            avg_volume: current_volume,
            is_spike: false,
        },
    }
}
