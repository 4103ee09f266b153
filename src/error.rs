use thiserror::Error;

/// Contract violations by the caller of the signal engine
///
/// Short history and degenerate math never show up here: every calculator has
/// its own neutral fallback for those.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("close-price series is empty")]
    EmptyCloses,

    #[error("invalid close price {value} at index {index}: prices must be finite and positive")]
    InvalidClose { index: usize, value: f64 },

    #[error("fear & greed index {0} is outside 0..=100")]
    FearGreedOutOfRange(u32),
}
