// Core modules
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod indicators;
pub mod models;
pub mod scoring;
pub mod synthetic;

// Re-export commonly used types
pub use engine::{compute, compute_with, IndicatorSettings};
pub use error::SignalError;
pub use models::*;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
