//! Error types for the configuration boundary.
//!
//! Expansion, interpretation and animation never fail; only loading and
//! validating rule sets or plant settings can.

use thiserror::Error;

/// Errors raised while loading or validating plant configuration.
#[derive(Debug, Error)]
pub enum FloraError {
    #[cfg(feature = "json")]
    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule key {key:?} must be exactly one symbol")]
    InvalidPredecessor { key: String },

    #[error("rule {predecessor:?} -> {successor:?} has invalid probability {probability}")]
    InvalidProbability {
        predecessor: char,
        successor: String,
        probability: f32,
    },

    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },

    #[error("length jitter range {min}..{max} is empty or negative")]
    InvalidJitter { min: f32, max: f32 },

    #[error("rule set library is empty")]
    EmptyLibrary,
}

pub type Result<T> = std::result::Result<T, FloraError>;
