//! Error types for the loading surfaces.
//!
//! Scoring, generation and session tracking never fail; only reading
//! catalogs and configuration can. These typed errors let callers tell an
//! invalid catalog apart from an invalid config without string matching.

use thiserror::Error;

/// Errors raised while building a question catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A question declares no key terms, so it could never be graded.
    #[error("question '{0}' has no key terms")]
    NoKeyTerms(String),

    /// The difficulty string is not one of beginner/intermediate/advanced.
    #[error("question '{question}': {message}")]
    UnknownDifficulty { question: String, message: String },

    /// Two questions share an id, so their sessions would collide.
    #[error("duplicate question id: {0}")]
    DuplicateId(String),
}

/// Errors raised while validating configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A ratio threshold lies outside 0.0..=1.0.
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },

    /// The partial-credit threshold is above the correct threshold.
    #[error("partial_threshold ({partial}) must not exceed correct_threshold ({correct})")]
    InvertedThresholds { partial: f64, correct: f64 },

    /// The confusion threshold lies outside the sentiment range.
    #[error("confusion_threshold must be between -1.0 and 1.0, got {0}")]
    SentimentOutOfRange(f64),

    /// A counter that divides or caps must be positive.
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// A session penalty, cap or multiplier is negative or not a number.
    #[error("{name} must be zero or greater, got {value}")]
    Negative { name: &'static str, value: f64 },
}
