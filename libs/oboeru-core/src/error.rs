//! Error types for oboeru-core.
//!
//! Malformed card text and foreign metadata markers are never errors; only the
//! storage seam and settings validation can fail.

use thiserror::Error;

/// Errors raised by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid document id: {0}")]
    InvalidId(String),
}

/// Errors raised when validating or updating [`Settings`](crate::types::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("request retention must be between 0.7 and 0.97, got {0}")]
    RetentionOutOfRange(f64),

    #[error("maximum interval must be between 1 and 36500 days")]
    InvalidMaximumInterval,

    #[error("daily limit must be a positive number of cards")]
    InvalidDailyLimit,

    #[error("unknown setting: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
