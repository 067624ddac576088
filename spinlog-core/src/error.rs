//! Error types for spinlog-core

use thiserror::Error;

/// Main error type for the spinlog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Date arithmetic produced no valid instant
    #[error("calendar computation failed: {0}")]
    Calendar(String),

    /// Bucket window with no buckets
    #[error("invalid window size: {0}")]
    InvalidWindow(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for spinlog-core
pub type Result<T> = std::result::Result<T, Error>;
