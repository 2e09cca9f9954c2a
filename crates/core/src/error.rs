//! Error types for the hidden liquidity estimator.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hidden liquidity estimator.
#[derive(Error, Debug)]
pub enum Error {
    /// No cleaned quotes matched the requested symbol.
    #[error("No rows for the requested symbol '{symbol}'")]
    EmptySelection { symbol: String },

    /// Input table is missing a required column or carries a mistyped value.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an empty selection error.
    pub fn empty_selection(symbol: impl Into<String>) -> Self {
        Error::EmptySelection {
            symbol: symbol.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
