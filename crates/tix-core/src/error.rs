//! Error types for the configuration and storage layers.
//!
//! The selector synthesis and tab-order contracts never fail; these errors
//! only come from loading settings and moving profiles through storage.

use thiserror::Error;

/// Errors raised outside the synthesis/apply core
#[derive(Debug, Error)]
pub enum TixError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, TixError>;
