// src/error.rs

//! Unified error handling for the image scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (network error, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Source answered with a non-2xx status
    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested source id is not in the registry
    #[error("Unknown source: {0}")]
    InvalidSource(String),

    /// Extraction error for a single source
    #[error("Extraction error for {engine}: {message}")]
    Extraction { engine: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unknown-source error.
    pub fn invalid_source(id: impl Into<String>) -> Self {
        Self::InvalidSource(id.into())
    }

    /// Create an extraction error with the source id as context.
    pub fn extraction(engine: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            engine: engine.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_source_message() {
        let err = AppError::invalid_source("nope");
        assert_eq!(err.to_string(), "Unknown source: nope");
    }

    #[test]
    fn test_http_status_message() {
        let err = AppError::HttpStatus {
            url: "https://example.com/s?q=x".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP status 503 from https://example.com/s?q=x");
    }
}
