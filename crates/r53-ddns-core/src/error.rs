//! Error types for the Route 53 DDNS updater
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Every configured IP lookup endpoint failed or returned garbage
    #[error("No public IP available: {0}")]
    NoIpAvailable(String),

    /// A required input file does not exist or cannot be read
    #[error("Not found: {0}")]
    NotFound(String),

    /// An input document could not be parsed or failed validation
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single IP lookup endpoint failed
    #[error("IP lookup error: {0}")]
    IpLookup(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// IP cache errors
    #[error("IP cache error: {0}")]
    Cache(String),

    /// Notification transport errors
    #[error("Notification error: {0}")]
    Notify(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "no IP available" error
    pub fn no_ip(msg: impl Into<String>) -> Self {
        Self::NoIpAvailable(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP lookup error
    pub fn ip_lookup(msg: impl Into<String>) -> Self {
        Self::IpLookup(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an IP cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Whether this error stems from operator input (configuration or the
    /// hosts document) rather than from the runtime environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::NotFound(_) | Self::InvalidFormat(_) | Self::Json(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
