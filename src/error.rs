//! Error types for the provider search service.

use thiserror::Error;

/// Errors produced by the search service.
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential or configuration value is absent at startup.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The embedding provider failed, timed out or returned a malformed payload.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The corpus retrieval call returned an error or timed out.
    #[error("Retrieval failure: {0}")]
    RetrievalFailure(String),

    /// The request failed basic shape validation.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Too many requests in the current window.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Configuration file could not be read, parsed or written.
    #[error("Config error: {0}")]
    Config(String),

    /// HTTP server error.
    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigurationMissing(_) => "ConfigurationMissing",
            Error::EmbeddingUnavailable(_) => "EmbeddingUnavailable",
            Error::RetrievalFailure(_) => "RetrievalFailure",
            Error::MalformedRequest(_) => "MalformedRequest",
            Error::RateLimited(_) => "RateLimited",
            Error::Config(_) => "Config",
            Error::Api(_) => "Api",
            Error::Io(_) => "Io",
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for search service operations.
pub type Result<T> = std::result::Result<T, Error>;
