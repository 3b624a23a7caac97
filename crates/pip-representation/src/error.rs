//! Error types for the orchestrator
//!
//! Covers the failures that can stop the preview flow from coming up:
//! - invalid configuration
//! - products API failures (network, status, payload)
//! - runtime dependencies that failed to load
//!
//! Failures after startup never cross this boundary. They are published as
//! `RepresentationEvent::Error` instead.

use std::path::PathBuf;

/// Products API failures
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Transport-level failure
    #[error("products request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("products API returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Body did not match the expected shape
    #[error("invalid products payload: {0}")]
    Decode(String),

    /// Backend could not be reached at all
    #[error("products API unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    /// Whether a later attempt could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Unavailable(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A runtime dependency failed to load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dependency {dependency} failed to load: {message}")]
pub struct LoadError {
    pub dependency: String,
    pub message: String,
}

impl LoadError {
    #[must_use]
    pub fn new(dependency: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            message: message.into(),
        }
    }
}

/// Startup failures of the orchestrator
#[derive(Debug, thiserror::Error)]
pub enum RepresentationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl RepresentationError {
    /// Whether starting again could succeed without changing the config
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Catalog(e) => e.is_retryable(),
            Self::Load(_) => true,
        }
    }
}
