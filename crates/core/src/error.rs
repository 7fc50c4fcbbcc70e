//! Error types for the draftpress domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each pipeline stage has its own error type; [`Error`] wraps them so the
//! invocation boundary can report which stage failed.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for a generation run.
#[derive(Debug, Error)]
pub enum Error {
    // --- Config resolution ---
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // --- Inputs ---
    #[error("Draft error: {path}: {reason}")]
    Draft { path: PathBuf, reason: String },

    #[error("Profile error: {path}: {reason}")]
    Profile { path: PathBuf, reason: String },

    // --- Provider call ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Output repair ---
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    // --- Filesystem ---
    #[error("I/O error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O failure with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Stage errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{provider} was selected but {variable} is not set")]
    MissingCredential {
        provider: String,
        variable: String,
    },

    #[error(
        "No provider configured: set one of OPENAI_API_KEY, OPENROUTER_API_KEY, \
         NVIDIA_API_KEY, GEMINI_API_KEY, CLAUDE_API_KEY"
    )]
    NoProviderConfigured,

    #[error("Unknown provider '{0}' (expected openai, openrouter, nvidia, gemini or claude)")]
    UnknownProvider(String),

    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed. Only timeouts and
    /// rate limits are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::RateLimited { .. })
    }
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {secs}s"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("provider returned no usable content")]
    EmptyOutput,
}
