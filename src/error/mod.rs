//! Error types for Podforge.

use thiserror::Error;

/// Maximum length of an error message persisted onto a failed job.
pub const MAX_PERSISTED_ERROR_LEN: usize = 512;

/// Primary error type for all Podforge operations.
#[derive(Error, Debug)]
pub enum PodforgeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider error: {provider} — {message}")]
    Provider { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad classification used for retry decisions and boundary mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Api,
    Network,
    RateLimit,
    Timeout,
    Server,
    Audio,
    Serialization,
    Unknown,
}

impl PodforgeError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Audio(_) => ErrorCategory::Audio,
            Self::Api { status, .. } => match status {
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Render this error as a message suitable for persisting onto a job
    /// record, truncated to [`MAX_PERSISTED_ERROR_LEN`] bytes on a char
    /// boundary.
    pub fn persisted_message(&self) -> String {
        let message = self.to_string();
        if message.len() <= MAX_PERSISTED_ERROR_LEN {
            return message;
        }
        let mut end = MAX_PERSISTED_ERROR_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message[..end].to_string()
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PodforgeError>;
