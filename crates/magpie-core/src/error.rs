//! Unified error types for Magpie

use thiserror::Error;

/// Unified error type for all Magpie operations
#[derive(Error, Debug)]
pub enum MagpieError {
    // Startup errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    // Remote API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    // State persistence errors
    #[error("State error: {0}")]
    State(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using MagpieError
pub type Result<T> = std::result::Result<T, MagpieError>;

/// Classified failure from a remote API call.
///
/// The retry wrapper keys its behavior entirely off this classification:
/// rate-limited and transient failures are retried and never escape the
/// wrapper, invalid-input and fatal failures propagate immediately.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The remote service is throttling the caller (HTTP 429 or equivalent)
    #[error("Rate limited by remote service")]
    RateLimited {
        /// Server-suggested wait in seconds, when the response carried one
        retry_after: Option<u64>,
    },

    /// Recoverable fault (server error, timeout, connection reset)
    #[error("Transient API failure: {0}")]
    Transient(String),

    /// Caller-side precondition violation; retrying cannot help
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Non-recoverable fault (bad credentials, forbidden, malformed response)
    #[error("API failure: {0}")]
    Fatal(String),
}

impl ApiError {
    /// True if the failure is the remote service throttling us
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// True if another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. } | ApiError::Transient(_))
    }

    /// True if the failure must propagate to the caller unretried
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let rate_limited = ApiError::RateLimited { retry_after: Some(30) };
        assert!(rate_limited.is_rate_limited());
        assert!(rate_limited.is_retryable());
        assert!(!rate_limited.is_fatal());

        let transient = ApiError::Transient("503 upstream".to_string());
        assert!(!transient.is_rate_limited());
        assert!(transient.is_retryable());

        let invalid = ApiError::InvalidInput("empty text".to_string());
        assert!(invalid.is_fatal());
        assert!(!invalid.is_retryable());

        let fatal = ApiError::Fatal("401 unauthorized".to_string());
        assert!(fatal.is_fatal());
    }

    #[test]
    fn test_api_error_into_magpie_error() {
        let err: MagpieError = ApiError::Fatal("401 unauthorized".to_string()).into();
        assert!(matches!(err, MagpieError::Api(ApiError::Fatal(_))));
    }
}
