//! Analyzer error types.

use thiserror::Error;

/// Errors from calls to the analysis service.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// HTTP transport error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The response body was not the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The service answered successfully but produced no text.
    #[error("analysis service returned empty output")]
    EmptyOutput,

    /// The service returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the service asked callers to wait.
        retry_after_secs: u64,
    },

    /// The client could not be built from configuration.
    #[error("invalid analyzer configuration: {0}")]
    Config(String),
}
