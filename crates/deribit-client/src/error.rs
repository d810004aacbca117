//! Error types for the Deribit client.

use thiserror::Error;


/// Client error types.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed at the transport level (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query parameters could not be URL-encoded.
    #[error("Invalid query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Upstream answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Upstream answered but the payload does not have the expected shape.
    #[error("Unexpected upstream response: {0}")]
    Protocol(String),

    /// Every attempt failed; carries the error of the last attempt.
    #[error("Upstream unavailable after {attempts} attempts: {source}")]
    Unavailable {
        /// Number of attempts made.
        attempts: u32,
        /// Error of the last attempt.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if another attempt may succeed.
    ///
    /// Protocol errors describe a well-formed but unexpected answer and are
    /// not retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Json(_) | Self::Status { .. })
    }
}
