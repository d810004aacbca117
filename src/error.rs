//! Error types for the REST API.

use crate::instrument::InstrumentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;


/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Currency outside the supported set.
    #[error("currency must be BTC or ETH, got `{0}`")]
    InvalidCurrency(String),

    /// Expiry not in `YYYY-MM-DD` form.
    #[error("expiry must be YYYY-MM-DD, got `{0}`")]
    InvalidExpiry(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream could not be reached after all retries.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream answered with an unexpected payload.
    #[error("Upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status and machine-readable code of the error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidCurrency(_) => (StatusCode::BAD_REQUEST, "INVALID_CURRENCY"),
            ApiError::InvalidExpiry(_) => (StatusCode::BAD_REQUEST, "INVALID_EXPIRY"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::UpstreamUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_UNAVAILABLE")
            }
            ApiError::UpstreamProtocol(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_PROTOCOL_ERROR")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<InstrumentError> for ApiError {
    fn from(err: InstrumentError) -> Self {
        match err {
            InstrumentError::InvalidCurrency(value) => ApiError::InvalidCurrency(value),
            InstrumentError::InvalidExpiry(value) => ApiError::InvalidExpiry(value),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<deribit_client::Error> for ApiError {
    fn from(err: deribit_client::Error) -> Self {
        match err {
            deribit_client::Error::Protocol(message) => ApiError::UpstreamProtocol(message),
            other => ApiError::UpstreamUnavailable(other.to_string()),
        }
    }
}
