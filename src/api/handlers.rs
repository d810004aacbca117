//! API request handlers.

use crate::error::{ApiError, ErrorResponse};
use crate::instrument::{Currency, ExpiryKey};
use crate::models::{
    DEFAULT_CURRENCY, ExpiriesQuery, ExpiriesResponse, HealthResponse, OpenInterestQuery,
    OpenInterestResponse, StatusResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// Parses the optional `currency` parameter, `BTC` when absent.
fn parse_currency(currency: Option<&str>) -> Result<Currency, ApiError> {
    Ok(currency.unwrap_or(DEFAULT_CURRENCY).parse::<Currency>()?)
}

/// Parses the required `expiry` parameter.
fn parse_expiry(expiry: Option<&str>) -> Result<ExpiryKey, ApiError> {
    let expiry = expiry
        .ok_or_else(|| ApiError::InvalidRequest("missing expiry=YYYY-MM-DD".to_string()))?;
    Ok(expiry.parse::<ExpiryKey>()?)
}

// ============================================================================
// Health & Status
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Service status: cache occupancy and configuration.
#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Service status", body = StatusResponse)
    ),
    tag = "Health"
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        cache_size: state.service.cache().len(),
        cache_ttl_ms: state.config.cache.ttl_ms,
        log_level: state.config.logging.level.clone(),
        ts: Utc::now().timestamp_millis(),
    })
}

// ============================================================================
// Market Data
// ============================================================================

/// List the expiry days of a currency's live options.
#[utoipa::path(
    get,
    path = "/api/expiries",
    params(ExpiriesQuery),
    responses(
        (status = 200, description = "Expiry days, earliest first", body = ExpiriesResponse),
        (status = 400, description = "Invalid currency", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    tag = "Market Data"
)]
pub async fn list_expiries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExpiriesQuery>,
) -> Result<Json<ExpiriesResponse>, ApiError> {
    let currency = parse_currency(query.currency.as_deref())?;

    let expiries = state
        .service
        .list_expiries(currency)
        .await
        .inspect_err(|err| warn!(%currency, error = %err, "expiries request failed"))?;

    Ok(Json(ExpiriesResponse { currency, expiries }))
}

/// Open interest by strike and max pain of one expiry.
#[utoipa::path(
    get,
    path = "/api/oi",
    params(OpenInterestQuery),
    responses(
        (status = 200, description = "Open interest distribution", body = OpenInterestResponse),
        (status = 400, description = "Invalid currency or expiry", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    tag = "Market Data"
)]
pub async fn get_open_interest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OpenInterestQuery>,
) -> Result<Json<OpenInterestResponse>, ApiError> {
    let currency = parse_currency(query.currency.as_deref())?;
    let expiry = parse_expiry(query.expiry.as_deref())?;

    let report = state
        .service
        .open_interest(currency, expiry)
        .await
        .inspect_err(|err| warn!(%currency, %expiry, error = %err, "open interest request failed"))?;

    Ok(Json(report.as_ref().clone()))
}
