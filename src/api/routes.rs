//! Route configuration.

use crate::api::handlers;
use crate::config::{ConfigError, ServerConfig};
use crate::state::AppState;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/status", get(handlers::get_status))
        // Market data
        .route("/api/expiries", get(handlers::list_expiries))
        .route("/api/oi", get(handlers::get_open_interest))
        .with_state(state)
}

/// Builds the CORS layer for the configured origins; `*` allows any origin.
///
/// # Errors
/// Returns error if an origin is not a valid header value.
pub fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let Some(origins) = server.origin_list() else {
        return Ok(cors.allow_origin(Any));
    };

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidValue(format!("invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}
