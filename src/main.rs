//! Max Pain Backend Server
//!
//! REST API server exposing option expiries, open interest by strike and the
//! max pain price computed from Deribit public market data.

use max_pain_backend::api::{cors_layer, create_router};
use max_pain_backend::config::Config;
use max_pain_backend::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use max_pain_backend::error::ErrorResponse;
use max_pain_backend::models::{
    ExpiriesResponse, HealthResponse, OpenInterestResponse, StatusResponse,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        max_pain_backend::api::handlers::health_check,
        max_pain_backend::api::handlers::get_status,
        max_pain_backend::api::handlers::list_expiries,
        max_pain_backend::api::handlers::get_open_interest,
    ),
    components(
        schemas(
            HealthResponse,
            StatusResponse,
            ExpiriesResponse,
            OpenInterestResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health and status endpoints"),
        (name = "Market Data", description = "Expiries, open interest and max pain"),
    ),
    info(
        title = "Max Pain API",
        version = "0.1.0",
        description = "Options open interest distribution and max pain from Deribit market data",
        license(name = "MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::from_env(&config_path)?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = config.server.host.clone();
    let port = config.server.port;
    let cors = cors_layer(&config.server)?;

    // Create application state
    let state = Arc::new(AppState::from_config(config)?);

    info!("Starting Max Pain Backend on {}:{}", host, port);
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        host, port
    );

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
