//! Integration tests for the Max Pain API.
//!
//! Every test starts its own fake Deribit server and a real API router in
//! front of it, both on ephemeral local ports, and talks to the router over
//! HTTP.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use max_pain_backend::api::create_router;
use max_pain_backend::config::Config;
use max_pain_backend::state::AppState;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::net::TcpListener;

/// 2025-08-29T08:00:00Z in epoch milliseconds.
pub const AUG_29: i64 = 1_756_454_400_000;
/// 2025-09-26T08:00:00Z in epoch milliseconds.
pub const SEP_26: i64 = 1_758_873_600_000;

/// Boxed error returned by the harness.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Fake Deribit
// ============================================================================

/// Shape of a successful (2xx) upstream answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Body {
    /// JSON-RPC envelope with the canned rows.
    #[default]
    Rows,
    /// JSON-RPC envelope without a `result` member.
    MissingResult,
    /// An HTML page instead of JSON.
    NotJson,
}

/// Fake Deribit public API with call counters and failure injection.
#[derive(Debug, Clone, Default)]
pub struct FakeDeribit {
    instruments_calls: Arc<AtomicU32>,
    book_calls: Arc<AtomicU32>,
    /// Requests answered with 503 before each endpoint starts succeeding.
    pub fail_first: u32,
    /// What a 2xx answer carries.
    pub body: Body,
}

impl FakeDeribit {
    /// Fake that answers `503` to the first `n` requests of each endpoint.
    #[must_use]
    pub fn failing_first(n: u32) -> Self {
        Self {
            fail_first: n,
            ..Default::default()
        }
    }

    /// Fake whose 2xx answers carry `body`.
    #[must_use]
    pub fn answering(body: Body) -> Self {
        Self {
            body,
            ..Default::default()
        }
    }

    /// Requests received by `public/get_instruments`.
    #[must_use]
    pub fn instruments_calls(&self) -> u32 {
        self.instruments_calls.load(Ordering::SeqCst)
    }

    /// Requests received by `public/get_book_summary_by_currency`.
    #[must_use]
    pub fn book_calls(&self) -> u32 {
        self.book_calls.load(Ordering::SeqCst)
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/v2/public/get_instruments", get(fake_instruments))
            .route(
                "/api/v2/public/get_book_summary_by_currency",
                get(fake_book_summary),
            )
            .with_state(self.clone())
    }

    fn respond(&self, calls: &AtomicU32, result: Option<Value>) -> Response {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_first {
            return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
        }
        let Some(result) = result else {
            return rpc_error("invalid currency");
        };
        match self.body {
            Body::Rows => Json(json!({"jsonrpc": "2.0", "result": result})).into_response(),
            Body::MissingResult => Json(json!({"jsonrpc": "2.0", "usIn": 1})).into_response(),
            Body::NotJson => (StatusCode::OK, "<html>not json</html>").into_response(),
        }
    }
}

fn rpc_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"jsonrpc": "2.0", "error": {"code": 10009, "message": message}})),
    )
        .into_response()
}

fn is_option_query(query: &HashMap<String, String>) -> bool {
    query.get("kind").map(String::as_str) == Some("option")
}

async fn fake_instruments(
    State(fake): State<FakeDeribit>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !is_option_query(&query) || query.get("expired").map(String::as_str) != Some("false") {
        return rpc_error("unexpected query");
    }

    let result = match query.get("currency").map(String::as_str) {
        Some("BTC") => Some(json!([
            {"instrument_name": "BTC-26SEP25-80000-C", "expiration_timestamp": SEP_26, "base_currency": "BTC", "kind": "option"},
            {"instrument_name": "BTC-29AUG25-60000-C", "expiration_timestamp": AUG_29, "base_currency": "BTC", "kind": "option"},
            {"instrument_name": "BTC-29AUG25-60000-P", "expiration_timestamp": AUG_29, "base_currency": "BTC", "kind": "option"},
            {"instrument_name": "BTC-29AUG25-70000-C", "expiration_timestamp": AUG_29, "base_currency": "BTC", "kind": "option"}
        ])),
        Some("ETH") => Some(json!([
            {"instrument_name": "ETH-26SEP25-3000-P", "expiration_timestamp": SEP_26, "base_currency": "ETH", "kind": "option"}
        ])),
        _ => None,
    };
    fake.respond(&fake.instruments_calls, result)
}

async fn fake_book_summary(
    State(fake): State<FakeDeribit>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !is_option_query(&query) {
        return rpc_error("unexpected query");
    }

    let result = match query.get("currency").map(String::as_str) {
        Some("BTC") => Some(json!([
            {"instrument_name": "BTC-29AUG25-60000-C", "open_interest": 10, "underlying_price": 64000.0},
            {"instrument_name": "BTC-29AUG25-60000-P", "open_interest": 5, "underlying_price": null},
            {"instrument_name": "BTC-29AUG25-70000-C", "open_interest": 3},
            {"open_interest": 99, "underlying_price": 1.0},
            {"instrument_name": "BTC-26SEP25-80000-C", "open_interest": 42, "underlying_price": 64100.0}
        ])),
        Some("ETH") => Some(json!([
            {"instrument_name": "ETH-26SEP25-3000-P", "open_interest": 8, "underlying_price": 2900.0}
        ])),
        _ => None,
    };
    fake.respond(&fake.book_calls, result)
}

// ============================================================================
// Harness
// ============================================================================

/// Serves `router` on an ephemeral local port.
///
/// # Errors
/// Returns error if the port cannot be bound.
pub async fn serve(router: Router) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}

/// Running API in front of a fake upstream.
#[derive(Debug)]
pub struct TestApp {
    base_url: String,
    /// Upstream the API talks to.
    pub fake: FakeDeribit,
    http: reqwest::Client,
}

impl TestApp {
    /// Starts `fake` and an API configured against it, with 2 retries and a
    /// short backoff.
    ///
    /// # Errors
    /// Returns error if either server cannot start.
    pub async fn start(fake: FakeDeribit) -> Result<Self, BoxError> {
        let upstream_addr = serve(fake.router()).await?;

        let mut config = Config::default();
        config.upstream.base_url = format!("http://{}/api/v2", upstream_addr);
        config.upstream.timeout_ms = 2_000;
        config.upstream.backoff_ms = 5;

        let state = AppState::from_config(config)?;
        let app_addr = serve(create_router(Arc::new(state))).await?;

        Ok(Self {
            base_url: format!("http://{}", app_addr),
            fake,
            http: reqwest::Client::new(),
        })
    }

    /// GETs `path` from the API and decodes the JSON body.
    ///
    /// # Errors
    /// Returns error if the request fails or the body is not JSON.
    pub async fn get(&self, path: &str) -> Result<(u16, Value), BoxError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.json().await?;
        Ok((status, body))
    }
}
