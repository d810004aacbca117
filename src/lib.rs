//! # Max Pain Backend - REST API Server
//!
//! A small REST backend that pulls options market data from the
//! [Deribit](https://www.deribit.com) public API, buckets open interest by strike
//! for a chosen expiry and computes the max pain price: the settlement strike at
//! which option sellers, in aggregate, owe the least intrinsic payout.
//! Built with [Axum](https://crates.io/crates/axum) and documented through
//! [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Pipeline
//!
//! ```text
//! get_instruments ─┐
//!                  ├─► aggregate (one expiry) ─► solve (max pain) ─► report
//! get_book_summary ┘
//! ```
//!
//! Both upstream responses are cached for a configurable TTL, and so is the
//! final report of every currency and expiry.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregation`] | Open interest by strike and option type |
//! | [`api`] | Route handlers and router configuration |
//! | [`cache`] | TTL response cache with injectable clock |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`expiry`] | Distinct expiry days of a currency |
//! | [`instrument`] | Instrument names, currencies and expiry keys |
//! | [`max_pain`] | Max pain solver |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`service`] | Cached market-data service |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/status` | Cache size and configuration |
//! | GET | `/api/expiries?currency=BTC` | Expiry days, earliest first |
//! | GET | `/api/oi?currency=BTC&expiry=YYYY-MM-DD` | Open interest and max pain |
//!
//! ## Example Usage
//!
//! ```bash
//! # Development mode
//! cargo run
//!
//! # Custom port, one-minute cache, restricted CORS
//! PORT=8080 CACHE_TTL_MS=60000 ALLOWED_ORIGINS=https://dash.example cargo run
//!
//! curl "http://localhost:3000/api/expiries?currency=ETH"
//! curl "http://localhost:3000/api/oi?currency=BTC&expiry=2025-08-29"
//! ```

pub mod aggregation;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod expiry;
pub mod instrument;
pub mod max_pain;
pub mod models;
pub mod service;
pub mod state;
