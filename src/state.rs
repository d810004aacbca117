//! Application state management.

use crate::cache::{Clock, ResponseCache, SystemClock};
use crate::config::Config;
use crate::service::MarketDataService;
use deribit_client::DeribitClient;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Market-data service owning the upstream client and response cache.
    pub service: Arc<MarketDataService>,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Creates the application state from configuration, reading time from
    /// the wall clock.
    ///
    /// # Errors
    /// Returns error if the upstream client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, deribit_client::Error> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates the application state with an explicit cache clock.
    ///
    /// # Errors
    /// Returns error if the upstream client cannot be built.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, deribit_client::Error> {
        let client = DeribitClient::new(config.upstream.client_config())?;
        let cache = ResponseCache::with_clock(config.cache.ttl(), clock);
        info!(
            upstream = client.base_url(),
            cache_ttl_ms = config.cache.ttl_ms,
            "market data service ready"
        );

        Ok(Self {
            service: Arc::new(MarketDataService::new(client, cache)),
            config,
        })
    }
}
