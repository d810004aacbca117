//! Market-data service: cached upstream fetches and the per-expiry report.

use crate::aggregation::aggregate;
use crate::cache::ResponseCache;
use crate::error::ApiError;
use crate::expiry::resolve_expiries;
use crate::instrument::{Currency, ExpiryKey};
use crate::max_pain::solve;
use crate::models::OpenInterestResponse;
use deribit_client::{BookSummary, DeribitClient, Instrument};
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(test)]
mod tests;

/// Value stored in the response cache.
#[derive(Debug, Clone)]
pub enum CachedPayload {
    /// `result` of `public/get_instruments`.
    Instruments(Arc<Vec<Instrument>>),
    /// `result` of `public/get_book_summary_by_currency`.
    BookSummary(Arc<Vec<BookSummary>>),
    /// Final report of one currency and expiry.
    OpenInterest(Arc<OpenInterestResponse>),
}

/// Cache key of the instrument list of a currency.
#[must_use]
pub fn instruments_key(currency: Currency) -> String {
    format!("instruments:{}", currency)
}

/// Cache key of the book summary of a currency.
#[must_use]
pub fn book_key(currency: Currency) -> String {
    format!("book:{}", currency)
}

/// Cache key of the report of a currency and expiry.
#[must_use]
pub fn open_interest_key(currency: Currency, expiry: ExpiryKey) -> String {
    format!("oi:{}:{}", currency, expiry)
}

/// Fetches market data through the response cache and derives expiries,
/// open interest and max pain from it.
#[derive(Debug)]
pub struct MarketDataService {
    client: DeribitClient,
    cache: ResponseCache<CachedPayload>,
}

impl MarketDataService {
    /// Creates a service over `client` storing responses in `cache`.
    #[must_use]
    pub fn new(client: DeribitClient, cache: ResponseCache<CachedPayload>) -> Self {
        Self { client, cache }
    }

    /// Response cache of this service.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache<CachedPayload> {
        &self.cache
    }

    /// Non-expired option instruments of `currency`.
    ///
    /// # Errors
    /// Returns the client error when the upstream fetch fails.
    pub async fn instruments(
        &self,
        currency: Currency,
    ) -> Result<Arc<Vec<Instrument>>, deribit_client::Error> {
        let key = instruments_key(currency);
        if let Some(CachedPayload::Instruments(hit)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }

        let instruments = Arc::new(self.client.get_instruments(currency.as_str()).await?);
        debug!(%key, rows = instruments.len(), "fetched instruments");
        self.cache
            .set(key, CachedPayload::Instruments(Arc::clone(&instruments)));
        Ok(instruments)
    }

    /// Book summary of every option of `currency`.
    ///
    /// # Errors
    /// Returns the client error when the upstream fetch fails.
    pub async fn book_summary(
        &self,
        currency: Currency,
    ) -> Result<Arc<Vec<BookSummary>>, deribit_client::Error> {
        let key = book_key(currency);
        if let Some(CachedPayload::BookSummary(hit)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }

        let book = Arc::new(
            self.client
                .get_book_summary_by_currency(currency.as_str())
                .await?,
        );
        debug!(%key, rows = book.len(), "fetched book summary");
        self.cache.set(key, CachedPayload::BookSummary(Arc::clone(&book)));
        Ok(book)
    }

    /// Distinct expiry days of the live options of `currency`, earliest first.
    ///
    /// # Errors
    /// Returns an upstream error when the instruments cannot be fetched.
    pub async fn list_expiries(&self, currency: Currency) -> Result<Vec<ExpiryKey>, ApiError> {
        let instruments = self.instruments(currency).await?;
        Ok(resolve_expiries(&instruments))
    }

    /// Open interest distribution and max pain of one expiry.
    ///
    /// Instruments and book summary are fetched concurrently; if either fails
    /// the whole request fails.
    ///
    /// # Errors
    /// Returns an upstream error when either fetch fails.
    pub async fn open_interest(
        &self,
        currency: Currency,
        expiry: ExpiryKey,
    ) -> Result<Arc<OpenInterestResponse>, ApiError> {
        let key = open_interest_key(currency, expiry);
        if let Some(CachedPayload::OpenInterest(hit)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }

        let (instruments, book) =
            tokio::try_join!(self.instruments(currency), self.book_summary(currency))?;

        let aggregate = aggregate(&instruments, &book, expiry);
        let max_pain = solve(&aggregate.call_by_strike, &aggregate.put_by_strike);
        info!(
            %currency,
            %expiry,
            strikes = aggregate.strikes().len(),
            max_pain = ?max_pain.price,
            "computed open interest"
        );

        let report = Arc::new(OpenInterestResponse::from_aggregate(
            currency, expiry, aggregate, max_pain,
        ));
        self.cache
            .set(key, CachedPayload::OpenInterest(Arc::clone(&report)));
        Ok(report)
    }
}
