//! HTTP client for the Deribit public API.

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::types::*;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;


/// Public REST endpoint of the production exchange.
pub const DEFAULT_BASE_URL: &str = "https://www.deribit.com/api/v2";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://www.deribit.com/api/v2").
    pub base_url: String,
    /// Timeout of a single attempt.
    pub timeout: Duration,
    /// Retry policy applied to every request.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(15_000),
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP client for the Deribit public market-data endpoints.
#[derive(Debug, Clone)]
pub struct DeribitClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DeribitClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            retry: config.retry,
        })
    }

    /// Creates a new client with default timeout and retry policy.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Base URL requests are sent to, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry policy of this client.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Lists the non-expired option instruments of a currency.
    ///
    /// # Errors
    /// Returns [`Error::Unavailable`] when every attempt failed and
    /// [`Error::Protocol`] when the response is not JSON or has no usable
    /// `result`.
    pub async fn get_instruments(&self, currency: &str) -> Result<Vec<Instrument>, Error> {
        let query = InstrumentsQuery {
            currency,
            expired: false,
            kind: OPTION_KIND,
        };
        self.get_result("public/get_instruments", &query).await
    }

    /// Gets the book summary of every option of a currency.
    ///
    /// # Errors
    /// Returns [`Error::Unavailable`] when every attempt failed and
    /// [`Error::Protocol`] when the response is not JSON or has no usable
    /// `result`.
    pub async fn get_book_summary_by_currency(
        &self,
        currency: &str,
    ) -> Result<Vec<BookSummary>, Error> {
        let query = BookSummaryQuery {
            currency,
            kind: OPTION_KIND,
        };
        self.get_result("public/get_book_summary_by_currency", &query)
            .await
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn endpoint_url<Q: Serialize>(&self, method: &str, query: &Q) -> Result<String, Error> {
        let mut url = format!("{}/{}", self.base_url, method);
        let params = serde_urlencoded::to_string(query)?;
        if !params.is_empty() {
            url.push_str(&format!("?{}", params));
        }
        Ok(url)
    }

    async fn get_result<Q, T>(&self, method: &str, query: &Q) -> Result<T, Error>
    where
        Q: Serialize,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(method, query)?;
        let url = url.as_str();
        let body = self
            .retry
            .run(method, || self.fetch_json(url))
            .await
            .map_err(malformed_body_as_protocol)?;
        extract_result(body)
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, Error> {
        debug!(url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                text
            };
            return Err(Error::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// A body that stayed unparseable through every attempt is a protocol error,
/// not an outage.
fn malformed_body_as_protocol(err: Error) -> Error {
    match err {
        Error::Unavailable { attempts, source } if matches!(*source, Error::Json(_)) => {
            Error::Protocol(format!(
                "body is not valid JSON after {} attempts: {}",
                attempts, source
            ))
        }
        other => other,
    }
}

/// Extracts and decodes the `result` member of a JSON-RPC response body.
fn extract_result<T: DeserializeOwned>(mut body: Value) -> Result<T, Error> {
    match body.get_mut("result").map(Value::take) {
        Some(result) if !result.is_null() => serde_json::from_value(result)
            .map_err(|e| Error::Protocol(format!("malformed `result`: {}", e))),
        _ => {
            let detail = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(|m| format!(" (upstream error: {})", m))
                .unwrap_or_default();
            Err(Error::Protocol(format!(
                "response has no `result` field{}",
                detail
            )))
        }
    }
}
