//! Request and response models for the REST API.

use crate::aggregation::{OpenInterestAggregate, StrikeOiMap};
use crate::instrument::{Currency, ExpiryKey};
use crate::max_pain::MaxPain;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "BTC";

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Service status response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Always `true` while the process serves requests.
    pub ok: bool,
    /// Entries currently held by the response cache.
    pub cache_size: usize,
    /// Cache time-to-live in milliseconds.
    pub cache_ttl_ms: u64,
    /// Configured log level.
    pub log_level: String,
    /// Server time in epoch milliseconds.
    pub ts: i64,
}

/// Query of `GET /api/expiries`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ExpiriesQuery {
    /// `BTC` or `ETH`, case-insensitive. Defaults to `BTC`.
    pub currency: Option<String>,
}

/// Query of `GET /api/oi`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct OpenInterestQuery {
    /// `BTC` or `ETH`, case-insensitive. Defaults to `BTC`.
    pub currency: Option<String>,
    /// Expiry day, `YYYY-MM-DD`.
    pub expiry: Option<String>,
}

/// Expiry dates listed for a currency.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpiriesResponse {
    /// Currency symbol.
    #[schema(value_type = String, example = "BTC")]
    pub currency: Currency,
    /// Expiry days, earliest first.
    #[schema(value_type = Vec<String>, example = json!(["2025-08-29", "2025-09-26"]))]
    pub expiries: Vec<ExpiryKey>,
}

/// Open interest distribution and max pain of one expiry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpenInterestResponse {
    /// Currency symbol.
    #[schema(value_type = String, example = "BTC")]
    pub currency: Currency,
    /// Expiry day.
    #[schema(value_type = String, example = "2025-08-29")]
    pub expiry: ExpiryKey,
    /// Underlying price, 0 when unknown.
    pub underlying: f64,
    /// Total call open interest.
    pub call_open_interest: f64,
    /// Total put open interest.
    pub put_open_interest: f64,
    /// Call plus put open interest.
    pub total_open_interest: f64,
    /// Calls over puts (puts floored at 1), 0 without open interest.
    pub call_put_ratio: f64,
    /// Underlying price times total open interest.
    pub notional_value_est: f64,
    /// Max pain strike, null without strikes.
    pub max_pain_price: Option<f64>,
    /// Every strike with open interest, ascending.
    pub strikes: Vec<f64>,
    /// Strike → call open interest.
    #[schema(value_type = Object)]
    pub call_by_strike: StrikeOiMap,
    /// Strike → put open interest.
    #[schema(value_type = Object)]
    pub put_by_strike: StrikeOiMap,
}

impl OpenInterestResponse {
    /// Builds the report of one expiry from its aggregate and max pain.
    #[must_use]
    pub fn from_aggregate(
        currency: Currency,
        expiry: ExpiryKey,
        aggregate: OpenInterestAggregate,
        max_pain: MaxPain,
    ) -> Self {
        let underlying = aggregate.underlying_price.unwrap_or(0.0);
        let call_oi = aggregate.total_call_oi;
        let put_oi = aggregate.total_put_oi;
        let total_oi = aggregate.total_oi();

        let call_put_ratio = if total_oi != 0.0 {
            call_oi / put_oi.max(1.0)
        } else {
            0.0
        };

        let strikes = aggregate
            .strikes()
            .iter()
            .filter_map(ToPrimitive::to_f64)
            .collect();

        Self {
            currency,
            expiry,
            underlying,
            call_open_interest: call_oi,
            put_open_interest: put_oi,
            total_open_interest: total_oi,
            call_put_ratio,
            notional_value_est: underlying * total_oi,
            max_pain_price: max_pain.price.and_then(|p| p.to_f64()),
            strikes,
            call_by_strike: aggregate.call_by_strike,
            put_by_strike: aggregate.put_by_strike,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expiry() -> ExpiryKey {
        ExpiryKey::parse("2025-08-29").unwrap()
    }

    fn sample_aggregate() -> OpenInterestAggregate {
        OpenInterestAggregate {
            call_by_strike: StrikeOiMap::from([(dec!(60000), 10.0), (dec!(70000), 3.0)]),
            put_by_strike: StrikeOiMap::from([(dec!(60000), 5.0)]),
            total_call_oi: 13.0,
            total_put_oi: 5.0,
            underlying_price: Some(64_000.0),
        }
    }

    #[test]
    fn test_report_figures() {
        let max_pain = MaxPain {
            price: Some(dec!(60000)),
            loss: 0.0,
        };
        let report =
            OpenInterestResponse::from_aggregate(Currency::Btc, expiry(), sample_aggregate(), max_pain);

        assert_eq!(report.underlying, 64_000.0);
        assert_eq!(report.total_open_interest, 18.0);
        assert_eq!(report.call_put_ratio, 13.0 / 5.0);
        assert_eq!(report.notional_value_est, 64_000.0 * 18.0);
        assert_eq!(report.max_pain_price, Some(60_000.0));
        assert_eq!(report.strikes, vec![60_000.0, 70_000.0]);
    }

    #[test]
    fn test_report_serialization_shape() {
        let max_pain = MaxPain {
            price: Some(dec!(60000)),
            loss: 0.0,
        };
        let report =
            OpenInterestResponse::from_aggregate(Currency::Btc, expiry(), sample_aggregate(), max_pain);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["currency"], "BTC");
        assert_eq!(json["expiry"], "2025-08-29");
        assert_eq!(json["max_pain_price"], 60000.0);
        assert_eq!(json["call_by_strike"]["60000"], 10.0);
        assert_eq!(json["call_by_strike"]["70000"], 3.0);
        assert_eq!(json["put_by_strike"]["60000"], 5.0);
        assert_eq!(json["strikes"], serde_json::json!([60000.0, 70000.0]));
    }

    #[test]
    fn test_ratio_floors_puts_at_one() {
        let aggregate = OpenInterestAggregate {
            call_by_strike: StrikeOiMap::from([(dec!(100), 0.5)]),
            put_by_strike: StrikeOiMap::from([(dec!(100), 0.25)]),
            total_call_oi: 0.5,
            total_put_oi: 0.25,
            underlying_price: None,
        };

        let report = OpenInterestResponse::from_aggregate(
            Currency::Eth,
            expiry(),
            aggregate,
            MaxPain::EMPTY,
        );
        assert_eq!(report.call_put_ratio, 0.5);
        assert_eq!(report.underlying, 0.0);
        assert_eq!(report.notional_value_est, 0.0);
    }

    #[test]
    fn test_empty_report() {
        let report = OpenInterestResponse::from_aggregate(
            Currency::Btc,
            expiry(),
            OpenInterestAggregate::default(),
            MaxPain::EMPTY,
        );

        assert_eq!(report.call_put_ratio, 0.0);
        assert_eq!(report.max_pain_price, None);
        assert!(report.strikes.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["max_pain_price"].is_null());
        assert_eq!(json["call_by_strike"], serde_json::json!({}));
    }

    #[test]
    fn test_expiries_response_serialization() {
        let response = ExpiriesResponse {
            currency: Currency::Eth,
            expiries: vec![expiry()],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"currency":"ETH","expiries":["2025-08-29"]}"#);
    }

    #[test]
    fn test_query_deserialization() {
        let query: OpenInterestQuery =
            serde_json::from_str(r#"{"currency": "eth", "expiry": "2025-08-29"}"#).unwrap();
        assert_eq!(query.currency.as_deref(), Some("eth"));
        assert_eq!(query.expiry.as_deref(), Some("2025-08-29"));

        let query: ExpiriesQuery = serde_json::from_str("{}").unwrap();
        assert!(query.currency.is_none());
    }
}
