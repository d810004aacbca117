//! Unit tests for service module.
//!
//! The client points at a closed local port, so any test that reaches the
//! network fails fast; cache hits must not.

use super::*;
use crate::aggregation::StrikeOiMap;
use crate::cache::ManualClock;
use deribit_client::{ClientConfig, RetryPolicy};
use rust_decimal_macros::dec;
use std::time::Duration;

// 2025-08-29T08:00:00Z, 2025-09-26T08:00:00Z
const AUG_29: i64 = 1_756_454_400_000;
const SEP_26: i64 = 1_758_873_600_000;
const TTL: Duration = Duration::from_millis(15_000);

fn offline_service() -> (MarketDataService, Arc<ManualClock>) {
    let client = DeribitClient::new(ClientConfig {
        base_url: "http://127.0.0.1:1/api/v2".to_string(),
        timeout: Duration::from_millis(500),
        retry: RetryPolicy {
            retries: 0,
            backoff: Duration::from_millis(1),
        },
    })
    .unwrap();
    let clock = Arc::new(ManualClock::new(1_000_000));
    let cache = ResponseCache::with_clock(TTL, clock.clone());
    (MarketDataService::new(client, cache), clock)
}

fn instrument(name: &str, expiration_timestamp: i64) -> Instrument {
    Instrument {
        instrument_name: name.to_string(),
        expiration_timestamp,
        base_currency: "BTC".to_string(),
        kind: "option".to_string(),
    }
}

fn row(name: &str, open_interest: f64, underlying_price: Option<f64>) -> BookSummary {
    BookSummary {
        instrument_name: name.to_string(),
        open_interest,
        underlying_price,
    }
}

fn seed(service: &MarketDataService) {
    let instruments = vec![
        instrument("BTC-26SEP25-80000-C", SEP_26),
        instrument("BTC-29AUG25-60000-C", AUG_29),
        instrument("BTC-29AUG25-60000-P", AUG_29),
        instrument("BTC-29AUG25-70000-C", AUG_29),
    ];
    let book = vec![
        row("BTC-29AUG25-60000-C", 10.0, Some(64_000.0)),
        row("BTC-29AUG25-60000-P", 5.0, Some(64_000.0)),
        row("BTC-29AUG25-70000-C", 3.0, Some(64_000.0)),
        row("BTC-26SEP25-80000-C", 7.0, Some(64_000.0)),
    ];
    service.cache().set(
        instruments_key(Currency::Btc),
        CachedPayload::Instruments(Arc::new(instruments)),
    );
    service
        .cache()
        .set(book_key(Currency::Btc), CachedPayload::BookSummary(Arc::new(book)));
}

fn aug_29() -> ExpiryKey {
    ExpiryKey::parse("2025-08-29").unwrap()
}

#[test]
fn test_cache_keys() {
    assert_eq!(instruments_key(Currency::Btc), "instruments:BTC");
    assert_eq!(book_key(Currency::Eth), "book:ETH");
    assert_eq!(open_interest_key(Currency::Btc, aug_29()), "oi:BTC:2025-08-29");
}

#[tokio::test]
async fn test_list_expiries_from_cache() {
    let (service, _) = offline_service();
    seed(&service);

    let expiries = service.list_expiries(Currency::Btc).await.unwrap();
    let expiries: Vec<String> = expiries.iter().map(ToString::to_string).collect();
    assert_eq!(expiries, vec!["2025-08-29", "2025-09-26"]);
}

#[tokio::test]
async fn test_open_interest_scenario() {
    let (service, _) = offline_service();
    seed(&service);

    let report = service.open_interest(Currency::Btc, aug_29()).await.unwrap();
    assert_eq!(
        report.call_by_strike,
        StrikeOiMap::from([(dec!(60000), 10.0), (dec!(70000), 3.0)])
    );
    assert_eq!(report.put_by_strike, StrikeOiMap::from([(dec!(60000), 5.0)]));
    assert_eq!(report.call_open_interest, 13.0);
    assert_eq!(report.put_open_interest, 5.0);
    assert_eq!(report.max_pain_price, Some(60_000.0));
    assert_eq!(report.strikes, vec![60_000.0, 70_000.0]);
    assert_eq!(report.underlying, 64_000.0);
}

#[tokio::test]
async fn test_open_interest_report_is_cached() {
    let (service, _) = offline_service();
    seed(&service);

    let first = service.open_interest(Currency::Btc, aug_29()).await.unwrap();
    assert!(matches!(
        service.cache().get(&open_interest_key(Currency::Btc, aug_29())),
        Some(CachedPayload::OpenInterest(_))
    ));

    let second = service.open_interest(Currency::Btc, aug_29()).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_expired_cache_goes_upstream() {
    let (service, clock) = offline_service();
    seed(&service);

    clock.advance(TTL + Duration::from_millis(1));
    let err = service.list_expiries(Currency::Btc).await.unwrap_err();
    assert!(matches!(err, ApiError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_missing_book_fails_whole_request() {
    let (service, _) = offline_service();
    service.cache().set(
        instruments_key(Currency::Btc),
        CachedPayload::Instruments(Arc::new(vec![instrument("BTC-29AUG25-60000-C", AUG_29)])),
    );

    let err = service
        .open_interest(Currency::Btc, aug_29())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UpstreamUnavailable(_)));
    assert!(
        service
            .cache()
            .get(&open_interest_key(Currency::Btc, aug_29()))
            .is_none()
    );
}

#[tokio::test]
async fn test_unknown_expiry_yields_empty_report() {
    let (service, _) = offline_service();
    seed(&service);

    let expiry = ExpiryKey::parse("2030-01-01").unwrap();
    let report = service.open_interest(Currency::Btc, expiry).await.unwrap();
    assert!(report.strikes.is_empty());
    assert_eq!(report.max_pain_price, None);
    assert_eq!(report.underlying, 0.0);
}
