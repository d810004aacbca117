//! Expiry listing tests.

use max_pain_tests::{FakeDeribit, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_expiries_sorted_and_cached() {
    let app = TestApp::start(FakeDeribit::default())
        .await
        .expect("Failed to start app");

    let (status, body) = app.get("/api/expiries?currency=BTC").await.expect("Request failed");
    assert_eq!(status, 200);
    assert_eq!(body["currency"], "BTC");
    assert_eq!(body["expiries"], json!(["2025-08-29", "2025-09-26"]));

    // lowercase is normalized and served from the cache
    let (status, body) = app.get("/api/expiries?currency=btc").await.expect("Request failed");
    assert_eq!(status, 200);
    assert_eq!(body["currency"], "BTC");
    assert_eq!(app.fake.instruments_calls(), 1);
}

#[tokio::test]
async fn test_expiries_default_currency() {
    let app = TestApp::start(FakeDeribit::default())
        .await
        .expect("Failed to start app");

    let (status, body) = app.get("/api/expiries").await.expect("Request failed");
    assert_eq!(status, 200);
    assert_eq!(body["currency"], "BTC");
}

#[tokio::test]
async fn test_expiries_other_currency() {
    let app = TestApp::start(FakeDeribit::default())
        .await
        .expect("Failed to start app");

    let (status, body) = app.get("/api/expiries?currency=ETH").await.expect("Request failed");
    assert_eq!(status, 200);
    assert_eq!(body["currency"], "ETH");
    assert_eq!(body["expiries"], json!(["2025-09-26"]));
}

#[tokio::test]
async fn test_expiries_invalid_currency() {
    let app = TestApp::start(FakeDeribit::default())
        .await
        .expect("Failed to start app");

    let (status, body) = app.get("/api/expiries?currency=XRP").await.expect("Request failed");
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_CURRENCY");
    assert!(body["error"].as_str().unwrap().contains("BTC or ETH"));
    assert_eq!(app.fake.instruments_calls(), 0);
}
