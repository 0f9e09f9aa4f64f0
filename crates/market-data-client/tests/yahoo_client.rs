//! HTTP-level tests for the Yahoo Finance client against a mock server.

use std::time::Duration;

use analysis_core::{sanitize, AnalysisError, MacroDataProvider, MarketDataProvider};
use market_data_client::YahooFinanceClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> YahooFinanceClient {
    YahooFinanceClient::new()
        .with_base_url(server.uri())
        .with_rate_limit(1000)
        .with_retry_wait(Duration::from_millis(10))
}

fn chart_body(closes: &[f64]) -> Value {
    let timestamps: Vec<i64> = (0..closes.len() as i64).map(|i| 1_700_000_000 + i * 86_400).collect();
    json!({
        "chart": {
            "result": [{
                "meta": {"regularMarketPrice": closes.last()},
                "timestamp": timestamps,
                "indicators": {"quote": [{
                    "open": closes,
                    "high": closes,
                    "low": closes,
                    "close": closes,
                    "volume": vec![1000; closes.len()]
                }]}
            }],
            "error": null
        }
    })
}

fn quote_body() -> Value {
    json!({
        "quoteSummary": {
            "result": [{
                "price": {"regularMarketPrice": {"raw": 2000.0}, "longName": "Nippon Yusen"},
                "summaryDetail": {
                    "fiftyTwoWeekHigh": {"raw": 5000.0},
                    "fiftyTwoWeekLow": {"raw": 1900.0},
                    "trailingPE": {"raw": 16.0}
                },
                "financialData": {"returnOnEquity": {"raw": 0.1}},
                "balanceSheetHistory": {"balanceSheetStatements": []},
                "incomeStatementHistory": {"incomeStatementHistory": []}
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn history_request_uses_normalized_symbol() {
    let server = MockServer::start().await;
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/7203.T"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&closes)))
        .expect(1)
        .mount(&server)
        .await;

    let bars = client_for(&server).fetch_history("7203", 180).await.unwrap();
    assert_eq!(bars.len(), 40);
    assert_eq!(bars[0].close, 100.0);
    assert_eq!(bars[39].close, 139.0);
    assert!(bars[0].timestamp < bars[39].timestamp);
}

#[tokio::test]
async fn quote_summary_is_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/9101.T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
        .mount(&server)
        .await;

    let quote = client_for(&server).fetch_quote("9101.T").await.unwrap();
    assert_eq!(quote.symbol, "9101.T");
    assert_eq!(quote.name.as_deref(), Some("Nippon Yusen"));
    assert_eq!(sanitize(&quote.current_price), Some(2000.0));
    assert_eq!(sanitize(&quote.trailing_pe), Some(16.0));
    assert_eq!(sanitize(&quote.return_on_equity), Some(0.1));
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/9101.T"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/9101.T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_body()))
        .mount(&server)
        .await;

    let quote = client_for(&server).fetch_quote("9101").await.unwrap();
    assert_eq!(sanitize(&quote.current_price), Some(2000.0));
}

#[tokio::test]
async fn persistent_rate_limit_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_quote("9101").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Provider(_)));
}

#[tokio::test]
async fn server_error_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_history("7203", 30).await.unwrap_err();
    assert!(err.is_provider_failure());
}

#[tokio::test]
async fn malformed_body_is_invalid_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_quote("7203").await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidData(_)));
}

#[tokio::test]
async fn macro_snapshot_tolerates_a_missing_leg() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"TNX$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[4.1, 4.2])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"FVX$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[4.4, 4.5])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"VIX$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let snapshot = client_for(&server).fetch_macro().await.unwrap();
    assert_eq!(snapshot.ten_year_yield, Some(4.2));
    assert_eq!(snapshot.short_yield, Some(4.5));
    assert_eq!(snapshot.volatility_index, None);
    assert!(snapshot.yield_spread().unwrap() < 0.0);
}

#[tokio::test]
async fn macro_snapshot_fails_when_every_leg_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_macro().await.unwrap_err();
    assert!(err.is_provider_failure());
}
