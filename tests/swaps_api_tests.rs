//! Tests for the swap-quote API endpoints

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use mockito::{mock, server_url, Matcher};
use serde_json::json;
use tower::ServiceExt;

use wallet_market_server::{
    api::api_router,
    config::Config,
    market::models::{Quote, QuotesState},
    AppState,
};

fn test_app(prefix: &str) -> Router {
    let mut config = Config::default();
    config.rate_api_url = format!("{}/{}/rates", server_url(), prefix);
    config.swaps_api_url = format!("{}/{}", server_url(), prefix);

    let state = AppState::new(config);
    Router::new().nest("/api", api_router()).with_state(state)
}

fn quote_request_body() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "source_token": "0x6b175474e89094c44da98b954eedeac495271d0f",
        "destination_token": "0x0000000000000000000000000000000000000000",
        "source_amount": 2500000000000000000u64,
        "slippage": 2.0
    }))
    .unwrap()
}

fn quotes_body() -> serde_json::Value {
    json!({
        "airswap": {
            "aggregator_id": "airswap",
            "destination_amount": 995000000000000000u64,
            "destination_token": {
                "address": "0x0000000000000000000000000000000000000000",
                "symbol": "ETH",
                "decimals": 18
            },
            "gas_estimate": 180000,
            "max_gas": 700000,
            "approval_needed": false
        },
        "oneinch": {
            "aggregator_id": "oneinch",
            "destination_amount": 1002000000000000000u64,
            "destination_token": {
                "address": "0x0000000000000000000000000000000000000000",
                "symbol": "ETH",
                "decimals": 18
            },
            "gas_estimate": 260000,
            "max_gas": 900000,
            "approval_needed": true
        }
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Vec<u8>>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(bytes) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(bytes)
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn quotes_start_empty_and_best_is_404() {
    let app = test_app("s1");

    let (status, body) = send(&app, Method::GET, "/api/swaps/quotes", None).await;
    assert_eq!(status, StatusCode::OK);
    let state: QuotesState = serde_json::from_slice(&body).unwrap();
    assert!(state.quotes.is_empty());
    assert!(state.best_quote_id.is_none());

    let (status, _) = send(&app, Method::GET, "/api/swaps/best", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetching_quotes_selects_the_best_one() {
    let m = mock("GET", "/s2/quotes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "sourceToken".into(),
                "0x6b175474e89094c44da98b954eedeac495271d0f".into(),
            ),
            Matcher::UrlEncoded("sourceAmount".into(), "2500000000000000000".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(quotes_body().to_string())
        .create();

    let app = test_app("s2");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/swaps/quotes",
        Some(quote_request_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let state: QuotesState = serde_json::from_slice(&body).unwrap();
    assert_eq!(state.quotes.len(), 2);
    // oneinch pays 0.007 ETH more, but 80k extra gas plus the 120k approval
    // allowance at 20 gwei costs 0.004 ETH, so it still wins on net value.
    assert_eq!(state.best_quote_id.as_deref(), Some("oneinch"));
    assert!(state.quotes_last_fetched.is_some());
    assert!(state.active_request.is_some());

    let (status, body) = send(&app, Method::GET, "/api/swaps/best", None).await;
    assert_eq!(status, StatusCode::OK);
    let best: Quote = serde_json::from_slice(&body).unwrap();
    assert_eq!(best.aggregator_id, "oneinch");
    m.assert();
}

#[tokio::test]
async fn invalid_quote_request_is_a_bad_request() {
    let app = test_app("s3");
    let body = serde_json::to_vec(&json!({
        "source_token": "0x6b175474e89094c44da98b954eedeac495271d0f",
        "destination_token": "0x0000000000000000000000000000000000000000",
        "source_amount": 0,
        "slippage": 2.0
    }))
    .unwrap();

    let (status, body) = send(&app, Method::POST, "/api/swaps/quotes", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().contains("greater than zero"));
}

#[tokio::test]
async fn upstream_failure_is_recorded_and_returned_as_bad_gateway() {
    let _m = mock("GET", "/s4/quotes")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("maintenance")
        .create();

    let app = test_app("s4");
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/swaps/quotes",
        Some(quote_request_body()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) = send(&app, Method::GET, "/api/swaps/quotes", None).await;
    let state: QuotesState = serde_json::from_slice(&body).unwrap();
    assert!(state.quotes.is_empty());
    assert!(state.error.as_deref().unwrap_or("").contains("503"));
}

#[tokio::test]
async fn reset_clears_quotes_and_stops_polling() {
    let _m = mock("GET", "/s5/quotes")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(quotes_body().to_string())
        .create();

    let app = test_app("s5");
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/swaps/quotes",
        Some(quote_request_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, "/api/swaps/quotes", None).await;
    assert_eq!(status, StatusCode::OK);
    let state: QuotesState = serde_json::from_slice(&body).unwrap();
    assert!(state.quotes.is_empty());
    assert!(state.best_quote_id.is_none());
    assert!(state.quotes_last_fetched.is_none());
    assert!(state.active_request.is_none());

    let (status, _) = send(&app, Method::GET, "/api/swaps/best", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
