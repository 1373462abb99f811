//! Integration tests for API endpoints
//!
//! Requests go through the full router (auth extractor, JSON envelopes,
//! error mapping) against an in-memory store. The simulator is never
//! started, so market orders execute at the opening (base) prices.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use dalal::config::Config;
use dalal::services::MemoryKvStore;
use dalal::types::default_instruments;
use dalal::{app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> Router {
    let state = AppState::new(
        Config::default(),
        default_instruments(),
        Arc::new(MemoryKvStore::new()),
    );
    app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["sessionToken"].as_str().unwrap().to_string()
}

// =============================================================================
// Health & Market
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["tick"], 0);
    assert_eq!(body["data"]["instruments"], 26);

    let (status, body) = send(&app, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_watchlist_and_quotes() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/market/watchlist", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quotes"].as_array().unwrap().len(), 26);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/market/watchlist?symbols=tcs,INFY",
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["quotes"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/api/market/quotes/tcs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "TCS");
    assert_eq!(body["data"]["currentPrice"], 3680.0);

    let (status, body) = send(&app, Method::GET, "/api/market/quotes/NOPE", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_INSTRUMENT");
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_auth_flow() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let token = login(&app, "Trader@Example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "trader@example.com");
    assert_eq!(body["data"]["name"], "trader");

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_trading_requires_auth() {
    let app = test_app();

    let (status, _) = send(&app, Method::GET, "/api/trading/portfolio", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/trading/portfolio",
        Some("not-a-session"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Trading
// =============================================================================

#[tokio::test]
async fn test_order_lifecycle() {
    let app = test_app();
    let token = login(&app, "a@b.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trading/orders",
        Some(&token),
        Some(json!({ "symbol": "TCS", "action": "buy", "quantity": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["order"]["price"], 3680.0);
    assert_eq!(body["data"]["position"]["quantity"], 10);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trading/orders",
        Some(&token),
        Some(json!({
            "symbol": "TCS",
            "action": "sell",
            "quantity": 4,
            "orderType": "limit",
            "limitPrice": 3780.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["realizedPnl"]["amount"], 400.0);
    assert_eq!(body["data"]["position"]["quantity"], 6);

    let (status, body) = send(&app, Method::GET, "/api/trading/portfolio", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let holdings = body["data"]["holdings"].as_array().unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0]["symbol"], "TCS");
    assert_eq!(holdings[0]["avgPrice"], 3680.0);

    let (_, body) = send(&app, Method::GET, "/api/trading/orders", Some(&token), None).await;
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["action"], "sell");
    assert_eq!(orders[1]["action"], "buy");

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/trading/orders?limit=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/trading/portfolio/reset",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/trading/portfolio", Some(&token), None).await;
    assert!(body["data"]["holdings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ledgers_are_per_user() {
    let app = test_app();
    let alice = login(&app, "alice@b.com").await;
    let bob = login(&app, "bob@b.com").await;

    send(
        &app,
        Method::POST,
        "/api/trading/orders",
        Some(&alice),
        Some(json!({ "symbol": "INFY", "action": "buy", "quantity": 3 })),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/trading/portfolio", Some(&bob), None).await;
    assert!(body["data"]["holdings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_order_errors() {
    let app = test_app();
    let token = login(&app, "a@b.com").await;

    let cases = [
        (
            json!({ "symbol": "TCS", "action": "sell", "quantity": 1 }),
            StatusCode::BAD_REQUEST,
            "INSUFFICIENT_HOLDINGS",
        ),
        (
            json!({ "symbol": "TCS", "action": "buy", "quantity": 0 }),
            StatusCode::BAD_REQUEST,
            "INVALID_QUANTITY",
        ),
        (
            json!({ "symbol": "TCS", "action": "buy", "quantity": -5 }),
            StatusCode::BAD_REQUEST,
            "INVALID_QUANTITY",
        ),
        (
            json!({ "symbol": "ZZZ", "action": "buy", "quantity": 1 }),
            StatusCode::NOT_FOUND,
            "UNKNOWN_INSTRUMENT",
        ),
        (
            json!({ "symbol": "TCS", "action": "buy", "quantity": 1, "orderType": "limit" }),
            StatusCode::BAD_REQUEST,
            "INVALID_PRICE",
        ),
    ];

    for (request, status, code) in cases {
        let (actual, body) = send(
            &app,
            Method::POST,
            "/api/trading/orders",
            Some(&token),
            Some(request.clone()),
        )
        .await;
        assert_eq!(actual, status, "request {}", request);
        assert_eq!(body["code"], code, "request {}", request);
    }

    // Fractional quantities never reach the service
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/trading/orders",
        Some(&token),
        Some(json!({ "symbol": "TCS", "action": "buy", "quantity": 1.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::GET, "/api/trading/orders", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_preview_does_not_settle() {
    let app = test_app();
    let token = login(&app, "a@b.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trading/orders/preview",
        Some(&token),
        Some(json!({ "symbol": "INFY", "action": "buy", "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["executionPrice"], 1520.0);
    assert_eq!(body["data"]["totalAmount"], 3040.0);

    let (_, body) = send(&app, Method::GET, "/api/trading/orders", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat() {
    let app = test_app();
    let token = login(&app, "a@b.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(&token),
        Some(json!({ "message": "How is Infosys doing?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rule"], "stock:INFY");

    send(
        &app,
        Method::POST,
        "/api/trading/orders",
        Some(&token),
        Some(json!({ "symbol": "TCS", "action": "buy", "quantity": 1 })),
    )
    .await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(&token),
        Some(json!({ "message": "Review my portfolio" })),
    )
    .await;
    assert_eq!(body["data"]["rule"], "portfolio");
    assert!(body["data"]["reply"].as_str().unwrap().contains("TCS"));

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/chat",
        Some(&token),
        Some(json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(body["data"]["rule"], "help");
}
