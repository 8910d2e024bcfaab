//! Integration tests for API endpoints

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{test_state, ScriptedSource};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

fn offline_app() -> Router {
    copyfeed::app(test_state(ScriptedSource::offline()))
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = offline_app();
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

// =============================================================================
// Traders
// =============================================================================

#[tokio::test]
async fn test_list_traders() {
    let app = offline_app();
    let (status, body) = get(&app, "/api/traders").await;
    assert_eq!(status, StatusCode::OK);
    let traders = body["data"].as_array().unwrap();
    assert_eq!(traders.len(), 5);
    assert!(traders.iter().all(|t| t["isBot"] == true));
}

#[tokio::test]
async fn test_unknown_trader_is_404() {
    let app = offline_app();
    let (status, body) = get(&app, "/api/traders/bot-nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert!(body["error"].as_str().unwrap().contains("bot-nobody"));
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let app = offline_app();

    let (status, body) = post(&app, "/api/traders/bot-swing-sam/follow", Some("alice"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["following"], true);
    assert_eq!(body["data"]["followers"], 328);

    let (_, body) = get(&app, "/api/traders/bot-swing-sam").await;
    assert_eq!(body["data"]["followers"], 328);

    let (status, body) =
        post(&app, "/api/traders/bot-swing-sam/unfollow", Some("alice"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["following"], false);
    assert_eq!(body["data"]["followers"], 327);
}

#[tokio::test]
async fn test_bot_portfolio_starts_with_capital() {
    let app = offline_app();
    let (status, body) = get(&app, "/api/traders/bot-dca-deb/portfolio").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cash"], 150_000.0);
    assert!(body["data"]["holdings"].as_array().unwrap().is_empty());
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_signup_validation() {
    let app = offline_app();

    let (status, body) = post(
        &app,
        "/api/users",
        None,
        json!({"name": "  ", "email": "ada@example.com", "accountType": "demo"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter your name.");

    let (status, body) = post(
        &app,
        "/api/users",
        None,
        json!({"name": "Ada", "email": "not-an-email", "accountType": "demo"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a valid email address.");
}

#[tokio::test]
async fn test_signup_then_trade_as_user() {
    let app = offline_app();

    let (status, body) = post(
        &app,
        "/api/users",
        None,
        json!({"name": "Ada Lovelace", "email": "ada@example.com", "accountType": "demo"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "/api/trades",
        Some(user_id.as_str()),
        json!({"symbol": " aapl ", "action": "BUY", "quantity": 10, "price": 100.0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "AAPL");
    assert_eq!(body["data"]["traderName"], "Ada Lovelace");
    assert_eq!(body["data"]["value"], 1000.0);

    let request = Request::get("/api/portfolio")
        .header("x-user-id", user_id.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cash"], 99_000.0);
    assert_eq!(body["data"]["holdings"][0]["quantity"], 10);
}

#[tokio::test]
async fn test_demo_setup_follows_trader() {
    let app = offline_app();

    let (status, body) = post(
        &app,
        "/api/users/me/demo-setup",
        None,
        json!({"traderId": "bot-tech-tyler"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], "user123");
    assert_eq!(body["data"]["following"][0]["id"], "bot-tech-tyler");

    let (_, body) = get(&app, "/api/users/me/following").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = post(
        &app,
        "/api/users/me/demo-setup",
        None,
        json!({"traderId": "bot-nobody"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Trades
// =============================================================================

#[tokio::test]
async fn test_create_trade_rejects_missing_fields() {
    let app = offline_app();
    let (status, body) = post(
        &app,
        "/api/trades",
        None,
        json!({"symbol": "AAPL", "action": "BUY", "quantity": 0, "price": 100.0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please fill in all required fields");
}

#[tokio::test]
async fn test_create_trade_rejects_malformed_form_with_json_error() {
    let app = offline_app();
    for form in [
        json!({"symbol": "AAPL", "action": "BUY", "quantity": -5, "price": 100.0}),
        json!({"symbol": "AAPL", "action": "HOLD", "quantity": 5, "price": 100.0}),
        json!({"symbol": "AAPL", "quantity": "lots", "price": 100.0}),
    ] {
        let (status, body) = post(&app, "/api/trades", None, form).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Please fill in all required fields");
    }

    let (_, body) = get(&app, "/api/trades").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_trade_defaults_to_buy() {
    let app = offline_app();
    let (status, body) = post(
        &app,
        "/api/trades",
        None,
        json!({"symbol": "MSFT", "quantity": 2, "price": 400.0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "BUY");
    assert_eq!(body["data"]["traderId"], "user123");
}

#[tokio::test]
async fn test_copy_trade() {
    let app = offline_app();

    let (_, body) = post(&app, "/api/bots/bot-momentum-mike/generate", None, json!({})).await;
    let original = body["data"].clone();
    let original_id = original["id"].as_str().unwrap();

    let (status, body) = post(
        &app,
        &format!("/api/trades/{}/copy", original_id),
        Some("bob"),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let copy = &body["data"];
    assert_eq!(copy["isCopy"], true);
    assert_eq!(copy["originalTradeId"], original["id"]);
    assert_eq!(copy["originalTraderId"], "bot-momentum-mike");
    assert_eq!(copy["traderId"], "bob");
    assert_eq!(copy["symbol"], original["symbol"]);
    assert_eq!(copy["quantity"], original["quantity"]);
    assert_eq!(copy["rationale"], "Copied trade from Momentum Mike");

    let (_, body) = get(&app, "/api/trades/user/bob").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = post(&app, "/api/trades/missing/copy", None, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_symbol_trades_respects_limit() {
    let app = offline_app();
    for _ in 0..3 {
        post(
            &app,
            "/api/trades",
            None,
            json!({"symbol": "KO", "action": "BUY", "quantity": 1, "price": 60.0}),
        )
        .await;
    }

    let (_, body) = get(&app, "/api/trades/symbol/ko?limit=2").await;
    let trades = body["data"].as_array().unwrap();
    assert_eq!(trades.len(), 2);
    assert!(trades.iter().all(|t| t["symbol"] == "KO"));
}

// =============================================================================
// Comments & discussions
// =============================================================================

#[tokio::test]
async fn test_comment_thread_and_reactions() {
    let app = offline_app();
    let (_, body) = post(
        &app,
        "/api/trades",
        None,
        json!({"symbol": "MSFT", "action": "BUY", "quantity": 2, "price": 400.0}),
    )
    .await;
    let trade_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        &format!("/api/trades/{}/comments", trade_id),
        Some("carol"),
        json!({"content": "Nice entry"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = post(
        &app,
        &format!("/api/trades/{}/comments", trade_id),
        None,
        json!({"content": "Agreed", "parentId": comment_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        &format!("/api/trades/{}/comments", trade_id),
        None,
        json!({"content": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Comment cannot be empty");

    let (status, body) = post(
        &app,
        &format!("/api/comments/{}/reactions", comment_id),
        Some("dave"),
        json!({"reaction": "🔥"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reactions"]["🔥"][0], "dave");

    let (_, body) = get(&app, &format!("/api/trades/{}/comments/thread", trade_id)).await;
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["replies"].as_array().unwrap().len(), 1);

    let (_, body) = get(&app, &format!("/api/trades/{}/comments/stats", trade_id)).await;
    assert_eq!(body["data"]["commentCount"], 2);
    assert_eq!(body["data"]["reactionCount"], 1);
}

#[tokio::test]
async fn test_discussions() {
    let app = offline_app();

    let (status, body) = post(
        &app,
        "/api/traders/bot-value-victoria/discussions",
        None,
        json!({"title": "Dividend picks", "content": "What is next after KO?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["commentCount"], 0);
    let discussion_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        &format!("/api/discussions/{}/reactions", discussion_id),
        None,
        json!({"reaction": "🧠"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reactions"]["🧠"][0], "user123");

    let (_, body) = get(&app, "/api/traders/bot-value-victoria/discussions").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = post(
        &app,
        "/api/traders/bot-value-victoria/discussions",
        None,
        json!({"title": "", "content": "no title"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Market data
// =============================================================================

#[tokio::test]
async fn test_quote_falls_back_to_simulation() {
    let app = offline_app();
    let (status, body) = get(&app, "/api/market/quote/aapl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], "AAPL");
    assert_eq!(body["data"]["simulated"], true);
    assert!(body["data"]["price"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_quote_from_source() {
    let app = copyfeed::app(test_state(ScriptedSource::flat(123.45, 1.5)));
    let (status, body) = get(&app, "/api/market/quote/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 123.45);
    assert_eq!(body["data"]["simulated"], false);

    let (_, body) = get(&app, "/api/market/cached").await;
    assert_eq!(body["data"][0]["symbol"], "AAPL");
}

#[tokio::test]
async fn test_history_errors() {
    let app = offline_app();

    let (status, _) = get(&app, "/api/market/history/AAPL?timeframe=fortnight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/market/history/AAPL").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);
}

#[tokio::test]
async fn test_history_from_source() {
    let app = copyfeed::app(test_state(ScriptedSource::flat(50.0, 0.0)));
    let (status, body) = get(&app, "/api/market/history/KO?timeframe=all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["date"], "2099-01-01");
}

#[tokio::test]
async fn test_market_state_from_index_moves() {
    let app = copyfeed::app(test_state(ScriptedSource::flat(100.0, 1.0)));
    let (status, body) = get(&app, "/api/market/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["marketTrend"], "bullish");
    assert_eq!(body["data"]["volatility"], "medium");
    assert_eq!(body["data"]["sectorPerformance"]["Technology"]["change"], 1.0);
    assert!(body["data"]["lastCheck"].is_i64());

    let app = copyfeed::app(test_state(ScriptedSource::flat(100.0, 0.0)));
    let (_, body) = get(&app, "/api/market/state").await;
    assert_eq!(body["data"]["marketTrend"], "neutral");
    assert_eq!(body["data"]["volatility"], "low");
}

// =============================================================================
// Feed
// =============================================================================

#[tokio::test]
async fn test_generate_bot_trade() {
    let app = offline_app();

    let (status, body) = post(&app, "/api/bots/bot-dca-deb/generate", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["traderId"], "bot-dca-deb");
    assert_eq!(body["data"]["isBot"], true);
    assert!(body["data"]["quantity"].as_u64().unwrap() >= 1);

    let (status, _) = post(&app, "/api/bots/bot-nobody/generate", None, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_lists_bot_trades() {
    let app = offline_app();
    post(&app, "/api/bots/bot-tech-tyler/generate", None, json!({})).await;
    post(&app, "/api/bots/bot-swing-sam/generate", None, json!({})).await;

    let (status, body) = get(&app, "/api/feed?bots=bot-tech-tyler&frequency=low").await;
    assert_eq!(status, StatusCode::OK);
    let trades = body["data"].as_array().unwrap();
    assert!(!trades.is_empty());
    assert!(trades.len() <= 30);

    let timestamps: Vec<i64> = trades
        .iter()
        .map(|t| t["timestamp"].as_i64().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));

    let (status, _) = get(&app, "/api/feed?frequency=sometimes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
