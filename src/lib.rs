//! copyfeed - copy-trading demo server with simulated bot traders

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;
pub mod websocket;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{
    BotTradeGenerator, CommentService, MarketDataService, MarketStateTracker, SqliteStore,
    TradeFeedRunner, TradeService, TraderService, UserService,
};
use sources::QuoteSource;
use websocket::RoomManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SqliteStore>,
    pub market: Arc<MarketDataService>,
    pub traders: Arc<TraderService>,
    pub users: Arc<UserService>,
    pub trades: Arc<TradeService>,
    pub comments: Arc<CommentService>,
    pub generator: Arc<BotTradeGenerator>,
    pub market_state: Arc<MarketStateTracker>,
    pub feed: Arc<TradeFeedRunner>,
    pub room_manager: Arc<RoomManager>,
}

impl AppState {
    /// Wire every service around one store and one quote source.
    pub fn new(config: Config, store: Arc<SqliteStore>, source: Arc<dyn QuoteSource>) -> Self {
        let config = Arc::new(config);
        let market = Arc::new(MarketDataService::new(store.clone(), source, &config));
        let generator = Arc::new(BotTradeGenerator::new(store.clone(), market.clone()));
        let market_state = Arc::new(MarketStateTracker::new(
            market.clone(),
            config.market_state_refresh_secs,
        ));
        let feed = Arc::new(TradeFeedRunner::new(
            generator.clone(),
            market_state.clone(),
            config.feed.clone(),
        ));

        Self {
            traders: Arc::new(TraderService::new(store.clone())),
            users: Arc::new(UserService::new(
                store.clone(),
                config.demo_user.clone(),
                config.default_starting_cash,
            )),
            trades: Arc::new(TradeService::new(store.clone(), config.default_starting_cash)),
            comments: Arc::new(CommentService::new(store.clone())),
            room_manager: RoomManager::new(),
            config,
            store,
            market,
            generator,
            market_state,
            feed,
        }
    }
}

/// Full HTTP + WebSocket application.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .route("/ws", get(websocket::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
