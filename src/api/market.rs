use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{ok, ApiResult};
use crate::error::{AppError, Result};
use crate::types::{
    AssetMetadata, HistoricalPoint, IndexHistoryPoint, MarketIndex, MarketState, PriceQuote,
    Timeframe,
};
use crate::AppState;

/// Most symbols accepted by one watchlist refresh.
const MAX_WATCHLIST_SYMBOLS: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct TimeframeQuery {
    pub timeframe: Option<String>,
}

impl TimeframeQuery {
    fn parse(&self) -> Result<Timeframe> {
        match self.timeframe.as_deref() {
            None | Some("") => Ok(Timeframe::default()),
            Some(raw) => Timeframe::from_str(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid timeframe: {}", raw))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WatchlistRequest {
    pub symbols: Vec<String>,
}

/// GET /api/market/quote/:symbol
async fn get_quote(State(state): State<AppState>, Path(symbol): Path<String>) -> ApiResult<PriceQuote> {
    ok(state.market.fetch_current_price(&symbol.to_uppercase()).await)
}

/// GET /api/market/history/:symbol
async fn get_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<TimeframeQuery>,
) -> ApiResult<Vec<HistoricalPoint>> {
    let timeframe = query.parse()?;
    ok(state
        .market
        .fetch_historical_data(&symbol.to_uppercase(), timeframe)
        .await?)
}

/// GET /api/market/metadata/:symbol
async fn get_metadata(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<AssetMetadata> {
    ok(state.market.fetch_asset_metadata(&symbol.to_uppercase()).await)
}

/// GET /api/market/indices
async fn get_indices(State(state): State<AppState>) -> ApiResult<Vec<MarketIndex>> {
    ok(state.market.fetch_market_indices().await)
}

/// GET /api/market/indices/history
async fn get_indices_history(
    State(state): State<AppState>,
    Query(query): Query<TimeframeQuery>,
) -> ApiResult<BTreeMap<String, Vec<IndexHistoryPoint>>> {
    let timeframe = query.parse()?;
    ok(state.market.fetch_market_indices_history(timeframe).await)
}

/// GET /api/market/state
async fn get_state(State(state): State<AppState>) -> ApiResult<MarketState> {
    ok(state.market_state.refresh().await)
}

/// POST /api/market/watchlist
async fn update_watchlist(
    State(state): State<AppState>,
    Json(request): Json<WatchlistRequest>,
) -> ApiResult<Vec<PriceQuote>> {
    if request.symbols.len() > MAX_WATCHLIST_SYMBOLS {
        return Err(AppError::BadRequest(format!(
            "At most {} symbols per watchlist refresh",
            MAX_WATCHLIST_SYMBOLS
        )));
    }
    let symbols: Vec<String> = request
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    ok(state.market.update_watchlist(&symbols).await)
}

/// GET /api/market/cached
async fn get_cached(State(state): State<AppState>) -> ApiResult<Vec<PriceQuote>> {
    ok(state.market.all_cached_quotes()?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote/:symbol", get(get_quote))
        .route("/history/:symbol", get(get_history))
        .route("/metadata/:symbol", get(get_metadata))
        .route("/indices", get(get_indices))
        .route("/indices/history", get(get_indices_history))
        .route("/state", get(get_state))
        .route("/watchlist", post(update_watchlist))
        .route("/cached", get(get_cached))
}
