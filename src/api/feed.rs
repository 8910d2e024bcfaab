use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use super::{ok, ApiResult};
use crate::error::{AppError, Result};
use crate::services::bots::trade_stream;
use crate::types::{FeedFrequency, Trade};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Comma separated bot ids. Empty means every bot.
    pub bots: Option<String>,
    pub frequency: Option<String>,
}

impl FeedQuery {
    fn bot_ids(&self) -> Vec<String> {
        self.bots
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn frequency(&self) -> Result<FeedFrequency> {
        match self.frequency.as_deref() {
            None | Some("") => Ok(FeedFrequency::default()),
            Some(raw) => FeedFrequency::from_str(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid frequency: {}", raw))),
        }
    }
}

/// GET /api/feed
async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Vec<Trade>> {
    let frequency = query.frequency()?;
    let trades = trade_stream(&state.store, &state.generator, &query.bot_ids(), frequency).await?;
    ok(trades)
}

/// POST /api/feed/generate
async fn generate_all(State(state): State<AppState>) -> ApiResult<Vec<Trade>> {
    let trades = state.generator.generate_bot_trades().await?;
    state.feed.publish(&trades);
    ok(trades)
}

/// POST /api/bots/:id/generate
async fn generate_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Trade> {
    let market_state = state.market_state.state();
    let trade = state
        .generator
        .generate_bot_trade(&id, Some(&market_state))
        .await?;
    state.feed.publish(std::slice::from_ref(&trade));
    ok(trade)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_feed))
        .route("/generate", post(generate_all))
}

pub fn bots_router() -> Router<AppState> {
    Router::new().route("/:id/generate", post(generate_one))
}
