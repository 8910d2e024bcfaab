use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::{comments, ok, ApiResult, CurrentUser};
use crate::types::{BotTrader, Portfolio, Trade};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub trader_id: String,
    pub following: bool,
    pub followers: u64,
}

/// GET /api/traders
async fn list_traders(State(state): State<AppState>) -> ApiResult<Vec<BotTrader>> {
    ok(state.traders.list_bot_traders()?)
}

/// GET /api/traders/:id
async fn get_trader(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<BotTrader> {
    ok(state.traders.get_trader(&id)?)
}

/// GET /api/traders/:id/portfolio
async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Portfolio> {
    ok(state.traders.bot_portfolio(&id)?)
}

/// GET /api/traders/:id/trades
async fn get_trades(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Trade>> {
    ok(state.traders.trader_trades(&id)?)
}

/// POST /api/traders/:id/follow
async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<FollowResponse> {
    state.traders.follow(&user.id, &id)?;
    let trader = state.traders.get_trader(&id)?;
    ok(FollowResponse {
        trader_id: trader.id,
        following: true,
        followers: trader.followers,
    })
}

/// POST /api/traders/:id/unfollow
async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<FollowResponse> {
    state.traders.unfollow(&user.id, &id)?;
    let trader = state.traders.get_trader(&id)?;
    ok(FollowResponse {
        trader_id: trader.id,
        following: false,
        followers: trader.followers,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_traders))
        .route("/:id", get(get_trader))
        .route("/:id/portfolio", get(get_portfolio))
        .route("/:id/trades", get(get_trades))
        .route("/:id/follow", post(follow))
        .route("/:id/unfollow", post(unfollow))
        .merge(comments::trader_router())
}
