use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::debug;

use super::{comments, ok, ApiResult, CurrentUser, LimitQuery};
use crate::error::AppError;
use crate::services::trades::{MISSING_FIELDS, SYMBOL_TRADES_LIMIT};
use crate::types::{NewTradeRequest, Trade};
use crate::AppState;

/// Default size of the recent trades list.
const RECENT_TRADES_LIMIT: usize = 50;

/// GET /api/trades
async fn recent_trades(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<Trade>> {
    ok(state
        .trades
        .recent_trades(query.limit.unwrap_or(RECENT_TRADES_LIMIT))?)
}

/// POST /api/trades
async fn create_trade(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    form: Result<Json<NewTradeRequest>, JsonRejection>,
) -> ApiResult<Trade> {
    let Json(form) = form.map_err(|rejection| {
        debug!("Rejected trade form: {}", rejection.body_text());
        AppError::BadRequest(MISSING_FIELDS.to_string())
    })?;
    ok(state.trades.create_user_trade(&user, form)?)
}

/// GET /api/trades/:id
async fn get_trade(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Trade> {
    ok(state.trades.get_trade(&id)?)
}

/// POST /api/trades/:id/copy
async fn copy_trade(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Trade> {
    ok(state.trades.create_copy_trade(&user, &id)?)
}

/// GET /api/trades/symbol/:symbol
async fn symbol_trades(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<Trade>> {
    ok(state
        .trades
        .symbol_trades(&symbol, query.limit.unwrap_or(SYMBOL_TRADES_LIMIT))?)
}

/// GET /api/trades/user/:user_id
async fn user_trades(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Trade>> {
    ok(state.trades.user_trades(&user_id)?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recent_trades).post(create_trade))
        .route("/:id", get(get_trade))
        .route("/:id/copy", post(copy_trade))
        .route("/symbol/:symbol", get(symbol_trades))
        .route("/user/:user_id", get(user_trades))
        .merge(comments::trade_router())
}
