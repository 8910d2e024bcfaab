use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};

use super::{ok, ApiResult, CurrentUser};
use crate::error::AppError;
use crate::types::Portfolio;
use crate::AppState;

/// GET /api/portfolio
async fn my_portfolio(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Portfolio> {
    ok(state.trades.portfolio(&user.id)?)
}

/// GET /api/portfolios/:trader_id
///
/// Bots report their seeded portfolio; anyone else falls back to the
/// starting cash.
async fn trader_portfolio(
    State(state): State<AppState>,
    Path(trader_id): Path<String>,
) -> ApiResult<Portfolio> {
    match state.traders.bot_portfolio(&trader_id) {
        Ok(portfolio) => ok(portfolio),
        Err(AppError::NotFound(_)) => ok(state.trades.portfolio(&trader_id)?),
        Err(e) => Err(e),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/portfolio", get(my_portfolio))
        .route("/api/portfolios/:trader_id", get(trader_portfolio))
}
