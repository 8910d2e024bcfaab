use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{ok, ApiResult, CurrentUser};
use crate::types::{BotTrader, DemoSetupRequest, SignupRequest, UserProfile};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSetupResponse {
    pub user_id: String,
    pub following: Vec<BotTrader>,
}

/// POST /api/users
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<UserProfile> {
    ok(state.users.signup(request)?)
}

/// GET /api/users/:id
async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserProfile> {
    ok(state.users.get_user(&id)?)
}

/// POST /api/users/me/demo-setup
async fn demo_setup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<DemoSetupRequest>,
) -> ApiResult<DemoSetupResponse> {
    state.users.demo_setup(&user.id, &request.trader_id)?;
    ok(DemoSetupResponse {
        following: state.traders.following(&user.id)?,
        user_id: user.id,
    })
}

/// GET /api/users/me/following
async fn following(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<BotTrader>> {
    ok(state.traders.following(&user.id)?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(signup))
        .route("/:id", get(get_user))
        .route("/me/demo-setup", post(demo_setup))
        .route("/me/following", get(following))
}
