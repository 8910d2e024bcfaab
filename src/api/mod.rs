pub mod comments;
pub mod feed;
pub mod health;
pub mod market;
pub mod portfolios;
pub mod traders;
pub mod trades;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::error::Result;
use crate::types::TraderIdentity;
use crate::AppState;

/// Header naming the acting user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(portfolios::router())
        .nest("/api/users", users::router())
        .nest("/api/traders", traders::router())
        .nest("/api/trades", trades::router())
        .nest("/api/comments", comments::comment_router())
        .nest("/api/discussions", comments::discussion_router())
        .nest("/api/market", market::router())
        .nest("/api/feed", feed::router())
        .nest("/api/bots", feed::bots_router())
}

/// API response wrapper matching frontend expectations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>>;

/// Wrap `data` in the response envelope.
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse { data }))
}

/// `?limit=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// The acting user: `x-user-id` when present, else the demo user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub TraderIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        Ok(CurrentUser(app_state.users.resolve_identity(user_id)))
    }
}
