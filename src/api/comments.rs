//! Comment, discussion and reaction routes.
//!
//! Mounted under the trade, trader, comment and discussion prefixes.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use super::{ok, ApiResult, CurrentUser};
use crate::types::{
    Comment, CommentStats, CommentThread, NewCommentRequest, NewDiscussionRequest,
    ReactionRequest, TraderDiscussion,
};
use crate::AppState;

/// GET /api/trades/:id/comments
async fn list_comments(
    State(state): State<AppState>,
    Path(trade_id): Path<String>,
) -> ApiResult<Vec<Comment>> {
    ok(state.comments.comments_for_trade(&trade_id)?)
}

/// POST /api/trades/:id/comments
async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(trade_id): Path<String>,
    Json(request): Json<NewCommentRequest>,
) -> ApiResult<Comment> {
    ok(state.comments.add_comment(
        &user,
        &trade_id,
        &request.content,
        request.parent_id.as_deref(),
    )?)
}

/// GET /api/trades/:id/comments/thread
async fn comment_thread(
    State(state): State<AppState>,
    Path(trade_id): Path<String>,
) -> ApiResult<Vec<CommentThread>> {
    ok(state.comments.thread(&trade_id)?)
}

/// GET /api/trades/:id/comments/stats
async fn comment_stats(
    State(state): State<AppState>,
    Path(trade_id): Path<String>,
) -> ApiResult<CommentStats> {
    ok(state.comments.comment_stats(&trade_id)?)
}

/// POST /api/comments/:id/reactions
async fn toggle_comment_reaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<String>,
    Json(request): Json<ReactionRequest>,
) -> ApiResult<Comment> {
    ok(state
        .comments
        .toggle_comment_reaction(&user.id, &comment_id, request.reaction)?)
}

/// GET /api/traders/:id/discussions
async fn list_discussions(
    State(state): State<AppState>,
    Path(trader_id): Path<String>,
) -> ApiResult<Vec<TraderDiscussion>> {
    ok(state.comments.trader_discussions(&trader_id)?)
}

/// POST /api/traders/:id/discussions
async fn add_discussion(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(trader_id): Path<String>,
    Json(request): Json<NewDiscussionRequest>,
) -> ApiResult<TraderDiscussion> {
    ok(state
        .comments
        .add_discussion(&user, &trader_id, &request.title, &request.content)?)
}

/// POST /api/discussions/:id/reactions
async fn toggle_discussion_reaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(discussion_id): Path<String>,
    Json(request): Json<ReactionRequest>,
) -> ApiResult<TraderDiscussion> {
    ok(state
        .comments
        .toggle_discussion_reaction(&user.id, &discussion_id, request.reaction)?)
}

/// Routes merged into the trades router.
pub fn trade_router() -> Router<AppState> {
    Router::new()
        .route("/:id/comments", get(list_comments).post(add_comment))
        .route("/:id/comments/thread", get(comment_thread))
        .route("/:id/comments/stats", get(comment_stats))
}

/// Routes merged into the traders router.
pub fn trader_router() -> Router<AppState> {
    Router::new().route("/:id/discussions", get(list_discussions).post(add_discussion))
}

pub fn comment_router() -> Router<AppState> {
    Router::new().route("/:id/reactions", post(toggle_comment_reaction))
}

pub fn discussion_router() -> Router<AppState> {
    Router::new().route("/:id/reactions", post(toggle_discussion_reaction))
}
