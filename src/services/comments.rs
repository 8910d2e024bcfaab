//! Trade comments, trader discussions and emoji reactions.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::SqliteStore;
use crate::error::{AppError, Result};
use crate::types::{
    Comment, CommentStats, CommentThread, ReactionType, Reactions, TraderDiscussion,
    TraderIdentity,
};

pub struct CommentService {
    store: Arc<SqliteStore>,
}

impl CommentService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Comments and replies on a trade, newest first.
    pub fn comments_for_trade(&self, trade_id: &str) -> Result<Vec<Comment>> {
        self.store.comments_for_trade(trade_id)
    }

    /// Top-level comments newest first, each with its replies oldest first.
    pub fn thread(&self, trade_id: &str) -> Result<Vec<CommentThread>> {
        Ok(build_threads(self.store.comments_for_trade(trade_id)?))
    }

    pub fn comment_stats(&self, trade_id: &str) -> Result<CommentStats> {
        let comments = self.store.comments_for_trade(trade_id)?;
        Ok(CommentStats {
            comment_count: comments.len(),
            reaction_count: comments.iter().map(|c| c.reactions.total()).sum(),
        })
    }

    /// Post a comment, or a reply when `parent_id` is set.
    ///
    /// Replies nest one level deep and must stay on the parent's trade.
    pub fn add_comment(
        &self,
        user: &TraderIdentity,
        trade_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
        }
        if self.store.get_trade(trade_id)?.is_none() {
            return Err(AppError::NotFound(format!("Trade {} not found", trade_id)));
        }

        let parent_id = parent_id.map(str::trim).filter(|p| !p.is_empty());
        if let Some(parent_id) = parent_id {
            let parent = self
                .store
                .get_comment(parent_id)?
                .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", parent_id)))?;
            if parent.trade_id != trade_id {
                return Err(AppError::BadRequest(
                    "Reply must be on the same trade as its parent".to_string(),
                ));
            }
            if parent.is_reply() {
                return Err(AppError::BadRequest("Cannot reply to a reply".to_string()));
            }
        }

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_avatar: user.avatar.clone(),
            trade_id: trade_id.to_string(),
            content: content.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            parent_id: parent_id.map(str::to_string),
            reactions: Reactions::new(),
        };
        self.store.insert_comment(&comment)?;
        debug!("{} commented on trade {}", user.id, trade_id);
        Ok(comment)
    }

    /// Add or remove `user_id`'s reaction on a comment.
    pub fn toggle_comment_reaction(
        &self,
        user_id: &str,
        comment_id: &str,
        reaction: ReactionType,
    ) -> Result<Comment> {
        self.store
            .update_comment(comment_id, |c| {
                c.reactions.toggle(reaction, user_id);
            })?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))
    }

    /// Discussions on a trader's profile, newest first.
    pub fn trader_discussions(&self, trader_id: &str) -> Result<Vec<TraderDiscussion>> {
        self.store.discussions_for_trader(trader_id)
    }

    pub fn add_discussion(
        &self,
        user: &TraderIdentity,
        trader_id: &str,
        title: &str,
        content: &str,
    ) -> Result<TraderDiscussion> {
        let (title, content) = (title.trim(), content.trim());
        if title.is_empty() || content.is_empty() {
            return Err(AppError::BadRequest(
                "Discussion needs a title and content".to_string(),
            ));
        }
        if self.store.get_trader(trader_id)?.is_none() {
            return Err(AppError::NotFound(format!("Trader {} not found", trader_id)));
        }

        let discussion = TraderDiscussion {
            id: uuid::Uuid::new_v4().to_string(),
            trader_id: trader_id.to_string(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_avatar: user.avatar.clone(),
            title: title.to_string(),
            content: content.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            reactions: Reactions::new(),
            comment_count: 0,
        };
        self.store.insert_discussion(&discussion)?;
        Ok(discussion)
    }

    pub fn toggle_discussion_reaction(
        &self,
        user_id: &str,
        discussion_id: &str,
        reaction: ReactionType,
    ) -> Result<TraderDiscussion> {
        self.store
            .update_discussion(discussion_id, |d| {
                d.reactions.toggle(reaction, user_id);
            })?
            .ok_or_else(|| {
                AppError::NotFound(format!("Discussion {} not found", discussion_id))
            })
    }
}

/// Group newest-first comments into threads.
///
/// Replies whose parent is missing are dropped.
pub fn build_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (top, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| !c.is_reply());

    let mut by_parent: HashMap<String, Vec<Comment>> = HashMap::new();
    // Input is newest first; replies read oldest first.
    for reply in replies.into_iter().rev() {
        if let Some(parent) = reply.parent_id.clone() {
            by_parent.entry(parent).or_default().push(reply);
        }
    }

    top.into_iter()
        .map(|comment| {
            let replies = by_parent.remove(&comment.id).unwrap_or_default();
            CommentThread { comment, replies }
        })
        .collect()
}
