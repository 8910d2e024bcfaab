use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emoji reactions available on comments and discussions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReactionType {
    #[serde(rename = "🔥")]
    Fire,
    #[serde(rename = "🧠")]
    Brain,
    #[serde(rename = "❤️")]
    Heart,
    #[serde(rename = "💩")]
    Poop,
    #[serde(rename = "👍")]
    ThumbsUp,
    #[serde(rename = "👎")]
    ThumbsDown,
}

/// Reaction -> ids of the users who applied it.
///
/// A user id appears at most once per reaction; empty lists are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reactions(BTreeMap<ReactionType, Vec<String>>);

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `user_id` to `reaction`, or remove it if already present.
    /// Returns `true` when the reaction was added.
    pub fn toggle(&mut self, reaction: ReactionType, user_id: &str) -> bool {
        let users = self.0.entry(reaction).or_default();
        if let Some(pos) = users.iter().position(|u| u == user_id) {
            users.remove(pos);
            if users.is_empty() {
                self.0.remove(&reaction);
            }
            false
        } else {
            users.push(user_id.to_string());
            true
        }
    }

    pub fn users(&self, reaction: ReactionType) -> &[String] {
        self.0.get(&reaction).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_reacted(&self, reaction: ReactionType, user_id: &str) -> bool {
        self.users(reaction).iter().any(|u| u == user_id)
    }

    /// Total reactions across all types.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// A comment on a trade. `parent_id` marks a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub trade_id: String,
    pub content: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub reactions: Reactions,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A discussion thread opened on a trader's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderDiscussion {
    pub id: String,
    pub trader_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub title: String,
    pub content: String,
    pub timestamp: i64,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub comment_count: u32,
}

/// Counters shown on a trade card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentStats {
    pub comment_count: usize,
    pub reaction_count: usize,
}

/// A top-level comment with its replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Body of a new comment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Body of a new discussion.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDiscussionRequest {
    pub title: String,
    pub content: String,
}

/// Body of a reaction toggle.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionRequest {
    pub reaction: ReactionType,
}
