//! Comment data model: what the poller sees of one platform comment.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform comment identifier (`rpid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

/// Platform user identifier (`mid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fetched comment. Lives for a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    /// Display name at fetch time. Informational only.
    #[serde(default)]
    pub author_name: String,
    pub text: String,
    /// 1-based page this comment was retrieved from.
    pub page: u32,
    /// Root comment when this is a reply.
    #[serde(default)]
    pub parent: Option<CommentId>,
    /// Number of replies the platform reports under this comment.
    #[serde(default)]
    pub reply_count: u32,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }

    pub fn has_replies(&self) -> bool {
        self.parent.is_none() && self.reply_count > 0
    }
}
