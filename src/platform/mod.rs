//! Comment platform collaborator.
//!
//! The moderation core only talks to this trait; the HTTP client lives in
//! [`bilibili`] and tests substitute a scripted fake.

pub mod bilibili;

use crate::comment::{Comment, CommentId, UserId};
use crate::error::WardenResult;

pub use bilibili::BilibiliClient;

/// Operations the moderation core needs from the platform.
///
/// Fetch failures are `WardenError::Transport`; an action the platform
/// refuses is `WardenError::Rejected`. Timeouts are the implementor's concern.
pub trait CommentService {
    /// Number of comments in a full page. A shorter page is the last one.
    fn page_size(&self) -> usize;

    /// Top-level comments of the target video, 1-based page.
    /// An empty page means there is nothing further.
    fn fetch_comments(&self, page: u32) -> WardenResult<Vec<Comment>>;

    /// Replies under `root`, 1-based page. Same paging contract, with
    /// [`reply_page_size`](Self::reply_page_size) as the full-page size.
    fn fetch_replies(&self, root: CommentId, page: u32) -> WardenResult<Vec<Comment>>;

    fn reply_page_size(&self) -> usize {
        self.page_size()
    }

    fn delete_comment(&self, comment_id: CommentId) -> WardenResult<()>;

    fn block_user(&self, user_id: UserId) -> WardenResult<()>;
}
