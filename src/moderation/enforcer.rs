//! Enforcer -- issues delete and block actions against the platform.
//!
//! No retries: a failed action is reported to the caller and the next
//! cycle re-detects whatever is still in place.

use std::time::Duration;

use crate::comment::{Comment, UserId};
use crate::error::WardenResult;
use crate::platform::CommentService;

pub struct Enforcer<'a> {
    service: &'a dyn CommentService,
    /// Pause after every action, success or not.
    pacing: Duration,
}

impl<'a> Enforcer<'a> {
    pub fn new(service: &'a dyn CommentService, pacing: Duration) -> Self {
        Self { service, pacing }
    }

    pub fn delete(&self, comment: &Comment) -> WardenResult<()> {
        tracing::info!(comment_id = %comment.id, user_id = %comment.author_id, "Deleting comment");
        let result = self.service.delete_comment(comment.id);
        match &result {
            Ok(()) => tracing::info!(comment_id = %comment.id, "Comment deleted"),
            Err(e) => tracing::warn!(comment_id = %comment.id, error = %e, "Delete failed"),
        }
        self.pause();
        result
    }

    pub fn block(&self, user_id: UserId) -> WardenResult<()> {
        tracing::info!(user_id = %user_id, "Blocking user");
        let result = self.service.block_user(user_id);
        match &result {
            Ok(()) => tracing::info!(user_id = %user_id, "User blocked"),
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Block failed"),
        }
        self.pause();
        result
    }

    fn pause(&self) {
        if !self.pacing.is_zero() {
            std::thread::sleep(self.pacing);
        }
    }
}
