//! Cycle report: what one poll cycle did, handed to the logging layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::{CommentId, UserId};
use crate::error::{ErrorKind, WardenError};

/// Which call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum FailedOp {
    FetchPage { page: u32 },
    FetchReplies { root: CommentId, page: u32 },
    Delete { comment_id: CommentId },
    Block { user_id: UserId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleError {
    pub op: FailedOp,
    pub kind: ErrorKind,
    pub message: String,
}

impl CycleError {
    pub fn new(op: FailedOp, err: &WardenError) -> Self {
        Self {
            op,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based sequence number within this process run.
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub pages_fetched: u32,
    pub comments_scanned: u32,
    pub matched: u32,
    pub deleted: u32,
    pub skipped_whitelisted: u32,
    pub blocked: Vec<UserId>,
    pub errors: Vec<CycleError>,
}

impl CycleReport {
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            started_at: Utc::now(),
            duration_ms: 0,
            pages_fetched: 0,
            comments_scanned: 0,
            matched: 0,
            deleted: 0,
            skipped_whitelisted: 0,
            blocked: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn users_blocked(&self) -> usize {
        self.blocked.len()
    }

    pub fn push_error(&mut self, op: FailedOp, err: &WardenError) {
        tracing::warn!(cycle = self.cycle, op = ?op, error = %err, "Cycle operation failed");
        self.errors.push(CycleError::new(op, err));
    }

    pub fn transport_errors(&self) -> usize {
        self.errors.iter().filter(|e| e.kind == ErrorKind::Transport).count()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Emit the report as one structured event.
    pub fn log(&self) {
        tracing::info!(
            cycle = self.cycle,
            duration_ms = self.duration_ms,
            pages = self.pages_fetched,
            scanned = self.comments_scanned,
            matched = self.matched,
            deleted = self.deleted,
            whitelisted = self.skipped_whitelisted,
            blocked = self.users_blocked(),
            errors = self.errors.len(),
            "Moderation cycle complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_classified_by_kind() {
        let mut report = CycleReport::new(1);
        assert!(report.is_clean());

        report.push_error(FailedOp::FetchPage { page: 2 }, &WardenError::Transport("timeout".into()));
        report.push_error(
            FailedOp::Delete { comment_id: CommentId(7) },
            &WardenError::Rejected("already deleted".into()),
        );

        assert!(!report.is_clean());
        assert_eq!(report.transport_errors(), 1);
        assert_eq!(report.errors[1].kind, ErrorKind::Rejected);
        assert!(report.errors[0].message.contains("timeout"));
    }

    #[test]
    fn test_failed_op_serializes_tagged() {
        let json = serde_json::to_value(FailedOp::Block { user_id: UserId(42) }).unwrap();
        assert_eq!(json, serde_json::json!({"op": "block", "user_id": 42}));
    }
}
