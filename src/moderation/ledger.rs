//! ViolationLedger -- per-user violation history and escalation decision.
//!
//! The ledger is an explicit service object: created at startup (optionally
//! restored from disk), mutated only by the poll cycle, never evicted.
//! Whitelisted users are rejected before any mutation.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::{Comment, CommentId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    None,
    Escalate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub user_id: UserId,
    /// Last display name seen for this user.
    #[serde(default)]
    pub username: String,
    /// One entry per recorded violation, append-only.
    pub matched_snippets: Vec<String>,
    /// Deleted comments attributed to this user.
    #[serde(default)]
    pub comment_ids: Vec<CommentId>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Escalation already issued. Cleared again if the block failed.
    #[serde(default)]
    pub escalated: bool,
    #[serde(default)]
    pub blocked_at: Option<DateTime<Utc>>,
}

impl ViolationRecord {
    fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: String::new(),
            matched_snippets: Vec::new(),
            comment_ids: Vec::new(),
            first_seen: now,
            last_seen: now,
            escalated: false,
            blocked_at: None,
        }
    }

    pub fn count(&self) -> u32 {
        self.matched_snippets.len() as u32
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked_at.is_some()
    }
}

pub struct ViolationLedger {
    threshold: u32,
    whitelist: HashSet<UserId>,
    records: HashMap<UserId, ViolationRecord>,
}

impl ViolationLedger {
    pub fn new(threshold: u32, whitelist: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            threshold: threshold.max(1),
            whitelist: whitelist.into_iter().collect(),
            records: HashMap::new(),
        }
    }

    /// Seed the ledger with persisted records. Whitelisted users are dropped.
    pub fn restore(&mut self, records: impl IntoIterator<Item = ViolationRecord>) {
        for record in records {
            if self.whitelist.contains(&record.user_id) {
                tracing::debug!(user_id = %record.user_id, "Dropping persisted record of whitelisted user");
                continue;
            }
            self.records.insert(record.user_id, record);
        }
        tracing::info!(users = self.records.len(), "Violation ledger restored");
    }

    pub fn is_whitelisted(&self, user_id: UserId) -> bool {
        self.whitelist.contains(&user_id)
    }

    /// Record one violation. `Escalate` is returned once, when the count
    /// first reaches the threshold; whitelisted users are a no-op.
    pub fn record_violation(&mut self, user_id: UserId, snippet: &str) -> EscalationDecision {
        self.record_inner(user_id, None, None, snippet)
    }

    /// Same as [`record_violation`](Self::record_violation), also keeping the
    /// comment id and author name.
    pub fn record_comment(&mut self, comment: &Comment, snippet: &str) -> EscalationDecision {
        self.record_inner(
            comment.author_id,
            Some(comment.id),
            Some(comment.author_name.as_str()),
            snippet,
        )
    }

    fn record_inner(
        &mut self,
        user_id: UserId,
        comment_id: Option<CommentId>,
        username: Option<&str>,
        snippet: &str,
    ) -> EscalationDecision {
        if self.whitelist.contains(&user_id) {
            return EscalationDecision::None;
        }

        let now = Utc::now();
        let record = self
            .records
            .entry(user_id)
            .or_insert_with(|| ViolationRecord::new(user_id, now));

        record.matched_snippets.push(snippet.to_string());
        record.last_seen = now;
        if let Some(id) = comment_id {
            record.comment_ids.push(id);
        }
        if let Some(name) = username.filter(|n| !n.is_empty()) {
            record.username = name.to_string();
        }

        let count = record.count();
        if !record.escalated && count >= self.threshold {
            record.escalated = true;
            tracing::info!(user_id = %user_id, count, threshold = self.threshold, "Violation threshold reached");
            EscalationDecision::Escalate
        } else {
            tracing::debug!(user_id = %user_id, count, "Violation recorded");
            EscalationDecision::None
        }
    }

    /// The block went through.
    pub fn mark_blocked(&mut self, user_id: UserId) {
        if let Some(record) = self.records.get_mut(&user_id) {
            record.blocked_at = Some(Utc::now());
        }
    }

    /// The block failed: let the next violation escalate again.
    pub fn rearm(&mut self, user_id: UserId) {
        if let Some(record) = self.records.get_mut(&user_id) {
            if record.blocked_at.is_none() {
                record.escalated = false;
            }
        }
    }

    pub fn get(&self, user_id: UserId) -> Option<&ViolationRecord> {
        self.records.get(&user_id)
    }

    pub fn is_blocked(&self, user_id: UserId) -> bool {
        self.records.get(&user_id).is_some_and(ViolationRecord::is_blocked)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by user id, for persistence and display.
    pub fn snapshot(&self) -> Vec<ViolationRecord> {
        let mut records: Vec<ViolationRecord> = self.records.values().cloned().collect();
        records.sort_by_key(|r| r.user_id);
        records
    }
}
