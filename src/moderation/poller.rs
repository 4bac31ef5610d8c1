//! Poller -- one poll-match-enforce pass over the comment pages.
//!
//! A cycle has two phases. First every page (up to `max_pages`) is fetched,
//! with each comment's replies placed right after it. Then the collected
//! comments are matched and enforced in that same order. Deletes never run
//! while paging, so removing a comment cannot shift later pages under us.
//!
//! Every failure is collected into the report. A failed page fetch ends
//! paging; whatever was fetched before it is still moderated.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::comment::{Comment, UserId};
use crate::config::ModerationConfig;
use crate::moderation::enforcer::Enforcer;
use crate::moderation::ledger::{EscalationDecision, ViolationLedger};
use crate::moderation::matcher::Matcher;
use crate::moderation::report::{CycleReport, FailedOp};
use crate::platform::CommentService;

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub max_pages: u32,
    pub scan_replies: bool,
    /// Pause between fetches and after each enforcement call.
    pub request_delay: Duration,
}

impl PollSettings {
    pub fn from_config(config: &ModerationConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            scan_replies: config.scan_replies,
            request_delay: config.request_delay,
        }
    }
}

pub struct Poller<'a> {
    service: &'a dyn CommentService,
    matcher: &'a Matcher,
    enforcer: Enforcer<'a>,
    settings: PollSettings,
}

impl<'a> Poller<'a> {
    pub fn new(service: &'a dyn CommentService, matcher: &'a Matcher, settings: PollSettings) -> Self {
        Self {
            service,
            matcher,
            enforcer: Enforcer::new(service, settings.request_delay),
            settings,
        }
    }

    pub fn run_cycle(&self, cycle: u64, ledger: &mut ViolationLedger) -> CycleReport {
        let start = Instant::now();
        let mut report = CycleReport::new(cycle);

        tracing::info!(cycle, max_pages = self.settings.max_pages, "Starting moderation cycle");

        let comments = self.collect(&mut report);

        // Users whose block failed this cycle; re-armed only once the cycle is over.
        let mut failed_blocks = HashSet::new();
        for comment in &comments {
            self.moderate(comment, ledger, &mut report, &mut failed_blocks);
        }
        for user_id in failed_blocks {
            ledger.rearm(user_id);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Fetch all pages in order, replies following their root.
    fn collect(&self, report: &mut CycleReport) -> Vec<Comment> {
        let page_size = self.service.page_size();
        let mut collected = Vec::new();

        for page in 1..=self.settings.max_pages {
            if page > 1 {
                self.pause();
            }

            let comments = match self.service.fetch_comments(page) {
                Ok(c) => c,
                Err(e) => {
                    report.push_error(FailedOp::FetchPage { page }, &e);
                    break;
                }
            };
            report.pages_fetched += 1;

            if comments.is_empty() {
                tracing::debug!(page, "Empty page, end of comments");
                break;
            }
            tracing::debug!(page, count = comments.len(), "Fetched comment page");
            let last_page = comments.len() < page_size;

            for comment in comments {
                let replies = if self.settings.scan_replies && comment.has_replies() {
                    self.collect_replies(&comment, report)
                } else {
                    Vec::new()
                };
                collected.push(comment);
                collected.extend(replies);
            }

            if last_page {
                tracing::debug!(page, "Short page, end of comments");
                break;
            }
        }

        collected
    }

    fn collect_replies(&self, root: &Comment, report: &mut CycleReport) -> Vec<Comment> {
        let page_size = self.service.reply_page_size();
        let mut replies = Vec::new();

        for page in 1..=self.settings.max_pages {
            self.pause();
            match self.service.fetch_replies(root.id, page) {
                Ok(batch) => {
                    let done = batch.len() < page_size;
                    replies.extend(batch);
                    if done {
                        break;
                    }
                }
                Err(e) => {
                    report.push_error(FailedOp::FetchReplies { root: root.id, page }, &e);
                    break;
                }
            }
        }

        tracing::debug!(root = %root.id, count = replies.len(), "Fetched replies");
        replies
    }

    fn moderate(
        &self,
        comment: &Comment,
        ledger: &mut ViolationLedger,
        report: &mut CycleReport,
        failed_blocks: &mut HashSet<UserId>,
    ) {
        report.comments_scanned += 1;

        let Some(hit) = self.matcher.find(&comment.text) else {
            return;
        };
        report.matched += 1;

        if ledger.is_whitelisted(comment.author_id) {
            report.skipped_whitelisted += 1;
            tracing::debug!(
                comment_id = %comment.id,
                user_id = %comment.author_id,
                "Match from whitelisted user, left untouched"
            );
            return;
        }

        tracing::info!(
            comment_id = %comment.id,
            user_id = %comment.author_id,
            user = %comment.author_name,
            pattern = %hit.pattern,
            snippet = %hit.snippet,
            reply = comment.is_reply(),
            "Violation found"
        );

        match self.enforcer.delete(comment) {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                report.push_error(FailedOp::Delete { comment_id: comment.id }, &e);
                // Still visible: the next cycle sees it again and records it then.
                if e.is_transport() {
                    return;
                }
            }
        }

        if ledger.record_comment(comment, &hit.snippet) == EscalationDecision::Escalate {
            let user_id = comment.author_id;
            if ledger.is_blocked(user_id) {
                return;
            }
            match self.enforcer.block(user_id) {
                Ok(()) => {
                    ledger.mark_blocked(user_id);
                    report.blocked.push(user_id);
                }
                Err(e) => {
                    report.push_error(FailedOp::Block { user_id }, &e);
                    failed_blocks.insert(user_id);
                }
            }
        }
    }

    fn pause(&self) {
        if !self.settings.request_delay.is_zero() {
            std::thread::sleep(self.settings.request_delay);
        }
    }
}
