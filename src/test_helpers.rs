//! Shared test utilities -- comment builders and a scripted comment service.
//!
//! Available only under `#[cfg(test)]`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::comment::{Comment, CommentId, UserId};
use crate::constants::COMMENT_PAGE_SIZE;
use crate::error::{WardenError, WardenResult};
use crate::platform::CommentService;

// ============================================================================
// CommentBuilder
// ============================================================================

pub struct CommentBuilder {
    comment: Comment,
}

impl CommentBuilder {
    pub fn new(id: u64, author: u64) -> Self {
        Self {
            comment: Comment {
                id: CommentId(id),
                author_id: UserId(author),
                author_name: format!("user{}", author),
                text: "Test comment".to_string(),
                page: 1,
                parent: None,
                reply_count: 0,
            },
        }
    }

    pub fn text(mut self, t: &str) -> Self {
        self.comment.text = t.to_string();
        self
    }

    pub fn author_name(mut self, name: &str) -> Self {
        self.comment.author_name = name.to_string();
        self
    }

    pub fn parent(mut self, root: u64) -> Self {
        self.comment.parent = Some(CommentId(root));
        self
    }

    pub fn reply_count(mut self, n: u32) -> Self {
        self.comment.reply_count = n;
        self
    }

    pub fn build(self) -> Comment {
        self.comment
    }
}

/// Quick builder -- id, author and text.
pub fn comment(id: u64, author: u64, text: &str) -> Comment {
    CommentBuilder::new(id, author).text(text).build()
}

// ============================================================================
// FakeCommentService
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchComments(u32),
    FetchReplies(CommentId, u32),
    Delete(CommentId),
    Block(UserId),
}

#[derive(Default)]
struct FakeState {
    comments: Vec<Comment>,
    replies: HashMap<CommentId, Vec<Comment>>,
    fail_pages_once: HashSet<u32>,
    fail_replies_once: HashSet<CommentId>,
    fail_delete_once: HashSet<CommentId>,
    reject_delete: HashSet<CommentId>,
    reject_block: HashSet<UserId>,
    deleted: Vec<CommentId>,
    blocked: Vec<UserId>,
    calls: Vec<Call>,
}

impl FakeState {
    /// Deleting a root takes its replies with it, like the platform does.
    fn remove(&mut self, id: CommentId) {
        self.comments.retain(|c| c.id != id);
        self.replies.remove(&id);
        for list in self.replies.values_mut() {
            list.retain(|c| c.id != id);
        }
        for c in &mut self.comments {
            c.reply_count = self.replies.get(&c.id).map_or(0, |r| r.len() as u32);
        }
    }
}

/// In-memory platform with scripted failures and a call journal.
///
/// Deletes take effect immediately, so later pages shift forward.
pub struct FakeCommentService {
    page_size: usize,
    state: RefCell<FakeState>,
}

impl FakeCommentService {
    pub fn new() -> Self {
        Self::with_page_size(COMMENT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            state: RefCell::new(FakeState::default()),
        }
    }

    pub fn push_comment(&self, comment: Comment) {
        self.state.borrow_mut().comments.push(comment);
    }

    pub fn add_reply(&self, root: CommentId, mut reply: Comment) {
        reply.parent = Some(root);
        let mut state = self.state.borrow_mut();
        state.replies.entry(root).or_default().push(reply);
        let count = state.replies[&root].len() as u32;
        if let Some(parent) = state.comments.iter_mut().find(|c| c.id == root) {
            parent.reply_count = count;
        }
    }

    pub fn fail_page_once(&self, page: u32) {
        self.state.borrow_mut().fail_pages_once.insert(page);
    }

    pub fn fail_replies_once(&self, root: CommentId) {
        self.state.borrow_mut().fail_replies_once.insert(root);
    }

    pub fn fail_delete_once(&self, id: CommentId) {
        self.state.borrow_mut().fail_delete_once.insert(id);
    }

    pub fn reject_delete(&self, id: CommentId) {
        self.state.borrow_mut().reject_delete.insert(id);
    }

    pub fn reject_block(&self, user: UserId) {
        self.state.borrow_mut().reject_block.insert(user);
    }

    pub fn allow_block(&self, user: UserId) {
        self.state.borrow_mut().reject_block.remove(&user);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn page_fetches(&self) -> Vec<u32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::FetchComments(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Top-level comments still listed.
    pub fn remaining(&self) -> Vec<CommentId> {
        self.state.borrow().comments.iter().map(|c| c.id).collect()
    }

    pub fn deleted(&self) -> Vec<CommentId> {
        self.state.borrow().deleted.clone()
    }

    pub fn blocked(&self) -> Vec<UserId> {
        self.state.borrow().blocked.clone()
    }
}

fn page_slice(items: &[Comment], page: u32, size: usize) -> Vec<Comment> {
    let start = (page.saturating_sub(1) as usize).saturating_mul(size);
    items
        .iter()
        .skip(start)
        .take(size)
        .cloned()
        .map(|mut c| {
            c.page = page;
            c
        })
        .collect()
}

impl CommentService for FakeCommentService {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn fetch_comments(&self, page: u32) -> WardenResult<Vec<Comment>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::FetchComments(page));
        if state.fail_pages_once.remove(&page) {
            return Err(WardenError::Transport(format!("page {} timed out", page)));
        }
        Ok(page_slice(&state.comments, page, self.page_size))
    }

    fn fetch_replies(&self, root: CommentId, page: u32) -> WardenResult<Vec<Comment>> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::FetchReplies(root, page));
        if state.fail_replies_once.remove(&root) {
            return Err(WardenError::Transport(format!("replies of {} unavailable", root)));
        }
        let replies = state.replies.get(&root).map(Vec::as_slice).unwrap_or(&[]);
        Ok(page_slice(replies, page, self.page_size))
    }

    fn delete_comment(&self, comment_id: CommentId) -> WardenResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Delete(comment_id));
        if state.fail_delete_once.remove(&comment_id) {
            return Err(WardenError::Transport("connection reset".into()));
        }
        if state.reject_delete.contains(&comment_id) {
            return Err(WardenError::Rejected("comment already deleted".into()));
        }
        state.deleted.push(comment_id);
        state.remove(comment_id);
        Ok(())
    }

    fn block_user(&self, user_id: UserId) -> WardenResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Block(user_id));
        if state.reject_block.contains(&user_id) {
            return Err(WardenError::Rejected("relation change refused".into()));
        }
        state.blocked.push(user_id);
        Ok(())
    }
}
