//! Comment Warden: keeps a video's comment section clean.
//!
//! Polls the comment pages on an interval, deletes comments matching the
//! configured banned patterns, and blocks users once they pile up enough
//! violations.

pub mod comment;
pub mod config;
pub mod constants;
pub mod error;

// Sub-systems
pub mod moderation;
pub mod platform;
pub mod storage;
pub mod tracing_init;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenience
pub use comment::{Comment, CommentId, UserId};
pub use config::ModerationConfig;
pub use error::{WardenError, WardenResult};
