// === Escalation policy ===
pub const VIOLATION_THRESHOLD: u32 = 3;

// === Scheduling ===
pub const DEFAULT_INTERVAL_SECS: u64 = 300; // 5 min between cycles
pub const DEFAULT_MAX_PAGES: u32 = 9_999;
pub const STOP_POLL_MS: u64 = 200;          // granularity of the inter-cycle wait

// === Platform paging ===
pub const COMMENT_PAGE_SIZE: usize = 20;
pub const REPLY_PAGE_SIZE: usize = 20;

// === Pacing (rate limits) ===
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// === Files ===
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_LEDGER_FILE: &str = "violation_users.json";
pub const DEFAULT_LOG_DIR: &str = "log";
pub const LOG_FILE_PREFIX: &str = "warden";
